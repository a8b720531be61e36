//! Internal implementation details.

pub(crate) mod reentrancy;

pub(crate) use reentrancy::{is_resolving, ReentrancyGuard, ReentryPolicy};
