//! JSON-backed configuration.
//!
//! Enabled with the `config` feature. Container options and
//! [`Configuration<T>`](crate::Configuration) values can be read from JSON
//! documents with `serde_json`.

use serde::de::DeserializeOwned;

use crate::container::{Container, ContainerOptions};
use crate::error::{DiError, DiResult};

impl ContainerOptions {
    /// Parses options from JSON. Missing fields keep their defaults.
    ///
    /// ```rust
    /// use ferrous_ioc::ContainerOptions;
    /// use std::time::Duration;
    ///
    /// let options = ContainerOptions::from_json(r#"{ "singleton_timeout_ms": 250 }"#).unwrap();
    /// assert_eq!(options.singleton_timeout, Duration::from_millis(250));
    /// assert!(!options.allow_recursive_resolution);
    /// ```
    pub fn from_json(json: &str) -> DiResult<Self> {
        serde_json::from_str(json).map_err(|err| {
            tracing::warn!(error = %err, "invalid container options");
            DiError::Configuration(err.to_string())
        })
    }
}

impl Container {
    /// Deserialises a `T` from JSON and registers it as the singleton
    /// [`Configuration<T>`](crate::Configuration).
    ///
    /// ```rust
    /// use ferrous_ioc::{Configuration, Container, Resolver};
    /// use serde::Deserialize;
    ///
    /// #[derive(Deserialize)]
    /// struct Pool { size: u32 }
    ///
    /// let ioc = Container::new();
    /// ioc.configure_json::<Pool>(r#"{ "size": 8 }"#).unwrap();
    ///
    /// let pool = ioc.resolve::<Configuration<Pool>>().unwrap();
    /// assert_eq!(pool.value().size, 8);
    /// ```
    pub fn configure_json<T>(&self, json: &str) -> DiResult<&Self>
    where
        T: DeserializeOwned + Send + Sync + 'static,
    {
        let value: T = serde_json::from_str(json).map_err(|err| {
            DiError::Configuration(format!("{}: {}", std::any::type_name::<T>(), err))
        })?;
        Ok(self.configure(value))
    }

    /// Like [`configure_json`](Self::configure_json), registered under `key`.
    pub fn configure_json_keyed<T>(&self, key: &str, json: &str) -> DiResult<&Self>
    where
        T: DeserializeOwned + Send + Sync + 'static,
    {
        let value: T = serde_json::from_str(json).map_err(|err| {
            DiError::Configuration(format!("{} [{:?}]: {}", std::any::type_name::<T>(), key, err))
        })?;
        Ok(self.configure_keyed(key, value))
    }
}

/// Serde adapter storing a `Duration` as whole milliseconds.
pub(crate) mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub(crate) fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        let millis = u64::try_from(duration.as_millis()).map_err(serde::ser::Error::custom)?;
        serializer.serialize_u64(millis)
    }

    pub(crate) fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
