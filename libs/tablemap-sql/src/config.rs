// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Translator configuration read from the environment.

use std::collections::HashMap;

use thiserror::Error;
use tracing::debug;

use crate::sql::dialect::Dialect;

pub const DIALECT_PARAM: &str = "TABLEMAP_SQL_DIALECT";
pub const LOG_SQL_PARAM: &str = "TABLEMAP_LOG_SQL";

pub trait Environment: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;

    fn enabled(&self, key: &str, default_value: bool) -> Result<bool, EnvError> {
        match self.get(key) {
            Some(value) => match value.to_lowercase().as_str() {
                "true" | "1" | "yes" | "on" | "enabled" | "enable" => Ok(true),
                "false" | "0" | "no" | "off" | "disabled" | "disable" => Ok(false),
                _ => Err(EnvError::InvalidBoolean {
                    key: key.to_string(),
                    value,
                }),
            },
            None => Ok(default_value),
        }
    }
}

#[derive(Debug, Error)]
pub enum EnvError {
    #[error(
        "Invalid value for {key}: {value}. Expected true, 1, yes, on, enabled, enable OR false, 0, no, off, disabled, disable"
    )]
    InvalidBoolean { key: String, value: String },

    #[error("Invalid env value {env_value} for {env_key}: {message}")]
    InvalidDialect {
        env_key: &'static str,
        env_value: String,
        message: String,
    },
}

pub struct SystemEnvironment;

impl Environment for SystemEnvironment {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

#[derive(Clone, Default)]
pub struct MapEnvironment {
    values: HashMap<String, String>,
}

impl Environment for MapEnvironment {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }
}

impl<const N: usize> From<[(&str, &str); N]> for MapEnvironment {
    fn from(values: [(&str, &str); N]) -> Self {
        Self {
            values: HashMap::from_iter(
                values
                    .into_iter()
                    .map(|(k, v)| (k.to_string(), v.to_string())),
            ),
        }
    }
}

impl MapEnvironment {
    pub fn set(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_string(), value.to_string());
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TranslatorConfig {
    pub dialect: Dialect,
    /// Log every generated statement at `debug`.
    pub log_sql: bool,
}

impl TranslatorConfig {
    pub fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            log_sql: false,
        }
    }

    pub fn from_env(env: &dyn Environment) -> Result<Self, EnvError> {
        let dialect = match env.get(DIALECT_PARAM) {
            Some(value) => value
                .parse::<Dialect>()
                .map_err(|message| EnvError::InvalidDialect {
                    env_key: DIALECT_PARAM,
                    env_value: value.clone(),
                    message,
                })?,
            None => Dialect::Postgres,
        };
        let log_sql = env.enabled(LOG_SQL_PARAM, false)?;

        debug!(?dialect, log_sql, "Loaded translator configuration");

        Ok(Self { dialect, log_sql })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = TranslatorConfig::from_env(&MapEnvironment::default()).unwrap();
        assert_eq!(config, TranslatorConfig::new(Dialect::Postgres));
    }

    #[test]
    fn reads_dialect_and_logging() {
        let env = MapEnvironment::from([(DIALECT_PARAM, "sqlserver"), (LOG_SQL_PARAM, "yes")]);
        let config = TranslatorConfig::from_env(&env).unwrap();

        assert_eq!(config.dialect, Dialect::SqlServer);
        assert!(config.log_sql);
    }

    #[test]
    fn rejects_invalid_values() {
        let env = MapEnvironment::from([(DIALECT_PARAM, "oracle")]);
        assert!(matches!(
            TranslatorConfig::from_env(&env),
            Err(EnvError::InvalidDialect { env_key: DIALECT_PARAM, .. })
        ));

        let mut env = MapEnvironment::default();
        env.set(LOG_SQL_PARAM, "sometimes");
        assert!(matches!(
            TranslatorConfig::from_env(&env),
            Err(EnvError::InvalidBoolean { .. })
        ));
    }
}
