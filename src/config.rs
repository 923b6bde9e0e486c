use std::env;
use anyhow::{bail, Context, Result};

/// Which persistence backend serves the note store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Spanner,
    Memory,
}

/// Connection settings for the Spanner backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpannerSettings {
    pub emulator_host: Option<String>,
    pub project: String,
    pub instance: String,
    pub database: String,
}

impl SpannerSettings {
    pub fn database_path(&self) -> String {
        format!(
            "projects/{}/instances/{}/databases/{}",
            self.project, self.instance, self.database
        )
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub store_backend: StoreBackend,
    /// Present only when `store_backend` is `Spanner`
    pub spanner: Option<SpannerSettings>,
    pub service_port: u16,
    pub service_host: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let store_backend = match lookup("STORE_BACKEND").as_deref() {
            None | Some("spanner") => StoreBackend::Spanner,
            Some("memory") => StoreBackend::Memory,
            Some(other) => bail!(
                "STORE_BACKEND must be one of: spanner, memory, got '{}'",
                other
            ),
        };

        let spanner = match store_backend {
            StoreBackend::Spanner => Some(SpannerSettings {
                emulator_host: lookup("SPANNER_EMULATOR_HOST"),
                project: lookup("SPANNER_PROJECT")
                    .context("SPANNER_PROJECT environment variable is required")?,
                instance: lookup("SPANNER_INSTANCE")
                    .context("SPANNER_INSTANCE environment variable is required")?,
                database: lookup("SPANNER_DATABASE")
                    .context("SPANNER_DATABASE environment variable is required")?,
            }),
            StoreBackend::Memory => None,
        };

        let service_port = lookup("SERVICE_PORT")
            .unwrap_or_else(|| "3001".to_string())
            .parse::<u16>()
            .context("SERVICE_PORT must be a valid port number (0-65535)")?;

        let service_host = lookup("SERVICE_HOST").unwrap_or_else(|| "0.0.0.0".to_string());

        Ok(Config {
            store_backend,
            spanner,
            service_port,
            service_host,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.service_host, self.service_port)
    }

    pub fn log_startup(&self) {
        tracing::info!("Configuration loaded:");
        match &self.spanner {
            Some(spanner) => {
                tracing::info!("  Store backend: spanner");
                tracing::info!("  Spanner emulator: {}",
                    spanner.emulator_host.as_deref().unwrap_or("disabled (using production)"));
                tracing::info!("  Spanner project: {}", spanner.project);
                tracing::info!("  Spanner instance: {}", spanner.instance);
                tracing::info!("  Spanner database: {}", spanner.database);
            }
            None => tracing::info!("  Store backend: memory (notes are not persisted)"),
        }
        tracing::info!("  Service listening on: {}", self.bind_address());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    const REQUIRED: [(&str, &str); 3] = [
        ("SPANNER_PROJECT", "test-project"),
        ("SPANNER_INSTANCE", "test-instance"),
        ("SPANNER_DATABASE", "test-database"),
    ];

    #[test]
    fn test_config_with_all_vars() {
        let mut vars = REQUIRED.to_vec();
        vars.extend([
            ("SPANNER_EMULATOR_HOST", "localhost:9010"),
            ("SERVICE_PORT", "8080"),
            ("SERVICE_HOST", "127.0.0.1"),
        ]);

        let config = config_from(&vars).unwrap();
        let spanner = config.spanner.unwrap();

        assert_eq!(config.store_backend, StoreBackend::Spanner);
        assert_eq!(spanner.emulator_host, Some("localhost:9010".to_string()));
        assert_eq!(spanner.project, "test-project");
        assert_eq!(spanner.instance, "test-instance");
        assert_eq!(spanner.database, "test-database");
        assert_eq!(config.service_port, 8080);
        assert_eq!(config.service_host, "127.0.0.1");
    }

    #[test]
    fn test_config_with_defaults() {
        let config = config_from(&REQUIRED).unwrap();

        assert_eq!(config.store_backend, StoreBackend::Spanner);
        assert_eq!(config.spanner.unwrap().emulator_host, None);
        assert_eq!(config.service_port, 3001);
        assert_eq!(config.service_host, "0.0.0.0");
    }

    #[test]
    fn test_missing_required_var() {
        let result = config_from(&[
            ("SPANNER_PROJECT", "test-project"),
            ("SPANNER_INSTANCE", "test-instance"),
        ]);

        let error = result.unwrap_err();
        assert!(error.to_string().contains("SPANNER_DATABASE"));
    }

    #[test]
    fn test_memory_backend_needs_no_spanner_vars() {
        let config = config_from(&[("STORE_BACKEND", "memory")]).unwrap();

        assert_eq!(config.store_backend, StoreBackend::Memory);
        assert!(config.spanner.is_none());
    }

    #[test]
    fn test_unknown_backend() {
        let error = config_from(&[("STORE_BACKEND", "mongo")]).unwrap_err();
        assert!(error.to_string().contains("STORE_BACKEND"));
    }

    #[test]
    fn test_invalid_port() {
        let mut vars = REQUIRED.to_vec();
        vars.push(("SERVICE_PORT", "not-a-number"));

        let error = config_from(&vars).unwrap_err();
        assert!(error.to_string().contains("SERVICE_PORT"));
    }

    #[test]
    fn test_port_out_of_range() {
        let mut vars = REQUIRED.to_vec();
        vars.push(("SERVICE_PORT", "99999"));

        assert!(config_from(&vars).is_err());
    }

    #[test]
    fn test_database_path() {
        let config = config_from(&REQUIRED).unwrap();
        assert_eq!(
            config.spanner.unwrap().database_path(),
            "projects/test-project/instances/test-instance/databases/test-database"
        );
    }
}
