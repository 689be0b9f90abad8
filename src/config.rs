//! Configuration loading.
//!
//! Configuration is loaded from TOML files with the following resolution order:
//! 1. `--config <path>` (CLI flag)
//! 2. `~/.vegvisir/config.toml` (user)
//! 3. `/etc/vegvisir/config.toml` (system)
//!
//! A config file declares the static service table plus resolution
//! behaviour; [`Middleware::from_config`] turns it into a ready-to-use
//! middleware with the chain `static table → env convention → sidecar`.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::middleware::strategy::{EnvAddress, Sidecar, StaticTable};
use crate::{CredentialsRef, Endpoint, Middleware, Result, VegvisirError};

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub resolution: ResolutionConfig,
    /// Static service table: logical name → endpoint entry.
    #[serde(default)]
    pub services: BTreeMap<String, ServiceEntry>,
    #[serde(default)]
    pub sidecar: Option<SidecarConfig>,
}

/// Resolution behaviour knobs.
#[derive(Debug, Clone, Deserialize)]
pub struct ResolutionConfig {
    /// Per-strategy attempt timeout in seconds (default: 5).
    #[serde(default = "default_attempt_timeout")]
    pub attempt_timeout_secs: u64,
    /// Endpoint cache TTL in seconds (default: 30).
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl_secs: u64,
    /// Endpoint cache capacity (default: 1024).
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: u64,
    /// Prefix for the env-address strategy, e.g. "SDV_" (default: none).
    #[serde(default)]
    pub env_prefix: String,
    /// Whether the `<NAME>_ADDRESS` env strategy participates (default: true).
    #[serde(default = "default_true")]
    pub use_env: bool,
}

impl Default for ResolutionConfig {
    fn default() -> Self {
        Self {
            attempt_timeout_secs: default_attempt_timeout(),
            cache_ttl_secs: default_cache_ttl(),
            cache_capacity: default_cache_capacity(),
            env_prefix: String::new(),
            use_env: true,
        }
    }
}

fn default_attempt_timeout() -> u64 {
    5
}

fn default_cache_ttl() -> u64 {
    30
}

fn default_cache_capacity() -> u64 {
    1024
}

fn default_true() -> bool {
    true
}

/// One static service table entry.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceEntry {
    /// Address in any form [`Endpoint::parse`] accepts.
    pub address: String,
    /// Force TLS even when the address carries no scheme prefix.
    #[serde(default)]
    pub tls: bool,
    /// PEM certificate path for TLS servers.
    #[serde(default)]
    pub cert_pem: Option<PathBuf>,
    /// PEM private key path for TLS servers.
    #[serde(default)]
    pub key_pem: Option<PathBuf>,
}

impl ServiceEntry {
    fn endpoint(&self) -> Result<Endpoint> {
        let parsed = Endpoint::parse(&self.address)?;
        let mut endpoint = if self.tls {
            Endpoint::tls(parsed.address())
        } else {
            parsed
        };
        if let (Some(cert), Some(key)) = (&self.cert_pem, &self.key_pem) {
            endpoint = endpoint.with_credentials(CredentialsRef {
                cert_pem: cert.clone(),
                key_pem: key.clone(),
            });
        }
        Ok(endpoint)
    }
}

/// Sidecar strategy configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SidecarConfig {
    /// Local sidecar proxy port.
    pub port: u16,
}

impl Config {
    /// Load configuration from the standard locations.
    ///
    /// Resolution order:
    /// 1. Explicit path (if provided)
    /// 2. `~/.vegvisir/config.toml`
    /// 3. `/etc/vegvisir/config.toml`
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        let path = Self::resolve_config_path(explicit_path)?;
        let content = fs::read_to_string(&path).map_err(|e| {
            VegvisirError::Configuration(format!("Failed to read config file {path:?}: {e}"))
        })?;
        toml::from_str(&content).map_err(|e| {
            VegvisirError::Configuration(format!("Failed to parse config file {path:?}: {e}"))
        })
    }

    /// Resolve the config file path.
    fn resolve_config_path(explicit: Option<&Path>) -> Result<PathBuf> {
        if let Some(path) = explicit {
            if path.exists() {
                return Ok(path.to_path_buf());
            }
            return Err(VegvisirError::Configuration(format!(
                "Config file not found: {path:?}"
            )));
        }

        // User config
        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(".vegvisir").join("config.toml");
            if user_config.exists() {
                return Ok(user_config);
            }
        }

        // System config
        let system_config = PathBuf::from("/etc/vegvisir/config.toml");
        if system_config.exists() {
            return Ok(system_config);
        }

        Err(VegvisirError::Configuration(
            "No config file found. Create ~/.vegvisir/config.toml or /etc/vegvisir/config.toml"
                .to_string(),
        ))
    }
}

impl Middleware {
    /// Build a middleware from configuration.
    ///
    /// The chain is: static table (when any service is declared), then the
    /// env-address convention (unless disabled), then the sidecar strategy
    /// (when configured).
    pub fn from_config(config: &Config) -> Result<Middleware> {
        let mut builder = Middleware::builder()
            .cache_ttl(Duration::from_secs(config.resolution.cache_ttl_secs))
            .cache_capacity(config.resolution.cache_capacity)
            .attempt_timeout(Duration::from_secs(config.resolution.attempt_timeout_secs));

        if !config.services.is_empty() {
            let mut table = StaticTable::new();
            for (name, entry) in &config.services {
                table = table.with(name, entry.endpoint()?);
            }
            builder = builder.strategy(table);
        }

        if config.resolution.use_env {
            let env = if config.resolution.env_prefix.is_empty() {
                EnvAddress::new()
            } else {
                EnvAddress::with_prefix(&config.resolution.env_prefix)
            };
            builder = builder.strategy(env);
        }

        if let Some(sidecar) = &config.sidecar {
            builder = builder.strategy(Sidecar::new(sidecar.port));
        }

        Ok(builder.build())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Scheme;

    #[test]
    fn default_config_has_expected_values() {
        let config = Config::default();
        assert_eq!(config.resolution.attempt_timeout_secs, 5);
        assert_eq!(config.resolution.cache_ttl_secs, 30);
        assert_eq!(config.resolution.cache_capacity, 1024);
        assert!(config.resolution.use_env);
        assert!(config.services.is_empty());
        assert!(config.sidecar.is_none());
    }

    #[test]
    fn parse_minimal_config() {
        let toml = r#"
            [services.seats]
            address = "127.0.0.1:50051"
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.services["seats"].address, "127.0.0.1:50051");
        // Defaults preserved
        assert_eq!(config.resolution.cache_ttl_secs, 30);
    }

    #[test]
    fn parse_full_config() {
        let toml = r#"
            [resolution]
            attempt_timeout_secs = 2
            cache_ttl_secs = 60
            cache_capacity = 16
            env_prefix = "SDV_"
            use_env = false

            [services.seats]
            address = "grpc://127.0.0.1:50051"

            [services.horn]
            address = "horn.cabin.svc:443"
            tls = true
            cert_pem = "/etc/vegvisir/horn.crt"
            key_pem = "/etc/vegvisir/horn.key"

            [sidecar]
            port = 3500
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.resolution.attempt_timeout_secs, 2);
        assert_eq!(config.resolution.env_prefix, "SDV_");
        assert!(!config.resolution.use_env);
        assert_eq!(config.services.len(), 2);
        assert_eq!(config.sidecar.as_ref().unwrap().port, 3500);

        let horn = config.services["horn"].endpoint().unwrap();
        assert_eq!(horn.scheme(), Scheme::Tls);
        assert!(horn.credentials().is_some());
    }

    #[test]
    fn config_not_found_returns_error() {
        let result = Config::load(Some(Path::new("/nonexistent/config.toml")));
        assert!(result.is_err());
        let err = result.unwrap_err().to_string();
        assert!(err.contains("Config file not found"));
    }

    #[test]
    fn load_from_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            r#"
                [services.seats]
                address = "127.0.0.1:50051"
            "#,
        )
        .unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.services["seats"].address, "127.0.0.1:50051");
    }

    #[tokio::test]
    async fn middleware_from_config_resolves_static_entries() {
        let toml = r#"
            [services.seats]
            address = "127.0.0.1:50051"
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        let mw = Middleware::from_config(&config).unwrap();
        assert_eq!(mw.strategy_names()[0], "static-table");

        let ep = mw.resolve("seats").await.unwrap();
        assert_eq!(ep.address(), "127.0.0.1:50051");
    }

    #[test]
    fn from_config_chain_reflects_sections() {
        let toml = r#"
            [resolution]
            use_env = false

            [sidecar]
            port = 3500
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        let mw = Middleware::from_config(&config).unwrap();
        assert_eq!(mw.strategy_names(), vec!["sidecar"]);
    }
}
