use serde::Deserialize;
use std::env;
use std::path::{Path, PathBuf};

use stempark_catalog::{VariantDefaults, VariantError};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub media: MediaConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
    /// Request body cap, sized for multipart media uploads
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

fn default_max_upload_bytes() -> usize {
    25 * 1024 * 1024
}

#[derive(Debug, Deserialize, Clone)]
pub struct MediaConfig {
    /// Directory uploaded variant media is written to
    pub root_dir: PathBuf,
    /// URL prefix the media directory is served under
    #[serde(default = "default_public_prefix")]
    pub public_prefix: String,
}

fn default_public_prefix() -> String {
    "/uploads".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct PriceRegion {
    pub region: String,
    pub currency: String,
}

/// Seeds for newly added variant options
#[derive(Debug, Deserialize, Clone)]
pub struct CatalogConfig {
    #[serde(default = "default_regions")]
    pub regions: Vec<PriceRegion>,
    #[serde(default = "default_threshold")]
    pub low_stock_threshold: u32,
}

fn default_regions() -> Vec<PriceRegion> {
    VariantDefaults::default()
        .pricing
        .iter()
        .map(|entry| PriceRegion {
            region: entry.region.clone(),
            currency: entry.currency.to_string(),
        })
        .collect()
}

fn default_threshold() -> u32 {
    VariantDefaults::default().low_stock_threshold
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            regions: default_regions(),
            low_stock_threshold: default_threshold(),
        }
    }
}

impl CatalogConfig {
    pub fn variant_defaults(&self) -> Result<VariantDefaults, VariantError> {
        let regions: Vec<(String, String)> = self
            .regions
            .iter()
            .map(|r| (r.region.clone(), r.currency.clone()))
            .collect();
        VariantDefaults::with_regions(&regions, self.low_stock_threshold)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// `EnvFilter` directives, overridden by `RUST_LOG`
    #[serde(default = "default_filter")]
    pub filter: String,
    #[serde(default)]
    pub json: bool,
}

fn default_filter() -> String {
    "info,tower_http=debug".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_filter(),
            json: false,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from(Path::new("config"))
    }

    /// Layer `default`, `<RUN_MODE>` and `local` files from `dir`, then
    /// `STEMPARK__*` environment variables
    pub fn load_from(dir: &Path) -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());
        let file = |name: &str| dir.join(name).to_string_lossy().into_owned();

        let s = config::Config::builder()
            .add_source(config::File::with_name(&file("default")))
            .add_source(config::File::with_name(&file(&run_mode)).required(false))
            // Not checked in
            .add_source(config::File::with_name(&file("local")).required(false))
            // Eg. `STEMPARK__SERVER__PORT=9000`
            .add_source(config::Environment::with_prefix("STEMPARK").separator("__"))
            .build()?;

        let config: Self = s.try_deserialize()?;
        config.media.check_public_prefix()?;
        Ok(config)
    }
}

impl MediaConfig {
    /// Media must be served under its own path segment
    fn check_public_prefix(&self) -> Result<(), config::ConfigError> {
        if self.public_prefix.trim().trim_matches('/').is_empty() {
            return Err(config::ConfigError::Message(format!(
                "media.public_prefix {:?} must name a path segment such as \"/uploads\"",
                self.public_prefix
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_load_layers_local_over_default() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("default.toml"),
            r#"
            [server]
            port = 8080

            [media]
            root_dir = "uploads"

            [catalog]
            low_stock_threshold = 3
            regions = [{ region = "Domestic", currency = "INR" }]
            "#,
        )
        .unwrap();
        fs::write(dir.path().join("local.toml"), "[server]\nport = 9090\n").unwrap();

        let config = Config::load_from(dir.path()).unwrap();
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.server.max_upload_bytes, 25 * 1024 * 1024);
        assert_eq!(config.media.public_prefix, "/uploads");
        assert_eq!(config.logging.filter, "info,tower_http=debug");

        let defaults = config.catalog.variant_defaults().unwrap();
        assert_eq!(defaults.low_stock_threshold, 3);
        assert_eq!(defaults.pricing.len(), 1);
    }

    #[test]
    fn test_catalog_section_is_optional() {
        let catalog = CatalogConfig::default();
        assert_eq!(catalog.variant_defaults().unwrap(), VariantDefaults::default());
    }

    #[test]
    fn test_bad_currency_is_rejected() {
        let catalog = CatalogConfig {
            regions: vec![PriceRegion {
                region: "Moon".into(),
                currency: "LUNA".into(),
            }],
            low_stock_threshold: 1,
        };
        assert!(catalog.variant_defaults().is_err());
    }

    #[test]
    fn test_root_media_prefix_is_rejected() {
        for prefix in ["/", "", " "] {
            let dir = tempfile::tempdir().unwrap();
            fs::write(
                dir.path().join("default.toml"),
                format!(
                    "[server]\nport = 8080\n\n[media]\nroot_dir = \"uploads\"\npublic_prefix = {:?}\n",
                    prefix
                ),
            )
            .unwrap();

            let err = Config::load_from(dir.path()).unwrap_err();
            assert!(err.to_string().contains("media.public_prefix"), "{}", err);
        }
    }

    #[test]
    fn test_missing_default_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Config::load_from(dir.path()).is_err());
    }
}
