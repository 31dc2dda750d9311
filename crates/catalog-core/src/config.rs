use anyhow::Result;
use config::Config;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub catalog: CatalogConfig,
    pub search: SearchConfig,
    pub logging: LoggingConfig,
}

/// Page sizes used when talking to the catalog collaborators.
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogConfig {
    /// Sub-families fetched per page of an expanded family row.
    pub child_page_size: u32,
    /// Families fetched per page of the top-level table.
    pub family_page_size: u32,
    /// Page size used when loading a reference snapshot.
    pub reference_page_size: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfig {
    pub debounce_ms: u64,
}

impl SearchConfig {
    #[must_use]
    pub const fn debounce(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.debounce_ms)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            catalog: CatalogConfig {
                child_page_size: 5,
                family_page_size: 10,
                reference_page_size: 100,
            },
            search: SearchConfig { debounce_ms: 300 },
            logging: LoggingConfig {
                level: "info".to_string(),
            },
        }
    }
}

impl Settings {
    /// ## Summary
    /// Builds `Settings` from defaults, then environment variables
    /// (`CATALOG__CHILD_PAGE_SIZE` style), then an optional `config.toml`.
    ///
    /// ## Errors
    /// Returns an error if building the configuration or deserializing it fails.
    pub fn load() -> Result<Self> {
        let defaults = Self::default();

        Ok(Config::builder()
            .set_default("catalog.child_page_size", defaults.catalog.child_page_size)?
            .set_default("catalog.family_page_size", defaults.catalog.family_page_size)?
            .set_default(
                "catalog.reference_page_size",
                defaults.catalog.reference_page_size,
            )?
            .set_default("search.debounce_ms", defaults.search.debounce_ms)?
            .set_default("logging.level", defaults.logging.level)?
            // Environment
            .add_source(
                config::Environment::default()
                    .convert_case(config::Case::Snake)
                    .separator("__")
                    .ignore_empty(true)
                    .try_parsing(true),
            )
            // TOML file
            .add_source(config::File::with_name("config.toml").required(false))
            .build()?
            .try_deserialize::<Settings>()?
            .validated()?)
    }

    /// ## Summary
    /// Rejects settings no collaborator can honour (zero page sizes).
    ///
    /// ## Errors
    /// Returns `ConfigError` naming the offending key.
    pub fn validated(self) -> crate::error::CoreResult<Self> {
        let sizes = [
            ("catalog.child_page_size", self.catalog.child_page_size),
            ("catalog.family_page_size", self.catalog.family_page_size),
            ("catalog.reference_page_size", self.catalog.reference_page_size),
        ];
        if let Some((key, _)) = sizes.iter().find(|(_, size)| *size == 0) {
            return Err(crate::error::CoreError::ConfigError(format!(
                "{key} must be at least 1"
            )));
        }
        Ok(self)
    }
}

/// ## Summary
/// Loads configuration from environment variables and `.env` file.
///
/// ## Errors
/// Returns an error if loading or deserializing the configuration fails.
pub fn load_config() -> Result<Settings> {
    dotenvy::dotenv().ok();

    Settings::load()
}
