use serde::Deserialize;
use skyfare_core::MarketSettings;
use skyfare_shared::Masked;
use std::env;

pub const ENV_PREFIX: &str = "SKYFARE";
pub const DEFAULT_BASE_URL: &str = "https://sky-scrapper.p.rapidapi.com";
pub const DEFAULT_HOST: &str = "sky-scrapper.p.rapidapi.com";

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub search: SearchDefaults,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: default_port() }
    }
}

fn default_port() -> u16 { 3000 }

#[derive(Debug, Deserialize, Clone)]
pub struct ProviderConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default)]
    pub api_key: Masked<String>,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            host: default_host(),
            api_key: Masked::default(),
        }
    }
}

fn default_base_url() -> String { DEFAULT_BASE_URL.to_string() }
fn default_host() -> String { DEFAULT_HOST.to_string() }

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SearchDefaults {
    /// Upper bound on itineraries requested per search.
    pub limit: u32,
    pub currency: String,
    pub market: String,
    pub country_code: String,
    pub locale: String,
}

impl Default for SearchDefaults {
    fn default() -> Self {
        let market = MarketSettings::default();
        Self {
            limit: 100,
            currency: market.currency,
            market: market.market,
            country_code: market.country_code,
            locale: market.locale,
        }
    }
}

impl SearchDefaults {
    pub fn market(&self) -> MarketSettings {
        MarketSettings {
            currency: self.currency.clone(),
            market: self.market.clone(),
            country_code: self.country_code.clone(),
            locale: self.locale.clone(),
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::build(config::Environment::with_prefix(ENV_PREFIX).separator("__"))
    }

    /// Layered load: `config/default` → `config/{RUN_MODE}` → `config/local` → environment.
    pub fn build(environment: config::Environment) -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // not checked in
            .add_source(config::File::with_name("config/local").required(false))
            // e.g. SKYFARE__PROVIDER__API_KEY=...
            .add_source(environment)
            .build()?;

        let config: Self = s.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Refuse to start without credentials rather than send unauthenticated requests.
    pub fn validate(&self) -> Result<(), config::ConfigError> {
        if self.provider.api_key.expose().trim().is_empty() {
            return Err(config::ConfigError::Message(format!(
                "provider API key is not configured; set {}__PROVIDER__API_KEY",
                ENV_PREFIX
            )));
        }

        url::Url::parse(&self.provider.base_url).map_err(|e| {
            config::ConfigError::Message(format!(
                "provider.base_url '{}' is not a valid URL: {}",
                self.provider.base_url, e
            ))
        })?;

        if self.search.limit == 0 {
            return Err(config::ConfigError::Message(
                "search.limit must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}
