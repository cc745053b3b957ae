pub mod app_config;
pub mod sky_scrapper;

pub use app_config::{AppConfig, ProviderConfig, SearchDefaults};
pub use sky_scrapper::{ClientError, SkyScrapperClient};
