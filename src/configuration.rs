use std::time::Duration;

use serde_aux::field_attributes::deserialize_number_from_string;

use crate::services::orchestrator::RetryPolicy;
use crate::services::scraper::ScrapeLimits;

#[derive(serde::Deserialize, Clone)]
pub struct Settings {
    pub webdriver: WebDriverSettings,
    pub run: RunSettings,
}

#[derive(serde::Deserialize, Clone)]
pub struct WebDriverSettings {
    pub server_url: String,
}

#[derive(serde::Deserialize, Clone)]
pub struct RunSettings {
    pub output_dir: String,
    /// Fixed location tag for run metadata. When unset, the location is
    /// resolved via IP geolocation at startup.
    pub location: Option<String>,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub max_attempts: u32,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub retry_delay_secs: u64,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub target_delay_secs: u64,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub element_timeout_secs: u64,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub settle_delay_secs: u64,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub max_pages: u32,
    pub targets: Vec<String>,
}

impl RunSettings {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            retry_delay: Duration::from_secs(self.retry_delay_secs),
            target_delay: Duration::from_secs(self.target_delay_secs),
        }
    }

    pub fn scrape_limits(&self) -> ScrapeLimits {
        ScrapeLimits {
            element_timeout: Duration::from_secs(self.element_timeout_secs),
            settle_delay: Duration::from_secs(self.settle_delay_secs),
            max_pages: self.max_pages,
        }
    }
}

pub fn get_configuration() -> Result<Settings, config::ConfigError> {
    let base_path = std::env::current_dir().expect("Failed to determine the current directory");

    let settings = config::Config::builder()
        .add_source(config::File::from(base_path.join("configuration.yaml")))
        .add_source(
            config::Environment::with_prefix("PRICEWATCH")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    settings.try_deserialize::<Settings>()
}
