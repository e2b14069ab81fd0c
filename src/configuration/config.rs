#[cfg(test)]
#[path = "config_test.rs"]
mod tests;

use std::env;

use dashmap::DashMap;
use once_cell::sync::Lazy;
use strum::EnumIter;
use strum::IntoEnumIterator;

static CONFIG: Lazy<DashMap<String, String>> = Lazy::new(DashMap::new);

/// Prefix for environment variable overrides, e.g. `QCHAT_API_KEY` overrides
/// [`ConfigKey::ApiKey`].
const ENV_PREFIX: &str = "QCHAT";

#[derive(Clone, Copy, Eq, PartialEq, EnumIter, strum::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum ConfigKey {
    ApiBaseURL,
    ApiKey,
    DefaultHostedModel,
    DefaultLocalModel,
    HealthCheckInterval,
    HealthCheckTimeout,
    Username,
}

impl ConfigKey {
    fn env_var(&self) -> String {
        return format!(
            "{ENV_PREFIX}_{key}",
            key = self.to_string().replace('-', "_").to_uppercase()
        );
    }
}

pub struct Config {}

impl Config {
    pub fn get(key: ConfigKey) -> String {
        if let Some(val) = CONFIG.get(&key.to_string()) {
            return val.to_string();
        }

        return "".to_string();
    }

    pub fn set(key: ConfigKey, value: &str) {
        CONFIG.insert(key.to_string(), value.to_string());
    }

    pub fn default(key: ConfigKey) -> String {
        if key == ConfigKey::Username {
            let mut user = env::var("USER").unwrap_or_else(|_| return "".to_string());
            if user.is_empty() {
                user = "User".to_string();
            }

            return user;
        }

        let res = match key {
            ConfigKey::ApiBaseURL => "http://localhost:3000",
            ConfigKey::ApiKey => "",
            ConfigKey::DefaultHostedModel => "",
            ConfigKey::DefaultLocalModel => "",
            ConfigKey::HealthCheckInterval => "30000",
            ConfigKey::HealthCheckTimeout => "5000",
            ConfigKey::Username => "",
        };

        return res.to_string();
    }

    /// Seeds every key with its default, then applies `QCHAT_*` environment
    /// variable overrides. Empty overrides are ignored.
    pub fn load() {
        for key in ConfigKey::iter() {
            Config::set(key, &Config::default(key));

            if let Ok(val) = env::var(key.env_var()) {
                if !val.is_empty() {
                    Config::set(key, &val);
                }
            }
        }

        tracing::debug!(
            username = Config::get(ConfigKey::Username),
            api_base_url = Config::get(ConfigKey::ApiBaseURL),
            default_local_model = Config::get(ConfigKey::DefaultLocalModel),
            default_hosted_model = Config::get(ConfigKey::DefaultHostedModel),
            "config"
        );
    }
}
