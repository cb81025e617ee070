//! Settings handed to the log-shipping transport.

use url::Url;

use crate::config::ElasticSearchConfig;
use crate::shipping::index::resolve_index_name;
use crate::shipping::ShippingError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasicAuth {
    pub username: String,
    pub password: String,
}

/// Resolved destination for shipped log records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SinkSettings {
    pub url: Url,
    pub index_name: String,
    pub credentials: Option<BasicAuth>,
    pub number_of_shards: u32,
    pub number_of_replicas: u32,
    pub auto_register_template: bool,
}

impl SinkSettings {
    /// Build sink settings. Fails on a missing or unparsable URL.
    pub fn from_config(
        config: &ElasticSearchConfig,
        application_name: &str,
        environment_name: &str,
        utc_month: &str,
    ) -> Result<Self, ShippingError> {
        let index_name =
            resolve_index_name(config, application_name, environment_name, utc_month)?;
        let url = Url::parse(config.url.trim())?;

        // Credentials are only used as a pair.
        let credentials = match (config.username.as_deref(), config.password.as_deref()) {
            (Some(username), Some(password)) if !username.is_empty() && !password.is_empty() => {
                Some(BasicAuth {
                    username: username.to_string(),
                    password: password.to_string(),
                })
            }
            _ => None,
        };

        Ok(Self {
            url,
            index_name,
            credentials,
            number_of_shards: 2,
            number_of_replicas: 1,
            auto_register_template: false,
        })
    }
}
