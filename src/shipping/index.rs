//! Index name resolution for the log backend.
//!
//! The name is partitioned by service, environment and UTC calendar month, so
//! a new index is used automatically when the month rolls over.

use chrono::Utc;

use crate::config::ElasticSearchConfig;
use crate::shipping::ShippingError;

/// Configuration key reported when the backend URL is missing.
pub const URL_KEY: &str = "ElasticSearch:Url";

/// Current UTC month as `YYYY-MM`.
pub fn current_utc_month() -> String {
    Utc::now().format("%Y-%m").to_string()
}

/// Resolve the index name.
///
/// `utc_month` is expected in `YYYY-MM` form (see [`current_utc_month`]).
pub fn resolve_index_name(
    config: &ElasticSearchConfig,
    application_name: &str,
    environment_name: &str,
    utc_month: &str,
) -> Result<String, ShippingError> {
    if config.url.trim().is_empty() {
        return Err(ShippingError::MissingConfiguration { key: URL_KEY });
    }

    let base = match non_empty(config.index_format.as_deref()) {
        Some(format) => format.to_string(),
        None => format!(
            "{}-{}-{}",
            application_name.to_lowercase().replace('.', "-"),
            environment_name.to_lowercase(),
            utc_month
        ),
    };

    Ok(match non_empty(config.index_prefix.as_deref()) {
        Some(prefix) => format!("{}-{}", prefix.replace('.', "").to_lowercase(), base),
        None => base,
    })
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
