//! Log shipping destination.
//!
//! # Data Flow
//! ```text
//! ElasticSearchConfig + application/environment + UTC month
//!     → index.rs (index name, fails on missing URL)
//!     → sink.rs (URL, credentials, index layout)
//!     → external log transport
//! ```
//!
//! # Design Decisions
//! - A missing URL aborts startup of shipping; it never degrades silently
//! - Resolution is pure so it is testable without a clock

pub mod index;
pub mod sink;

use thiserror::Error;

pub use index::{current_utc_month, resolve_index_name};
pub use sink::{BasicAuth, SinkSettings};

#[derive(Debug, Error)]
pub enum ShippingError {
    #[error("missing required configuration value {key}")]
    MissingConfiguration { key: &'static str },

    #[error("invalid log backend URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}
