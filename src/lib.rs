//! Validating client for the Stack Exchange `/2.2/search` endpoint.
//!
//! Raw search criteria are checked against a declarative schema
//! (allowed keys, types, permitted values, defaults, cross-field
//! rules), then sent as a single GET. The raw status code and body
//! come back as-is: the API reports bad queries with structured 4xx
//! bodies, so a non-2xx status is an inspectable result, never an
//! `Err`.
//!
//! ```no_run
//! use stackexchange_search::Search;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut search = Search::new(serde_json::json!({
//!     "tagged": "rust",
//!     "sort": "votes",
//! }))?;
//!
//! let body = search.run().await?;
//! let status = search.response().unwrap().status;
//! println!("HTTP {status}: {body}");
//! # Ok(())
//! # }
//! ```

mod error;
mod http;
mod options;
mod search;

pub use error::{Error, Result, TransportError};
pub use http::{HttpGet, HttpResponse, default_http_client};
pub use options::{OptionValue, SearchOptions};
pub use search::{API_URL, Search};
