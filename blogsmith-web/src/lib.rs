//! Product page acquisition.
//!
//! - [`fetch`]: one GET of the user-supplied URL with browser-like headers
//! - [`extract`]: HTML → [`ProductInfo`] with fixed placeholders for
//!   anything the page does not provide

pub mod extract;
pub mod fetch;

pub use extract::{DESCRIPTION_PLACEHOLDER, ExtractError, Extractor, ProductInfo, TITLE_PLACEHOLDER};
pub use fetch::{FetchError, FetchedPage, Fetcher};
