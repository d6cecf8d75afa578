pub mod error;
#[cfg(test)]
pub mod fake;
pub mod fetcher;
pub mod http;
pub mod payloads;
#[cfg(test)]
mod tests;

pub use error::FetchError;
#[cfg(test)]
pub use fake::FakeFetcher;
pub use fetcher::{fetch_image, FetchedImage, Fetcher, RawResponse};
pub use http::HttpFetcher;
