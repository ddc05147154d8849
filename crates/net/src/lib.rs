#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Network operations for polyenv
//!
//! Fetches remote content (the prebuilt artifact and the package manager
//! bootstrap script) over HTTP. Nothing here retries on its own.

mod client;

pub use client::{NetClient, NetConfig};

use async_trait::async_trait;
use polyenv_errors::{Error, NetworkError};
use url::Url;

/// Retrieves remote content by URL
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch the full body of `url`
    ///
    /// # Errors
    ///
    /// Returns a network error on transport failure or a non-success status.
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, Error>;
}

#[async_trait]
impl Fetcher for NetClient {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, Error> {
        validate_url(url)?;
        let response = self.get(url).await?;

        if !response.status().is_success() {
            return Err(NetworkError::HttpError {
                status: response.status().as_u16(),
                url: url.to_string(),
            }
            .into());
        }

        response
            .bytes()
            .await
            .map(|b| b.to_vec())
            .map_err(|e| NetworkError::DownloadFailed(e.to_string()).into())
    }
}

/// Parse and validate a URL, allowing only http and https
///
/// # Errors
///
/// Returns an error if the URL is malformed or uses another scheme.
pub fn validate_url(url: &str) -> Result<Url, Error> {
    let parsed = Url::parse(url).map_err(|e| NetworkError::InvalidUrl(e.to_string()))?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        other => Err(NetworkError::UnsupportedProtocol {
            protocol: other.to_string(),
        }
        .into()),
    }
}
