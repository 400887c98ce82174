//! # Blocking client for the qBittorrent Web API.
//!
//! usage:
//!
//! ```rust,ignore
//! use qbt_client::{ApiClient, CredentialsManager};
//! use qbt_types::{ListOptions, Torrent, TorrentFilter};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let credentials = CredentialsManager::new().resolve(None, Some("admin"), None);
//!     let mut client = ApiClient::new(&credentials.url)?;
//!     client.login("admin", credentials.password.as_deref().unwrap_or_default())?;
//!
//!     let options = ListOptions::new().sort("added_on").limit(10);
//!     for raw in client.list_torrents(TorrentFilter::Downloading, &options)? {
//!         println!("{}", Torrent::new(raw));
//!     }
//!
//!     client.logout()?;
//!     Ok(())
//! }
//! ```
//!

mod client;
mod credentials;
mod transport;

#[cfg(test)]
mod testutil;

pub use client::{API_ROOT, ApiClient, DEFAULT_TIMEOUT};
pub use credentials::{CachedCredentials, CredentialsManager, DEFAULT_URL, ResolvedCredentials};
pub use transport::{
    FilePart, HttpRequest, HttpResponse, HttpTransport, Method, ReqwestTransport, TransportError,
};

#[cfg(test)]
use test_log as _;
