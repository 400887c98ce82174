//! qBittorrent Web API client implementation.

use std::{fmt, time::Duration};

use tracing::{Span, debug, error, info, info_span, warn};
use url::Url;

use qbt_types::{
    ApiError, ErrorDetail, ListOptions, RawProperties, RawTorrent, Rename, Result, TorrentFilter,
};

use crate::transport::{
    FilePart, HttpRequest, HttpResponse, HttpTransport, Method, ReqwestTransport,
};


/// Path of the versioned API root, relative to the base URL.
pub const API_ROOT: &str = "api/v2/";

/// Request timeout used by [`ApiClient::new`].
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Client for the qBittorrent Web API.
///
/// The client is either unauthenticated or authenticated. [`ApiClient::login`] moves it to
/// authenticated when the daemon issues a session cookie and [`ApiClient::logout`] moves it
/// back. Listing, properties and rename fail with [`ApiError::AuthenticationRequired`] while
/// unauthenticated, without touching the network.
pub struct ApiClient<T: HttpTransport = ReqwestTransport> {
    transport: T,
    base_url: Url,
    api_url: Url,
    authenticated: bool,
    span: Span,
}

impl ApiClient {
    /// Creates a client for the WebUI at `base_url`, e.g. `http://localhost:8080`.
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    /// Creates a client whose requests time out after `timeout`.
    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self> {
        let transport =
            ReqwestTransport::new(timeout).map_err(|e| ApiError::Client(e.to_string()))?;
        Self::with_transport(base_url, transport)
    }
}

impl<T: HttpTransport> ApiClient<T> {
    /// Creates a client that sends its requests through `transport`.
    pub fn with_transport(base_url: &str, transport: T) -> Result<Self> {
        let base_url = normalize_base_url(base_url)?;
        let api_url = base_url
            .join(API_ROOT)
            .map_err(|e| ApiError::InvalidUrl(e.to_string()))?;
        let span = info_span!("qbt_client", base_url = %base_url);

        Ok(Self {
            transport,
            base_url,
            api_url,
            authenticated: false,
            span,
        })
    }

    /// Replaces the span every operation is recorded under.
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// The base URL, always ending in `/`.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The versioned API root, `{base_url}api/v2/`.
    pub fn api_url(&self) -> &Url {
        &self.api_url
    }

    /// Whether the last login succeeded and no logout happened since.
    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    /// Logs in to the WebUI.
    ///
    /// Returns `false` when the daemon answers but issues no session cookie, which is how it
    /// rejects bad credentials. Transport and HTTP errors leave the state as it was.
    pub fn login(&mut self, username: &str, password: &str) -> Result<bool> {
        let _entered = self.span.enter();
        info!("Attempting to log in");

        let form = vec![
            ("username".to_string(), username.to_string()),
            ("password".to_string(), password.to_string()),
        ];
        let response = self
            .call(Method::Post, "auth/login", Vec::new(), form, Vec::new())
            .inspect_err(|e| error!("Login failed: {e}"))?;

        if response.cookies.is_empty() {
            warn!("Login request succeeded but no session cookie was received");
            self.authenticated = false;
            return Ok(false);
        }

        self.authenticated = true;
        info!("Successfully logged in");
        Ok(true)
    }

    /// Logs out of the WebUI.
    pub fn logout(&mut self) -> Result<bool> {
        let _entered = self.span.enter();
        info!("Logging out");

        self.call(Method::Post, "auth/logout", Vec::new(), Vec::new(), Vec::new())
            .inspect_err(|e| error!("Logout failed: {e}"))?;

        self.authenticated = false;
        info!("Successfully logged out");
        Ok(true)
    }

    /// Lists torrents matching `filter`, returning the records unmodified.
    pub fn list_torrents(
        &self,
        filter: TorrentFilter,
        options: &ListOptions,
    ) -> Result<Vec<RawTorrent>> {
        let _entered = self.span.enter();
        self.require_authenticated()?;
        info!("Getting torrents with filter: {filter}");

        let endpoint = "torrents/info";
        let response = self
            .call(
                Method::Get,
                endpoint,
                options.to_query(filter),
                Vec::new(),
                Vec::new(),
            )
            .inspect_err(|e| error!("Failed to get torrents: {e}"))?;
        let torrents: Vec<RawTorrent> = decode_json(Method::Get, endpoint, &response)?;

        info!("Retrieved {} torrents", torrents.len());
        Ok(torrents)
    }

    /// Gets the properties of the torrent identified by `hash`.
    pub fn get_properties(&self, hash: &str) -> Result<RawProperties> {
        let _entered = self.span.enter();
        self.require_authenticated()?;
        info!("Getting properties for torrent {hash}");

        let endpoint = "torrents/properties";
        let query = vec![("hash".to_string(), hash.to_string())];
        let response = self
            .call(Method::Get, endpoint, query, Vec::new(), Vec::new())
            .inspect_err(|e| error!("Failed to get torrent properties: {e}"))?;

        decode_json(Method::Get, endpoint, &response)
    }

    /// Renames the torrent identified by `hash`.
    ///
    /// The daemon does not echo the new name; callers holding a
    /// [`Torrent`](qbt_types::Torrent) should use [`Torrent::rename`](qbt_types::Torrent::rename)
    /// to keep it in sync.
    pub fn rename_torrent(&self, hash: &str, new_name: &str) -> Result<bool> {
        let _entered = self.span.enter();
        self.require_authenticated()?;
        info!("Renaming torrent {hash} to {new_name:?}");

        let form = vec![
            ("hash".to_string(), hash.to_string()),
            ("name".to_string(), new_name.to_string()),
        ];
        self.call(Method::Post, "torrents/rename", Vec::new(), form, Vec::new())
            .inspect_err(|e| error!("Failed to rename torrent: {e}"))?;

        Ok(true)
    }

    /// Uploads `.torrent` files, optionally filed under `category`.
    ///
    /// Each file is sent as a `torrents` multipart field. Returns `false` when the daemon
    /// answers `Fails.`, which it does when none of the files could be added.
    pub fn add_torrent_files(
        &self,
        files: Vec<FilePart>,
        category: Option<&str>,
    ) -> Result<bool> {
        let _entered = self.span.enter();
        self.require_authenticated()?;
        info!("Adding {} torrent files", files.len());

        let form = category
            .filter(|c| !c.is_empty())
            .map(|c| vec![("category".to_string(), c.to_string())])
            .unwrap_or_default();
        let response = self
            .call(Method::Post, "torrents/add", Vec::new(), form, files)
            .inspect_err(|e| error!("Failed to add torrents: {e}"))?;

        let added = response.body.trim() != "Fails.";
        if !added {
            warn!("The daemon rejected every uploaded torrent file");
        }
        Ok(added)
    }

    /// Gets the qBittorrent application version, e.g. `v4.6.2`.
    pub fn get_app_version(&self) -> Result<String> {
        let _entered = self.span.enter();
        let response = self
            .call(Method::Get, "app/version", Vec::new(), Vec::new(), Vec::new())
            .inspect_err(|e| error!("Failed to get application version: {e}"))?;

        let version = response.body.trim().to_string();
        info!("qBittorrent version: {version}");
        Ok(version)
    }

    /// Gets the Web API version, e.g. `2.9.3`.
    pub fn get_api_version(&self) -> Result<String> {
        let _entered = self.span.enter();
        let response = self
            .call(
                Method::Get,
                "app/webapiVersion",
                Vec::new(),
                Vec::new(),
                Vec::new(),
            )
            .inspect_err(|e| error!("Failed to get API version: {e}"))?;

        let version = response.body.trim().to_string();
        info!("qBittorrent Web API version: {version}");
        Ok(version)
    }

    fn require_authenticated(&self) -> Result<()> {
        if self.authenticated {
            Ok(())
        } else {
            error!("Not authenticated, log in first");
            Err(ApiError::AuthenticationRequired)
        }
    }

    /// Sends one request to `endpoint` and maps every failure to
    /// [`ApiError::RequestFailed`]. A non-empty `files` turns the body into multipart.
    fn call(
        &self,
        method: Method,
        endpoint: &str,
        query: Vec<(String, String)>,
        form: Vec<(String, String)>,
        files: Vec<FilePart>,
    ) -> Result<HttpResponse> {
        let url = self
            .api_url
            .join(endpoint)
            .map_err(|e| ApiError::InvalidUrl(e.to_string()))?;
        debug!("Making {method} request to {url}");

        let request = HttpRequest {
            method,
            url,
            referer: self.base_url.to_string(),
            query,
            form,
            files,
        };

        let response = self.transport.send(&request).map_err(|e| {
            error!("Request failed: {e}");
            ApiError::request_failed(method.as_str(), endpoint, ErrorDetail::Text(e.to_string()))
        })?;

        if !response.is_success() {
            error!(status = response.status, "Request to {endpoint} failed");
            return Err(ApiError::request_failed(
                method.as_str(),
                endpoint,
                ErrorDetail::from_body(&response.body),
            ));
        }

        Ok(response)
    }
}

impl<T: HttpTransport> Rename for ApiClient<T> {
    fn rename_torrent(&self, hash: &str, new_name: &str) -> Result<bool> {
        ApiClient::rename_torrent(self, hash, new_name)
    }
}

impl<T: HttpTransport> fmt::Debug for ApiClient<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url.as_str())
            .field("api_url", &self.api_url.as_str())
            .field("authenticated", &self.authenticated)
            .finish_non_exhaustive()
    }
}

/// Parses `base_url` and makes sure it ends in `/` so that joins keep its path.
fn normalize_base_url(base_url: &str) -> Result<Url> {
    let mut normalized = base_url.trim().to_string();
    if !normalized.ends_with('/') {
        normalized.push('/');
    }

    let url = Url::parse(&normalized)
        .map_err(|e| ApiError::InvalidUrl(format!("{base_url}: {e}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ApiError::InvalidUrl(format!(
            "{base_url}: expected an http or https URL"
        )));
    }
    Ok(url)
}

fn decode_json<D: serde::de::DeserializeOwned>(
    method: Method,
    endpoint: &str,
    response: &HttpResponse,
) -> Result<D> {
    serde_json::from_str(&response.body).map_err(|e| {
        error!("Invalid JSON from {endpoint}: {e}");
        ApiError::request_failed(
            method.as_str(),
            endpoint,
            ErrorDetail::Text(format!("invalid JSON response: {e}")),
        )
    })
}
