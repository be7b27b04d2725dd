// REST client for a remote Home Assistant hub.
//
// Wraps `reqwest::Client` with base-URL construction from the
// (host, TLS flag) pair, bearer authentication, and classification of
// every failure into the authentication / communication / API taxonomy.
// No retries happen here; retry policy belongs to the caller.

use reqwest::StatusCode;
use reqwest::header::{CONTENT_TYPE, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tracing::{debug, trace};
use url::Url;

use crate::error::Error;
use crate::models::EntityState;
use crate::transport::TransportConfig;

/// Raw HTTP client for a remote hub's REST API.
///
/// Cheap to clone: the underlying `reqwest::Client` is reference counted.
#[derive(Clone)]
pub struct RestClient {
    http: reqwest::Client,
    base_url: Url,
    token: SecretString,
}

impl std::fmt::Debug for RestClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestClient")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl RestClient {
    /// Create a client for `host` (e.g. `homeassistant.local:8123`).
    ///
    /// The scheme is derived from `ssl`: `https` when set, `http` otherwise.
    /// The host must not carry a scheme of its own.
    pub fn new(
        host: &str,
        token: SecretString,
        ssl: bool,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let base_url = base_url(host, ssl)?;
        let http = transport.build_client()?;
        Ok(Self::with_client(http, base_url, token))
    }

    /// Create a client with a pre-built `reqwest::Client` and base URL.
    pub fn with_client(http: reqwest::Client, base_url: Url, token: SecretString) -> Self {
        Self {
            http,
            base_url,
            token,
        }
    }

    /// The hub base URL (`{scheme}://{host}/`).
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── Endpoints ────────────────────────────────────────────────────

    /// Fetch one entity record: `GET /api/states/{entity_id}`.
    pub async fn get_state(&self, entity_id: &str) -> Result<EntityState, Error> {
        let url = self.api_url(&["states", entity_id])?;
        let state: EntityState = self.get(url).await?;
        trace!(entity_id, state = ?state.state, "fetched entity state");
        Ok(state)
    }

    /// Fetch every entity record: `GET /api/states`.
    pub async fn get_all_states(&self) -> Result<Vec<EntityState>, Error> {
        let url = self.api_url(&["states"])?;
        let states: Vec<EntityState> = self.get(url).await?;
        debug!(count = states.len(), "fetched all entity states");
        Ok(states)
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Build `{base}/api/{segments..}`, percent-encoding each segment.
    pub(crate) fn api_url(&self, segments: &[&str]) -> Result<Url, Error> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| Error::InvalidHost {
                host: self.base_url.to_string(),
                reason: "URL cannot be a base".into(),
            })?
            .pop_if_empty()
            .push("api")
            .extend(segments);
        Ok(url)
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Send an authenticated GET and decode the JSON body.
    async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, Error> {
        debug!("GET {}", url);

        let resp = self
            .http
            .get(url)
            .bearer_auth(self.token.expose_secret())
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .send()
            .await?;

        parse_response(resp).await
    }
}

/// Map the HTTP status onto the error taxonomy, then decode the body.
async fn parse_response<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, Error> {
    let status = resp.status();

    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(Error::Authentication {
            message: format!("invalid credentials (HTTP {})", status.as_u16()),
        });
    }

    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(Error::Status {
            status: status.as_u16(),
            message: preview(&body),
        });
    }

    let body = resp.text().await?;
    serde_json::from_str(&body).map_err(|e| Error::Deserialization {
        message: format!("{e} (body preview: {:?})", preview(&body)),
        body,
    })
}

/// Build the hub base URL from a scheme-less host and the TLS flag.
fn base_url(host: &str, ssl: bool) -> Result<Url, Error> {
    let host = host.trim().trim_end_matches('/');
    if host.is_empty() {
        return Err(Error::InvalidHost {
            host: host.to_owned(),
            reason: "host is empty".into(),
        });
    }
    if host.contains("://") {
        return Err(Error::InvalidHost {
            host: host.to_owned(),
            reason: "expected a host without scheme; use the TLS flag to select https".into(),
        });
    }

    let scheme = if ssl { "https" } else { "http" };
    Ok(Url::parse(&format!("{scheme}://{host}/"))?)
}

fn preview(body: &str) -> String {
    body.chars().take(200).collect()
}
