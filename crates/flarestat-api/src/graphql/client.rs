// Hand-written async client for the Cloudflare GraphQL analytics endpoint.
//
// Endpoint: https://api.cloudflare.com/client/v4/graphql
// Auth: `Authorization: Bearer <token>`

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use tracing::{debug, trace};
use url::Url;

use super::models::{GraphqlRequest, GraphqlResponse};
use super::queries::{DASHBOARD_QUERY, ROLLING_QUERY};
use super::variables::{DashboardVariables, RollingVariables};
use crate::error::Error;
use crate::transport::TransportConfig;

/// The fixed upstream analytics endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://api.cloudflare.com/client/v4/graphql";

/// Async client for the analytics GraphQL API.
///
/// Holds one `reqwest::Client` with the bearer header baked in. Every call
/// is a single POST; the `{ data, errors }` envelope is returned as-is so
/// callers can decide how much of a partially failed response to keep.
pub struct GraphqlClient {
    http: reqwest::Client,
    endpoint: Url,
    timeout_secs: Option<u64>,
}

impl GraphqlClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build from a bearer token and transport config.
    ///
    /// The token is marked sensitive so it never shows up in `Debug`
    /// output of the header map.
    pub fn from_token(
        endpoint: Url,
        token: &SecretString,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", token.expose_secret()))
            .map_err(|e| Error::Authentication {
                message: format!("invalid API token header value: {e}"),
            })?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);

        let http = transport.build_client_with_headers(headers)?;
        Ok(Self {
            http,
            endpoint,
            timeout_secs: Some(transport.timeout.as_secs()).filter(|secs| *secs > 0),
        })
    }

    /// Wrap an existing `reqwest::Client` (caller manages auth headers).
    pub fn from_reqwest(endpoint: Url, http: reqwest::Client) -> Self {
        Self {
            http,
            endpoint,
            timeout_secs: None,
        }
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    // ── Queries ──────────────────────────────────────────────────────

    /// Trailing today / week / month analytics in one round trip.
    pub async fn rolling_analytics(
        &self,
        variables: &RollingVariables,
    ) -> Result<GraphqlResponse, Error> {
        debug!(today = %variables.today_date, "querying rolling analytics");
        self.query(ROLLING_QUERY, variables).await
    }

    /// Today's dashboard totals and top-N breakdowns in one round trip.
    pub async fn dashboard_totals(
        &self,
        variables: &DashboardVariables,
    ) -> Result<GraphqlResponse, Error> {
        debug!(today = %variables.today_date, top = variables.top_limit, "querying dashboard totals");
        self.query(DASHBOARD_QUERY, variables).await
    }

    /// POST an arbitrary query document with variables.
    pub async fn query<V: Serialize + Sync>(
        &self,
        query: &str,
        variables: &V,
    ) -> Result<GraphqlResponse, Error> {
        debug!("POST {}", self.endpoint);

        let body = GraphqlRequest { query, variables };
        let resp = self
            .http
            .post(self.endpoint.clone())
            .json(&body)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        self.handle_response(resp).await
    }

    // ── Response handling ────────────────────────────────────────────

    fn map_send_error(&self, err: reqwest::Error) -> Error {
        if err.is_timeout() {
            Error::Timeout {
                timeout_secs: self.timeout_secs,
            }
        } else {
            Error::Transport(err)
        }
    }

    async fn handle_response(&self, resp: reqwest::Response) -> Result<GraphqlResponse, Error> {
        let status = resp.status();

        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN
        {
            return Err(Error::InvalidToken {
                status: status.as_u16(),
            });
        }

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = resp
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok())
                .unwrap_or(60);
            return Err(Error::RateLimited { retry_after_secs });
        }

        if !status.is_success() {
            let raw = resp.text().await.unwrap_or_default();
            let message = if raw.is_empty() {
                status.to_string()
            } else {
                raw.chars().take(200).collect()
            };
            return Err(Error::Http {
                status: status.as_u16(),
                message,
            });
        }

        let body = resp.text().await.map_err(|e| self.map_send_error(e))?;
        trace!(bytes = body.len(), "analytics response received");

        serde_json::from_str(&body).map_err(|e| {
            let preview: String = body.chars().take(200).collect();
            Error::Deserialization {
                message: format!("{e} (body preview: {preview:?})"),
                body,
            }
        })
    }
}
