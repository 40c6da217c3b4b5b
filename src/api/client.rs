use chrono::Utc;
use http::HeaderMap;
use http::header::{ACCEPT, AUTHORIZATION, HeaderName, HeaderValue};
use serde::de::DeserializeOwned;

use crate::api::rate_limit::Pacer;
use crate::api::retry::{Disposition, RetryPolicy, classify, is_transient};
use crate::config::types::HttpSettings;
use crate::error::{ConfigError, ExportError, Service};

/// How a service expects its token.
#[derive(Clone)]
pub enum Auth {
    /// `Authorization: Bearer <token>`
    Bearer(String),
    /// A service-specific header carrying the raw token.
    Header { name: &'static str, token: String },
}

/// A JSON-over-HTTP client for one service: base URL, auth header, timeouts,
/// retry policy and optional request pacing.
pub struct ApiClient {
    service: Service,
    base_url: String,
    http: reqwest::Client,
    retry: RetryPolicy,
    pacer: Option<Pacer>,
}

impl ApiClient {
    pub fn new(
        service: Service,
        base_url: &str,
        auth: Auth,
        accept: &'static str,
        settings: &HttpSettings,
    ) -> Result<Self, ExportError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(accept));
        let (name, value) = match auth {
            Auth::Bearer(token) => (AUTHORIZATION, format!("Bearer {token}")),
            Auth::Header { name, token } => (HeaderName::from_static(name), token),
        };
        let mut value =
            HeaderValue::from_str(&value).map_err(|_| ConfigError::InvalidToken { service })?;
        value.set_sensitive(true);
        headers.insert(name, value);

        let http = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .connect_timeout(settings.connect_timeout())
            .timeout(settings.timeout())
            .build()
            .map_err(|source| ExportError::Transport {
                service,
                url: base_url.to_owned(),
                source,
            })?;

        Ok(Self {
            service,
            base_url: base_url.trim_end_matches('/').to_owned(),
            http,
            retry: RetryPolicy::from_settings(settings),
            pacer: None,
        })
    }

    pub fn with_pacer(mut self, pacer: Option<Pacer>) -> Self {
        self.pacer = pacer;
        self
    }

    pub fn service(&self) -> Service {
        self.service
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// GET and decode; a 404 is an error.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ExportError> {
        self.get_json_optional(path, query)
            .await?
            .ok_or_else(|| ExportError::Api {
                service: self.service,
                url: self.url(path),
                status: http::StatusCode::NOT_FOUND,
            })
    }

    /// GET and decode; a 404 yields `None`.
    pub async fn get_json_optional<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<Option<T>, ExportError> {
        let url = self.url(path);
        let Some(body) = self.fetch(&url, query).await? else {
            return Ok(None);
        };
        serde_json::from_str(&body)
            .map(Some)
            .map_err(|source| ExportError::Decode {
                service: self.service,
                url,
                source,
            })
    }

    /// Send a GET, retrying transient failures. Returns the body, or `None`
    /// on 404.
    async fn fetch(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<Option<String>, ExportError> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            if let Some(pacer) = &self.pacer {
                pacer.wait().await;
            }

            tracing::debug!(service = %self.service, %url, attempt, "GET");
            let (reason, wait_hint) = match self.http.get(url).query(query).send().await {
                Ok(response) => {
                    let status = response.status();
                    match classify(status, response.headers(), Utc::now()) {
                        Disposition::Success => match response.text().await {
                            Ok(body) => return Ok(Some(body)),
                            Err(err) if is_transient(&err) => (err.to_string(), None),
                            Err(source) => return Err(self.transport_error(url, source)),
                        },
                        Disposition::NotFound => return Ok(None),
                        Disposition::Unauthorized => {
                            return Err(ExportError::Auth {
                                service: self.service,
                                status,
                            });
                        }
                        Disposition::Reject => {
                            return Err(ExportError::Api {
                                service: self.service,
                                url: url.to_owned(),
                                status,
                            });
                        }
                        Disposition::Retry { wait_hint } => (format!("HTTP {status}"), wait_hint),
                    }
                }
                Err(err) if is_transient(&err) => (err.to_string(), None),
                Err(source) => return Err(self.transport_error(url, source)),
            };

            if attempt >= self.retry.max_attempts {
                return Err(self.transient_error(url, attempt, reason));
            }
            let Some(delay) = self.retry.delay(attempt, wait_hint) else {
                let reason = format!(
                    "{reason}; server asked to wait {}s",
                    wait_hint.unwrap_or_default().as_secs()
                );
                return Err(self.transient_error(url, attempt, reason));
            };

            tracing::warn!(
                service = %self.service,
                %url,
                attempt,
                delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                %reason,
                "request failed, retrying"
            );
            tokio::time::sleep(delay).await;
        }
    }

    fn transport_error(&self, url: &str, source: reqwest::Error) -> ExportError {
        ExportError::Transport {
            service: self.service,
            url: url.to_owned(),
            source,
        }
    }

    fn transient_error(&self, url: &str, attempts: u32, reason: String) -> ExportError {
        ExportError::TransientApi {
            service: self.service,
            url: url.to_owned(),
            attempts,
            reason,
        }
    }
}
