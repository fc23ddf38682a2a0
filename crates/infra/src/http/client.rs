//! HTTP client with built-in retry and timeout support.
//!
//! Every outbound call in this crate (sheet source, Telegram, Bitrix) goes
//! through this client. Server errors and transport failures are retried
//! with exponential backoff; requests whose body cannot be cloned (e.g.
//! multipart uploads) are executed once without retries.

use std::time::Duration;

use opspulse_domain::{OpsPulseError, Result};
use reqwest::{Client as ReqwestClient, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::errors::InfraError;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_MAX_ATTEMPTS: usize = 3;
const DEFAULT_BASE_BACKOFF: Duration = Duration::from_millis(200);

/// Retrying HTTP client shared by all adapters.
#[derive(Clone)]
pub struct HttpClient {
    client: ReqwestClient,
    max_attempts: usize,
    base_backoff: Duration,
}

impl HttpClient {
    /// Start building a new HTTP client.
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::default()
    }

    /// Convenience constructor with default configuration.
    pub fn new() -> Result<Self> {
        Self::builder().build()
    }

    /// Create a request builder using the underlying reqwest client.
    pub fn request<U>(&self, method: Method, url: U) -> RequestBuilder
    where
        U: reqwest::IntoUrl,
    {
        self.client.request(method, url)
    }

    /// Execute the provided request builder with retry semantics.
    ///
    /// Retries server errors (5xx) and transient transport failures up to
    /// the configured attempt budget. Non-cloneable requests run once.
    pub async fn send(&self, builder: RequestBuilder) -> Result<Response> {
        let attempts = self.max_attempts.max(1);

        for attempt in 1..=attempts {
            let this_try = match builder.try_clone() {
                Some(cloned) => cloned,
                // Streaming/multipart bodies cannot be replayed.
                None if attempt == 1 => {
                    return builder.send().await.map_err(to_domain);
                }
                None => break,
            };

            debug!(attempt, "sending HTTP request");
            match this_try.send().await {
                Ok(response) => {
                    let status = response.status();
                    debug!(attempt, %status, "received HTTP response");
                    if status.is_server_error() && attempt < attempts {
                        self.sleep_with_backoff(attempt).await;
                        continue;
                    }
                    return Ok(response);
                }
                Err(err) => {
                    debug!(attempt, error = %err, "HTTP request failed");
                    if attempt < attempts && is_retryable(&err) {
                        self.sleep_with_backoff(attempt).await;
                        continue;
                    }
                    return Err(to_domain(err));
                }
            }
        }

        Err(OpsPulseError::Internal(
            "http client exhausted retries without producing a result".into(),
        ))
    }

    /// GET a JSON endpoint and deserialize the body.
    ///
    /// Non-success statuses become `Network` errors carrying the status.
    pub async fn get_json<T, U>(&self, url: U) -> Result<T>
    where
        T: DeserializeOwned,
        U: reqwest::IntoUrl,
    {
        let response = self.send(self.request(Method::GET, url)).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(OpsPulseError::Network(format!("unexpected HTTP status {status}")));
        }
        response.json::<T>().await.map_err(to_domain)
    }

    async fn sleep_with_backoff(&self, retry_number: usize) {
        let shift = retry_number.saturating_sub(1).min(8) as u32;
        let delay = self.base_backoff.saturating_mul(1u32 << shift);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}

/// Builder for [`HttpClient`].
#[derive(Debug)]
pub struct HttpClientBuilder {
    timeout: Duration,
    max_attempts: usize,
    base_backoff: Duration,
    user_agent: Option<String>,
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_backoff: DEFAULT_BASE_BACKOFF,
            user_agent: None,
        }
    }
}

impl HttpClientBuilder {
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Configure the total number of attempts (initial try + retries).
    pub fn max_attempts(mut self, attempts: usize) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    pub fn base_backoff(mut self, backoff: Duration) -> Self {
        self.base_backoff = backoff;
        self
    }

    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    pub fn build(self) -> Result<HttpClient> {
        let mut builder = ReqwestClient::builder().timeout(self.timeout).no_proxy();
        if let Some(agent) = self.user_agent {
            builder = builder.user_agent(agent);
        }

        let client = builder.build().map_err(to_domain)?;
        Ok(HttpClient {
            client,
            max_attempts: self.max_attempts.max(1),
            base_backoff: self.base_backoff,
        })
    }
}

fn is_retryable(err: &reqwest::Error) -> bool {
    err.is_timeout() || err.is_connect() || err.is_request()
}

fn to_domain(err: reqwest::Error) -> OpsPulseError {
    let infra: InfraError = err.into();
    infra.into()
}

#[cfg(test)]
mod tests {
    use std::net::TcpListener;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use reqwest::StatusCode;
    use serde::Deserialize;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn client() -> HttpClient {
        HttpClient::builder()
            .base_backoff(Duration::from_millis(10))
            .max_attempts(3)
            .build()
            .expect("http client")
    }

    #[tokio::test]
    async fn success_needs_a_single_attempt() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .expect(1)
            .mount(&server)
            .await;

        let response = client().send(client().request(Method::GET, server.uri())).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn server_errors_are_retried_until_success() {
        let server = MockServer::start().await;
        let attempts = Arc::new(AtomicUsize::new(0));
        let counter = attempts.clone();
        Mock::given(method("GET"))
            .respond_with(move |_req: &wiremock::Request| {
                if counter.fetch_add(1, Ordering::SeqCst) < 2 {
                    ResponseTemplate::new(500)
                } else {
                    ResponseTemplate::new(200)
                }
            })
            .expect(3)
            .mount(&server)
            .await;

        let response = client().send(client().request(Method::GET, server.uri())).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn client_errors_are_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;

        let response = client().send(client().request(Method::GET, server.uri())).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn connection_refused_surfaces_a_network_error() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener); // release the port so requests fail with ECONNREFUSED

        let url = format!("http://{addr}");
        let result = client().send(client().request(Method::GET, &url)).await;
        assert!(matches!(result, Err(OpsPulseError::Network(_))));
    }

    #[tokio::test]
    async fn get_json_deserializes_the_body() {
        #[derive(Deserialize)]
        struct Payload {
            value: u32,
        }

        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"value": 7})))
            .mount(&server)
            .await;

        let payload: Payload = client().get_json(server.uri()).await.unwrap();
        assert_eq!(payload.value, 7);
    }

    #[tokio::test]
    async fn get_json_rejects_error_statuses() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let result: Result<serde_json::Value> = client().get_json(server.uri()).await;
        assert!(matches!(result, Err(OpsPulseError::Network(_))));
    }
}
