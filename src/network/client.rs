//! HTTP client for making requests to search providers

use crate::config::OutgoingSettings;
use crate::providers::SearchContext;
use anyhow::{anyhow, Result};
use reqwest::{Client, RequestBuilder, Response};

/// HTTP client wrapper shared by providers
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
}

/// HTTP response from a provider request
#[derive(Debug)]
pub struct HttpResponse {
    /// HTTP status code
    pub status: u16,
    /// Response body as text
    pub text: String,
}

impl HttpResponse {
    /// Parse response as JSON
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_str(&self.text)?)
    }

    /// Check if response is successful (2xx)
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

impl HttpClient {
    /// Create a new HTTP client with default settings
    pub fn new() -> Result<Self> {
        Self::with_settings(&OutgoingSettings::default())
    }

    /// Create a new HTTP client with custom settings
    pub fn with_settings(settings: &OutgoingSettings) -> Result<Self> {
        let mut builder = Client::builder()
            .user_agent(settings.user_agent.clone())
            .gzip(true)
            .brotli(true);

        // SSL verification
        if !settings.verify_ssl {
            builder = builder.danger_accept_invalid_certs(true);
        }

        // Proxy settings
        if let Some(ref proxy_url) = settings.proxies.all {
            builder = builder.proxy(reqwest::Proxy::all(proxy_url)?);
        } else {
            if let Some(ref http) = settings.proxies.http {
                builder = builder.proxy(reqwest::Proxy::http(http)?);
            }
            if let Some(ref https) = settings.proxies.https {
                builder = builder.proxy(reqwest::Proxy::https(https)?);
            }
        }

        Ok(Self {
            client: builder.build()?,
        })
    }

    /// Start a GET request
    pub fn get(&self, url: &str) -> RequestBuilder {
        self.client.get(url)
    }

    /// Send a request bound to the given search context.
    ///
    /// The request is dropped as soon as the context is cancelled or its
    /// deadline passes.
    pub async fn send(&self, ctx: &SearchContext, request: RequestBuilder) -> Result<HttpResponse> {
        let request = request.timeout(ctx.remaining());

        tokio::select! {
            _ = ctx.done() => {
                if ctx.is_cancelled() {
                    Err(anyhow!("request canceled"))
                } else {
                    Err(anyhow!("request deadline exceeded"))
                }
            }
            response = request.send() => Self::parse_response(response?).await,
        }
    }

    /// Parse response into HttpResponse
    async fn parse_response(response: Response) -> Result<HttpResponse> {
        let status = response.status().as_u16();

        let text = response.text().await?;

        Ok(HttpResponse { status, text })
    }
}
