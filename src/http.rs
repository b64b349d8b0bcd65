use std::time::Duration;

use async_trait::async_trait;
use reqwest::{
    header::{HeaderMap, HeaderValue, CONTENT_TYPE},
    Method,
};

use crate::{
    config::{Config, TokenKind},
    error::TransportError,
};

/// Carries a request to the API and hands back the raw response body.
///
/// Anything other than a 2xx response is a failure. Status codes are not
/// interpreted any further.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transport: Send + Sync {
    async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<Vec<u8>>,
    ) -> Result<Vec<u8>, TransportError>;
}

pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(
        base_url: &str,
        token: &str,
        token_kind: TokenKind,
        timeout: Duration,
    ) -> Result<Self, TransportError> {
        let mut headers = HeaderMap::new();
        let mut token = HeaderValue::from_str(token).map_err(|_| TransportError::InvalidToken)?;
        token.set_sensitive(true);
        headers.insert(token_kind.header(), token);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &Config, token: &str) -> Result<Self, TransportError> {
        Self::new(
            config.api_url(),
            token,
            config.token_kind,
            Duration::from_secs(config.timeout_secs),
        )
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<Vec<u8>>,
    ) -> Result<Vec<u8>, TransportError> {
        let url = format!("{}{path}", self.base_url);
        tracing::debug!(%method, %url, "sending request");

        let mut builder = self.client.request(method.clone(), &url);
        if let Some(body) = body {
            builder = builder.header(CONTENT_TYPE, "application/json").body(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;

        tracing::debug!(%method, %url, %status, len = bytes.len(), "received response");

        if !status.is_success() {
            return Err(TransportError::Status {
                status,
                body: String::from_utf8_lossy(&bytes).into_owned(),
            });
        }

        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_builds_from_config() {
        let config = Config {
            api_url: "https://api.example.org/".to_string(),
            ..Config::default()
        };
        assert!(HttpTransport::from_config(&config, "token").is_ok());
    }

    #[test]
    fn token_with_newline_is_rejected() {
        let result = HttpTransport::new(
            "https://api.example.org",
            "bad\ntoken",
            TokenKind::User,
            Duration::from_secs(5),
        );
        assert!(matches!(result, Err(TransportError::InvalidToken)));
    }
}
