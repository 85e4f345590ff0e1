use blogsmith_config::FetchConfig;
use blogsmith_http::{HttpClient, HttpError, RequestOpts};
use bytes::Bytes;
use reqwest::header::{ACCEPT_LANGUAGE, HeaderMap, HeaderValue, USER_AGENT};
use std::time::Duration;
use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid product URL `{url}`: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("invalid fetch header: {0}")]
    Header(String),

    #[error("failed to fetch {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: HttpError,
    },
}

/// The page as it came off the wire. The status is informational only.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub url: Url,
    pub final_url: Url,
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Bytes,
}

/// Issues exactly one GET per call. No retries, no status checks.
#[derive(Clone)]
pub struct Fetcher {
    http: HttpClient,
    headers: HeaderMap,
}

impl Fetcher {
    /// ```
    /// use blogsmith_config::FetchConfig;
    /// use blogsmith_web::Fetcher;
    ///
    /// let fetcher = Fetcher::new(&FetchConfig::default()).expect("default headers are valid");
    /// # let _ = fetcher;
    /// ```
    pub fn new(cfg: &FetchConfig) -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, header_value(&cfg.user_agent)?);
        headers.insert(ACCEPT_LANGUAGE, header_value(&cfg.accept_language)?);

        let http = HttpClient::unanchored()
            .map_err(|e| FetchError::Header(e.to_string()))?
            .with_timeout(Duration::from_secs(cfg.timeout_secs));

        Ok(Self { http, headers })
    }

    pub async fn fetch(&self, raw_url: &str) -> Result<FetchedPage, FetchError> {
        let url = parse_product_url(raw_url)?;

        let opts = RequestOpts {
            headers: Some(self.headers.clone()),
            ..Default::default()
        };
        let resp = self
            .http
            .get_raw(url.as_str(), opts)
            .await
            .map_err(|source| FetchError::Transport {
                url: url.to_string(),
                source,
            })?;

        if !resp.status.is_success() {
            tracing::warn!(
                url=%url,
                status=%resp.status,
                "fetch.non_success_status"
            );
        }
        tracing::info!(
            url=%url,
            final_url=%resp.final_url,
            status=resp.status.as_u16(),
            body_len=resp.body.len(),
            "fetch.done"
        );

        Ok(FetchedPage {
            url,
            final_url: resp.final_url,
            status: resp.status.as_u16(),
            content_type: resp.content_type,
            body: resp.body,
        })
    }
}

fn header_value(raw: &str) -> Result<HeaderValue, FetchError> {
    HeaderValue::from_str(raw).map_err(|e| FetchError::Header(format!("{raw:?}: {e}")))
}

/// Only absolute `http`/`https` URLs are fetched.
pub fn parse_product_url(raw: &str) -> Result<Url, FetchError> {
    let trimmed = raw.trim();
    let invalid = |reason: String| FetchError::InvalidUrl {
        url: trimmed.to_string(),
        reason,
    };
    let url = Url::parse(trimmed).map_err(|e| invalid(e.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(invalid(format!("unsupported scheme `{other}`"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_http_and_https() {
        assert!(parse_product_url("https://example.com/widget").is_ok());
        assert!(parse_product_url("  http://example.com/w?ref=aff ").is_ok());
    }

    #[test]
    fn rejects_relative_and_non_http_urls() {
        assert!(matches!(
            parse_product_url("example.com/widget"),
            Err(FetchError::InvalidUrl { .. })
        ));
        assert!(matches!(
            parse_product_url("file:///etc/passwd"),
            Err(FetchError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn bad_header_config_is_rejected() {
        let cfg = FetchConfig {
            user_agent: "bad\nagent".into(),
            ..FetchConfig::default()
        };
        assert!(matches!(Fetcher::new(&cfg), Err(FetchError::Header(_))));
    }
}
