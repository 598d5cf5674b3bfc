//! Download receipt pages over HTTPS.
//!
//! One GET per call: no retry, no backoff, no cache. The body is returned
//! for any status code, since the provider serves its error pages as HTML
//! and the extractor simply finds nothing in them.

use std::time::Duration;

use url::Url;

use crate::extract::parse_from_html;
use crate::types::{Fields, ReceiptError, ReceiptResult};

/// Public receipt endpoint; the receipt number is appended to it.
pub const DEFAULT_BASE_URL: &str = "https://transactioninfo.ethiotelecom.et/receipt/";

const USER_AGENT: &str = concat!("telebirr-receipt/", env!("CARGO_PKG_VERSION"));

/// Where to load a receipt from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReceiptSource {
    /// Receipt number from the payment SMS, joined onto the base URL.
    Number(String),
    /// Any fully-qualified receipt URL.
    Url(String),
}

impl ReceiptSource {
    /// Pick a source from optional parts. The receipt number wins when both
    /// are given.
    pub fn from_parts(receipt_no: Option<&str>, full_url: Option<&str>) -> ReceiptResult<Self> {
        match (receipt_no, full_url) {
            (Some(no), _) if !no.trim().is_empty() => Ok(Self::Number(no.trim().to_string())),
            (_, Some(url)) if !url.trim().is_empty() => Ok(Self::Url(url.trim().to_string())),
            _ => Err(ReceiptError::MissingSource),
        }
    }

    /// Resolve to the URL that will be requested.
    ///
    /// A receipt number is always appended as a single percent-encoded path
    /// segment under the base URL, never interpreted as a URL reference.
    pub fn resolve(&self, base_url: &str) -> ReceiptResult<Url> {
        match self {
            Self::Number(no) => {
                if no.is_empty() || no == "." || no == ".." {
                    return Err(ReceiptError::InvalidField(format!(
                        "invalid receipt number: {no:?}"
                    )));
                }
                let mut url = Url::parse(base_url)?;
                url.path_segments_mut()
                    .map_err(|_| ReceiptError::CannotBeBase(base_url.to_string()))?
                    .pop_if_empty()
                    .push(no);
                Ok(url)
            }
            Self::Url(url) => Ok(Url::parse(url)?),
        }
    }
}

/// Fetcher settings.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub base_url: String,
    /// Skip TLS certificate validation for this fetcher only.
    ///
    /// The provider has served incomplete certificate chains in the past.
    /// Leave this off unless that is the problem being worked around.
    pub accept_invalid_certs: bool,
    /// Whole-request timeout. `None` waits for as long as the server does.
    pub timeout: Option<Duration>,
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            accept_invalid_certs: false,
            timeout: None,
            user_agent: USER_AGENT.to_string(),
        }
    }
}

/// HTTP client for receipt pages.
#[derive(Clone)]
pub struct ReceiptFetcher {
    client: reqwest::Client,
    config: FetchConfig,
}

impl ReceiptFetcher {
    pub fn new(config: FetchConfig) -> ReceiptResult<Self> {
        let mut builder = reqwest::Client::builder().user_agent(config.user_agent.as_str());
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        if config.accept_invalid_certs {
            tracing::warn!("TLS certificate validation disabled for receipt fetches");
            builder = builder.danger_accept_invalid_certs(true);
        }
        let client = builder.build()?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    /// Fetch the raw page for a receipt.
    pub async fn fetch(&self, source: &ReceiptSource) -> ReceiptResult<String> {
        let url = source.resolve(&self.config.base_url)?;
        tracing::info!(%url, "fetching receipt");

        let resp = self.client.get(url.clone()).send().await?;
        let status = resp.status();
        if !status.is_success() {
            tracing::warn!(%url, status = status.as_u16(), "receipt page returned non-success status");
        }

        let body = resp.text().await?;
        tracing::info!(%url, bytes = body.len(), "receipt fetched");
        Ok(body)
    }

    /// Fetch a receipt and extract its fields.
    pub async fn fetch_fields(&self, source: &ReceiptSource) -> ReceiptResult<Fields> {
        let html = self.fetch(source).await?;
        Ok(parse_from_html(&html))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_prefers_receipt_number() {
        let src = ReceiptSource::from_parts(Some("CE1"), Some("https://x.test/r")).unwrap();
        assert_eq!(src, ReceiptSource::Number("CE1".into()));
    }

    #[test]
    fn test_source_falls_back_to_url() {
        let src = ReceiptSource::from_parts(Some("  "), Some("https://x.test/r")).unwrap();
        assert_eq!(src, ReceiptSource::Url("https://x.test/r".into()));
    }

    #[test]
    fn test_source_missing() {
        assert!(matches!(
            ReceiptSource::from_parts(None, None),
            Err(ReceiptError::MissingSource)
        ));
    }

    #[test]
    fn test_resolve_number_against_default_base() {
        let url = ReceiptSource::Number("CE12345678".into())
            .resolve(DEFAULT_BASE_URL)
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://transactioninfo.ethiotelecom.et/receipt/CE12345678"
        );
    }

    #[test]
    fn test_resolve_number_adds_missing_slash() {
        let url = ReceiptSource::Number("AB1".into())
            .resolve("http://127.0.0.1:8080/receipt")
            .unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:8080/receipt/AB1");
    }

    #[test]
    fn test_resolve_number_stays_under_base() {
        for no in ["//evil.example/x", "../admin", "http://evil.example/r", "a/b?c#d"] {
            let url = ReceiptSource::Number(no.into())
                .resolve(DEFAULT_BASE_URL)
                .unwrap();
            assert_eq!(url.scheme(), "https", "{no}");
            assert_eq!(url.host_str(), Some("transactioninfo.ethiotelecom.et"), "{no}");
            assert!(url.path().starts_with("/receipt/"), "{no} -> {url}");
            assert_eq!(url.path_segments().unwrap().count(), 2, "{no} -> {url}");
            assert!(url.query().is_none(), "{no} -> {url}");
            assert!(url.fragment().is_none(), "{no} -> {url}");
        }
    }

    #[test]
    fn test_resolve_rejects_dot_segments() {
        for no in [".", ".."] {
            let err = ReceiptSource::Number(no.into())
                .resolve(DEFAULT_BASE_URL)
                .unwrap_err();
            assert!(matches!(err, ReceiptError::InvalidField(_)));
        }
    }

    #[test]
    fn test_resolve_cannot_be_base() {
        let err = ReceiptSource::Number("CE1".into())
            .resolve("mailto:receipts@example.com")
            .unwrap_err();
        assert!(matches!(err, ReceiptError::CannotBeBase(_)));
    }

    #[test]
    fn test_resolve_invalid_url() {
        let err = ReceiptSource::Url("not a url".into())
            .resolve(DEFAULT_BASE_URL)
            .unwrap_err();
        assert!(matches!(err, ReceiptError::InvalidUrl(_)));
    }

    #[test]
    fn test_default_config_is_safe() {
        let config = FetchConfig::default();
        assert!(!config.accept_invalid_certs);
        assert!(config.timeout.is_none());
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn test_fetcher_creation() {
        let fetcher = ReceiptFetcher::new(FetchConfig {
            accept_invalid_certs: true,
            ..FetchConfig::default()
        })
        .unwrap();
        assert!(fetcher.config().accept_invalid_certs);
    }
}
