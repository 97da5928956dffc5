//! HTTP transport

use std::future::Future;
use std::time::Duration;

use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::redirect::Policy;
use url::Url;

use crate::error::FetchError;
use crate::page::FetchedPage;
use crate::Result;

/// Issues the `GET` for a transition.
///
/// Implementations report any completed HTTP exchange as `Ok`, whatever the
/// status; classification happens in [`FetchedPage::into_page`].
pub trait Fetch {
    fn fetch(&self, url: &Url) -> impl Future<Output = Result<FetchedPage>> + Send;
}

#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .redirect(Policy::limited(10))
            .timeout(timeout)
            .user_agent(concat!("pjax/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        Ok(Self { client })
    }
}

impl Fetch for HttpFetcher {
    async fn fetch(&self, url: &Url) -> Result<FetchedPage> {
        // The fragment never goes over the wire.
        let mut target = url.clone();
        target.set_fragment(None);

        tracing::debug!(url = %target, "GET");

        let resp = self
            .client
            .get(target)
            .header(ACCEPT, "text/html,application/xhtml+xml")
            .send()
            .await?;

        let status = resp.status().as_u16();
        let final_url = resp.url().clone();
        let content_type = resp
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = resp.bytes().await?.to_vec();

        tracing::debug!(status, final_url = %final_url, bytes = body.len(), "Response received");

        Ok(FetchedPage {
            status,
            final_url,
            content_type,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn fetcher() -> HttpFetcher {
        HttpFetcher::new(Duration::from_secs(5)).unwrap()
    }

    fn url(server: &MockServer, p: &str) -> Url {
        Url::parse(&format!("{}{}", server.uri(), p)).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_html() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/about"))
            .respond_with(
                ResponseTemplate::new(200).set_body_raw("<title>About</title>", "text/html"),
            )
            .mount(&server)
            .await;

        let fetched = fetcher().fetch(&url(&server, "/about#team")).await.unwrap();
        assert_eq!(fetched.status, 200);
        assert_eq!(fetched.final_url, url(&server, "/about"));
        assert_eq!(fetched.content_type.as_deref(), Some("text/html"));

        let page = fetched.into_page().unwrap();
        assert_eq!(page.document.title(), "About");
    }

    #[tokio::test]
    async fn test_fetch_legacy_charset() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/menu"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(
                b"<title>Caf\xe9</title>".to_vec(),
                "text/html; charset=iso-8859-1",
            ))
            .mount(&server)
            .await;

        let fetched = fetcher().fetch(&url(&server, "/menu")).await.unwrap();
        assert_eq!(fetched.into_page().unwrap().document.title(), "Caf\u{e9}");
    }

    #[tokio::test]
    async fn test_redirect_reports_final_url() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/old"))
            .respond_with(ResponseTemplate::new(301).insert_header("Location", "/new"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/new"))
            .respond_with(ResponseTemplate::new(200).set_body_raw("<title>New</title>", "text/html"))
            .mount(&server)
            .await;

        let fetched = fetcher().fetch(&url(&server, "/old")).await.unwrap();
        assert_eq!(fetched.final_url, url(&server, "/new"));
        assert_eq!(fetched.into_page().unwrap().document.title(), "New");
    }

    #[tokio::test]
    async fn test_error_status_is_reported_not_raised() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/missing"))
            .respond_with(ResponseTemplate::new(404).set_body_raw("<title>404</title>", "text/html"))
            .mount(&server)
            .await;

        let fetched = fetcher().fetch(&url(&server, "/missing")).await.unwrap();
        assert_eq!(fetched.status, 404);
        assert_eq!(fetched.into_page().unwrap_err(), FetchError::Status(404));
    }

    #[tokio::test]
    async fn test_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
            .mount(&server)
            .await;

        let fetcher = HttpFetcher::new(Duration::from_millis(100)).unwrap();
        let err = fetcher.fetch(&url(&server, "/slow")).await.unwrap_err();
        assert_eq!(err, FetchError::Timeout);
    }
}
