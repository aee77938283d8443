//! HTTP fetching with a hard deadline and User-Agent rotation

use std::time::Duration;

use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, CACHE_CONTROL, PRAGMA, USER_AGENT};
use reqwest::{Client as ReqwestClient, StatusCode};
use tracing::{debug, instrument, warn};
use url::Url;

use crate::crawler::content_extraction::{MIN_TEXT_LENGTH, extract_text_content};
use crate::crawler::error::FetchError;

const BROWSER_ACCEPT: &str =
    "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8";
const BROWSER_ACCEPT_LANGUAGE: &str = "en-US,en;q=0.5";

/// A fetched HTML page
#[derive(Debug, Clone)]
pub struct Page {
    /// URL that was requested
    pub url: Url,

    /// Raw response body
    pub html: String,
}

/// Outcome of a single request: the body is only read for 2xx responses
struct Exchange {
    status: StatusCode,
    body: Option<String>,
}

/// HTTP fetcher shared by every stage of the analysis
#[derive(Debug, Clone)]
pub struct Fetcher {
    /// The underlying reqwest client
    client: ReqwestClient,

    /// User-Agent strings tried in order
    user_agents: Vec<String>,
}

impl Fetcher {
    /// Create a fetcher that rotates through the given User-Agents
    pub fn new(user_agents: Vec<String>) -> Result<Self, FetchError> {
        let client = ReqwestClient::builder().build()?;
        Ok(Self {
            client,
            user_agents,
        })
    }

    /// Fetch a page, trying each User-Agent until a 2xx response comes back
    pub async fn fetch_page(&self, url: &str, timeout: Duration) -> Result<Page, FetchError> {
        let page_url = parse_url(url)?;
        self.fetch_with(url, timeout, |html| {
            Ok(Page {
                url: page_url.clone(),
                html,
            })
        })
        .await
    }

    /// Fetch a page and extract its readable text.
    ///
    /// A 2xx response whose text is 100 characters or shorter counts as a failed attempt,
    /// so the next User-Agent gets a chance (some sites serve bots a stub page).
    pub async fn fetch_text(&self, url: &str, timeout: Duration) -> Result<String, FetchError> {
        self.fetch_with(url, timeout, |html| {
            let text = extract_text_content(&html);
            let length = text.chars().count();
            if length > MIN_TEXT_LENGTH {
                Ok(text)
            } else {
                Err(FetchError::ContentTooShort { length })
            }
        })
        .await
    }

    /// The User-Agent retry loop behind every fetch.
    ///
    /// Each User-Agent gets one request. The first 2xx body that `accept` turns into a
    /// value ends the loop; otherwise the error of the last attempt is returned.
    #[instrument(skip(self, accept), level = "debug")]
    pub async fn fetch_with<T, F>(
        &self,
        url: &str,
        timeout: Duration,
        mut accept: F,
    ) -> Result<T, FetchError>
    where
        F: FnMut(String) -> Result<T, FetchError>,
    {
        let target = parse_url(url)?;
        let mut last_error = None;

        for user_agent in &self.user_agents {
            debug!("Fetching {} with User-Agent {:?}", target, user_agent);

            let attempt = self
                .exchange(&target, user_agent, timeout)
                .await
                .and_then(|exchange| match exchange.body {
                    Some(body) => accept(body),
                    None => Err(FetchError::Status {
                        status: exchange.status,
                        url: target.to_string(),
                    }),
                });

            match attempt {
                Ok(value) => return Ok(value),
                Err(e) => {
                    warn!("Fetch attempt with User-Agent {:?} failed: {}", user_agent, e);
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| FetchError::NoUserAgents(target.to_string())))
    }

    /// Send one request with the first User-Agent and report the status.
    ///
    /// Used to check reachability when no language model is configured.
    pub async fn probe(&self, url: &str, timeout: Duration) -> Result<StatusCode, FetchError> {
        let target = parse_url(url)?;
        let user_agent = self
            .user_agents
            .first()
            .ok_or_else(|| FetchError::NoUserAgents(target.to_string()))?;

        let exchange = self.exchange(&target, user_agent, timeout).await?;
        Ok(exchange.status)
    }

    /// One GET with browser-like headers under a hard deadline covering the body read
    async fn exchange(
        &self,
        url: &Url,
        user_agent: &str,
        timeout: Duration,
    ) -> Result<Exchange, FetchError> {
        let request = self
            .client
            .get(url.clone())
            .header(USER_AGENT, user_agent)
            .header(ACCEPT, BROWSER_ACCEPT)
            .header(ACCEPT_LANGUAGE, BROWSER_ACCEPT_LANGUAGE)
            .header(CACHE_CONTROL, "no-cache")
            .header(PRAGMA, "no-cache");

        let exchange = async {
            let response = request.send().await?;
            let status = response.status();
            let body = if status.is_success() {
                Some(response.text().await?)
            } else {
                None
            };
            Ok::<_, reqwest::Error>(Exchange { status, body })
        };

        match tokio::time::timeout(timeout, exchange).await {
            Ok(Ok(exchange)) => Ok(exchange),
            Ok(Err(e)) if e.is_timeout() => Err(FetchError::Timeout {
                url: url.to_string(),
                timeout_ms: timeout.as_millis(),
            }),
            Ok(Err(e)) => Err(FetchError::Network(e)),
            Err(_) => Err(FetchError::Timeout {
                url: url.to_string(),
                timeout_ms: timeout.as_millis(),
            }),
        }
    }
}

fn parse_url(url: &str) -> Result<Url, FetchError> {
    Url::parse(url).map_err(|_| FetchError::InvalidUrl(url.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::USER_AGENTS;
    use mockito::Server;

    const TIMEOUT: Duration = Duration::from_secs(5);

    fn fetcher() -> Fetcher {
        Fetcher::new(USER_AGENTS.iter().map(|ua| ua.to_string()).collect()).unwrap()
    }

    fn legal_html(words: usize) -> String {
        let sentence = "You agree to these terms when you use the service. ";
        format!(
            "<html><body><p>{}</p></body></html>",
            sentence.repeat(words)
        )
    }

    #[tokio::test]
    async fn test_rotation_stops_at_first_success() {
        let mut server = Server::new_async().await;
        let first = server
            .mock("GET", "/terms")
            .match_header("user-agent", USER_AGENTS[0])
            .with_status(403)
            .expect(1)
            .create_async()
            .await;
        let second = server
            .mock("GET", "/terms")
            .match_header("user-agent", USER_AGENTS[1])
            .with_status(503)
            .expect(1)
            .create_async()
            .await;
        let third = server
            .mock("GET", "/terms")
            .match_header("user-agent", USER_AGENTS[2])
            .with_status(200)
            .with_body("third agent body")
            .expect(1)
            .create_async()
            .await;
        let fourth = server
            .mock("GET", "/terms")
            .match_header("user-agent", USER_AGENTS[3])
            .with_status(200)
            .with_body("fourth agent body")
            .expect(0)
            .create_async()
            .await;

        let url = format!("{}/terms", server.url());
        let page = fetcher().fetch_page(&url, TIMEOUT).await.unwrap();
        assert_eq!(page.html, "third agent body");

        first.assert_async().await;
        second.assert_async().await;
        third.assert_async().await;
        fourth.assert_async().await;
    }

    #[tokio::test]
    async fn test_exhausted_rotation_reports_last_status() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/")
            .with_status(404)
            .expect(4)
            .create_async()
            .await;

        let result = fetcher().fetch_page(&server.url(), TIMEOUT).await;
        match result {
            Err(FetchError::Status { status, .. }) => assert_eq!(status, StatusCode::NOT_FOUND),
            other => panic!("expected status error, got {:?}", other),
        }

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_browser_headers_are_sent() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/")
            .match_header("accept", BROWSER_ACCEPT)
            .match_header("accept-language", BROWSER_ACCEPT_LANGUAGE)
            .match_header("cache-control", "no-cache")
            .match_header("pragma", "no-cache")
            .with_status(200)
            .with_body("ok")
            .expect(1)
            .create_async()
            .await;

        let page = fetcher().fetch_page(&server.url(), TIMEOUT).await.unwrap();
        assert_eq!(page.html, "ok");

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_invalid_url_fails_without_request() {
        let result = fetcher().fetch_page("not a url", TIMEOUT).await;
        assert!(matches!(result, Err(FetchError::InvalidUrl(_))));
    }

    #[tokio::test]
    async fn test_fetch_text_retries_on_short_content() {
        let mut server = Server::new_async().await;
        let stub = server
            .mock("GET", "/privacy")
            .match_header("user-agent", USER_AGENTS[0])
            .with_status(200)
            .with_body("<html><body><p>Please enable JavaScript to continue.</p></body></html>")
            .expect(1)
            .create_async()
            .await;
        let full = server
            .mock("GET", "/privacy")
            .match_header("user-agent", USER_AGENTS[1])
            .with_status(200)
            .with_body(legal_html(10))
            .expect(1)
            .create_async()
            .await;

        let url = format!("{}/privacy", server.url());
        let text = fetcher().fetch_text(&url, TIMEOUT).await.unwrap();
        assert!(text.starts_with("You agree to these terms"));
        assert!(text.chars().count() > MIN_TEXT_LENGTH);

        stub.assert_async().await;
        full.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetch_text_too_short_everywhere() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/")
            .with_status(200)
            .with_body("<p>tiny</p>")
            .expect(4)
            .create_async()
            .await;

        let result = fetcher().fetch_text(&server.url(), TIMEOUT).await;
        assert!(matches!(
            result,
            Err(FetchError::ContentTooShort { length: 0 })
        ));

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_unreachable_host_is_network_error() {
        // Port 1 on loopback refuses connections.
        let result = fetcher()
            .fetch_page("http://127.0.0.1:1/", TIMEOUT)
            .await;
        assert!(matches!(result, Err(FetchError::Network(_))));
    }

    #[tokio::test]
    async fn test_deadline_expiry_is_timeout() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        // Accept connections and never answer.
        let server = tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });

        let fetcher = Fetcher::new(vec!["slow-test".to_string()]).unwrap();
        let result = fetcher
            .fetch_page(&format!("http://{}/", addr), Duration::from_millis(200))
            .await;

        match result {
            Err(e) => assert!(e.is_timeout(), "expected timeout, got {:?}", e),
            Ok(_) => panic!("expected timeout"),
        }

        server.abort();
    }

    #[tokio::test]
    async fn test_probe_reports_status_with_first_agent() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/")
            .match_header("user-agent", USER_AGENTS[0])
            .with_status(500)
            .expect(1)
            .create_async()
            .await;

        let status = fetcher().probe(&server.url(), TIMEOUT).await.unwrap();
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_empty_rotation() {
        let fetcher = Fetcher::new(Vec::new()).unwrap();
        let result = fetcher.fetch_page("https://example.com", TIMEOUT).await;
        assert!(matches!(result, Err(FetchError::NoUserAgents(_))));
    }
}
