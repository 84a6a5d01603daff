use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{ACCEPT_LANGUAGE, HeaderMap, HeaderValue, USER_AGENT};
use reqwest::redirect;

use crate::error::FetchError;

const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";
const LANGUAGE: &str = "en-US,en;q=0.9";

/// Anything that can hand back the HTML behind a URL.
pub trait PageSource {
    fn fetch_html(&self, url: &str) -> Result<String, FetchError>;
}

pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let redirect_policy = redirect::Policy::custom(|attempt| {
            if attempt.previous().len() > 10 {
                attempt.error("Too many redirects (>10)")
            } else {
                attempt.follow()
            }
        });

        Ok(Self {
            client: Client::builder()
                .default_headers(browser_headers())
                .redirect(redirect_policy)
                .timeout(timeout)
                .build()?,
        })
    }

    pub fn client(&self) -> &Client {
        &self.client
    }
}

impl PageSource for HttpFetcher {
    fn fetch_html(&self, url: &str) -> Result<String, FetchError> {
        let transport = |source| FetchError::Transport {
            url: url.to_string(),
            source,
        };

        let resp = self.client.get(url).send().map_err(transport)?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        resp.text().map_err(transport)
    }
}

fn browser_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static(LANGUAGE));
    headers
}
