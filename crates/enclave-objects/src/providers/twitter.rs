use std::sync::{Arc, LazyLock};

use enclave_config::OembedConfig;
use enclave_renderer::{EmbedMatch, EmbedProvider, Enclave, Provider, ProviderError};
use regex::Regex;
use url::Url;

use crate::markup::{host_matches, is_web, query_theme};
use crate::oembed::{OembedClient, UreqOembedClient};

/// `/{user}/status/{id}` or `/i/web/status/{id}`.
static STATUS_PATH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^/(?:[A-Za-z0-9_]{1,15}|i/web|i)/status(?:es)?/(\d{1,20})(?:/|$)").unwrap()
});

static TWEET_ID: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{1,20}$").unwrap());

/// Tweets, rendered from the Twitter oEmbed endpoint.
pub struct Twitter {
    endpoint: String,
    client: Arc<dyn OembedClient>,
}

impl Twitter {
    #[must_use]
    pub fn new(endpoint: impl Into<String>, client: Arc<dyn OembedClient>) -> Self {
        Self {
            endpoint: endpoint.into(),
            client,
        }
    }

    /// Handler using a `ureq` client configured from `[oembed]`.
    #[must_use]
    pub fn from_config(config: &OembedConfig) -> Self {
        Self::new(
            config.twitter_endpoint.clone(),
            Arc::new(UreqOembedClient::new(config.timeout())),
        )
    }
}

impl Default for Twitter {
    fn default() -> Self {
        Self::from_config(&OembedConfig::default())
    }
}

impl EmbedProvider for Twitter {
    fn provider(&self) -> Provider {
        Provider::Twitter
    }

    fn classify(&self, url: &Url) -> Option<EmbedMatch> {
        if !is_web(url) || !host_matches(url, &["twitter.com", "x.com"]) {
            return None;
        }
        let caps = STATUS_PATH.captures(url.path())?;
        let mut matched = EmbedMatch::new(Provider::Twitter, &caps[1]);
        if let Some(theme) = query_theme(url) {
            matched = matched.with_theme(theme);
        }
        Some(matched)
    }

    fn render(&self, enclave: &Enclave) -> Result<String, ProviderError> {
        if !TWEET_ID.is_match(&enclave.object_id) {
            return Err(ProviderError::InvalidObjectId {
                provider: Provider::Twitter,
                object_id: enclave.object_id.clone(),
            });
        }

        let tweet_url = format!("https://twitter.com/i/status/{}", enclave.object_id);
        let theme = if enclave.theme == "dark" { "dark" } else { "light" };
        let response = self
            .client
            .fetch(
                &self.endpoint,
                &[("url", tweet_url.as_str()), ("theme", theme), ("dnt", "true")],
            )
            .map_err(|e| ProviderError::Fetch(e.to_string()))?;

        tracing::debug!(tweet = %enclave.object_id, endpoint = %self.endpoint, "Fetched tweet oEmbed");
        Ok(response.html)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oembed::{OembedError, OembedResponse};
    use pretty_assertions::assert_eq;
    use std::sync::Mutex;

    /// Records requests and answers with a canned result.
    struct StubClient {
        html: Option<&'static str>,
        requests: Mutex<Vec<(String, Vec<(String, String)>)>>,
    }

    impl StubClient {
        fn new(html: Option<&'static str>) -> Arc<Self> {
            Arc::new(Self {
                html,
                requests: Mutex::new(Vec::new()),
            })
        }
    }

    impl OembedClient for StubClient {
        fn fetch(
            &self,
            endpoint: &str,
            query: &[(&str, &str)],
        ) -> Result<OembedResponse, OembedError> {
            self.requests.lock().unwrap().push((
                endpoint.to_owned(),
                query
                    .iter()
                    .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
                    .collect(),
            ));
            match self.html {
                Some(html) => Ok(OembedResponse {
                    html: html.to_owned(),
                    ..OembedResponse::default()
                }),
                None => Err(OembedError::Status {
                    status: 404,
                    body: "No status found".to_owned(),
                }),
            }
        }
    }

    fn classify(s: &str) -> Option<EmbedMatch> {
        Twitter::new("https://oembed.test", StubClient::new(None)).classify(&Url::parse(s).unwrap())
    }

    fn tweet(id: &str) -> Enclave {
        Enclave::new(
            Url::parse(&format!("https://x.com/jack/status/{id}")).unwrap(),
            Provider::Twitter,
            id,
        )
    }

    #[test]
    fn test_classify_status_urls() {
        for url in [
            "https://twitter.com/jack/status/20",
            "https://x.com/jack/status/20?s=46",
            "https://mobile.twitter.com/jack/status/20/photo/1",
            "https://twitter.com/i/web/status/20",
            "https://www.x.com/jack/statuses/20",
        ] {
            let matched = classify(url).unwrap_or_else(|| panic!("{url} should match"));
            assert_eq!(matched.object_id, "20", "{url}");
            assert_eq!(matched.theme, "light");
        }
    }

    #[test]
    fn test_classify_theme() {
        let matched = classify("https://x.com/jack/status/20?theme=dark").unwrap();
        assert_eq!(matched.theme, "dark");
    }

    #[test]
    fn test_classify_rejects_profiles() {
        assert!(classify("https://x.com/jack").is_none());
        assert!(classify("https://x.com/jack/status/abc").is_none());
        assert!(classify("https://x.company.com/jack/status/20").is_none());
    }

    #[test]
    fn test_render_fetches_oembed() {
        let client = StubClient::new(Some("<blockquote class=\"twitter-tweet\">hi</blockquote>"));
        let handler = Twitter::new(
            "https://oembed.test",
            Arc::clone(&client) as Arc<dyn OembedClient>,
        );

        let html = handler.render(&tweet("20").with_theme("dark")).unwrap();
        assert_eq!(html, "<blockquote class=\"twitter-tweet\">hi</blockquote>");

        let requests = client.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        let (endpoint, query) = &requests[0];
        assert_eq!(endpoint, "https://oembed.test");
        assert!(query.contains(&("url".to_owned(), "https://twitter.com/i/status/20".to_owned())));
        assert!(query.contains(&("theme".to_owned(), "dark".to_owned())));
    }

    #[test]
    fn test_render_fetch_failure() {
        let handler = Twitter::new("https://oembed.test", StubClient::new(None));
        let err = handler.render(&tweet("20")).unwrap_err();
        assert!(matches!(err, ProviderError::Fetch(_)));
        assert!(err.to_string().contains("404"));
    }

    #[test]
    fn test_render_rejects_invalid_id() {
        let client = StubClient::new(Some("x"));
        let handler = Twitter::new(
            "https://oembed.test",
            Arc::clone(&client) as Arc<dyn OembedClient>,
        );
        assert!(handler.render(&tweet("20x")).is_err());
        assert!(client.requests.lock().unwrap().is_empty());
    }
}
