use std::sync::LazyLock;

use enclave_renderer::{EmbedMatch, EmbedProvider, Enclave, Provider, ProviderError};
use regex::Regex;
use url::Url;

use crate::consts::DIFY_CHATBOT_URL;
use crate::markup::{IframePolicy, host_matches, is_web, segments};

static TOKEN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[A-Za-z0-9]{4,64}$").unwrap());

/// Dify chatbot widgets published on `udify.app`.
#[derive(Default)]
pub struct DifyWidget {
    iframe: IframePolicy,
}

impl DifyWidget {
    #[must_use]
    pub fn new(iframe: IframePolicy) -> Self {
        Self { iframe }
    }
}

impl EmbedProvider for DifyWidget {
    fn provider(&self) -> Provider {
        Provider::DifyWidget
    }

    fn classify(&self, url: &Url) -> Option<EmbedMatch> {
        if !is_web(url) || !host_matches(url, &["udify.app"]) {
            return None;
        }
        match segments(url).as_slice() {
            ["chatbot", token] if TOKEN.is_match(token) => {
                Some(EmbedMatch::new(Provider::DifyWidget, *token))
            }
            _ => None,
        }
    }

    fn render(&self, enclave: &Enclave) -> Result<String, ProviderError> {
        if let Some(placeholder) = self.iframe.placeholder(enclave) {
            return Ok(placeholder);
        }
        if !TOKEN.is_match(&enclave.object_id) {
            return Err(ProviderError::InvalidObjectId {
                provider: Provider::DifyWidget,
                object_id: enclave.object_id.clone(),
            });
        }
        Ok(format!(
            r#"<iframe src="{DIFY_CHATBOT_URL}/{}" style="width: 100%; height: 100%; min-height: 700px" frameborder="0" allow="microphone"></iframe>"#,
            enclave.object_id
        ))
    }
}
