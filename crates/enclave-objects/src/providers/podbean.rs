use std::sync::LazyLock;

use enclave_renderer::{EmbedMatch, EmbedProvider, Enclave, Provider, ProviderError};
use regex::Regex;
use url::Url;

use crate::consts::{PODBEAN_PLAYER_URL, PODBEAN_SKIN_DARK, PODBEAN_SKIN_LIGHT};
use crate::markup::{IframePolicy, host_matches, is_web, query_theme, segments};

/// Player id as used by the embed URL, e.g. `s9x5a-196f966-pb`.
static PLAYER_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9]+(?:-[A-Za-z0-9]+)*-pb$").unwrap());

/// Podbean episodes shared via `/ew/pb-{id}` or `/media/share/pb-{id}`.
#[derive(Default)]
pub struct Podbean {
    iframe: IframePolicy,
}

impl Podbean {
    #[must_use]
    pub fn new(iframe: IframePolicy) -> Self {
        Self { iframe }
    }
}

impl EmbedProvider for Podbean {
    fn provider(&self) -> Provider {
        Provider::Podbean
    }

    fn classify(&self, url: &Url) -> Option<EmbedMatch> {
        if !is_web(url) || !host_matches(url, &["podbean.com"]) {
            return None;
        }
        let share = match segments(url).as_slice() {
            ["ew", share] | ["media", "share", share] => *share,
            _ => return None,
        };
        let object_id = format!("{}-pb", share.strip_prefix("pb-")?);
        if !PLAYER_ID.is_match(&object_id) {
            return None;
        }

        let mut matched = EmbedMatch::new(Provider::Podbean, object_id);
        if let Some(theme) = query_theme(url) {
            matched = matched.with_theme(theme);
        }
        Some(matched)
    }

    fn render(&self, enclave: &Enclave) -> Result<String, ProviderError> {
        if let Some(placeholder) = self.iframe.placeholder(enclave) {
            return Ok(placeholder);
        }
        if !PLAYER_ID.is_match(&enclave.object_id) {
            return Err(ProviderError::InvalidObjectId {
                provider: Provider::Podbean,
                object_id: enclave.object_id.clone(),
            });
        }

        let skin = if enclave.theme == "dark" {
            PODBEAN_SKIN_DARK
        } else {
            PODBEAN_SKIN_LIGHT
        };
        Ok(format!(
            r#"<iframe title="Podbean Player" allowtransparency="true" height="150" width="100%" style="border: none; min-width: min(100%, 430px); height: 150px;" scrolling="no" data-name="pb-iframe-player" src="{PODBEAN_PLAYER_URL}?from=embed&i={}&square=1&share=1&download=1&fonts=Arial&skin={skin}&font-color=auto&rtl=0&logo_link=&btn-skin=7&size=150" loading="lazy" allowfullscreen=""></iframe>"#,
            enclave.object_id
        ))
    }
}
