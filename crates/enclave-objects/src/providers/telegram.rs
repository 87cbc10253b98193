use enclave_renderer::{EmbedMatch, EmbedProvider, Enclave, Provider, ProviderError, escape_html};
use url::Url;

use crate::markup::query_value;

fn is_emoji_id(id: &str) -> bool {
    !id.is_empty() && id.len() <= 20 && id.bytes().all(|b| b.is_ascii_digit())
}

/// Telegram custom emoji, written as `tg://emoji?id=...`.
#[derive(Default)]
pub struct TelegramEmoji;

impl EmbedProvider for TelegramEmoji {
    fn provider(&self) -> Provider {
        Provider::TelegramEmoji
    }

    fn classify(&self, url: &Url) -> Option<EmbedMatch> {
        if url.scheme() != "tg" || url.host_str() != Some("emoji") {
            return None;
        }
        let id = query_value(url, "id").filter(|id| is_emoji_id(id))?;
        Some(EmbedMatch::new(Provider::TelegramEmoji, id))
    }

    fn render(&self, enclave: &Enclave) -> Result<String, ProviderError> {
        if !is_emoji_id(&enclave.object_id) {
            return Err(ProviderError::InvalidObjectId {
                provider: Provider::TelegramEmoji,
                object_id: enclave.object_id.clone(),
            });
        }
        Ok(format!(
            r#"<tg-emoji emoji-id="{}">{}</tg-emoji>"#,
            enclave.object_id,
            escape_html(&enclave.alt)
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_classify_emoji() {
        let matched = TelegramEmoji
            .classify(&Url::parse("tg://emoji?id=5368324170671202286").unwrap())
            .unwrap();
        assert_eq!(matched.object_id, "5368324170671202286");
    }

    #[test]
    fn test_classify_rejects() {
        for url in ["tg://emoji", "tg://emoji?id=abc", "tg://resolve?id=1", "https://emoji/?id=1"] {
            assert!(TelegramEmoji.classify(&Url::parse(url).unwrap()).is_none(), "{url}");
        }
    }

    #[test]
    fn test_render_escapes_alt() {
        let enc = Enclave::new(Url::parse("tg://emoji?id=1").unwrap(), Provider::TelegramEmoji, "1")
            .with_alt("<3");
        assert_eq!(
            TelegramEmoji.render(&enc).unwrap(),
            r#"<tg-emoji emoji-id="1">&lt;3</tg-emoji>"#
        );
    }
}
