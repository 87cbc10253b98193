use enclave_renderer::{EmbedMatch, EmbedProvider, Enclave, Provider, ProviderError, escape_html};
use url::Url;

use crate::consts::AUDIO_EXTENSIONS;
use crate::markup::is_web;

fn has_audio_extension(url: &Url) -> bool {
    url.path()
        .rsplit_once('.')
        .is_some_and(|(_, ext)| AUDIO_EXTENSIONS.iter().any(|a| a.eq_ignore_ascii_case(ext)))
}

/// Direct links to audio files, played with an HTML5 `<audio>` element.
#[derive(Default)]
pub struct Html5Audio;

impl EmbedProvider for Html5Audio {
    fn provider(&self) -> Provider {
        Provider::Html5Audio
    }

    fn classify(&self, url: &Url) -> Option<EmbedMatch> {
        (is_web(url) && has_audio_extension(url))
            .then(|| EmbedMatch::new(Provider::Html5Audio, url.as_str()))
    }

    fn render(&self, enclave: &Enclave) -> Result<String, ProviderError> {
        let src = Url::parse(&enclave.object_id)
            .ok()
            .filter(is_web)
            .ok_or_else(|| ProviderError::InvalidObjectId {
                provider: Provider::Html5Audio,
                object_id: enclave.object_id.clone(),
            })?;
        Ok(format!(
            r#"<audio controls preload="metadata" src="{}"></audio>"#,
            escape_html(src.as_str())
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn classify(s: &str) -> Option<EmbedMatch> {
        Html5Audio.classify(&Url::parse(s).unwrap())
    }

    #[test]
    fn test_classify_extensions() {
        let matched = classify("https://cdn.example.com/ep/1.MP3?dl=1").unwrap();
        assert_eq!(matched.object_id, "https://cdn.example.com/ep/1.MP3?dl=1");
        assert!(classify("https://cdn.example.com/a.opus").is_some());
        assert!(classify("https://cdn.example.com/a.mp4").is_none());
        assert!(classify("https://cdn.example.com/mp3").is_none());
        assert!(classify("ftp://cdn.example.com/a.mp3").is_none());
    }

    #[test]
    fn test_render_audio_tag() {
        let url = "https://cdn.example.com/a.mp3?x=1&y=2";
        let enc = Enclave::new(Url::parse(url).unwrap(), Provider::Html5Audio, url);
        assert_eq!(
            Html5Audio.render(&enc).unwrap(),
            r#"<audio controls preload="metadata" src="https://cdn.example.com/a.mp3?x=1&amp;y=2"></audio>"#
        );
    }

    #[test]
    fn test_render_rejects_non_url() {
        let enc = Enclave::new(
            Url::parse("https://cdn.example.com/a.mp3").unwrap(),
            Provider::Html5Audio,
            "not a url",
        );
        assert!(Html5Audio.render(&enc).is_err());
    }
}
