use std::sync::LazyLock;

use enclave_renderer::{EmbedMatch, EmbedProvider, Enclave, Provider, ProviderError};
use regex::Regex;
use url::Url;

use crate::consts::TRADINGVIEW_WIDGET_SCRIPT;
use crate::markup::{IframePolicy, host_matches, is_web, query_theme, query_value, segments};

/// `EXCHANGE:TICKER` or a bare ticker.
static SYMBOL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z0-9_.!]+(?::[A-Z0-9_.!]+)?$").unwrap());

/// Normalise `NASDAQ-AAPL` / `nasdaq:aapl` to `NASDAQ:AAPL`.
fn normalize_symbol(raw: &str) -> Option<String> {
    let symbol = raw.to_ascii_uppercase().replacen('-', ":", 1);
    SYMBOL.is_match(&symbol).then_some(symbol)
}

/// `TradingView` symbol overview widgets.
#[derive(Default)]
pub struct TradingView {
    iframe: IframePolicy,
}

impl TradingView {
    #[must_use]
    pub fn new(iframe: IframePolicy) -> Self {
        Self { iframe }
    }

    fn symbol(url: &Url) -> Option<String> {
        match segments(url).as_slice() {
            ["symbols", symbol, ..] => normalize_symbol(symbol),
            ["chart", ..] => query_value(url, "symbol").and_then(|s| normalize_symbol(&s)),
            _ => None,
        }
    }
}

impl EmbedProvider for TradingView {
    fn provider(&self) -> Provider {
        Provider::TradingView
    }

    fn classify(&self, url: &Url) -> Option<EmbedMatch> {
        if !is_web(url) || !host_matches(url, &["tradingview.com"]) {
            return None;
        }
        let mut matched = EmbedMatch::new(Provider::TradingView, Self::symbol(url)?);
        if let Some(theme) = query_theme(url) {
            matched = matched.with_theme(theme);
        }
        Some(matched)
    }

    fn render(&self, enclave: &Enclave) -> Result<String, ProviderError> {
        if let Some(placeholder) = self.iframe.placeholder(enclave) {
            return Ok(placeholder);
        }
        if !SYMBOL.is_match(&enclave.object_id) {
            return Err(ProviderError::InvalidObjectId {
                provider: Provider::TradingView,
                object_id: enclave.object_id.clone(),
            });
        }

        let color_theme = if enclave.theme == "dark" { "dark" } else { "light" };
        let config = serde_json::json!({
            "symbols": [[format!("{}|1D", enclave.object_id)]],
            "chartOnly": false,
            "width": "100%",
            "height": "100%",
            "locale": "en",
            "colorTheme": color_theme,
            "autosize": true,
            "showVolume": false,
            "chartType": "area",
            "dateRanges": ["1d|1", "1m|30", "3m|60", "12m|1D", "60m|1W", "all|1M"],
        });
        let config =
            serde_json::to_string_pretty(&config).map_err(|e| ProviderError::Build(e.to_string()))?;

        Ok(format!(
            r#"<div class="tradingview-widget-container"><div class="tradingview-widget-container__widget"></div><script type="text/javascript" src="{TRADINGVIEW_WIDGET_SCRIPT}" async>{config}</script></div>"#
        ))
    }
}
