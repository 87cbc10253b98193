//! One handler per embed provider.

mod audio;
mod bilibili;
mod dify;
mod podbean;
mod quail;
mod spotify;
mod telegram;
mod tradingview;
mod twitter;
mod youtube;

pub use audio::Html5Audio;
pub use bilibili::Bilibili;
pub use dify::DifyWidget;
pub use podbean::Podbean;
pub use quail::{QuailAd, QuailImage, QuailWidget};
pub use spotify::Spotify;
pub use telegram::TelegramEmoji;
pub use tradingview::TradingView;
pub use twitter::Twitter;
pub use youtube::YouTube;
