//! Link formatting for uploaded screenshots.
//!
//! Every format takes the image host's page URL and thumbnail URL. Nothing
//! is escaped; whatever the host returned is passed through.

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

/// The page URL on its own.
pub fn to_url(page_url: &str, _thumbnail_url: &str) -> String {
    page_url.to_string()
}

/// A clickable thumbnail: `<a href="PAGE"><img src="THUMB" /></a>`.
pub fn to_html(page_url: &str, thumbnail_url: &str) -> String {
    format!("<a href=\"{page_url}\"><img src=\"{thumbnail_url}\" /></a>")
}

/// Forum markup: `[URL=PAGE][IMG]THUMB[/IMG][/URL]`.
pub fn to_bbcode(page_url: &str, thumbnail_url: &str) -> String {
    format!("[URL={page_url}][IMG]{thumbnail_url}[/IMG][/URL]")
}

/// Output format for printed links (`--show`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkFormat {
    Url,
    Html,
    BbCode,
}

impl LinkFormat {
    /// All formats, in the order they are listed in help output.
    pub const ALL: [LinkFormat; 3] = [LinkFormat::Url, LinkFormat::Html, LinkFormat::BbCode];

    pub fn render(self, page_url: &str, thumbnail_url: &str) -> String {
        match self {
            LinkFormat::Url => to_url(page_url, thumbnail_url),
            LinkFormat::Html => to_html(page_url, thumbnail_url),
            LinkFormat::BbCode => to_bbcode(page_url, thumbnail_url),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            LinkFormat::Url => "url",
            LinkFormat::Html => "html",
            LinkFormat::BbCode => "bbcode",
        }
    }
}

impl FromStr for LinkFormat {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "url" => Ok(LinkFormat::Url),
            "html" => Ok(LinkFormat::Html),
            "bbcode" => Ok(LinkFormat::BbCode),
            _ => Err(format!("unsupported link format: {value}")),
        }
    }
}

impl Display for LinkFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.name())
    }
}
