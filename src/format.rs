use std::fmt::Display;
use std::str::FromStr;
use std::sync::LazyLock;

use log::debug;
use regex::Regex;
#[cfg(feature = "json_schema")]
use schemars::JsonSchema;
use scraper::Html;
use scraper::Selector;
use serde::Deserialize;
use serde::Serialize;

use crate::errors::Error;

/// The rendering layout of a directory listing.
///
/// The numbering follows the `F=` query parameter the server appends to its
/// own column sort links.
#[cfg_attr(feature = "json_schema", derive(JsonSchema))]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Hash, Eq)]
pub enum Format {
    /// A plain `<ul>` of links (`F=0`).
    #[serde(rename = "F0")]
    List,
    /// Fancy indexing inside `<pre>` blocks (`F=1`).
    #[serde(rename = "F1")]
    Preformatted,
    /// Fancy indexing rendered as a `<table>` (`F=2`).
    #[serde(rename = "F2")]
    Table,
}

impl Format {
    /// Maps the `F=` query value onto a format.
    pub fn from_digit(digit: u32) -> Option<Self> {
        match digit {
            0 => Some(Format::List),
            1 => Some(Format::Preformatted),
            2 => Some(Format::Table),
            _ => None,
        }
    }

    /// The `F=` query value of this format.
    pub fn digit(&self) -> u32 {
        match self {
            Format::List => 0,
            Format::Preformatted => 1,
            Format::Table => 2,
        }
    }
}

impl Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "F{}", self.digit())
    }
}

impl FromStr for Format {
    type Err = Error;

    /// Accepts `F0`, `f1`, `2` and so on.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let digits = trimmed
            .strip_prefix(['F', 'f'])
            .unwrap_or(trimmed);
        digits
            .parse::<u32>()
            .ok()
            .and_then(Format::from_digit)
            .ok_or_else(|| Error::InvalidArgument(format!("unknown listing format: {s}")))
    }
}

static SORT_FORMAT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^\?|[?;&])F=(\d)(?:[;&#]|$)").expect("sort format regex is valid")
});

static TEXTUAL_SORT_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"href\s*=\s*["']?(\?[^"'\s>]*)"#).expect("textual sort link regex is valid")
});

fn format_from_query(href: &str) -> Option<Format> {
    SORT_FORMAT
        .captures(href)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse::<u32>().ok())
        .and_then(Format::from_digit)
}

/// Decides which layout `html` uses. Never fails, defaults to
/// [`Format::List`].
pub fn infer_format(html: &str) -> Format {
    infer_format_from_document(&Html::parse_document(html))
}

pub(crate) fn infer_format_from_document(document: &Html) -> Format {
    let sort_links = Selector::parse(r#"a[href^="?"]"#).expect("sort link selector is valid");
    let pre = Selector::parse("pre").expect("pre selector is valid");
    let table = Selector::parse("table").expect("table selector is valid");

    let declared = document
        .select(&sort_links)
        .filter_map(|a| a.value().attr("href"))
        .find_map(format_from_query)
        .or_else(|| {
            // Sort links may only survive as text inside a preformatted block.
            document.select(&pre).find_map(|block| {
                let raw = format!("{}{}", block.inner_html(), block.text().collect::<String>());
                TEXTUAL_SORT_LINK
                    .captures_iter(&raw)
                    .filter_map(|c| c.get(1))
                    .find_map(|m| format_from_query(&m.as_str().replace("&amp;", "&")))
            })
        });
    if let Some(format) = declared {
        debug!("listing declares format {format}");
        return format;
    }

    let format = if document.select(&pre).next().is_some() {
        Format::Preformatted
    } else if document.select(&table).next().is_some() {
        Format::Table
    } else {
        Format::List
    };
    debug!("inferred listing format {format} from structure");
    format
}
