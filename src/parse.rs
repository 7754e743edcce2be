#[cfg(feature = "json_schema")]
use schemars::JsonSchema;
use scraper::Html;
use serde::Deserialize;
use serde::Serialize;

use crate::Entry;
use crate::Format;
use crate::extract::extract;
use crate::format::infer_format_from_document;
use crate::path::apply_base;

/// Options controlling how a single listing page is parsed.
#[cfg_attr(feature = "json_schema", derive(JsonSchema))]
#[derive(Default, Debug, Clone, Serialize, Deserialize, PartialEq, Hash, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ParseOptions {
    /// Layout of the page. Inferred from the markup when `None`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<Format>,
    /// Prefix applied to every produced path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_path: Option<String>,
}

impl ParseOptions {
    /// Creates options that infer the format and keep paths relative.
    pub fn new() -> Self {
        Self::default()
    }

    /// Skips format inference and uses `format`.
    pub fn with_format(mut self, format: Format) -> Self {
        self.format = Some(format);
        self
    }

    /// Rewrites every path to live under `base_path`.
    pub fn with_base_path(mut self, base_path: impl Into<String>) -> Self {
        self.base_path = Some(base_path.into());
        self
    }
}

impl From<Format> for ParseOptions {
    fn from(format: Format) -> Self {
        Self::new().with_format(format)
    }
}

impl From<Option<Format>> for ParseOptions {
    fn from(format: Option<Format>) -> Self {
        Self {
            format,
            base_path: None,
        }
    }
}

/// Parses a directory listing page into a flat list of entries.
///
/// Directories in the result are never resolved: their `children` is
/// `None`. Empty or unrecognized markup yields an empty list.
///
/// ```rust
/// use autoindex::Format;
/// use autoindex::ParseOptions;
/// use autoindex::parse;
///
/// let html = r#"<ul><li><a href="/"> Parent Directory</a></li>
/// <li><a href="docs/"> docs/</a></li>
/// <li><a href="ReadMe.txt"> ReadMe.txt</a></li></ul>"#;
///
/// let entries = parse(html, Format::List);
/// assert_eq!(entries.len(), 2);
/// assert_eq!(entries[0].name(), "docs");
///
/// let entries = parse(html, ParseOptions::new().with_base_path("mirror"));
/// assert_eq!(entries[1].path(), "/mirror/ReadMe.txt");
/// ```
pub fn parse(html: &str, options: impl Into<ParseOptions>) -> Vec<Entry> {
    let options = options.into();
    if html.trim().is_empty() {
        return vec![];
    }
    let document = Html::parse_document(html);
    let format = options
        .format
        .unwrap_or_else(|| infer_format_from_document(&document));
    let mut entries = extract(&document, format);

    if let Some(base) = &options.base_path {
        for entry in &mut entries {
            let path = apply_base(base, entry.path(), entry.is_directory());
            entry.set_path(path);
        }
    }
    entries
}

/// Parses `html` with a known layout. Same as `parse(html, format)`.
pub fn parse_with_format(html: &str, format: Format) -> Vec<Entry> {
    parse(html, format)
}
