//! Per-layout extractors turning a parsed listing into a flat list of
//! entries.
//!
//! Every extractor returns `name` as the trimmed display text without a
//! trailing separator and `path` as the raw href found in the page.
mod list;
mod pre;
mod table;

use scraper::ElementRef;
use scraper::Html;
use scraper::Selector;

use crate::Entry;
use crate::Format;
use crate::path::trim_trailing_slash;

/// Label of the link pointing back at the parent directory.
const PARENT_LABEL: &str = "parent directory";

/// Hrefs that point back at the listing itself or its parent.
const BACK_HREFS: &[&str] = &["..", "../", ".", "./"];

/// Visible suffixes the server uses when it shortens a long name.
const TRUNCATION_MARKERS: &[&str] = &["..>", "..&gt;", "\u{2026}"];

/// Extracts entries from `document` using the layout `format`.
pub(crate) fn extract(document: &Html, format: Format) -> Vec<Entry> {
    match format {
        Format::List => list::extract(document),
        Format::Preformatted => pre::extract(document),
        Format::Table => table::extract(document),
    }
}

/// The kind of icon shown next to a listing entry, read from its `alt`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Icon {
    Directory,
    File,
    Parent,
    Unknown,
}

impl Icon {
    /// Classifies an `alt` marker such as `[DIR]`. An empty `alt` is no
    /// marker at all.
    pub(crate) fn from_alt(alt: &str) -> Option<Icon> {
        let alt = alt.trim();
        if alt.is_empty() {
            return None;
        }
        let marker = alt
            .trim_start_matches('[')
            .trim_end_matches(']')
            .trim()
            .to_ascii_uppercase();
        let icon = match marker.as_str() {
            "DIR" => Icon::Directory,
            "PARENTDIR" => Icon::Parent,
            "" | "FILE" | "TXT" | "IMG" | "SND" | "VID" | "CMP" | "BIN" | "ICO" => Icon::File,
            _ => Icon::Unknown,
        };
        Some(icon)
    }
}

pub(crate) fn selector(css: &'static str) -> Selector {
    Selector::parse(css).expect("static selector is valid")
}

pub(crate) fn element_text(el: &ElementRef<'_>) -> String {
    el.text().collect::<String>()
}

pub(crate) fn is_parent_label(text: &str) -> bool {
    text.trim().eq_ignore_ascii_case(PARENT_LABEL)
}

/// Whether a link leads back up the tree instead of to an entry: the
/// "Parent Directory" link, or a `..`/`.` link as nginx style servers print.
pub(crate) fn is_parent_link(href: &str, text: &str) -> bool {
    let href = href.trim();
    is_parent_label(text) || BACK_HREFS.contains(&href) || display_name(text) == ".."
}

pub(crate) fn is_sort_link(href: &str) -> bool {
    href.starts_with('?')
}

/// The visible name of an entry: trimmed, without trailing separator.
pub(crate) fn display_name(text: &str) -> String {
    trim_trailing_slash(text.trim()).trim().to_owned()
}

pub(crate) fn is_truncated(text: &str) -> bool {
    let text = text.trim();
    TRUNCATION_MARKERS.iter().any(|m| text.ends_with(m))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn icons() {
        assert_eq!(Icon::from_alt("[DIR]"), Some(Icon::Directory));
        assert_eq!(Icon::from_alt("[PARENTDIR]"), Some(Icon::Parent));
        assert_eq!(Icon::from_alt("[   ]"), Some(Icon::File));
        assert_eq!(Icon::from_alt("[txt]"), Some(Icon::File));
        assert_eq!(Icon::from_alt("[HOLOGRAM]"), Some(Icon::Unknown));
        assert_eq!(Icon::from_alt(""), None);
    }

    #[test]
    fn names() {
        assert_eq!(display_name(" level2/ "), "level2");
        assert_eq!(display_name("ReadMe.txt"), "ReadMe.txt");
        assert!(is_parent_label(" Parent Directory"));
        assert!(is_parent_link("/cdn/", "Parent Directory"));
        assert!(is_parent_link("../", "../"));
        assert!(is_parent_link("..", "up"));
        assert!(is_parent_link("./", "."));
        assert!(is_parent_link("/cdn/", ".."));
        assert!(!is_parent_link("..hidden/", "..hidden/"));
        assert!(is_truncated("a-very-long-file-na..>"));
        assert!(!is_truncated("short.txt"));
    }
}
