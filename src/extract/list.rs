use log::trace;
use scraper::ElementRef;
use scraper::Html;

use super::display_name;
use super::element_text;
use super::is_parent_link;
use super::is_sort_link;
use super::selector;
use crate::Entry;

/// Extracts entries from a plain `<ul>` listing. This layout carries no
/// modification times.
pub(crate) fn extract(document: &Html) -> Vec<Entry> {
    let Some(list) = document.select(&selector("ul")).next() else {
        return vec![];
    };
    let anchor = selector("a[href]");

    list.children()
        .filter_map(ElementRef::wrap)
        .filter(|item| item.value().name() == "li")
        .filter_map(|item| {
            let mut anchors = item.select(&anchor);
            let (Some(link), None) = (anchors.next(), anchors.next()) else {
                trace!("skipping list item without exactly one link");
                return None;
            };
            let href = link.value().attr("href")?;
            let text = element_text(&link);
            if is_parent_link(href, &text) || is_sort_link(href) {
                return None;
            }
            let name = display_name(&text);
            if name.is_empty() {
                return None;
            }
            Some(Entry::create(name, href.to_owned(), None, href.ends_with('/')))
        })
        .collect()
}
