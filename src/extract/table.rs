use log::trace;
use scraper::ElementRef;
use scraper::Html;

use super::Icon;
use super::display_name;
use super::element_text;
use super::is_parent_link;
use super::is_sort_link;
use super::selector;
use crate::Entry;
use crate::utils::parse_listing_time;

/// Extracts entries from a `<table>` listing.
///
/// Each data row is expected to hold an icon cell, a link cell and a date
/// cell, in that order. Header and divider rows are ignored.
pub(crate) fn extract(document: &Html) -> Vec<Entry> {
    let Some(table) = document.select(&selector("table")).next() else {
        return vec![];
    };
    let header = selector("th");
    let cell = selector("td");

    table
        .select(&selector("tr"))
        .filter(|row| row.select(&header).next().is_none())
        .filter_map(|row| {
            let cells: Vec<ElementRef<'_>> = row.select(&cell).collect();
            if cells.len() < 3 {
                trace!("skipping divider row");
                return None;
            }
            into_entry(&cells[0], &cells[1], &cells[2])
        })
        .collect()
}

fn into_entry(icon: &ElementRef<'_>, link: &ElementRef<'_>, date: &ElementRef<'_>) -> Option<Entry> {
    let icon = icon
        .select(&selector("img"))
        .next()
        .and_then(|img| img.value().attr("alt"))
        .and_then(Icon::from_alt);
    if matches!(icon, Some(Icon::Parent) | Some(Icon::Unknown)) {
        trace!("skipping row with icon {icon:?}");
        return None;
    }

    let anchor = link.select(&selector("a[href]")).next()?;
    let href = anchor.value().attr("href")?;
    let text = element_text(&anchor);
    if is_parent_link(href, &text) || href == "/" || is_sort_link(href) {
        return None;
    }
    let name = display_name(&text);
    if name.is_empty() {
        return None;
    }

    let date_text = element_text(date);
    let date_text = date_text.trim_matches(|c: char| c.is_whitespace() || c == '\u{a0}');
    let last_modified = if date_text.is_empty() {
        None
    } else {
        parse_listing_time(date_text).ok()
    };

    let is_directory = icon == Some(Icon::Directory) || href.ends_with('/');
    Some(Entry::create(name, href.to_owned(), last_modified, is_directory))
}
