use log::trace;
use scraper::ElementRef;
use scraper::Html;

use super::Icon;
use super::display_name;
use super::element_text;
use super::is_parent_link;
use super::is_sort_link;
use super::is_truncated;
use super::selector;
use crate::Entry;
use crate::utils::find_listing_time;
use crate::utils::href_basename;

/// A link found on one line of a preformatted listing.
struct LineLink {
    href: String,
    text: String,
    icon: Option<Icon>,
    /// Text between this link and the next one.
    trailing: String,
}

/// Extracts entries from `<pre>` blocks, one entry per text line.
pub(crate) fn extract(document: &Html) -> Vec<Entry> {
    document
        .select(&selector("pre"))
        .flat_map(|block| {
            block
                .inner_html()
                .lines()
                .flat_map(|line| line_links(line).into_iter().filter_map(into_entry))
                .collect::<Vec<_>>()
        })
        .collect()
}

/// Collects the links of a single line along with the icon preceding each
/// one and the text following it.
fn line_links(line: &str) -> Vec<LineLink> {
    if !line.contains("<a") {
        return vec![];
    }
    let fragment = Html::parse_fragment(line);
    let mut links: Vec<LineLink> = vec![];
    let mut pending_icon: Option<Icon> = None;

    for node in fragment.root_element().descendants() {
        if let Some(el) = ElementRef::wrap(node) {
            match el.value().name() {
                "img" => pending_icon = el.value().attr("alt").and_then(Icon::from_alt),
                "a" => {
                    let Some(href) = el.value().attr("href") else {
                        continue;
                    };
                    links.push(LineLink {
                        href: href.to_owned(),
                        text: element_text(&el),
                        icon: pending_icon.take(),
                        trailing: String::new(),
                    });
                }
                _ => {}
            }
        } else if let Some(text) = node.value().as_text() {
            let inside_link = node
                .ancestors()
                .filter_map(ElementRef::wrap)
                .any(|a| a.value().name() == "a");
            if !inside_link && let Some(last) = links.last_mut() {
                last.trailing.push_str(text);
            }
        }
    }
    links
}

fn into_entry(link: LineLink) -> Option<Entry> {
    if is_sort_link(&link.href) {
        return None;
    }
    if link.icon == Some(Icon::Parent) || is_parent_link(&link.href, &link.text) {
        return None;
    }
    let is_directory = link.icon == Some(Icon::Directory) || link.href.ends_with('/');
    let name = if is_truncated(&link.text) {
        href_basename(&link.href)?
    } else {
        display_name(&link.text)
    };
    if name.is_empty() {
        trace!("skipping link without a name: {}", link.href);
        return None;
    }
    let last_modified = find_listing_time(&link.trailing);
    Some(Entry::create(name, link.href, last_modified, is_directory))
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use chrono::Utc;

    use super::*;

    const LISTING: &str = r#"<html><body><h1>Index of /cdn</h1>
<pre><img src="/icons/blank.gif" alt="Icon "> <a href="?C=N;O=D">Name</a>                    <a href="?C=M;O=A">Last modified</a>      <a href="?C=S;O=A">Size</a>  <a href="?C=D;O=A">Description</a><hr><img src="/icons/back.gif" alt="[PARENTDIR]"> <a href="/">Parent Directory</a>                             -
<img src="/icons/text.gif" alt="[TXT]"> <a href="ReadMe.txt">ReadMe.txt</a>              2023-05-01 10:07  1.2K
<img src="/icons/folder.gif" alt="[DIR]"> <a href="level2/">level2/</a>                 13-Sep-2022 18:03    -
<img src="/icons/unknown.gif" alt="[   ]"> <a href="a%20really%20long%20file%20name%20indeed.txt">a really long file na..&gt;</a> 2021-01-01 00:00  10
<hr></pre>
</body></html>"#;

    #[test]
    fn extracts_lines() {
        let entries = extract(&Html::parse_document(LISTING));
        assert_eq!(entries.len(), 3);

        assert_eq!(entries[0].name(), "ReadMe.txt");
        assert!(entries[0].is_file());
        assert_eq!(
            entries[0].last_modified(),
            Some(&Utc.with_ymd_and_hms(2023, 5, 1, 10, 7, 0).unwrap())
        );

        assert_eq!(entries[1].name(), "level2");
        assert_eq!(entries[1].path(), "level2/");
        assert!(entries[1].is_directory());
        assert_eq!(
            entries[1].last_modified(),
            Some(&Utc.with_ymd_and_hms(2022, 9, 13, 18, 3, 0).unwrap())
        );
    }

    #[test]
    fn recovers_truncated_names() {
        let entries = extract(&Html::parse_document(LISTING));
        assert_eq!(entries[2].name(), "a really long file name indeed.txt");
        assert_eq!(entries[2].path(), "a%20really%20long%20file%20name%20indeed.txt");
    }

    #[test]
    fn falls_back_to_trailing_slash_without_icons() {
        let html = "<pre><a href=\"docs/\">docs/</a>  2020-02-02 02:02  -\n<a href=\"x.bin\">x.bin</a>  garbage\n</pre>";
        let entries = extract(&Html::parse_document(html));
        assert_eq!(entries.len(), 2);
        assert!(entries[0].is_directory());
        assert_eq!(entries[0].name(), "docs");
        assert!(entries[1].is_file());
        assert!(entries[1].last_modified().is_none());
    }

    #[test]
    fn skips_back_links() {
        let html = "<pre><a href=\"../\">../</a>\n<a href=\"./\">./</a>\n<a href=\"x.txt\">x.txt</a> 01-Jan-2020 00:00 1\n</pre>";
        let entries = extract(&Html::parse_document(html));
        let got: Vec<_> = entries
            .iter()
            .map(|e| (e.name(), e.path(), e.is_directory()))
            .collect();
        assert_eq!(got, [("x.txt", "x.txt", false)]);
    }
}
