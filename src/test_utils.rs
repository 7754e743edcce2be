//! Helpers for testing code built on top of this crate: synthetic listings
//! in every layout and an in-memory [`Fetcher`].
use std::collections::HashMap;
use std::fmt::Write;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::DateTime;
use chrono::TimeZone;
use chrono::Utc;
use percent_encoding::AsciiSet;
use percent_encoding::CONTROLS;
use percent_encoding::utf8_percent_encode;
use similar::ChangeTag;
use similar::TextDiff;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::Entry;
use crate::Error;
use crate::Format;
use crate::fetch::FetchResponse;
use crate::fetch::Fetcher;
use crate::utils::format_listing_time;

/// Characters escaped in generated hrefs.
const HREF: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?');

/// Visible name width of preformatted listings before truncation.
const NAME_WIDTH: usize = 23;

/// A file or directory to render into a synthetic listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixtureEntry {
    /// Name without trailing separator.
    pub name: String,
    /// Whether the entry is a directory.
    pub is_directory: bool,
    /// Modification time shown by layouts that have one.
    pub last_modified: DateTime<Utc>,
}

impl FixtureEntry {
    /// The href a server would emit for this entry.
    pub fn href(&self) -> String {
        let encoded = utf8_percent_encode(&self.name, HREF).to_string();
        if self.is_directory {
            format!("{encoded}/")
        } else {
            encoded
        }
    }
}

/// A synthetic directory listing that can be rendered in every layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingFixture {
    /// Href of the parent directory link.
    pub parent: String,
    /// Entries in listing order.
    pub entries: Vec<FixtureEntry>,
}

impl ListingFixture {
    /// Creates a listing that only links back to `parent`.
    pub fn new(parent: &str) -> Self {
        Self {
            parent: parent.to_owned(),
            entries: vec![],
        }
    }

    /// A listing mixing files, directories, escaped and over-long names.
    pub fn sample() -> Self {
        let t = |d, h, m| Utc.with_ymd_and_hms(2023, 5, d, h, m, 0).unwrap();
        Self::new("/cdn/")
            .with_file("ReadMe.txt", t(1, 10, 7))
            .with_directory("level2", t(2, 11, 0))
            .with_file("with space & ampersand.txt", t(3, 12, 30))
            .with_directory("15.0.0", t(4, 0, 59))
            .with_file("a-file-name-that-is-far-too-long-to-show.zip", t(5, 23, 1))
            .with_file("UnicodeData.txt", t(6, 6, 6))
    }

    /// Appends a file.
    pub fn with_file(mut self, name: &str, last_modified: DateTime<Utc>) -> Self {
        self.entries.push(FixtureEntry {
            name: name.to_owned(),
            is_directory: false,
            last_modified,
        });
        self
    }

    /// Appends a directory.
    pub fn with_directory(mut self, name: &str, last_modified: DateTime<Utc>) -> Self {
        self.entries.push(FixtureEntry {
            name: name.to_owned(),
            is_directory: true,
            last_modified,
        });
        self
    }

    /// Renders the listing as a complete html page in `format`.
    pub fn render(&self, format: Format) -> String {
        let body = match format {
            Format::List => self.render_list(),
            Format::Preformatted => self.render_pre(),
            Format::Table => self.render_table(),
        };
        format!(
            "<!DOCTYPE HTML PUBLIC \"-//W3C//DTD HTML 3.2 Final//EN\">\n<html>\n <head>\n  \
             <title>Index of /</title>\n </head>\n <body>\n<h1>Index of /</h1>\n{body}</body></html>\n"
        )
    }

    fn render_list(&self) -> String {
        let mut out = format!(
            "<ul><li><a href=\"{}\"> Parent Directory</a></li>\n",
            escape(&self.parent)
        );
        for entry in &self.entries {
            let slash = if entry.is_directory { "/" } else { "" };
            let _ = writeln!(
                out,
                "<li><a href=\"{}\"> {}{slash}</a></li>",
                escape(&entry.href()),
                escape(&entry.name)
            );
        }
        out.push_str("</ul>\n");
        out
    }

    fn render_pre(&self) -> String {
        let sort = |c: char, label: &str| format!("<a href=\"?C={c};O=A;F=1\">{label}</a>");
        let mut out = format!(
            "<pre><img src=\"/icons/blank.gif\" alt=\"Icon \"> {}                    {}      {}  {}<hr>\
             <img src=\"/icons/back.gif\" alt=\"[PARENTDIR]\"> <a href=\"{}\">Parent Directory</a>                             -   \n",
            sort('N', "Name"),
            sort('M', "Last modified"),
            sort('S', "Size"),
            sort('D', "Description"),
            escape(&self.parent)
        );
        for (i, entry) in self.entries.iter().enumerate() {
            let (icon, alt) = if entry.is_directory {
                ("folder.gif", "[DIR]")
            } else {
                ("text.gif", "[TXT]")
            };
            let mut label = entry.name.clone();
            if entry.is_directory {
                label.push('/');
            }
            let label = if label.chars().count() > NAME_WIDTH {
                let short: String = label.chars().take(NAME_WIDTH - 3).collect();
                format!("{}..&gt;", escape(&short))
            } else {
                escape(&label)
            };
            // Alternate both date shapes servers are known to print.
            let date = if i % 2 == 0 {
                format_listing_time(&entry.last_modified)
            } else {
                entry.last_modified.format("%d-%b-%Y %H:%M").to_string()
            };
            let _ = writeln!(
                out,
                "<img src=\"/icons/{icon}\" alt=\"{alt}\"> <a href=\"{}\">{label}</a>    {date}  {}",
                escape(&entry.href()),
                if entry.is_directory { "  - " } else { "1.2K" }
            );
        }
        out.push_str("<hr></pre>\n");
        out
    }

    fn render_table(&self) -> String {
        let sort = |c: char, label: &str| format!("<th><a href=\"?C={c};O=A;F=2\">{label}</a></th>");
        let mut out = format!(
            "<table>\n   <tr><th valign=\"top\"><img src=\"/icons/blank.gif\" alt=\"[ICO]\"></th>{}{}{}{}</tr>\n   \
             <tr><th colspan=\"5\"><hr></th></tr>\n\
             <tr><td valign=\"top\"><img src=\"/icons/back.gif\" alt=\"[PARENTDIR]\"></td><td><a href=\"{}\">Parent Directory</a></td><td>&nbsp;</td><td align=\"right\">  - </td><td>&nbsp;</td></tr>\n",
            sort('N', "Name"),
            sort('M', "Last modified"),
            sort('S', "Size"),
            sort('D', "Description"),
            escape(&self.parent)
        );
        for entry in &self.entries {
            let (icon, alt, slash) = if entry.is_directory {
                ("folder.gif", "[DIR]", "/")
            } else {
                ("text.gif", "[TXT]", "")
            };
            let _ = writeln!(
                out,
                "<tr><td valign=\"top\"><img src=\"/icons/{icon}\" alt=\"{alt}\"></td><td><a href=\"{}\">{}{slash}</a></td><td align=\"right\">{}  </td><td align=\"right\">  - </td><td>&nbsp;</td></tr>",
                escape(&entry.href()),
                escape(&entry.name),
                format_listing_time(&entry.last_modified)
            );
        }
        out.push_str("   <tr><th colspan=\"5\"><hr></th></tr>\n</table>\n");
        out
    }

    fn expected_lines(&self, format: Format) -> Vec<String> {
        self.entries
            .iter()
            .map(|e| {
                let time = (format != Format::List).then_some(e.last_modified);
                describe(e.is_directory, &e.name, &e.href(), time.as_ref())
            })
            .collect()
    }

    /// Returns `None` if `entries` is exactly what this listing holds when
    /// rendered in `format`, or a line diff of the mismatch.
    pub fn diff(&self, entries: &[Entry], format: Format) -> Option<String> {
        let expected = self.expected_lines(format).join("\n");
        let actual = entries
            .iter()
            .map(|e| describe(e.is_directory(), e.name(), e.path(), e.last_modified()))
            .collect::<Vec<_>>()
            .join("\n");

        let diff = TextDiff::from_lines(&expected, &actual);
        let mut diffs = String::new();
        for change in diff.iter_all_changes() {
            let sign = match change.tag() {
                ChangeTag::Delete => "-",
                ChangeTag::Insert => "+",
                ChangeTag::Equal => continue,
            };
            let _ = writeln!(diffs, "{sign}{}", change.value().trim_end());
        }
        if diffs.is_empty() { None } else { Some(diffs) }
    }
}

fn describe(is_directory: bool, name: &str, path: &str, time: Option<&DateTime<Utc>>) -> String {
    format!(
        "{}\t{name}\t{path}\t{}",
        if is_directory { "DIR" } else { "FILE" },
        time.map(|t| t.to_rfc3339()).unwrap_or_else(|| "-".to_owned())
    )
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// A request observed by [`StaticFetcher`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    /// Requested url.
    pub url: String,
    /// Headers sent along.
    pub headers: Vec<(String, String)>,
}

/// In-memory [`Fetcher`] serving fixed pages. Unknown urls answer 404.
#[derive(Debug, Default)]
pub struct StaticFetcher {
    pages: HashMap<String, String>,
    requests: Mutex<Vec<Request>>,
}

impl StaticFetcher {
    /// Creates a fetcher serving nothing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Serves `body` at `url`.
    pub fn with_page(mut self, url: &str, body: impl Into<String>) -> Self {
        self.pages.insert(url.to_owned(), body.into());
        self
    }

    /// Requests received so far, in arrival order.
    pub fn requests(&self) -> Vec<Request> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Fetcher for StaticFetcher {
    async fn get(
        &self,
        url: &Url,
        headers: &[(String, String)],
        cancel: &CancellationToken,
    ) -> Result<FetchResponse, Error> {
        if cancel.is_cancelled() {
            return Err(Error::Cancelled {
                url: url.to_string(),
            });
        }
        self.requests.lock().unwrap().push(Request {
            url: url.to_string(),
            headers: headers.to_vec(),
        });
        // Let sibling branches interleave as they would over the network.
        tokio::task::yield_now().await;
        let response = match self.pages.get(url.as_str()) {
            Some(body) => FetchResponse {
                url: url.to_string(),
                status: 200,
                body: body.clone(),
            },
            None => FetchResponse {
                url: url.to_string(),
                status: 404,
                body: String::new(),
            },
        };
        Ok(response)
    }
}
