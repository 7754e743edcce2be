//! Parse auto-generated directory listing pages and walk remote directory
//! trees served only as html.
//!
//! Web servers such as Apache's `mod_autoindex` render a directory in one of
//! three layouts: a plain list (`F0`), preformatted text (`F1`) or a table
//! (`F2`). [`parse`] detects the layout and returns the same flat list of
//! [`Entry`] records for all of them.
//!
//! ```rust
//! # use autoindex::parse;
//! # use autoindex::ParseOptions;
//! let html = r#"<table>
//! <tr><th><a href="?C=N;O=D;F=2">Name</a></th></tr>
//! <tr><td><img alt="[PARENTDIR]"></td><td><a href="/">Parent Directory</a></td><td>&nbsp;</td></tr>
//! <tr><td><img alt="[DIR]"></td><td><a href="15.0.0/">15.0.0/</a></td><td>2022-09-13 18:03</td></tr>
//! <tr><td><img alt="[TXT]"></td><td><a href="ReadMe.txt">ReadMe.txt</a></td><td>2022-09-13 18:04</td></tr>
//! </table>"#;
//!
//! let entries = parse(html, ParseOptions::new().with_base_path("cdn/unicode"));
//! assert_eq!(entries.len(), 2);
//! assert!(entries[0].is_directory());
//! assert_eq!(entries[0].name(), "15.0.0");
//! assert_eq!(entries[0].path(), "/cdn/unicode/15.0.0/");
//! println!("{}", serde_json::to_string_pretty(&entries).unwrap());
//! ```
//!
//! The output might look like
//! ```json
//! [
//!   {
//!     "type": "directory",
//!     "name": "15.0.0",
//!     "path": "/cdn/unicode/15.0.0/",
//!     "lastModified": "2022-09-13T18:03:00Z"
//!   },
//!   {
//!     "type": "file",
//!     "name": "ReadMe.txt",
//!     "path": "/cdn/unicode/ReadMe.txt",
//!     "lastModified": "2022-09-13T18:04:00Z"
//!   }
//! ]
//! ```
//!
//! [`traverse`] fetches a listing, parses it and descends into every
//! directory, returning directories with their `children` resolved.
//!
//! ```rust,no_run
//! # tokio_test::block_on(async {
//! use autoindex::TraverseOptions;
//! use autoindex::traverse;
//!
//! let options = TraverseOptions::new()
//!     .with_base_path("/unicode")
//!     .on_file(|file| async move { println!("{}", file.path) });
//! let tree = traverse("https://unicode.org/Public/", &options).await.unwrap();
//! println!("{} top level entries", tree.len());
//! # })
//! ```

mod entry;
mod errors;
mod extract;
mod fetch;
mod format;
mod parse;
pub mod path;
mod traverse;
pub mod utils;

pub use entry::DirectoryEntry;
pub use entry::Entry;
pub use entry::FileEntry;
pub use errors::Error;
pub use fetch::DEFAULT_TIMEOUT_MS;
pub use fetch::FetchResponse;
pub use fetch::Fetcher;
pub use fetch::HttpFetcher;
pub use format::Format;
pub use format::infer_format;
pub use parse::ParseOptions;
pub use parse::parse;
pub use parse::parse_with_format;
pub use traverse::DirectoryCallback;
pub use traverse::ErrorCallback;
pub use traverse::FileCallback;
pub use traverse::TraverseOptions;
pub use traverse::traverse;
pub use traverse::traverse_with;

#[cfg(feature = "test_utils")]
pub mod test_utils;
