//! Recursive traversal of a remote directory tree.
//!
//! Every directory found in a listing is fetched and parsed in turn. Sibling
//! directories are walked concurrently and joined before their parent
//! resolves. A branch whose fetch fails resolves to an empty list of
//! children; it never aborts the rest of the traversal.

use std::future::Future;
use std::sync::Arc;

use async_recursion::async_recursion;
use derivative::Derivative;
use futures::FutureExt;
use futures::future::BoxFuture;
use futures::future::join_all;
use log::debug;
use log::warn;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::DirectoryEntry;
use crate::Entry;
use crate::FileEntry;
use crate::Format;
use crate::ParseOptions;
use crate::errors::Error;
use crate::fetch::Fetcher;
use crate::fetch::HttpFetcher;
use crate::parse::parse;
use crate::path::apply_base;
use crate::path::is_rooted;
use crate::path::join;

/// Observer invoked once per file.
pub type FileCallback = Arc<dyn Fn(FileEntry) -> BoxFuture<'static, ()> + Send + Sync>;
/// Observer invoked once per directory, after its children are resolved.
pub type DirectoryCallback = Arc<dyn Fn(DirectoryEntry) -> BoxFuture<'static, ()> + Send + Sync>;
/// Observer invoked with the url of every branch that degraded to empty.
pub type ErrorCallback = Arc<dyn Fn(String, Error) -> BoxFuture<'static, ()> + Send + Sync>;

/// Configuration of a traversal.
#[derive(Derivative, Clone, Default)]
#[derivative(Debug)]
pub struct TraverseOptions {
    /// Layout of every listing. Inferred per page when `None`.
    pub format: Option<Format>,
    /// Prefix applied to every produced path.
    pub base_path: Option<String>,
    /// Headers sent with every request.
    pub extra_headers: Vec<(String, String)>,
    /// Cancels all in-flight and future fetches.
    pub cancel: CancellationToken,
    /// Number of directory levels below the root to fetch. Unbounded when
    /// `None`.
    pub max_depth: Option<usize>,
    #[derivative(Debug = "ignore")]
    on_file: Option<FileCallback>,
    #[derivative(Debug = "ignore")]
    on_directory: Option<DirectoryCallback>,
    #[derivative(Debug = "ignore")]
    on_error: Option<ErrorCallback>,
}

impl TraverseOptions {
    /// Creates options with format inference, relative paths and no
    /// observers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Skips format inference and uses `format` for every page.
    pub fn with_format(mut self, format: Format) -> Self {
        self.format = Some(format);
        self
    }

    /// Rewrites every path to live under `base_path`.
    pub fn with_base_path(mut self, base_path: impl Into<String>) -> Self {
        self.base_path = Some(base_path.into());
        self
    }

    /// Adds a header sent with every request.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra_headers.push((name.into(), value.into()));
        self
    }

    /// Uses `cancel` to abandon the traversal.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Stops descending `max_depth` levels below the root.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = Some(max_depth);
        self
    }

    /// Calls `f` for every file and waits for it before the file is done.
    pub fn on_file<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(FileEntry) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.on_file = Some(Arc::new(move |entry| f(entry).boxed()));
        self
    }

    /// Calls `f` for every directory once its children are resolved.
    pub fn on_directory<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(DirectoryEntry) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.on_directory = Some(Arc::new(move |entry| f(entry).boxed()));
        self
    }

    /// Calls `f` with the url and cause of every branch that failed and was
    /// resolved as empty.
    pub fn on_error<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(String, Error) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.on_error = Some(Arc::new(move |url, err| f(url, err).boxed()));
        self
    }
}

/// Walks the directory tree rooted at `root_url` over HTTP.
///
/// Only an unparseable `root_url` is an error. Failures while fetching any
/// listing, the root included, resolve that listing as empty.
pub async fn traverse(root_url: &str, options: &TraverseOptions) -> Result<Vec<Entry>, Error> {
    traverse_with(&HttpFetcher::default(), root_url, options).await
}

/// Walks the directory tree rooted at `root_url` using `fetcher`.
pub async fn traverse_with<F>(
    fetcher: &F,
    root_url: &str,
    options: &TraverseOptions,
) -> Result<Vec<Entry>, Error>
where
    F: Fetcher + ?Sized,
{
    let mut root = Url::parse(root_url)
        .map_err(|e| Error::InvalidArgument(format!("invalid root url {root_url}: {e}")))?;
    if !root.path().ends_with('/') {
        let path = format!("{}/", root.path());
        root.set_path(&path);
    }
    let walker = Walker { fetcher, options };
    Ok(walker.walk(root, None, 0).await)
}

struct Walker<'a, F: ?Sized> {
    fetcher: &'a F,
    options: &'a TraverseOptions,
}

impl<'a, F> Walker<'a, F>
where
    F: Fetcher + ?Sized,
{
    /// Fetches and resolves the listing at `url`. `prefix` is the path of
    /// the directory being listed, `None` at the root.
    #[async_recursion]
    async fn walk(&self, url: Url, prefix: Option<String>, depth: usize) -> Vec<Entry> {
        let body = match self.fetch(&url).await {
            Ok(body) => body,
            Err(e) => {
                self.report(&url, e).await;
                return vec![];
            }
        };
        let entries = parse(&body, ParseOptions::from(self.options.format));
        debug!("{url}: {} entries at depth {depth}", entries.len());

        let branches = entries
            .into_iter()
            .map(|entry| self.resolve(&url, prefix.as_deref(), entry, depth));
        join_all(branches).await
    }

    async fn resolve(&self, url: &Url, prefix: Option<&str>, entry: Entry, depth: usize) -> Entry {
        let path = self.entry_path(prefix, entry.path(), entry.is_directory());
        match entry {
            Entry::File(mut file) => {
                file.path = path;
                if let Some(on_file) = &self.options.on_file {
                    on_file(file.clone()).await;
                }
                Entry::File(file)
            }
            Entry::Directory(mut dir) => {
                let children = if self.options.max_depth.is_some_and(|max| depth >= max) {
                    debug!("not descending into {} past max depth", dir.path);
                    vec![]
                } else {
                    match child_url(url, &dir.path) {
                        Ok(child) => self.walk(child, Some(path.clone()), depth + 1).await,
                        Err(e) => {
                            self.report(url, e).await;
                            vec![]
                        }
                    }
                };
                dir.path = path;
                dir.children = Some(children);
                if let Some(on_directory) = &self.options.on_directory {
                    on_directory(dir.clone()).await;
                }
                Entry::Directory(dir)
            }
        }
    }

    async fn fetch(&self, url: &Url) -> Result<String, Error> {
        let response = self
            .fetcher
            .get(url, &self.options.extra_headers, &self.options.cancel)
            .await?;
        if !response.is_success() {
            return Err(Error::Status {
                url: response.url,
                status: response.status,
            });
        }
        Ok(response.body)
    }

    async fn report(&self, url: &Url, err: Error) {
        warn!("resolving {url} as empty: {err}");
        if let Some(on_error) = &self.options.on_error {
            on_error(url.to_string(), err).await;
        }
    }

    /// Path of an entry listed under `prefix`. Root level entries and rooted
    /// hrefs only get the base path applied.
    fn entry_path(&self, prefix: Option<&str>, href: &str, is_directory: bool) -> String {
        match (prefix, &self.options.base_path) {
            (Some(prefix), _) if !is_rooted(href) => join(prefix, href, is_directory),
            (_, Some(base)) => apply_base(base, href, is_directory),
            (_, None) => href.to_owned(),
        }
    }
}

/// Resolves `href` against the listing at `parent`, which always denotes a
/// directory.
fn child_url(parent: &Url, href: &str) -> Result<Url, Error> {
    let mut base = parent.clone();
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base.join(href).map_err(|e| Error::InvalidArgument(format!("invalid href {href}: {e}")))
}
