//! String helpers used to normalize listing hrefs into entry paths.
//!
//! Paths handled here are always `/` separated, independent of the host
//! platform. None of the helpers touch the filesystem.

/// The separator used by listing hrefs and entry paths.
pub const SEPARATOR: char = '/';

/// Returns `path` without any leading separators.
pub fn trim_leading_slash(path: &str) -> &str {
    path.trim_start_matches(SEPARATOR)
}

/// Returns `path` without any trailing separators.
pub fn trim_trailing_slash(path: &str) -> &str {
    path.trim_end_matches(SEPARATOR)
}

/// Returns `path` with exactly one leading separator.
pub fn with_leading_slash(path: &str) -> String {
    format!("{SEPARATOR}{}", trim_leading_slash(path))
}

/// Returns `path` with exactly one trailing separator.
pub fn with_trailing_slash(path: &str) -> String {
    format!("{}{SEPARATOR}", trim_trailing_slash(path))
}

/// Returns true if `href` carries its own scheme (`https://...`) or is a
/// protocol relative reference (`//host/...`).
pub fn is_absolute_url(href: &str) -> bool {
    if href.starts_with("//") {
        return true;
    }
    match href.split_once("://") {
        Some((scheme, _)) => {
            !scheme.is_empty()
                && scheme
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        }
        None => false,
    }
}

/// Returns true if `href` is rooted at the server root (`/dir/file`).
pub fn is_rooted(href: &str) -> bool {
    href.starts_with(SEPARATOR) && !is_absolute_url(href)
}

/// Collapses runs of separators into a single one.
///
/// Absolute urls are returned unchanged so that `https://` survives.
pub fn collapse_slashes(path: &str) -> String {
    if is_absolute_url(path) {
        return path.to_owned();
    }
    let mut ret = String::with_capacity(path.len());
    let mut previous_was_separator = false;
    for c in path.chars() {
        if c == SEPARATOR {
            if previous_was_separator {
                continue;
            }
            previous_was_separator = true;
        } else {
            previous_was_separator = false;
        }
        ret.push(c);
    }
    ret
}

/// Normalizes a caller supplied base path.
///
/// The result has exactly one leading separator, no trailing separator and
/// no duplicated separators. The root (`""` or `"/"`) normalizes to `""`.
pub fn normalize_base(base: &str) -> String {
    let trimmed = trim_trailing_slash(trim_leading_slash(base));
    if trimmed.is_empty() {
        return String::new();
    }
    collapse_slashes(&with_leading_slash(trimmed))
}

/// Forces the trailing separator rule: directories end with one, files
/// never do.
pub fn finish(path: &str, is_directory: bool) -> String {
    if is_absolute_url(path) {
        return path.to_owned();
    }
    if is_directory {
        with_trailing_slash(path)
    } else {
        trim_trailing_slash(path).to_owned()
    }
}

/// Rewrites `relative` so that it lives under `base`.
///
/// Absolute urls are passed through unchanged.
pub fn apply_base(base: &str, relative: &str, is_directory: bool) -> String {
    if is_absolute_url(relative) {
        return relative.to_owned();
    }
    let joined = format!(
        "{}{SEPARATOR}{}",
        normalize_base(base),
        trim_leading_slash(relative)
    );
    finish(&collapse_slashes(&joined), is_directory)
}

/// Joins `relative` onto `prefix`.
///
/// An empty prefix leaves `relative` untouched, as does an absolute url.
pub fn join(prefix: &str, relative: &str, is_directory: bool) -> String {
    if is_absolute_url(relative) || prefix.is_empty() {
        return relative.to_owned();
    }
    let joined = format!(
        "{}{SEPARATOR}{}",
        trim_trailing_slash(prefix),
        trim_leading_slash(relative)
    );
    finish(&collapse_slashes(&joined), is_directory)
}
