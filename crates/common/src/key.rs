//! Mapping of request paths onto storage object keys.
//!
//! Directory-style URLs (`/blog/`) and extensionless URLs (`/about`) resolve to
//! the `index.html` inside that directory; anything containing a `.` is treated
//! as a direct asset path and returned unchanged.

use std::fmt;

/// Name of the document served for directory-style requests.
pub const INDEX_DOCUMENT: &str = "index.html";

/// Storage lookup key derived from a request path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectKey(String);

impl ObjectKey {
    /// Borrow the key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the key, returning the owned string.
    pub fn into_string(self) -> String {
        self.0
    }

    /// Text after the last `.` anywhere in the key, or `None` if the key has no `.`.
    ///
    /// The whole key is considered, not just the final segment, so
    /// `v1.0/page` yields `"0/page"`.
    pub fn extension(&self) -> Option<&str> {
        self.0.rsplit_once('.').map(|(_, ext)| ext)
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ObjectKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Resolve a (percent-decoded) request path to the object key it names.
///
/// Total over all inputs:
///
/// 1. one leading `/` is stripped;
/// 2. an empty remainder becomes `index.html`;
/// 3. a trailing `/` gets `index.html` appended;
/// 4. a remainder without any `.` gets `/index.html` appended;
/// 5. anything else is returned as is.
///
/// A `.` in a directory segment counts as an extension (`/v1.0/page` stays
/// `v1.0/page`). Existing links rely on this.
pub fn resolve(path: &str) -> ObjectKey {
    let path = path.strip_prefix('/').unwrap_or(path);

    if path.is_empty() {
        return ObjectKey(INDEX_DOCUMENT.to_owned());
    }
    if path.ends_with('/') {
        return ObjectKey(format!("{path}{INDEX_DOCUMENT}"));
    }
    if !path.contains('.') {
        return ObjectKey(format!("{path}/{INDEX_DOCUMENT}"));
    }
    ObjectKey(path.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_resolves_to_index() {
        assert_eq!(resolve("").as_str(), "index.html");
        assert_eq!(resolve("/").as_str(), "index.html");
    }

    #[test]
    fn trailing_slash_appends_index() {
        assert_eq!(resolve("/blog/").as_str(), "blog/index.html");
        assert_eq!(resolve("/blog/post/").as_str(), "blog/post/index.html");
    }

    #[test]
    fn trailing_slash_matches_explicit_index() {
        for p in ["/", "/blog/", "/a/b/c/", "/v1.0/", "relative/"] {
            assert_eq!(resolve(p), resolve(&format!("{p}index.html")), "path {p}");
        }
    }

    #[test]
    fn extensionless_path_is_a_directory() {
        assert_eq!(resolve("/about").as_str(), "about/index.html");
        assert_eq!(resolve("/docs/getting-started").as_str(), "docs/getting-started/index.html");
    }

    #[test]
    fn asset_path_is_unchanged() {
        assert_eq!(resolve("/app.js").as_str(), "app.js");
        assert_eq!(resolve("/img/logo.png").as_str(), "img/logo.png");
    }

    #[test]
    fn dot_in_directory_segment_counts_as_extension() {
        assert_eq!(resolve("/v1.0/page").as_str(), "v1.0/page");
    }

    #[test]
    fn only_one_leading_slash_is_stripped() {
        assert_eq!(resolve("//").as_str(), "/index.html");
        assert_eq!(resolve("//app.js").as_str(), "/app.js");
    }

    #[test]
    fn path_without_leading_slash() {
        assert_eq!(resolve("about").as_str(), "about/index.html");
        assert_eq!(resolve("app.js").as_str(), "app.js");
    }

    #[test]
    fn extension_uses_last_dot_of_whole_key() {
        assert_eq!(resolve("/app.min.js").extension(), Some("js"));
        assert_eq!(resolve("/v1.0/page").extension(), Some("0/page"));
        assert_eq!(ObjectKey("LICENSE".into()).extension(), None);
    }
}
