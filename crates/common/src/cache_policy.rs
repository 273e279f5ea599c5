//! Extension-keyed cache lifetimes.
//!
//! Markup and data files revalidate after 15 minutes, scripts and stylesheets
//! after two days, and everything else is cached for thirty days.

use crate::key::ObjectKey;

/// `max-age` for `html`, `xml`, `json` and `txt` objects (15 minutes).
pub const SHORT_MAX_AGE: u32 = 900;

/// `max-age` for `js` and `css` objects (2 days).
pub const MEDIUM_MAX_AGE: u32 = 172_800;

/// `max-age` for every other object, including keys without an extension (30 days).
pub const LONG_MAX_AGE: u32 = 2_592_000;

/// Return the `max-age` in seconds for `key`.
///
/// Extensions are matched exactly; `INDEX.HTML` falls into the long tier.
pub fn max_age(key: &ObjectKey) -> u32 {
    match key.extension() {
        Some("html" | "xml" | "json" | "txt") => SHORT_MAX_AGE,
        Some("js" | "css") => MEDIUM_MAX_AGE,
        _ => LONG_MAX_AGE,
    }
}

/// Render the `Cache-Control` header value for `key`.
pub fn cache_control(key: &ObjectKey) -> String {
    format!("public, max-age={}", max_age(key))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::resolve;

    #[test]
    fn tiers() {
        assert_eq!(max_age(&resolve("index.html")), 900);
        assert_eq!(max_age(&resolve("app.js")), 172_800);
        assert_eq!(max_age(&resolve("logo.png")), 2_592_000);
    }

    #[test]
    fn short_tier_extensions() {
        for p in ["/sitemap.xml", "/data/feed.json", "/robots.txt", "/about"] {
            assert_eq!(max_age(&resolve(p)), SHORT_MAX_AGE, "path {p}");
        }
    }

    #[test]
    fn medium_tier_extensions() {
        assert_eq!(max_age(&resolve("/css/site.css")), MEDIUM_MAX_AGE);
        assert_eq!(max_age(&resolve("/app.min.js")), MEDIUM_MAX_AGE);
    }

    #[test]
    fn unmatched_extensions_use_long_tier() {
        assert_eq!(max_age(&resolve("/v1.0/page")), LONG_MAX_AGE);
        assert_eq!(max_age(&resolve("/INDEX.HTML")), LONG_MAX_AGE);
        assert_eq!(max_age(&resolve("/fonts/inter.woff2")), LONG_MAX_AGE);
    }

    #[test]
    fn header_value() {
        assert_eq!(cache_control(&resolve("/")), "public, max-age=900");
        assert_eq!(cache_control(&resolve("/logo.png")), "public, max-age=2592000");
    }
}
