use kuchiki::traits::TendrilSink as _;

use crate::render::CSS_HREF;
use crate::routes::{Route, StaticPaths};

/// Fails if `html` links to a site-internal route that was not enumerated,
/// or references a local asset the site does not ship.
pub fn assert_links_resolve(html: &str, paths: &StaticPaths) -> anyhow::Result<()> {
    let doc = kuchiki::parse_html().one(html);

    if let Ok(nodes) = doc.select("a[href]") {
        for node in nodes {
            let attrs = node.attributes.borrow();
            let Some(href) = attrs.get("href") else { continue };
            if !is_internal(href) {
                continue;
            }
            if Route::resolve(href, paths) == Route::NotFound {
                anyhow::bail!("link check failed: <a href=\"{}\"> resolves to no page", href);
            }
        }
    }

    for (selector, attr) in [("link[href]", "href"), ("script[src]", "src"), ("img[src]", "src")] {
        if let Ok(nodes) = doc.select(selector) {
            for node in nodes {
                let attrs = node.attributes.borrow();
                let Some(v) = attrs.get(attr) else { continue };
                if is_internal(v) && v != CSS_HREF {
                    anyhow::bail!(
                        "link check failed: <{} {}=\"{}\"> is not a shipped asset",
                        node.name.local.as_ref(),
                        attr,
                        v
                    );
                }
            }
        }
    }

    Ok(())
}

fn is_internal(v: &str) -> bool {
    let s = v.trim();
    s.starts_with('/') && !s.starts_with("//")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paths() -> StaticPaths {
        StaticPaths::new([1, 2], 1)
    }

    #[test]
    fn accepts_known_routes_and_external_links() {
        let html = r##"<html><head><link rel="stylesheet" href="/assets/site.css"></head>
<body><a href="/">home</a><a href="/post/2/">p</a><a href="/about/">a</a>
<a href="https://example.com/x">ext</a><a href="#top">top</a></body></html>"##;
        assert_links_resolve(html, &paths()).unwrap();
    }

    #[test]
    fn rejects_unenumerated_post() {
        let html = r#"<a href="/post/3/">missing</a>"#;
        let err = assert_links_resolve(html, &paths()).unwrap_err();
        assert!(err.to_string().contains("/post/3/"));
    }

    #[test]
    fn rejects_unrendered_page() {
        let html = r#"<a href="/page/2/">more</a>"#;
        assert!(assert_links_resolve(html, &paths()).is_err());
    }

    #[test]
    fn rejects_unknown_asset() {
        let html = r#"<script src="/assets/app.js"></script>"#;
        assert!(assert_links_resolve(html, &paths()).is_err());
    }
}
