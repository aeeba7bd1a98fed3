use std::collections::BTreeSet;
use std::path::PathBuf;

use crate::repository::parse_post_id;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Home,
    /// List page `n` (n >= 2); page 1 is `Home`.
    Page(u32),
    Post(u64),
    About,
    NotFound,
}

/// The set of routes that exist, enumerated before any page is rendered.
#[derive(Debug, Clone, Default)]
pub struct StaticPaths {
    post_ids: BTreeSet<u64>,
    pages: u32,
}

impl StaticPaths {
    pub fn new(post_ids: impl IntoIterator<Item = u64>, pages: u32) -> Self {
        Self {
            post_ids: post_ids.into_iter().collect(),
            pages: pages.max(1),
        }
    }

    pub fn post_ids(&self) -> impl Iterator<Item = u64> + '_ {
        self.post_ids.iter().copied()
    }

    pub fn pages(&self) -> u32 {
        self.pages
    }

    pub fn contains_post(&self, id: u64) -> bool {
        self.post_ids.contains(&id)
    }
}

impl Route {
    /// Resolves a site-absolute path. Unknown ids and pages resolve to `NotFound`.
    pub fn resolve(path: &str, paths: &StaticPaths) -> Route {
        let path = path.split(['?', '#']).next().unwrap_or("");
        let segs: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        match segs.as_slice() {
            [] | ["index.html"] => Route::Home,
            ["about"] | ["about", "index.html"] => Route::About,
            ["post", id] | ["post", id, "index.html"] => match parse_post_id(id) {
                Some(id) if paths.contains_post(id) => Route::Post(id),
                _ => Route::NotFound,
            },
            ["page", n] | ["page", n, "index.html"] => match parse_post_id(n) {
                Some(1) => Route::Home,
                Some(k) if k >= 2 && k <= u64::from(paths.pages()) => Route::Page(k as u32),
                _ => Route::NotFound,
            },
            _ => Route::NotFound,
        }
    }

    pub fn href(self) -> String {
        match self {
            Route::Home => "/".to_string(),
            Route::Page(n) => format!("/page/{n}/"),
            Route::Post(id) => format!("/post/{id}/"),
            Route::About => "/about/".to_string(),
            Route::NotFound => "/404.html".to_string(),
        }
    }

    /// File path of the rendered page, relative to the site root.
    pub fn output_path(self) -> PathBuf {
        match self {
            Route::Home => PathBuf::from("index.html"),
            Route::Page(n) => PathBuf::from(format!("page/{n}/index.html")),
            Route::Post(id) => PathBuf::from(format!("post/{id}/index.html")),
            Route::About => PathBuf::from("about/index.html"),
            Route::NotFound => PathBuf::from("404.html"),
        }
    }

    /// List page number for a list route.
    pub fn list_page(n: u32) -> Route {
        if n <= 1 { Route::Home } else { Route::Page(n) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paths() -> StaticPaths {
        StaticPaths::new([1, 2, 3, 42], 3)
    }

    #[test]
    fn resolves_known_routes() {
        let p = paths();
        assert_eq!(Route::resolve("/", &p), Route::Home);
        assert_eq!(Route::resolve("/index.html", &p), Route::Home);
        assert_eq!(Route::resolve("/about/", &p), Route::About);
        assert_eq!(Route::resolve("/post/42", &p), Route::Post(42));
        assert_eq!(Route::resolve("/post/42/", &p), Route::Post(42));
        assert_eq!(Route::resolve("/post/3/index.html", &p), Route::Post(3));
        assert_eq!(Route::resolve("/page/2/", &p), Route::Page(2));
        assert_eq!(Route::resolve("/page/1/", &p), Route::Home);
        assert_eq!(Route::resolve("/?q=x", &p), Route::Home);
    }

    #[test]
    fn unknown_or_non_canonical_ids_are_not_found() {
        let p = paths();
        assert_eq!(Route::resolve("/post/99", &p), Route::NotFound);
        assert_eq!(Route::resolve("/post/042", &p), Route::NotFound);
        assert_eq!(Route::resolve("/post/abc", &p), Route::NotFound);
        assert_eq!(Route::resolve("/page/4/", &p), Route::NotFound);
        assert_eq!(Route::resolve("/page/02/", &p), Route::NotFound);
        assert_eq!(Route::resolve("/contact", &p), Route::NotFound);
    }

    #[test]
    fn href_round_trips_through_resolve() {
        let p = paths();
        for route in [Route::Home, Route::Page(2), Route::Post(42), Route::About] {
            assert_eq!(Route::resolve(&route.href(), &p), route);
        }
    }
}
