use maud::{DOCTYPE, Markup, PreEscaped, html};

use crate::builtin;
use crate::controller::PostListController;
use crate::hashtags::VOCABULARY;
use crate::post::Post;
use crate::routes::Route;

pub const SITE_NAME: &str = "BlogApp";
pub const CSS_HREF: &str = "/assets/site.css";
pub const PREVIEW_CHARS: usize = 100;

/// First `PREVIEW_CHARS` characters of the body followed by `...`.
/// Shorter bodies are kept whole.
pub fn preview(body: &str) -> String {
    let mut out: String = body.chars().take(PREVIEW_CHARS).collect();
    out.push_str("...");
    out
}

pub fn post_card(post: &Post) -> Markup {
    let href = Route::Post(post.id).href();
    let title = post.title.to_lowercase();
    let body = post.body.to_lowercase();
    let tags = post.hashtags.join(" ");

    html! {
        article class="post-card" data-id=(post.id) data-title=(title) data-body=(body) data-tags=(tags) {
            h2 {
                a href=(href) { (post.title) }
            }
            p { (preview(&post.body)) }
            @if !post.hashtags.is_empty() {
                div class="br-card-tags" {
                    @for tag in &post.hashtags {
                        span class="br-tag" { (tag) }
                    }
                }
            }
            a class="br-read-more" href=(href) { "Read More →" }
        }
    }
}

fn navbar(current: Route) -> Markup {
    let home_active = matches!(current, Route::Home | Route::Page(_));
    let about_active = current == Route::About;

    html! {
        nav class="br-nav" {
            div class="br-nav-inner" {
                a class="br-brand" href="/" { (SITE_NAME) }
                div class="br-nav-links" {
                    a href="/" class=[home_active.then_some("active")] { "Home" }
                    a href=(Route::About.href()) class=[about_active.then_some("active")] { "About" }
                }
            }
        }
    }
}

pub fn layout(title: &str, current: Route, content: Markup, script: Option<&str>) -> String {
    let full_title = if title == SITE_NAME {
        title.to_string()
    } else {
        format!("{title} | {SITE_NAME}")
    };

    let markup: Markup = html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { (full_title) }
                link rel="stylesheet" href=(CSS_HREF);
            }
            body {
                (navbar(current))
                main class="br-main" {
                    (content)
                }
                @if let Some(js) = script {
                    script { (PreEscaped(js)) }
                }
            }
        }
    };
    markup.into_string()
}

/// One list page: the visible posts among the first `upto` items, plus a
/// link to `next` when more pages were rendered.
pub fn render_list_page(
    ctrl: &PostListController,
    upto: usize,
    current: Route,
    next: Option<Route>,
) -> String {
    let posts = ctrl.visible_prefix(upto);
    let selected = ctrl.selected_tag();

    let content = html! {
        h1 class="br-heading" { "Blog Posts" }
        div class="br-search" {
            input id="br-search" type="text" placeholder="Search posts by keyword..."
                value=(ctrl.search_text());
        }
        div class="br-tags" {
            @for tag in VOCABULARY {
                button.br-tag.selected[selected == Some(tag)] type="button" data-tag=(tag) { (tag) }
            }
        }
        div class="br-grid" {
            @for post in &posts {
                (post_card(post))
            }
        }
        p id="br-empty" class="br-empty" hidden[!posts.is_empty()] { "No posts match." }
        @if let Some(next) = next {
            div class="br-more" {
                a class="br-button" href=(next.href()) { "Load More" }
            }
        }
    };
    layout(SITE_NAME, current, content, Some(builtin::FILTER_JS))
}

pub fn render_detail_page(post: &Post) -> String {
    let content = html! {
        article class="br-detail" {
            h1 { (post.title) }
            p class="br-body" { (post.body) }
            p class="br-meta" { "Post ID: " (post.id) " | Author: " (post.user_id) }
        }
    };
    layout(&post.title, Route::Post(post.id), content, None)
}

/// User-visible not-found state; `what` names the missing resource.
pub fn render_not_found_page(what: Option<&str>) -> String {
    let content = html! {
        div class="br-detail" {
            h1 { "Not found" }
            @if let Some(what) = what {
                p class="br-body" { "No " (what) " exists." }
            } @else {
                p class="br-body" { "This page does not exist." }
            }
            p class="br-meta" { a href="/" { "Back to all posts" } }
        }
    };
    layout("Not found", Route::NotFound, content, None)
}

pub fn render_about_page(api_url: &str) -> String {
    let content = html! {
        div class="br-detail" {
            h1 { "About" }
            p class="br-body" {
                "A small blog reader. Posts come from " code { (api_url) } "; "
                "tags are assigned locally and are not stored anywhere."
            }
        }
    };
    layout("About", Route::About, content, None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::tests::post;
    use crate::hashtags::TagAssigner;

    #[test]
    fn preview_truncates_long_bodies_to_100_chars() {
        let body = "a".repeat(250);
        let p = preview(&body);
        assert_eq!(p, format!("{}...", "a".repeat(100)));
    }

    #[test]
    fn preview_keeps_short_bodies_whole() {
        assert_eq!(preview("short"), "short...");
        assert_eq!(preview(""), "...");
        let exact = "b".repeat(100);
        assert_eq!(preview(&exact), format!("{exact}..."));
    }

    #[test]
    fn preview_counts_characters_not_bytes() {
        let body = "é".repeat(120);
        assert_eq!(preview(&body).chars().count(), 103);
    }

    #[test]
    fn card_links_to_detail_and_shows_tags() {
        let mut p = post(7, "Title <b>", "Body");
        p.hashtags = vec!["#tech".to_string(), "#food".to_string()];
        let html = post_card(&p).into_string();
        assert!(html.contains("href=\"/post/7/\""));
        assert!(html.contains("Title &lt;b&gt;"));
        assert!(html.contains("data-tags=\"#tech #food\""));
        assert!(html.contains("Read More →"));
    }

    #[test]
    fn card_carries_title_and_body_separately() {
        let html = post_card(&post(1, "Hello", "World")).into_string();
        assert!(html.contains("data-title=\"hello\""));
        assert!(html.contains("data-body=\"world\""));
        assert!(!html.contains("data-search"));
        assert!(!html.contains("hello world"));
    }

    #[test]
    fn card_without_tags_has_no_badges() {
        let html = post_card(&post(1, "t", "b")).into_string();
        assert!(!html.contains("br-card-tags"));
    }

    #[test]
    fn list_page_marks_selected_tag_and_next_link() {
        let mut ctrl = PostListController::new(
            (1..=6).map(|id| post(id, "t", "b")).collect(),
            6,
            TagAssigner::new(3),
        );
        ctrl.set_selected_tag("#news");
        let html = render_list_page(&ctrl, 6, Route::Home, Some(Route::Page(2)));
        assert_eq!(html.matches("br-tag selected").count(), 1);
        assert!(html.contains("data-tag=\"#news\">#news</button>"));
        assert!(html.contains("href=\"/page/2/\""));
        assert!(html.contains("<a href=\"/\" class=\"active\">Home</a>"));
    }

    #[test]
    fn detail_page_shows_meta() {
        let html = render_detail_page(&post(9, "Hello", "World"));
        assert!(html.contains("Post ID: 9 | Author: 1"));
        assert!(html.contains("<title>Hello | BlogApp</title>"));
    }
}
