use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::builtin;
use crate::controller::{LoadOutcome, PostListController};
use crate::hashtags::TagAssigner;
use crate::links;
use crate::progress::Progress;
use crate::render;
use crate::repository::PostRepository;
use crate::routes::{Route, StaticPaths};

pub struct SiteConfig {
    pub out_dir: PathBuf,
    /// List pages to render; page 1 is the index.
    pub pages: u32,
    pub api_url: String,
}

#[derive(Debug, Default)]
pub struct SiteSummary {
    pub list_pages: u32,
    pub posts: usize,
    /// Enumerated ids whose detail lookup came back not found.
    pub missing: Vec<u64>,
    pub files: Vec<PathBuf>,
}

pub async fn build_site<R: PostRepository>(
    repo: &R,
    config: &SiteConfig,
    tagger: TagAssigner,
    progress: &Progress,
) -> anyhow::Result<SiteSummary> {
    std::fs::create_dir_all(&config.out_dir)
        .with_context(|| format!("create {}", config.out_dir.display()))?;

    progress.set_stage("fetching first page");
    let initial = match repo.list_first_page().await {
        Ok(posts) => posts,
        Err(err) => {
            tracing::warn!(error = %err, "first page unavailable; rendering an empty list");
            Vec::new()
        }
    };
    let mut ctrl = PostListController::new(initial, repo.page_size(), tagger);

    // Item count at the end of each list page.
    let mut page_ends = vec![ctrl.items().len()];
    while (page_ends.len() as u32) < config.pages.max(1) {
        progress.set_stage(format!("loading page {}", page_ends.len() + 1));
        match ctrl.load_more(repo).await {
            LoadOutcome::Appended(n) | LoadOutcome::Exhausted(n) if n > 0 => {
                page_ends.push(ctrl.items().len());
            }
            LoadOutcome::Failed => {
                tracing::warn!(page = page_ends.len() + 1, "stopping pagination after a failed load");
                break;
            }
            _ => break,
        }
    }

    let list_pages = page_ends.len() as u32;
    let paths = StaticPaths::new(ctrl.items().iter().map(|p| p.id), list_pages);
    tracing::info!(
        posts = ctrl.items().len(),
        list_pages,
        exhausted = ctrl.is_exhausted(),
        "enumerated static paths"
    );

    let mut summary = SiteSummary {
        list_pages,
        posts: ctrl.items().len(),
        ..Default::default()
    };
    progress.add_pages_total(page_ends.len() + ctrl.items().len() + 2);

    progress.set_stage("rendering list pages");
    for (i, &end) in page_ends.iter().enumerate() {
        let n = i as u32 + 1;
        let next = (n < list_pages).then(|| Route::list_page(n + 1));
        let html = render::render_list_page(&ctrl, end, Route::list_page(n), next);
        write_page(&config.out_dir, Route::list_page(n), &html, &paths, progress, &mut summary)?;
    }

    progress.set_stage("rendering posts");
    for id in paths.post_ids() {
        let html = match repo.get_by_id(&id.to_string()).await {
            Ok(post) => render::render_detail_page(&post),
            Err(err) if err.is_not_found() => {
                tracing::warn!(id, "post listed but not found; writing not-found page");
                summary.missing.push(id);
                render::render_not_found_page(Some(&format!("post {id}")))
            }
            Err(err) => return Err(err).with_context(|| format!("fetch post {id}")),
        };
        write_page(&config.out_dir, Route::Post(id), &html, &paths, progress, &mut summary)?;
    }

    progress.set_stage("rendering chrome");
    let about = render::render_about_page(&config.api_url);
    write_page(&config.out_dir, Route::About, &about, &paths, progress, &mut summary)?;
    let not_found = render::render_not_found_page(None);
    write_page(&config.out_dir, Route::NotFound, &not_found, &paths, progress, &mut summary)?;

    let css_path = config.out_dir.join(render::CSS_HREF.trim_start_matches('/'));
    write_file(&css_path, builtin::BUILTIN_CSS)?;
    summary.files.push(css_path);

    Ok(summary)
}

fn write_page(
    out_dir: &Path,
    route: Route,
    html: &str,
    paths: &StaticPaths,
    progress: &Progress,
    summary: &mut SiteSummary,
) -> anyhow::Result<()> {
    links::assert_links_resolve(html, paths).with_context(|| format!("page {}", route.href()))?;
    let path = out_dir.join(route.output_path());
    write_file(&path, html)?;
    progress.page_written(&route.href());
    summary.files.push(path);
    Ok(())
}

fn write_file(path: &Path, contents: &str) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
    }
    std::fs::write(path, contents).with_context(|| format!("write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::tests::{ScriptedRepo, posts};

    fn config(dir: &Path, pages: u32) -> SiteConfig {
        SiteConfig {
            out_dir: dir.to_path_buf(),
            pages,
            api_url: "https://example.com/posts".to_string(),
        }
    }

    #[tokio::test]
    async fn renders_pages_until_exhausted() {
        let tmp = tempfile::tempdir().unwrap();
        let repo = ScriptedRepo::with(vec![
            Ok(posts(1..=6)),
            Ok(posts(7..=12)),
            Ok(posts(13..=14)),
        ]);
        let summary = build_site(&repo, &config(tmp.path(), 10), TagAssigner::new(1), &Progress::disabled())
            .await
            .unwrap();

        assert_eq!(summary.list_pages, 3);
        assert_eq!(summary.posts, 14);
        assert!(summary.missing.is_empty());
        assert!(tmp.path().join("index.html").exists());
        assert!(tmp.path().join("page/3/index.html").exists());
        assert!(!tmp.path().join("page/4/index.html").exists());
        assert!(tmp.path().join("post/14/index.html").exists());
        assert!(tmp.path().join("assets/site.css").exists());

        let page2 = std::fs::read_to_string(tmp.path().join("page/2/index.html")).unwrap();
        assert_eq!(page2.matches("class=\"post-card\"").count(), 12);
        assert!(page2.contains("href=\"/page/3/\""));
        let page3 = std::fs::read_to_string(tmp.path().join("page/3/index.html")).unwrap();
        assert!(!page3.contains("Load More"));
    }

    #[tokio::test]
    async fn missing_detail_gets_not_found_page() {
        let tmp = tempfile::tempdir().unwrap();
        let repo = ScriptedRepo::with(vec![Ok(posts(99..=104))]);
        let summary = build_site(&repo, &config(tmp.path(), 1), TagAssigner::new(1), &Progress::disabled())
            .await
            .unwrap();

        assert_eq!(summary.missing, vec![101, 102, 103, 104]);
        let html = std::fs::read_to_string(tmp.path().join("post/101/index.html")).unwrap();
        assert!(html.contains("No post 101 exists."));
    }

    #[tokio::test]
    async fn failed_first_page_renders_empty_list() {
        let tmp = tempfile::tempdir().unwrap();
        let repo = ScriptedRepo::with(vec![Err(crate::error::RepoError::Network {
            url: "http://x".to_string(),
            reason: "down".to_string(),
        })]);
        let summary = build_site(&repo, &config(tmp.path(), 3), TagAssigner::new(1), &Progress::disabled())
            .await
            .unwrap();

        assert_eq!(summary.posts, 0);
        assert_eq!(summary.list_pages, 1);
        let index = std::fs::read_to_string(tmp.path().join("index.html")).unwrap();
        assert!(index.contains("No posts match."));
        assert!(!index.contains("Load More"));
    }
}
