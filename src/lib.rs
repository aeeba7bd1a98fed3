mod browse;
mod builtin;
mod cli;
mod controller;
mod error;
mod fetcher;
mod hashtags;
mod links;
mod post;
mod progress;
mod render;
mod repository;
mod routes;
mod site;

use std::time::Duration;

use anyhow::Context as _;
use cli::Args;
use fetcher::Fetcher;

pub use browse::{Command, run_session};
pub use cli::{Args as CliArgs, Mode, ProgressMode};
pub use controller::{ListState, LoadOutcome, PageTicket, PostListController};
pub use error::RepoError;
pub use hashtags::{TAGS_PER_POST, TagAssigner, VOCABULARY};
pub use post::Post;
pub use progress::Progress;
pub use render::preview;
pub use repository::{DEFAULT_API_URL, HttpPostRepository, PAGE_SIZE, PostRepository, parse_post_id};
pub use routes::{Route, StaticPaths};
pub use site::{SiteConfig, SiteSummary, build_site};

pub async fn run(args: Args) -> anyhow::Result<()> {
    use std::io::IsTerminal as _;

    let progress_enabled = matches!(args.mode, Mode::Site)
        && match args.progress {
            ProgressMode::Always => true,
            ProgressMode::Never => false,
            ProgressMode::Auto => std::io::stderr().is_terminal(),
        };
    let progress = Progress::new(progress_enabled);

    let fetcher = Fetcher::new(
        &args.user_agent,
        Duration::from_secs(args.timeout_secs.max(1)),
        args.max_attempts,
        Some(progress.clone()),
    )?;
    let repo = HttpPostRepository::new(fetcher, args.api_url.clone(), args.page_size);
    let tagger = args
        .tag_seed
        .map(TagAssigner::new)
        .unwrap_or_else(TagAssigner::from_clock);
    tracing::debug!(seed = tagger.seed(), "hashtag seed");

    let res = match args.mode {
        Mode::Site => {
            let config = SiteConfig {
                out_dir: args.out.clone(),
                pages: args.pages,
                api_url: args.api_url.to_string(),
            };
            build_site(&repo, &config, tagger, &progress)
                .await
                .map(|summary| {
                    tracing::info!(
                        out = %config.out_dir.display(),
                        files = summary.files.len(),
                        posts = summary.posts,
                        list_pages = summary.list_pages,
                        missing = summary.missing.len(),
                        "site written"
                    );
                })
        }
        Mode::Browse => browse_stdin(&repo, tagger).await,
    };
    progress.finish();
    res
}

/// HTTP repository with default client settings.
pub fn http_repository(api_url: &str, page_size: u32) -> anyhow::Result<HttpPostRepository> {
    let url = url::Url::parse(api_url).with_context(|| format!("parse api url {api_url}"))?;
    let fetcher = Fetcher::new("blog-render/0.1", Duration::from_secs(30), 3, None)?;
    Ok(HttpPostRepository::new(fetcher, url, page_size))
}

async fn browse_stdin(repo: &HttpPostRepository, tagger: TagAssigner) -> anyhow::Result<()> {
    let initial = match repo.list_first_page().await {
        Ok(posts) => posts,
        Err(err) => {
            tracing::warn!(error = %err, "first page unavailable; starting with an empty list");
            Vec::new()
        }
    };
    let ctrl = PostListController::new(initial, repo.page_size(), tagger);

    let input = tokio::io::BufReader::new(tokio::io::stdin());
    let mut out = std::io::stdout().lock();
    run_session(repo, ctrl, input, &mut out)
        .await
        .context("browse session")?;
    Ok(())
}
