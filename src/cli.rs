use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use url::Url;

use crate::repository::{DEFAULT_API_URL, PAGE_SIZE};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    /// Render a static site into `--out`.
    Site,
    /// Interactive session on stdin/stdout.
    Browse,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ProgressMode {
    /// Enable progress UI when stderr is a TTY.
    Auto,
    /// Always enable progress UI (even when piped).
    Always,
    /// Never show progress UI.
    Never,
}

#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Args {
    /// Base URL of the posts collection. Pages are `?_limit=N&_page=P`, items are `/{id}`.
    #[arg(long, default_value = DEFAULT_API_URL)]
    pub api_url: Url,

    /// `site` renders static HTML; `browse` starts an interactive session.
    #[arg(long, value_enum, default_value = "site")]
    pub mode: Mode,

    /// Output directory for `site` mode.
    #[arg(long, default_value = "site")]
    pub out: PathBuf,

    /// Posts requested per page.
    #[arg(long, default_value_t = PAGE_SIZE)]
    pub page_size: u32,

    /// List pages to prerender in `site` mode ("load more" steps + 1).
    #[arg(long, default_value_t = 1)]
    pub pages: u32,

    /// Seed for hashtag assignment. Defaults to a per-run value.
    #[arg(long)]
    pub tag_seed: Option<u64>,

    /// HTTP User-Agent.
    #[arg(long, default_value = "blog-render/0.1")]
    pub user_agent: String,

    /// Attempts per request when the API answers 429/503.
    #[arg(long, default_value_t = 3)]
    pub max_attempts: usize,

    /// Per-request timeout in seconds.
    #[arg(long, default_value_t = 30)]
    pub timeout_secs: u64,

    /// Progress display: `auto`, `always`, or `never`.
    #[arg(long, value_enum, default_value = "auto")]
    pub progress: ProgressMode,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let args = Args::try_parse_from(["blog-render"]).unwrap();
        assert_eq!(args.mode, Mode::Site);
        assert_eq!(args.page_size, 6);
        assert_eq!(args.pages, 1);
        assert_eq!(args.api_url.as_str(), DEFAULT_API_URL);
        assert!(args.tag_seed.is_none());
    }

    #[test]
    fn browse_mode_with_seed() {
        let args = Args::try_parse_from([
            "blog-render",
            "--mode",
            "browse",
            "--tag-seed",
            "42",
            "--api-url",
            "http://localhost:3000/posts",
        ])
        .unwrap();
        assert_eq!(args.mode, Mode::Browse);
        assert_eq!(args.tag_seed, Some(42));
        assert_eq!(args.api_url.path(), "/posts");
    }
}
