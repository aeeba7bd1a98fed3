//! Interactive session over a [`PostListController`].
//!
//! A `more` command starts a fetch that runs alongside input handling, so
//! search and tag commands keep working while a page is in flight.

use std::future::Future;
use std::io::Write;
use std::pin::Pin;

use tokio::io::{AsyncBufRead, AsyncBufReadExt as _};

use crate::controller::{LoadOutcome, PageTicket, PostListController};
use crate::error::RepoError;
use crate::hashtags::{VOCABULARY, normalize_tag};
use crate::post::Post;
use crate::render::preview;
use crate::repository::{PostRepository, parse_post_id};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    List,
    More,
    /// Empty text clears the search.
    Search(String),
    Tag(String),
    Tags,
    Show(String),
    Status,
    Help,
    Quit,
    Empty,
    Unknown(String),
}

impl Command {
    pub fn parse(line: &str) -> Command {
        let line = line.trim_end_matches(['\r', '\n']);
        let trimmed = line.trim_start();
        let (word, rest) = match trimmed.split_once(char::is_whitespace) {
            Some((w, r)) => (w, r.trim()),
            None => (trimmed, ""),
        };
        match word.to_ascii_lowercase().as_str() {
            "" => Command::Empty,
            "list" | "ls" => Command::List,
            "more" | "m" => Command::More,
            "search" | "s" | "/" => Command::Search(rest.to_string()),
            "tag" | "t" => Command::Tag(rest.to_string()),
            "tags" => Command::Tags,
            "show" | "open" => Command::Show(rest.to_string()),
            "status" => Command::Status,
            "help" | "?" => Command::Help,
            "quit" | "exit" | "q" => Command::Quit,
            _ => Command::Unknown(word.to_string()),
        }
    }
}

type PendingPage<'a> = Pin<Box<dyn Future<Output = (PageTicket, Result<Vec<Post>, RepoError>)> + 'a>>;

/// Runs commands from `input` until `quit` or end of input, writing to `out`.
///
/// `quit` drops an in-flight fetch without applying it; end of input waits
/// for it first. Returns the controller in its final state.
pub async fn run_session<'r, R, I, W>(
    repo: &'r R,
    mut ctrl: PostListController,
    input: I,
    out: &mut W,
) -> anyhow::Result<PostListController>
where
    R: PostRepository,
    I: AsyncBufRead + Unpin,
    W: Write,
{
    let mut lines = input.lines();
    let mut pending: Option<PendingPage<'r>> = None;

    write_list(&ctrl, out)?;

    loop {
        tokio::select! {
            // Commands typed while a page is in flight are handled before it lands.
            biased;

            line = lines.next_line() => {
                let Some(line) = line? else {
                    if let Some(fut) = pending.take() {
                        let (ticket, result) = fut.await;
                        let outcome = ctrl.finish_load_more(ticket, result);
                        write_outcome(&ctrl, outcome, out)?;
                    }
                    break;
                };
                match Command::parse(&line) {
                    Command::Quit => {
                        if pending.take().is_some() {
                            ctrl.abandon_load_more();
                            tracing::debug!("dropped in-flight page on quit");
                        }
                        break;
                    }
                    Command::More => match ctrl.begin_load_more() {
                        Some(ticket) => {
                            writeln!(out, "loading page {}...", ticket.page)?;
                            let fetch = repo.list_page(ticket.page, ticket.size);
                            pending = Some(Box::pin(async move { (ticket, fetch.await) }));
                        }
                        None if ctrl.is_loading() => writeln!(out, "already loading")?,
                        None => writeln!(out, "no more posts")?,
                    },
                    Command::Show(raw) => show(repo, &ctrl, &raw, out).await?,
                    cmd => handle(&mut ctrl, cmd, out)?,
                }
                out.flush()?;
            }
            (ticket, result) = async {
                match pending.as_mut() {
                    Some(fut) => fut.await,
                    None => std::future::pending().await,
                }
            }, if pending.is_some() => {
                pending = None;
                let outcome = ctrl.finish_load_more(ticket, result);
                write_outcome(&ctrl, outcome, out)?;
                out.flush()?;
            }
        }
    }

    Ok(ctrl)
}

fn handle<W: Write>(ctrl: &mut PostListController, cmd: Command, out: &mut W) -> anyhow::Result<()> {
    match cmd {
        Command::List => write_list(ctrl, out)?,
        Command::Search(text) => {
            ctrl.set_search_text(text);
            if ctrl.search_text().is_empty() {
                writeln!(out, "search cleared")?;
            } else {
                writeln!(
                    out,
                    "search \"{}\": {} match(es)",
                    ctrl.search_text(),
                    ctrl.visible_posts().len()
                )?;
            }
        }
        Command::Tag(raw) if raw.is_empty() => {
            ctrl.clear_selected_tag();
            writeln!(out, "tag filter cleared")?;
        }
        Command::Tag(raw) => match normalize_tag(&raw) {
            Some(tag) => {
                ctrl.set_selected_tag(tag);
                match ctrl.selected_tag() {
                    Some(t) => writeln!(out, "tag filter {}: {} match(es)", t, ctrl.visible_posts().len())?,
                    None => writeln!(out, "tag filter cleared")?,
                }
            }
            None => writeln!(out, "unknown tag {raw:?}; try `tags`")?,
        },
        Command::Tags => {
            for tag in VOCABULARY {
                let mark = if ctrl.selected_tag() == Some(tag) { "*" } else { " " };
                writeln!(out, "{mark} {tag}")?;
            }
        }
        Command::Status => write_status(ctrl, out)?,
        Command::Help => writeln!(out, "{HELP}")?,
        Command::Empty => {}
        Command::Unknown(word) => writeln!(out, "unknown command {word:?}; try `help`")?,
        Command::More | Command::Show(_) | Command::Quit => {}
    }
    Ok(())
}

/// Detail view. Only ids already in the list are routable.
async fn show<R: PostRepository, W: Write>(
    repo: &R,
    ctrl: &PostListController,
    raw: &str,
    out: &mut W,
) -> anyhow::Result<()> {
    let known = parse_post_id(raw).filter(|id| ctrl.get(*id).is_some());
    if known.is_none() {
        writeln!(out, "post {raw:?} not found")?;
        return Ok(());
    }
    match repo.get_by_id(raw).await {
        Ok(post) => {
            writeln!(out, "{}", post.title)?;
            writeln!(out)?;
            writeln!(out, "{}", post.body)?;
            writeln!(out)?;
            writeln!(out, "Post ID: {} | Author: {}", post.id, post.user_id)?;
        }
        Err(err) if err.is_not_found() => writeln!(out, "post {raw:?} not found")?,
        Err(err) => {
            tracing::error!(error = %err, id = raw, "failed to fetch post");
            writeln!(out, "could not load post {raw:?}")?;
        }
    }
    Ok(())
}

fn write_list<W: Write>(ctrl: &PostListController, out: &mut W) -> anyhow::Result<()> {
    let visible = ctrl.visible_posts();
    for post in &visible {
        writeln!(out, "[{}] {}", post.id, post.title)?;
        writeln!(out, "    {}", preview(&post.body).replace('\n', " "))?;
        if !post.hashtags.is_empty() {
            writeln!(out, "    {}", post.hashtags.join(" "))?;
        }
    }
    if visible.is_empty() {
        writeln!(out, "no posts match")?;
    }
    write_status(ctrl, out)
}

fn write_status<W: Write>(ctrl: &PostListController, out: &mut W) -> anyhow::Result<()> {
    let state = if ctrl.is_loading() {
        "loading"
    } else if ctrl.is_exhausted() {
        "all loaded"
    } else {
        "more available"
    };
    writeln!(
        out,
        "{} of {} posts shown | page {} | {}",
        ctrl.visible_posts().len(),
        ctrl.items().len(),
        ctrl.page(),
        state
    )?;
    Ok(())
}

fn write_outcome<W: Write>(ctrl: &PostListController, outcome: LoadOutcome, out: &mut W) -> anyhow::Result<()> {
    match outcome {
        LoadOutcome::Appended(n) => writeln!(out, "loaded {n} posts (page {})", ctrl.page())?,
        LoadOutcome::Exhausted(n) => writeln!(out, "loaded {n} posts; no more posts")?,
        LoadOutcome::Failed => writeln!(out, "failed to load more posts; try `more` again")?,
        LoadOutcome::Skipped | LoadOutcome::Discarded => {}
    }
    Ok(())
}

const HELP: &str = "commands:
  list            show visible posts
  more            load the next page
  search <text>   filter by title/body (no text clears)
  tag <name>      toggle a tag filter (no name clears)
  tags            list tags
  show <id>       show one post
  status          pagination state
  quit            leave";
