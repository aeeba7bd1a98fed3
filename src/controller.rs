//! Post list state: accumulated items, pagination progress and the
//! search/tag filters.
//!
//! Pagination policy: a page shorter than the page size (including an empty
//! one) exhausts the list. A non-empty page always advances `page`; an empty
//! page leaves it where it was.

use crate::error::RepoError;
use crate::hashtags::TagAssigner;
use crate::post::Post;
use crate::repository::PostRepository;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListState {
    Idle,
    LoadingMore,
    /// Terminal for pagination; filtering still applies.
    Exhausted,
}

/// Identifies one in-flight load-more request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageTicket {
    pub page: u32,
    pub size: u32,
    seq: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Already loading or exhausted; nothing was fetched.
    Skipped,
    /// A full page was appended.
    Appended(usize),
    /// A short (possibly empty) page was appended and the list is exhausted.
    Exhausted(usize),
    /// The fetch failed; the list is back to idle and can be retried.
    Failed,
    /// The result belonged to a request that is no longer in flight.
    Discarded,
}

#[derive(Debug)]
pub struct PostListController {
    items: Vec<Post>,
    page: u32,
    page_size: u32,
    state: ListState,
    search_text: String,
    selected_tag: Option<String>,
    tagger: TagAssigner,
    in_flight: Option<PageTicket>,
    next_seq: u64,
}

impl PostListController {
    /// Seeds the list with the first page (already fetched elsewhere).
    pub fn new(initial: Vec<Post>, page_size: u32, tagger: TagAssigner) -> Self {
        let page_size = page_size.max(1);
        let mut ctrl = Self {
            items: Vec::with_capacity(initial.len()),
            page: 1,
            page_size,
            state: ListState::Idle,
            search_text: String::new(),
            selected_tag: None,
            tagger,
            in_flight: None,
            next_seq: 0,
        };
        ctrl.ingest(initial);
        ctrl
    }

    pub fn items(&self) -> &[Post] {
        &self.items
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn state(&self) -> ListState {
        self.state
    }

    pub fn is_loading(&self) -> bool {
        self.state == ListState::LoadingMore
    }

    pub fn is_exhausted(&self) -> bool {
        self.state == ListState::Exhausted
    }

    pub fn search_text(&self) -> &str {
        &self.search_text
    }

    pub fn selected_tag(&self) -> Option<&str> {
        self.selected_tag.as_deref()
    }

    pub fn get(&self, id: u64) -> Option<&Post> {
        self.items.iter().find(|p| p.id == id)
    }

    /// Fetches the next page and applies it.
    pub async fn load_more<R: PostRepository>(&mut self, repo: &R) -> LoadOutcome {
        let Some(ticket) = self.begin_load_more() else {
            return LoadOutcome::Skipped;
        };
        let result = repo.list_page(ticket.page, ticket.size).await;
        self.finish_load_more(ticket, result)
    }

    /// Moves to `LoadingMore` and hands out the request to perform.
    /// `None` while a load is in flight or once the list is exhausted.
    pub fn begin_load_more(&mut self) -> Option<PageTicket> {
        if self.state != ListState::Idle {
            return None;
        }
        let ticket = PageTicket {
            page: self.page + 1,
            size: self.page_size,
            seq: self.next_seq,
        };
        self.next_seq += 1;
        self.in_flight = Some(ticket);
        self.state = ListState::LoadingMore;
        Some(ticket)
    }

    pub fn finish_load_more(
        &mut self,
        ticket: PageTicket,
        result: Result<Vec<Post>, RepoError>,
    ) -> LoadOutcome {
        if self.in_flight != Some(ticket) {
            tracing::debug!(page = ticket.page, "discarding stale page result");
            return LoadOutcome::Discarded;
        }
        self.in_flight = None;

        let posts = match result {
            Ok(posts) => posts,
            Err(err) => {
                tracing::error!(page = ticket.page, error = %err, "failed to fetch more posts");
                self.state = ListState::Idle;
                return LoadOutcome::Failed;
            }
        };

        let count = posts.len();
        if count > 0 {
            self.page = ticket.page;
        }
        self.ingest(posts);

        if count < ticket.size as usize {
            tracing::info!(page = self.page, total = self.items.len(), "post list exhausted");
            self.state = ListState::Exhausted;
            LoadOutcome::Exhausted(count)
        } else {
            self.state = ListState::Idle;
            LoadOutcome::Appended(count)
        }
    }

    /// Drops the in-flight request, if any; its result will be discarded.
    pub fn abandon_load_more(&mut self) {
        if self.in_flight.take().is_some() {
            self.state = ListState::Idle;
        }
    }

    /// Independent of the tag filter.
    pub fn set_search_text(&mut self, text: impl Into<String>) {
        self.search_text = text.into();
    }

    /// Selecting the tag that is already selected clears the tag filter.
    pub fn set_selected_tag(&mut self, tag: &str) {
        if self.selected_tag.as_deref() == Some(tag) {
            self.selected_tag = None;
        } else {
            self.selected_tag = Some(tag.to_string());
        }
    }

    pub fn clear_selected_tag(&mut self) {
        self.selected_tag = None;
    }

    pub fn visible_posts(&self) -> Vec<&Post> {
        self.visible_prefix(self.items.len())
    }

    /// Same filters, restricted to the first `n` ingested items.
    pub fn visible_prefix(&self, n: usize) -> Vec<&Post> {
        let needle = self.search_text.to_lowercase();
        self.items[..n.min(self.items.len())]
            .iter()
            .filter(|p| p.matches_lowercase(&needle))
            .filter(|p| self.selected_tag.as_deref().is_none_or(|t| p.has_tag(t)))
            .collect()
    }

    fn ingest(&mut self, posts: Vec<Post>) {
        for mut post in posts {
            post.hashtags = self.tagger.assign(post.id);
            self.items.push(post);
        }
    }
}
