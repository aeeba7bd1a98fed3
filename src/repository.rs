use url::Url;

use crate::error::{RepoError, Result};
use crate::fetcher::Fetcher;
use crate::post::Post;
use crate::progress::RequestKind;

pub const DEFAULT_API_URL: &str = "https://jsonplaceholder.typicode.com/posts";
pub const PAGE_SIZE: u32 = 6;

/// Read access to a remote, paginated posts collection.
#[allow(async_fn_in_trait)]
pub trait PostRepository {
    /// First page, `page_size()` items.
    async fn list_first_page(&self) -> Result<Vec<Post>> {
        self.list_page(1, self.page_size()).await
    }

    /// Page `page` of `size` items. Fewer than `size` items means the collection is exhausted.
    async fn list_page(&self, page: u32, size: u32) -> Result<Vec<Post>>;

    async fn get_by_id(&self, id: &str) -> Result<Post>;

    fn page_size(&self) -> u32 {
        PAGE_SIZE
    }
}

#[derive(Clone)]
pub struct HttpPostRepository {
    fetcher: Fetcher,
    base: Url,
    page_size: u32,
}

impl HttpPostRepository {
    pub fn new(fetcher: Fetcher, base: Url, page_size: u32) -> Self {
        Self {
            fetcher,
            base,
            page_size: page_size.max(1),
        }
    }

    pub fn page_url(&self, page: u32, size: u32) -> Url {
        let mut url = self.base.clone();
        url.query_pairs_mut()
            .append_pair("_limit", &size.max(1).to_string())
            .append_pair("_page", &page.max(1).to_string());
        url
    }

    /// `None` when the base URL cannot carry path segments (e.g. `data:` URLs).
    pub fn item_url(&self, id: u64) -> Option<Url> {
        let mut url = self.base.clone();
        url.set_query(None);
        url.path_segments_mut()
            .ok()?
            .pop_if_empty()
            .push(&id.to_string());
        Some(url)
    }
}

impl PostRepository for HttpPostRepository {
    async fn list_page(&self, page: u32, size: u32) -> Result<Vec<Post>> {
        let url = self.page_url(page, size);
        let bytes = self.fetcher.get_bytes(RequestKind::List, url.clone()).await?;
        let posts: Vec<Post> = decode(&url, &bytes)?;
        tracing::debug!(page, size, count = posts.len(), "fetched page");
        Ok(posts)
    }

    async fn get_by_id(&self, id: &str) -> Result<Post> {
        let Some(numeric) = parse_post_id(id) else {
            return Err(RepoError::NotFound {
                resource: format!("post {id:?}"),
            });
        };
        let url = self.item_url(numeric).ok_or_else(|| RepoError::Network {
            url: self.base.to_string(),
            reason: "base url cannot carry a post id".to_string(),
        })?;
        let bytes = self.fetcher.get_bytes(RequestKind::Detail, url.clone()).await?;
        decode(&url, &bytes)
    }

    fn page_size(&self) -> u32 {
        self.page_size
    }
}

/// Parses a post id only in its canonical decimal form, so that `"007"` and `"+7"` are rejected.
pub fn parse_post_id(raw: &str) -> Option<u64> {
    let id: u64 = raw.parse().ok()?;
    (id.to_string() == raw).then_some(id)
}

fn decode<T: serde::de::DeserializeOwned>(url: &Url, bytes: &[u8]) -> Result<T> {
    serde_json::from_slice(bytes).map_err(|source| RepoError::MalformedResponse {
        url: url.to_string(),
        source,
    })
}
