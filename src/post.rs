use serde::Deserialize;

/// One entry of the remote posts collection.
///
/// `hashtags` never comes from the server; it is filled in by the list
/// controller when the post is ingested.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Post {
    pub id: u64,
    #[serde(rename = "userId")]
    pub user_id: u64,
    pub title: String,
    pub body: String,
    #[serde(default)]
    pub hashtags: Vec<String>,
}

impl Post {
    pub fn has_tag(&self, tag: &str) -> bool {
        self.hashtags.iter().any(|t| t == tag)
    }

    /// Case-insensitive match against title or body. `needle` must already be lowercase.
    pub(crate) fn matches_lowercase(&self, needle: &str) -> bool {
        needle.is_empty()
            || self.title.to_lowercase().contains(needle)
            || self.body.to_lowercase().contains(needle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_api_shape_without_hashtags() {
        let post: Post = serde_json::from_str(
            r#"{"userId": 1, "id": 3, "title": "ea molestias", "body": "et iusto sed"}"#,
        )
        .unwrap();
        assert_eq!(post.id, 3);
        assert_eq!(post.user_id, 1);
        assert!(post.hashtags.is_empty());
    }

    #[test]
    fn lowercase_match_checks_title_and_body() {
        let post = Post {
            id: 1,
            user_id: 1,
            title: "Hello World".to_string(),
            body: "Lorem Ipsum".to_string(),
            hashtags: vec![],
        };
        assert!(post.matches_lowercase("world"));
        assert!(post.matches_lowercase("ipsum"));
        assert!(post.matches_lowercase(""));
        assert!(!post.matches_lowercase("dolor"));
    }
}
