//! Client-side hashtags. They are a presentation label, not server data:
//! every post gets a small sample of a fixed vocabulary when it is ingested.

pub const VOCABULARY: [&str; 6] = ["#tech", "#life", "#travel", "#food", "#coding", "#news"];
pub const TAGS_PER_POST: usize = 2;

/// Assigns tags keyed on post identity, so a post keeps its tags for the
/// whole session no matter how often it is re-rendered.
#[derive(Debug, Clone, Copy)]
pub struct TagAssigner {
    seed: u64,
}

impl TagAssigner {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    /// A seed that differs between sessions.
    pub fn from_clock() -> Self {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or_default();
        Self::new(nanos)
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// `TAGS_PER_POST` distinct tags, drawn without replacement.
    pub fn assign(&self, post_id: u64) -> Vec<String> {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&self.seed.to_le_bytes());
        hasher.update(&post_id.to_le_bytes());
        let digest = hasher.finalize();
        let bytes = digest.as_bytes();

        // Partial Fisher-Yates over the vocabulary.
        let mut pool = VOCABULARY;
        for i in 0..TAGS_PER_POST {
            let mut chunk = [0u8; 8];
            chunk.copy_from_slice(&bytes[i * 8..i * 8 + 8]);
            let r = u64::from_le_bytes(chunk) as usize;
            let j = i + r % (pool.len() - i);
            pool.swap(i, j);
        }
        pool[..TAGS_PER_POST].iter().map(|t| t.to_string()).collect()
    }
}

/// Accepts `tech` as well as `#tech`.
pub fn normalize_tag(raw: &str) -> Option<&'static str> {
    let raw = raw.trim();
    let bare = raw.strip_prefix('#').unwrap_or(raw);
    VOCABULARY
        .iter()
        .copied()
        .find(|t| t[1..].eq_ignore_ascii_case(bare))
}
