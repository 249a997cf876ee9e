use crc32fast::Hasher;
use uuid::Uuid;

/// Derive a stable ID seed from a document key (campaign ID, template name)
pub fn get_document_seed(key: &str) -> String {
    let mut hasher = Hasher::new();
    hasher.update(key.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Sequential ID generator for rows, columns and blocks
#[derive(Debug, Clone)]
pub struct IdGenerator {
    seed: String,
    count: u32,
}

impl IdGenerator {
    /// Deterministic generator keyed by document
    pub fn new(key: &str) -> Self {
        Self {
            seed: get_document_seed(key),
            count: 0,
        }
    }

    pub fn from_seed(seed: impl Into<String>) -> Self {
        Self {
            seed: seed.into(),
            count: 0,
        }
    }

    /// Generator with a random seed, for interactive sessions where IDs
    /// must not collide with those minted by earlier sessions
    pub fn random() -> Self {
        let uuid = Uuid::new_v4().simple().to_string();
        Self::from_seed(&uuid[..8])
    }

    /// Generate next sequential ID
    pub fn new_id(&mut self) -> String {
        self.count += 1;
        format!("{}-{}", self.seed, self.count)
    }

    pub fn seed(&self) -> &str {
        &self.seed
    }
}
