// Job Posting Domain Model

use serde::{Deserialize, Serialize};

/// Posting identifier (assigned by the job provider)
pub type PostingId = String;

/// User identifier (absent in guest mode)
pub type UserId = String;

/// A job posting as handed out by the provider
///
/// Identity is the `id`; two postings with the same id are the same card even if
/// their attributes differ.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobPosting {
    pub id: PostingId,
    #[serde(flatten)]
    pub attributes: serde_json::Map<String, serde_json::Value>,
}

impl JobPosting {
    /// Posting with the given attributes (title, company, pay, ...)
    ///
    /// The engine never inspects attributes; they are carried through to the UI.
    pub fn new(id: impl Into<String>, attributes: serde_json::Map<String, serde_json::Value>) -> Self {
        Self {
            id: id.into(),
            attributes,
        }
    }

    /// Posting with no attributes (tests and fixtures)
    pub fn bare(id: impl Into<String>) -> Self {
        Self::new(id, serde_json::Map::new())
    }

    /// Read a string attribute, if present
    pub fn attribute_str(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).and_then(|v| v.as_str())
    }
}

/// Swipe direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SwipeDirection {
    /// Pass
    Left,
    /// Save / apply
    Right,
}

impl std::fmt::Display for SwipeDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SwipeDirection::Left => write!(f, "left"),
            SwipeDirection::Right => write!(f, "right"),
        }
    }
}

/// One recorded swipe, kept for undo
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwipeEvent {
    pub job: JobPosting,
    pub direction: SwipeDirection,
    /// Position of the card in the working queue when it was swiped
    pub queue_index_at_swipe: usize,
}

impl SwipeEvent {
    pub fn new(job: JobPosting, direction: SwipeDirection, queue_index_at_swipe: usize) -> Self {
        Self {
            job,
            direction,
            queue_index_at_swipe,
        }
    }
}
