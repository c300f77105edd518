//! Input records and the derived, read-only views built from them.

use std::cmp::Ordering;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{EPISODE_DONE, LABELS_TAG, TEXT_TAG};

/// How the crawler classifies a poster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UserKind {
    Static,
    Dynamic,
    Unknown,
}

/// A poster as the crawler records it: a logged-in id, or an anonymous ip
/// prefix, plus the displayed nickname.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct User {
    pub id: Option<String>,
    pub ip: Option<String>,
    pub nickname: String,
    pub kind: UserKind,
}

/// Author of a document or comment.
///
/// Crawler dumps carry a full [`User`]; flat tables carry a bare name. Two
/// authors are the same only if every field matches.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Author {
    User(User),
    Name(String),
}

impl From<&str> for Author {
    fn from(name: &str) -> Self {
        Self::Name(name.to_string())
    }
}

impl From<String> for Author {
    fn from(name: String) -> Self {
        Self::Name(name)
    }
}

/// A forum document with its (flat) comment list, one input row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentRecord {
    pub gallery_id: String,
    #[serde(rename = "id")]
    pub document_id: u64,
    pub title: String,
    pub author: Author,
    #[serde(default)]
    pub comments: Option<Vec<CommentRecord>>,
}

impl DocumentRecord {
    pub fn comments(&self) -> &[CommentRecord] {
        self.comments.as_deref().unwrap_or_default()
    }
}

/// A comment as crawled. `parent_id == None` means it replies to the document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentRecord {
    pub id: u64,
    pub author: Author,
    #[serde(default)]
    pub contents: Option<String>,
    #[serde(default)]
    pub parent_id: Option<u64>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl CommentRecord {
    /// Id of the top-level comment this one hangs under.
    pub fn root_id(&self) -> u64 {
        self.parent_id.unwrap_or(self.id)
    }
}

/// Grouping key of a reply thread.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ThreadKey {
    pub gallery_id: String,
    pub document_id: u64,
    pub root_id: u64,
}

/// A comment inside a thread, contents already normalized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadComment {
    pub comment_id: u64,
    pub author: Author,
    pub contents: String,
    pub created_at: Option<DateTime<Utc>>,
}

impl ThreadComment {
    /// Thread order: `created_at` ascending (absent first), then comment id.
    pub fn chronological_cmp(&self, other: &Self) -> Ordering {
        self.created_at
            .cmp(&other.created_at)
            .then_with(|| self.comment_id.cmp(&other.comment_id))
    }
}

/// Comments sharing one root, in chronological order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Thread {
    pub key: ThreadKey,
    pub comments: Vec<ThreadComment>,
}

impl Thread {
    pub fn len(&self) -> usize {
        self.comments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.comments.is_empty()
    }
}

/// One side's uninterrupted run of comments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    pub dialog_id: usize,
    pub is_root_author: bool,
    pub text: String,
    pub created_at: Option<DateTime<Utc>>,
}

impl Turn {
    /// Turn text with its `text:`/`labels:` tag.
    pub fn tagged(&self) -> String {
        let tag = if self.is_root_author { TEXT_TAG } else { LABELS_TAG };
        format!("{}{}", tag, self.text)
    }
}

/// A finished training record, one output line.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Episode(String);

impl Episode {
    /// Join already-tagged segments and append the completion marker.
    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut line = String::new();
        for segment in segments {
            line.push_str(segment.as_ref());
            line.push('\t');
        }
        line.push_str(EPISODE_DONE);
        Self(line)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Episode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
