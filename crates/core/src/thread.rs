//! Groups a flat comment list into reply threads keyed by root comment.

use std::collections::BTreeMap;

use crate::helpers::{is_block_markup, normalize_contents};
use crate::model::{DocumentRecord, Thread, ThreadComment, ThreadKey};

/// Threads before the size filter, in key order.
///
/// Comments with no contents or block-markup contents are dropped before
/// grouping; the rest are normalized and sorted chronologically. Grouping is
/// global, so a document split across several records still yields one
/// thread per root.
pub fn group_threads(documents: &[DocumentRecord]) -> Vec<Thread> {
    let mut groups: BTreeMap<ThreadKey, Vec<ThreadComment>> = BTreeMap::new();

    for document in documents {
        for comment in document.comments() {
            let contents = match comment.contents.as_deref() {
                Some(c) if !is_block_markup(c) => c,
                _ => continue,
            };
            let key = ThreadKey {
                gallery_id: document.gallery_id.clone(),
                document_id: document.document_id,
                root_id: comment.root_id(),
            };
            groups.entry(key).or_default().push(ThreadComment {
                comment_id: comment.id,
                author: comment.author.clone(),
                contents: normalize_contents(contents),
                created_at: comment.created_at,
            });
        }
    }

    groups
        .into_iter()
        .map(|(key, mut comments)| {
            comments.sort_by(ThreadComment::chronological_cmp);
            Thread { key, comments }
        })
        .collect()
}

/// Keep threads with at least `min_comments` comments. A lone comment has
/// nothing to pair against.
pub fn retain_dialog_sized(threads: Vec<Thread>, min_comments: usize) -> Vec<Thread> {
    threads
        .into_iter()
        .filter(|t| t.len() >= min_comments)
        .collect()
}

/// Group and size-filter in one step.
pub fn reconstruct_threads(documents: &[DocumentRecord], min_comments: usize) -> Vec<Thread> {
    retain_dialog_sized(group_threads(documents), min_comments)
}
