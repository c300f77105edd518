//! Single-turn episodes: a document as the prompt, a direct reply from
//! someone else as the response.

use std::collections::HashSet;

use rayon::prelude::*;

use crate::helpers::{canonicalize_whitespace, is_block_markup, normalize_contents};
use crate::model::{DocumentRecord, Episode};
use crate::{LABELS_TAG, PROMPT_SEPARATOR, TEXT_TAG};

/// Episodes for one document, in comment order.
///
/// Only comments attached to the document itself (no parent) by an author
/// other than the document's are used.
pub fn extract_document_replies(document: &DocumentRecord) -> Vec<Episode> {
    let prompt = format!(
        "{}{}{}{}",
        TEXT_TAG,
        document.document_id,
        PROMPT_SEPARATOR,
        canonicalize_whitespace(&document.title)
    );

    document
        .comments()
        .iter()
        .filter(|c| c.parent_id.is_none() && c.author != document.author)
        .filter_map(|c| {
            let contents = c.contents.as_deref().filter(|s| !is_block_markup(s))?;
            let response = format!("{}{}", LABELS_TAG, normalize_contents(contents));
            Some(Episode::from_segments([prompt.as_str(), response.as_str()]))
        })
        .collect()
}

/// Self-reply episodes for a batch of documents, deduplicated, first
/// occurrence first.
pub fn extract_self_replies(documents: &[DocumentRecord]) -> Vec<Episode> {
    let per_document: Vec<Vec<Episode>> =
        documents.par_iter().map(extract_document_replies).collect();

    let mut seen = HashSet::new();
    per_document
        .into_iter()
        .flatten()
        .filter(|e| seen.insert(e.clone()))
        .collect()
}
