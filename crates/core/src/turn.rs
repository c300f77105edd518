//! Turn segmentation and merging within a single thread.
//!
//! A thread's first comment fixes the root author. Every comment is then on
//! the root author's side or the other side, and a new turn starts exactly
//! where the side flips. Segmentation is a scan carrying the previous side
//! and the current turn index, so it must run over one thread sequentially.

use crate::model::{Thread, ThreadComment, Turn};
use crate::TURN_JOINER;

/// A thread comment annotated with its turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentedComment<'a> {
    pub comment: &'a ThreadComment,
    pub dialog_id: usize,
    pub is_root_author: bool,
}

/// Assign `dialog_id` and side to every comment, in thread order.
pub fn segment_turns(thread: &Thread) -> Vec<SegmentedComment<'_>> {
    let Some(root_author) = thread.comments.first().map(|c| &c.author) else {
        return Vec::new();
    };

    let mut segmented = Vec::with_capacity(thread.comments.len());
    let mut state: Option<(bool, usize)> = None;

    for comment in &thread.comments {
        let is_root_author = comment.author == *root_author;
        let dialog_id = match state {
            None => 0,
            Some((last_side, id)) if last_side == is_root_author => id,
            Some((_, id)) => id + 1,
        };
        state = Some((is_root_author, dialog_id));
        segmented.push(SegmentedComment {
            comment,
            dialog_id,
            is_root_author,
        });
    }

    segmented
}

/// Collapse each run of same-side comments into one turn.
///
/// Contents are joined with `". "` in time order; the turn keeps the
/// earliest timestamp of its run.
pub fn merge_turns(segmented: &[SegmentedComment<'_>]) -> Vec<Turn> {
    let mut turns: Vec<Turn> = Vec::new();

    for seg in segmented {
        match turns.last_mut() {
            Some(turn) if turn.dialog_id == seg.dialog_id => {
                turn.text.push_str(TURN_JOINER);
                turn.text.push_str(&seg.comment.contents);
            }
            _ => turns.push(Turn {
                dialog_id: seg.dialog_id,
                is_root_author: seg.is_root_author,
                text: seg.comment.contents.clone(),
                created_at: seg.comment.created_at,
            }),
        }
    }

    turns
}

/// Segment and merge a thread into its ordered turns.
pub fn thread_turns(thread: &Thread) -> Vec<Turn> {
    merge_turns(&segment_turns(thread))
}
