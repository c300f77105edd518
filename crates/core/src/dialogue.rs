//! Assembles multi-turn episodes from reconstructed threads.

use std::collections::HashSet;

use rayon::prelude::*;

use crate::model::{Episode, Thread, Turn};
use crate::turn::thread_turns;

/// Number of turns, i.e. the last `dialog_id` plus one.
pub fn dialog_real_size(turns: &[Turn]) -> usize {
    turns.last().map_or(0, |t| t.dialog_id + 1)
}

/// Tab-joined tagged turns, or `None` when the thread has fewer than
/// `min_turns` turns (no genuine back-and-forth).
pub fn assemble_episode(thread: &Thread, min_turns: usize) -> Option<Episode> {
    let turns = thread_turns(thread);
    if dialog_real_size(&turns) < min_turns.max(1) {
        return None;
    }
    Some(Episode::from_segments(turns.iter().map(Turn::tagged)))
}

/// Episodes for every thread, deduplicated, in thread order.
///
/// Threads are independent, so they are assembled in parallel.
pub fn assemble_dialogues(threads: &[Thread], min_turns: usize) -> Vec<Episode> {
    let episodes: Vec<Option<Episode>> = threads
        .par_iter()
        .map(|thread| assemble_episode(thread, min_turns))
        .collect();

    let mut seen = HashSet::new();
    episodes
        .into_iter()
        .flatten()
        .filter(|e| seen.insert(e.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ThreadComment, ThreadKey};

    fn thread(root_id: u64, comments: &[(&str, &str)]) -> Thread {
        Thread {
            key: ThreadKey {
                gallery_id: "g".to_string(),
                document_id: 1,
                root_id,
            },
            comments: comments
                .iter()
                .enumerate()
                .map(|(i, (author, contents))| ThreadComment {
                    comment_id: root_id + i as u64,
                    author: (*author).into(),
                    contents: contents.to_string(),
                    created_at: None,
                })
                .collect(),
        }
    }

    #[test]
    fn test_three_turn_episode() {
        let t = thread(
            1,
            &[("a", "hi"), ("a", "anyone?"), ("b", "yes"), ("c", "me too"), ("a", "great")],
        );
        let episode = assemble_episode(&t, 2).unwrap();
        assert_eq!(
            episode.as_str(),
            "text:hi. anyone?\tlabels:yes. me too\ttext:great\tepisode:done"
        );
    }

    #[test]
    fn test_single_side_thread_is_dropped() {
        let t = thread(1, &[("a", "one"), ("a", "two"), ("a", "three")]);
        assert_eq!(dialog_real_size(&thread_turns(&t)), 1);
        assert!(assemble_episode(&t, 2).is_none());
    }

    #[test]
    fn test_min_turns_threshold() {
        let t = thread(1, &[("a", "q"), ("b", "r")]);
        assert!(assemble_episode(&t, 2).is_some());
        assert!(assemble_episode(&t, 3).is_none());
    }

    #[test]
    fn test_duplicate_threads_collapse() {
        let threads = vec![
            thread(1, &[("a", "q"), ("b", "r")]),
            thread(10, &[("x", "q"), ("y", "r")]),
            thread(20, &[("x", "q"), ("y", "other")]),
        ];
        let episodes = assemble_dialogues(&threads, 2);
        assert_eq!(episodes.len(), 2);
        assert_eq!(episodes[0].as_str(), "text:q\tlabels:r\tepisode:done");
        let distinct: HashSet<_> = episodes.iter().collect();
        assert_eq!(distinct.len(), episodes.len());
    }
}
