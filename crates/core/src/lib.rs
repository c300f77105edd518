//! Core serialization logic for threaded forum comments.
//!
//! Documents carry a flat list of comments that reply either to the document
//! or to another comment. This crate rebuilds the reply threads, splits each
//! thread into alternating turns, and emits line-oriented dialogue episodes
//! (`text:...\tlabels:...\tepisode:done`) for conversational model training.
//! A second, single-turn path pairs each document with direct replies from
//! other authors.

use std::io::{self, Write};

/// Destination for finished episodes.
///
/// Persistence (sharding, compression, object storage) belongs to the
/// implementor; the pipeline only hands over episodes in output order.
pub trait EpisodeSink {
    fn write_episode(&mut self, episode: &Episode) -> io::Result<()>;
}

// `&mut S` is a sink too, so a sink can be lent to `write_episodes`
impl<S: EpisodeSink + ?Sized> EpisodeSink for &mut S {
    fn write_episode(&mut self, episode: &Episode) -> io::Result<()> {
        (**self).write_episode(episode)
    }
}

impl EpisodeSink for Vec<Episode> {
    fn write_episode(&mut self, episode: &Episode) -> io::Result<()> {
        self.push(episode.clone());
        Ok(())
    }
}

/// Writes one episode per line.
pub struct TextSink<W: Write> {
    inner: W,
}

impl<W: Write> TextSink<W> {
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> EpisodeSink for TextSink<W> {
    fn write_episode(&mut self, episode: &Episode) -> io::Result<()> {
        writeln!(self.inner, "{}", episode)
    }
}

mod dialogue;
mod error;
mod helpers;
pub mod input;
mod model;
pub mod pipeline;
mod self_reply;
mod thread;
mod turn;

pub use dialogue::{assemble_dialogues, assemble_episode, dialog_real_size};
pub use error::{PipelineError, Result};
pub use helpers::{
    canonicalize_whitespace, is_block_markup, normalize_contents, normalize_sticker_markup,
};
pub use input::{discover_input_files, read_documents, ReadOutcome};
pub use model::{
    Author, CommentRecord, DocumentRecord, Episode, Thread, ThreadComment, ThreadKey, Turn, User,
    UserKind,
};
pub use pipeline::{
    build_episodes, process_all_documents, write_episodes, write_output, EpisodeBatch,
    PipelineConfig, PipelineResult,
};
pub use self_reply::{extract_document_replies, extract_self_replies};
pub use thread::{group_threads, reconstruct_threads, retain_dialog_sized};
pub use turn::{merge_turns, segment_turns, thread_turns, SegmentedComment};

/// Tag of the prompt side (the thread's root author, or the document).
pub const TEXT_TAG: &str = "text:";

/// Tag of the response side.
pub const LABELS_TAG: &str = "labels:";

/// Completion marker closing every episode.
pub const EPISODE_DONE: &str = "episode:done";

/// Separates document id and title in a self-reply prompt.
pub const PROMPT_SEPARATOR: &str = "¶";

/// Joins the comments of one turn.
pub const TURN_JOINER: &str = ". ";

/// Placeholder token substituted for inline sticker markup.
pub const STICKER_TOKEN: &str = "<dccon>";

/// Default minimum comments for a thread to be considered a dialog.
pub const MIN_THREAD_COMMENTS: usize = 2;

/// Default minimum turns (side switches + 1) for a dialogue episode.
pub const MIN_DIALOG_TURNS: usize = 2;

/// Name of the episode shard written into the output directory.
pub const EPISODES_FILE_NAME: &str = "episodes.txt";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_sink_writes_lines() {
        let mut sink = TextSink::new(Vec::new());
        sink.write_episode(&Episode::from_segments(["text:a", "labels:b"]))
            .unwrap();
        sink.write_episode(&Episode::from_segments(["text:c", "labels:d"]))
            .unwrap();
        let out = String::from_utf8(sink.into_inner()).unwrap();
        assert_eq!(
            out,
            "text:a\tlabels:b\tepisode:done\ntext:c\tlabels:d\tepisode:done\n"
        );
    }

    #[test]
    fn test_sink_through_mut_ref() {
        fn write_one<S: EpisodeSink>(mut sink: S) {
            sink.write_episode(&Episode::from_segments(["text:x", "labels:y"]))
                .unwrap();
        }

        let mut episodes: Vec<Episode> = Vec::new();
        write_one(&mut episodes);
        write_one(&mut episodes);
        assert_eq!(episodes.len(), 2);
    }
}
