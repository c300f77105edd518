//! Pipeline for turning forum document dumps into episode shards.

use std::collections::HashSet;
use std::fs::File;
use std::io::{self, BufWriter};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info};

use crate::dialogue::assemble_dialogues;
use crate::error::{PipelineError, Result};
use crate::input::{discover_input_files, read_documents, ReadOutcome};
use crate::model::{DocumentRecord, Episode};
use crate::self_reply::extract_self_replies;
use crate::thread::{group_threads, retain_dialog_sized};
use crate::{EpisodeSink, TextSink, EPISODES_FILE_NAME, MIN_DIALOG_TURNS, MIN_THREAD_COMMENTS};

/// Configuration for the pipeline.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Emit single-turn document/reply episodes.
    pub self_replies: bool,
    /// Emit multi-turn thread episodes.
    pub dialogues: bool,
    pub min_thread_comments: usize,
    pub min_dialog_turns: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            self_replies: true,
            dialogues: true,
            min_thread_comments: MIN_THREAD_COMMENTS,
            min_dialog_turns: MIN_DIALOG_TURNS,
        }
    }
}

/// Counts describing one batch run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PipelineResult {
    /// Document records read. CSV rows are regrouped per file, so a
    /// document whose rows span several CSV files counts once per file;
    /// its comments still join the same threads.
    pub total_documents: usize,
    pub total_comments: usize,
    pub skipped_records: usize,
    /// Threads after the contents filter, before the size filter.
    pub total_threads: usize,
    pub conversational_threads: usize,
    pub self_reply_episodes: usize,
    pub dialogue_episodes: usize,
    /// Episodes produced by both paths and dropped from the union.
    pub duplicate_episodes: usize,
    pub total_episodes: usize,
}

/// Deduplicated output of one batch, with its counts.
#[derive(Debug, Default)]
pub struct EpisodeBatch {
    pub episodes: Vec<Episode>,
    pub result: PipelineResult,
}

/// Run both paths over an in-memory batch and union their output.
///
/// Self-reply episodes come first, then dialogue episodes in thread order.
pub fn build_episodes(documents: &[DocumentRecord], config: &PipelineConfig) -> EpisodeBatch {
    let mut result = PipelineResult {
        total_documents: documents.len(),
        total_comments: documents.iter().map(|d| d.comments().len()).sum(),
        ..Default::default()
    };

    let self_replies = if config.self_replies {
        extract_self_replies(documents)
    } else {
        Vec::new()
    };
    result.self_reply_episodes = self_replies.len();

    let dialogues = if config.dialogues {
        let threads = group_threads(documents);
        result.total_threads = threads.len();
        let threads = retain_dialog_sized(threads, config.min_thread_comments);
        result.conversational_threads = threads.len();
        debug!(
            total = result.total_threads,
            conversational = result.conversational_threads,
            "reconstructed threads"
        );
        assemble_dialogues(&threads, config.min_dialog_turns)
    } else {
        Vec::new()
    };
    result.dialogue_episodes = dialogues.len();

    let mut seen = HashSet::with_capacity(self_replies.len() + dialogues.len());
    let episodes: Vec<Episode> = self_replies
        .into_iter()
        .chain(dialogues)
        .filter(|e| seen.insert(e.clone()))
        .collect();

    result.total_episodes = episodes.len();
    result.duplicate_episodes =
        result.self_reply_episodes + result.dialogue_episodes - result.total_episodes;

    info!(
        self_replies = result.self_reply_episodes,
        dialogues = result.dialogue_episodes,
        total = result.total_episodes,
        "assembled episodes"
    );

    EpisodeBatch { episodes, result }
}

/// Read every input file under `input_root` in parallel and build episodes.
///
/// Malformed records are skipped; an unreadable file fails the batch.
pub fn process_all_documents(input_root: &Path, config: &PipelineConfig) -> Result<EpisodeBatch> {
    let files = discover_input_files(input_root)?;
    let total_files = files.len();
    let processed_count = AtomicUsize::new(0);

    let outcomes: Vec<ReadOutcome> = files
        .par_iter()
        .map(|path| -> Result<ReadOutcome> {
            let outcome = read_documents(path)?;
            let count = processed_count.fetch_add(1, Ordering::Relaxed) + 1;
            if count % 100 == 0 || count == total_files {
                info!("Read {}/{} input files...", count, total_files);
            }
            Ok(outcome)
        })
        .collect::<Result<Vec<_>>>()?;

    let skipped_records: usize = outcomes.iter().map(|o| o.skipped_records).sum();
    let documents: Vec<DocumentRecord> = outcomes.into_iter().flat_map(|o| o.documents).collect();
    info!(
        files = total_files,
        documents = documents.len(),
        skipped = skipped_records,
        "loaded input"
    );

    let mut batch = build_episodes(&documents, config);
    batch.result.skipped_records = skipped_records;
    Ok(batch)
}

/// Hand episodes to a sink in order. Returns how many were written.
pub fn write_episodes<S: EpisodeSink>(episodes: &[Episode], mut sink: S) -> io::Result<usize> {
    for episode in episodes {
        sink.write_episode(episode)?;
    }
    Ok(episodes.len())
}

/// Write the batch as a single text shard in `output_dir`.
pub fn write_output(batch: &EpisodeBatch, output_dir: &Path) -> Result<PipelineResult> {
    std::fs::create_dir_all(output_dir).map_err(|e| PipelineError::io(output_dir, e))?;

    let path = output_dir.join(EPISODES_FILE_NAME);
    let file = File::create(&path).map_err(|e| PipelineError::io(&path, e))?;
    let mut sink = TextSink::new(BufWriter::new(file));

    let written = write_episodes(&batch.episodes, &mut sink).map_err(|e| PipelineError::io(&path, e))?;
    sink.flush().map_err(|e| PipelineError::io(&path, e))?;

    info!(path = ?path, episodes = written, "wrote episode shard");
    Ok(batch.result.clone())
}
