//! CLI tool for serializing forum comment dumps into dialogue episodes.
//!
//! Reads JSONL document dumps (or flat CSV comment tables), rebuilds reply
//! threads, and writes one `text:...\tlabels:...\tepisode:done` line per
//! episode, ready for a ParlAI-style training pipeline.

use std::path::PathBuf;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use comment_episode_serializer_core::{
    pipeline::{PipelineConfig, PipelineResult},
    process_all_documents, write_output, EPISODES_FILE_NAME, MIN_DIALOG_TURNS,
    MIN_THREAD_COMMENTS,
};

/// Serialize forum comment threads into dialogue training episodes.
#[derive(Parser, Debug)]
#[command(name = "comment-episode-serialize")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Input file, or directory searched recursively for .jsonl/.json/.csv files
    #[arg(long)]
    input_root: PathBuf,

    /// Output directory for the episode shard and metadata
    #[arg(long)]
    output_dir: PathBuf,

    /// Skip single-turn document/reply episodes
    #[arg(long)]
    no_self_replies: bool,

    /// Skip multi-turn thread episodes
    #[arg(long)]
    no_dialogues: bool,

    /// Minimum comments for a thread to count as a dialog
    #[arg(long, default_value_t = MIN_THREAD_COMMENTS)]
    min_thread_comments: usize,

    /// Minimum turns for a thread to become an episode
    #[arg(long, default_value_t = MIN_DIALOG_TURNS)]
    min_dialog_turns: usize,
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();
    let args = Args::parse();

    let config = PipelineConfig {
        self_replies: !args.no_self_replies,
        dialogues: !args.no_dialogues,
        min_thread_comments: args.min_thread_comments,
        min_dialog_turns: args.min_dialog_turns,
    };

    info!("Processing input from {:?}...", args.input_root);
    let batch = process_all_documents(&args.input_root, &config)?;

    info!("Writing output to {:?}...", args.output_dir);
    let result: PipelineResult = write_output(&batch, &args.output_dir)?;

    let episodes_path = args.output_dir.join(EPISODES_FILE_NAME);
    let metadata_path = args.output_dir.join("metadata.json");
    let metadata = serde_json::json!({
        "config": {
            "input_root": args.input_root.to_string_lossy(),
            "output_dir": args.output_dir.to_string_lossy(),
            "self_replies": config.self_replies,
            "dialogues": config.dialogues,
            "min_thread_comments": config.min_thread_comments,
            "min_dialog_turns": config.min_dialog_turns,
        },
        "counts": &result,
        "files": {
            "episodes_path": episodes_path.to_string_lossy(),
        },
    });
    std::fs::write(&metadata_path, serde_json::to_string_pretty(&metadata)?)?;

    println!("\n[summary]");
    println!("  Documents processed: {}", result.total_documents);
    println!("  Comments processed: {}", result.total_comments);
    println!("  Skipped records: {}", result.skipped_records);
    println!(
        "  Threads (conversational/total): {}/{}",
        result.conversational_threads, result.total_threads
    );
    println!("  Self-reply episodes: {}", result.self_reply_episodes);
    println!("  Dialogue episodes: {}", result.dialogue_episodes);
    println!("  Total episodes: {}", result.total_episodes);
    println!("  Output: {:?}", episodes_path);
    println!("  Metadata: {:?}", metadata_path);

    Ok(())
}
