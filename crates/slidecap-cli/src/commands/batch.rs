//! `slidecap batch`: run `extract` over a list of videos, one at a time.
//!
//! Videos are processed sequentially, never in parallel — batching many
//! videos across CPU cores at once is an explicit non-goal (§1, §9): each
//! video already saturates the two pipeline threads on its own. A failure on
//! one video is reported and the batch continues with the next.

use std::path::PathBuf;

use crate::commands::extract::{self, ExtractArgs};

pub struct BatchArgs {
    pub videos: Vec<PathBuf>,
    pub out_dir: PathBuf,
    pub chunk_size: usize,
    pub threshold: Option<f64>,
    pub downsample: bool,
    pub jpeg_quality: u8,
    pub config: Option<PathBuf>,
}

pub fn run(args: BatchArgs) -> anyhow::Result<()> {
    let total = args.videos.len();
    let mut failures = Vec::new();

    for (index, video) in args.videos.into_iter().enumerate() {
        println!("[{}/{total}] {}", index + 1, video.display());
        let extract_args = ExtractArgs {
            video: video.clone(),
            out_dir: args.out_dir.clone(),
            chunk_size: args.chunk_size,
            threshold: args.threshold,
            downsample: args.downsample,
            jpeg_quality: args.jpeg_quality,
            config: args.config.clone(),
        };
        if let Err(err) = extract::run(extract_args) {
            eprintln!("  failed: {err:#}");
            failures.push(video);
        }
    }

    let succeeded = total - failures.len();
    println!("batch complete: {succeeded}/{total} video(s) succeeded");
    if !failures.is_empty() {
        eprintln!("failed videos:");
        for video in &failures {
            eprintln!("  {}", video.display());
        }
    }
    Ok(())
}
