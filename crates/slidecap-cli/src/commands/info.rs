//! `slidecap info`: classify a video's sampling strategy (§4.D steps 1-4)
//! and print it, without running the SSIM/detector/sink stages.
//!
//! The decoder only knows its own classification after opening the file and
//! scanning a handful of packets, and only reports it through the ordinary
//! `video_info` progress event partway into [`run_decode`]. Rather than add a
//! second decoder entry point, this command lets `run_decode` start normally
//! on a producer thread and cancels it the instant that event arrives,
//! draining (and discarding) whatever chunks were already queued so the
//! producer's `put` calls never block forever.

use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;

use anyhow::{bail, Context, Result};

use slidecap_core::{CancellationToken, ChunkQueue, ProgressEvent, Taken};
use slidecap_decode::{run_decode, DecodeError, DecoderConfig};

pub struct InfoArgs {
    pub video: PathBuf,
}

pub fn run(args: InfoArgs) -> Result<()> {
    let cancel = CancellationToken::new();
    let queue = ChunkQueue::new(cancel.clone());
    let (tx, rx) = mpsc::channel::<ProgressEvent>();
    let decoder_config = DecoderConfig::default();

    let decode_result = thread::scope(|scope| {
        let queue_ref = &queue;
        let cancel_for_producer = cancel.clone();
        let cancel_for_sink = cancel.clone();
        let progress = move |event: ProgressEvent| {
            if matches!(event, ProgressEvent::VideoInfo { .. }) {
                let _ = tx.send(event);
                cancel_for_sink.cancel();
            }
        };
        let producer = scope.spawn(move || {
            run_decode(
                &args.video,
                &decoder_config,
                queue_ref,
                &cancel_for_producer,
                &progress,
            )
        });

        loop {
            match queue.take() {
                Taken::Chunk(_) => continue,
                Taken::EndOfStream | Taken::Cancelled => break,
            }
        }
        producer.join().expect("producer thread panicked")
    });

    let video_info_event = rx.try_recv();

    match decode_result {
        Ok(_) => {}
        Err(DecodeError::Cancelled) => {}
        Err(e) => return Err(e).context("failed to classify video"),
    }

    let ProgressEvent::VideoInfo {
        width,
        height,
        duration_s,
        frame_rate,
        avg_keyframe_interval_s,
        screen_recording,
        backend_name,
    } = video_info_event.map_err(|_| anyhow::anyhow!("decoder never reported video info"))?
    else {
        bail!("decoder never reported video info");
    };

    println!("path:              {}", args.video.display());
    println!("backend:           {backend_name}");
    println!("resolution:        {width}x{height}");
    println!("duration:          {:.1}s", duration_s);
    println!("frame rate:        {:.2} fps", frame_rate);
    println!("avg keyframe gap:  {:.2}s", avg_keyframe_interval_s);
    println!("screen recording:  {screen_recording}");
    Ok(())
}
