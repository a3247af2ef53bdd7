//! slidecap-sink: writes detector-selected slide frames to disk (§4.W).
//!
//! Consumes `(global_index, FrameBuffer view)` pairs from the detector in
//! save order and writes each as a JPEG under
//! `{base_out}/slides_{video_name}/slide_{video_name}_{NNN}.jpg`, `NNN`
//! being a 1-based, zero-padded (width 3) sequence number. The folder is
//! created once, at construction; per-slide write/encode failures are the
//! caller's to log and step past (§7).

pub mod error;

use std::fs;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use image::codecs::jpeg::JpegEncoder;
use image::ColorType;

use slidecap_core::{FrameView, ProgressEvent, ProgressSink, CHANNELS};

pub use error::{Result, SinkError};

pub struct Sink {
    out_dir: PathBuf,
    video_name: String,
    jpeg_quality: u8,
    next_sequence: u32,
}

impl Sink {
    /// Create (or reuse) `{base_out}/slides_{video_name}` and prepare to
    /// write slides into it, numbered from 1. Fails with `SinkError::CreateDir`
    /// if the folder cannot be created — fatal for the current video (§7).
    pub fn new(base_out: &Path, video_name: &str, jpeg_quality: u8) -> Result<Self> {
        let out_dir = base_out.join(format!("slides_{video_name}"));
        fs::create_dir_all(&out_dir).map_err(|source| SinkError::CreateDir {
            path: out_dir.clone(),
            source,
        })?;
        Ok(Self {
            out_dir,
            video_name: video_name.to_string(),
            jpeg_quality,
            next_sequence: 1,
        })
    }

    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    /// Number of slides written so far (the sequence number the *next*
    /// `save` call will use).
    pub fn saved_count(&self) -> u32 {
        self.next_sequence - 1
    }

    /// Encode `view` as a JPEG and write it to the next sequence slot,
    /// emitting a `slide_saved` progress event. Advances the sequence
    /// counter only on success, so a failed write does not leave a gap in
    /// the numbering.
    pub fn save(&mut self, view: FrameView<'_>, progress: &dyn ProgressSink) -> Result<PathBuf> {
        let sequence = self.next_sequence;
        let file_name = format!("slide_{}_{:03}.jpg", self.video_name, sequence);
        let path = self.out_dir.join(&file_name);

        let rgb = bgr_view_to_packed_rgb(view);
        let file = fs::File::create(&path).map_err(|source| SinkError::Write {
            path: path.clone(),
            source,
        })?;
        let mut writer = BufWriter::new(file);
        JpegEncoder::new_with_quality(&mut writer, self.jpeg_quality)
            .encode(&rgb, view.width, view.height, ColorType::Rgb8)
            .map_err(|source| SinkError::Encode {
                path: path.clone(),
                source,
            })?;

        self.next_sequence += 1;
        progress.emit(ProgressEvent::SlideSaved {
            video_name: self.video_name.clone(),
            sequence_number: sequence,
            file_path: path.clone(),
        });
        tracing::debug!(sequence, path = %path.display(), "slide saved");
        Ok(path)
    }
}

/// Strip row padding and swap BGR -> RGB channel order: the only layout the
/// `image` crate's packed encoder accepts.
fn bgr_view_to_packed_rgb(view: FrameView<'_>) -> Vec<u8> {
    let mut out = Vec::with_capacity(view.width as usize * view.height as usize * CHANNELS);
    for y in 0..view.height {
        for px in view.row(y).chunks_exact(CHANNELS) {
            out.push(px[2]);
            out.push(px[1]);
            out.push(px[0]);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use slidecap_core::FrameBuffer;
    use tempfile::tempdir;

    fn gradient_frame(width: u32, height: u32) -> FrameBuffer {
        let mut buf = FrameBuffer::create(width, height).unwrap();
        let stride = buf.stride();
        for y in 0..height {
            let row_start = y as usize * stride;
            let row = &mut buf.bytes_mut()[row_start..row_start + width as usize * CHANNELS];
            for (x, px) in row.chunks_exact_mut(CHANNELS).enumerate() {
                px[0] = (x * 7 % 256) as u8;
                px[1] = (x * 13 % 256) as u8;
                px[2] = ((x + y as usize) * 3 % 256) as u8;
            }
        }
        buf
    }

    #[test]
    fn creates_per_video_folder_and_numbers_slides_in_order() {
        let dir = tempdir().unwrap();
        let mut sink = Sink::new(dir.path(), "Lecture", 95).unwrap();
        let frame = gradient_frame(16, 16);

        let mut paths = Vec::new();
        for _ in 0..3 {
            paths.push(sink.save(frame.view(), &slidecap_core::NullProgressSink).unwrap());
        }

        assert_eq!(sink.out_dir(), dir.path().join("slides_Lecture"));
        let names: Vec<_> = paths
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap().to_string())
            .collect();
        assert_eq!(
            names,
            vec![
                "slide_Lecture_001.jpg",
                "slide_Lecture_002.jpg",
                "slide_Lecture_003.jpg",
            ]
        );
        for path in &paths {
            assert!(path.exists());
        }
        // Lexicographic order matches save order (zero-padded width 3).
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
        assert_eq!(sink.saved_count(), 3);
    }

    #[test]
    fn reuses_an_existing_output_directory() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("slides_Lecture")).unwrap();
        assert!(Sink::new(dir.path(), "Lecture", 95).is_ok());
    }

    #[test]
    fn emits_slide_saved_progress_event() {
        use std::sync::{Arc, Mutex};

        let dir = tempdir().unwrap();
        let mut sink = Sink::new(dir.path(), "Lecture", 95).unwrap();
        let events = Arc::new(Mutex::new(Vec::new()));
        let events2 = Arc::clone(&events);
        let progress = move |event: ProgressEvent| events2.lock().unwrap().push(event);

        sink.save(gradient_frame(8, 8).view(), &progress).unwrap();

        let events = events.lock().unwrap();
        assert_eq!(events.len(), 1);
        match &events[0] {
            ProgressEvent::SlideSaved {
                video_name,
                sequence_number,
                ..
            } => {
                assert_eq!(video_name, "Lecture");
                assert_eq!(*sequence_number, 1);
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    /// Testable property 8 (§8): JPEG round-trip at quality=95 preserves
    /// enough structure that SSIM against the original is >= 0.99.
    #[test]
    fn jpeg_round_trip_preserves_structural_similarity() {
        let dir = tempdir().unwrap();
        let mut sink = Sink::new(dir.path(), "Lecture", 95).unwrap();
        let frame = gradient_frame(64, 64);
        let path = sink.save(frame.view(), &slidecap_core::NullProgressSink).unwrap();

        let decoded = image::open(&path).unwrap().to_rgb8();
        let (width, height) = (decoded.width(), decoded.height());
        let stride = slidecap_core::framebuffer::align_up(width as usize * CHANNELS);
        let mut bytes = vec![0u8; stride * height as usize];
        for y in 0..height {
            let row_start = y as usize * stride;
            let row = &mut bytes[row_start..row_start + width as usize * CHANNELS];
            for (x, px) in row.chunks_exact_mut(CHANNELS).enumerate() {
                let [r, g, b] = decoded.get_pixel(x as u32, y).0;
                px[0] = b;
                px[1] = g;
                px[2] = r;
            }
        }
        let round_tripped = FrameBuffer::from_bytes(width, height, stride, bytes).unwrap();

        let score = slidecap_metrics::ssim(frame.view(), round_tripped.view(), None).unwrap();
        assert!(score >= 0.99, "round-trip ssim too low: {score}");
    }
}
