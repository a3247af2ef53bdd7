//! Keyframe-interval estimation and the sampling-strategy classification of
//! §4.D, steps 2-4.

/// Which keyframes the decoder keeps once the average I-frame interval has
/// been classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SamplingStrategy {
    UseAllKeyframes,
    DropEveryOtherKeyframe,
}

/// Resolutions that count towards the "screen recording" heuristic.
const SCREEN_RESOLUTIONS: &[(u32, u32)] = &[
    (1920, 1080),
    (2560, 1440),
    (3840, 2160),
    (1280, 720),
    (1366, 768),
    (1440, 900),
];

/// Codec short names that count towards the "screen recording" heuristic.
const SCREEN_CODECS: &[&str] = &["h264", "hevc", "prores"];

/// Average the inter-keyframe gaps observed among up to the first 100
/// packets. Fewer than two keyframes observed defaults to 2.0s (§4.D.2).
pub fn estimate_avg_keyframe_interval(keyframe_pts_seconds: &[f64]) -> f64 {
    if keyframe_pts_seconds.len() < 2 {
        return 2.0;
    }
    let gaps: Vec<f64> = keyframe_pts_seconds
        .windows(2)
        .map(|w| w[1] - w[0])
        .collect();
    gaps.iter().sum::<f64>() / gaps.len() as f64
}

/// Classify the average interval into a sampling strategy, plus whether the
/// stream should be flagged as having sparse keyframes (§4.D.3).
pub fn classify_interval(avg_interval_s: f64) -> (SamplingStrategy, bool) {
    if avg_interval_s >= 4.0 {
        (SamplingStrategy::UseAllKeyframes, true)
    } else if (1.6..=1.9).contains(&avg_interval_s) {
        (SamplingStrategy::UseAllKeyframes, false)
    } else if (1.0..=1.5).contains(&avg_interval_s) {
        (SamplingStrategy::DropEveryOtherKeyframe, false)
    } else {
        (SamplingStrategy::UseAllKeyframes, false)
    }
}

/// Informational-only "looks like a screen recording" heuristic (§4.D.4):
/// true when at least 2 of the 4 signals hold.
pub fn is_screen_recording(
    width: u32,
    height: u32,
    codec_name: &str,
    frame_rate: f64,
    avg_keyframe_interval_s: f64,
) -> bool {
    let mut signals = 0u8;
    if SCREEN_RESOLUTIONS.contains(&(width, height)) {
        signals += 1;
    }
    if SCREEN_CODECS.contains(&codec_name) {
        signals += 1;
    }
    if [25.0, 30.0, 60.0]
        .iter()
        .any(|&target| (frame_rate - target).abs() <= 1.0)
    {
        signals += 1;
    }
    if (0.5..=10.0).contains(&avg_keyframe_interval_s) {
        signals += 1;
    }
    signals >= 2
}

/// Given a running count of keyframes seen so far (1-based) and the
/// sampling strategy, decide whether this keyframe is kept.
pub fn keep_keyframe(strategy: SamplingStrategy, keyframe_ordinal: u64) -> bool {
    match strategy {
        SamplingStrategy::UseAllKeyframes => true,
        SamplingStrategy::DropEveryOtherKeyframe => keyframe_ordinal % 2 == 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fewer_than_two_keyframes_defaults_to_two_seconds() {
        assert_eq!(estimate_avg_keyframe_interval(&[]), 2.0);
        assert_eq!(estimate_avg_keyframe_interval(&[1.0]), 2.0);
    }

    #[test]
    fn averages_the_gaps() {
        let interval = estimate_avg_keyframe_interval(&[0.0, 2.0, 4.0, 6.0]);
        assert!((interval - 2.0).abs() < 1e-9);
    }

    #[test]
    fn classification_boundaries() {
        assert_eq!(
            classify_interval(4.0),
            (SamplingStrategy::UseAllKeyframes, true)
        );
        assert_eq!(
            classify_interval(1.75),
            (SamplingStrategy::UseAllKeyframes, false)
        );
        assert_eq!(
            classify_interval(1.2),
            (SamplingStrategy::DropEveryOtherKeyframe, false)
        );
        assert_eq!(
            classify_interval(0.3),
            (SamplingStrategy::UseAllKeyframes, false)
        );
        assert_eq!(
            classify_interval(3.0),
            (SamplingStrategy::UseAllKeyframes, false)
        );
    }

    #[test]
    fn screen_recording_needs_two_signals() {
        // resolution + codec, fps/interval off
        assert!(is_screen_recording(1920, 1080, "h264", 24.0, 20.0));
        // only resolution
        assert!(!is_screen_recording(1920, 1080, "vp8", 24.0, 20.0));
    }

    #[test]
    fn drop_every_other_keeps_odd_ordinals() {
        assert!(keep_keyframe(SamplingStrategy::DropEveryOtherKeyframe, 1));
        assert!(!keep_keyframe(SamplingStrategy::DropEveryOtherKeyframe, 2));
        assert!(keep_keyframe(SamplingStrategy::UseAllKeyframes, 2));
    }
}
