//! Hardware-backend dispatch for the decoder (§4.D "Backend selection").
//!
//! Selection is a capability probe at start-up, kept out of the hot decode
//! loop per the Design Notes: try platform-native hardware in priority
//! order, fall back to a second hardware family, and finally to software.
//! The output contract — BGR 8-bit frames — is identical regardless of
//! which backend decoded them.

use ffmpeg_next::codec;

use crate::error::DecodeError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    VideoToolbox,
    Vaapi,
    Nvdec,
    Software,
}

impl BackendKind {
    pub fn name(&self) -> &'static str {
        match self {
            BackendKind::VideoToolbox => "videotoolbox",
            BackendKind::Vaapi => "vaapi",
            BackendKind::Nvdec => "nvdec",
            BackendKind::Software => "software",
        }
    }
}

/// Platform-ordered candidate list; software is always last and always
/// succeeds for a supported codec.
#[cfg(target_os = "macos")]
fn candidate_order() -> &'static [BackendKind] {
    &[BackendKind::VideoToolbox, BackendKind::Software]
}

#[cfg(target_os = "linux")]
fn candidate_order() -> &'static [BackendKind] {
    &[BackendKind::Vaapi, BackendKind::Nvdec, BackendKind::Software]
}

#[cfg(not(any(target_os = "macos", target_os = "linux")))]
fn candidate_order() -> &'static [BackendKind] {
    &[BackendKind::Software]
}

/// Hardware decoders register under their own FFmpeg codec names (as the
/// `ffmpeg -c:v h264_videotoolbox` CLI flag would); `None` means this
/// codec/backend combination has no registered hardware decoder.
fn hw_codec_name(codec_id: codec::Id, kind: BackendKind) -> Option<&'static str> {
    use codec::Id::*;
    match (codec_id, kind) {
        (H264, BackendKind::VideoToolbox) => Some("h264_videotoolbox"),
        (HEVC, BackendKind::VideoToolbox) => Some("hevc_videotoolbox"),
        (H264, BackendKind::Vaapi) => Some("h264_vaapi"),
        (HEVC, BackendKind::Vaapi) => Some("hevc_vaapi"),
        (VP9, BackendKind::Vaapi) => Some("vp9_vaapi"),
        (H264, BackendKind::Nvdec) => Some("h264_cuvid"),
        (HEVC, BackendKind::Nvdec) => Some("hevc_cuvid"),
        _ => None,
    }
}

pub struct OpenedDecoder {
    pub decoder: codec::decoder::Video,
    pub backend: BackendKind,
}

/// Try each candidate backend in priority order, falling back silently to
/// the next (§4.D: "If a hardware path fails to initialise, fall back to
/// software silently; if software also fails, the open step fails").
pub fn open_video_decoder(
    codec_id: codec::Id,
    parameters: &codec::Parameters,
) -> Result<OpenedDecoder, DecodeError> {
    for &kind in candidate_order() {
        match try_open(codec_id, kind, parameters) {
            Ok(decoder) => return Ok(OpenedDecoder { decoder, backend: kind }),
            Err(err) => {
                tracing::debug!(backend = kind.name(), %err, "backend unavailable, trying next");
            }
        }
    }
    Err(DecodeError::UnsupportedCodec(format!("{codec_id:?}")))
}

fn try_open(
    codec_id: codec::Id,
    kind: BackendKind,
    parameters: &codec::Parameters,
) -> Result<codec::decoder::Video, DecodeError> {
    let codec = if kind == BackendKind::Software {
        codec::decoder::find(codec_id)
            .ok_or_else(|| DecodeError::UnsupportedCodec(format!("{codec_id:?}")))?
    } else {
        let name = hw_codec_name(codec_id, kind)
            .ok_or_else(|| DecodeError::HardwareBackendUnavailable(kind.name().to_string()))?;
        codec::decoder::find_by_name(name)
            .ok_or_else(|| DecodeError::HardwareBackendUnavailable(name.to_string()))?
    };

    let mut context = codec::context::Context::new_with_codec(codec);
    context
        .set_parameters(parameters.clone())
        .map_err(|e| DecodeError::HardwareBackendUnavailable(e.to_string()))?;
    context
        .decoder()
        .video()
        .map_err(|e| DecodeError::HardwareBackendUnavailable(e.to_string()))
}
