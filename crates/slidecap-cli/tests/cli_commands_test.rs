//! Integration tests for the `slidecap` command-line front end: argument
//! parsing and failure modes of its three subcommands (§10.5). Spawns the
//! built binary directly via `CARGO_BIN_EXE_slidecap` rather than invoking
//! `main`'s internals, since `slidecap-cli` only exposes a binary target.

use std::io::Write;
use std::process::Command;

use tempfile::NamedTempFile;

fn slidecap() -> Command {
    Command::new(env!("CARGO_BIN_EXE_slidecap"))
}

fn output(cmd: &mut Command) -> (bool, String, String) {
    let out = cmd.output().expect("failed to run slidecap binary");
    (
        out.status.success(),
        String::from_utf8_lossy(&out.stdout).into_owned(),
        String::from_utf8_lossy(&out.stderr).into_owned(),
    )
}

#[test]
fn extract_requires_a_video_path() {
    let (ok, _, stderr) = output(slidecap().arg("extract"));
    assert!(!ok);
    assert!(stderr.contains("required") || stderr.contains("VIDEO"));
}

#[test]
fn info_on_a_nonexistent_file_fails() {
    let (ok, _, _) = output(slidecap().args(["info", "/nonexistent/lecture.mp4"]));
    assert!(!ok);
}

#[test]
fn extract_on_a_nonexistent_file_fails() {
    let (ok, _, _) = output(slidecap().args(["extract", "/nonexistent/lecture.mp4"]));
    assert!(!ok);
}

#[test]
fn unknown_subcommand_is_rejected() {
    let (ok, _, stderr) = output(slidecap().arg("transcode"));
    assert!(!ok);
    assert!(!stderr.is_empty());
}

#[test]
fn help_lists_the_three_subcommands() {
    let (ok, stdout, _) = output(slidecap().arg("--help"));
    assert!(ok);
    assert!(stdout.contains("extract"));
    assert!(stdout.contains("batch"));
    assert!(stdout.contains("info"));
}

#[test]
fn extract_rejects_an_out_of_range_threshold() {
    // 1.5 is outside the legal SSIM threshold range [0.9, 0.9999] (§6); the
    // pipeline should reject it before ever opening the video.
    let (ok, _, _) = output(slidecap().args([
        "extract",
        "/nonexistent/lecture.mp4",
        "--threshold",
        "1.5",
    ]));
    assert!(!ok);
}

#[test]
fn batch_with_no_videos_reports_zero_of_zero() {
    let (ok, stdout, _) = output(slidecap().arg("batch"));
    assert!(ok);
    assert!(stdout.contains("0/0"));
}

#[test]
fn extract_with_an_on_disk_config_file_still_fails_cleanly_on_a_missing_video() {
    // The config file itself is well-formed; failure should come from the
    // missing video, not from config parsing (§10.3: flags/file merge happens
    // before the video is opened).
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "chunk_size = 250\njpeg_quality = 80").unwrap();

    let (ok, _, _) = output(slidecap().args([
        "extract",
        "/nonexistent/lecture.mp4",
        "--config",
        file.path().to_str().unwrap(),
    ]));
    assert!(!ok);
}
