//! Image to reel rendering.
//!
//! A still poster is letterboxed onto a black vertical canvas and given a slow
//! centered zoom. Every reel carries an audio stream: the narration when one
//! is supplied, otherwise a near-silent generated track, because the platform
//! rejects or flags video-only uploads.

use std::path::{Path, PathBuf};

use reelpost_models::encoding::{
    AUDIO_CODEC, NARRATION_BITRATE, PIXEL_FORMAT, SILENT_BITRATE, SILENT_SOURCE, SILENT_VOLUME,
    VIDEO_BITRATE, VIDEO_CODEC, VIDEO_PRESET, VIDEO_PROFILE, ZOOM_MAX, ZOOM_STEP,
};
use reelpost_models::ReelSettings;
use tracing::info;

use crate::assembler::VideoAssembler;
use crate::command::FfmpegCommand;
use crate::error::MediaResult;

/// Video filter chain: fit inside the margin box, letterbox, zoom, 4:2:0.
pub fn reel_filter_chain(settings: &ReelSettings) -> String {
    let (box_w, box_h) = settings.inner_box();
    let (w, h) = (settings.width, settings.height);
    let size = settings.frame_size();

    [
        format!(
            "scale={}:{}:force_original_aspect_ratio=decrease",
            box_w, box_h
        ),
        format!("pad={}:{}:(ow-iw)/2:(oh-ih)/2:color=black", w, h),
        format!(
            "zoompan=z='min(zoom+{},{})':d=1:x='iw/2-(iw/zoom/2)':y='ih/2-(ih/zoom/2)':s={}:fps={}",
            ZOOM_STEP, ZOOM_MAX, size, settings.fps
        ),
        format!("format={}", PIXEL_FORMAT),
    ]
    .join(",")
}

/// Build the FFmpeg command for one reel.
///
/// Input 0 is the looped image, input 1 is the narration or the silent source.
/// The image is read at the output frame rate: zoompan emits one frame per
/// input frame, so any other rate would shorten or stretch the video track.
pub fn build_reel_command(
    image: &Path,
    narration: Option<&Path>,
    output: &Path,
    settings: &ReelSettings,
) -> FfmpegCommand {
    let duration = f64::from(settings.duration_secs);

    let cmd = FfmpegCommand::new(output).input_with(
        [
            "-loop".to_string(),
            "1".to_string(),
            "-framerate".to_string(),
            settings.fps.to_string(),
            "-t".to_string(),
            format!("{:.3}", duration),
        ],
        image,
    );

    let cmd = match narration {
        Some(audio) => cmd.input(audio),
        None => cmd.lavfi(SILENT_SOURCE),
    };

    let cmd = cmd
        .map("0:v:0")
        .map("1:a:0")
        .video_filter(reel_filter_chain(settings))
        .frame_rate(settings.fps)
        .video_codec(VIDEO_CODEC)
        .preset(VIDEO_PRESET)
        .profile(VIDEO_PROFILE)
        .pixel_format(PIXEL_FORMAT)
        .video_bitrate(VIDEO_BITRATE)
        .audio_codec(AUDIO_CODEC);

    let cmd = match narration {
        Some(_) => cmd.audio_bitrate(NARRATION_BITRATE),
        None => cmd
            .audio_filter(format!("volume={}", SILENT_VOLUME))
            .audio_bitrate(SILENT_BITRATE),
    };

    cmd.duration(duration).fast_start()
}

impl VideoAssembler {
    /// Render a reel from poster bytes and optional narration audio.
    ///
    /// Empty narration is treated as absent. Returns the path of the new
    /// video inside the working directory.
    pub async fn make_reel(&self, image: &[u8], narration: Option<&[u8]>) -> MediaResult<PathBuf> {
        info!("Making reel from image ({} bytes)", image.len());

        self.work_dir.reset().await?;

        let image_path = self.work_dir.write("img", "png", image).await?;
        let narration_path = match narration.filter(|bytes| !bytes.is_empty()) {
            Some(bytes) => Some(self.work_dir.write("vox", "mp3", bytes).await?),
            None => None,
        };
        let output = self.work_dir.file("reel", "mp4");

        let cmd = build_reel_command(
            &image_path,
            narration_path.as_deref(),
            &output,
            &self.settings,
        );
        self.runner.run(&cmd).await?;

        metrics::counter!(
            "reelpost_reels_rendered_total",
            "audio" => if narration_path.is_some() { "narration" } else { "silent" }
        )
        .increment(1);

        info!("Reel video ready at: {}", output.display());
        Ok(output)
    }
}
