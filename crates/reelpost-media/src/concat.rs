//! Multi-clip concatenation.
//!
//! Clips whose probes are fully compatible are spliced with the concat demuxer
//! and stream copy. Anything else is decoded and re-encoded through the concat
//! filter. When any clip lacks audio, all clip audio is dropped and a single
//! generated near-silent track covers the whole output.

use std::path::{Path, PathBuf};

use futures::future::try_join_all;
use reelpost_models::encoding::{
    AUDIO_CODEC, NARRATION_BITRATE, PIXEL_FORMAT, SILENT_BITRATE, SILENT_SOURCE, SILENT_VOLUME,
    VIDEO_BITRATE, VIDEO_CODEC, VIDEO_PRESET, VIDEO_PROFILE,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::assembler::VideoAssembler;
use crate::command::FfmpegCommand;
use crate::compat::{classify, CompatibilityVerdict};
use crate::error::{MediaError, MediaResult};
use crate::probe::MediaProbe;

/// How the clips are joined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    /// Container-level splice, no decoding
    StreamCopy,
    /// Decode and encode everything again
    ReEncode,
}

impl Strategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::StreamCopy => "stream-copy",
            Strategy::ReEncode => "re-encode",
        }
    }
}

/// One concatenation request and the strategy chosen for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssemblyJob {
    pub inputs: Vec<PathBuf>,
    pub output: PathBuf,
    pub strategy: Strategy,
}

/// Pick stream copy only when the verdict proves it safe.
pub fn choose_strategy(verdict: &CompatibilityVerdict) -> Strategy {
    if verdict.is_compatible() {
        Strategy::StreamCopy
    } else {
        Strategy::ReEncode
    }
}

/// Concat demuxer list, one `file '...'` line per input.
pub fn concat_list(inputs: &[PathBuf]) -> String {
    inputs
        .iter()
        .map(|p| format!("file '{}'\n", p.to_string_lossy().replace('\'', "'\\''")))
        .collect()
}

/// Stream copy through the concat demuxer.
pub fn build_stream_copy_command(list_path: &Path, output: &Path) -> FfmpegCommand {
    FfmpegCommand::new(output)
        .input_with(["-f", "concat", "-safe", "0"], list_path)
        .codec_copy()
        .fast_start()
}

/// Concat filter graph over all inputs.
///
/// Every clip is normalized to the first clip's geometry and frame rate
/// before joining, since the concat filter rejects mismatched frames.
pub fn reencode_filter_graph(
    probes: &[MediaProbe],
    fallback_fps: u32,
) -> MediaResult<(String, bool)> {
    let (reference, _) = probes
        .split_first()
        .ok_or_else(|| MediaError::invalid_input("cannot build a filter graph without inputs"))?;
    let with_audio = probes.iter().all(|p| p.has_audio);
    let fps = reference
        .frame_rate
        .map(|r| format!("{:.3}", r))
        .unwrap_or_else(|| fallback_fps.to_string());

    let video_norm = match (reference.width, reference.height) {
        (Some(w), Some(h)) => format!(
            "scale={w}:{h}:force_original_aspect_ratio=decrease,pad={w}:{h}:(ow-iw)/2:(oh-ih)/2:color=black,setsar=1,fps={fps},format={PIXEL_FORMAT}"
        ),
        _ => format!("setsar=1,fps={fps},format={PIXEL_FORMAT}"),
    };

    let mut chains = Vec::new();
    let mut concat_inputs = String::new();
    for i in 0..probes.len() {
        chains.push(format!("[{i}:v:0]{video_norm}[v{i}]"));
        concat_inputs.push_str(&format!("[v{i}]"));
        if with_audio {
            chains.push(format!(
                "[{i}:a:0]aresample=48000,aformat=channel_layouts=stereo[a{i}]"
            ));
            concat_inputs.push_str(&format!("[a{i}]"));
        }
    }

    let n = probes.len();
    if with_audio {
        chains.push(format!("{concat_inputs}concat=n={n}:v=1:a=1[outv][outa]"));
    } else {
        chains.push(format!("{concat_inputs}concat=n={n}:v=1:a=0[outv]"));
        // The silent source is the input right after the clips.
        chains.push(format!("[{n}:a:0]volume={SILENT_VOLUME}[outa]"));
    }

    Ok((chains.join(";"), with_audio))
}

/// Re-encode through the concat filter with the standard visual profile.
pub fn build_reencode_command(
    inputs: &[PathBuf],
    probes: &[MediaProbe],
    output: &Path,
    fallback_fps: u32,
) -> MediaResult<FfmpegCommand> {
    let (graph, with_audio) = reencode_filter_graph(probes, fallback_fps)?;

    let mut cmd = inputs
        .iter()
        .fold(FfmpegCommand::new(output), |cmd, input| cmd.input(input));
    if !with_audio {
        cmd = cmd.lavfi(SILENT_SOURCE);
    }

    let cmd = cmd
        .filter_complex(graph)
        .map("[outv]")
        .map("[outa]")
        .video_codec(VIDEO_CODEC)
        .preset(VIDEO_PRESET)
        .profile(VIDEO_PROFILE)
        .pixel_format(PIXEL_FORMAT)
        .video_bitrate(VIDEO_BITRATE)
        .audio_codec(AUDIO_CODEC);

    let cmd = if with_audio {
        cmd.audio_bitrate(NARRATION_BITRATE)
    } else {
        // The generated source is endless; stop with the video.
        cmd.audio_bitrate(SILENT_BITRATE).shortest()
    };

    Ok(cmd.fast_start())
}

/// Plan a concatenation without touching the filesystem.
///
/// `list_path` is where the concat list will live if stream copy is chosen.
pub fn plan_concat(
    inputs: &[PathBuf],
    probes: &[MediaProbe],
    output: &Path,
    list_path: &Path,
    fallback_fps: u32,
) -> MediaResult<(AssemblyJob, FfmpegCommand)> {
    if inputs.len() < 2 {
        return Err(MediaError::invalid_input(format!(
            "combine needs at least two input files, got {}",
            inputs.len()
        )));
    }
    if probes.len() != inputs.len() {
        return Err(MediaError::invalid_input(format!(
            "expected {} probes, got {}",
            inputs.len(),
            probes.len()
        )));
    }

    let verdict = classify(probes)?;
    let strategy = choose_strategy(&verdict);
    debug!(?verdict, strategy = strategy.as_str(), "Concat plan");

    let cmd = match strategy {
        Strategy::StreamCopy => build_stream_copy_command(list_path, output),
        Strategy::ReEncode => build_reencode_command(inputs, probes, output, fallback_fps)?,
    };

    Ok((
        AssemblyJob {
            inputs: inputs.to_vec(),
            output: output.to_path_buf(),
            strategy,
        },
        cmd,
    ))
}

impl VideoAssembler {
    /// Join two or more clips into one video.
    ///
    /// Fails with [`MediaError::InvalidInput`] for fewer than two inputs,
    /// before any probing. Writes to `output` or to a fresh file in the
    /// working directory.
    pub async fn combine(&self, inputs: &[PathBuf], output: Option<&Path>) -> MediaResult<AssemblyJob> {
        if inputs.len() < 2 {
            return Err(MediaError::invalid_input(format!(
                "combine needs at least two input files, got {}",
                inputs.len()
            )));
        }

        self.work_dir.reset().await?;
        let output = match output {
            Some(path) => path.to_path_buf(),
            None => self.work_dir.file("combined", "mp4"),
        };
        let list_path = self.work_dir.file("concat", "txt");

        // Probes are independent and read-only: issue them all at once.
        let probes = try_join_all(inputs.iter().map(|p| self.inspector.probe(p))).await?;
        let (job, cmd) = plan_concat(inputs, &probes, &output, &list_path, self.settings.fps)?;

        info!(
            inputs = inputs.len(),
            strategy = job.strategy.as_str(),
            "Combining videos"
        );

        if job.strategy == Strategy::StreamCopy {
            let mut absolute = Vec::with_capacity(inputs.len());
            for input in inputs {
                absolute.push(tokio::fs::canonicalize(input).await?);
            }
            tokio::fs::write(&list_path, concat_list(&absolute)).await?;
        }

        self.runner.run(&cmd).await?;

        metrics::counter!("reelpost_combines_total", "strategy" => job.strategy.as_str())
            .increment(1);
        info!(
            "Combined video ready ({}): {}",
            job.strategy.as_str(),
            job.output.display()
        );

        Ok(job)
    }
}
