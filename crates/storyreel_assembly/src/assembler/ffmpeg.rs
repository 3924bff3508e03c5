//! Video assembler rendering with ffmpeg.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;

use async_trait::async_trait;
use storyreel_core::{Artifact, ProjectId, Segment, SegmentMedia};
use storyreel_error::{PipelineError, PipelineErrorKind, PipelineResult};
use storyreel_interface::Assembler;
use storyreel_storage::{MediaMetadata, MediaStorage, MediaType};
use tokio::process::Command;
use tracing::{debug, info, instrument};

use crate::{AssemblyConfig, validate_assembly_input};

const BACKEND: &str = "ffmpeg";
const SAMPLE_RATE: u32 = 44_100;

#[track_caller]
fn assembly_failed(message: impl Into<String>) -> PipelineError {
    PipelineError::new(PipelineErrorKind::AssemblyFailed(message.into()))
}

/// SubRip captions placing each segment's text over its clip.
fn srt_captions(media: &[SegmentMedia]) -> String {
    let mut srt = String::new();
    let mut start = 0.0;
    for (number, segment) in media.iter().enumerate() {
        let end = start + segment.duration_seconds;
        srt.push_str(&format!(
            "{}\n{} --> {}\n{}\n\n",
            number + 1,
            srt_timestamp(start),
            srt_timestamp(end),
            segment.content
        ));
        start = end;
    }
    srt
}

fn srt_timestamp(seconds: f64) -> String {
    let millis = (seconds * 1000.0).round() as u64;
    format!(
        "{:02}:{:02}:{:02},{:03}",
        millis / 3_600_000,
        (millis / 60_000) % 60,
        (millis / 1000) % 60,
        millis % 1000
    )
}

/// Argument list for one ffmpeg invocation.
#[derive(Debug, Clone, Default)]
struct FfmpegCommand {
    inputs: Vec<String>,
    output_args: Vec<String>,
}

impl FfmpegCommand {
    /// Add an input with the arguments that precede its `-i`.
    fn input<I, S>(mut self, pre_args: I, input: &Path) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.inputs.extend(pre_args.into_iter().map(Into::into));
        self.inputs.push("-i".to_string());
        self.inputs.push(input.to_string_lossy().to_string());
        self
    }

    /// Add a lavfi source as input.
    fn lavfi(mut self, source: impl Into<String>) -> Self {
        self.inputs
            .extend(["-f".to_string(), "lavfi".to_string(), "-i".to_string()]);
        self.inputs.push(source.into());
        self
    }

    fn output_arg(mut self, arg: impl Into<String>) -> Self {
        self.output_args.push(arg.into());
        self
    }

    fn build_args(&self, output: &Path) -> Vec<String> {
        let mut args = vec!["-y".to_string(), "-v".to_string(), "error".to_string()];
        args.extend(self.inputs.iter().cloned());
        args.extend(self.output_args.iter().cloned());
        args.push(output.to_string_lossy().to_string());
        args
    }
}

/// Renders segments into one MP4.
///
/// Each segment becomes a still-image clip of its estimated duration with its
/// narration track (or silence). Clips fade in from and out to the adjacent
/// clip, then the concat demuxer joins them, adding a caption track when
/// subtitles are enabled. All intermediate files live in a
/// temporary directory; only the finished video is stored.
#[derive(Clone)]
pub struct FfmpegAssembler {
    config: AssemblyConfig,
    storage: Arc<dyn MediaStorage>,
}

impl FfmpegAssembler {
    /// Create an ffmpeg assembler writing to `storage`.
    pub fn new(config: AssemblyConfig, storage: Arc<dyn MediaStorage>) -> Self {
        Self { config, storage }
    }

    /// Locate the ffmpeg binary.
    ///
    /// # Errors
    ///
    /// `AssemblyFailed` when no binary is configured or found on `PATH`.
    pub fn ffmpeg_binary(&self) -> PipelineResult<PathBuf> {
        match &self.config.ffmpeg_path {
            Some(path) if path.exists() => Ok(path.clone()),
            Some(path) => Err(assembly_failed(format!(
                "configured ffmpeg not found at {}",
                path.display()
            ))),
            None => which::which("ffmpeg")
                .map_err(|e| assembly_failed(format!("ffmpeg not found on PATH: {}", e))),
        }
    }

    async fn fetch(&self, media: &storyreel_core::MediaRef, dest: &Path) -> PipelineResult<()> {
        let bytes = self
            .storage
            .retrieve(media)
            .await
            .map_err(|e| assembly_failed(format!("fetching {}: {}", media, e)))?;
        tokio::fs::write(dest, bytes)
            .await
            .map_err(|e| assembly_failed(format!("writing {}: {}", dest.display(), e)))
    }

    fn clip_command(
        &self,
        segment: &SegmentMedia,
        visual: &Path,
        narration: Option<&Path>,
        is_first: bool,
        is_last: bool,
    ) -> FfmpegCommand {
        let (width, height) = self.config.quality.resolution();
        let duration = segment.duration_seconds;
        let fade = self.config.transition_seconds.min(duration / 2.0);

        let mut filter = format!(
            "scale={w}:{h}:force_original_aspect_ratio=decrease,pad={w}:{h}:(ow-iw)/2:(oh-ih)/2,format=yuv420p",
            w = width,
            h = height
        );
        if fade > 0.0 && !is_first {
            filter.push_str(&format!(",fade=t=in:st=0:d={:.3}", fade));
        }
        if fade > 0.0 && !is_last {
            filter.push_str(&format!(
                ",fade=t=out:st={:.3}:d={:.3}",
                duration - fade,
                fade
            ));
        }

        let command = FfmpegCommand::default().input(["-loop", "1"], visual);
        let command = match narration {
            Some(audio) => command.input(Vec::<String>::new(), audio),
            None => command.lavfi(format!(
                "anullsrc=r={}:cl=stereo",
                SAMPLE_RATE
            )),
        };

        command
            .output_arg("-map")
            .output_arg("0:v")
            .output_arg("-map")
            .output_arg("1:a")
            .output_arg("-vf")
            .output_arg(filter)
            .output_arg("-af")
            .output_arg("apad")
            .output_arg("-t")
            .output_arg(format!("{:.3}", duration))
            .output_arg("-r")
            .output_arg("25")
            .output_arg("-c:v")
            .output_arg("libx264")
            .output_arg("-crf")
            .output_arg(self.config.quality.crf().to_string())
            .output_arg("-c:a")
            .output_arg("aac")
            .output_arg("-ar")
            .output_arg(SAMPLE_RATE.to_string())
    }

    async fn run(binary: &Path, args: Vec<String>) -> PipelineResult<()> {
        debug!(args = ?args, "Running ffmpeg");
        let output = Command::new(binary)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| assembly_failed(format!("spawning ffmpeg: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(assembly_failed(format!(
                "ffmpeg exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }
        Ok(())
    }

    async fn render(&self, media: &[SegmentMedia], work_dir: &Path) -> PipelineResult<Vec<u8>> {
        let binary = self.ffmpeg_binary()?;
        let mut list = String::new();
        let last = media.len().saturating_sub(1);

        for (position, segment) in media.iter().enumerate() {
            let visual = work_dir.join(format!("visual_{}", segment.sequence_index));
            self.fetch(&segment.media_ref, &visual).await?;

            let narration = match &segment.narration_ref {
                Some(reference) => {
                    let path = work_dir.join(format!("narration_{}", segment.sequence_index));
                    self.fetch(reference, &path).await?;
                    Some(path)
                }
                None => None,
            };

            let clip = work_dir.join(format!("clip_{}.mp4", segment.sequence_index));
            let command = self.clip_command(
                segment,
                &visual,
                narration.as_deref(),
                position == 0,
                position == last,
            );
            Self::run(&binary, command.build_args(&clip)).await?;
            list.push_str(&format!("file '{}'\n", clip.display()));
        }

        let list_path = work_dir.join("clips.txt");
        tokio::fs::write(&list_path, list)
            .await
            .map_err(|e| assembly_failed(format!("writing concat list: {}", e)))?;

        let output = work_dir.join("final.mp4");
        let mut concat =
            FfmpegCommand::default().input(["-f", "concat", "-safe", "0"], &list_path);
        if self.config.subtitles_enabled {
            let subtitles = work_dir.join("captions.srt");
            tokio::fs::write(&subtitles, srt_captions(media))
                .await
                .map_err(|e| assembly_failed(format!("writing captions: {}", e)))?;
            concat = concat
                .input(Vec::<String>::new(), &subtitles)
                .output_arg("-map")
                .output_arg("0")
                .output_arg("-map")
                .output_arg("1")
                .output_arg("-c:s")
                .output_arg("mov_text");
        }
        let concat = concat
            .output_arg("-c:v")
            .output_arg("copy")
            .output_arg("-c:a")
            .output_arg("copy")
            .output_arg("-movflags")
            .output_arg("+faststart");
        Self::run(&binary, concat.build_args(&output)).await?;

        tokio::fs::read(&output)
            .await
            .map_err(|e| assembly_failed(format!("reading rendered video: {}", e)))
    }
}

#[async_trait]
impl Assembler for FfmpegAssembler {
    #[instrument(skip(self, segments), fields(segments = segments.len(), quality = %self.config.quality))]
    async fn assemble(
        &self,
        project_id: ProjectId,
        segments: &[Segment],
    ) -> PipelineResult<Artifact> {
        let media = validate_assembly_input(segments)?;

        let work_dir = tempfile::tempdir()
            .map_err(|e| assembly_failed(format!("creating work directory: {}", e)))?;
        let video = self.render(&media, work_dir.path()).await?;

        let reference = self
            .storage
            .store(&video, &MediaMetadata::new(MediaType::Video, "video/mp4"))
            .await
            .map_err(|e| assembly_failed(format!("storing video: {}", e)))?;

        let artifact = Artifact::new(reference, project_id, BACKEND, &media);
        info!(
            %project_id,
            reference = %artifact.reference(),
            total_duration_seconds = artifact.total_duration_seconds(),
            "Rendered video"
        );
        Ok(artifact)
    }

    fn backend_name(&self) -> &'static str {
        BACKEND
    }
}
