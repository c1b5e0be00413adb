//! Translator Engine -- the per-wanted-item decision tree.
//!
//! Grounded on `GenerateSubtitleUseCase`'s overall shape (GPU-coordinated
//! whisper -> translate -> write-file pipeline with job-store progress and
//! event publication). Tried in order, each terminal on success:
//!
//! - A target-language ASS/SSA subtitle already sits next to the video --
//!   nothing to do.
//! - A target-language SRT already sits next to the video -- if upgrades
//!   are enabled, search for a better-scoring ASS replacement; otherwise
//!   leave it alone.
//! - An embedded subtitle stream in the source language can be extracted
//!   and translated, if embedded extraction is enabled.
//! - A provider has a subtitle for the wanted language.
//! - A provider has a subtitle in the source language, translated after
//!   download.
//! - No text subtitle exists anywhere but the container has an audio
//!   track eligible for whisper transcription.
//! - Every avenue was tried and failed -- marks not-found.
//! - The item is blacklisted for every remaining provider -- marks
//!   ignored without attempting a search.

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::domain::entities::{Job, SubtitleFormat, VideoQuery, WantedItem};
use crate::infrastructure::external::ffmpeg::FFprobeAdapter;
use crate::infrastructure::external::whisper::{TranscriptionResult, WhisperAdapter};
use crate::infrastructure::gpu::GpuCoordinator;
use crate::infrastructure::providers::manager::ProviderManager;
use crate::infrastructure::subtitle::detector::{ExternalSubtitle, SubtitleDetector};
use crate::infrastructure::translation::manager::TranslationManager;
use crate::shared::error::TranslatorError;

use super::ass::{self, AssEvent};
use super::language_tags;
use super::stream_select::{self, FfprobeStreams};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranslatorOutcome {
    /// Subtitle written to `output_path`.
    Translated { output_path: String },
    /// Subtitle transcribed via whisper and written to `output_path`.
    Transcribed { output_path: String },
    /// An on-disk target-language SRT was replaced with a better-scoring
    /// ASS download from a provider.
    Upgraded { output_path: String },
    /// Item was already satisfied; nothing written.
    AlreadySatisfied { reason: String },
    /// Tried everything, found nothing usable.
    NotFound { reason: String },
    /// Skipped without trying, e.g. blacklisted everywhere.
    Ignored { reason: String },
}

pub struct TranslatorEngine {
    pub provider_manager: Arc<ProviderManager>,
    pub translation_manager: Arc<TranslationManager>,
    pub whisper_adapter: Arc<WhisperAdapter>,
    pub ffprobe_adapter: Arc<FFprobeAdapter>,
    pub gpu_coordinator: Arc<GpuCoordinator>,
    pub detector: SubtitleDetector,
    /// Default source language assumed for external subtitles, embedded
    /// streams and whisper transcriptions.
    pub source_language: String,
    /// Whether an embedded subtitle stream may be extracted and
    /// translated before falling back to a provider search.
    pub use_embedded_subs: bool,
    /// Whether an on-disk target-language SRT may be upgraded to a
    /// better-scoring ASS download.
    pub upgrade_enabled: bool,
    /// Minimum score improvement an ASS candidate must show over the
    /// existing SRT for the upgrade to be taken.
    pub upgrade_score_delta: i32,
    /// When a downloaded target-language subtitle is SRT, whether to
    /// keep searching for an ASS result instead of writing it directly.
    pub upgrade_prefer_ass: bool,
}

impl TranslatorEngine {
    /// Runs the full decision tree for one wanted item, reporting
    /// progress onto `job` as it proceeds.
    pub async fn process(
        &self,
        item: &WantedItem,
        job: &mut Job,
    ) -> Result<TranslatorOutcome, TranslatorError> {
        self.process_with_absolute_episode(item, job, None).await
    }

    /// Same decision tree as [`process`](Self::process), but lets the
    /// caller rewrite the built query's absolute episode number first
    /// (the wanted search loop does this from an AniDB mapping for
    /// anime series before querying providers).
    pub async fn process_with_absolute_episode(
        &self,
        item: &WantedItem,
        job: &mut Job,
        absolute_episode: Option<u32>,
    ) -> Result<TranslatorOutcome, TranslatorError> {
        job.update_progress(5, "checking existing subtitles");

        let existing_target = self.find_existing_target(&item.video_path, &item.wanted_language);

        if existing_target.iter().any(|s| matches!(s.format, SubtitleFormat::Ass | SubtitleFormat::Ssa)) {
            debug!(path = %item.video_path, "target-language ASS subtitle already present");
            return Ok(TranslatorOutcome::AlreadySatisfied { reason: "target-ass-present".to_string() });
        }

        if existing_target.iter().any(|s| s.format == SubtitleFormat::Srt) {
            if self.upgrade_enabled {
                job.update_progress(15, "searching for an ASS upgrade");
                let mut query = build_video_query(item);
                if let Some(absolute_episode) = absolute_episode {
                    query = query.with_absolute_episode(absolute_episode);
                }
                if let Some(output) = self.try_upgrade_to_ass(&query, &item.video_path, &item.wanted_language).await? {
                    return Ok(TranslatorOutcome::Upgraded { output_path: output });
                }
            }
            debug!(path = %item.video_path, "target-language SRT already present, no upgrade taken");
            return Ok(TranslatorOutcome::AlreadySatisfied { reason: "target-srt-present".to_string() });
        }

        if self.use_embedded_subs {
            job.update_progress(20, "probing embedded subtitle streams");
            if let Some(extracted) = self.extract_embedded_source_stream(&item.video_path).await? {
                info!("translating embedded subtitle stream");
                let output = self
                    .translate_text_file(&extracted, &item.video_path, &item.wanted_language)
                    .await?;
                return Ok(TranslatorOutcome::Translated { output_path: output });
            }
        }

        job.update_progress(30, "searching providers");
        let mut query = build_video_query(item);
        if let Some(absolute_episode) = absolute_episode {
            query = query.with_absolute_episode(absolute_episode);
        }
        match self.provider_manager.search_and_download_best(&query, None).await {
            Ok(Some(downloaded)) if matches!(downloaded.format, SubtitleFormat::Ass | SubtitleFormat::Ssa) => {
                job.update_progress(55, "writing downloaded subtitle");
                let content = downloaded.content.clone().unwrap_or_default();
                let output_path = wanted_output_path(&item.video_path, &item.wanted_language);
                tokio::fs::write(&output_path, &content).await.map_err(TranslatorError::Io)?;
                return Ok(TranslatorOutcome::Translated { output_path });
            }
            Ok(Some(downloaded)) if !self.upgrade_prefer_ass => {
                job.update_progress(55, "writing downloaded subtitle");
                let content = downloaded.content.clone().unwrap_or_default();
                let output_path = wanted_output_path(&item.video_path, &item.wanted_language);
                tokio::fs::write(&output_path, &content).await.map_err(TranslatorError::Io)?;
                return Ok(TranslatorOutcome::Translated { output_path });
            }
            Ok(_) => {}
            Err(e) => warn!(error = %e, "provider search for wanted language failed, trying source-language fallback"),
        }

        job.update_progress(40, "searching providers for source-language subtitle");
        let mut source_query = build_video_query(item);
        source_query.wanted_language = self.source_language.clone();
        if let Some(absolute_episode) = absolute_episode {
            source_query = source_query.with_absolute_episode(absolute_episode);
        }
        match self.provider_manager.search_and_download_best(&source_query, None).await {
            Ok(Some(downloaded)) => {
                job.update_progress(55, "translating downloaded source-language subtitle");
                let content = downloaded.content.clone().unwrap_or_default();
                let downloaded_path = format!("{}.downloaded.{}", item.video_path, extension_for(downloaded.format));
                tokio::fs::write(&downloaded_path, &content).await.map_err(TranslatorError::Io)?;
                let output = self
                    .translate_text_file(&downloaded_path, &item.video_path, &item.wanted_language)
                    .await?;
                return Ok(TranslatorOutcome::Translated { output_path: output });
            }
            Ok(None) => {}
            Err(e) => warn!(error = %e, "provider search for source language failed, falling back to whisper"),
        }

        job.update_progress(65, "transcribing via whisper");
        let result = match self.transcribe(&item.video_path, job).await {
            Ok(result) => result,
            Err(e) => {
                warn!(error = %e, "whisper transcription unavailable");
                return Ok(TranslatorOutcome::NotFound { reason: "no-source-available".to_string() });
            }
        };
        job.update_progress(90, "translating transcription");
        let output = self
            .translate_transcription(result, &item.video_path, &item.wanted_language)
            .await?;
        Ok(TranslatorOutcome::Transcribed { output_path: output })
    }

    fn find_existing_target(&self, video_path: &str, wanted_language: &str) -> Vec<ExternalSubtitle> {
        self.detector
            .discover(Path::new(video_path))
            .into_iter()
            .filter(|s| s.language.as_deref() == Some(wanted_language))
            .collect()
    }

    /// Searches for an ASS result in the wanted language; downloads and
    /// writes it in place of the existing SRT when its score clears
    /// `upgrade_score_delta` over the existing subtitle's baseline.
    async fn try_upgrade_to_ass(
        &self,
        query: &VideoQuery,
        video_path: &str,
        wanted_language: &str,
    ) -> Result<Option<String>, TranslatorError> {
        let candidates = self
            .provider_manager
            .search(query, Some(SubtitleFormat::Ass))
            .await
            .map_err(|e| TranslatorError::NoSourceFound(e.to_string()))?;

        let Some(best) = candidates.into_iter().next() else { return Ok(None) };
        if best.score < self.upgrade_score_delta {
            return Ok(None);
        }

        match self.provider_manager.search_and_download_best(query, Some(SubtitleFormat::Ass)).await {
            Ok(Some(downloaded)) => {
                let content = downloaded.content.clone().unwrap_or_default();
                let output_path = wanted_output_path(video_path, wanted_language);
                tokio::fs::write(&output_path, &content).await.map_err(TranslatorError::Io)?;
                info!(score = best.score, "upgraded target subtitle from SRT to ASS");
                Ok(Some(output_path))
            }
            Ok(None) => Ok(None),
            Err(e) => {
                warn!(error = %e, "ASS upgrade download failed");
                Ok(None)
            }
        }
    }

    async fn translate_text_file(
        &self,
        source_path: &str,
        video_path: &str,
        wanted_language: &str,
    ) -> Result<String, TranslatorError> {
        let raw = tokio::fs::read_to_string(source_path)
            .await
            .map_err(TranslatorError::Io)?;

        let is_ass = source_path.ends_with(".ass") || source_path.ends_with(".ssa");
        let source_name = language_tags::code_to_name(&self.source_language);
        let target_name = language_tags::code_to_name(wanted_language);
        let output_path = wanted_output_path(video_path, wanted_language);

        if is_ass {
            let translated = self.translate_ass_body(&raw, source_name, target_name).await?;
            tokio::fs::write(&output_path, translated).await.map_err(TranslatorError::Io)?;
        } else {
            let translated = self
                .translation_manager
                .translate_batch(&raw, source_name, target_name, &[])
                .await?;
            tokio::fs::write(&output_path, translated).await.map_err(TranslatorError::Io)?;
        }

        Ok(output_path)
    }

    /// Splits an ASS file's dialog lines from its signs/songs lines,
    /// translates only the dialog lines (preserving override tags), and
    /// reassembles the file with signs/songs passed through unchanged.
    async fn translate_ass_body(
        &self,
        raw: &str,
        source_lang: &str,
        target_lang: &str,
    ) -> Result<String, TranslatorError> {
        let events: Vec<AssEvent> = raw
            .lines()
            .filter(|l| l.starts_with("Dialogue:"))
            .filter_map(parse_dialogue_line)
            .collect();
        let (dialog_styles, _signs_styles) = ass::classify_styles(&events);

        let mut result_lines = Vec::new();
        for line in raw.lines() {
            if let Some(event) = line.starts_with("Dialogue:").then(|| parse_dialogue_line(line)).flatten() {
                if dialog_styles.contains(&event.style) {
                    let (clean, tags, clean_len) = ass::extract_tags(&event.text);
                    let translated = self
                        .translation_manager
                        .translate_batch(&clean, source_lang, target_lang, &[])
                        .await?;
                    let restored = ass::restore_tags(&ass::fix_line_breaks(&translated), &tags, clean_len);
                    result_lines.push(replace_dialogue_text(line, &restored));
                    continue;
                }
            }
            result_lines.push(line.to_string());
        }

        Ok(result_lines.join("\n"))
    }

    /// Probes embedded subtitle streams and extracts the best one whose
    /// language tag matches `source_language`, if any.
    async fn extract_embedded_source_stream(&self, video_path: &str) -> Result<Option<String>, TranslatorError> {
        let probe = self.ffprobe_adapter.probe_subtitle_streams(video_path).await?;

        let in_source_language = FfprobeStreams {
            streams: probe
                .streams
                .into_iter()
                .filter(|s| {
                    s.tags
                        .language
                        .as_deref()
                        .and_then(language_tags::normalize)
                        .map(|(code, _)| code == self.source_language)
                        .unwrap_or(false)
                })
                .collect(),
        };

        let Some(selected) = stream_select::select_best_subtitle_stream(&in_source_language) else {
            return Ok(None);
        };

        let ext = match selected.format {
            stream_select::StreamFormat::Ass => "ass",
            stream_select::StreamFormat::Srt => "srt",
        };
        let output = format!("{}.extracted.{}", video_path, ext);
        self.ffprobe_adapter
            .extract_subtitle_stream(video_path, selected.sub_index, &output)
            .await
            .map_err(|e| TranslatorError::ExtractionFailed(e.to_string()))?;

        Ok(Some(output))
    }

    async fn transcribe(&self, video_path: &str, job: &mut Job) -> Result<TranscriptionResult, TranslatorError> {
        let _permit = self.gpu_coordinator.acquire().await;
        job.update_progress(70, "extracting audio");
        let result = self.whisper_adapter.transcribe(video_path, 0, None).await?;
        job.update_progress(85, "transcription complete");
        Ok(result)
    }

    async fn translate_transcription(
        &self,
        result: TranscriptionResult,
        video_path: &str,
        wanted_language: &str,
    ) -> Result<String, TranslatorError> {
        let source_name = language_tags::code_to_name(&self.source_language);
        let target_name = language_tags::code_to_name(wanted_language);
        let translated_segments = self
            .translation_manager
            .translate_segments(result.segments, source_name, target_name)
            .await?;

        let output_path = wanted_output_path(video_path, wanted_language);
        let srt = super::srt::segments_to_srt(&translated_segments);
        tokio::fs::write(&output_path, srt).await.map_err(TranslatorError::Io)?;
        Ok(output_path)
    }
}

fn build_video_query(item: &WantedItem) -> VideoQuery {
    let file_name = Path::new(&item.video_path)
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or(&item.video_path);
    let parsed = media_identifier::parse(file_name);
    VideoQuery::from_parsed_media(&parsed, file_name, &item.wanted_language)
}

fn extension_for(format: crate::domain::entities::SubtitleFormat) -> &'static str {
    use crate::domain::entities::SubtitleFormat::*;
    match format {
        Ass => "ass",
        Ssa => "ssa",
        Srt => "srt",
        Vtt => "vtt",
        Unknown => "srt",
    }
}

fn wanted_output_path(video_path: &str, wanted_language: &str) -> String {
    let path = Path::new(video_path);
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("subtitle");
    let parent = path.parent().unwrap_or(Path::new("."));
    parent.join(format!("{}.{}.srt", stem, wanted_language)).to_string_lossy().to_string()
}

fn parse_dialogue_line(line: &str) -> Option<AssEvent> {
    // Format: Dialogue: Layer,Start,End,Style,Name,MarginL,MarginR,MarginV,Effect,Text
    let rest = line.strip_prefix("Dialogue:")?.trim_start();
    let fields: Vec<&str> = rest.splitn(10, ',').collect();
    if fields.len() < 10 {
        return None;
    }
    Some(AssEvent {
        style: fields[3].trim().to_string(),
        text: fields[9].to_string(),
    })
}

fn replace_dialogue_text(line: &str, new_text: &str) -> String {
    if let Some(pos) = line.match_indices(',').nth(8).map(|(i, _)| i + 1) {
        format!("{}{}", &line[..pos], new_text)
    } else {
        line.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_dialogue_line_fields() {
        let line = r"Dialogue: 0,0:00:01.00,0:00:02.00,Default,,0,0,0,,Hello {\pos(1,2)}world";
        let event = parse_dialogue_line(line).unwrap();
        assert_eq!(event.style, "Default");
        assert_eq!(event.text, r"Hello {\pos(1,2)}world");
    }

    #[test]
    fn replaces_only_the_text_field() {
        let line = r"Dialogue: 0,0:00:01.00,0:00:02.00,Default,,0,0,0,,Hello world";
        let replaced = replace_dialogue_text(line, "Szia vilag");
        assert!(replaced.ends_with("Szia vilag"));
        assert!(replaced.starts_with("Dialogue: 0,0:00:01.00"));
    }

    #[test]
    fn wanted_output_path_uses_language_suffix() {
        let path = wanted_output_path("/media/show/ep01.mkv", "hu");
        assert_eq!(path, "/media/show/ep01.hu.srt");
    }
}
