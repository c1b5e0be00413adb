//! Embedded subtitle stream selection from `ffprobe` output, used by the
//! translator engine when an embedded stream is available.
//!
//! Ported from `ass_utils.py`'s `select_best_subtitle_stream`.

use serde::Deserialize;

use super::language_tags::{is_in, ENGLISH_TAGS, GERMAN_TAGS};

#[derive(Debug, Clone, Deserialize)]
pub struct FfprobeStreams {
    #[serde(default)]
    pub streams: Vec<FfprobeStream>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FfprobeStream {
    pub index: u32,
    pub codec_type: String,
    pub codec_name: String,
    #[serde(default)]
    pub tags: FfprobeStreamTags,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FfprobeStreamTags {
    pub language: Option<String>,
    pub title: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamFormat {
    Ass,
    Srt,
}

#[derive(Debug, Clone)]
pub struct SelectedStream {
    /// Index among subtitle streams only (ffmpeg `-map 0:s:N` addressing).
    pub sub_index: usize,
    pub format: StreamFormat,
    pub language: String,
    pub title: String,
}

/// Priority (ASS preferred over SRT):
/// 1. English ASS with "full" in the title (not signs/songs)
/// 2. First English ASS without "sign"/"song" in the title
/// 3. Any English ASS
/// 4. Non-signs ASS without a German language tag
/// 5. English SRT (fallback)
/// 6. Any SRT without a German language tag
/// 7. Last resort: the first ASS stream at all
pub fn select_best_subtitle_stream(data: &FfprobeStreams) -> Option<SelectedStream> {
    let mut ass_streams = Vec::new();
    let mut srt_streams = Vec::new();
    let mut sub_index = 0usize;

    for stream in &data.streams {
        if stream.codec_type != "subtitle" {
            continue;
        }
        let codec = stream.codec_name.to_lowercase();
        let title = stream.tags.title.clone().unwrap_or_default().to_lowercase();
        let language = stream.tags.language.clone().unwrap_or_default().to_lowercase();

        let info = SelectedStream {
            sub_index,
            format: if codec == "ass" || codec == "ssa" {
                StreamFormat::Ass
            } else {
                StreamFormat::Srt
            },
            language,
            title,
        };

        if codec == "ass" || codec == "ssa" {
            ass_streams.push(info);
        } else if codec == "subrip" || codec == "srt" {
            srt_streams.push(info);
        } else {
            continue;
        }
        sub_index += 1;
    }

    if !ass_streams.is_empty() {
        if let Some(s) = ass_streams
            .iter()
            .find(|s| s.title.contains("full") && !s.title.contains("sign") && !s.title.contains("song"))
        {
            return Some(s.clone());
        }

        let english: Vec<&SelectedStream> = ass_streams
            .iter()
            .filter(|s| is_in(&s.language, ENGLISH_TAGS))
            .collect();

        if let Some(s) = english
            .iter()
            .find(|s| !s.title.contains("sign") && !s.title.contains("song"))
        {
            return Some((*s).clone());
        }
        if let Some(s) = english.first() {
            return Some((*s).clone());
        }

        if let Some(s) = ass_streams.iter().find(|s| {
            !is_in(&s.language, GERMAN_TAGS) && !s.title.contains("sign") && !s.title.contains("song")
        }) {
            return Some(s.clone());
        }
    }

    if !srt_streams.is_empty() {
        if let Some(s) = srt_streams.iter().find(|s| is_in(&s.language, ENGLISH_TAGS)) {
            return Some(s.clone());
        }
        if let Some(s) = srt_streams.iter().find(|s| !is_in(&s.language, GERMAN_TAGS)) {
            return Some(s.clone());
        }
    }

    ass_streams.into_iter().next()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stream(codec: &str, lang: &str, title: &str) -> FfprobeStream {
        FfprobeStream {
            index: 0,
            codec_type: "subtitle".into(),
            codec_name: codec.into(),
            tags: FfprobeStreamTags {
                language: Some(lang.into()),
                title: Some(title.into()),
            },
        }
    }

    #[test]
    fn prefers_full_english_ass_over_signs() {
        let data = FfprobeStreams {
            streams: vec![
                stream("ass", "eng", "Signs"),
                stream("ass", "eng", "Full Subtitles"),
            ],
        };
        let selected = select_best_subtitle_stream(&data).unwrap();
        assert_eq!(selected.format, StreamFormat::Ass);
        assert!(selected.title.contains("full"));
    }

    #[test]
    fn falls_back_to_english_srt_without_ass() {
        let data = FfprobeStreams {
            streams: vec![stream("subrip", "eng", "")],
        };
        let selected = select_best_subtitle_stream(&data).unwrap();
        assert_eq!(selected.format, StreamFormat::Srt);
    }

    #[test]
    fn returns_none_when_no_subtitle_streams() {
        let data = FfprobeStreams { streams: vec![] };
        assert!(select_best_subtitle_stream(&data).is_none());
    }
}
