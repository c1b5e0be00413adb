//! Language tag normalization.
//!
//! Ties together the teacher's `SubtitleDetector::detect_language` table
//! and the translation backend's code/name maps into one canonical
//! lookup: any ISO 639-1, 639-2/B, 639-2/T or display-name spelling of a
//! language resolves to the same `(code, display_name)` pair.

/// (aliases, canonical ISO 639-1 code, display name)
const LANGUAGES: &[(&[&str], &str, &str)] = &[
    (&["en", "eng", "enm", "english"], "en", "English"),
    (&["hu", "hun", "hungarian", "magyar"], "hu", "Hungarian"),
    (&["de", "deu", "ger", "german", "deutsch"], "de", "German"),
    (&["es", "spa", "spanish", "español"], "es", "Spanish"),
    (&["fr", "fra", "fre", "french", "français"], "fr", "French"),
    (&["it", "ita", "italian", "italiano"], "it", "Italian"),
    (&["pt", "por", "portuguese", "português"], "pt", "Portuguese"),
    (&["ru", "rus", "russian", "русский"], "ru", "Russian"),
    (&["ja", "jpn", "japanese", "日本語"], "ja", "Japanese"),
    (&["ko", "kor", "korean", "한국어"], "ko", "Korean"),
    (&["zh", "zho", "chi", "chinese", "中文"], "zh", "Chinese"),
    (&["pl", "pol", "polish", "polski"], "pl", "Polish"),
    (&["nl", "nld", "dut", "dutch", "nederlands"], "nl", "Dutch"),
    (&["sv", "swe", "swedish", "svenska"], "sv", "Swedish"),
    (&["cs", "ces", "cze", "czech", "čeština"], "cs", "Czech"),
    (&["ro", "ron", "rum", "romanian", "română"], "ro", "Romanian"),
];

/// Resolve an arbitrary language tag spelling to `(canonical_code, display_name)`.
pub fn normalize(tag: &str) -> Option<(&'static str, &'static str)> {
    let needle = tag.trim().to_lowercase();
    LANGUAGES
        .iter()
        .find(|(aliases, _, _)| aliases.iter().any(|a| *a == needle))
        .map(|(_, code, name)| (*code, *name))
}

pub fn code_to_name(code: &str) -> &str {
    normalize(code).map(|(_, name)| name).unwrap_or(code)
}

pub fn name_to_code(name: &str) -> &str {
    normalize(name).map(|(code, _)| code).unwrap_or(name)
}

pub const GERMAN_TAGS: &[&str] = &["ger", "deu", "de", "german"];
pub const ENGLISH_TAGS: &[&str] = &["eng", "enm", "en", "english"];

pub fn is_in(tag: &str, set: &[&str]) -> bool {
    let lower = tag.to_lowercase();
    set.contains(&lower.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_iso_variants() {
        assert_eq!(normalize("deu"), Some(("de", "German")));
        assert_eq!(normalize("GER"), Some(("de", "German")));
        assert_eq!(normalize("German"), Some(("de", "German")));
    }

    #[test]
    fn code_and_name_round_trip() {
        assert_eq!(code_to_name("hu"), "Hungarian");
        assert_eq!(name_to_code("Hungarian"), "hu");
    }

    #[test]
    fn unknown_tag_passes_through() {
        assert_eq!(code_to_name("xx"), "xx");
    }
}
