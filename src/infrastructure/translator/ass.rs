//! ASS/SSA style classification and override-tag round-tripping.
//!
//! Ported from `ass_utils.py`'s `classify_styles`/`extract_tags`/`restore_tags`.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{HashMap, HashSet};

static SIGNS_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)sign|^op$|^ed$|song|karaoke|title|note|insert|logo|screen|board|card|letter").unwrap()
});
static DIALOG_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)default|main|dialogue|italic|flashback|narrat|top|alt|internal|thought").unwrap()
});
static OVERRIDE_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{[^}]*\}").unwrap());
static POS_MOVE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\\(?:pos|move|org)\s*\(").unwrap());

/// A single dialogue event: style name plus raw (tag-laden) text.
#[derive(Debug, Clone)]
pub struct AssEvent {
    pub style: String,
    pub text: String,
}

/// Classify each style name appearing in `events` as dialog (to be
/// translated) or signs/songs (kept verbatim).
///
/// Explicit keyword patterns are checked first; styles that match
/// neither fall back to a heuristic: if more than 80% of a style's
/// lines carry a `\pos`/`\move`/`\org` tag it is treated as a sign.
/// Everything else defaults to dialog.
pub fn classify_styles(events: &[AssEvent]) -> (HashSet<String>, HashSet<String>) {
    let mut dialog_styles = HashSet::new();
    let mut signs_styles = HashSet::new();

    let mut style_lines: HashMap<&str, Vec<&str>> = HashMap::new();
    for event in events {
        style_lines
            .entry(event.style.as_str())
            .or_default()
            .push(event.text.as_str());
    }

    for (style_name, lines) in &style_lines {
        if SIGNS_PATTERN.is_match(style_name) {
            signs_styles.insert(style_name.to_string());
            continue;
        }
        if DIALOG_PATTERN.is_match(style_name) {
            dialog_styles.insert(style_name.to_string());
            continue;
        }

        if !lines.is_empty() {
            let pos_count = lines.iter().filter(|l| POS_MOVE.is_match(l)).count();
            if pos_count as f64 / lines.len() as f64 > 0.8 {
                signs_styles.insert(style_name.to_string());
                continue;
            }
        }

        dialog_styles.insert(style_name.to_string());
    }

    (dialog_styles, signs_styles)
}

/// `(clean-text byte offset, raw tag string)` pairs used to restore
/// override tags after translation.
pub type TagInfo = Vec<(usize, String)>;

/// Strip `{...}` override tags from `text`, returning the clean text,
/// the extracted tags with their positions in the clean text, and the
/// clean text's length (needed for proportional restoration).
pub fn extract_tags(text: &str) -> (String, TagInfo, usize) {
    if !OVERRIDE_TAG.is_match(text) {
        return (text.to_string(), Vec::new(), text.chars().count());
    }

    let mut tag_info = Vec::new();
    let mut clean = String::new();
    let mut last_end = 0;

    for m in OVERRIDE_TAG.find_iter(text) {
        clean.push_str(&text[last_end..m.start()]);
        tag_info.push((clean.chars().count(), m.as_str().to_string()));
        last_end = m.end();
    }
    clean.push_str(&text[last_end..]);

    let clean_len = clean.chars().count();
    (clean, tag_info, clean_len)
}

/// Reinsert tags into translated text using proportional positioning,
/// snapped to the nearest word boundary within +/-3 characters. A
/// tag originally at position 0 (a prefix tag) always stays at the front.
pub fn restore_tags(translated_text: &str, tag_info: &TagInfo, original_clean_length: usize) -> String {
    if tag_info.is_empty() {
        return translated_text.to_string();
    }

    let chars: Vec<char> = translated_text.chars().collect();
    let trans_len = chars.len();
    let orig_len = if original_clean_length > 0 {
        original_clean_length
    } else {
        trans_len
    };

    let mut sorted_tags = tag_info.clone();
    sorted_tags.sort_by_key(|(pos, _)| *pos);

    let mut result = String::new();
    let mut text_pos = 0usize;

    for (pos, tag) in sorted_tags {
        let mut insert_pos = if pos == 0 {
            0
        } else if orig_len > 0 {
            let ratio = pos as f64 / orig_len as f64;
            let raw = (ratio * trans_len as f64) as i64;
            snap_to_word_boundary(&chars, raw, trans_len as i64)
        } else {
            pos.min(trans_len)
        };

        insert_pos = insert_pos.max(text_pos).min(trans_len);

        if insert_pos > text_pos {
            result.extend(&chars[text_pos..insert_pos]);
            text_pos = insert_pos;
        }
        result.push_str(&tag);
    }

    if text_pos < trans_len {
        result.extend(&chars[text_pos..]);
    }

    result
}

fn snap_to_word_boundary(chars: &[char], raw: i64, trans_len: i64) -> usize {
    let mut best = raw.clamp(0, trans_len);
    for offset in -3..=3i64 {
        let check = raw + offset;
        if check >= 0 && check <= trans_len {
            let at_boundary = check == trans_len
                || chars
                    .get(check as usize)
                    .map(|c| *c == ' ' || *c == '\\')
                    .unwrap_or(false);
            if at_boundary {
                best = check;
                break;
            }
        }
    }
    best as usize
}

/// `\N`/`\n` normalization the LLM sometimes mangles during translation.
pub fn fix_line_breaks(text: &str) -> String {
    static STRAY_N: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?:[^\\]|^)\\n").unwrap());
    static DOUBLE_SPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"  +").unwrap());
    let text = text.replace('\n', "\\N");
    let text = STRAY_N.replace_all(&text, |caps: &regex::Captures| {
        caps.get(0).unwrap().as_str().replace("\\n", "\\N")
    });
    let text = DOUBLE_SPACE.replace_all(&text, " ");
    text.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_signs_style_by_name() {
        let events = vec![AssEvent { style: "Signs".into(), text: "hello".into() }];
        let (dialog, signs) = classify_styles(&events);
        assert!(signs.contains("Signs"));
        assert!(dialog.is_empty());
    }

    #[test]
    fn classifies_unnamed_style_by_pos_heuristic() {
        let events = vec![
            AssEvent { style: "Weird1".into(), text: r"{\pos(100,200)}Text".into() },
            AssEvent { style: "Weird1".into(), text: r"{\pos(50,60)}More".into() },
        ];
        let (dialog, signs) = classify_styles(&events);
        assert!(signs.contains("Weird1"));
        assert!(dialog.is_empty());
    }

    #[test]
    fn defaults_unknown_style_to_dialog() {
        let events = vec![AssEvent { style: "Weird2".into(), text: "Just talking".into() }];
        let (dialog, _signs) = classify_styles(&events);
        assert!(dialog.contains("Weird2"));
    }

    #[test]
    fn extracts_and_restores_prefix_tag() {
        let (clean, tags, len) = extract_tags(r"{\pos(10,20)}Hello world");
        assert_eq!(clean, "Hello world");
        assert_eq!(tags.len(), 1);
        assert_eq!(tags[0].0, 0);

        let restored = restore_tags("Szia vilag", &tags, len);
        assert_eq!(restored, r"{\pos(10,20)}Szia vilag");
    }

    #[test]
    fn no_tags_round_trips_unchanged() {
        let (clean, tags, _) = extract_tags("plain text");
        assert!(tags.is_empty());
        assert_eq!(restore_tags("plain text", &tags, clean.chars().count()), "plain text");
    }

    #[test]
    fn fixes_stray_literal_newline() {
        assert_eq!(fix_line_breaks("line one\nline two"), r"line one\Nline two");
    }
}
