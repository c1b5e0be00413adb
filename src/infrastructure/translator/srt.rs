//! Plain SRT parsing and writing, used by the translator engine to
//! translate downloaded/extracted `.srt` subtitles and
//! to serialize whisper transcriptions without disturbing
//! index numbers or timestamps.

use crate::infrastructure::external::whisper::TranscriptionSegment;

#[derive(Debug, Clone, PartialEq)]
pub struct SrtEntry {
    pub index: u32,
    pub start_time: f64,
    pub end_time: f64,
    pub text: String,
}

pub fn parse_srt(content: &str) -> Vec<SrtEntry> {
    let mut entries = Vec::new();
    let blocks = content.replace("\r\n", "\n");

    for block in blocks.split("\n\n") {
        let mut lines = block.lines();
        let Some(index_line) = lines.next() else { continue };
        let Ok(index) = index_line.trim().parse::<u32>() else { continue };
        let Some(time_line) = lines.next() else { continue };
        let Some((start, end)) = parse_timestamp_line(time_line) else { continue };
        let text: String = lines.collect::<Vec<_>>().join("\n");
        if text.trim().is_empty() {
            continue;
        }
        entries.push(SrtEntry { index, start_time: start, end_time: end, text });
    }

    entries
}

pub fn write_srt(entries: &[SrtEntry]) -> String {
    entries
        .iter()
        .map(|e| {
            format!(
                "{}\n{} --> {}\n{}\n",
                e.index,
                format_timestamp(e.start_time),
                format_timestamp(e.end_time),
                e.text
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn segments_to_entries(segments: &[TranscriptionSegment]) -> Vec<SrtEntry> {
    segments
        .iter()
        .enumerate()
        .map(|(i, s)| SrtEntry {
            index: i as u32 + 1,
            start_time: s.start_time,
            end_time: s.end_time,
            text: s.text.clone(),
        })
        .collect()
}

fn parse_timestamp_line(line: &str) -> Option<(f64, f64)> {
    let parts: Vec<&str> = line.split("-->").collect();
    if parts.len() != 2 {
        return None;
    }
    Some((parse_timestamp(parts[0].trim())?, parse_timestamp(parts[1].trim())?))
}

fn parse_timestamp(ts: &str) -> Option<f64> {
    let parts: Vec<&str> = ts.split(':').collect();
    if parts.len() != 3 {
        return None;
    }
    let hours: f64 = parts[0].parse().ok()?;
    let minutes: f64 = parts[1].parse().ok()?;
    let sec_parts: Vec<&str> = parts[2].split(|c| c == ',' || c == '.').collect();
    let seconds: f64 = sec_parts.first()?.parse().ok()?;
    let millis: f64 = sec_parts.get(1).and_then(|s| s.parse().ok()).unwrap_or(0.0);
    Some(hours * 3600.0 + minutes * 60.0 + seconds + millis / 1000.0)
}

fn format_timestamp(total_seconds: f64) -> String {
    let hours = (total_seconds / 3600.0).floor() as u32;
    let minutes = ((total_seconds % 3600.0) / 60.0).floor() as u32;
    let seconds = (total_seconds % 60.0).floor() as u32;
    let millis = ((total_seconds % 1.0) * 1000.0).round() as u32;
    format!("{:02}:{:02}:{:02},{:03}", hours, minutes, seconds, millis)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_a_simple_entry() {
        let src = "1\n00:00:01,000 --> 00:00:02,500\nHello world\n";
        let parsed = parse_srt(src);
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].text, "Hello world");
        assert!((parsed[0].start_time - 1.0).abs() < 1e-6);
        assert!((parsed[0].end_time - 2.5).abs() < 1e-6);

        let written = write_srt(&parsed);
        assert!(written.contains("Hello world"));
        assert!(written.starts_with("1\n"));
    }

    #[test]
    fn skips_malformed_blocks() {
        let src = "not a number\n00:00:01,000 --> 00:00:02,000\nx\n";
        assert!(parse_srt(src).is_empty());
    }
}
