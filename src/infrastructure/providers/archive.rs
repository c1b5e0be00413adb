//! Subtitle downloads often arrive archived. Supports the two formats
//! providers in this corpus actually serve; RAR is explicitly rejected
//! rather than silently passed through, since no pure-Rust RAR decoder
//! is available.

use std::io::{Cursor, Read};

use crate::shared::error::ProviderError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveKind {
    Zip,
    Xz,
    Rar,
    None,
}

pub fn detect(filename: &str, bytes: &[u8]) -> ArchiveKind {
    let lower = filename.to_ascii_lowercase();
    if lower.ends_with(".zip") || bytes.starts_with(b"PK\x03\x04") {
        ArchiveKind::Zip
    } else if lower.ends_with(".xz") || bytes.starts_with(&[0xFD, 0x37, 0x7A, 0x58, 0x5A, 0x00]) {
        ArchiveKind::Xz
    } else if lower.ends_with(".rar") || bytes.starts_with(b"Rar!") {
        ArchiveKind::Rar
    } else {
        ArchiveKind::None
    }
}

/// Extracts the first subtitle-like entry (`.srt`/`.ass`/`.ssa`/`.vtt`)
/// from an archive, returning its raw bytes.
pub fn extract_subtitle(bytes: &[u8], kind: ArchiveKind) -> Result<Vec<u8>, ProviderError> {
    match kind {
        ArchiveKind::None => Ok(bytes.to_vec()),
        ArchiveKind::Zip => extract_from_zip(bytes),
        ArchiveKind::Xz => extract_from_xz(bytes),
        ArchiveKind::Rar => Err(ProviderError::UnsupportedArchive("rar".to_string())),
    }
}

fn extract_from_zip(bytes: &[u8]) -> Result<Vec<u8>, ProviderError> {
    let reader = Cursor::new(bytes);
    let mut archive = zip::ZipArchive::new(reader).map_err(|e| ProviderError::ExtractionFailed(e.to_string()))?;

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i).map_err(|e| ProviderError::ExtractionFailed(e.to_string()))?;
        if is_subtitle_entry(entry.name()) {
            let mut out = Vec::with_capacity(entry.size() as usize);
            entry.read_to_end(&mut out).map_err(|e| ProviderError::ExtractionFailed(e.to_string()))?;
            return Ok(out);
        }
    }

    Err(ProviderError::ExtractionFailed("no subtitle entry in archive".to_string()))
}

fn extract_from_xz(bytes: &[u8]) -> Result<Vec<u8>, ProviderError> {
    let mut decompressed = Vec::new();
    xz2::read::XzDecoder::new(bytes)
        .read_to_end(&mut decompressed)
        .map_err(|e| ProviderError::ExtractionFailed(e.to_string()))?;
    Ok(decompressed)
}

fn is_subtitle_entry(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    [".srt", ".ass", ".ssa", ".vtt"].iter().any(|ext| lower.ends_with(ext))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_zip_by_magic_bytes() {
        assert_eq!(detect("sub.zip", b"PK\x03\x04rest"), ArchiveKind::Zip);
    }

    #[test]
    fn detects_rar_and_rejects_extraction() {
        assert_eq!(detect("sub.rar", b"Rar!\x1a\x07"), ArchiveKind::Rar);
        assert!(matches!(
            extract_subtitle(b"Rar!", ArchiveKind::Rar),
            Err(ProviderError::UnsupportedArchive(_))
        ));
    }

    #[test]
    fn passes_through_unarchived_bytes() {
        let bytes = b"1\n00:00:01,000 --> 00:00:02,000\nHi\n";
        let out = extract_subtitle(bytes, ArchiveKind::None).unwrap();
        assert_eq!(out, bytes);
    }
}
