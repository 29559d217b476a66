//! Upload ingestion: file checks, text decoding and identifier parsing.

use crate::error::DashboardError;
use std::collections::HashSet;
use tracing::debug;

/// Only plain text id lists are accepted.
pub fn check_filename(filename: &str) -> Result<(), DashboardError> {
    let name = filename.trim();
    if name.is_empty() {
        return Err(DashboardError::InvalidFile("缺少文件名".to_string()));
    }
    if !name.to_ascii_lowercase().ends_with(".txt") {
        return Err(DashboardError::InvalidFile(
            "只支持 .txt 文件格式".to_string(),
        ));
    }
    Ok(())
}

/// Decode upload bytes as UTF-8, falling back to GBK.
pub fn decode_upload(bytes: &[u8]) -> Result<String, DashboardError> {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);

    if let Ok(text) = std::str::from_utf8(bytes) {
        return Ok(text.to_string());
    }

    let (decoded, _, had_errors) = encoding_rs::GBK.decode(bytes);
    if had_errors {
        return Err(DashboardError::Encoding);
    }
    debug!("Upload decoded as GBK");
    Ok(decoded.into_owned())
}

/// Turn raw upload text into a de-duplicated, order-preserving id list.
///
/// Lines are trimmed; blank lines and `#` comments are dropped.
pub fn parse_identifiers(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();

    text.split('\n')
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter(|line| seen.insert(*line))
        .map(String::from)
        .collect()
}
