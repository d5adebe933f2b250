//! Filename derivation for exports
//!
//! Covers the two naming paths: names suggested by the export service through
//! a `Content-Disposition` header, and names derived locally from a page label
//! and the calendar date.

use crate::error::{ExportError, Result};
use chrono::{Local, NaiveDate};
use tracing::debug;

/// `<label>_<YYYY-MM-DD>.csv`
pub fn page_filename(label: &str, date: NaiveDate) -> String {
    format!("{}_{}.csv", label, date.format("%Y-%m-%d"))
}

/// Page filename for today's local calendar date
pub fn page_filename_today(label: &str) -> String {
    page_filename(label, Local::now().date_naive())
}

/// Resolve the filename for a downloaded payload
///
/// A missing or unparsable header falls back to `fallback`; a bad header is
/// never an error for the caller.
pub fn resolve_filename(header: Option<&str>, fallback: &str) -> String {
    let Some(header) = header else {
        return fallback.to_string();
    };

    match parse_content_disposition(header) {
        Ok(name) => name,
        Err(err) => {
            debug!("Ignoring Content-Disposition '{}': {}", header, err);
            fallback.to_string()
        }
    }
}

/// Extract the filename from a `Content-Disposition` value
///
/// An RFC 5987 `filename*=UTF-8''...` parameter wins over a quoted
/// `filename="..."` parameter. Unquoted `filename` values are rejected.
pub fn parse_content_disposition(header: &str) -> Result<String> {
    let params = split_params(header)?;

    if let Some((_, value)) = params.iter().find(|(name, _)| name == "filename*") {
        match decode_ext_value(value) {
            Ok(name) => return Ok(name),
            Err(err) => debug!("Skipping filename* parameter: {}", err),
        }
    }

    let (_, value) = params
        .iter()
        .find(|(name, _)| name == "filename")
        .ok_or_else(|| ExportError::MalformedHeader("no filename parameter".to_string()))?;

    unquote(value)
}

/// Split `type; a=1; b="x;y"` into lowercase names and raw values
fn split_params(header: &str) -> Result<Vec<(String, String)>> {
    let mut segments = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut escaped = false;

    for c in header.chars() {
        if escaped {
            current.push(c);
            escaped = false;
            continue;
        }
        match c {
            '\\' if in_quotes => {
                current.push(c);
                escaped = true;
            }
            '"' => {
                current.push(c);
                in_quotes = !in_quotes;
            }
            ';' if !in_quotes => segments.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    if in_quotes {
        return Err(ExportError::MalformedHeader(
            "unterminated quoted string".to_string(),
        ));
    }
    segments.push(current);

    Ok(segments
        .iter()
        .filter_map(|segment| {
            let (name, value) = segment.split_once('=')?;
            Some((
                name.trim().to_ascii_lowercase(),
                value.trim().to_string(),
            ))
        })
        .collect())
}

/// Unwrap a quoted-string, honoring backslash escapes
fn unquote(value: &str) -> Result<String> {
    let inner = value
        .strip_prefix('"')
        .ok_or_else(|| ExportError::MalformedHeader(format!("filename is not quoted: {}", value)))?;

    let mut name = String::new();
    let mut chars = inner.chars();
    let mut closed = false;
    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some(next) => name.push(next),
                None => break,
            },
            '"' => {
                closed = true;
                break;
            }
            _ => name.push(c),
        }
    }

    if !closed {
        return Err(ExportError::MalformedHeader(
            "missing closing quote".to_string(),
        ));
    }
    if !chars.as_str().trim().is_empty() {
        return Err(ExportError::MalformedHeader(format!(
            "unexpected text after filename: {}",
            chars.as_str()
        )));
    }
    if name.is_empty() {
        return Err(ExportError::MalformedHeader("empty filename".to_string()));
    }
    Ok(name)
}

/// Decode `charset'language'percent-encoded`
fn decode_ext_value(value: &str) -> Result<String> {
    let mut parts = value.splitn(3, '\'');
    let charset = parts.next().unwrap_or_default();
    let _language = parts.next();
    let encoded = parts
        .next()
        .ok_or_else(|| ExportError::MalformedHeader(format!("bad extended value: {}", value)))?;

    if !charset.eq_ignore_ascii_case("utf-8") {
        return Err(ExportError::MalformedHeader(format!(
            "unsupported charset: {}",
            charset
        )));
    }

    let bytes = percent_decode(encoded)?;
    let name = String::from_utf8(bytes)
        .map_err(|_| ExportError::MalformedHeader("filename is not valid UTF-8".to_string()))?;
    if name.is_empty() {
        return Err(ExportError::MalformedHeader("empty filename".to_string()));
    }
    Ok(name)
}

fn percent_decode(input: &str) -> Result<Vec<u8>> {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = bytes
                .get(i + 1..i + 3)
                .and_then(|h| std::str::from_utf8(h).ok())
                .and_then(|h| u8::from_str_radix(h, 16).ok())
                .ok_or_else(|| {
                    ExportError::MalformedHeader(format!("bad percent escape in {}", input))
                })?;
            out.push(hex);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    Ok(out)
}
