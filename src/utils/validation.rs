use lazy_static::lazy_static;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

use crate::config::constants::{AUDIO_ID_SUFFIX, MAX_LANGUAGE_LENGTH, MAX_TEXT_LENGTH};
use crate::error::{CatalogError, Result};

lazy_static! {
    /// Lowercase key such as `english`, `pt-br` or `arabic_gulf`
    static ref LANGUAGE_REGEX: Regex = Regex::new(r"^[a-z][a-z0-9_-]*$").unwrap();

    /// Absolute http(s) URL or a server-relative path, no whitespace.
    /// `//host/...` is protocol-relative and would point at another host.
    static ref AUDIO_URL_REGEX: Regex =
        Regex::new(r"^(?:https?://[^\s/]+(?:/\S*)?|/(?:[^/\s]\S*)?)$").unwrap();
}

/// Trim and lowercase a language key, then check its shape
pub fn normalize_language(language: &str) -> Result<String> {
    let language = language.trim().to_lowercase();

    if language.is_empty() {
        return Err(CatalogError::InvalidRequest(
            "language cannot be empty".to_string(),
        ));
    }

    if language.chars().count() > MAX_LANGUAGE_LENGTH || !LANGUAGE_REGEX.is_match(&language) {
        return Err(CatalogError::InvalidRequest(format!(
            "invalid language key '{}'",
            language
        )));
    }

    Ok(language)
}

/// Lookup form of a language key, without shape checks
///
/// Path parameters go through this so that `English` finds `english`
/// while unknown shapes simply miss.
pub fn language_key(language: &str) -> String {
    language.trim().to_lowercase()
}

pub fn normalize_audio_url(url: &str) -> Result<String> {
    let url = url.trim();

    if !AUDIO_URL_REGEX.is_match(url) {
        return Err(CatalogError::InvalidRequest(format!(
            "audio_url must be an http(s) URL or an absolute path, got '{}'",
            url
        )));
    }

    Ok(url.to_string())
}

/// Check the transcript length and convert it to NFC
pub fn normalize_text_content(text: &str) -> Result<String> {
    if text.trim().is_empty() {
        return Err(CatalogError::InvalidRequest(
            "text_content cannot be empty".to_string(),
        ));
    }

    let normalized: String = text.nfc().collect();
    let length = normalized.chars().count();

    if length > MAX_TEXT_LENGTH {
        return Err(CatalogError::InvalidRequest(format!(
            "text_content too long: {} characters (max {})",
            length, MAX_TEXT_LENGTH
        )));
    }

    Ok(normalized)
}

pub fn audio_id_for(language: &str) -> String {
    format!("{}{}", language, AUDIO_ID_SUFFIX)
}
