//! Multilingual service name decoding.
//!
//! Demodulators report service names either as plain text or as a list of
//! `lang=text` entries separated by U+001F (unit separator), where `lang` is
//! a three-letter ISO 639-2 code:
//!
//! ```text
//! eng=BBC ONE\u{1f}wel=BBC UN
//! ```

use thiserror::Error;

/// Separator between language entries.
pub const ENTRY_SEPARATOR: char = '\u{1f}';

/// Language code given to a plain, single-language name.
pub const UNDETERMINED_LANGUAGE: &str = "und";

/// Name decode failures. Callers substitute a placeholder name.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NameError {
    #[error("Service name is empty")]
    Empty,

    #[error("Entry has no language code: {0:?}")]
    MissingLanguage(String),

    #[error("Invalid language code: {0:?}")]
    InvalidLanguage(String),

    #[error("Entry for {0} has no text")]
    EmptyText(String),

    #[error("Service name contains control character U+{0:04X}")]
    ControlCharacter(u32),
}

/// A decoded multilingual name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultilingualName {
    entries: Vec<(String, String)>,
}

impl MultilingualName {
    /// Parse a raw name blob.
    pub fn parse(raw: &str) -> Result<Self, NameError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(NameError::Empty);
        }

        if !is_multilingual(raw) {
            check_text(raw)?;
            return Ok(Self {
                entries: vec![(UNDETERMINED_LANGUAGE.to_string(), raw.to_string())],
            });
        }

        let mut entries = Vec::new();
        for entry in raw.split(ENTRY_SEPARATOR) {
            let entry = entry.trim();
            if entry.is_empty() {
                continue;
            }
            let (lang, text) = entry
                .split_once('=')
                .ok_or_else(|| NameError::MissingLanguage(entry.to_string()))?;
            if !is_language_code(lang) {
                return Err(NameError::InvalidLanguage(lang.to_string()));
            }
            let text = text.trim();
            if text.is_empty() {
                return Err(NameError::EmptyText(lang.to_string()));
            }
            check_text(text)?;
            entries.push((lang.to_string(), text.to_string()));
        }

        if entries.is_empty() {
            return Err(NameError::Empty);
        }
        Ok(Self { entries })
    }

    /// Text for one language, if present.
    pub fn get(&self, lang: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(l, _)| l.eq_ignore_ascii_case(lang))
            .map(|(_, t)| t.as_str())
    }

    /// Text in the preferred language, falling back to the first entry.
    pub fn preferred(&self, lang: Option<&str>) -> &str {
        lang.and_then(|l| self.get(l))
            .unwrap_or_else(|| self.entries[0].1.as_str())
    }

    pub fn languages(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(l, _)| l.as_str())
    }
}

/// Decode a raw name to display text in the preferred language.
pub fn decode_name(raw: &str, preferred: Option<&str>) -> Result<String, NameError> {
    MultilingualName::parse(raw).map(|name| name.preferred(preferred).to_string())
}

fn is_multilingual(raw: &str) -> bool {
    raw.contains(ENTRY_SEPARATOR)
        || raw
            .split_once('=')
            .map(|(lang, _)| is_language_code(lang))
            .unwrap_or(false)
}

fn is_language_code(code: &str) -> bool {
    code.len() == 3 && code.bytes().all(|b| b.is_ascii_alphabetic())
}

fn check_text(text: &str) -> Result<(), NameError> {
    match text.chars().find(|c| c.is_control()) {
        Some(c) => Err(NameError::ControlCharacter(c as u32)),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_name() {
        assert_eq!(decode_name("  Channel 4 ", None).unwrap(), "Channel 4");
        // '=' without a language code in front is part of the name
        assert_eq!(decode_name("A=B News", Some("eng")).unwrap(), "A=B News");
    }

    #[test]
    fn test_multilingual_name() {
        let raw = "eng=BBC ONE\u{1f}wel=BBC UN";
        let name = MultilingualName::parse(raw).unwrap();
        assert_eq!(name.languages().collect::<Vec<_>>(), vec!["eng", "wel"]);
        assert_eq!(name.preferred(Some("WEL")), "BBC UN");
        assert_eq!(name.preferred(Some("fra")), "BBC ONE");
        assert_eq!(name.preferred(None), "BBC ONE");
    }

    #[test]
    fn test_single_entry_multilingual() {
        assert_eq!(decode_name("fra=France 2", Some("eng")).unwrap(), "France 2");
    }

    #[test]
    fn test_decode_failures() {
        assert_eq!(decode_name("", None), Err(NameError::Empty));
        assert_eq!(decode_name("\u{1f}\u{1f}", None), Err(NameError::Empty));
        assert_eq!(
            decode_name("eng=One\u{1f}Two", None),
            Err(NameError::MissingLanguage("Two".to_string()))
        );
        assert_eq!(
            decode_name("eng=One\u{1f}en=Two", None),
            Err(NameError::InvalidLanguage("en".to_string()))
        );
        assert_eq!(
            decode_name("eng= \u{1f}fra=Deux", None),
            Err(NameError::EmptyText("eng".to_string()))
        );
        assert_eq!(
            decode_name("Bad\u{0}Name", None),
            Err(NameError::ControlCharacter(0))
        );
    }
}
