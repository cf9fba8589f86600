//! Line-oriented INI parser.
//!
//! The format is deliberately loose and mirrors the configuration files the
//! relay has always accepted:
//!
//! - Everything from the first `;` or `#` on a line is a comment, even inside
//!   a quoted value.
//! - `[NAME]` opens a section. The name is taken verbatim and is case-sensitive.
//! - `key = value` stores a value under the current section. Dots in keys are
//!   replaced with underscores, so `rule1.action.priority` is stored as
//!   `rule1_action_priority`.
//! - One leading and one trailing `"` are removed from a value before it is
//!   trimmed. Quotes are not balanced.
//! - Pairs before the first section are dropped, and lines that are neither a
//!   section nor a pair are skipped without error.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::error::{RelayError, Result};

static SECTION_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\[(.*)\]$").unwrap_or_else(|_| unreachable!()));

static PAIR_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([^=]+)=(.*)$").unwrap_or_else(|_| unreachable!()));

/// A parsed INI document: string values keyed by section and key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IniDocument {
    sections: BTreeMap<String, BTreeMap<String, String>>,
}

impl IniDocument {
    /// Parses INI text.
    ///
    /// Parsing never fails; malformed lines are ignored.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let mut doc = Self::default();
        let mut current: Option<String> = None;
        let mut skipped = 0usize;

        for raw in text.lines() {
            let line = clean_line(raw);
            if line.is_empty() {
                continue;
            }

            if let Some(caps) = SECTION_REGEX.captures(&line) {
                let name = caps[1].to_string();
                doc.sections.entry(name.clone()).or_default();
                current = Some(name);
                continue;
            }

            if let Some(caps) = PAIR_REGEX.captures(&line) {
                let Some(section) = current.as_ref() else {
                    skipped += 1;
                    continue;
                };
                let key = normalize_key(&caps[1]);
                let value = clean_value(&caps[2]);
                doc.sections
                    .entry(section.clone())
                    .or_default()
                    .insert(key, value);
                continue;
            }

            skipped += 1;
        }

        if skipped > 0 {
            debug!(skipped, "ignored lines without section context or key/value shape");
        }

        doc
    }

    /// Reads and parses an INI file.
    ///
    /// # Errors
    ///
    /// Returns `RelayError::ConfigFileMissing` if the file does not exist and
    /// `RelayError::ConfigRead` for any other I/O failure.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| {
            if source.kind() == io::ErrorKind::NotFound {
                RelayError::ConfigFileMissing {
                    path: path.to_path_buf(),
                }
            } else {
                RelayError::ConfigRead {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;

        let doc = Self::parse(&text);
        debug!(
            path = %path.display(),
            sections = doc.sections.len(),
            values = doc.len(),
            "parsed configuration file"
        );
        Ok(doc)
    }

    /// Returns the value stored under `section` and `key`.
    ///
    /// `key` may be given with dots or underscores.
    #[must_use]
    pub fn get(&self, section: &str, key: &str) -> Option<&str> {
        self.sections
            .get(section)?
            .get(&normalize_key(key))
            .map(String::as_str)
    }

    /// Returns the value under `section` and `key`, or `default` when absent.
    #[must_use]
    pub fn get_or<'a>(&'a self, section: &str, key: &str, default: &'a str) -> &'a str {
        self.get(section, key).unwrap_or(default)
    }

    /// Iterates over the key/value pairs of a section in key order.
    pub fn section(&self, name: &str) -> impl Iterator<Item = (&str, &str)> {
        self.sections
            .get(name)
            .into_iter()
            .flat_map(|entries| entries.iter().map(|(k, v)| (k.as_str(), v.as_str())))
    }

    /// Returns the section names in sorted order.
    pub fn sections(&self) -> impl Iterator<Item = &str> {
        self.sections.keys().map(String::as_str)
    }

    /// Returns the total number of stored values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sections.values().map(BTreeMap::len).sum()
    }

    /// Returns true if no values are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Drops comments and carriage returns, then trims the line.
fn clean_line(raw: &str) -> String {
    let uncommented = match raw.find([';', '#']) {
        Some(idx) => &raw[..idx],
        None => raw,
    };
    uncommented.replace('\r', "").trim().to_string()
}

fn normalize_key(key: &str) -> String {
    key.trim().replace('.', "_")
}

fn clean_value(value: &str) -> String {
    let value = value.strip_prefix('"').unwrap_or(value);
    let value = value.strip_suffix('"').unwrap_or(value);
    value.trim().to_string()
}
