//! Output filename patterns with substitution tokens.
//!
//! Patterns are literal paths with bracketed tokens spliced in:
//!
//! - `[name]`  file stem of the source (or the entry/bundle name)
//! - `[hash]`  content hash, truncated to the default length
//! - `[hash:N]` content hash truncated to `N` hex characters
//! - `[ext]`   source extension including the leading dot
//! - `[query]` resource query including the leading `?`, empty when absent
//!
//! `assets/img/[name].[hash:8][ext]` renders to e.g.
//! `assets/img/logo.3f2a9c1d.png`.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

/// Hex characters kept by a bare `[hash]` token.
pub const DEFAULT_HASH_LEN: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Name,
    Hash(usize),
    Ext,
    Query,
}

/// A parsed output filename pattern.
///
/// Serializes as its source string, so manifests stay readable:
///
/// ```
/// use gantry_config::OutputPattern;
///
/// let pattern = OutputPattern::parse("assets/js/[name].[hash].js").unwrap();
/// assert!(pattern.needs_hash());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct OutputPattern {
    raw: String,
    segments: Vec<Segment>,
}

/// Values spliced into a pattern when rendering.
///
/// `hash` is the full hex digest; tokens truncate it to their length.
#[derive(Debug, Clone, Copy, Default)]
pub struct Substitutions<'a> {
    pub name: &'a str,
    pub hash: &'a str,
    pub ext: &'a str,
    pub query: &'a str,
}

impl OutputPattern {
    pub fn parse(raw: &str) -> Result<Self> {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut rest = raw;

        while let Some(open) = rest.find('[') {
            literal.push_str(&rest[..open]);
            let after = &rest[open + 1..];
            let close = after.find(']').ok_or_else(|| ConfigError::InvalidPattern {
                pattern: raw.to_string(),
                reason: "unclosed '['".to_string(),
            })?;
            let token = &after[..close];
            if !literal.is_empty() {
                segments.push(Segment::Literal(std::mem::take(&mut literal)));
            }
            segments.push(parse_token(raw, token)?);
            rest = &after[close + 1..];
        }
        literal.push_str(rest);
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Ok(Self {
            raw: raw.to_string(),
            segments,
        })
    }

    /// The pattern as written in the manifest.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// True when rendering requires a content hash.
    pub fn needs_hash(&self) -> bool {
        self.segments
            .iter()
            .any(|s| matches!(s, Segment::Hash(_)))
    }

    /// True when the pattern embeds the source or bundle name.
    pub fn has_name(&self) -> bool {
        self.segments.iter().any(|s| matches!(s, Segment::Name))
    }

    /// Splice substitution values into the pattern.
    pub fn render(&self, subst: &Substitutions<'_>) -> String {
        let mut out = String::with_capacity(self.raw.len());
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Name => out.push_str(subst.name),
                Segment::Hash(len) => {
                    let take = (*len).min(subst.hash.len());
                    out.push_str(&subst.hash[..take]);
                }
                Segment::Ext => out.push_str(subst.ext),
                Segment::Query => out.push_str(subst.query),
            }
        }
        out
    }
}

fn parse_token(raw: &str, token: &str) -> Result<Segment> {
    match token {
        "name" => Ok(Segment::Name),
        "hash" => Ok(Segment::Hash(DEFAULT_HASH_LEN)),
        "ext" => Ok(Segment::Ext),
        "query" => Ok(Segment::Query),
        _ => {
            if let Some(len) = token.strip_prefix("hash:") {
                let len: usize = len.parse().map_err(|_| ConfigError::InvalidPattern {
                    pattern: raw.to_string(),
                    reason: format!("bad hash length in '[{token}]'"),
                })?;
                if len == 0 {
                    return Err(ConfigError::InvalidPattern {
                        pattern: raw.to_string(),
                        reason: "hash length must be at least 1".to_string(),
                    });
                }
                Ok(Segment::Hash(len))
            } else {
                Err(ConfigError::InvalidPattern {
                    pattern: raw.to_string(),
                    reason: format!("unknown token '[{token}]'"),
                })
            }
        }
    }
}

impl fmt::Display for OutputPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl TryFrom<String> for OutputPattern {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<OutputPattern> for String {
    fn from(pattern: OutputPattern) -> Self {
        pattern.raw
    }
}
