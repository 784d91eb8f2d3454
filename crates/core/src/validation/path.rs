//! Pre-parsed dotted paths with a list wildcard.

use super::ValidationError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Key(String),
    /// Apply the remaining path to every element of the list at this position.
    Wildcard,
}

/// A dotted path such as `periodo.inicio` or `items.$.id`, split once at
/// declaration time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPath {
    raw: String,
    segments: Vec<Segment>,
}

impl FieldPath {
    /// Split `raw` on `.`; every segment must be non-empty after trimming.
    /// A segment equal to `wildcard` becomes [`Segment::Wildcard`].
    pub fn parse(raw: &str, wildcard: &str) -> Result<Self, ValidationError> {
        let mut segments = Vec::new();
        for part in raw.split('.') {
            let part = part.trim();
            if part.is_empty() {
                return Err(ValidationError::Configuration {
                    field: raw.to_string(),
                    reason: "path segments must be non-empty".to_string(),
                });
            }
            segments.push(if part == wildcard {
                Segment::Wildcard
            } else {
                Segment::Key(part.to_string())
            });
        }
        Ok(Self {
            raw: raw.to_string(),
            segments,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }
}

impl std::fmt::Display for FieldPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.raw)
    }
}
