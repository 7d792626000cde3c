//! Field Paths - Addressing locations inside the document.
//!
//! A path is a list of segments parsed from a dot/bracket string:
//!
//! ```text
//! "title"            -> [Key("title")]
//! "blocks.0.text"    -> [Key("blocks"), Index(0), Key("text")]
//! "blocks[0].text"   -> [Key("blocks"), Index(0), Key("text")]
//! ```
//!
//! Paths display dot-delimited, so a block at position `k` of the `blocks`
//! field is always `blocks.k` no matter how it was written.

use std::fmt;
use std::str::FromStr;

use serde_json::{Map, Value};

use crate::error::FormError;

// =============================================================================
// Segment
// =============================================================================

/// One step of a field path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Segment {
    /// Object key.
    Key(String),
    /// Array position.
    Index(usize),
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Key(key) => f.write_str(key),
            Segment::Index(index) => write!(f, "{}", index),
        }
    }
}

impl Segment {
    fn from_token(token: &str) -> Segment {
        match token.parse::<usize>() {
            Ok(index) if !token.starts_with('+') => Segment::Index(index),
            _ => Segment::Key(token.to_string()),
        }
    }
}

// =============================================================================
// FieldPath
// =============================================================================

/// Immutable address of a value in the document tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldPath {
    segments: Vec<Segment>,
}

impl FieldPath {
    /// Parse a dot/bracket path. Empty paths and empty segments are rejected.
    pub fn parse(raw: &str) -> Result<FieldPath, FormError> {
        let invalid = |reason| FormError::InvalidPath {
            path: raw.to_string(),
            reason,
        };

        if raw.is_empty() {
            return Err(invalid("path is empty"));
        }

        let mut segments = Vec::new();
        for part in raw.split('.') {
            if part.is_empty() {
                return Err(invalid("empty segment"));
            }

            // "items[2][0]" -> key "items", then indices 2 and 0
            let (head, mut rest) = match part.find('[') {
                Some(open) => (&part[..open], &part[open..]),
                None => (part, ""),
            };
            if !head.is_empty() {
                segments.push(Segment::from_token(head));
            } else if rest.is_empty() {
                return Err(invalid("empty segment"));
            }

            while !rest.is_empty() {
                let Some(stripped) = rest.strip_prefix('[') else {
                    return Err(invalid("unexpected text after ']'"));
                };
                let Some(close) = stripped.find(']') else {
                    return Err(invalid("unclosed '['"));
                };
                let token = &stripped[..close];
                if token.is_empty() {
                    return Err(invalid("empty brackets"));
                }
                segments.push(Segment::from_token(token));
                rest = &stripped[close + 1..];
            }
        }

        Ok(FieldPath { segments })
    }

    /// Build a path from already-split segments.
    pub fn from_segments(segments: Vec<Segment>) -> FieldPath {
        FieldPath { segments }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Append a relative name (`prefix.name`). The name is parsed, so
    /// `"items.0.text"` and `"items[0].text"` both work.
    pub fn join(&self, name: &str) -> Result<FieldPath, FormError> {
        let tail = FieldPath::parse(name)?;
        let mut segments = self.segments.clone();
        segments.extend(tail.segments);
        Ok(FieldPath { segments })
    }

    /// Path of the element at `index` inside this (array) path.
    pub fn index(&self, index: usize) -> FieldPath {
        let mut segments = self.segments.clone();
        segments.push(Segment::Index(index));
        FieldPath { segments }
    }

    /// Path of the object key `key` under this path. Not parsed.
    pub fn key(&self, key: &str) -> FieldPath {
        let mut segments = self.segments.clone();
        segments.push(Segment::Key(key.to_string()));
        FieldPath { segments }
    }

    /// Is `self` equal to `other` or one of its ancestors?
    pub fn contains(&self, other: &FieldPath) -> bool {
        other.segments.len() >= self.segments.len()
            && other.segments[..self.segments.len()] == self.segments[..]
    }

    /// Are the two paths on the same branch (one contains the other)?
    pub fn overlaps(&self, other: &FieldPath) -> bool {
        self.contains(other) || other.contains(self)
    }

    /// Position of `other` directly under this array path, if `other` lives
    /// inside one of its elements.
    pub fn element_index_of(&self, other: &FieldPath) -> Option<usize> {
        if other.segments.len() <= self.segments.len() || !self.contains(other) {
            return None;
        }
        match other.segments[self.segments.len()] {
            Segment::Index(index) => Some(index),
            Segment::Key(_) => None,
        }
    }

    /// Replace the element position directly under `array` with `index`.
    pub(crate) fn with_element_index(&self, array: &FieldPath, index: usize) -> FieldPath {
        let mut segments = self.segments.clone();
        segments[array.segments.len()] = Segment::Index(index);
        FieldPath { segments }
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{}", segment)?;
        }
        Ok(())
    }
}

impl FromStr for FieldPath {
    type Err = FormError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FieldPath::parse(s)
    }
}

// =============================================================================
// Value access
// =============================================================================

/// Read the value at `path`, if every step exists.
///
/// Index segments also address object keys (`"0"`), matching how documents
/// loaded from JSON may store numbered keys.
pub fn get_in<'a>(root: &'a Value, path: &FieldPath) -> Option<&'a Value> {
    let mut current = root;
    for segment in path.segments() {
        current = match (current, segment) {
            (Value::Object(map), Segment::Key(key)) => map.get(key)?,
            (Value::Object(map), Segment::Index(index)) => map.get(&index.to_string())?,
            (Value::Array(items), Segment::Index(index)) => items.get(*index)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Mutable access to the value at `path`, if it exists.
pub fn get_in_mut<'a>(root: &'a mut Value, path: &FieldPath) -> Option<&'a mut Value> {
    let mut current = root;
    for segment in path.segments() {
        current = match (current, segment) {
            (Value::Object(map), Segment::Key(key)) => map.get_mut(key)?,
            (Value::Object(map), Segment::Index(index)) => map.get_mut(&index.to_string())?,
            (Value::Array(items), Segment::Index(index)) => items.get_mut(*index)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Write `value` at `path`, creating missing objects and arrays on the way.
///
/// A missing container is created as an array when the next segment is an
/// index and as an object otherwise. Writing past the end of an array pads it
/// with nulls. Fails when a step runs into a scalar.
pub fn set_in(root: &mut Value, path: &FieldPath, value: Value) -> Result<(), FormError> {
    let Some((last, parents)) = path.segments().split_last() else {
        *root = value;
        return Ok(());
    };

    let mut current = root;
    for (depth, segment) in parents.iter().enumerate() {
        let next = &path.segments()[depth + 1];
        if current.is_null() {
            *current = empty_container_for(segment);
        }
        current = child_slot(current, segment, next, path, depth)?;
    }

    if current.is_null() {
        *current = empty_container_for(last);
    }
    match (current, last) {
        (Value::Object(map), segment) => {
            map.insert(segment.to_string(), value);
            Ok(())
        }
        (Value::Array(items), Segment::Index(index)) => {
            if *index >= items.len() {
                items.resize(*index + 1, Value::Null);
            }
            items[*index] = value;
            Ok(())
        }
        (_, segment) => Err(FormError::NotAContainer {
            path: prefix_string(path, path.len() - 1),
            segment: segment.to_string(),
        }),
    }
}

fn child_slot<'a>(
    current: &'a mut Value,
    segment: &Segment,
    next: &Segment,
    path: &FieldPath,
    depth: usize,
) -> Result<&'a mut Value, FormError> {
    match (current, segment) {
        (Value::Object(map), segment) => Ok(map
            .entry(segment.to_string())
            .or_insert_with(|| empty_container_for(next))),
        (Value::Array(items), Segment::Index(index)) => {
            if *index >= items.len() {
                items.resize(*index + 1, Value::Null);
            }
            let slot = &mut items[*index];
            if slot.is_null() {
                *slot = empty_container_for(next);
            }
            Ok(slot)
        }
        (_, segment) => Err(FormError::NotAContainer {
            path: prefix_string(path, depth),
            segment: segment.to_string(),
        }),
    }
}

fn empty_container_for(segment: &Segment) -> Value {
    match segment {
        Segment::Index(_) => Value::Array(Vec::new()),
        Segment::Key(_) => Value::Object(Map::new()),
    }
}

fn prefix_string(path: &FieldPath, len: usize) -> String {
    if len == 0 {
        return "<root>".to_string();
    }
    FieldPath::from_segments(path.segments()[..len].to_vec()).to_string()
}

// =============================================================================
// Tests
// =============================================================================
