//! Core types for spark-inline.
//!
//! These types define the foundation that everything builds on: the session
//! mode, the kinds of nodes the render surface understands, editor kinds used
//! by block field schemas, and per-field metadata flags.

use serde::{Deserialize, Serialize};

// =============================================================================
// Session Mode
// =============================================================================

/// Editing mode of one inline form session.
///
/// `Inactive` renders content read-only; `Active` renders editors in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InlineStatus {
    Active,
    #[default]
    Inactive,
}

impl InlineStatus {
    pub fn is_active(self) -> bool {
        matches!(self, InlineStatus::Active)
    }

    /// The other state.
    pub fn toggled(self) -> InlineStatus {
        match self {
            InlineStatus::Active => InlineStatus::Inactive,
            InlineStatus::Inactive => InlineStatus::Active,
        }
    }
}

// =============================================================================
// Component Types - For parallel arrays
// =============================================================================

/// Component types for the parallel arrays pattern.
///
/// Each node at index i has componentType[i] set to one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum ComponentType {
    #[default]
    None = 0,
    /// Root of an inline form session.
    Region = 1,
    /// An ordered block collection.
    Collection = 2,
    /// One mounted block instance.
    Block = 3,
    /// Edit affordances wrapped around a block.
    Controls = 4,
    /// Interactive field editor.
    Editor = 5,
    /// Read-only field content.
    Display = 6,
    /// Overlay (block settings).
    Dialog = 7,
}

// =============================================================================
// Editor Kinds
// =============================================================================

/// Which editor a schema field asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EditorKind {
    #[default]
    Text,
    Textarea,
    Number,
    Toggle,
}

impl EditorKind {
    /// Convert raw editor input into the value this editor stores.
    ///
    /// Text that does not parse for `Number`/`Toggle` is kept as is.
    pub fn coerce(self, raw: serde_json::Value) -> serde_json::Value {
        use serde_json::Value;

        let Value::String(text) = &raw else {
            return raw;
        };
        let trimmed = text.trim();
        match self {
            EditorKind::Number => {
                if let Ok(int) = trimmed.parse::<i64>() {
                    Value::from(int)
                } else if let Some(num) = trimmed
                    .parse::<f64>()
                    .ok()
                    .and_then(serde_json::Number::from_f64)
                {
                    Value::Number(num)
                } else {
                    raw
                }
            }
            EditorKind::Toggle => match trimmed {
                "true" | "on" => Value::Bool(true),
                "false" | "off" => Value::Bool(false),
                _ => raw,
            },
            EditorKind::Text | EditorKind::Textarea => raw,
        }
    }
}

// =============================================================================
// Field Flags (bitflags)
// =============================================================================

bitflags::bitflags! {
    /// Field metadata flags.
    ///
    /// `DIRTY` is derived from the committed snapshot; the rest follow focus.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct FieldFlags: u8 {
        /// Field currently has focus.
        const ACTIVE = 1 << 0;
        /// Field has been focused at least once.
        const VISITED = 1 << 1;
        /// Field has been focused and left.
        const TOUCHED = 1 << 2;
        /// Value differs from the committed snapshot.
        const DIRTY = 1 << 3;
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_defaults_inactive() {
        assert_eq!(InlineStatus::default(), InlineStatus::Inactive);
        assert!(!InlineStatus::default().is_active());
    }

    #[test]
    fn test_status_toggle_round_trip() {
        let start = InlineStatus::Inactive;
        assert_eq!(start.toggled(), InlineStatus::Active);
        assert_eq!(start.toggled().toggled(), start);
    }

    #[test]
    fn test_editor_kind_coerce() {
        use serde_json::json;

        assert_eq!(EditorKind::Number.coerce(json!("42")), json!(42));
        assert_eq!(EditorKind::Number.coerce(json!("1.5")), json!(1.5));
        assert_eq!(EditorKind::Number.coerce(json!("abc")), json!("abc"));
        assert_eq!(EditorKind::Toggle.coerce(json!("on")), json!(true));
        assert_eq!(EditorKind::Text.coerce(json!("42")), json!("42"));
        assert_eq!(EditorKind::Text.coerce(json!(7)), json!(7));
    }

    #[test]
    fn test_editor_kind_serde_names() {
        let kind: EditorKind = serde_json::from_str("\"textarea\"").unwrap();
        assert_eq!(kind, EditorKind::Textarea);
        assert_eq!(serde_json::to_string(&EditorKind::Text).unwrap(), "\"text\"");
    }

    #[test]
    fn test_field_flags_combine() {
        let flags = FieldFlags::VISITED | FieldFlags::TOUCHED;
        assert!(flags.contains(FieldFlags::TOUCHED));
        assert!(!flags.contains(FieldFlags::ACTIVE));
    }
}
