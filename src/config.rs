//! Session options.

use serde::Deserialize;

use crate::error::FormError;

/// Per-session configuration.
///
/// ```ignore
/// let options = InlineOptions::from_json(r#"{ "templateKey": "type" }"#)?;
/// let session = InlineForm::with_options(form, options);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct InlineOptions {
    /// Record key holding a block's type tag.
    pub template_key: String,
    /// Log a warning when a record names an unregistered block type.
    pub warn_unknown_blocks: bool,
}

impl Default for InlineOptions {
    fn default() -> Self {
        Self {
            template_key: "_template".to_string(),
            warn_unknown_blocks: true,
        }
    }
}

impl InlineOptions {
    /// Parse options from JSON. Missing keys keep their defaults.
    pub fn from_json(source: &str) -> Result<InlineOptions, FormError> {
        Ok(serde_json::from_str(source)?)
    }
}
