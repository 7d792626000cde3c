//! Block templates and the block registry.
//!
//! A block is a tagged content unit: a static [`BlockTemplate`] describing it
//! (label, default payload, settings fields) plus a render capability
//! ([`BlockComponent`]). The host builds a [`BlockRegistry`] once, before
//! mounting, and the collection dispatches every stored record through it.
//!
//! # Example
//!
//! ```ignore
//! let mut registry = BlockRegistry::new();
//! registry.register(
//!     BlockTemplate::new("hero", "Hero").default_field("text", json!("Spiderman")),
//!     |ctx, props| inline_text_field(ctx, "text"),
//! );
//! ```

use std::rc::Rc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::context::InlineContext;
use crate::error::FormError;
use crate::form::FieldPath;
use crate::primitives::Cleanup;
use crate::types::EditorKind;

// =============================================================================
// Field Schema
// =============================================================================

/// One entry of a template's settings form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSchema {
    pub name: String,
    pub label: String,
    #[serde(default)]
    pub component: EditorKind,
}

impl FieldSchema {
    pub fn new(name: impl Into<String>, label: impl Into<String>, component: EditorKind) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            component,
        }
    }

    /// Same entry with its name moved under `prefix`.
    pub fn prefixed(&self, prefix: &FieldPath) -> FieldSchema {
        FieldSchema {
            name: format!("{}.{}", prefix, self.name),
            ..self.clone()
        }
    }
}

// =============================================================================
// Block Template
// =============================================================================

/// Static descriptor of a block type. Immutable once registered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockTemplate {
    pub type_tag: String,
    pub label: String,
    #[serde(default)]
    pub default_item: Map<String, Value>,
    #[serde(default)]
    pub fields: Vec<FieldSchema>,
}

impl BlockTemplate {
    pub fn new(type_tag: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            type_tag: type_tag.into(),
            label: label.into(),
            default_item: Map::new(),
            fields: Vec::new(),
        }
    }

    pub fn default_field(mut self, name: impl Into<String>, value: Value) -> Self {
        self.default_item.insert(name.into(), value);
        self
    }

    pub fn field(mut self, schema: FieldSchema) -> Self {
        self.fields.push(schema);
        self
    }

    /// A fresh record of this type: the tag under `template_key`, then the
    /// default payload.
    pub fn instantiate(&self, template_key: &str) -> Value {
        let mut record = Map::new();
        record.insert(template_key.to_string(), Value::String(self.type_tag.clone()));
        for (key, value) in &self.default_item {
            if key != template_key {
                record.insert(key.clone(), value.clone());
            }
        }
        Value::Object(record)
    }

    /// Settings fields rewritten to live under `prefix`.
    pub fn settings_fields(&self, prefix: &FieldPath) -> Vec<FieldSchema> {
        self.fields.iter().map(|field| field.prefixed(prefix)).collect()
    }
}

// =============================================================================
// Block Component
// =============================================================================

/// What a block component is handed when mounted.
#[derive(Clone)]
pub struct BlockProps {
    /// Current position in the collection.
    pub index: usize,
    /// Absolute path of the record (`blocks.3`).
    pub path: FieldPath,
    /// Current record value.
    ///
    /// Reads inside an effect, such as a [`PropValue::Getter`] bound to a
    /// node, subscribe that effect to the whole record. Reads made while
    /// rendering (the component's mount, an `inline_field` render) subscribe
    /// nothing.
    ///
    /// [`PropValue::Getter`]: crate::PropValue::Getter
    pub data: Rc<dyn Fn() -> Value>,
}

/// Render capability of a block type.
pub type BlockComponent = Rc<dyn Fn(&InlineContext, BlockProps) -> Result<Cleanup, FormError>>;

/// A registered block: template plus component.
#[derive(Clone)]
pub struct Block {
    pub template: Rc<BlockTemplate>,
    pub component: BlockComponent,
}

// =============================================================================
// Registry
// =============================================================================

/// Ordered mapping from type tag to [`Block`].
///
/// Order is registration order; the add-menu lists templates in it.
#[derive(Clone, Default)]
pub struct BlockRegistry {
    blocks: Vec<Block>,
}

impl BlockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a block type. A second registration of a tag replaces the
    /// first in place.
    pub fn register<F>(&mut self, template: BlockTemplate, component: F) -> &mut Self
    where
        F: Fn(&InlineContext, BlockProps) -> Result<Cleanup, FormError> + 'static,
    {
        let block = Block {
            template: Rc::new(template),
            component: Rc::new(component),
        };
        match self
            .blocks
            .iter_mut()
            .find(|existing| existing.template.type_tag == block.template.type_tag)
        {
            Some(existing) => *existing = block,
            None => self.blocks.push(block),
        }
        self
    }

    pub fn get(&self, type_tag: &str) -> Option<&Block> {
        self.blocks
            .iter()
            .find(|block| block.template.type_tag == type_tag)
    }

    pub fn contains(&self, type_tag: &str) -> bool {
        self.get(type_tag).is_some()
    }

    /// Every registered template, in registration order.
    pub fn templates(&self) -> Vec<Rc<BlockTemplate>> {
        self.blocks.iter().map(|block| block.template.clone()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Block> {
        self.blocks.iter()
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

impl std::fmt::Debug for BlockRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.blocks.iter().map(|block| &block.template.type_tag))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn noop(_: &InlineContext, _: BlockProps) -> Result<Cleanup, FormError> {
        Ok(Box::new(|| {}))
    }

    fn cta() -> BlockTemplate {
        BlockTemplate::new("cta", "Call to Action")
            .default_field("url", json!(""))
            .default_field("text", json!("Signup!"))
            .field(FieldSchema::new("text", "Text", EditorKind::Text))
            .field(FieldSchema::new("url", "Url", EditorKind::Text))
    }

    #[test]
    fn test_instantiate_puts_tag_first_then_defaults() {
        let record = cta().instantiate("_template");
        assert_eq!(
            record,
            json!({ "_template": "cta", "url": "", "text": "Signup!" })
        );
    }

    #[test]
    fn test_instantiate_tag_wins_over_default_payload() {
        let template = BlockTemplate::new("hero", "Hero").default_field("_template", json!("cta"));
        assert_eq!(template.instantiate("_template"), json!({ "_template": "hero" }));
    }

    #[test]
    fn test_settings_fields_are_prefixed() {
        let prefix = FieldPath::parse("blocks.2").unwrap();
        let names: Vec<String> = cta()
            .settings_fields(&prefix)
            .into_iter()
            .map(|field| field.name)
            .collect();
        assert_eq!(names, vec!["blocks.2.text", "blocks.2.url"]);
    }

    #[test]
    fn test_registry_lookup_and_order() {
        let mut registry = BlockRegistry::new();
        registry
            .register(cta(), noop)
            .register(BlockTemplate::new("hero", "Hero"), noop);

        assert_eq!(registry.len(), 2);
        assert!(registry.contains("hero"));
        assert!(registry.get("banner").is_none());

        let labels: Vec<String> = registry
            .templates()
            .iter()
            .map(|template| template.label.clone())
            .collect();
        assert_eq!(labels, vec!["Call to Action", "Hero"]);
    }

    #[test]
    fn test_register_same_tag_replaces() {
        let mut registry = BlockRegistry::new();
        registry.register(BlockTemplate::new("hero", "Hero"), noop);
        registry.register(BlockTemplate::new("hero", "Big Hero"), noop);

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("hero").unwrap().template.label, "Big Hero");
    }

    #[test]
    fn test_template_deserializes() {
        let template: BlockTemplate = serde_json::from_value(json!({
            "typeTag": "cta",
            "label": "Call to Action",
            "defaultItem": { "text": "Signup!" },
            "fields": [{ "name": "text", "label": "Text", "component": "textarea" }]
        }))
        .unwrap();

        assert_eq!(template.type_tag, "cta");
        assert_eq!(template.fields[0].component, EditorKind::Textarea);
    }
}
