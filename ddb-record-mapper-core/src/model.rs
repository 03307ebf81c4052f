/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Model definitions: declared attributes, key roles, and sharding rules.
//!
//! A [`ModelDefinition`] is built once through its builder, which performs
//! every registration-time validation, and is immutable afterwards.

use crate::error::{ConfigurationError, ConfigurationErrorKind};
use crate::wire::WireTag;

/// Separator used to join hash and range values into the external id of a
/// composite-key record. Multi-character so it stays out of the way of
/// typical key content.
pub const DEFAULT_ID_SEPARATOR: &str = "--x--";

/// Conventional name of the primary/composite attribute.
pub const PRIMARY_ATTRIBUTE: &str = "id";

/// Segment size, in bytes, used when a chunk count of zero asks for the
/// count to be derived from the value's byte length.
pub const DEFAULT_SEGMENT_BYTES: usize = 50_000;

/// Declared native type of an attribute.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum NativeType {
    /// UTF-8 string.
    String,
    /// Double-precision number.
    Number,
    /// Boolean, stored as a tagged string.
    Boolean,
    /// Date, stored as a millisecond epoch number.
    Date,
    /// Binary payload.
    Binary,
}

impl NativeType {
    /// The wire type tag used for this attribute in table key schemas.
    pub fn wire_tag(&self) -> WireTag {
        match self {
            NativeType::String => WireTag::S,
            NativeType::Number => WireTag::N,
            NativeType::Boolean => WireTag::S,
            NativeType::Date => WireTag::N,
            NativeType::Binary => WireTag::B,
        }
    }
}

/// Key role of an attribute within its model.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, Default)]
pub enum KeyRole {
    /// Plain attribute.
    #[default]
    None,
    /// Partition identifier; store-level equality-only key.
    Hash,
    /// Sort-capable identifier within a hash partition.
    Range,
    /// Externally-facing identifier synthesized from hash and range values.
    /// Never stored as a table key.
    CompositePrimary,
}

/// How an oversized attribute value is split into fragments.
///
/// Exactly one discriminant is active per attribute.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ShardingRule {
    /// Split evenly into exactly this many segments. A count of zero means
    /// "derive the count from the byte length" and is normalized to
    /// [`ShardingRule::MaxSegmentBytes`] with [`DEFAULT_SEGMENT_BYTES`]
    /// at build time.
    ChunkCount(usize),
    /// Split into `ceil(byte_length / n)` segments.
    MaxSegmentBytes(usize),
}

/// A single declared attribute.
#[derive(Debug, Clone)]
pub struct AttributeDefinition {
    name: String,
    native_type: NativeType,
    key_role: KeyRole,
    sharding: Option<ShardingRule>,
    auto_generate: bool,
}

impl AttributeDefinition {
    /// Declares a plain attribute of the given type.
    pub fn new(name: impl Into<String>, native_type: NativeType) -> Self {
        Self {
            name: name.into(),
            native_type,
            key_role: KeyRole::None,
            sharding: None,
            auto_generate: false,
        }
    }

    /// Assigns a key role.
    pub fn key_role(mut self, role: KeyRole) -> Self {
        self.key_role = role;
        self
    }

    /// Attaches a sharding rule.
    pub fn sharded(mut self, rule: ShardingRule) -> Self {
        self.sharding = Some(rule);
        self
    }

    /// Requests a generated unique value when the attribute is absent on
    /// write. Only valid on the primary hash key.
    pub fn auto_generated(mut self) -> Self {
        self.auto_generate = true;
        self
    }

    /// The attribute name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The declared native type.
    pub fn native_type(&self) -> NativeType {
        self.native_type
    }

    /// The key role.
    pub fn role(&self) -> KeyRole {
        self.key_role
    }

    /// The sharding rule, if one is attached.
    pub fn sharding_rule(&self) -> Option<ShardingRule> {
        self.sharding
    }

    /// Whether a missing value is auto-generated on write.
    pub fn is_auto_generated(&self) -> bool {
        self.auto_generate
    }
}

/// An immutable model definition.
#[derive(Debug, Clone)]
pub struct ModelDefinition {
    name: String,
    table_name: String,
    separator: String,
    attributes: Vec<AttributeDefinition>,
    hash_attr: String,
    range_attr: Option<String>,
    composite_attr: Option<String>,
}

impl ModelDefinition {
    /// Starts building a model with the given name.
    pub fn builder(name: impl Into<String>) -> Builder {
        Builder {
            name: name.into(),
            table_name: None,
            separator: DEFAULT_ID_SEPARATOR.to_string(),
            attributes: Vec::new(),
        }
    }

    /// The model name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The backing table name. Defaults to the model name.
    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    /// Separator joining hash and range values in the external id.
    pub fn separator(&self) -> &str {
        &self.separator
    }

    /// All declared attributes, in declaration order.
    pub fn attributes(&self) -> impl Iterator<Item = &AttributeDefinition> {
        self.attributes.iter()
    }

    /// Looks up an attribute by name.
    pub fn attribute(&self, name: &str) -> Option<&AttributeDefinition> {
        self.attributes.iter().find(|a| a.name == name)
    }

    /// The hash key attribute. Always present after a successful build.
    pub fn hash_key(&self) -> &AttributeDefinition {
        self.attribute(&self.hash_attr)
            .expect("validated at build time")
    }

    /// The range key attribute, if declared.
    pub fn range_key(&self) -> Option<&AttributeDefinition> {
        self.range_attr.as_deref().and_then(|n| self.attribute(n))
    }

    /// The composite primary attribute, if declared.
    pub fn composite_key(&self) -> Option<&AttributeDefinition> {
        self.composite_attr
            .as_deref()
            .and_then(|n| self.attribute(n))
    }

    /// The declared type of an attribute, if it exists.
    pub fn declared_type(&self, name: &str) -> Option<NativeType> {
        self.attribute(name).map(|a| a.native_type)
    }

    /// Attributes carrying a sharding rule, in declaration order.
    pub fn sharded_attributes(&self) -> impl Iterator<Item = &AttributeDefinition> {
        self.attributes.iter().filter(|a| a.sharding.is_some())
    }

    /// Whether the named attribute plays any key role.
    pub fn is_key_attribute(&self, name: &str) -> bool {
        self.attribute(name)
            .map(|a| a.key_role != KeyRole::None)
            .unwrap_or(false)
    }
}

/// Builder for [`ModelDefinition`]. `build` performs all registration-time
/// validation.
#[derive(Debug)]
pub struct Builder {
    name: String,
    table_name: Option<String>,
    separator: String,
    attributes: Vec<AttributeDefinition>,
}

impl Builder {
    /// Adds an attribute.
    pub fn attribute(mut self, attribute: AttributeDefinition) -> Self {
        self.attributes.push(attribute);
        self
    }

    /// Overrides the backing table name.
    pub fn table_name(mut self, table_name: impl Into<String>) -> Self {
        self.table_name = Some(table_name.into());
        self
    }

    /// Overrides the external-id separator.
    pub fn id_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }

    /// Validates the declarations and produces the immutable definition.
    pub fn build(mut self) -> Result<ModelDefinition, ConfigurationError> {
        use ConfigurationErrorKind as Kind;

        for (i, attr) in self.attributes.iter().enumerate() {
            if self.attributes[..i].iter().any(|a| a.name == attr.name) {
                return Err(ConfigurationError::new(Kind::DuplicateAttribute {
                    name: attr.name.clone(),
                }));
            }
        }

        let mut hash_attr = None;
        let mut range_attr = None;
        let mut composite_attr = None;
        for attr in &self.attributes {
            let slot = match attr.key_role {
                KeyRole::None => continue,
                KeyRole::Hash => &mut hash_attr,
                KeyRole::Range => &mut range_attr,
                KeyRole::CompositePrimary => &mut composite_attr,
            };
            if slot.is_some() {
                return Err(ConfigurationError::new(match attr.key_role {
                    KeyRole::Hash => Kind::MultipleHashKeys,
                    KeyRole::Range => Kind::MultipleRangeKeys,
                    _ => Kind::MultipleCompositeKeys,
                }));
            }
            *slot = Some(attr.name.clone());
        }

        // Without a declared hash key, synthesize the conventional one.
        let hash_attr = match hash_attr {
            Some(name) => name,
            None => {
                if self.attributes.iter().any(|a| a.name == PRIMARY_ATTRIBUTE) {
                    return Err(ConfigurationError::new(Kind::SynthesizedKeyConflict));
                }
                self.attributes.push(
                    AttributeDefinition::new(PRIMARY_ATTRIBUTE, NativeType::String)
                        .key_role(KeyRole::Hash)
                        .auto_generated(),
                );
                PRIMARY_ATTRIBUTE.to_string()
            }
        };

        if range_attr.is_some() && composite_attr.is_none() {
            return Err(ConfigurationError::new(Kind::RangeKeyWithoutPrimary));
        }

        for attr in &self.attributes {
            if attr.auto_generate
                && !(attr.name == hash_attr && attr.name == PRIMARY_ATTRIBUTE)
            {
                return Err(ConfigurationError::new(Kind::AutoGenerateOnNonPrimary {
                    attribute: attr.name.clone(),
                }));
            }
        }

        for attr in &mut self.attributes {
            let Some(rule) = attr.sharding else { continue };
            if attr.native_type != NativeType::String {
                return Err(ConfigurationError::new(Kind::InvalidShardingRule {
                    attribute: attr.name.clone(),
                    message: "only string attributes can be sharded".to_string(),
                }));
            }
            if attr.key_role != KeyRole::None {
                return Err(ConfigurationError::new(Kind::InvalidShardingRule {
                    attribute: attr.name.clone(),
                    message: "key attributes cannot be sharded".to_string(),
                }));
            }
            match rule {
                // Zero asks for a byte-length-derived count.
                ShardingRule::ChunkCount(0) => {
                    attr.sharding = Some(ShardingRule::MaxSegmentBytes(DEFAULT_SEGMENT_BYTES));
                }
                ShardingRule::ChunkCount(_) => {}
                ShardingRule::MaxSegmentBytes(0) => {
                    return Err(ConfigurationError::new(Kind::InvalidShardingRule {
                        attribute: attr.name.clone(),
                        message: "segment size must be at least one byte".to_string(),
                    }));
                }
                ShardingRule::MaxSegmentBytes(_) => {}
            }
        }

        Ok(ModelDefinition {
            table_name: self.table_name.unwrap_or_else(|| self.name.clone()),
            name: self.name,
            separator: self.separator,
            attributes: self.attributes,
            hash_attr,
            range_attr,
            composite_attr,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_builder() -> Builder {
        ModelDefinition::builder("User")
            .attribute(
                AttributeDefinition::new("id", NativeType::String).key_role(KeyRole::Hash),
            )
            .attribute(AttributeDefinition::new("name", NativeType::String))
    }

    #[test]
    fn table_name_defaults_to_model_name() {
        let model = user_builder().build().unwrap();
        assert_eq!(model.table_name(), "User");
        assert_eq!(model.hash_key().name(), "id");
    }

    #[test]
    fn missing_hash_key_is_synthesized() {
        let model = ModelDefinition::builder("Note")
            .attribute(AttributeDefinition::new("body", NativeType::String))
            .build()
            .unwrap();
        let hash = model.hash_key();
        assert_eq!(hash.name(), "id");
        assert_eq!(hash.role(), KeyRole::Hash);
        assert!(hash.is_auto_generated());
    }

    #[test]
    fn synthesized_key_conflicts_with_existing_id() {
        let err = ModelDefinition::builder("Note")
            .attribute(AttributeDefinition::new("id", NativeType::Number))
            .build()
            .unwrap_err();
        assert!(matches!(
            err.kind(),
            ConfigurationErrorKind::SynthesizedKeyConflict
        ));
    }

    #[test]
    fn range_key_requires_composite_primary() {
        let err = ModelDefinition::builder("Post")
            .attribute(
                AttributeDefinition::new("author", NativeType::String).key_role(KeyRole::Hash),
            )
            .attribute(
                AttributeDefinition::new("title", NativeType::String).key_role(KeyRole::Range),
            )
            .build()
            .unwrap_err();
        assert!(matches!(
            err.kind(),
            ConfigurationErrorKind::RangeKeyWithoutPrimary
        ));
    }

    #[test]
    fn auto_generate_is_rejected_off_the_primary_key() {
        let err = user_builder()
            .attribute(AttributeDefinition::new("tag", NativeType::String).auto_generated())
            .build()
            .unwrap_err();
        assert!(matches!(
            err.kind(),
            ConfigurationErrorKind::AutoGenerateOnNonPrimary { .. }
        ));
    }

    #[test]
    fn sharding_is_rejected_on_non_string_attributes() {
        let err = user_builder()
            .attribute(
                AttributeDefinition::new("count", NativeType::Number)
                    .sharded(ShardingRule::ChunkCount(2)),
            )
            .build()
            .unwrap_err();
        assert!(matches!(
            err.kind(),
            ConfigurationErrorKind::InvalidShardingRule { .. }
        ));
    }

    #[test]
    fn chunk_count_zero_becomes_byte_derived() {
        let model = user_builder()
            .attribute(
                AttributeDefinition::new("essay", NativeType::String)
                    .sharded(ShardingRule::ChunkCount(0)),
            )
            .build()
            .unwrap();
        assert_eq!(
            model.attribute("essay").unwrap().sharding_rule(),
            Some(ShardingRule::MaxSegmentBytes(DEFAULT_SEGMENT_BYTES))
        );
    }

    #[test]
    fn duplicate_attributes_are_rejected() {
        let err = user_builder()
            .attribute(AttributeDefinition::new("name", NativeType::String))
            .build()
            .unwrap_err();
        assert!(matches!(
            err.kind(),
            ConfigurationErrorKind::DuplicateAttribute { .. }
        ));
    }
}
