/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Errors raised by value conversion and model registration.

use std::fmt;

/// Error that occurs while converting between native values and wire values.
#[derive(Debug)]
pub struct ConversionError {
    kind: ConversionErrorKind,
    attribute: Option<String>,
}

/// The kind of conversion error that occurred.
#[derive(Debug)]
#[non_exhaustive]
pub enum ConversionErrorKind {
    /// The wire value had an unexpected type tag.
    InvalidType {
        /// The expected wire type.
        expected: &'static str,
        /// The actual wire type found.
        actual: &'static str,
    },
    /// The value could not be parsed or was invalid for the declared type.
    InvalidValue {
        /// Description of why the value was invalid.
        message: String,
    },
}

impl ConversionError {
    /// Creates an error for an unexpected wire type.
    pub fn type_mismatch(expected: &'static str, actual: &'static str) -> Self {
        Self {
            kind: ConversionErrorKind::InvalidType { expected, actual },
            attribute: None,
        }
    }

    /// Creates an error for an invalid value.
    pub fn invalid_value(message: impl Into<String>) -> Self {
        Self {
            kind: ConversionErrorKind::InvalidValue {
                message: message.into(),
            },
            attribute: None,
        }
    }

    /// Attaches the name of the attribute being converted.
    pub fn for_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.attribute = Some(attribute.into());
        self
    }

    /// Returns the kind of error.
    pub fn kind(&self) -> &ConversionErrorKind {
        &self.kind
    }

    /// Returns the attribute name if one was attached.
    pub fn attribute(&self) -> Option<&str> {
        self.attribute.as_deref()
    }
}

impl fmt::Display for ConversionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ConversionErrorKind::InvalidType { expected, actual } => {
                write!(f, "invalid wire type: expected {}, got {}", expected, actual)?
            }
            ConversionErrorKind::InvalidValue { message } => {
                write!(f, "invalid value: {}", message)?
            }
        }
        if let Some(attribute) = &self.attribute {
            write!(f, " (attribute '{}')", attribute)?;
        }
        Ok(())
    }
}

impl std::error::Error for ConversionError {}

/// Error raised while building a model definition. Fatal to that model's
/// registration; never raised at write time.
#[derive(Debug)]
pub struct ConfigurationError {
    kind: ConfigurationErrorKind,
}

/// The kind of configuration error that occurred.
#[derive(Debug)]
#[non_exhaustive]
pub enum ConfigurationErrorKind {
    /// Two attributes share a name.
    DuplicateAttribute {
        /// The repeated attribute name.
        name: String,
    },
    /// More than one attribute has the hash key role.
    MultipleHashKeys,
    /// More than one attribute has the range key role.
    MultipleRangeKeys,
    /// More than one attribute has the composite primary role.
    MultipleCompositeKeys,
    /// A range key was declared without a composite primary attribute.
    RangeKeyWithoutPrimary,
    /// Auto-generation was requested on an attribute that is not the
    /// primary hash key.
    AutoGenerateOnNonPrimary {
        /// The offending attribute.
        attribute: String,
    },
    /// A sharding rule was attached to an attribute that cannot carry one.
    InvalidShardingRule {
        /// The offending attribute.
        attribute: String,
        /// Why the rule is invalid.
        message: String,
    },
    /// No hash key was declared and the conventional `id` name is taken.
    SynthesizedKeyConflict,
}

impl ConfigurationError {
    pub(crate) fn new(kind: ConfigurationErrorKind) -> Self {
        Self { kind }
    }

    /// Returns the kind of error.
    pub fn kind(&self) -> &ConfigurationErrorKind {
        &self.kind
    }
}

impl fmt::Display for ConfigurationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ConfigurationErrorKind::DuplicateAttribute { name } => {
                write!(f, "attribute '{}' is declared more than once", name)
            }
            ConfigurationErrorKind::MultipleHashKeys => {
                write!(f, "a model may declare at most one hash key")
            }
            ConfigurationErrorKind::MultipleRangeKeys => {
                write!(f, "a model may declare at most one range key")
            }
            ConfigurationErrorKind::MultipleCompositeKeys => {
                write!(f, "a model may declare at most one composite primary attribute")
            }
            ConfigurationErrorKind::RangeKeyWithoutPrimary => {
                write!(
                    f,
                    "a range key requires a composite primary attribute to hold the external id"
                )
            }
            ConfigurationErrorKind::AutoGenerateOnNonPrimary { attribute } => {
                write!(
                    f,
                    "attribute '{}' cannot be auto-generated: only the primary hash key may be",
                    attribute
                )
            }
            ConfigurationErrorKind::InvalidShardingRule { attribute, message } => {
                write!(f, "invalid sharding rule on '{}': {}", attribute, message)
            }
            ConfigurationErrorKind::SynthesizedKeyConflict => {
                write!(
                    f,
                    "no hash key declared and attribute 'id' is already in use"
                )
            }
        }
    }
}

impl std::error::Error for ConfigurationError {}
