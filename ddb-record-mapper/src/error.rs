/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Mapper error type.
//!
//! Validation errors (`MissingHashKey`, `MissingRangeKey`) short-circuit
//! before any store call. Store errors abort the current operation and are
//! surfaced verbatim. A successful-but-empty read is `Ok(None)`, never an
//! error.

use crate::store::StoreError;
use ddb_record_mapper_core::{ConfigurationError, ConversionError};

/// Errors returned by mapper operations.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The record has no usable value for its hash key attribute.
    #[error("missing hash key value for attribute '{attribute}'")]
    MissingHashKey {
        /// The hash key attribute.
        attribute: String,
    },

    /// The model declares a range key but the record has no usable value
    /// for it.
    #[error("missing range key value for attribute '{attribute}'")]
    MissingRangeKey {
        /// The range key attribute.
        attribute: String,
    },

    /// The named model was never registered with this mapper.
    #[error("unknown model '{name}'")]
    UnknownModel {
        /// The model name.
        name: String,
    },

    /// A query or scan produced more result pages than the configured
    /// maximum.
    #[error("result stream exceeded {pages} pages; raise max_pages or narrow the query")]
    PaginationLimitExceeded {
        /// The configured page bound.
        pages: usize,
    },

    /// A value could not be converted to or from its wire representation.
    #[error(transparent)]
    Conversion(#[from] ConversionError),

    /// A model definition was invalid. Fatal to that model's registration.
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    /// The store returned an error. Not distinguished further by the mapper.
    #[error(transparent)]
    Store(#[from] StoreError),
}
