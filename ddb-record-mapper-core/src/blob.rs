/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Binary blob type.

/// Binary data stored under the store's `B` type tag.
#[derive(Debug, PartialEq, Eq, Clone, Hash)]
pub struct Blob {
    inner: Vec<u8>,
}

impl Blob {
    /// Creates a new blob from the given bytes.
    pub fn new(inner: impl Into<Vec<u8>>) -> Self {
        Blob {
            inner: inner.into(),
        }
    }

    /// Consumes the blob and returns the underlying bytes.
    pub fn into_inner(self) -> Vec<u8> {
        self.inner
    }
}

impl AsRef<[u8]> for Blob {
    fn as_ref(&self) -> &[u8] {
        &self.inner
    }
}
