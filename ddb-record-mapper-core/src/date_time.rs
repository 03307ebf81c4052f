/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Date-time value for record attributes.
//!
//! Unlike [`std::time::Instant`], this type is not opaque: it is a count of
//! milliseconds since the Unix epoch (January 1, 1970 at midnight UTC/GMT),
//! which is exactly the precision the wire format preserves for date
//! attributes. Sub-millisecond precision is not representable.

use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

const MILLIS_PER_SECOND: i64 = 1000;

/// Point in time with millisecond precision.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Hash)]
pub struct DateTime {
    epoch_millis: i64,
}

impl DateTime {
    /// Creates a `DateTime` from a number of milliseconds since the Unix epoch.
    pub fn from_millis(epoch_millis: i64) -> Self {
        DateTime { epoch_millis }
    }

    /// Creates a `DateTime` from a number of seconds since the Unix epoch.
    pub fn from_secs(epoch_seconds: i64) -> Self {
        DateTime {
            epoch_millis: epoch_seconds * MILLIS_PER_SECOND,
        }
    }

    /// Returns the current time.
    ///
    /// Times before the Unix epoch are clamped to the epoch.
    pub fn now() -> Self {
        let epoch_millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as i64)
            .unwrap_or(0);
        DateTime { epoch_millis }
    }

    /// Returns the number of milliseconds since the Unix epoch.
    pub fn as_millis(&self) -> i64 {
        self.epoch_millis
    }
}

impl fmt::Display for DateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.epoch_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::DateTime;

    #[test]
    fn from_secs_scales_to_millis() {
        assert_eq!(DateTime::from_secs(3).as_millis(), 3000);
        assert_eq!(DateTime::from_secs(-2).as_millis(), -2000);
    }

    #[test]
    fn ordering_follows_the_epoch() {
        assert!(DateTime::from_millis(1) < DateTime::from_millis(2));
    }
}
