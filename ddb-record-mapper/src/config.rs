/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Mapper configuration.

use std::time::Duration;

/// Tunables shared by every operation of one mapper instance.
#[derive(Debug, Clone)]
pub struct MapperConfig {
    max_pages: Option<usize>,
    read_capacity_units: u64,
    write_capacity_units: u64,
    provision_poll_interval: Duration,
    provision_poll_attempts: usize,
}

impl Default for MapperConfig {
    fn default() -> Self {
        Self {
            max_pages: Some(1000),
            read_capacity_units: 5,
            write_capacity_units: 10,
            provision_poll_interval: Duration::from_millis(500),
            provision_poll_attempts: 20,
        }
    }
}

impl MapperConfig {
    /// Default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bounds the number of pages a single query or scan may fetch.
    /// `None` removes the bound.
    pub fn max_pages(mut self, max_pages: Option<usize>) -> Self {
        self.max_pages = max_pages;
        self
    }

    /// Read capacity provisioned for newly created tables.
    pub fn read_capacity_units(mut self, units: u64) -> Self {
        self.read_capacity_units = units;
        self
    }

    /// Write capacity provisioned for newly created tables.
    pub fn write_capacity_units(mut self, units: u64) -> Self {
        self.write_capacity_units = units;
        self
    }

    /// Delay between table-activation polls.
    pub fn provision_poll_interval(mut self, interval: Duration) -> Self {
        self.provision_poll_interval = interval;
        self
    }

    /// Number of table-activation polls before giving up.
    pub fn provision_poll_attempts(mut self, attempts: usize) -> Self {
        self.provision_poll_attempts = attempts;
        self
    }

    pub(crate) fn page_bound(&self) -> Option<usize> {
        self.max_pages
    }

    pub(crate) fn read_capacity(&self) -> u64 {
        self.read_capacity_units
    }

    pub(crate) fn write_capacity(&self) -> u64 {
        self.write_capacity_units
    }

    pub(crate) fn poll_interval(&self) -> Duration {
        self.provision_poll_interval
    }

    pub(crate) fn poll_attempts(&self) -> usize {
        self.provision_poll_attempts
    }
}
