/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Continuation-token pagination and client-side result shaping.
//!
//! The store returns partial results with an opaque continuation token;
//! [`fetch_all`] drives the operation to exhaustion by copying each token
//! onto the next request. The store has no server-side sort across a full
//! collection, so ordering, offset, and limit are applied client-side after
//! exhaustion: stable sort first, then offset, then limit.

use crate::condition::SortOrder;
use crate::error::Error;
use crate::store::{QueryInput, ScanInput, StoreClient, StoreError};
use ddb_record_mapper_core::{Item, Key, Record, Value};

/// A query or scan being driven page by page.
#[derive(Debug, Clone)]
pub(crate) enum PageRequest {
    Query(QueryInput),
    Scan(ScanInput),
}

impl PageRequest {
    fn resume_from(&mut self, token: Key) {
        match self {
            PageRequest::Query(input) => input.exclusive_start_key = Some(token),
            PageRequest::Scan(input) => input.exclusive_start_key = Some(token),
        }
    }

    async fn send<S>(&self, store: &S) -> Result<(Vec<Item>, Option<Key>), StoreError>
    where
        S: StoreClient + ?Sized,
    {
        match self {
            PageRequest::Query(input) => {
                let output = store.query(input.clone()).await?;
                Ok((output.items, output.last_evaluated_key))
            }
            PageRequest::Scan(input) => {
                let output = store.scan(input.clone()).await?;
                Ok((output.items, output.last_evaluated_key))
            }
        }
    }
}

/// Drives a query or scan until the store stops returning a continuation
/// token, accumulating raw items in encounter order. No dedup is performed;
/// the store guarantees each item appears at most once.
///
/// `max_pages` bounds the number of round trips; exceeding it raises
/// [`Error::PaginationLimitExceeded`].
pub(crate) async fn fetch_all<S>(
    store: &S,
    mut request: PageRequest,
    max_pages: Option<usize>,
) -> Result<Vec<Item>, Error>
where
    S: StoreClient + ?Sized,
{
    let mut items = Vec::new();
    let mut pages = 0usize;
    loop {
        let (page_items, continuation) = request.send(store).await?;
        items.extend(page_items);
        pages += 1;
        match continuation {
            Some(token) => {
                if let Some(max) = max_pages {
                    if pages >= max {
                        return Err(Error::PaginationLimitExceeded { pages: max });
                    }
                }
                request.resume_from(token);
            }
            None => break,
        }
    }
    Ok(items)
}

/// Applies the client-side result shaping: stable sort by one attribute,
/// then offset, then limit.
pub(crate) fn shape_results(
    mut records: Vec<Record>,
    sort_attr: &str,
    order: SortOrder,
    offset: Option<usize>,
    limit: Option<usize>,
) -> Vec<Record> {
    records.sort_by(|a, b| {
        let left = a.get(sort_attr).unwrap_or(&Value::Undefined);
        let right = b.get(sort_attr).unwrap_or(&Value::Undefined);
        let ordering = left.cmp_for_sort(right);
        match order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    });
    let shaped = records.into_iter().skip(offset.unwrap_or(0));
    match limit {
        Some(limit) => shaped.take(limit).collect(),
        None => shaped.collect(),
    }
}
