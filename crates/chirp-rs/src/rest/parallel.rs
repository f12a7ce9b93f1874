//! Ordered concurrent fan-out over a collection.
//!
//! One future per item, all polled together with `join_all`, results
//! collected in input order. Each per-item future yields
//! `Result<Option<U>>`:
//!
//! - `Ok(Some(v))`: keep `v` at this item's position.
//! - `Ok(None)`: the ignorable signal; this item's slot is dropped.
//! - `Err(e)`: a hard failure. Every other future still runs to
//!   completion, then the first hard failure (in input order) is returned
//!   and the successful values are discarded.
//!
//! Use [`ResultExt::ignore_kind`](crate::error::ResultExt::ignore_kind) to
//! turn an expected error kind into the ignorable signal.

use std::future::Future;

use futures::StreamExt;
use futures::future::join_all;
use tracing::trace;

use crate::error::Result;

/// Run `f` on every item concurrently and collect results in input order.
///
/// No concurrency cap: every item gets its own in-flight future.
pub async fn parallel_map<I, U, F, Fut>(items: I, f: F) -> Result<Vec<U>>
where
    I: IntoIterator,
    F: FnMut(I::Item) -> Fut,
    Fut: Future<Output = Result<Option<U>>>,
{
    let futures: Vec<Fut> = items.into_iter().map(f).collect();
    trace!("fan-out: {} item(s)", futures.len());
    collect_ordered(join_all(futures).await)
}

/// Like [`parallel_map`] but with at most `limit` futures in flight.
///
/// Output order still follows input order. A `limit` of zero is treated
/// as one.
pub async fn parallel_map_bounded<I, U, F, Fut>(items: I, limit: usize, f: F) -> Result<Vec<U>>
where
    I: IntoIterator,
    F: FnMut(I::Item) -> Fut,
    Fut: Future<Output = Result<Option<U>>>,
{
    let results: Vec<Result<Option<U>>> = futures::stream::iter(items.into_iter().map(f))
        .buffered(limit.max(1))
        .collect()
        .await;
    trace!("bounded fan-out: {} item(s), limit {}", results.len(), limit);
    collect_ordered(results)
}

fn collect_ordered<U>(results: Vec<Result<Option<U>>>) -> Result<Vec<U>> {
    let mut values = Vec::with_capacity(results.len());
    for result in results {
        if let Some(value) = result? {
            values.push(value);
        }
    }
    Ok(values)
}
