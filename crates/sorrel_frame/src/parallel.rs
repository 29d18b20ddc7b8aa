//! Parallel row traversal: contiguous slices, one worker per slice, and a
//! deterministic ascending-order join once every slice has finished.

use crate::dataframe::DataFrame;
use crate::errors::{FrameError, Result};
use crate::row::Row;
use crate::rower::Rower;
use once_cell::sync::Lazy;
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::ops::Range;
use tracing::debug;

/// Thread pool shared by every parallel traversal in the process.
static TRAVERSAL_POOL: Lazy<ThreadPool> = Lazy::new(|| {
    ThreadPoolBuilder::new()
        .num_threads(num_cpus::get())
        .thread_name(|idx| format!("sorrel-traverse-{idx}"))
        .build()
        .expect("traversal pool to build")
});

/// Default slice count: one per available core, capped by the row count so
/// no slice is empty, and always at least 1.
pub(crate) fn default_partitions(nrows: usize) -> usize {
    num_cpus::get().min(nrows).max(1)
}

/// Split `[0, nrows)` into `partitions` contiguous ranges. Sizes differ by
/// at most one, with the remainder spread over the leading slices.
fn slice_ranges(nrows: usize, partitions: usize) -> Vec<Range<usize>> {
    let base = nrows / partitions;
    let rem = nrows % partitions;
    let mut ranges = Vec::with_capacity(partitions);
    let mut start = 0;
    for slice in 0..partitions {
        let len = base + usize::from(slice < rem);
        ranges.push(start..start + len);
        start += len;
    }
    ranges
}

/// Run the sequential traversal over one slice with a private scratch row.
fn run_slice<R: Rower>(frame: &DataFrame, rower: &mut R, range: Range<usize>) -> Result<()> {
    let mut row = Row::new(frame.schema());
    for idx in range {
        frame.fill_row(idx, &mut row)?;
        rower.accept(&row)?;
    }
    Ok(())
}

/// Parallel `map` over `frame`.
///
/// Slice 0 runs on the caller's rower; every other slice runs on a
/// `split()` of it. Columns are read-only for the whole phase, so workers
/// share the frame without locking; the scope end is the join barrier. A
/// failing slice surfaces as `SliceFailure` and suppresses every join, so a
/// caller never observes a partially merged accumulator.
pub(crate) fn pmap<R>(frame: &DataFrame, rower: &mut R, partitions: usize) -> Result<()>
where
    R: Rower + Send,
{
    let nrows = frame.nrows();
    let partitions = partitions.min(nrows).max(1);

    if partitions == 1 {
        return run_slice(frame, rower, 0..nrows).map_err(|err| FrameError::SliceFailure {
            slice: 0,
            source: Box::new(err),
        });
    }

    let ranges = slice_ranges(nrows, partitions);
    debug!(nrows, partitions, "partitioned parallel traversal");

    let mut splits: Vec<R> = (1..partitions).map(|_| rower.split()).collect();
    let mut results: Vec<Result<()>> = (0..partitions).map(|_| Ok(())).collect();

    TRAVERSAL_POOL.scope(|scope| {
        let rowers = std::iter::once(&mut *rower).chain(splits.iter_mut());
        for ((slice_rower, result), range) in rowers.zip(results.iter_mut()).zip(ranges) {
            scope.spawn(move |_| {
                *result = run_slice(frame, slice_rower, range);
            });
        }
    });

    // All slices have completed. Any failure aborts before any join;
    // partial accumulator state from other slices is discarded with the
    // splits.
    for (slice, result) in results.into_iter().enumerate() {
        if let Err(err) = result {
            return Err(FrameError::SliceFailure {
                slice,
                source: Box::new(err),
            });
        }
    }

    // Deterministic merge: ascending slice order, the original receiving
    // every join.
    for split in splits {
        rower.join(split);
    }

    Ok(())
}
