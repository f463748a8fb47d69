//! Fan-out/fan-in orchestration.
//!
//! The calling thread plans chunks one at a time and admits each through the
//! [`ConcurrencyGate`] onto a worker pool. Workers send their local maps over
//! a channel bounded by the worker capacity to a dedicated merger thread, so
//! finished maps waiting to be merged are bounded too. Once every admitted
//! worker has finished, the sending side is dropped and the merger returns
//! the global table.

use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use crossbeam_channel::{bounded, Receiver, Sender};
use rayon::ThreadPoolBuilder;
use tracing::{debug, trace};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::gate::ConcurrencyGate;
use crate::merger::{Delivery, Merger};
use crate::numeric::NumericPolicy;
use crate::planner::ChunkPlanner;
use crate::source::ByteSource;
use crate::table::GlobalTable;
use crate::worker;

/// Aggregates the whole of `source` with numeric policy `P`.
///
/// Fails fast: after the first worker error no further chunks are admitted,
/// and the error is returned once in-flight workers finish. No partial table
/// is ever returned.
pub fn aggregate<P, S>(source: &S, config: &Config) -> Result<GlobalTable<P::Value>>
where
    P: NumericPolicy,
    S: ByteSource + ?Sized,
{
    let pool = ThreadPoolBuilder::new()
        .num_threads(config.workers.get())
        .thread_name(|i| format!("chunk-worker-{i}"))
        .build()?;
    let gate = ConcurrencyGate::new(config.workers);
    let (deliveries, inbox) = delivery_channel::<P::Value>(config.workers);
    let failed = AtomicBool::new(false);

    thread::scope(|scope| {
        let merger = thread::Builder::new()
            .name("merger".into())
            .spawn_scoped(scope, move || Merger::new().drain(inbox))
            .map_err(Error::Spawn)?;

        // Returns only after every spawned worker has completed.
        let planned = pool.in_place_scope(|workers| -> Result<usize> {
            let mut dispatched = 0;
            for chunk in ChunkPlanner::new(source, config.chunk_size) {
                let chunk = chunk?;
                let permit = gate.acquire();
                if failed.load(Ordering::Relaxed) {
                    break;
                }
                trace!(offset = chunk.offset, in_flight = gate.in_flight(), "admitted chunk");
                let deliveries = deliveries.clone();
                let failed = &failed;
                workers.spawn(move |_| {
                    let result = worker::process::<P, S>(source, chunk, config.keys);
                    if result.is_err() {
                        failed.store(true, Ordering::Relaxed);
                    }
                    // Blocks only while the merger is busy. An error means the
                    // merger panicked, which the join below reports.
                    let _ = deliveries.send(result);
                    drop(permit);
                });
                dispatched += 1;
            }
            Ok(dispatched)
        });

        drop(deliveries);
        let merged = merger.join().map_err(|_| Error::MergerPanicked)?;
        let dispatched = planned?;
        let table = merged?;
        debug_assert_eq!(table.chunks(), dispatched);
        debug!(chunks = dispatched, keys = table.len(), "aggregation complete");
        Ok(table)
    })
}

/// Worker-to-merger channel holding at most one finished map per worker slot.
fn delivery_channel<V>(workers: NonZeroUsize) -> (Sender<Delivery<V>>, Receiver<Delivery<V>>) {
    bounded(workers.get())
}
