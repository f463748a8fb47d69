use crossbeam_channel::Receiver;
use tracing::{debug, warn};

use crate::aggregate::Measure;
use crate::error::Result;
use crate::table::{GlobalTable, LocalMap};

/// What a worker hands to the merger: its local map, or the fatal error that
/// stopped it.
pub type Delivery<V> = Result<LocalMap<V>>;

/// Single consumer that folds local maps into the global table.
pub struct Merger<V> {
    table: GlobalTable<V>,
}

impl<V: Measure> Default for Merger<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Measure> Merger<V> {
    pub fn new() -> Self {
        Self {
            table: GlobalTable::new(),
        }
    }

    /// Consumes deliveries in arrival order until every sender is dropped
    /// and the channel is empty. After the first error, later local maps are
    /// drained but discarded and the error is returned.
    pub fn drain(mut self, deliveries: Receiver<Delivery<V>>) -> Result<GlobalTable<V>> {
        let mut failure = None;
        for delivery in deliveries {
            match delivery {
                Ok(local) if failure.is_none() => {
                    let keys = local.len();
                    self.table.absorb(local);
                    debug!(keys, merged = self.table.chunks(), "merged local map");
                }
                Ok(_) => {}
                Err(e) => {
                    warn!(error = %e, "worker failed");
                    failure.get_or_insert(e);
                }
            }
        }
        match failure {
            Some(e) => Err(e),
            None => Ok(self.table),
        }
    }
}
