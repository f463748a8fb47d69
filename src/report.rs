use std::io::{self, Write};

use crate::aggregate::Measure;
use crate::table::GlobalTable;

/// Writes one `key\tmin/max/avg` line per key, keys in byte-wise order.
pub fn write_report<V: Measure, W: Write>(table: &GlobalTable<V>, mut out: W) -> io::Result<()> {
    for (key, agg) in table.sorted() {
        out.write_all(key)?;
        writeln!(out, "\t{}", agg.summary())?;
    }
    out.flush()
}
