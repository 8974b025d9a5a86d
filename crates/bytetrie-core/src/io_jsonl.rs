//! JSON Lines (NDJSON) helpers for sequence lists and diff reports.
//!
//! Each line is one JSON object. Sequence lists use [`SequenceRecord`]:
//!
//! ```text
//! {"seq": [15, 5], "info": "syscall"}
//! {"seq": [232, "*"], "info": "call"}
//! ```
//!
//! - **Reader**: an iterator that *owns* its buffered file, yielding
//!   `Result<T>` per line so callers see per-line errors with line numbers.
//! - **Writer**: `serde_json::to_writer` per item, no intermediate strings.
//!
//! We treat both `.jsonl` and `.ndjson` as equivalent line-delimited JSON.

use crate::{AcceptInfo, NodeCache, NodeId, Symbol};
use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::marker::PhantomData;
use std::path::Path;

/// One accepted sequence and its payload.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SequenceRecord<I> {
    /// Symbols from the root.
    pub seq: Vec<Symbol>,
    /// Accept payload.
    pub info: I,
}

/// Owning JSONL iterator over `T`.
///
/// Holds the file and buffered reader internally to avoid lifetime pitfalls
/// of returning a borrowed `Lines<'_>` iterator.
pub struct JsonlIter<T> {
    rdr: BufReader<File>,
    buf: String,
    line_no: usize,
    _item: PhantomData<fn() -> T>,
}

impl<T> JsonlIter<T> {
    fn new(file: File) -> Self {
        Self {
            rdr: BufReader::new(file),
            buf: String::with_capacity(8 << 10),
            line_no: 0,
            _item: PhantomData,
        }
    }
}

impl<T: DeserializeOwned> Iterator for JsonlIter<T> {
    type Item = Result<T>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            self.buf.clear();
            match self.rdr.read_line(&mut self.buf) {
                Ok(0) => return None,
                Ok(_) => {
                    self.line_no += 1;
                    let line = self.buf.trim_end_matches(['\n', '\r']);
                    // Blank lines separate nothing; skip them.
                    if line.trim().is_empty() {
                        continue;
                    }
                    return Some(
                        serde_json::from_str(line)
                            .with_context(|| format!("parse jsonl line {}", self.line_no)),
                    );
                }
                Err(e) => {
                    return Some(
                        Err(e).with_context(|| format!("read line {}", self.line_no + 1)),
                    )
                }
            }
        }
    }
}

/// Stream read: one JSON object per line, parsed lazily.
///
/// # Errors
/// Opening the file may fail. Individual items are `Err` if a line is malformed.
pub fn stream_jsonl<T, P>(path: P) -> Result<JsonlIter<T>>
where
    T: DeserializeOwned,
    P: AsRef<Path>,
{
    let f = File::open(path.as_ref())
        .with_context(|| format!("open {}", path.as_ref().display()))?;
    Ok(JsonlIter::new(f))
}

/// Write items as JSON Lines (one object per line).
pub fn write_jsonl<P, T>(path: P, items: &[T]) -> Result<()>
where
    P: AsRef<Path>,
    T: Serialize,
{
    crate::io::ensure_parent_dir(path.as_ref())?;
    let f = File::create(path.as_ref())
        .with_context(|| format!("create {}", path.as_ref().display()))?;
    let mut w = BufWriter::new(f);
    for it in items {
        serde_json::to_writer(&mut w, it).context("serialize jsonl item")?;
        w.write_all(b"\n").context("write newline")?;
    }
    w.flush().context("flush writer")?;
    Ok(())
}

/// Insert every record of a sequence list into a fresh uncompressed trie.
pub fn build_trie_from_jsonl<I, P>(cache: &mut NodeCache<I>, path: P) -> Result<NodeId>
where
    I: AcceptInfo + DeserializeOwned,
    P: AsRef<Path>,
{
    let records = stream_jsonl::<SequenceRecord<I>, _>(path.as_ref())?;
    let empty = cache.empty();
    let mut batch = cache.batch(empty)?;
    for (n, rec) in records.enumerate() {
        let rec = rec?;
        batch
            .insert(&rec.seq, rec.info)
            .with_context(|| format!("inserting record {}", n + 1))?;
    }
    Ok(batch.finish()?)
}
