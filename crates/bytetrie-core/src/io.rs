//! Serialization helpers for persisted tries (`TrieDict`).
//!
//! JSON and CBOR read/write utilities with extension-based auto-detection.
//! Unknown/missing extensions are rejected for reads and default to JSON
//! for writes.
//!
//! Extras:
//! - In-memory CBOR helpers: [`to_cbor`] / [`from_cbor`]
//! - Cache-level shortcuts: [`save_trie`] / [`load_trie`], which encode from
//!   and decode into a [`NodeCache`] so reloaded tries stay canonical.

use crate::{AcceptInfo, NodeCache, NodeId, TrieDict};
use anyhow::{anyhow, Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Cursor, Write};
use std::path::Path;

/// Ensure the parent directory for a file exists (no-op if none).
pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() {
            fs::create_dir_all(dir)
                .with_context(|| format!("creating parent directory {}", display(path)))?;
        }
    }
    Ok(())
}

/// ------------------------------
/// TrieDict I/O
/// ------------------------------

/// Read a `TrieDict` from **JSON**.
pub fn read_trie_json<I, P>(path: P) -> Result<TrieDict<I>>
where
    I: DeserializeOwned,
    P: AsRef<Path>,
{
    let path_ref = path.as_ref();
    let f = File::open(path_ref).with_context(|| format!("open {}", display(path_ref)))?;
    let rdr = BufReader::new(f);
    let v: TrieDict<I> =
        serde_json::from_reader(rdr).with_context(|| "deserialize JSON trie dict")?;
    Ok(v)
}

/// Write a `TrieDict` to **JSON** (pretty).
pub fn write_trie_json<I, P>(path: P, v: &TrieDict<I>) -> Result<()>
where
    I: Serialize,
    P: AsRef<Path>,
{
    let path_ref = path.as_ref();
    ensure_parent_dir(path_ref)?;
    let f = File::create(path_ref).with_context(|| format!("create {}", display(path_ref)))?;
    let mut w = BufWriter::new(f);
    serde_json::to_writer_pretty(&mut w, v).with_context(|| "serialize JSON trie dict")?;
    w.flush().with_context(|| "flush JSON writer")?;
    Ok(())
}

/// Read a `TrieDict` from **CBOR**.
pub fn read_trie_cbor<I, P>(path: P) -> Result<TrieDict<I>>
where
    I: DeserializeOwned,
    P: AsRef<Path>,
{
    let path_ref = path.as_ref();
    let f = File::open(path_ref).with_context(|| format!("open {}", display(path_ref)))?;
    let mut rdr = BufReader::new(f);
    let v: TrieDict<I> =
        ciborium::de::from_reader(&mut rdr).with_context(|| "deserialize CBOR trie dict")?;
    Ok(v)
}

/// Write a `TrieDict` to **CBOR**.
pub fn write_trie_cbor<I, P>(path: P, v: &TrieDict<I>) -> Result<()>
where
    I: Serialize,
    P: AsRef<Path>,
{
    let path_ref = path.as_ref();
    ensure_parent_dir(path_ref)?;
    let f = File::create(path_ref).with_context(|| format!("create {}", display(path_ref)))?;
    let mut w = BufWriter::new(f);
    ciborium::ser::into_writer(v, &mut w).with_context(|| "serialize CBOR trie dict")?;
    w.flush().with_context(|| "flush CBOR writer")?;
    Ok(())
}

/// Auto-detect read by extension `.json` / `.cbor` (case-insensitive).
pub fn read_trie_auto<I, P>(path: P) -> Result<TrieDict<I>>
where
    I: DeserializeOwned,
    P: AsRef<Path>,
{
    match ext_lower(path.as_ref()).as_deref() {
        Some("json") => read_trie_json(path),
        Some("cbor") => read_trie_cbor(path),
        Some(other) => Err(anyhow!(
            "unsupported trie extension: {} (supported: .json, .cbor)",
            other
        )),
        None => Err(anyhow!("path has no extension (expected .json or .cbor)")),
    }
}

/// Auto-detect write (defaults to **JSON** if unknown or missing).
pub fn write_trie_auto<I, P>(path: P, v: &TrieDict<I>) -> Result<()>
where
    I: Serialize,
    P: AsRef<Path>,
{
    match ext_lower(path.as_ref()).as_deref() {
        Some("cbor") => write_trie_cbor(path, v),
        _ => write_trie_json(path, v),
    }
}

/// ------------------------------
/// Cache-level shortcuts
/// ------------------------------

/// Encode the trie under `root` and write it (format by extension).
pub fn save_trie<I, P>(cache: &NodeCache<I>, root: NodeId, path: P) -> Result<()>
where
    I: AcceptInfo + Serialize,
    P: AsRef<Path>,
{
    let dict = cache.to_dict(root);
    write_trie_auto(path.as_ref(), &dict)
        .with_context(|| format!("saving trie to {}", display(path.as_ref())))
}

/// Read a persisted trie and decode it into `cache`.
pub fn load_trie<I, P>(cache: &mut NodeCache<I>, path: P) -> Result<NodeId>
where
    I: AcceptInfo + DeserializeOwned,
    P: AsRef<Path>,
{
    let path_ref = path.as_ref();
    let dict: TrieDict<I> = read_trie_auto(path_ref)?;
    cache
        .from_dict(&dict)
        .with_context(|| format!("decoding trie from {}", display(path_ref)))
}

/// ------------------------------
/// In-memory CBOR helpers
/// ------------------------------

/// Serialize any `T: Serialize` to **CBOR bytes** using `ciborium`.
pub fn to_cbor<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    ciborium::ser::into_writer(value, &mut buf).with_context(|| "serialize CBOR (to_cbor)")?;
    Ok(buf)
}

/// Deserialize any `T: DeserializeOwned` from **CBOR bytes** using `ciborium`.
pub fn from_cbor<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    let mut cur = Cursor::new(bytes);
    let v = ciborium::de::from_reader(&mut cur).with_context(|| "deserialize CBOR (from_cbor)")?;
    Ok(v)
}

/// Return the lowercase extension (without dot) if present.
pub(crate) fn ext_lower(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
}

/// Human-friendly path display for error messages.
pub(crate) fn display(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}
