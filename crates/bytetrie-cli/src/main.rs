// crates/bytetrie-cli/src/main.rs

#![forbid(unsafe_code)]
#![deny(
    rust_2018_idioms,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo
)]

use anyhow::{bail, Context, Result};
use bytetrie_core::{
    io::{ensure_parent_dir, load_trie, save_trie},
    io_jsonl::{build_trie_from_jsonl, stream_jsonl},
    DiffEntry, NodeCache, NodeId,
};
use bytetrie_partition::{
    create_traversal_tasks, reachable_states, run_task, PartitionConfig, PartitionError,
    TraversalTask, DEFAULT_ANYFIELD, DEFAULT_MAX_PREFIX_DEPTH, DEFAULT_SPLIT_THRESHOLD,
};
use clap::{Parser, Subcommand};
use rayon::prelude::*;
use serde::Serialize;
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Accept payload used by the CLI: free text such as a mnemonic.
type Info = String;

#[derive(Parser, Debug)]
#[command(
    name = "bytetrie",
    about = "Byte-sequence automaton toolkit",
    long_about = "Byte-sequence automaton toolkit.\n\nBuild compressed tries from sequence lists, compare them, and split exhaustive enumeration into parallel tasks.",
    version = env!("CARGO_PKG_VERSION"),
    disable_help_subcommand = true
)]
struct Cli {
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Build a trie from a JSONL sequence list (`{"seq": [..], "info": ".."}` per line)
    Build {
        /// Input sequence list (JSONL)
        #[arg(long)]
        input: PathBuf,

        /// Output trie (JSON/CBOR by extension)
        #[arg(long, default_value = "trie.cbor")]
        out: PathBuf,

        /// Keep the uncompressed tree instead of hash-consing it
        #[arg(long, default_value_t = false)]
        no_compress: bool,
    },

    /// Print node and sequence counts of a persisted trie
    Stats {
        /// Trie file (JSON/CBOR)
        #[arg(long)]
        trie: PathBuf,
    },

    /// Print every sequence whose accept info differs between two tries
    Diff {
        /// Old trie (JSON/CBOR)
        #[arg(long)]
        before: PathBuf,

        /// New trie (JSON/CBOR)
        #[arg(long)]
        after: PathBuf,

        /// Expected differences (JSONL); fail unless the observed set matches
        #[arg(long)]
        expected: Option<PathBuf>,
    },

    /// Merge two tries into one; fails on conflicting accept info
    Union {
        /// First trie (JSON/CBOR)
        #[arg(long)]
        a: PathBuf,

        /// Second trie (JSON/CBOR)
        #[arg(long)]
        b: PathBuf,

        /// Output trie (JSON/CBOR by extension)
        #[arg(long, default_value = "union.cbor")]
        out: PathBuf,
    },

    /// Partition exhaustive traversal into independent prefix tasks
    Tasks {
        /// Trie file (JSON/CBOR)
        #[arg(long)]
        trie: PathBuf,

        #[command(flatten)]
        split: SplitArgs,

        /// Output plan (JSON); stdout if omitted
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Enumerate minimal accepted byte sequences as hex, one per line
    Enumerate {
        /// Trie file (JSON/CBOR)
        #[arg(long)]
        trie: PathBuf,

        #[command(flatten)]
        split: SplitArgs,

        /// Worker threads running the partition plan (>0)
        #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u16).range(1..))]
        jobs: u16,

        /// Representative byte for the first wildcard on a path
        #[arg(long, default_value_t = DEFAULT_ANYFIELD)]
        anyfield: u8,

        /// Output file; stdout if omitted
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

#[derive(clap::Args, Debug, Clone, Copy)]
struct SplitArgs {
    /// Split a branch only if it has at least this many suffixes
    #[arg(long, env = "BYTETRIE_SPLIT_THRESHOLD", default_value_t = DEFAULT_SPLIT_THRESHOLD)]
    split_threshold: u64,

    /// Maximum task prefix length (>0)
    #[arg(long, default_value_t = DEFAULT_MAX_PREFIX_DEPTH, value_parser = parse_depth)]
    max_depth: usize,
}

impl From<SplitArgs> for PartitionConfig {
    fn from(a: SplitArgs) -> Self {
        Self {
            split_threshold: a.split_threshold,
            max_prefix_depth: a.max_depth,
        }
    }
}

/// Partition plan as written by `tasks`.
#[derive(Serialize, Debug)]
struct Plan<'a> {
    config: PartitionConfig,
    states: usize,
    tasks: &'a [TraversalTask],
}

fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    match cli.cmd {
        Cmd::Build {
            input,
            out,
            no_compress,
        } => build(&input, &out, no_compress),

        Cmd::Stats { trie } => stats(&trie),

        Cmd::Diff {
            before,
            after,
            expected,
        } => diff(&before, &after, expected.as_deref()),

        Cmd::Union { a, b, out } => union(&a, &b, &out),

        Cmd::Tasks { trie, split, out } => tasks(&trie, split.into(), out.as_deref()),

        Cmd::Enumerate {
            trie,
            split,
            jobs,
            anyfield,
            out,
        } => enumerate(&trie, split.into(), usize::from(jobs), anyfield, out.as_deref()),
    }
}

fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let fmt_layer = fmt::layer()
        .with_target(false)
        .with_level(true)
        .with_writer(std::io::stderr)
        .compact();

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}

fn parse_depth(s: &str) -> std::result::Result<usize, String> {
    match s.parse::<usize>() {
        Ok(0) => Err("max depth must be at least 1".into()),
        Ok(d) => Ok(d),
        Err(e) => Err(e.to_string()),
    }
}

/// Open `path` for writing (creating parents), or stdout when absent.
fn open_output(path: Option<&Path>) -> Result<BufWriter<Box<dyn Write>>> {
    let sink: Box<dyn Write> = match path {
        Some(p) => {
            ensure_parent_dir(p)?;
            Box::new(File::create(p).with_context(|| format!("create {}", p.display()))?)
        }
        None => Box::new(std::io::stdout().lock()),
    };
    Ok(BufWriter::new(sink))
}

fn load(cache: &mut NodeCache<Info>, path: &Path) -> Result<NodeId> {
    load_trie(cache, path).with_context(|| format!("loading trie {}", path.display()))
}

fn build(input: &Path, out: &Path, no_compress: bool) -> Result<()> {
    info!(input=%input.display(), out=%out.display(), no_compress, "building trie");
    let mut cache = NodeCache::<Info>::new();
    let mut root = build_trie_from_jsonl(&mut cache, input)?;
    let raw = cache.unique_nodes(root);
    if !no_compress {
        root = cache.compress(root).context("compressing trie")?;
    }
    let nodes = cache.unique_nodes(root);

    save_trie(&cache, root, out)?;
    println!(
        "Built {} sequences: {raw} nodes → {nodes} nodes → {}",
        cache.accept_sequences(root).len(),
        out.display()
    );
    Ok(())
}

fn stats(trie: &Path) -> Result<()> {
    info!(trie=%trie.display(), "reading trie");
    let mut cache = NodeCache::<Info>::new();
    let root = load(&mut cache, trie)?;

    println!("root:      {root}");
    println!("nodes:     {}", cache.unique_nodes(root));
    println!("sequences: {}", cache.accept_sequences(root).len());
    Ok(())
}

fn diff(before: &Path, after: &Path, expected: Option<&Path>) -> Result<()> {
    info!(before=%before.display(), after=%after.display(), "diffing tries");
    let mut cache = NodeCache::<Info>::new();
    let a = load(&mut cache, before)?;
    let b = load(&mut cache, after)?;

    let mut w = open_output(None)?;
    let mut observed: HashSet<DiffEntry<Info>> = HashSet::new();
    for entry in cache.diff(a, b, &[]) {
        serde_json::to_writer(&mut w, &entry).context("serialize diff entry")?;
        w.write_all(b"\n")?;
        observed.insert(entry);
    }
    w.flush()?;

    let Some(expected) = expected else {
        return Ok(());
    };
    let mut want: HashSet<DiffEntry<Info>> = HashSet::new();
    for item in stream_jsonl::<DiffEntry<Info>, _>(expected)? {
        want.insert(item.with_context(|| format!("reading {}", expected.display()))?);
    }
    let missing = want.difference(&observed).count();
    let unexpected = observed.difference(&want).count();
    if missing > 0 || unexpected > 0 {
        bail!(
            "diff does not match {}: {missing} expected entries missing, {unexpected} unexpected",
            expected.display()
        );
    }
    eprintln!("OK: {} entries match {}", observed.len(), expected.display());
    Ok(())
}

fn union(a: &Path, b: &Path, out: &Path) -> Result<()> {
    info!(a=%a.display(), b=%b.display(), out=%out.display(), "merging tries");
    let mut cache = NodeCache::<Info>::new();
    let ra = load(&mut cache, a)?;
    let rb = load(&mut cache, b)?;
    let root = cache
        .union(ra, rb)
        .with_context(|| format!("merging {} into {}", b.display(), a.display()))?;

    save_trie(&cache, root, out)?;
    println!(
        "Merged {} + {} → {} nodes → {}",
        a.display(),
        b.display(),
        cache.unique_nodes(root),
        out.display()
    );
    Ok(())
}

/// Load a trie and compute its partition plan over all reachable states.
fn plan(
    trie: &Path,
    config: &PartitionConfig,
) -> Result<(NodeCache<Info>, Vec<NodeId>, Vec<TraversalTask>)> {
    let mut cache = NodeCache::<Info>::new();
    let root = load(&mut cache, trie)?;
    let states = reachable_states(&cache, root);
    let tasks = create_traversal_tasks(&cache, &states, 0, config).context("partitioning")?;
    Ok((cache, states, tasks))
}

fn tasks(trie: &Path, config: PartitionConfig, out: Option<&Path>) -> Result<()> {
    info!(trie=%trie.display(), ?config, "partitioning traversal");
    let (_, states, tasks) = plan(trie, &config)?;

    let mut w = open_output(out)?;
    let doc = Plan {
        config,
        states: states.len(),
        tasks: &tasks,
    };
    serde_json::to_writer_pretty(&mut w, &doc).context("serialize plan")?;
    w.write_all(b"\n")?;
    w.flush()?;

    if let Some(p) = out {
        eprintln!("Wrote {} tasks → {}", tasks.len(), p.display());
    }
    Ok(())
}

fn enumerate(
    trie: &Path,
    config: PartitionConfig,
    jobs: usize,
    anyfield: u8,
    out: Option<&Path>,
) -> Result<()> {
    info!(trie=%trie.display(), ?config, jobs, anyfield, "enumerating sequences");
    let (cache, states, tasks) = plan(trie, &config)?;

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(jobs)
        .build()
        .context("building enumeration thread pool")?;
    // Indexed collect keeps the per-task results in plan order.
    let results: Vec<Vec<Vec<u8>>> = pool.install(|| {
        tasks
            .par_iter()
            .map(|t| {
                let mut found = Vec::new();
                run_task(&cache, &states, t, anyfield, |p| found.push(p.to_vec()))?;
                Ok(found)
            })
            .collect::<std::result::Result<_, PartitionError>>()
    })?;

    let mut w = open_output(out)?;
    let mut n = 0usize;
    for seq in results.iter().flatten() {
        writeln!(w, "{}", hex::encode(seq))?;
        n += 1;
    }
    w.flush()?;

    eprintln!("Enumerated {n} sequences in {} tasks", tasks.len());
    Ok(())
}
