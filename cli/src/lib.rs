//! Command-line driver for precision@k evaluation and similar-image queries.
//!
//! Reads an [`EmbeddingSnapshot`] produced by an image encoder, builds the
//! index, and prints results. Mapping rows back to image names is done here,
//! using the snapshot's optional `names` list.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use imgsim_index::{EmbeddingSnapshot, RankedNeighbor};
use imgsim_retrieval::{RetrievalConfig, RetrievalEvaluator};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

#[derive(Parser, Debug)]
#[command(
    name = "imgsim",
    about = "Evaluate and query image embedding retrieval",
    version
)]
pub struct Cli {
    /// Enable debug logging.
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Leave-one-out precision@k over every item in a snapshot.
    Eval {
        #[command(flatten)]
        common: CommonArgs,

        /// Print precision for each label.
        #[arg(long)]
        per_label: bool,
    },

    /// Show the items most similar to one query item.
    Similar {
        #[command(flatten)]
        common: CommonArgs,

        /// Row of the query item.
        #[arg(long, conflicts_with = "random", required_unless_present = "random")]
        index: Option<usize>,

        /// Pick the query item at random.
        #[arg(long)]
        random: bool,

        /// Seed for `--random`.
        #[arg(long, requires = "random")]
        seed: Option<u64>,
    },
}

#[derive(Args, Debug)]
pub struct CommonArgs {
    /// JSON snapshot with `embeddings` and optional `labels` / `names`.
    pub snapshot: PathBuf,

    /// Number of neighbors (overrides the config file).
    #[arg(short)]
    pub k: Option<usize>,

    /// TOML configuration file.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Print machine-readable JSON instead of text.
    #[arg(long)]
    pub json: bool,
}

impl CommonArgs {
    fn load_config(&self) -> Result<RetrievalConfig> {
        let config = match &self.config {
            Some(path) => RetrievalConfig::load(path)
                .with_context(|| format!("failed to load config {}", path.display()))?,
            None => RetrievalConfig::default(),
        };
        debug!("Using config: {config:?}");
        Ok(config)
    }
}

fn load_snapshot(path: &Path) -> Result<EmbeddingSnapshot> {
    EmbeddingSnapshot::load(path)
        .with_context(|| format!("failed to load snapshot {}", path.display()))
}

/// Run a parsed command, writing its report to `out`.
pub fn run(cli: Cli, out: &mut impl Write) -> Result<()> {
    match cli.command {
        Command::Eval { common, per_label } => run_eval(&common, per_label, out),
        Command::Similar {
            common,
            index,
            random,
            seed,
        } => {
            let query = match (index, random) {
                (Some(index), _) => QuerySelection::Index(index),
                (None, true) => QuerySelection::Random(seed),
                (None, false) => bail!("either --index or --random is required"),
            };
            run_similar(&common, query, out)
        }
    }
}

fn run_eval(common: &CommonArgs, per_label: bool, out: &mut impl Write) -> Result<()> {
    let mut config = common.load_config()?;
    if let Some(k) = common.k {
        config = config.with_k(k);
    }
    config.validate()?;

    let index = load_snapshot(&common.snapshot)?.into_index()?;
    let evaluator = RetrievalEvaluator::new(&index);
    let report = evaluator.evaluate(config.k)?;

    if common.json {
        writeln!(out, "{}", serde_json::to_string_pretty(&report)?)?;
        return Ok(());
    }

    writeln!(out, "Precision@{}: {:.2}%", report.k, report.precision * 100.0)?;
    if per_label {
        writeln!(out, "{:<20} {:>6} {:>10}", "label", "items", "precision")?;
        for entry in &report.per_label {
            writeln!(
                out,
                "{:<20} {:>6} {:>9.2}%",
                entry.label.to_string(),
                entry.items,
                entry.precision * 100.0
            )?;
        }
    }
    Ok(())
}

/// How the query item of `similar` is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuerySelection {
    Index(usize),
    Random(Option<u64>),
}

impl QuerySelection {
    fn resolve(self, len: usize) -> usize {
        match self {
            QuerySelection::Index(index) => index,
            QuerySelection::Random(Some(seed)) => StdRng::seed_from_u64(seed).random_range(0..len),
            QuerySelection::Random(None) => rand::rng().random_range(0..len),
        }
    }
}

fn run_similar(common: &CommonArgs, query: QuerySelection, out: &mut impl Write) -> Result<()> {
    let mut config = common.load_config()?;
    if let Some(k) = common.k {
        config = config.with_query_k(k);
    }
    config.validate()?;

    let snapshot = load_snapshot(&common.snapshot)?;
    let names = snapshot.names.clone();
    let index = snapshot.into_index()?;
    let evaluator = RetrievalEvaluator::new(&index);

    let query_index = query.resolve(index.len());
    info!("Querying item {query_index}");

    let display = |row: usize| -> String {
        names
            .as_ref()
            .and_then(|names| names.get(row))
            .cloned()
            .unwrap_or_else(|| format!("#{row}"))
    };

    let neighbors: Vec<RankedNeighbor> = evaluator
        .find_similar(query_index, config.query_k)?
        .into_iter()
        .filter(|neighbor| config.min_score.is_none_or(|min| neighbor.score >= min))
        .collect();

    if common.json {
        writeln!(out, "{}", serde_json::to_string_pretty(&neighbors)?)?;
        return Ok(());
    }

    writeln!(out, "Query: {query_index} {}", display(query_index))?;
    for (rank, neighbor) in neighbors.iter().enumerate() {
        writeln!(
            out,
            "Rank {}: {} {} {:.4}",
            rank + 1,
            neighbor.index,
            display(neighbor.index),
            neighbor.score
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_eval() {
        let cli = Cli::try_parse_from(["imgsim", "eval", "snap.json", "-k", "3", "--per-label"])
            .unwrap();
        match cli.command {
            Command::Eval { common, per_label } => {
                assert_eq!(common.snapshot, PathBuf::from("snap.json"));
                assert_eq!(common.k, Some(3));
                assert!(per_label);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_similar_needs_a_query() {
        assert!(Cli::try_parse_from(["imgsim", "similar", "snap.json"]).is_err());
        assert!(
            Cli::try_parse_from(["imgsim", "similar", "snap.json", "--index", "1", "--random"])
                .is_err()
        );
        assert!(Cli::try_parse_from(["imgsim", "similar", "snap.json", "--random"]).is_ok());
    }

    #[test]
    fn test_seeded_random_is_stable() {
        let first = QuerySelection::Random(Some(42)).resolve(100);
        let second = QuerySelection::Random(Some(42)).resolve(100);
        assert_eq!(first, second);
        assert!(first < 100);
    }
}
