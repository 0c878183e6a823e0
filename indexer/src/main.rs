use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use filmrec_core::persist::{load_meta, load_snapshot_if_fresh, save_snapshot, timestamp_now, IndexPaths, MetaFile};
use filmrec_core::{Catalog, Recommender, TfIdfIndex, Tokenizer, Weighting, DEFAULT_TOP_K};
use std::sync::Arc;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "filmrec-indexer")]
#[command(about = "Build and inspect TF-IDF index snapshots for the movie catalog", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build an index snapshot from a dataset file or directory
    Build {
        /// Dataset path (.json / .jsonl file or directory)
        #[arg(long)]
        dataset: String,
        /// Output index directory
        #[arg(long)]
        output: String,
        /// Stem tokens with the English Snowball stemmer
        #[arg(long, default_value_t = false)]
        stem: bool,
        /// Use 1 + ln(tf) instead of the raw term count
        #[arg(long, default_value_t = false)]
        sublinear_tf: bool,
        /// Use ln(N/df) instead of the smoothed ln((1+N)/(1+df)) + 1
        #[arg(long, default_value_t = false)]
        raw_idf: bool,
    },
    /// Print snapshot metadata
    Stats {
        /// Index directory
        #[arg(long)]
        index: String,
    },
    /// Recommend titles similar to one in the dataset
    Recommend {
        #[arg(long)]
        dataset: String,
        /// Reuse this snapshot when it matches the dataset
        #[arg(long)]
        index: Option<String>,
        #[arg(long)]
        title: String,
        #[arg(long, default_value_t = DEFAULT_TOP_K)]
        k: usize,
    },
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Build { dataset, output, stem, sublinear_tf, raw_idf } => {
            let weighting = Weighting { sublinear_tf, smooth_idf: !raw_idf };
            build_snapshot(&dataset, &output, Tokenizer::with_stemming(stem), weighting)
        }
        Commands::Stats { index } => {
            let meta = load_meta(&IndexPaths::new(&index))?;
            println!("{}", serde_json::to_string_pretty(&meta)?);
            Ok(())
        }
        Commands::Recommend { dataset, index, title, k } => recommend(&dataset, index.as_deref(), &title, k),
    }
}

fn build_snapshot(dataset: &str, output: &str, tokenizer: Tokenizer, weighting: Weighting) -> Result<()> {
    let catalog = Catalog::load(dataset)?;
    if catalog.is_empty() {
        bail!("dataset {dataset} has no records");
    }
    let index = TfIdfIndex::build(&catalog.documents(), tokenizer, weighting);
    let meta = MetaFile::describe(&index, catalog.fingerprint(), timestamp_now());
    save_snapshot(&IndexPaths::new(output), &index, &meta)?;
    tracing::info!(output, num_docs = meta.num_docs, num_terms = meta.num_terms, "index build complete");
    Ok(())
}

fn recommend(dataset: &str, index: Option<&str>, title: &str, k: usize) -> Result<()> {
    let catalog = Arc::new(Catalog::load(dataset)?);
    let mut recommender = Recommender::new(Arc::clone(&catalog)).with_top_k(k);
    if let Some(dir) = index {
        match load_snapshot_if_fresh(&IndexPaths::new(dir), catalog.fingerprint())? {
            Some((snapshot, _)) => recommender = recommender.with_index(snapshot)?,
            None => tracing::warn!(index = dir, "snapshot does not match dataset, building in memory"),
        }
    }
    for (rank, rec) in recommender.recommend_scored(title, k)?.iter().enumerate() {
        println!("{:>2}. {:.4}  {}", rank + 1, rec.score, rec.title);
    }
    Ok(())
}
