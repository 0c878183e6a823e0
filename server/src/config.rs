use clap::Parser;
use filmrec_core::{Weighting, DEFAULT_TOP_K};
use std::path::PathBuf;
use std::time::Duration;

/// Server settings from flags, falling back to `FILMREC_*` environment variables.
#[derive(Parser, Debug, Clone)]
#[command(name = "filmrec-server")]
#[command(about = "Movie catalog lookups and content-based recommendations over HTTP")]
pub struct Config {
    /// Dataset file (.json / .jsonl) or a directory of them
    #[arg(long, env = "FILMREC_DATASET", default_value = "./data/movies.jsonl")]
    pub dataset: PathBuf,
    /// Index snapshot directory; reused when it matches the dataset, written otherwise
    #[arg(long, env = "FILMREC_INDEX_DIR")]
    pub index: Option<PathBuf>,
    /// Host to bind
    #[arg(long, env = "FILMREC_HOST", default_value = "0.0.0.0")]
    pub host: String,
    /// Port to bind
    #[arg(long, env = "FILMREC_PORT", default_value_t = 8000)]
    pub port: u16,
    /// Number of recommendations per request
    #[arg(long, env = "FILMREC_TOP_K", default_value_t = DEFAULT_TOP_K)]
    pub top_k: usize,
    /// Upper bound on a single recommendation computation, in milliseconds
    #[arg(long, env = "FILMREC_TIMEOUT_MS", default_value_t = 10_000)]
    pub timeout_ms: u64,
    /// Stem tokens with the English Snowball stemmer
    #[arg(long, env = "FILMREC_STEM")]
    pub stem: bool,
    /// Use 1 + ln(tf) instead of the raw term count
    #[arg(long, env = "FILMREC_SUBLINEAR_TF")]
    pub sublinear_tf: bool,
    /// Use ln(N/df) instead of the smoothed ln((1+N)/(1+df)) + 1
    #[arg(long, env = "FILMREC_RAW_IDF")]
    pub raw_idf: bool,
}

impl Config {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn weighting(&self) -> Weighting {
        Weighting { sublinear_tf: self.sublinear_tf, smooth_idf: !self.raw_idf }
    }
}
