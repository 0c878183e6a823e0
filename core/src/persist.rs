use crate::index::{TfIdfIndex, Weighting};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::{create_dir_all, File};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetaFile {
    pub num_docs: u32,
    pub num_terms: u32,
    pub created_at: String,
    pub version: u32,
    /// Fingerprint of the dataset the index was built from.
    pub fingerprint: String,
    pub stemming: bool,
    pub weighting: Weighting,
}

impl MetaFile {
    pub fn describe(index: &TfIdfIndex, fingerprint: &str, created_at: String) -> Self {
        Self {
            num_docs: index.num_docs,
            num_terms: index.vocabulary_len() as u32,
            created_at,
            version: SNAPSHOT_VERSION,
            fingerprint: fingerprint.to_string(),
            stemming: index.tokenizer.stem,
            weighting: index.weighting,
        }
    }
}

pub struct IndexPaths {
    pub root: PathBuf,
}

impl IndexPaths {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self { root: root.as_ref().to_path_buf() }
    }
    fn index(&self) -> PathBuf { self.root.join("index.bin") }
    fn meta(&self) -> PathBuf { self.root.join("meta.json") }
}

pub fn save_index(paths: &IndexPaths, index: &TfIdfIndex) -> Result<()> {
    create_dir_all(&paths.root)?;
    let f = File::create(paths.index())?;
    let mut w = BufWriter::new(f);
    bincode::serialize_into(&mut w, index)?;
    w.flush()?;
    Ok(())
}

pub fn load_index(paths: &IndexPaths) -> Result<TfIdfIndex> {
    let f = File::open(paths.index()).with_context(|| format!("opening {}", paths.index().display()))?;
    let index = bincode::deserialize_from(BufReader::new(f))?;
    Ok(index)
}

pub fn save_meta(paths: &IndexPaths, meta: &MetaFile) -> Result<()> {
    create_dir_all(&paths.root)?;
    let mut f = File::create(paths.meta())?;
    let json = serde_json::to_string_pretty(meta)?;
    f.write_all(json.as_bytes())?;
    Ok(())
}

pub fn load_meta(paths: &IndexPaths) -> Result<MetaFile> {
    let mut f = File::open(paths.meta()).with_context(|| format!("opening {}", paths.meta().display()))?;
    let mut buf = String::new();
    f.read_to_string(&mut buf)?;
    let meta: MetaFile = serde_json::from_str(&buf)?;
    Ok(meta)
}

pub fn save_snapshot(paths: &IndexPaths, index: &TfIdfIndex, meta: &MetaFile) -> Result<()> {
    save_index(paths, index)?;
    save_meta(paths, meta)?;
    tracing::info!(root = %paths.root.display(), num_docs = meta.num_docs, "index snapshot written");
    Ok(())
}

/// Loads a snapshot only if it was built from the dataset with `fingerprint`.
/// Returns `Ok(None)` for a missing, stale, or foreign-version snapshot.
pub fn load_snapshot_if_fresh(paths: &IndexPaths, fingerprint: &str) -> Result<Option<(TfIdfIndex, MetaFile)>> {
    if !paths.meta().is_file() {
        return Ok(None);
    }
    let meta = load_meta(paths)?;
    if meta.version != SNAPSHOT_VERSION || meta.fingerprint != fingerprint {
        tracing::info!(snapshot = %meta.fingerprint, dataset = %fingerprint, "index snapshot is stale");
        return Ok(None);
    }
    let index = load_index(paths)?;
    if index.num_docs != meta.num_docs {
        anyhow::bail!("snapshot at {} is inconsistent: meta says {} docs, index has {}", paths.root.display(), meta.num_docs, index.num_docs);
    }
    Ok(Some((index, meta)))
}

/// RFC 3339 timestamp for `MetaFile::created_at`.
pub fn timestamp_now() -> String {
    time::OffsetDateTime::now_utc()
        .format(&time::format_description::well_known::Rfc3339)
        .unwrap_or_default()
}
