use crate::{Error, Position, Result};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use sha1::{Digest, Sha1};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use time::Date;
use walkdir::WalkDir;

time::serde::format_description!(pub(crate) iso_date, Date, "[year]-[month]-[day]");

/// One media title as it appears in the dataset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub title: String,
    #[serde(default)]
    pub genres: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default, with = "iso_date::option")]
    pub release_date: Option<Date>,
    #[serde(default)]
    pub release_year: Option<i32>,
    #[serde(default)]
    pub vote_average: Option<f64>,
    #[serde(default)]
    pub vote_count: Option<f64>,
    #[serde(default)]
    pub actors: Vec<String>,
    #[serde(default)]
    pub director: Option<String>,
    #[serde(default, rename = "return")]
    pub return_ratio: Option<f64>,
    #[serde(default)]
    pub budget: Option<f64>,
    #[serde(default)]
    pub revenue: Option<f64>,
}

impl Item {
    /// Convenience constructor for the fields the recommender reads.
    pub fn new(title: impl Into<String>, genres: impl Into<String>, overview: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            genres: Some(genres.into()),
            overview: Some(overview.into()),
            ..Self::default()
        }
    }

    /// Text fed to the feature index: genres and overview joined by a space.
    pub fn document(&self) -> String {
        format!(
            "{} {}",
            self.genres.as_deref().unwrap_or(""),
            self.overview.as_deref().unwrap_or("")
        )
    }
}

/// Read-only, positionally indexed collection of items.
#[derive(Debug, Clone)]
pub struct Catalog {
    items: Vec<Item>,
    // first position per exact title, and per lowercased title
    by_title: HashMap<String, Position>,
    by_title_lower: HashMap<String, Position>,
    fingerprint: String,
}

impl Catalog {
    pub fn from_items(items: Vec<Item>) -> Self {
        let mut by_title = HashMap::with_capacity(items.len());
        let mut by_title_lower = HashMap::with_capacity(items.len());
        for (pos, item) in items.iter().enumerate() {
            by_title.entry(item.title.clone()).or_insert(pos);
            by_title_lower.entry(item.title.to_lowercase()).or_insert(pos);
        }
        let fingerprint = fingerprint_documents(items.iter().map(Item::document));
        Self { items, by_title, by_title_lower, fingerprint }
    }

    /// Load a dataset from a `.json`/`.jsonl` file or a directory of them.
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let mut files: Vec<PathBuf> = Vec::new();
        if path.is_dir() {
            for entry in WalkDir::new(path).sort_by_file_name().into_iter().filter_map(|e| e.ok()) {
                let p = entry.path();
                if p.is_file() {
                    if let Some(ext) = p.extension().and_then(|s| s.to_str()) {
                        if matches!(ext, "json" | "jsonl") {
                            files.push(p.to_path_buf());
                        }
                    }
                }
            }
        } else if path.is_file() {
            files.push(path.to_path_buf());
        } else {
            anyhow::bail!("dataset path {} does not exist", path.display());
        }

        let mut items = Vec::new();
        for file in files {
            let before = items.len();
            if file.extension().and_then(|s| s.to_str()) == Some("jsonl") {
                read_jsonl(&file, &mut items)?;
            } else {
                read_json(&file, &mut items)?;
            }
            tracing::debug!(file = %file.display(), records = items.len() - before, "read dataset file");
        }
        let catalog = Self::from_items(items);
        tracing::info!(items = catalog.len(), fingerprint = %catalog.fingerprint, "catalog loaded");
        Ok(catalog)
    }

    pub fn len(&self) -> usize { self.items.len() }

    pub fn is_empty(&self) -> bool { self.items.is_empty() }

    pub fn items(&self) -> &[Item] { &self.items }

    /// Exact, case-sensitive title match. Duplicate titles resolve to the first record.
    pub fn resolve_by_title(&self, title: &str) -> Result<Position> {
        self.by_title
            .get(title)
            .copied()
            .ok_or_else(|| Error::NotFound(format!("title not in catalog: {title}")))
    }

    /// Case-insensitive title match, first record wins.
    pub fn resolve_by_title_ignore_case(&self, title: &str) -> Result<Position> {
        self.by_title_lower
            .get(&title.to_lowercase())
            .copied()
            .ok_or_else(|| Error::NotFound(format!("title not in catalog: {title}")))
    }

    pub fn get(&self, position: Position) -> Result<&Item> {
        self.items
            .get(position)
            .ok_or(Error::OutOfRange { position, len: self.items.len() })
    }

    /// Documents for index construction, in position order.
    pub fn documents(&self) -> Vec<String> {
        self.items.iter().map(Item::document).collect()
    }

    /// Dataset version: SHA-1 over every document in position order.
    pub fn fingerprint(&self) -> &str { &self.fingerprint }
}

pub fn fingerprint_documents<I, S>(documents: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut hasher = Sha1::new();
    for doc in documents {
        hasher.update(doc.as_ref().as_bytes());
        hasher.update([0u8]);
    }
    hasher
        .finalize()
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}

fn read_jsonl(file: &Path, items: &mut Vec<Item>) -> anyhow::Result<()> {
    let f = File::open(file).with_context(|| format!("opening {}", file.display()))?;
    let reader = BufReader::new(f);
    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() { continue; }
        let item: Item = serde_json::from_str(&line)
            .with_context(|| format!("{}:{}: invalid record", file.display(), line_no + 1))?;
        items.push(item);
    }
    Ok(())
}

fn read_json(file: &Path, items: &mut Vec<Item>) -> anyhow::Result<()> {
    let f = File::open(file).with_context(|| format!("opening {}", file.display()))?;
    let reader = BufReader::new(f);
    let json: serde_json::Value = serde_json::from_reader(reader)
        .with_context(|| format!("parsing {}", file.display()))?;
    match json {
        serde_json::Value::Array(arr) => {
            for (i, v) in arr.into_iter().enumerate() {
                let item: Item = serde_json::from_value(v)
                    .with_context(|| format!("{}[{i}]: invalid record", file.display()))?;
                items.push(item);
            }
        }
        serde_json::Value::Object(_) => {
            let item: Item = serde_json::from_value(json)
                .with_context(|| format!("{}: invalid record", file.display()))?;
            items.push(item);
        }
        _ => tracing::warn!(file = %file.display(), "skipping non-record JSON"),
    }
    Ok(())
}
