use crate::tokenizer::Tokenizer;
use crate::{Error, Position, Result, TermId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Sparse row: `(term, weight)` pairs sorted by term id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SparseVector {
    entries: Vec<(TermId, f32)>,
}

impl SparseVector {
    /// Builds a vector from unordered entries, dropping zero weights.
    pub fn from_entries(mut entries: Vec<(TermId, f32)>) -> Self {
        entries.retain(|(_, w)| *w != 0.0);
        entries.sort_by_key(|(t, _)| *t);
        Self { entries }
    }

    pub fn entries(&self) -> &[(TermId, f32)] { &self.entries }

    pub fn is_zero(&self) -> bool { self.entries.is_empty() }

    pub fn norm(&self) -> f32 {
        self.entries.iter().map(|(_, w)| w * w).sum::<f32>().sqrt()
    }

    /// Merge-join dot product. Summation runs in term order, so `a.dot(b) == b.dot(a)` exactly.
    pub fn dot(&self, other: &SparseVector) -> f32 {
        let (a, b) = (&self.entries, &other.entries);
        let (mut i, mut j) = (0, 0);
        let mut sum = 0.0f32;
        while i < a.len() && j < b.len() {
            match a[i].0.cmp(&b[j].0) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    sum += a[i].1 * b[j].1;
                    i += 1;
                    j += 1;
                }
            }
        }
        sum
    }

    fn normalize(&mut self) {
        let norm = self.norm();
        if norm > 0.0 {
            for (_, w) in self.entries.iter_mut() { *w /= norm; }
        }
    }
}

/// How raw counts become weights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Weighting {
    /// `1 + ln(tf)` instead of the raw count.
    pub sublinear_tf: bool,
    /// `ln((1 + N) / (1 + df)) + 1` instead of `ln(N / df)`.
    pub smooth_idf: bool,
}

impl Default for Weighting {
    fn default() -> Self {
        Self { sublinear_tf: false, smooth_idf: true }
    }
}

impl Weighting {
    pub fn tf(&self, raw: u32) -> f32 {
        if raw == 0 {
            0.0
        } else if self.sublinear_tf {
            1.0 + (raw as f32).ln()
        } else {
            raw as f32
        }
    }

    pub fn idf(&self, num_docs: u32, df: u32) -> f32 {
        let n = num_docs as f32;
        if self.smooth_idf {
            ((1.0 + n) / (1.0 + df as f32)).ln() + 1.0
        } else {
            (n.max(1.0) / (df.max(1) as f32)).ln()
        }
    }
}

/// TF-IDF matrix over a frozen vocabulary, one L2-normalized row per document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TfIdfIndex {
    pub dictionary: HashMap<String, TermId>,
    pub df: Vec<u32>,
    pub idf: Vec<f32>,
    pub rows: Vec<SparseVector>,
    pub num_docs: u32,
    pub tokenizer: Tokenizer,
    pub weighting: Weighting,
}

impl TfIdfIndex {
    pub fn build<S: AsRef<str>>(documents: &[S], tokenizer: Tokenizer, weighting: Weighting) -> Self {
        let start = std::time::Instant::now();
        let mut dictionary: HashMap<String, TermId> = HashMap::new();
        let mut df: Vec<u32> = Vec::new();
        let mut counts: Vec<HashMap<TermId, u32>> = Vec::with_capacity(documents.len());

        for doc in documents {
            let mut tf_counts: HashMap<TermId, u32> = HashMap::new();
            for term in tokenizer.tokenize(doc.as_ref()) {
                let next_id = dictionary.len() as TermId;
                let tid = *dictionary.entry(term).or_insert_with(|| {
                    df.push(0);
                    next_id
                });
                let count = tf_counts.entry(tid).or_insert(0);
                if *count == 0 {
                    df[tid as usize] += 1;
                }
                *count += 1;
            }
            counts.push(tf_counts);
        }

        let num_docs = documents.len() as u32;
        let idf: Vec<f32> = df.iter().map(|&d| weighting.idf(num_docs, d)).collect();

        let rows = counts
            .into_iter()
            .map(|tf_counts| {
                let entries = tf_counts
                    .into_iter()
                    .map(|(tid, raw)| (tid, weighting.tf(raw) * idf[tid as usize]))
                    .collect();
                let mut row = SparseVector::from_entries(entries);
                row.normalize();
                row
            })
            .collect();

        tracing::info!(
            num_docs,
            num_terms = dictionary.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "tf-idf index built"
        );
        Self { dictionary, df, idf, rows, num_docs, tokenizer, weighting }
    }

    pub fn len(&self) -> usize { self.rows.len() }

    pub fn is_empty(&self) -> bool { self.rows.is_empty() }

    pub fn vocabulary_len(&self) -> usize { self.dictionary.len() }

    pub fn vector_of(&self, position: Position) -> Result<&SparseVector> {
        self.rows
            .get(position)
            .ok_or(Error::OutOfRange { position, len: self.rows.len() })
    }

    pub fn vectors(&self) -> &[SparseVector] { &self.rows }
}
