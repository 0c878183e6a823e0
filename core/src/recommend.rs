use crate::cache::IndexCache;
use crate::catalog::Catalog;
use crate::index::{TfIdfIndex, Weighting};
use crate::rank::rank;
use crate::tokenizer::Tokenizer;
use crate::{Error, Result};
use std::sync::Arc;

pub const DEFAULT_TOP_K: usize = 5;

#[derive(Debug, Clone, PartialEq)]
pub struct Recommendation {
    pub title: String,
    pub score: f32,
}

/// Content-based recommender over a catalog and its TF-IDF index.
///
/// Built once at startup and shared by all request handlers.
pub struct Recommender {
    catalog: Arc<Catalog>,
    cache: IndexCache,
    tokenizer: Tokenizer,
    weighting: Weighting,
    top_k: usize,
}

impl Recommender {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self {
            catalog,
            cache: IndexCache::new(),
            tokenizer: Tokenizer::default(),
            weighting: Weighting::default(),
            top_k: DEFAULT_TOP_K,
        }
    }

    pub fn with_tokenizer(mut self, tokenizer: Tokenizer) -> Self {
        self.tokenizer = tokenizer;
        self
    }

    pub fn with_weighting(mut self, weighting: Weighting) -> Self {
        self.weighting = weighting;
        self
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// Uses a prebuilt index for the current catalog, adopting its tokenizer and weighting.
    ///
    /// Fails if the index row count disagrees with the catalog.
    pub fn with_index(mut self, index: TfIdfIndex) -> Result<Self> {
        if index.len() != self.catalog.len() {
            return Err(Error::OutOfRange { position: self.catalog.len(), len: index.len() });
        }
        self.tokenizer = index.tokenizer;
        self.weighting = index.weighting;
        self.cache = IndexCache::seeded(index);
        Ok(self)
    }

    pub fn catalog(&self) -> &Arc<Catalog> { &self.catalog }

    pub fn top_k(&self) -> usize { self.top_k }

    pub fn tokenizer(&self) -> Tokenizer { self.tokenizer }

    pub fn weighting(&self) -> Weighting { self.weighting }

    /// The index for the current catalog, built on first use.
    pub fn index(&self) -> Arc<TfIdfIndex> {
        self.cache.get_or_build(|| {
            TfIdfIndex::build(&self.catalog.documents(), self.tokenizer, self.weighting)
        })
    }

    /// Titles of the `top_k` items most similar to `title`, best first.
    pub fn recommend(&self, title: &str) -> Result<Vec<String>> {
        Ok(self.recommend_scored(title, self.top_k)?.into_iter().map(|r| r.title).collect())
    }

    pub fn recommend_scored(&self, title: &str, k: usize) -> Result<Vec<Recommendation>> {
        let position = self.catalog.resolve_by_title(title)?;
        let index = self.index();
        let query = index.vector_of(position).map_err(|e| {
            tracing::error!(%title, position, rows = index.len(), "catalog and index disagree");
            e
        })?;
        let ranked = rank(query, index.vectors(), position, k);
        ranked
            .into_iter()
            .map(|s| {
                let item = self.catalog.get(s.position)?;
                Ok(Recommendation { title: item.title.clone(), score: s.score })
            })
            .collect()
    }

    /// Similarity between the items at two positions.
    pub fn similarity(&self, a: usize, b: usize) -> Result<f32> {
        let index = self.index();
        Ok(crate::rank::cosine(index.vector_of(a)?, index.vector_of(b)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Item;

    fn recommender(items: Vec<Item>) -> Recommender {
        Recommender::new(Arc::new(Catalog::from_items(items)))
    }

    #[test]
    fn index_is_built_once() {
        let r = recommender(vec![Item::new("A", "Action", "x"), Item::new("B", "Action", "y")]);
        assert!(Arc::ptr_eq(&r.index(), &r.index()));
    }

    #[test]
    fn prebuilt_index_settings_are_adopted() {
        let r = recommender(vec![Item::new("A", "Action", "x"), Item::new("B", "Action", "y")]);
        let w = Weighting { sublinear_tf: true, smooth_idf: false };
        let index = TfIdfIndex::build(&r.catalog().documents(), Tokenizer::with_stemming(true), w);
        let r = r.with_index(index).unwrap();
        assert_eq!(r.weighting(), w);
        assert!(r.tokenizer().stem);
        assert_eq!(r.index().weighting, w);
    }

    #[test]
    fn mismatched_index_is_rejected() {
        let r = recommender(vec![Item::new("A", "Action", "x")]);
        let index = TfIdfIndex::build(&["a", "b"], Tokenizer::default(), Weighting::default());
        assert!(matches!(r.with_index(index), Err(Error::OutOfRange { .. })));
    }

    #[test]
    fn scored_results_are_sorted() {
        let r = recommender(vec![
            Item::new("A", "Action", "hero city"),
            Item::new("B", "Action", "hero town"),
            Item::new("C", "Action", "hero city heist"),
            Item::new("D", "Drama", "family"),
        ]);
        let out = r.recommend_scored("A", 3).unwrap();
        assert_eq!(out[0].title, "C");
        assert!(out.windows(2).all(|w| w[0].score >= w[1].score));
    }
}
