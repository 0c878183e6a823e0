pub mod cache;
pub mod catalog;
pub mod error;
pub mod index;
pub mod persist;
pub mod queries;
pub mod rank;
pub mod recommend;
pub mod tokenizer;

pub use cache::IndexCache;
pub use catalog::{Catalog, Item};
pub use error::{Error, Result};
pub use index::{SparseVector, TfIdfIndex, Weighting};
pub use rank::{cosine, rank, Scored};
pub use recommend::{Recommendation, Recommender, DEFAULT_TOP_K};
pub use tokenizer::Tokenizer;

pub type TermId = u32;
/// Row position of an item in the catalog; also the row of its vector in the index.
pub type Position = usize;
