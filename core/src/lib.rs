pub mod builder;
pub mod config;
pub mod error;
pub mod index;
pub mod loader;
pub mod persist;
pub mod search;
pub mod stemmer;
pub mod store;
pub mod teaser;
pub mod tokenizer;
pub mod trie;

pub use builder::{Document, IndexBuilder};
pub use config::{BoolMode, FieldOptions, ResultsOptions, ScoringModel, SearchOptions};
pub use error::{IndexError, Result};
pub use index::SearchIndex;
pub use search::{Scored, SearchHit, SearchResults};
pub use store::{DocumentStore, StoredDoc};
pub use trie::{DocRef, Trie};
