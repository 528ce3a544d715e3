use crate::config::{ResultsOptions, SearchOptions};
use crate::index::{SearchIndex, DEFAULT_FIELDS, INDEX_VERSION};
use crate::store::{DocumentStore, StoredDoc};
use crate::tokenizer::Pipeline;
use crate::trie::{DocRef, Trie};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One page section to index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub title: String,
    pub body: String,
    #[serde(default)]
    pub breadcrumbs: String,
    pub url: String,
}

pub struct IndexBuilder {
    pipeline: Pipeline,
    tries: Vec<Trie>,
    store: DocumentStore,
    doc_urls: Vec<String>,
    search_options: SearchOptions,
    results_options: ResultsOptions,
}

impl Default for IndexBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl IndexBuilder {
    pub fn new() -> Self {
        Self {
            pipeline: Pipeline::default(),
            tries: DEFAULT_FIELDS.iter().map(|_| Trie::new()).collect(),
            store: DocumentStore::new(true),
            doc_urls: Vec::new(),
            search_options: SearchOptions::default(),
            results_options: ResultsOptions::default(),
        }
    }

    pub fn with_pipeline(mut self, pipeline: Pipeline) -> Self {
        self.pipeline = pipeline;
        self
    }

    pub fn with_search_options(mut self, options: SearchOptions) -> Self {
        self.search_options = options;
        self
    }

    pub fn with_results_options(mut self, options: ResultsOptions) -> Self {
        self.results_options = options;
        self
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Index every field of `doc`; ids are handed out in insertion order.
    pub fn add_document(&mut self, doc: Document) -> DocRef {
        let id = self.doc_urls.len() as DocRef;
        let stored = StoredDoc { id, title: doc.title, body: doc.body, breadcrumbs: doc.breadcrumbs };

        let mut lengths = BTreeMap::new();
        for (field, trie) in DEFAULT_FIELDS.iter().zip(self.tries.iter_mut()) {
            let tokens = self.pipeline.run(stored.field(field).unwrap_or_default());
            lengths.insert(field.to_string(), tokens.len() as u32);

            let mut counts: BTreeMap<String, u32> = BTreeMap::new();
            for token in tokens {
                *counts.entry(token).or_insert(0) += 1;
            }
            for (token, count) in counts {
                trie.insert(&token, id, (count as f64).sqrt());
            }
        }

        self.store.add(stored, lengths);
        self.doc_urls.push(doc.url);
        id
    }

    pub fn build(self) -> SearchIndex {
        tracing::info!(
            docs = self.store.len(),
            tokens = self.tries.iter().map(Trie::token_count).sum::<usize>(),
            "built search index"
        );
        SearchIndex {
            doc_urls: self.doc_urls,
            fields: DEFAULT_FIELDS.iter().map(|f| f.to_string()).collect(),
            tries: self.tries,
            store: self.store,
            pipeline: self.pipeline,
            reference: "id".to_string(),
            version: INDEX_VERSION.to_string(),
            search_options: self.search_options,
            results_options: self.results_options,
        }
    }
}
