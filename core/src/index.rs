use crate::config::{ResultsOptions, SearchOptions};
use crate::error::{IndexError, Result};
use crate::store::{DocumentStore, StoredDoc};
use crate::tokenizer::Pipeline;
use crate::trie::{DocRef, Trie};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const DEFAULT_FIELDS: [&str; 3] = ["title", "body", "breadcrumbs"];
pub const INDEX_VERSION: &str = "0.9.5";

/// Longest token the nested JSON form may carry. Each character is one more
/// level of nesting, so deeper tries are only written as snapshots.
pub const MAX_JSON_TOKEN_CHARS: usize = 256;

/// A loaded documentation search index. Built once, then only read.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchIndex {
    pub(crate) doc_urls: Vec<String>,
    pub(crate) fields: Vec<String>,
    pub(crate) tries: Vec<Trie>, // parallel to `fields`
    pub(crate) store: DocumentStore,
    pub(crate) pipeline: Pipeline,
    pub(crate) reference: String,
    pub(crate) version: String,
    pub(crate) search_options: SearchOptions,
    pub(crate) results_options: ResultsOptions,
}

impl SearchIndex {
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn trie(&self, field: &str) -> Option<&Trie> {
        self.fields.iter().position(|f| f == field).map(|i| &self.tries[i])
    }

    pub(crate) fn field_tries(&self) -> impl Iterator<Item = (&str, &Trie)> {
        self.fields.iter().map(String::as_str).zip(self.tries.iter())
    }

    pub fn store(&self) -> &DocumentStore {
        &self.store
    }

    pub fn document(&self, id: DocRef) -> Option<&StoredDoc> {
        self.store.get(id)
    }

    pub fn url(&self, id: DocRef) -> Option<&str> {
        self.doc_urls.get(id as usize).map(String::as_str)
    }

    pub fn doc_urls(&self) -> &[String] {
        &self.doc_urls
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn search_options(&self) -> &SearchOptions {
        &self.search_options
    }

    pub fn results_options(&self) -> &ResultsOptions {
        &self.results_options
    }

    pub fn check_json_depth(&self) -> Result<()> {
        for (field, trie) in self.field_tries() {
            let depth = trie.depth();
            if depth > MAX_JSON_TOKEN_CHARS {
                return Err(IndexError::invalid(
                    format!("index.index.{field}"),
                    format!("token of {depth} characters is over the {MAX_JSON_TOKEN_CHARS} character JSON limit"),
                ));
            }
        }
        Ok(())
    }

    /// Serialize back into the generator's JSON layout.
    pub fn to_json(&self) -> Value {
        let per_field: Map<String, Value> = self
            .field_tries()
            .map(|(f, t)| (f.to_string(), t.to_json()))
            .collect();
        serde_json::json!({
            "doc_urls": self.doc_urls,
            "index": {
                "documentStore": self.store.to_json(),
                "fields": self.fields,
                "index": per_field,
                "pipeline": self.pipeline.names(),
                "ref": self.reference,
                "version": self.version,
            },
            "results_options": self.results_options,
            "search_options": self.search_options,
        })
    }
}
