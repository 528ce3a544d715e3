use crate::config::{BoolMode, ResultsOptions, ScoringModel, SearchOptions};
use crate::index::SearchIndex;
use crate::teaser::{make_teaser, search_terms};
use crate::trie::{DocRef, Trie};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Multiplier applied to matches found through prefix expansion.
const EXPANSION_PENALTY: f64 = 0.15;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Scored {
    pub doc: DocRef,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub doc: DocRef,
    pub score: f64,
    pub url: String,
    pub title: String,
    pub breadcrumbs: String,
    pub teaser: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResults {
    /// Matches before truncation.
    pub total_hits: usize,
    pub hits: Vec<SearchHit>,
}

fn idf(df: u32, num_docs: usize) -> f64 {
    1.0 + (num_docs as f64 / (df as f64 + 1.0)).ln()
}

fn length_norm(len: u32) -> f64 {
    if len == 0 {
        1.0
    } else {
        1.0 / (len as f64).sqrt()
    }
}

fn expansion_penalty(key: &str, token: &str) -> f64 {
    let key_len = key.chars().count() as f64;
    let token_len = token.chars().count() as f64;
    (1.0 - (key_len - token_len) / key_len) * EXPANSION_PENALTY
}

fn merge(acc: HashMap<DocRef, f64>, next: HashMap<DocRef, f64>, mode: BoolMode) -> HashMap<DocRef, f64> {
    match mode {
        BoolMode::Or => {
            let mut acc = acc;
            for (doc, score) in next {
                *acc.entry(doc).or_insert(0.0) += score;
            }
            acc
        }
        BoolMode::And => acc
            .into_iter()
            .filter_map(|(doc, score)| next.get(&doc).map(|s| (doc, score + s)))
            .collect(),
    }
}

impl SearchIndex {
    /// Score `token` in one field, adding into `scores`. Returns the documents
    /// that contain `token` exactly.
    fn score_field(
        &self,
        token: &str,
        field: &str,
        trie: &Trie,
        options: &SearchOptions,
        scores: &mut HashMap<DocRef, f64>,
    ) -> Vec<DocRef> {
        let boost = options.boost(field);
        if boost == 0.0 {
            return Vec::new();
        }
        let keys = if options.expand {
            trie.expand(token)
        } else if trie.contains(token) {
            vec![token.to_string()]
        } else {
            Vec::new()
        };

        let mut exact = Vec::new();
        for key in &keys {
            let Some(node) = trie.node(key) else { continue };
            let is_exact = key == token;
            if is_exact {
                exact.extend(node.postings().iter().map(|p| p.doc));
            }
            for posting in node.postings() {
                let weight = match options.scoring {
                    ScoringModel::TermFrequency => posting.tf,
                    ScoringModel::TfIdf => {
                        let penalty = if is_exact { 1.0 } else { expansion_penalty(key, token) };
                        posting.tf
                            * idf(node.df(), self.store.len())
                            * length_norm(self.store.field_length(posting.doc, field))
                            * penalty
                    }
                };
                *scores.entry(posting.doc).or_insert(0.0) += weight * boost;
            }
        }
        exact
    }

    /// All matching documents, best first, ties by ascending document id.
    pub fn rank(&self, query: &str, options: &SearchOptions) -> Vec<Scored> {
        let tokens = self.pipeline.run(query);
        if tokens.is_empty() {
            return Vec::new();
        }

        let mut merged: Option<HashMap<DocRef, f64>> = None;
        let mut exact_hits: HashMap<DocRef, usize> = HashMap::new();
        for token in &tokens {
            let mut token_scores = HashMap::new();
            let mut exact_docs = Vec::new();
            for (field, trie) in self.field_tries() {
                exact_docs.extend(self.score_field(token, field, trie, options, &mut token_scores));
            }
            exact_docs.sort_unstable();
            exact_docs.dedup();
            for doc in exact_docs {
                *exact_hits.entry(doc).or_insert(0) += 1;
            }
            merged = Some(match merged {
                None => token_scores,
                Some(acc) => merge(acc, token_scores, options.mode),
            });
        }

        let mut scored: Vec<Scored> = merged
            .unwrap_or_default()
            .into_iter()
            .map(|(doc, mut score)| {
                if options.scoring == ScoringModel::TfIdf {
                    if let Some(&hits) = exact_hits.get(&doc) {
                        score *= hits as f64 / tokens.len() as f64;
                    }
                }
                Scored { doc, score }
            })
            .collect();
        scored.sort_by(|a, b| b.score.total_cmp(&a.score).then(a.doc.cmp(&b.doc)));
        tracing::debug!(query, tokens = tokens.len(), matches = scored.len(), "ranked query");
        scored
    }

    /// Search with the options captured in the index.
    pub fn search(&self, query: &str) -> SearchResults {
        self.search_with(query, &self.search_options, &self.results_options)
    }

    pub fn search_with(&self, query: &str, options: &SearchOptions, results: &ResultsOptions) -> SearchResults {
        let ranked = self.rank(query, options);
        let total_hits = ranked.len();
        let terms = search_terms(query);
        let hits = ranked
            .into_iter()
            .take(results.limit_results)
            .filter_map(|Scored { doc, score }| {
                let stored = self.store.get(doc)?;
                Some(SearchHit {
                    doc,
                    score,
                    url: self.url(doc).unwrap_or_default().to_string(),
                    title: stored.title.clone(),
                    breadcrumbs: stored.breadcrumbs.clone(),
                    teaser: make_teaser(&stored.body, &terms, results.teaser_word_count),
                })
            })
            .collect();
        SearchResults { total_hits, hits }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn or_unions_and_intersects() {
        let a: HashMap<DocRef, f64> = [(1, 1.0), (2, 1.0)].into_iter().collect();
        let b: HashMap<DocRef, f64> = [(2, 2.0), (3, 1.0)].into_iter().collect();
        let or = merge(a.clone(), b.clone(), BoolMode::Or);
        assert_eq!(or.len(), 3);
        assert_eq!(or[&2], 3.0);
        let and = merge(a, b, BoolMode::And);
        assert_eq!(and.len(), 1);
        assert_eq!(and[&2], 3.0);
    }

    #[test]
    fn expansion_penalty_shrinks_with_length() {
        assert!(expansion_penalty("hooks", "hook") > expansion_penalty("hookable", "hook"));
        assert!(expansion_penalty("hooks", "hook") < 1.0);
    }

    #[test]
    fn idf_decreases_with_df() {
        assert!(idf(1, 8) > idf(4, 8));
    }
}
