use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// How per-token candidate sets are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BoolMode {
    #[default]
    #[serde(rename = "OR")]
    Or,
    #[serde(rename = "AND")]
    And,
}

impl FromStr for BoolMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "OR" => Ok(BoolMode::Or),
            "AND" => Ok(BoolMode::And),
            other => Err(format!("unknown boolean mode `{other}`, expected OR or AND")),
        }
    }
}

impl fmt::Display for BoolMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BoolMode::Or => "OR",
            BoolMode::And => "AND",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringModel {
    /// Sum of stored term frequency times field boost.
    #[default]
    TermFrequency,
    /// tf-idf with field-length normalization, expansion penalty and coordination.
    TfIdf,
}

impl FromStr for ScoringModel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "term_frequency" | "tf" => Ok(ScoringModel::TermFrequency),
            "tf_idf" | "tfidf" => Ok(ScoringModel::TfIdf),
            other => Err(format!("unknown scoring model `{other}`")),
        }
    }
}

fn default_boost() -> f64 {
    1.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldOptions {
    #[serde(default = "default_boost")]
    pub boost: f64,
}

impl Default for FieldOptions {
    fn default() -> Self {
        Self { boost: default_boost() }
    }
}

/// Query-time behavior, the `search_options` block of an index.
///
/// Keys missing from a serialized block fall back to OR, no expansion and
/// boost 1. `Default` instead mirrors what the site generator writes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchOptions {
    #[serde(rename = "bool", default)]
    pub mode: BoolMode,
    #[serde(default)]
    pub expand: bool,
    #[serde(default)]
    pub fields: BTreeMap<String, FieldOptions>,
    #[serde(default)]
    pub scoring: ScoringModel,
}

impl Default for SearchOptions {
    fn default() -> Self {
        let mut fields = BTreeMap::new();
        fields.insert("title".to_string(), FieldOptions { boost: 2.0 });
        fields.insert("body".to_string(), FieldOptions { boost: 1.0 });
        fields.insert("breadcrumbs".to_string(), FieldOptions { boost: 1.0 });
        Self { mode: BoolMode::Or, expand: true, fields, scoring: ScoringModel::TermFrequency }
    }
}

impl SearchOptions {
    /// Boost for `field`; fields without configuration get 1.
    pub fn boost(&self, field: &str) -> f64 {
        self.fields.get(field).map_or(1.0, |f| f.boost)
    }

    pub fn with_mode(mut self, mode: BoolMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_expand(mut self, expand: bool) -> Self {
        self.expand = expand;
        self
    }

    pub fn with_boost(mut self, field: &str, boost: f64) -> Self {
        self.fields.insert(field.to_string(), FieldOptions { boost });
        self
    }

    pub fn with_scoring(mut self, scoring: ScoringModel) -> Self {
        self.scoring = scoring;
        self
    }
}

fn default_limit() -> usize {
    30
}

fn default_teaser_words() -> usize {
    30
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultsOptions {
    #[serde(default = "default_limit")]
    pub limit_results: usize,
    #[serde(default = "default_teaser_words")]
    pub teaser_word_count: usize,
}

impl Default for ResultsOptions {
    fn default() -> Self {
        Self { limit_results: default_limit(), teaser_word_count: default_teaser_words() }
    }
}
