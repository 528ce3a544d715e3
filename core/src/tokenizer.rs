use crate::error::{IndexError, Result};
use crate::stemmer::porter_stem;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use unicode_normalization::UnicodeNormalization;

lazy_static! {
    static ref SEPARATOR: Regex = Regex::new(r"[\s\-]+").expect("valid regex");
    static ref LEADING: Regex = Regex::new(r"^\W+").expect("valid regex");
    static ref TRAILING: Regex = Regex::new(r"\W+$").expect("valid regex");
    static ref STOPWORDS: HashSet<&'static str> = {
        let words: &[&str] = &[
            "a","able","about","across","after","all","almost","also","am","among","an","and","any","are","as","at",
            "be","because","been","but","by",
            "can","cannot","could",
            "dear","did","do","does",
            "either","else","ever","every",
            "for","from",
            "get","got",
            "had","has","have","he","her","hers","him","his","how","however",
            "i","if","in","into","is","it","its",
            "just",
            "least","let","like","likely",
            "may","me","might","most","must","my",
            "neither","no","nor","not",
            "of","off","often","on","only","or","other","our","own",
            "rather",
            "said","say","says","she","should","since","so","some",
            "than","that","the","their","them","then","there","these","they","this","tis","to","too","twas",
            "us",
            "wants","was","we","were","what","when","where","which","while","who","whom","why","will","with","would",
            "yet","you","your"
        ];
        words.iter().copied().collect()
    };
}

/// Split text into lowercase words on whitespace and hyphens, after NFKC normalization.
pub fn tokenize(text: &str) -> Vec<String> {
    let normalized = text.nfkc().collect::<String>().to_lowercase();
    SEPARATOR
        .split(normalized.trim())
        .filter(|w| !w.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn trim(token: &str) -> &str {
    let start = LEADING.find(token).map_or(0, |m| m.end());
    let rest = &token[start..];
    match TRAILING.find(rest) {
        Some(m) => &rest[..m.start()],
        None => rest,
    }
}

pub fn is_stopword(token: &str) -> bool {
    STOPWORDS.contains(token)
}

pub fn stem(token: &str) -> String {
    porter_stem(token)
}

/// One named text-processing stage, as listed in an index's `pipeline`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PipelineStep {
    Trimmer,
    StopWordFilter,
    Stemmer,
}

impl PipelineStep {
    pub fn from_name(name: &str) -> Result<Self> {
        match name {
            "trimmer" => Ok(PipelineStep::Trimmer),
            "stopWordFilter" => Ok(PipelineStep::StopWordFilter),
            "stemmer" => Ok(PipelineStep::Stemmer),
            other => Err(IndexError::UnknownPipelineStep(other.to_string())),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            PipelineStep::Trimmer => "trimmer",
            PipelineStep::StopWordFilter => "stopWordFilter",
            PipelineStep::Stemmer => "stemmer",
        }
    }

    fn apply(self, token: String) -> Option<String> {
        let out = match self {
            PipelineStep::Trimmer => trim(&token).to_string(),
            PipelineStep::StopWordFilter if is_stopword(&token) => return None,
            PipelineStep::StopWordFilter => token,
            PipelineStep::Stemmer => stem(&token),
        };
        if out.is_empty() {
            None
        } else {
            Some(out)
        }
    }
}

/// Ordered normalization steps shared by index build and query time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pipeline {
    steps: Vec<PipelineStep>,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self { steps: vec![PipelineStep::Trimmer, PipelineStep::StopWordFilter, PipelineStep::Stemmer] }
    }
}

impl Pipeline {
    pub fn new(steps: Vec<PipelineStep>) -> Self {
        Self { steps }
    }

    pub fn from_names<S: AsRef<str>>(names: &[S]) -> Result<Self> {
        let steps = names
            .iter()
            .map(|n| PipelineStep::from_name(n.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { steps })
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.steps.iter().map(|s| s.name()).collect()
    }

    pub fn steps(&self) -> &[PipelineStep] {
        &self.steps
    }

    /// Run a single already-split word through every step.
    pub fn run_token(&self, token: &str) -> Option<String> {
        let mut current = token.to_string();
        if current.is_empty() {
            return None;
        }
        for step in &self.steps {
            current = step.apply(current)?;
        }
        Some(current)
    }

    /// Tokenize text and normalize each token; dropped tokens are skipped.
    pub fn run(&self, text: &str) -> Vec<String> {
        tokenize(text).iter().filter_map(|t| self.run_token(t)).collect()
    }
}
