//! Structural validation of a serialized index.
//!
//! Accepts plain JSON or the `Object.assign(window.search, {...});` script
//! form. The first problem found is reported with its dotted JSON path.

use crate::config::{ResultsOptions, SearchOptions};
use crate::error::{IndexError, Result};
use crate::index::{SearchIndex, DEFAULT_FIELDS, MAX_JSON_TOKEN_CHARS};
use crate::store::DocumentStore;
use crate::tokenizer::Pipeline;
use crate::trie::Trie;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value};

/// Text between the first `{` and the last `}`, or the input when it has neither.
fn strip_script_wrapper(text: &str) -> &str {
    let trimmed = text.trim();
    if trimmed.starts_with('{') {
        return trimmed;
    }
    match (trimmed.find('{'), trimmed.rfind('}')) {
        (Some(start), Some(end)) if start < end => &trimmed[start..=end],
        _ => trimmed,
    }
}

/// Deepest array/object nesting accepted: a maximal token plus the levels
/// around a trie (`index.index.<field>.root` above, `docs.<id>` below).
pub const MAX_NESTING: usize = MAX_JSON_TOKEN_CHARS + 8;

/// Rejects input nested deeper than [`MAX_NESTING`] before it is parsed.
fn check_nesting(text: &str) -> Result<()> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    for b in text.bytes() {
        if in_string {
            match b {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'{' | b'[' => {
                depth += 1;
                if depth > MAX_NESTING {
                    return Err(IndexError::invalid(
                        "$",
                        format!("nested deeper than {MAX_NESTING} levels"),
                    ));
                }
            }
            b'}' | b']' => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    Ok(())
}

pub fn parse_index(text: &str) -> Result<SearchIndex> {
    let text = strip_script_wrapper(text);
    check_nesting(text)?;
    // serde_json stops at 128 levels; one level per token character is normal here.
    let mut de = serde_json::Deserializer::from_str(text);
    de.disable_recursion_limit();
    let value = Value::deserialize(&mut de)?;
    de.end()?;
    from_value(&value)
}

fn object<'a>(value: &'a Value, path: &str) -> Result<&'a Map<String, Value>> {
    value
        .as_object()
        .ok_or_else(|| IndexError::invalid(path, "expected an object"))
}

fn child_path(parent: &str, key: &str) -> String {
    if parent.is_empty() {
        key.to_string()
    } else {
        format!("{parent}.{key}")
    }
}

fn required<'a>(obj: &'a Map<String, Value>, key: &str, parent: &str) -> Result<(&'a Value, String)> {
    let path = child_path(parent, key);
    match obj.get(key) {
        Some(v) => Ok((v, path)),
        None => Err(IndexError::missing(path)),
    }
}

fn string_list(value: &Value, path: &str) -> Result<Vec<String>> {
    value
        .as_array()
        .ok_or_else(|| IndexError::invalid(path, "expected an array"))?
        .iter()
        .enumerate()
        .map(|(i, v)| {
            v.as_str()
                .map(str::to_string)
                .ok_or_else(|| IndexError::invalid(format!("{path}.{i}"), "expected a string"))
        })
        .collect()
}

fn optional<T: DeserializeOwned + Default>(obj: &Map<String, Value>, key: &str, parent: &str) -> Result<T> {
    match obj.get(key) {
        Some(v) => {
            T::deserialize(v).map_err(|e| IndexError::invalid(child_path(parent, key), e.to_string()))
        }
        None => Ok(T::default()),
    }
}

pub fn from_value(value: &Value) -> Result<SearchIndex> {
    let root = object(value, "$")?;

    let (urls, urls_path) = required(root, "doc_urls", "")?;
    let doc_urls = string_list(urls, &urls_path)?;

    let (index, index_path) = required(root, "index", "")?;
    let index = object(index, &index_path)?;

    let fields = match index.get("fields") {
        Some(v) => string_list(v, "index.fields")?,
        None => DEFAULT_FIELDS.iter().map(|f| f.to_string()).collect(),
    };

    let (pipeline, pipeline_path) = required(index, "pipeline", &index_path)?;
    let pipeline = Pipeline::from_names(&string_list(pipeline, &pipeline_path)?)?;

    let (store, store_path) = required(index, "documentStore", &index_path)?;
    let store = DocumentStore::from_json(store, &store_path)?;

    if let Some(id) = store.iter().map(|d| d.id).find(|id| *id as usize >= doc_urls.len()) {
        return Err(IndexError::invalid(
            urls_path,
            format!("no url for document {id} ({} urls)", doc_urls.len()),
        ));
    }

    let (per_field, per_field_path) = required(index, "index", &index_path)?;
    let per_field = object(per_field, &per_field_path)?;
    let mut tries = Vec::with_capacity(fields.len());
    for field in &fields {
        let (trie, trie_path) = required(per_field, field, &per_field_path)?;
        let trie = Trie::from_json(trie, &trie_path)?;
        if let Some(doc) = trie.doc_refs().find(|d| !store.contains(*d)) {
            return Err(IndexError::invalid(
                trie_path,
                format!("document {doc} is not in the document store"),
            ));
        }
        tries.push(trie);
    }

    let reference = index.get("ref").and_then(Value::as_str).unwrap_or("id").to_string();
    let version = index.get("version").and_then(Value::as_str).unwrap_or_default().to_string();
    let results_options: ResultsOptions = optional(root, "results_options", "")?;
    let search_options: SearchOptions = optional(root, "search_options", "")?;

    tracing::debug!(
        docs = store.len(),
        fields = fields.len(),
        tokens = tries.iter().map(Trie::token_count).sum::<usize>(),
        "loaded search index"
    );

    Ok(SearchIndex {
        doc_urls,
        fields,
        tries,
        store,
        pipeline,
        reference,
        version,
        search_options,
        results_options,
    })
}
