use crate::error::{IndexError, Result};
use crate::trie::DocRef;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Text kept per document for rendering results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredDoc {
    pub id: DocRef,
    pub title: String,
    pub body: String,
    pub breadcrumbs: String,
}

impl StoredDoc {
    pub fn field(&self, name: &str) -> Option<&str> {
        match name {
            "title" => Some(&self.title),
            "body" => Some(&self.body),
            "breadcrumbs" => Some(&self.breadcrumbs),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentStore {
    docs: BTreeMap<DocRef, StoredDoc>,
    doc_info: BTreeMap<DocRef, BTreeMap<String, u32>>,
    save: bool,
}

impl DocumentStore {
    pub fn new(save: bool) -> Self {
        Self { save, ..Self::default() }
    }

    pub fn add(&mut self, doc: StoredDoc, field_lengths: BTreeMap<String, u32>) {
        self.doc_info.insert(doc.id, field_lengths);
        self.docs.insert(doc.id, doc);
    }

    pub fn get(&self, id: DocRef) -> Option<&StoredDoc> {
        self.docs.get(&id)
    }

    pub fn contains(&self, id: DocRef) -> bool {
        self.docs.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    /// Token count of `field` in `id`; 0 when either is unknown.
    pub fn field_length(&self, id: DocRef, field: &str) -> u32 {
        self.doc_info
            .get(&id)
            .and_then(|info| info.get(field))
            .copied()
            .unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = &StoredDoc> {
        self.docs.values()
    }

    pub fn from_json(value: &Value, path: &str) -> Result<Self> {
        let obj = value
            .as_object()
            .ok_or_else(|| IndexError::invalid(path, "expected an object"))?;
        let save = obj.get("save").and_then(Value::as_bool).unwrap_or(true);

        let docs_path = format!("{path}.docs");
        let docs_obj = obj
            .get("docs")
            .ok_or_else(|| IndexError::missing(&docs_path))?
            .as_object()
            .ok_or_else(|| IndexError::invalid(&docs_path, "expected an object"))?;
        let info_path = format!("{path}.docInfo");
        let info_obj = obj
            .get("docInfo")
            .ok_or_else(|| IndexError::missing(&info_path))?
            .as_object()
            .ok_or_else(|| IndexError::invalid(&info_path, "expected an object"))?;

        let mut store = DocumentStore::new(save);
        for (key, entry) in docs_obj {
            let entry_path = format!("{docs_path}.{key}");
            let id = parse_ref(key, &entry_path)?;
            let fields = entry
                .as_object()
                .ok_or_else(|| IndexError::invalid(&entry_path, "expected an object"))?;
            let doc = StoredDoc {
                id,
                title: required_str(fields, "title", &entry_path)?,
                body: required_str(fields, "body", &entry_path)?,
                breadcrumbs: fields
                    .get("breadcrumbs")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
            };
            store.docs.insert(id, doc);
        }

        for (key, entry) in info_obj {
            let entry_path = format!("{info_path}.{key}");
            let id = parse_ref(key, &entry_path)?;
            if !store.docs.contains_key(&id) {
                return Err(IndexError::invalid(&entry_path, "no such document in the store"));
            }
            let lengths = entry
                .as_object()
                .ok_or_else(|| IndexError::invalid(&entry_path, "expected an object"))?
                .iter()
                .map(|(field, n)| {
                    n.as_u64()
                        .and_then(|n| u32::try_from(n).ok())
                        .map(|n| (field.clone(), n))
                        .ok_or_else(|| IndexError::invalid(format!("{entry_path}.{field}"), "expected a token count"))
                })
                .collect::<Result<BTreeMap<_, _>>>()?;
            store.doc_info.insert(id, lengths);
        }

        if let Some(len) = obj.get("length").and_then(Value::as_u64) {
            if len != store.docs.len() as u64 {
                return Err(IndexError::invalid(
                    format!("{path}.length"),
                    format!("length is {len} but {} documents are stored", store.docs.len()),
                ));
            }
        }
        Ok(store)
    }

    pub fn to_json(&self) -> Value {
        let doc_info: Map<String, Value> = self
            .doc_info
            .iter()
            .map(|(id, lengths)| (id.to_string(), serde_json::json!(lengths)))
            .collect();
        let docs: Map<String, Value> = self
            .docs
            .values()
            .map(|d| {
                (
                    d.id.to_string(),
                    serde_json::json!({
                        "body": d.body,
                        "breadcrumbs": d.breadcrumbs,
                        "id": d.id.to_string(),
                        "title": d.title,
                    }),
                )
            })
            .collect();
        serde_json::json!({
            "docInfo": doc_info,
            "docs": docs,
            "length": self.docs.len(),
            "save": self.save,
        })
    }
}

fn parse_ref(key: &str, path: &str) -> Result<DocRef> {
    key.parse()
        .map_err(|_| IndexError::invalid(path, "document id is not an integer"))
}

fn required_str(fields: &Map<String, Value>, name: &str, path: &str) -> Result<String> {
    let field_path = format!("{path}.{name}");
    fields
        .get(name)
        .ok_or_else(|| IndexError::missing(&field_path))?
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| IndexError::invalid(&field_path, "expected a string"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn reads_docs_and_lengths() {
        let v = json!({
            "docInfo": { "0": { "body": 3, "title": 1 } },
            "docs": { "0": { "body": "Hooks run things", "breadcrumbs": "Hooks", "id": "0", "title": "Hooks" } },
            "length": 1,
            "save": true
        });
        let store = DocumentStore::from_json(&v, "index.documentStore").unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.field_length(0, "body"), 3);
        assert_eq!(store.field_length(0, "breadcrumbs"), 0);
        assert_eq!(store.field_length(9, "body"), 0);
        assert_eq!(store.get(0).unwrap().field("title"), Some("Hooks"));
    }

    #[test]
    fn missing_title_names_the_path() {
        let v = json!({ "docInfo": {}, "docs": { "3": { "body": "x" } } });
        let err = DocumentStore::from_json(&v, "index.documentStore").unwrap_err();
        assert!(matches!(err, IndexError::Missing { ref path } if path == "index.documentStore.docs.3.title"));
    }

    #[test]
    fn doc_info_for_unknown_doc_is_invalid() {
        let v = json!({ "docInfo": { "1": { "body": 1 } }, "docs": {} });
        let err = DocumentStore::from_json(&v, "index.documentStore").unwrap_err();
        assert!(matches!(err, IndexError::Invalid { ref path, .. } if path == "index.documentStore.docInfo.1"));
    }
}
