//! Per-field prefix tree stored as a flat node arena.
//!
//! Node 0 is the root. Edges are kept sorted by character so lookups
//! binary-search and prefix expansion yields tokens in lexicographic order.

use crate::error::{IndexError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub type DocRef = u32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(u32);

impl NodeId {
    pub const ROOT: NodeId = NodeId(0);

    fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Posting {
    pub doc: DocRef,
    pub tf: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrieNode {
    edges: Vec<(char, NodeId)>,
    postings: Vec<Posting>, // sorted by doc
}

impl TrieNode {
    /// Number of documents whose token ends here.
    pub fn df(&self) -> u32 {
        self.postings.len() as u32
    }

    pub fn postings(&self) -> &[Posting] {
        &self.postings
    }

    pub fn term_frequency(&self, doc: DocRef) -> f64 {
        self.postings
            .binary_search_by_key(&doc, |p| p.doc)
            .map_or(0.0, |i| self.postings[i].tf)
    }

    fn child(&self, c: char) -> Option<NodeId> {
        self.edges
            .binary_search_by_key(&c, |(ch, _)| *ch)
            .ok()
            .map(|i| self.edges[i].1)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trie {
    nodes: Vec<TrieNode>,
}

impl Default for Trie {
    fn default() -> Self {
        Self { nodes: vec![TrieNode::default()] }
    }
}

impl Trie {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of distinct indexed tokens.
    pub fn token_count(&self) -> usize {
        self.nodes.iter().filter(|n| !n.postings.is_empty()).count()
    }

    fn push_node(&mut self) -> NodeId {
        self.nodes.push(TrieNode::default());
        NodeId((self.nodes.len() - 1) as u32)
    }

    fn child_or_insert(&mut self, parent: NodeId, c: char) -> NodeId {
        match self.nodes[parent.index()].edges.binary_search_by_key(&c, |(ch, _)| *ch) {
            Ok(i) => self.nodes[parent.index()].edges[i].1,
            Err(i) => {
                let id = self.push_node();
                self.nodes[parent.index()].edges.insert(i, (c, id));
                id
            }
        }
    }

    /// Record `tf` for `doc` under `token`, replacing any earlier weight for that doc.
    pub fn insert(&mut self, token: &str, doc: DocRef, tf: f64) {
        if token.is_empty() {
            return;
        }
        let mut at = NodeId::ROOT;
        for c in token.chars() {
            at = self.child_or_insert(at, c);
        }
        let postings = &mut self.nodes[at.index()].postings;
        match postings.binary_search_by_key(&doc, |p| p.doc) {
            Ok(i) => postings[i].tf = tf,
            Err(i) => postings.insert(i, Posting { doc, tf }),
        }
    }

    fn find(&self, token: &str) -> Option<NodeId> {
        let mut at = NodeId::ROOT;
        for c in token.chars() {
            at = self.nodes[at.index()].child(c)?;
        }
        Some(at)
    }

    /// Node for an indexed token; `None` when the token is absent or only a prefix.
    pub fn node(&self, token: &str) -> Option<&TrieNode> {
        if token.is_empty() {
            return None;
        }
        self.find(token)
            .map(|id| &self.nodes[id.index()])
            .filter(|n| !n.postings.is_empty())
    }

    pub fn contains(&self, token: &str) -> bool {
        self.node(token).is_some()
    }

    pub fn docs(&self, token: &str) -> &[Posting] {
        self.node(token).map(|n| n.postings()).unwrap_or(&[])
    }

    pub fn term_frequency(&self, token: &str, doc: DocRef) -> f64 {
        self.node(token).map_or(0.0, |n| n.term_frequency(doc))
    }

    pub fn doc_freq(&self, token: &str) -> u32 {
        self.node(token).map_or(0, |n| n.df())
    }

    /// Every indexed token starting with `prefix`, including `prefix` itself.
    pub fn expand(&self, prefix: &str) -> Vec<String> {
        let mut out = Vec::new();
        let Some(start) = self.find(prefix) else {
            return out;
        };

        // (node, edge char leading to it, length of the parent's token)
        let mut buf = prefix.to_string();
        let mut stack: Vec<(NodeId, Option<char>, usize)> = vec![(start, None, buf.len())];
        while let Some((at, c, parent_len)) = stack.pop() {
            buf.truncate(parent_len);
            if let Some(c) = c {
                buf.push(c);
            }
            let node = &self.nodes[at.index()];
            if !node.postings.is_empty() {
                out.push(buf.clone());
            }
            stack.extend(node.edges.iter().rev().map(|&(c, child)| (child, Some(c), buf.len())));
        }
        out
    }

    pub fn tokens(&self) -> Vec<String> {
        self.expand("")
    }

    /// Length in characters of the longest path below the root.
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack = vec![(NodeId::ROOT, 0usize)];
        while let Some((at, depth)) = stack.pop() {
            deepest = deepest.max(depth);
            stack.extend(self.nodes[at.index()].edges.iter().map(|&(_, child)| (child, depth + 1)));
        }
        deepest
    }

    /// Every document id referenced by any posting.
    pub fn doc_refs(&self) -> impl Iterator<Item = DocRef> + '_ {
        self.nodes.iter().flat_map(|n| n.postings.iter().map(|p| p.doc))
    }

    /// Decode the nested `{"root": {"df": .., "docs": {..}, "<char>": {..}}}` form.
    pub fn from_json(value: &Value, path: &str) -> Result<Self> {
        let field = value
            .as_object()
            .ok_or_else(|| IndexError::invalid(path, "expected an object"))?;
        let root_path = format!("{path}.root");
        let root = field.get("root").ok_or_else(|| IndexError::missing(&root_path))?;

        let mut trie = Trie::new();
        let mut stack: Vec<(&Value, NodeId, String)> = vec![(root, NodeId::ROOT, root_path)];
        while let Some((value, id, path)) = stack.pop() {
            let obj = value
                .as_object()
                .ok_or_else(|| IndexError::invalid(&path, "expected an object"))?;
            let postings = parse_postings(obj, &path)?;
            for (key, child) in obj {
                if key == "df" || key == "docs" {
                    continue;
                }
                let mut chars = key.chars();
                let c = match (chars.next(), chars.next()) {
                    (Some(c), None) => c,
                    _ => return Err(IndexError::invalid(&path, format!("unexpected key `{key}`"))),
                };
                let child_id = trie.child_or_insert(id, c);
                stack.push((child, child_id, format!("{path}.{key}")));
            }
            trie.nodes[id.index()].postings = postings;
        }
        Ok(trie)
    }

    pub fn to_json(&self) -> Value {
        // Parents precede their children in `order`, so building it back to
        // front finds every child already encoded.
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![NodeId::ROOT];
        while let Some(at) = stack.pop() {
            order.push(at);
            stack.extend(self.nodes[at.index()].edges.iter().map(|&(_, child)| child));
        }

        let mut encoded: Vec<Option<Value>> = vec![None; self.nodes.len()];
        for &at in order.iter().rev() {
            let node = &self.nodes[at.index()];
            let mut obj = Map::new();
            obj.insert("df".to_string(), Value::from(node.df()));
            let docs: Map<String, Value> = node
                .postings
                .iter()
                .map(|p| (p.doc.to_string(), serde_json::json!({ "tf": p.tf })))
                .collect();
            obj.insert("docs".to_string(), Value::Object(docs));
            for &(c, child) in &node.edges {
                if let Some(v) = encoded[child.index()].take() {
                    obj.insert(c.to_string(), v);
                }
            }
            encoded[at.index()] = Some(Value::Object(obj));
        }

        let mut root = Map::new();
        root.insert(
            "root".to_string(),
            encoded[NodeId::ROOT.index()].take().unwrap_or_else(|| Value::Object(Map::new())),
        );
        Value::Object(root)
    }
}

fn parse_postings(obj: &Map<String, Value>, path: &str) -> Result<Vec<Posting>> {
    let df = match obj.get("df") {
        Some(v) => v
            .as_u64()
            .ok_or_else(|| IndexError::invalid(format!("{path}.df"), "expected a non-negative integer"))?,
        None => 0,
    };
    let docs = match obj.get("docs") {
        Some(v) => v
            .as_object()
            .ok_or_else(|| IndexError::invalid(format!("{path}.docs"), "expected an object"))?,
        None if df == 0 => return Ok(Vec::new()),
        None => return Err(IndexError::missing(format!("{path}.docs"))),
    };

    let mut postings = Vec::with_capacity(docs.len());
    for (key, entry) in docs {
        let entry_path = format!("{path}.docs.{key}");
        let doc: DocRef = key
            .parse()
            .map_err(|_| IndexError::invalid(&entry_path, "document id is not an integer"))?;
        let tf = entry
            .get("tf")
            .ok_or_else(|| IndexError::missing(format!("{entry_path}.tf")))?
            .as_f64()
            .filter(|tf| tf.is_finite() && *tf >= 0.0)
            .ok_or_else(|| IndexError::invalid(format!("{entry_path}.tf"), "expected a non-negative number"))?;
        postings.push(Posting { doc, tf });
    }
    if df != postings.len() as u64 {
        return Err(IndexError::invalid(
            format!("{path}.df"),
            format!("df is {df} but {} documents are listed", postings.len()),
        ));
    }
    postings.sort_by_key(|p| p.doc);
    Ok(postings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Trie {
        let mut t = Trie::new();
        t.insert("hook", 4, 1.0);
        t.insert("hook", 6, 1.0);
        t.insert("hooks", 6, 2.0);
        t.insert("help", 1, 1.5);
        t
    }

    #[test]
    fn lookup_and_frequencies() {
        let t = sample();
        assert_eq!(t.doc_freq("hook"), 2);
        assert_eq!(t.term_frequency("help", 1), 1.5);
        assert_eq!(t.term_frequency("help", 2), 0.0);
        assert!(!t.contains("ho"));
        assert!(t.docs("missing").is_empty());
    }

    #[test]
    fn expand_is_lexicographic_and_includes_prefix() {
        let t = sample();
        assert_eq!(t.expand("h"), vec!["help", "hook", "hooks"]);
        assert_eq!(t.expand("hook"), vec!["hook", "hooks"]);
        assert!(t.expand("x").is_empty());
    }

    #[test]
    fn very_long_token_expands_without_recursion() {
        let mut t = sample();
        let long = "b".repeat(100_000);
        t.insert(&long, 9, 1.0);
        assert_eq!(t.expand("bb"), vec![long]);
        assert_eq!(t.depth(), 100_000);
        assert_eq!(t.tokens().len(), 4);
    }

    #[test]
    fn reinsert_replaces_weight() {
        let mut t = sample();
        t.insert("hook", 4, 3.0);
        assert_eq!(t.doc_freq("hook"), 2);
        assert_eq!(t.term_frequency("hook", 4), 3.0);
    }

    #[test]
    fn json_round_trip_keeps_tokens() {
        let t = sample();
        let back = Trie::from_json(&t.to_json(), "index.index.body").unwrap();
        assert_eq!(back.tokens(), t.tokens());
        assert_eq!(back.term_frequency("hooks", 6), 2.0);
    }

    #[test]
    fn df_mismatch_is_rejected() {
        let v = json!({ "root": { "df": 0, "docs": {}, "a": { "df": 2, "docs": { "0": { "tf": 1.0 } } } } });
        let err = Trie::from_json(&v, "index.index.title").unwrap_err();
        match err {
            IndexError::Invalid { path, .. } => assert_eq!(path, "index.index.title.root.a.df"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_root_is_named() {
        let err = Trie::from_json(&json!({}), "index.index.body").unwrap_err();
        assert!(matches!(err, IndexError::Missing { ref path } if path == "index.index.body.root"));
    }
}
