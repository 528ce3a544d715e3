use docsearch_core::persist::{load_index, save_json, save_script, save_snapshot, IndexPaths};
use docsearch_core::{Document, IndexBuilder, IndexError, ResultsOptions, SearchIndex, SearchOptions};
use tempfile::tempdir;

fn doc(title: &str, body: &str, url: &str) -> Document {
    Document { title: title.into(), body: body.into(), breadcrumbs: String::new(), url: url.into() }
}

fn handbook() -> SearchIndex {
    let mut b = IndexBuilder::new();
    b.add_document(doc(
        "Containers",
        "Every charm may start several Docker containers and configure their volumes.",
        "containers.html",
    ));
    b.add_document(doc(
        "Relations",
        "Relations connect applications; relation hooks fire when units join or depart.",
        "relations.html",
    ));
    b.add_document(doc(
        "Scheduling",
        "Cron ticks trigger scheduled scripts. Scheduling keeps containers healthy.",
        "scheduling.html",
    ));
    b.build()
}

#[test]
fn every_indexed_token_is_findable() {
    let idx = handbook();
    let exact = SearchOptions::default().with_expand(false);
    for stored in idx.store().iter() {
        for field in idx.fields() {
            let text = stored.field(field).unwrap_or_default();
            for token in idx.pipeline().run(text) {
                let hits: Vec<u32> = idx.rank(&token, &exact).into_iter().map(|s| s.doc).collect();
                assert!(hits.contains(&stored.id), "token {token:?} did not find doc {}", stored.id);
            }
        }
    }
}

#[test]
fn raw_words_find_their_documents() {
    let idx = handbook();
    let hits = idx.search("volumes");
    assert_eq!(hits.hits[0].url, "containers.html");
    let hits = idx.search("scheduled");
    assert_eq!(hits.hits[0].title, "Scheduling");
}

#[test]
fn title_boost_beats_body_match() {
    let mut b = IndexBuilder::new();
    b.add_document(doc("Overview", "The socket lives next to the daemon.", "overview.html"));
    b.add_document(doc("Socket", "Nothing else to see here today.", "socket.html"));
    let idx = b.build();
    let ranked = idx.rank("socket", &SearchOptions::default());
    assert_eq!(ranked.len(), 2);
    assert_eq!(ranked[0].doc, 1);
    assert!(ranked[0].score > ranked[1].score);
}

#[test]
fn expanded_results_cover_exact_results() {
    let idx = handbook();
    for q in ["contain", "relat", "schedul", "hook", "cron"] {
        let exact = idx.rank(q, &SearchOptions::default().with_expand(false));
        let expanded = idx.rank(q, &SearchOptions::default().with_expand(true));
        for s in &exact {
            assert!(expanded.iter().any(|e| e.doc == s.doc), "{q}: doc {} lost on expansion", s.doc);
        }
    }
}

fn many(n: usize) -> SearchIndex {
    let mut b = IndexBuilder::new();
    for i in 0..n {
        let body = "charm ".repeat(i % 4 + 1);
        b.add_document(doc(&format!("Page {i}"), &body, &format!("page{i}.html")));
    }
    b.build()
}

#[test]
fn fewer_matches_than_limit_are_all_returned() {
    let idx = many(12);
    let out = idx.search("charm");
    assert_eq!(out.total_hits, 12);
    assert_eq!(out.hits.len(), 12);
}

#[test]
fn more_matches_than_limit_are_truncated_best_first() {
    let idx = many(45);
    let out = idx.search_with("charm", &SearchOptions::default(), &ResultsOptions::default());
    assert_eq!(out.total_hits, 45);
    assert_eq!(out.hits.len(), 30);
    assert!(out.hits.windows(2).all(|w| w[0].score >= w[1].score));
    let all = idx.rank("charm", &SearchOptions::default());
    assert_eq!(out.hits.last().map(|h| h.doc), Some(all[29].doc));
}

#[test]
fn empty_index_answers_nothing() {
    let idx = IndexBuilder::new().build();
    assert!(idx.is_empty());
    assert_eq!(idx.search("anything").total_hits, 0);
}

#[test]
fn persisted_forms_load_back_identically() {
    let idx = handbook();
    let dir = tempdir().unwrap();
    let paths = IndexPaths::new(dir.path());
    save_json(&paths, &idx).unwrap();
    save_script(&paths, &idx).unwrap();
    save_snapshot(&paths, &idx).unwrap();

    let expected = idx.search("containers scripts");
    for path in [paths.json(), paths.script(), paths.snapshot()] {
        let loaded = load_index(&path).unwrap();
        assert_eq!(loaded.len(), 3);
        assert_eq!(loaded.search("containers scripts"), expected, "{}", path.display());
    }
    // a directory resolves to the snapshot
    assert_eq!(load_index(dir.path()).unwrap().search("containers scripts"), expected);
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempdir().unwrap();
    let err = load_index(dir.path().join("nope.json")).unwrap_err();
    assert!(matches!(err, IndexError::Io(_)));
}

#[test]
fn long_tokens_survive_the_json_form() {
    let long = "a".repeat(200);
    let mut b = IndexBuilder::new();
    b.add_document(doc("Long", &format!("prefix {long} suffix"), "long.html"));
    let idx = b.build();

    let dir = tempdir().unwrap();
    let paths = IndexPaths::new(dir.path());
    save_json(&paths, &idx).unwrap();
    let loaded = load_index(paths.json()).unwrap();
    assert_eq!(loaded.search(&long).total_hits, 1);
    assert_eq!(loaded.search(&long), idx.search(&long));
}

#[test]
fn huge_tokens_are_searchable_and_kept_out_of_json() {
    let mut b = IndexBuilder::new();
    b.add_document(doc("Blob", &"b".repeat(100_000), "blob.html"));
    let idx = b.build();
    let out = idx.search("bb");
    assert_eq!(out.total_hits, 1);
    assert_eq!(out.hits[0].url, "blob.html");

    let dir = tempdir().unwrap();
    let paths = IndexPaths::new(dir.path());
    let err = save_json(&paths, &idx).unwrap_err();
    assert!(matches!(err, IndexError::Invalid { ref path, .. } if path == "index.index.body"));
    save_snapshot(&paths, &idx).unwrap();
    assert_eq!(load_index(paths.snapshot()).unwrap().search("bb").total_hits, 1);
}
