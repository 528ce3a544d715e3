use crate::error::Result;
use crate::index::SearchIndex;
use crate::loader::parse_index;
use std::fs::{create_dir_all, File};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

const SCRIPT_PREFIX: &str = "Object.assign(window.search, ";
const SCRIPT_SUFFIX: &str = ");";

pub struct IndexPaths {
    pub root: PathBuf,
}

impl IndexPaths {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self { root: root.as_ref().to_path_buf() }
    }
    pub fn json(&self) -> PathBuf { self.root.join("searchindex.json") }
    pub fn script(&self) -> PathBuf { self.root.join("searchindex.js") }
    pub fn snapshot(&self) -> PathBuf { self.root.join("searchindex.bin") }
}

pub fn save_json(paths: &IndexPaths, index: &SearchIndex) -> Result<()> {
    index.check_json_depth()?;
    create_dir_all(&paths.root)?;
    let mut f = File::create(paths.json())?;
    let json = serde_json::to_string(&index.to_json())?;
    f.write_all(json.as_bytes())?;
    Ok(())
}

/// Write the script form a documentation page includes directly.
pub fn save_script(paths: &IndexPaths, index: &SearchIndex) -> Result<()> {
    index.check_json_depth()?;
    create_dir_all(&paths.root)?;
    let mut f = File::create(paths.script())?;
    let json = serde_json::to_string(&index.to_json())?;
    write!(f, "{SCRIPT_PREFIX}{json}{SCRIPT_SUFFIX}")?;
    Ok(())
}

/// Binary dump of the loaded arena, skipping JSON validation on the next start.
pub fn save_snapshot(paths: &IndexPaths, index: &SearchIndex) -> Result<()> {
    create_dir_all(&paths.root)?;
    let f = File::create(paths.snapshot())?;
    let mut w = BufWriter::new(f);
    bincode::serialize_into(&mut w, index)?;
    w.flush()?;
    Ok(())
}

pub fn load_snapshot<P: AsRef<Path>>(path: P) -> Result<SearchIndex> {
    let f = File::open(path)?;
    let index = bincode::deserialize_from(BufReader::new(f))?;
    Ok(index)
}

fn load_text(path: &Path) -> Result<SearchIndex> {
    let mut f = File::open(path)?;
    let mut buf = String::new();
    f.read_to_string(&mut buf)?;
    parse_index(&buf)
}

/// Load an index from a `.json`, `.js` or `.bin` file, or from a directory
/// holding one of them (snapshot preferred).
pub fn load_index<P: AsRef<Path>>(path: P) -> Result<SearchIndex> {
    let path = path.as_ref();
    if path.is_dir() {
        let paths = IndexPaths::new(path);
        let snapshot = paths.snapshot();
        if snapshot.is_file() {
            return load_snapshot(snapshot);
        }
        let json = paths.json();
        if json.is_file() {
            return load_text(&json);
        }
        return load_text(&paths.script());
    }
    match path.extension().and_then(|s| s.to_str()) {
        Some("bin") => load_snapshot(path),
        _ => load_text(path),
    }
}
