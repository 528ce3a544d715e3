use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use docsearch_core::persist::{load_index, save_json, save_script, save_snapshot, IndexPaths};
use docsearch_core::{BoolMode, Document, IndexBuilder, ResultsOptions, ScoringModel, SearchOptions};
use tracing_subscriber::{EnvFilter, fmt};
use walkdir::WalkDir;

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "docsearch-indexer")]
#[command(about = "Build and query documentation search indexes", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the index from input JSON/JSONL files or a directory
    Build {
        /// Input path (file or directory)
        #[arg(long)]
        input: String,
        /// Output index directory
        #[arg(long)]
        output: String,
        /// Boost applied to title matches
        #[arg(long, default_value_t = 2.0)]
        title_boost: f64,
        /// Maximum number of results a search returns
        #[arg(long, default_value_t = 30)]
        limit: usize,
        /// Number of words in each result teaser
        #[arg(long, default_value_t = 30)]
        teaser_words: usize,
        /// Also write a binary snapshot for fast loading
        #[arg(long, default_value_t = false)]
        snapshot: bool,
    },
    /// Run a query against an index and print the hits as JSON
    Query {
        /// Index file (.json, .js or .bin) or directory
        #[arg(long)]
        index: String,
        /// Query text
        query: String,
        /// Override the index's result limit
        #[arg(long)]
        limit: Option<usize>,
        /// Combine query terms with OR or AND
        #[arg(long = "bool")]
        mode: Option<BoolMode>,
        /// Disable prefix expansion
        #[arg(long, default_value_t = false)]
        exact: bool,
        /// term_frequency or tf_idf
        #[arg(long)]
        scoring: Option<ScoringModel>,
    },
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Build { input, output, title_boost, limit, teaser_words, snapshot } => {
            let search = SearchOptions::default().with_boost("title", title_boost);
            let results = ResultsOptions { limit_results: limit, teaser_word_count: teaser_words };
            build_index(&input, &output, search, results, snapshot)
        }
        Commands::Query { index, query, limit, mode, exact, scoring } => {
            run_query(&index, &query, limit, mode, exact, scoring)
        }
    }
}

fn build_index(input: &str, output: &str, search: SearchOptions, results: ResultsOptions, snapshot: bool) -> Result<()> {
    let input_path = Path::new(input);
    let out_paths = IndexPaths::new(output);

    let mut files: Vec<PathBuf> = Vec::new();
    if input_path.is_dir() {
        for entry in WalkDir::new(input_path).sort_by_file_name().into_iter().filter_map(|e| e.ok()) {
            let p = entry.path();
            if p.is_file() {
                if let Some(ext) = p.extension().and_then(|s| s.to_str()) {
                    if matches!(ext, "json" | "jsonl") {
                        files.push(p.to_path_buf());
                    }
                }
            }
        }
    } else if input_path.is_file() {
        files.push(input_path.to_path_buf());
    } else {
        anyhow::bail!("input {input} does not exist");
    }

    let mut builder = IndexBuilder::new().with_search_options(search).with_results_options(results);
    for file in files {
        if file.extension().and_then(|s| s.to_str()) == Some("jsonl") {
            index_jsonl(&file, &mut builder)?;
        } else {
            index_json(&file, &mut builder)?;
        }
    }
    tracing::info!(num_docs = builder.len(), "ingested documents");

    let index = builder.build();
    save_json(&out_paths, &index)?;
    save_script(&out_paths, &index)?;
    if snapshot {
        save_snapshot(&out_paths, &index)?;
    }

    tracing::info!(output, "index build complete");
    Ok(())
}

fn index_jsonl(file: &Path, builder: &mut IndexBuilder) -> Result<()> {
    let f = File::open(file)?;
    let reader = BufReader::new(f);
    for (n, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() { continue; }
        let doc: Document = serde_json::from_str(&line)
            .with_context(|| format!("{}:{}", file.display(), n + 1))?;
        builder.add_document(doc);
    }
    Ok(())
}

fn index_json(file: &Path, builder: &mut IndexBuilder) -> Result<()> {
    let f = File::open(file)?;
    let reader = BufReader::new(f);
    let json: serde_json::Value = serde_json::from_reader(reader)
        .with_context(|| format!("reading {}", file.display()))?;
    match json {
        serde_json::Value::Array(arr) => {
            for v in arr {
                let doc: Document = serde_json::from_value(v)?;
                builder.add_document(doc);
            }
        }
        serde_json::Value::Object(_) => {
            let doc: Document = serde_json::from_value(json)?;
            builder.add_document(doc);
        }
        _ => tracing::warn!(file = %file.display(), "skipping input that is neither an object nor an array"),
    }
    Ok(())
}

fn run_query(
    index: &str,
    query: &str,
    limit: Option<usize>,
    mode: Option<BoolMode>,
    exact: bool,
    scoring: Option<ScoringModel>,
) -> Result<()> {
    let index = load_index(index).with_context(|| format!("loading search index from {index}"))?;

    let mut options = index.search_options().clone();
    if let Some(mode) = mode { options.mode = mode; }
    if let Some(scoring) = scoring { options.scoring = scoring; }
    if exact { options.expand = false; }
    let mut results = *index.results_options();
    if let Some(limit) = limit { results.limit_results = limit; }

    let found = index.search_with(query, &options, &results);
    println!("{}", serde_json::to_string_pretty(&found)?);
    Ok(())
}
