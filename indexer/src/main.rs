use anyhow::Result;
use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::json;
use tracing_subscriber::{EnvFilter, fmt};
use walkdir::WalkDir;
use wordstat_core::persist::{load_library, save_library, StorePaths};
use wordstat_core::{CollectionId, DocId, DocumentRecord, Library, DEFAULT_PAGE_LIMIT};

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "indexer")]
#[command(about = "Word statistics and Huffman coding for documents and collections", long_about = None)]
struct Cli {
    /// Store directory
    #[arg(long, global = true, env = "WORDSTAT_STORE", default_value = "./store")]
    store: String,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add one document from a text file, or from stdin when no file is given
    Add {
        #[arg(long)]
        name: Option<String>,
        file: Option<PathBuf>,
    },
    /// Add every .txt file under a directory
    Ingest {
        #[arg(long)]
        input: String,
    },
    /// Show a document with its codebook and Huffman content
    Show { doc: DocId },
    /// List documents
    List,
    /// Decode a document's Huffman content back to text
    Decode { doc: DocId },
    /// Delete a document and detach it from all collections
    Delete { doc: DocId },
    /// Word statistics of a document, highest tf first
    DocStats {
        doc: DocId,
        #[arg(long, default_value_t = 0)]
        offset: usize,
        #[arg(long, default_value_t = DEFAULT_PAGE_LIMIT)]
        limit: usize,
    },
    /// Word statistics of a collection, highest tf first
    CollStats {
        collection: CollectionId,
        #[arg(long, default_value_t = 0)]
        offset: usize,
        #[arg(long, default_value_t = DEFAULT_PAGE_LIMIT)]
        limit: usize,
    },
    /// Processing metrics over all documents
    Metrics,
    /// Manage collections
    #[command(subcommand)]
    Collection(CollectionCommands),
}

#[derive(Subcommand)]
enum CollectionCommands {
    Create {
        #[arg(long)]
        name: Option<String>,
    },
    List,
    Show { collection: CollectionId },
    Delete { collection: CollectionId },
    /// Add a document to a collection
    Attach { collection: CollectionId, doc: DocId },
    /// Remove a document from a collection
    Detach { collection: CollectionId, doc: DocId },
}

#[derive(Serialize)]
struct DocumentSummary<'a> {
    id: DocId,
    name: &'a str,
    length: usize,
    distinct_words: usize,
    huffman_bits: usize,
    process_time: f64,
}

impl<'a> From<&'a DocumentRecord> for DocumentSummary<'a> {
    fn from(doc: &'a DocumentRecord) -> Self {
        Self {
            id: doc.id,
            name: &doc.name,
            length: doc.length,
            distinct_words: doc.stats.words.len(),
            huffman_bits: doc.huffman.len(),
            process_time: doc.process_time,
        }
    }
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).with_writer(io::stderr).init();
    let cli = Cli::parse();

    let paths = StorePaths::new(&cli.store);
    let library = load_library(&paths)?;
    let (output, dirty) = run(&library, cli.command)?;
    if dirty {
        save_library(&paths, &library)?;
    }
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

/// Run one command. Returns the JSON to print and whether the library changed.
fn run(library: &Library, command: Commands) -> Result<(serde_json::Value, bool)> {
    let out = match command {
        Commands::Add { name, file } => {
            let text = match &file {
                Some(path) => fs::read_to_string(path)?,
                None => {
                    let mut buf = String::new();
                    io::stdin().read_to_string(&mut buf)?;
                    buf
                }
            };
            let name = name.unwrap_or_else(|| default_name(file.as_deref()));
            let doc = library.create_document(&name, &text)?;
            (serde_json::to_value(DocumentSummary::from(doc.as_ref()))?, true)
        }
        Commands::Ingest { input } => {
            let inputs = collect_texts(Path::new(&input))?;
            let mut added = Vec::new();
            let mut failed = Vec::new();
            for res in library.ingest_documents(inputs.into_iter().map(|(p, name, text)| {
                tracing::debug!(path = %p.display(), "queued for ingestion");
                (name, text)
            }).collect()) {
                match res {
                    Ok(doc) => added.push(serde_json::to_value(DocumentSummary::from(doc.as_ref()))?),
                    Err(e) => failed.push(e.to_string()),
                }
            }
            tracing::info!(added = added.len(), failed = failed.len(), "ingestion complete");
            let dirty = !added.is_empty();
            (json!({ "added": added, "failed": failed }), dirty)
        }
        Commands::Show { doc } => (serde_json::to_value(library.document(doc)?.as_ref())?, false),
        Commands::List => {
            let docs: Vec<_> = library
                .documents()
                .iter()
                .map(|d| serde_json::to_value(DocumentSummary::from(d.as_ref())))
                .collect::<Result<_, _>>()?;
            (serde_json::Value::Array(docs), false)
        }
        Commands::Decode { doc } => (json!({ "id": doc, "text": library.decode_document(doc)? }), false),
        Commands::Delete { doc } => {
            let removed = library.delete_document(doc)?;
            (serde_json::to_value(DocumentSummary::from(removed.as_ref()))?, true)
        }
        Commands::DocStats { doc, offset, limit } => {
            (serde_json::to_value(library.document_stats(doc, offset, limit)?)?, false)
        }
        Commands::CollStats { collection, offset, limit } => {
            (serde_json::to_value(library.collection_stats(collection, offset, limit)?)?, false)
        }
        Commands::Metrics => (serde_json::to_value(library.metrics())?, false),
        Commands::Collection(cmd) => run_collection(library, cmd)?,
    };
    Ok(out)
}

fn run_collection(library: &Library, command: CollectionCommands) -> Result<(serde_json::Value, bool)> {
    let out = match command {
        CollectionCommands::Create { name } => {
            let coll = library.create_collection(name.as_deref());
            (collection_summary(&coll), true)
        }
        CollectionCommands::List => {
            let colls: Vec<_> = library.collections().iter().map(collection_summary).collect();
            (serde_json::Value::Array(colls), false)
        }
        CollectionCommands::Show { collection } => {
            (collection_summary(&library.collection(collection)?), false)
        }
        CollectionCommands::Delete { collection } => {
            (collection_summary(&library.delete_collection(collection)?), true)
        }
        CollectionCommands::Attach { collection, doc } => {
            library.attach(collection, doc)?;
            (collection_summary(&library.collection(collection)?), true)
        }
        CollectionCommands::Detach { collection, doc } => {
            library.detach(collection, doc)?;
            (collection_summary(&library.collection(collection)?), true)
        }
    };
    Ok(out)
}

fn collection_summary(coll: &wordstat_core::Collection) -> serde_json::Value {
    json!({
        "id": coll.id,
        "name": coll.name,
        "total_words": coll.state.total_words,
        "documents": coll.state.members,
        "distinct_words": coll.state.stats.len(),
    })
}

fn default_name(file: Option<&Path>) -> String {
    file.and_then(|p| p.file_stem())
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "stdin".to_string())
}

/// Read every `.txt` file under `input` (or `input` itself when it is a file), sorted by path.
fn collect_texts(input: &Path) -> Result<Vec<(PathBuf, String, String)>> {
    let mut files: Vec<PathBuf> = Vec::new();
    if input.is_dir() {
        for entry in WalkDir::new(input).into_iter().filter_map(|e| e.ok()) {
            let p = entry.path();
            if p.is_file() && p.extension().and_then(|s| s.to_str()) == Some("txt") {
                files.push(p.to_path_buf());
            }
        }
    } else if input.is_file() {
        files.push(input.to_path_buf());
    } else {
        anyhow::bail!("input path {} does not exist", input.display());
    }
    files.sort();

    let mut texts = Vec::with_capacity(files.len());
    for file in files {
        let text = fs::read_to_string(&file)?;
        let name = default_name(Some(&file));
        texts.push((file, name, text));
    }
    Ok(texts)
}
