use crate::library::{Library, LibrarySnapshot};
use anyhow::Result;
use bincode;
use serde::{Deserialize, Serialize};
use std::fs::{create_dir_all, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

pub const STORE_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
pub struct MetaFile {
    pub num_docs: u32,
    pub num_collections: u32,
    pub created_at: String,
    pub version: u32,
}

pub struct StorePaths {
    pub root: PathBuf,
}

impl StorePaths {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self { root: root.as_ref().to_path_buf() }
    }
    fn library(&self) -> PathBuf { self.root.join("library.bin") }
    fn meta(&self) -> PathBuf { self.root.join("meta.json") }
}

pub fn save_snapshot(paths: &StorePaths, snapshot: &LibrarySnapshot) -> Result<()> {
    create_dir_all(&paths.root)?;
    let mut f = File::create(paths.library())?;
    let bytes = bincode::serialize(snapshot)?;
    f.write_all(&bytes)?;
    Ok(())
}

pub fn load_snapshot(paths: &StorePaths) -> Result<LibrarySnapshot> {
    let mut f = File::open(paths.library())?;
    let mut buf = Vec::new();
    f.read_to_end(&mut buf)?;
    let snapshot = bincode::deserialize(&buf)?;
    Ok(snapshot)
}

pub fn save_meta(paths: &StorePaths, meta: &MetaFile) -> Result<()> {
    create_dir_all(&paths.root)?;
    let mut f = File::create(paths.meta())?;
    let json = serde_json::to_string_pretty(meta)?;
    f.write_all(json.as_bytes())?;
    Ok(())
}

pub fn load_meta(paths: &StorePaths) -> Result<MetaFile> {
    let mut f = File::open(paths.meta())?;
    let mut buf = String::new();
    f.read_to_string(&mut buf)?;
    let meta: MetaFile = serde_json::from_str(&buf)?;
    Ok(meta)
}

/// Load the library stored under `paths`. A store that was never written loads as empty.
pub fn load_library(paths: &StorePaths) -> Result<Library> {
    if !paths.library().exists() {
        tracing::debug!(root = %paths.root.display(), "no store found, starting empty");
        return Ok(Library::new());
    }
    let meta = load_meta(paths)?;
    if meta.version != STORE_VERSION {
        anyhow::bail!("unsupported store version {} (expected {})", meta.version, STORE_VERSION);
    }
    Ok(Library::from_snapshot(load_snapshot(paths)?))
}

/// Write the library snapshot and refresh meta.json. `created_at` is kept from an existing meta file.
pub fn save_library(paths: &StorePaths, library: &Library) -> Result<()> {
    let snapshot = library.snapshot();
    save_snapshot(paths, &snapshot)?;
    let created_at = if paths.meta().exists() {
        load_meta(paths)?.created_at
    } else {
        time::OffsetDateTime::now_utc()
            .format(&time::format_description::well_known::Rfc3339)
            .unwrap_or_else(|_| "".into())
    };
    let meta = MetaFile {
        num_docs: snapshot.documents.len() as u32,
        num_collections: snapshot.collections.len() as u32,
        created_at,
        version: STORE_VERSION,
    };
    save_meta(paths, &meta)?;
    tracing::debug!(root = %paths.root.display(), num_docs = meta.num_docs, "store saved");
    Ok(())
}
