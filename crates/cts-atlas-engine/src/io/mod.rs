use relative_path::RelativePath;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};

/// File name of the per-directory library metadata.
pub const METADATA_FILE: &str = "metadata.json";

#[derive(Debug, thiserror::Error)]
pub enum IoError {
    #[error("File not found: {0}")]
    NotFound(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid data directory: {0}")]
    InvalidDataDir(String),
    #[error("Invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Read a file below the data directory and return its content
pub fn read_file(relative_path: &RelativePath, data_root: &Path) -> Result<String, IoError> {
    let absolute_path = relative_path.to_path(data_root);
    if !absolute_path.exists() {
        return Err(IoError::NotFound(absolute_path));
    }
    fs::read_to_string(&absolute_path).map_err(IoError::Io)
}

/// Read and decode a JSON metadata file
pub fn read_metadata<T: DeserializeOwned>(path: &Path) -> Result<T, IoError> {
    if !path.exists() {
        return Err(IoError::NotFound(path.to_path_buf()));
    }
    let content = fs::read_to_string(path).map_err(IoError::Io)?;
    serde_json::from_str(&content).map_err(|source| IoError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Scan for metadata files in the data directory, sorted by path
pub fn scan_metadata_files(data_root: &Path) -> Result<Vec<PathBuf>, IoError> {
    validate_data_dir(data_root)?;

    let mut files = Vec::new();
    scan_directory_recursive(data_root, &mut files)?;
    files.sort();
    Ok(files)
}

fn scan_directory_recursive(dir: &Path, files: &mut Vec<PathBuf>) -> Result<(), IoError> {
    let entries = fs::read_dir(dir).map_err(IoError::Io)?;

    for entry in entries {
        let entry = entry.map_err(IoError::Io)?;
        let path = entry.path();

        if path.is_dir() {
            scan_directory_recursive(&path, files)?;
        } else if let Some(name) = path.file_name()
            && name == METADATA_FILE
        {
            files.push(path);
        }
    }

    Ok(())
}

pub fn validate_data_dir(path: &Path) -> Result<(), IoError> {
    if !path.exists() || !path.is_dir() {
        return Err(IoError::InvalidDataDir(format!(
            "{} does not exist or is not a directory",
            path.display()
        )));
    }

    Ok(())
}
