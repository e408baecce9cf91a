//! Read/write the regressions document.
//!
//! The document is the "portable" representation of every fitted category:
//!
//! ```json
//! { "BLITZ": { "type": "linear", "params": [1.02, -15.3] }, ... }
//! ```
//!
//! It is written once, after every category has been fitted, via a sibling
//! temp file that is renamed into place.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::info;

use crate::domain::{Category, RegressionDocument};
use crate::error::{RegressionError, Result};

/// Write the document as pretty-printed JSON.
pub fn write_document(path: &Path, document: &RegressionDocument) -> Result<()> {
    let missing: Vec<&str> = Category::ALL
        .iter()
        .filter(|c| !document.contains_key(c))
        .map(|c| c.as_str())
        .collect();
    if !missing.is_empty() {
        return Err(RegressionError::InvalidDocument(format!(
            "refusing to write a document without {}",
            missing.join(", ")
        )));
    }
    for regression in document.values() {
        regression.validate()?;
    }

    let tmp = temp_path(path);
    let io_err = |p: &Path| {
        let p = p.display().to_string();
        move |source| RegressionError::Io { path: p, source }
    };

    let file = File::create(&tmp).map_err(io_err(&tmp))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, document)?;
    writer.write_all(b"\n").map_err(io_err(&tmp))?;
    writer.flush().map_err(io_err(&tmp))?;
    drop(writer);

    if let Err(source) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(RegressionError::Io {
            path: path.display().to_string(),
            source,
        });
    }

    info!(path = %path.display(), categories = document.len(), "wrote regressions document");
    Ok(())
}

/// Read a document and validate each entry's parameter count.
pub fn read_document(path: &Path) -> Result<RegressionDocument> {
    let file = File::open(path).map_err(|source| RegressionError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let document: RegressionDocument = serde_json::from_reader(file)?;
    for (category, regression) in &document {
        regression
            .validate()
            .map_err(|e| e.in_category(*category))?;
    }
    Ok(document)
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "regressions.json".into());
    name.push(".tmp");
    path.with_file_name(name)
}
