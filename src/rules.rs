//! Rule compilation.
//!
//! Turns a directory of YARA rule source files into one compiled, immutable
//! rule set. Each file's name becomes its namespace, so identically named
//! rules in different files don't collide.

use std::fs;
use std::path::Path;

use tracing::{debug, info};
use yara_x::{Compiler, Rules};

use crate::error::{Result, SentryError};

/// Compile every rule file in `dir` into a single rule set.
///
/// Non-file entries (subdirectories, sockets) are skipped. Compilation
/// happens once per run; the returned `Rules` is reused for every scanned
/// file.
pub fn compile_rules(dir: &Path) -> Result<Rules> {
    let entries =
        fs::read_dir(dir).map_err(|_| SentryError::DirectoryNotFound(dir.to_path_buf()))?;

    // Sources must outlive the compiler, which borrows them until build().
    let mut sources: Vec<(String, Vec<u8>)> = Vec::new();
    for entry in entries {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            debug!("skipping non-file entry: {}", entry.path().display());
            continue;
        }
        let namespace = entry.file_name().to_string_lossy().into_owned();
        let source = fs::read(entry.path()).map_err(|e| SentryError::FileRead {
            path: entry.path(),
            source: e,
        })?;
        sources.push((namespace, source));
    }

    let mut compiler = Compiler::new();
    for (namespace, source) in &sources {
        compiler.new_namespace(namespace);
        compiler
            .add_source(source.as_slice())
            .map_err(|e| SentryError::Compilation {
                file: namespace.clone(),
                message: e.to_string(),
            })?;
    }

    info!(
        "compiled {} rule file(s) from {}",
        sources.len(),
        dir.display()
    );
    Ok(compiler.build())
}
