use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::Context;

/// Read every JSON file under a path.
///
/// If pointed at a file, reads just that file whatever its extension.
/// Directories are walked recursively in sorted order and only files with a
/// `.json` extension are read.
pub fn json_files(
    path: impl AsRef<Path>,
) -> anyhow::Result<Vec<(PathBuf, String)>> {
    let path = path.as_ref();

    if path.is_file() {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        return Ok(vec![(path.to_owned(), text)]);
    }

    let mut ret = Vec::new();
    for e in walkdir::WalkDir::new(path).sort_by_file_name() {
        let e = e.with_context(|| format!("walking {}", path.display()))?;
        if !e.file_type().is_file() {
            continue;
        }

        if e.path().extension().and_then(|a| a.to_str()) != Some("json") {
            log::debug!("json_files: skipping {}", e.path().display());
            continue;
        }

        let text = fs::read_to_string(e.path())
            .with_context(|| format!("reading {}", e.path().display()))?;
        ret.push((e.path().to_owned(), text));
    }

    Ok(ret)
}
