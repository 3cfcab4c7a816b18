//! File helpers for rendering Markdown documents and writing generated pages.

use std::{
    fs,
    io::{self, Read},
    path::{Path, PathBuf},
};

use rayon::prelude::*;

use crate::mdfmt::{Formatter, Reformatter};

/// Read and reformat one file.
///
/// # Errors
/// Returns an error if the file cannot be read.
pub fn render_file<F: Formatter>(path: &Path, reformatter: &Reformatter<F>) -> io::Result<String> {
    let text = fs::read_to_string(path)?;
    Ok(reformatter.format(&text))
}

/// Reformat several files in parallel.
///
/// Results come back in the order of `paths`, each paired with its path.
pub fn render_files<'a, F>(
    paths: &'a [PathBuf],
    reformatter: &Reformatter<F>,
) -> Vec<(&'a Path, io::Result<String>)>
where
    F: Formatter + Sync,
{
    paths
        .par_iter()
        .map(|path| (path.as_path(), render_file(path, reformatter)))
        .collect()
}

/// Read all of standard input and reformat it.
///
/// # Errors
/// Returns an error if standard input cannot be read.
pub fn render_stdin<F: Formatter>(reformatter: &Reformatter<F>) -> io::Result<String> {
    let mut text = String::new();
    io::stdin().read_to_string(&mut text)?;
    Ok(reformatter.format(&text))
}

/// Write `(file name, contents)` pairs into `dir`, creating it if needed.
///
/// # Errors
/// Returns an error if the directory cannot be created or a file cannot be
/// written. Writing stops at the first failure.
pub fn write_pages(dir: &Path, pages: &[(String, String)]) -> io::Result<Vec<PathBuf>> {
    fs::create_dir_all(dir)?;
    pages
        .iter()
        .map(|(name, contents)| {
            let path = dir.join(name);
            fs::write(&path, contents)?;
            Ok(path)
        })
        .collect()
}
