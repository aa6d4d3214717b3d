//! Whole-directory conversion and compression comparison.
//!
//! A failure on one file never stops the run: it is logged, recorded in the
//! report and the remaining files are still processed.

use crate::container::{cat_to_png, encode, png_to_cat, CatError, RawImage};
use log::{info, warn};
use std::fs;
use std::path::{Path, PathBuf};

/// The format a batch converts into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// Convert `*.png` files into `*.cat`.
    Cat,
    /// Convert `*.cat` files into `*.png`.
    Png,
}

impl Target {
    /// Extension of the files that get converted.
    pub fn source_extension(self) -> &'static str {
        match self {
            Target::Cat => "png",
            Target::Png => "cat",
        }
    }

    /// Extension of the files that get written.
    pub fn output_extension(self) -> &'static str {
        match self {
            Target::Cat => "cat",
            Target::Png => "png",
        }
    }
}

/// The outcome of converting a single file.
#[derive(Debug)]
pub struct BatchItem {
    pub source: PathBuf,
    pub output: PathBuf,
    pub result: Result<(), CatError>,
}

#[derive(Debug, Default)]
pub struct BatchReport {
    pub items: Vec<BatchItem>,
}

impl BatchReport {
    /// Number of matching files found in the input directory.
    pub fn found(&self) -> usize {
        self.items.len()
    }

    pub fn converted(&self) -> usize {
        self.items.iter().filter(|item| item.result.is_ok()).count()
    }

    pub fn failed(&self) -> usize {
        self.items.iter().filter(|item| item.result.is_err()).count()
    }
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case(extension))
        .unwrap_or(false)
}

/// Lists the regular files of `dir` with the given extension (case
/// insensitive), sorted by path. Subdirectories are not visited.
fn files_with_extension(dir: &Path, extension: &str) -> Result<Vec<PathBuf>, CatError> {
    if !dir.is_dir() {
        return Err(CatError::DirectoryNotFound(dir.to_path_buf()));
    }

    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && has_extension(&path, extension) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Converts every file of `input_dir` whose extension matches `target` and
/// writes the results into `output_dir`, which is created if missing.
///
/// Output files keep the source file stem, e.g. `a.png` -> `a.cat`.
pub fn convert_directory<P, Q>(
    input_dir: P,
    output_dir: Q,
    target: Target,
) -> Result<BatchReport, CatError>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    let sources = files_with_extension(input_dir.as_ref(), target.source_extension())?;
    let output_dir = output_dir.as_ref();
    fs::create_dir_all(output_dir)?;
    info!(
        "Found {} .{} files to convert",
        sources.len(),
        target.source_extension()
    );

    let mut report = BatchReport::default();
    for source in sources {
        let mut name = source.file_stem().unwrap_or_default().to_os_string();
        name.push(".");
        name.push(target.output_extension());
        let output = output_dir.join(name);

        let result = match target {
            Target::Cat => png_to_cat(&source, &output),
            Target::Png => cat_to_png(&source, &output),
        };
        match &result {
            Ok(()) => info!("{} -> {}", source.display(), output.display()),
            Err(e) => warn!("Failed to convert {}: {}", source.display(), e),
        }

        report.items.push(BatchItem {
            source,
            output,
            result,
        });
    }
    Ok(report)
}

/// Size comparison between a PNG file and its CAT encoding.
#[derive(Debug, Clone, PartialEq)]
pub struct CompressionEntry {
    pub file: PathBuf,
    pub png_size: u64,
    pub cat_size: u64,
}

impl CompressionEntry {
    /// CAT size as a percentage of the PNG size.
    pub fn ratio(&self) -> f64 {
        self.cat_size as f64 / self.png_size as f64 * 100.0
    }

    /// Bytes saved by the CAT encoding, negative if it is larger.
    pub fn savings(&self) -> i64 {
        self.png_size as i64 - self.cat_size as i64
    }
}

#[derive(Debug, Default)]
pub struct CompressionReport {
    pub entries: Vec<CompressionEntry>,
    pub failures: Vec<(PathBuf, CatError)>,
}

impl CompressionReport {
    pub fn total_png(&self) -> u64 {
        self.entries.iter().map(|e| e.png_size).sum()
    }

    pub fn total_cat(&self) -> u64 {
        self.entries.iter().map(|e| e.cat_size).sum()
    }

    /// Total CAT size as a percentage of the total PNG size, `None` when
    /// no PNG bytes were measured.
    pub fn total_ratio(&self) -> Option<f64> {
        match self.total_png() {
            0 => None,
            png => Some(self.total_cat() as f64 / png as f64 * 100.0),
        }
    }

    pub fn total_savings(&self) -> i64 {
        self.total_png() as i64 - self.total_cat() as i64
    }
}

fn compare_file(path: &Path) -> Result<CompressionEntry, CatError> {
    let png_size = fs::metadata(path)?.len();
    let image = RawImage::open(path)?;
    let cat_size = encode(&image).len() as u64;
    Ok(CompressionEntry {
        file: path.to_path_buf(),
        png_size,
        cat_size,
    })
}

/// Encodes every PNG of `dir` in memory and compares the CAT size with the
/// PNG file size. Nothing is written to disk.
pub fn compare_compression<P>(dir: P) -> Result<CompressionReport, CatError>
where
    P: AsRef<Path>,
{
    let mut report = CompressionReport::default();
    for path in files_with_extension(dir.as_ref(), "png")? {
        match compare_file(&path) {
            Ok(entry) => report.entries.push(entry),
            Err(e) => {
                warn!("Failed to analyze {}: {}", path.display(), e);
                report.failures.push((path, e));
            }
        }
    }
    Ok(report)
}
