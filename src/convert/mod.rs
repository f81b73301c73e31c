//! Conversion of files and directories to section JSON.
//!
//! [`convert_path`] is the dispatcher behind the CLI: it selects a reader per
//! file, segments the blocks, and writes one JSON file per input.
//!
//! # Example
//!
//! ```no_run
//! use docsect::convert::{convert_path, ConvertOptions};
//!
//! fn main() -> docsect::Result<()> {
//!     let report = convert_path("docs/", "out/", &ConvertOptions::default())?;
//!     println!("{} converted, {} failed", report.converted(), report.failed());
//!     Ok(())
//! }
//! ```

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::detect::DocumentFormat;
use crate::error::{Error, Result};
use crate::model::Section;
use crate::parser::{ParseOptions, Reader};
use crate::render::{write_json, JsonFormat};
use crate::segment::{segment, SegmentOptions};

/// Options for document conversion.
#[derive(Debug, Clone, Default)]
pub struct ConvertOptions {
    /// Reader options
    pub parse: ParseOptions,

    /// Segmenter options
    pub segment: SegmentOptions,

    /// Output JSON layout
    pub format: JsonFormat,

    /// Convert the files of a directory in parallel
    pub parallel: bool,
}

impl ConvertOptions {
    /// Create new conversion options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set reader options.
    pub fn with_parse_options(mut self, options: ParseOptions) -> Self {
        self.parse = options;
        self
    }

    /// Set segmenter options.
    pub fn with_segment_options(mut self, options: SegmentOptions) -> Self {
        self.segment = options;
        self
    }

    /// Set output format.
    pub fn with_format(mut self, format: JsonFormat) -> Self {
        self.format = format;
        self
    }

    /// Enable parallel directory conversion.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }
}

/// What happened to one input file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutcomeStatus {
    /// JSON was written
    Converted {
        /// Number of sections written
        sections: usize,
    },
    /// The file was not a supported document
    Skipped {
        /// Why the file was skipped
        reason: String,
    },
    /// The document could not be read
    Failed {
        /// Error message
        error: String,
    },
}

/// Result of converting one input file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileOutcome {
    /// Input file
    pub input: PathBuf,
    /// Output file, for converted inputs
    pub output: Option<PathBuf>,
    /// Status
    pub status: OutcomeStatus,
}

impl FileOutcome {
    fn converted(input: &Path, output: PathBuf, sections: usize) -> Self {
        Self {
            input: input.to_path_buf(),
            output: Some(output),
            status: OutcomeStatus::Converted { sections },
        }
    }

    fn skipped(input: &Path, reason: impl Into<String>) -> Self {
        Self {
            input: input.to_path_buf(),
            output: None,
            status: OutcomeStatus::Skipped {
                reason: reason.into(),
            },
        }
    }

    fn failed(input: &Path, error: &Error) -> Self {
        Self {
            input: input.to_path_buf(),
            output: None,
            status: OutcomeStatus::Failed {
                error: error.to_string(),
            },
        }
    }

    /// Check if the file failed to convert.
    pub fn is_failed(&self) -> bool {
        matches!(self.status, OutcomeStatus::Failed { .. })
    }
}

/// Per-file results of a conversion run, in input order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    /// One outcome per input file
    pub outcomes: Vec<FileOutcome>,
}

impl BatchReport {
    /// Number of converted files.
    pub fn converted(&self) -> usize {
        self.count(|s| matches!(s, OutcomeStatus::Converted { .. }))
    }

    /// Number of skipped files.
    pub fn skipped(&self) -> usize {
        self.count(|s| matches!(s, OutcomeStatus::Skipped { .. }))
    }

    /// Number of failed files.
    pub fn failed(&self) -> usize {
        self.count(|s| matches!(s, OutcomeStatus::Failed { .. }))
    }

    /// True when no file failed. Skipped files do not count as failures.
    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }

    fn count(&self, pred: impl Fn(&OutcomeStatus) -> bool) -> usize {
        self.outcomes.iter().filter(|o| pred(&o.status)).count()
    }
}

/// Read a document and segment it into sections.
pub fn sections_from_path<P: AsRef<Path>>(path: P, options: &ConvertOptions) -> Result<Vec<Section>> {
    let reader = Reader::open(path, &options.parse)?;
    Ok(segment(reader.blocks(), &options.segment))
}

/// Convert one document to a JSON file, returning the number of sections.
pub fn convert_file<P, Q>(input: P, output: Q, options: &ConvertOptions) -> Result<usize>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    let sections = sections_from_path(input, options)?;
    write_json(output, &sections, options.format)?;
    Ok(sections.len())
}

/// Convert a file or every document directly inside a directory.
///
/// See [`convert_path_with_progress`].
pub fn convert_path<P, Q>(input: P, output: Q, options: &ConvertOptions) -> Result<BatchReport>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    convert_path_with_progress(input, output, options, |_| {})
}

/// Convert a file or directory, calling `on_file` after each input.
///
/// A single file is written to `output`, or to `<output>/<stem>.json` when
/// `output` is an existing directory; any error is returned.
///
/// For a directory, `output` is a directory (created if missing) receiving
/// one `<stem>.json` per document. Unsupported files are skipped and
/// unreadable documents are recorded as failures in the report; only
/// [`Error::NoInput`] and [`Error::Write`] abort the run.
pub fn convert_path_with_progress<P, Q, F>(
    input: P,
    output: Q,
    options: &ConvertOptions,
    on_file: F,
) -> Result<BatchReport>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
    F: Fn(&FileOutcome) + Sync,
{
    let input = input.as_ref();
    let output = output.as_ref();

    if input.is_file() {
        let outcome = convert_single(input, output, options)?;
        on_file(&outcome);
        Ok(BatchReport {
            outcomes: vec![outcome],
        })
    } else if input.is_dir() {
        convert_dir(input, output, options, &on_file)
    } else {
        Err(Error::NoInput(input.to_path_buf()))
    }
}

fn convert_single(input: &Path, output: &Path, options: &ConvertOptions) -> Result<FileOutcome> {
    DocumentFormat::from_path(input)?;

    let target = if output.is_dir() {
        output.join(format!("{}.json", file_stem(input)))
    } else {
        output.to_path_buf()
    };

    let sections = convert_file(input, &target, options)?;
    log::info!("{} -> {} ({} sections)", input.display(), target.display(), sections);
    Ok(FileOutcome::converted(input, target, sections))
}

/// One directory entry scheduled for conversion.
enum Job {
    Convert { input: PathBuf, output: PathBuf },
    Skip { input: PathBuf, reason: String },
}

fn convert_dir<F>(input: &Path, output: &Path, options: &ConvertOptions, on_file: &F) -> Result<BatchReport>
where
    F: Fn(&FileOutcome) + Sync,
{
    let files = list_files(input)?;
    let jobs = plan_jobs(&files, output);

    if !jobs.iter().any(|j| matches!(j, Job::Convert { .. })) {
        return Err(Error::NoInput(input.to_path_buf()));
    }

    fs::create_dir_all(output).map_err(|source| Error::Write {
        path: output.to_path_buf(),
        source,
    })?;

    let run = |job: &Job| -> Result<FileOutcome> {
        let outcome = match job {
            Job::Skip { input, reason } => {
                log::warn!("Skipping {}: {}", input.display(), reason);
                FileOutcome::skipped(input, reason.clone())
            }
            Job::Convert { input, output } => match convert_file(input, output, options) {
                Ok(sections) => {
                    log::info!("{} -> {} ({} sections)", input.display(), output.display(), sections);
                    FileOutcome::converted(input, output.clone(), sections)
                }
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    log::warn!("Failed to convert {}: {}", input.display(), e);
                    FileOutcome::failed(input, &e)
                }
            },
        };
        on_file(&outcome);
        Ok(outcome)
    };

    let outcomes = if options.parallel {
        jobs.par_iter().map(run).collect::<Result<Vec<_>>>()?
    } else {
        jobs.iter().map(run).collect::<Result<Vec<_>>>()?
    };

    Ok(BatchReport { outcomes })
}

/// Regular files directly inside `dir`, sorted by file name.
fn list_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

/// Assign output names.
///
/// Inputs sharing a stem keep their extension (`a.pdf.json`). Names that
/// still clash fall back to the full file name, then to a numbered suffix.
fn plan_jobs(files: &[PathBuf], output_dir: &Path) -> Vec<Job> {
    let mut stem_counts: HashMap<String, usize> = HashMap::new();
    for file in files {
        if DocumentFormat::from_path(file).is_ok() {
            *stem_counts.entry(file_stem(file)).or_insert(0) += 1;
        }
    }

    let candidates: Vec<Option<String>> = files
        .iter()
        .map(|file| {
            DocumentFormat::from_path(file).ok().map(|_| {
                let stem = file_stem(file);
                if stem_counts.get(&stem).copied().unwrap_or(0) > 1 {
                    let ext = file
                        .extension()
                        .map(|e| e.to_string_lossy().to_string())
                        .unwrap_or_default();
                    format!("{}.{}.json", stem, ext)
                } else {
                    format!("{}.json", stem)
                }
            })
        })
        .collect();

    let mut name_counts: HashMap<&str, usize> = HashMap::new();
    for name in candidates.iter().flatten() {
        *name_counts.entry(name.as_str()).or_insert(0) += 1;
    }
    let mut taken: HashSet<String> = candidates
        .iter()
        .flatten()
        .filter(|name| name_counts[name.as_str()] == 1)
        .cloned()
        .collect();

    files
        .iter()
        .zip(&candidates)
        .map(|(file, candidate)| match candidate {
            Some(name) => {
                let name = if name_counts[name.as_str()] == 1 {
                    name.clone()
                } else {
                    let unique = unique_name(file, &taken);
                    log::debug!("Output name {} is ambiguous, using {}", name, unique);
                    taken.insert(unique.clone());
                    unique
                };
                Job::Convert {
                    input: file.clone(),
                    output: output_dir.join(name),
                }
            }
            None => Job::Skip {
                input: file.clone(),
                reason: DocumentFormat::from_path(file)
                    .err()
                    .map(|e| e.to_string())
                    .unwrap_or_default(),
            },
        })
        .collect()
}

/// `<file name>.json`, or `<file name>.<n>.json` when that is taken.
fn unique_name(file: &Path, taken: &HashSet<String>) -> String {
    let file_name = file
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "output".to_string());

    let mut name = format!("{}.json", file_name);
    let mut n = 2;
    while taken.contains(&name) {
        name = format!("{}.{}.json", file_name, n);
        n += 1;
    }
    name
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "output".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convert_options_builder() {
        let options = ConvertOptions::new()
            .with_format(JsonFormat::Compact)
            .with_parallel(true)
            .with_segment_options(SegmentOptions::new().with_drop_empty(true))
            .with_parse_options(ParseOptions::new().lenient());

        assert_eq!(options.format, JsonFormat::Compact);
        assert!(options.parallel);
        assert!(options.segment.drop_empty);
    }

    #[test]
    fn test_plan_jobs_names() {
        let files = vec![
            PathBuf::from("in/a.docx"),
            PathBuf::from("in/b.pdf"),
            PathBuf::from("in/b.docx"),
            PathBuf::from("in/notes.txt"),
        ];
        let jobs = plan_jobs(&files, Path::new("out"));

        let names: Vec<String> = jobs
            .iter()
            .map(|j| match j {
                Job::Convert { output, .. } => output.display().to_string(),
                Job::Skip { input, .. } => format!("skip {}", input.display()),
            })
            .collect();
        assert_eq!(
            names,
            vec![
                Path::new("out").join("a.json").display().to_string(),
                Path::new("out").join("b.pdf.json").display().to_string(),
                Path::new("out").join("b.docx.json").display().to_string(),
                "skip in/notes.txt".to_string(),
            ]
        );
    }

    #[test]
    fn test_plan_jobs_resolves_extension_clash() {
        let files = vec![
            PathBuf::from("in/x.docx"),
            PathBuf::from("in/x.pdf"),
            PathBuf::from("in/x.pdf.docx"),
        ];
        let outputs: Vec<PathBuf> = plan_jobs(&files, Path::new("out"))
            .into_iter()
            .filter_map(|j| match j {
                Job::Convert { output, .. } => Some(output),
                Job::Skip { .. } => None,
            })
            .collect();

        assert_eq!(
            outputs,
            vec![
                Path::new("out").join("x.docx.json"),
                Path::new("out").join("x.pdf.json"),
                Path::new("out").join("x.pdf.docx.json"),
            ]
        );
    }

    #[test]
    fn test_unique_name_numbers_taken_names() {
        let taken: HashSet<String> = ["a.pdf.json".to_string(), "a.pdf.2.json".to_string()]
            .into_iter()
            .collect();
        assert_eq!(unique_name(Path::new("in/a.pdf"), &taken), "a.pdf.3.json");
        assert_eq!(unique_name(Path::new("in/b.pdf"), &taken), "b.pdf.json");
    }

    #[test]
    fn test_missing_input_is_no_input() {
        let dir = tempfile::tempdir().unwrap();
        let err = convert_path(dir.path().join("nope"), dir.path(), &ConvertOptions::default())
            .unwrap_err();
        assert!(matches!(err, Error::NoInput(_)));
    }

    #[test]
    fn test_directory_without_documents_is_no_input() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("readme.txt"), "hi").unwrap();
        let err = convert_path(dir.path(), dir.path().join("out"), &ConvertOptions::default())
            .unwrap_err();
        assert!(matches!(err, Error::NoInput(_)));
    }

    #[test]
    fn test_single_unsupported_file() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("notes.txt");
        fs::write(&input, "hi").unwrap();
        let err = convert_path(&input, dir.path().join("out.json"), &ConvertOptions::default())
            .unwrap_err();
        assert!(matches!(err, Error::UnsupportedFormat(_)));
    }

    #[test]
    fn test_batch_report_counts() {
        let report = BatchReport {
            outcomes: vec![
                FileOutcome::converted(Path::new("a.docx"), PathBuf::from("a.json"), 3),
                FileOutcome::skipped(Path::new("b.txt"), "unsupported"),
                FileOutcome::failed(Path::new("c.pdf"), &Error::Encrypted),
            ],
        };
        assert_eq!(report.converted(), 1);
        assert_eq!(report.skipped(), 1);
        assert_eq!(report.failed(), 1);
        assert!(!report.is_success());
        assert!(report.outcomes[2].is_failed());
    }
}
