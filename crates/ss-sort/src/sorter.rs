use std::fs;
use std::path::{Path, PathBuf};

use ss_audio::FeatureExtractor;
use ss_core::ClassLabel;
use ss_model::SampleClassifier;

use crate::error::SortError;
use crate::scan::scan_audio_files;
use crate::transfer::{TransferMode, transfer};

/// A file that reached its class directory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SortedFile {
    /// Original location.
    pub source: PathBuf,
    /// New location, `root/<class>/<file name>`.
    pub destination: PathBuf,
    /// Predicted class.
    pub label: ClassLabel,
}

/// A file left in place because it failed to decode, classify, or transfer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SkippedFile {
    /// File that was skipped.
    pub path: PathBuf,
    /// Error message.
    pub reason: String,
}

/// Bilan d'un passage de tri.
#[derive(Clone, Debug, Default)]
pub struct SortReport {
    counts: [usize; ClassLabel::COUNT],
    /// Files sorted, in processing order.
    pub sorted: Vec<SortedFile>,
    /// Files skipped, in processing order.
    pub skipped: Vec<SkippedFile>,
}

impl SortReport {
    /// Number of files sorted into `label`.
    #[must_use]
    pub fn count(&self, label: ClassLabel) -> usize {
        self.counts[label.index()]
    }

    /// Per-class counters in label order.
    pub fn counts(&self) -> impl Iterator<Item = (ClassLabel, usize)> + '_ {
        ClassLabel::ALL.into_iter().map(|l| (l, self.count(l)))
    }

    /// Total number of files sorted.
    #[must_use]
    pub fn total_sorted(&self) -> usize {
        self.counts.iter().sum()
    }

    fn record(&mut self, file: SortedFile) {
        self.counts[file.label.index()] += 1;
        self.sorted.push(file);
    }
}

/// Progress notification emitted once per candidate file.
#[derive(Debug)]
pub enum Progress<'a> {
    /// The file was classified and transferred.
    Sorted {
        /// 1-based position in the run.
        index: usize,
        /// Number of candidate files.
        total: usize,
        /// Path relative to the root.
        relative: &'a Path,
        /// Predicted class.
        label: ClassLabel,
    },
    /// The file was skipped.
    Skipped {
        /// 1-based position in the run.
        index: usize,
        /// Number of candidate files.
        total: usize,
        /// Path relative to the root.
        relative: &'a Path,
        /// Error that caused the skip.
        error: &'a SortError,
    },
}

/// Trie un dossier d'échantillons dans ses sous-dossiers de classe.
///
/// The classifier is borrowed for the whole run and never mutated.
pub struct FolderSorter<'m> {
    root: PathBuf,
    classifier: &'m SampleClassifier,
    extractor: FeatureExtractor,
    mode: TransferMode,
    extensions: Vec<String>,
}

impl<'m> FolderSorter<'m> {
    /// Create a sorter for `root`.
    #[must_use]
    pub fn new(
        root: impl Into<PathBuf>,
        classifier: &'m SampleClassifier,
        extractor: FeatureExtractor,
        mode: TransferMode,
        extensions: Vec<String>,
    ) -> Self {
        Self {
            root: root.into(),
            classifier,
            extractor,
            mode,
            extensions,
        }
    }

    /// Fichiers candidats pour le prochain passage.
    #[must_use]
    pub fn candidates(&self) -> Vec<PathBuf> {
        scan_audio_files(&self.root, &self.extensions)
    }

    /// Create the four class directories under the root.
    ///
    /// # Errors
    /// `SortError::NotADirectory` if the root is not a directory,
    /// `SortError::CreateDir` if a class directory cannot be created.
    pub fn prepare(&self) -> Result<(), SortError> {
        if !self.root.is_dir() {
            return Err(SortError::NotADirectory(self.root.clone()));
        }
        for label in ClassLabel::ALL {
            let path = self.root.join(label.dir_name());
            fs::create_dir_all(&path).map_err(|source| SortError::CreateDir { path, source })?;
        }
        Ok(())
    }

    /// Classify and transfer a single file.
    ///
    /// # Errors
    /// Returns the extraction, inference, or transfer error for this file.
    pub fn sort_file(&mut self, path: &Path) -> Result<SortedFile, SortError> {
        let mel = self.extractor.extract(path)?;
        let label = self.classifier.classify(&mel)?;

        let file_name = path.file_name().ok_or_else(|| SortError::Transfer {
            from: path.to_path_buf(),
            to: self.root.join(label.dir_name()),
            source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "no file name"),
        })?;
        let destination = self.root.join(label.dir_name()).join(file_name);

        transfer(path, &destination, self.mode).map_err(|source| SortError::Transfer {
            from: path.to_path_buf(),
            to: destination.clone(),
            source,
        })?;

        Ok(SortedFile {
            source: path.to_path_buf(),
            destination,
            label,
        })
    }

    /// Run a full pass: prepare, scan, and sort every candidate in path order.
    ///
    /// A file that fails is logged, reported through `on_progress`, recorded
    /// in [`SortReport::skipped`], and left in place.
    ///
    /// # Errors
    /// Only setup failures (see [`FolderSorter::prepare`]) abort the run.
    pub fn run(&mut self, mut on_progress: impl FnMut(Progress<'_>)) -> Result<SortReport, SortError> {
        self.prepare()?;

        let files = self.candidates();
        let total = files.len();
        log::info!("{total} fichier(s) à classer dans {}", self.root.display());

        let mut report = SortReport::default();
        for (i, path) in files.iter().enumerate() {
            let relative = path.strip_prefix(&self.root).unwrap_or(path);
            match self.sort_file(path) {
                Ok(sorted) => {
                    on_progress(Progress::Sorted {
                        index: i + 1,
                        total,
                        relative,
                        label: sorted.label,
                    });
                    report.record(sorted);
                }
                Err(error) => {
                    log::warn!("Ignoré {} : {error}", path.display());
                    on_progress(Progress::Skipped {
                        index: i + 1,
                        total,
                        relative,
                        error: &error,
                    });
                    report.skipped.push(SkippedFile {
                        path: path.clone(),
                        reason: error.to_string(),
                    });
                }
            }
        }

        Ok(report)
    }
}
