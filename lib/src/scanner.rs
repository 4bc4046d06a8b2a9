use std::{
    io,
    path::{
        Path,
        PathBuf,
    },
    sync::mpsc::{
        self,
        Receiver,
    },
    thread::{
        self,
        JoinHandle,
    },
};

use thiserror::Error;

use crate::{
    fs,
    target::{
        ArtifactKind,
        DirectoryEntry,
        ScanResult,
    },
    DirEntryEx,
    DirWalker,
    PathEx,
    SizeStrategy,
};

/// Directory names which are never descended into nor reported.
pub const SKIPPED_DIR_NAMES: [&str; 2] = [".git", ".idea"];

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("failed to read scan root {}: {source}", path.display())]
    RootUnreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

pub struct ScanOptions {
    /// How the size of every matched directory gets measured.
    pub size_strategy: SizeStrategy,

    pub report_consumer: Box<dyn ScanReportConsumer + Send>,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            size_strategy: SizeStrategy::detect(),
            report_consumer: Box::new(VoidScanReportConsumer),
        }
    }
}

pub trait ScanReportConsumer {
    fn consume_report(&mut self, report: ScanReport);
}

pub struct VoidScanReportConsumer;
impl ScanReportConsumer for VoidScanReportConsumer {
    fn consume_report(&mut self, _report: ScanReport) {}
}

pub enum ScanReport {
    StatusInspecting(PathBuf),
    StatusMeasuring(PathBuf),
    ErrorFs { path: PathBuf, error: io::Error },
}

/// Walks a directory tree and collects all `node_modules` and `target` directories.
pub struct Scanner {
    options: ScanOptions,
}

impl Scanner {
    pub fn new(options: ScanOptions) -> Self {
        Self { options }
    }

    /// Scan `root_directory` on the current thread.
    ///
    /// Unreadable sub directories are logged and skipped, only an unreadable root fails the scan.
    pub fn scan(&mut self, root_directory: &Path) -> Result<ScanResult, ScanError> {
        self.scan_with(root_directory, |_entry| true)
    }

    /// Scan `root_directory` on a worker thread.
    ///
    /// Every entry is sent as soon as it has been measured. The scan stops early
    /// when the receiving end gets dropped.
    pub fn spawn(
        mut self,
        root_directory: PathBuf,
    ) -> (
        JoinHandle<Result<ScanResult, ScanError>>,
        Receiver<DirectoryEntry>,
    ) {
        let (tx, rx) = mpsc::channel();
        let handle = thread::spawn(move || {
            self.scan_with(&root_directory, |entry| tx.send(entry.clone()).is_ok())
        });

        (handle, rx)
    }

    fn scan_with(
        &mut self,
        root_directory: &Path,
        mut on_entry: impl FnMut(&DirectoryEntry) -> bool,
    ) -> Result<ScanResult, ScanError> {
        let mut dir_walker = DirWalker::new();
        if let Err(error) = dir_walker.insert_entries(root_directory) {
            log::warn!(
                "Failed to read root dir {}: {:#}",
                root_directory.display(),
                error
            );
            return Err(ScanError::RootUnreadable {
                path: root_directory.to_owned(),
                source: error,
            });
        }

        let mut result = ScanResult::default();
        while let Some(item) = dir_walker.next_item() {
            let item_path = item.path();
            let item_name = item_path.file_name_truncate();
            if SKIPPED_DIR_NAMES.iter().any(|name| *name == item_name) || !item.is_dir() {
                continue;
            }

            let Some(kind) = ArtifactKind::from_dir_name(item_name) else {
                self.options
                    .report_consumer
                    .consume_report(ScanReport::StatusInspecting(item_path.clone()));

                if let Err(error) = dir_walker.insert_entries(&item_path) {
                    log::warn!(
                        "Failed to read directory {}: {:#}",
                        item_path.display(),
                        error
                    );
                    self.options
                        .report_consumer
                        .consume_report(ScanReport::ErrorFs {
                            path: item_path,
                            error,
                        });
                }
                continue;
            };

            self.options
                .report_consumer
                .consume_report(ScanReport::StatusMeasuring(item_path.clone()));

            let size = fs::compute_size(&item_path, self.options.size_strategy);
            let entry = DirectoryEntry::new(kind, item_path, size);
            log::trace!(
                "Identified {} at {} ({} bytes)",
                kind,
                entry.path().display(),
                size
            );

            let keep_going = on_entry(&entry);
            result.push(entry);
            if !keep_going {
                log::debug!("Aborting scan as receiving end has been closed");
                break;
            }
        }

        Ok(result)
    }
}

impl Default for Scanner {
    fn default() -> Self {
        Self::new(ScanOptions::default())
    }
}
