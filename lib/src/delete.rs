use std::{
    fs,
    io,
    path::{
        Path,
        PathBuf,
    },
    sync::{
        atomic::{
            AtomicBool,
            Ordering,
        },
        Arc,
    },
};

use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DeleteError {
    #[error("access denied while deleting {}: {source}", path.display())]
    AccessDenied {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{} vanished while deleting it: {source}", path.display())]
    NotFound {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{} is not a directory", path.display())]
    NotADirectory { path: PathBuf },

    #[error("failed to delete {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl DeleteError {
    fn from_io(path: &Path, source: io::Error) -> Self {
        let path = path.to_owned();
        match source.kind() {
            io::ErrorKind::PermissionDenied => Self::AccessDenied { path, source },
            io::ErrorKind::NotFound => Self::NotFound { path, source },
            _ => Self::Io { path, source },
        }
    }
}

/// Result of a single deletion within a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeletionOutcome {
    pub path: PathBuf,
    pub success: bool,
    pub error: Option<String>,
}

impl DeletionOutcome {
    pub fn succeeded(path: PathBuf) -> Self {
        Self {
            path,
            success: true,
            error: None,
        }
    }

    pub fn failed(path: PathBuf, error: impl ToString) -> Self {
        Self {
            path,
            success: false,
            error: Some(error.to_string()),
        }
    }
}

/// Emitted once after every path of a batch has been processed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteProgress {
    pub completed: usize,
    pub total: usize,

    /// `completed / total` as a rounded percentage
    pub percent: u8,

    pub path: PathBuf,
    pub success: bool,
}

pub trait DeleteProgressConsumer {
    fn consume_progress(&mut self, progress: DeleteProgress);
}

pub struct VoidDeleteProgressConsumer;
impl DeleteProgressConsumer for VoidDeleteProgressConsumer {
    fn consume_progress(&mut self, _progress: DeleteProgress) {}
}

impl<F: FnMut(DeleteProgress)> DeleteProgressConsumer for F {
    fn consume_progress(&mut self, progress: DeleteProgress) {
        self(progress)
    }
}

/// Rounded percentage of `completed / total`.
/// Only a fully completed batch reaches 100, anything less is capped at 99.
pub fn progress_percent(completed: usize, total: usize) -> u8 {
    if total == 0 || completed >= total {
        return 100;
    }

    let completed = completed as u64;
    let total = total as u64;
    (((completed * 200 + total) / (total * 2)) as u8).min(99)
}

/// Removes directory trees, one at a time.
///
/// A path which does not exist counts as deleted.
#[derive(Debug, Default, Clone)]
pub struct BatchDeleter {
    dry_run: bool,
    cancel_flag: Option<Arc<AtomicBool>>,
}

impl BatchDeleter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Only report what would be deleted.
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// The flag is checked before each path of a batch. Once set, all remaining
    /// paths are reported as cancelled without being touched.
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel_flag = Some(flag);
        self
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    fn is_cancelled(&self) -> bool {
        self.cancel_flag
            .as_ref()
            .map_or(false, |flag| flag.load(Ordering::Relaxed))
    }

    pub fn delete_one(&self, path: &Path) -> Result<(), DeleteError> {
        let meta = match fs::symlink_metadata(path) {
            Ok(meta) => meta,
            Err(error) if error.kind() == io::ErrorKind::NotFound => {
                log::debug!("{} does not exist, nothing to delete", path.display());
                return Ok(());
            }
            Err(error) => return Err(DeleteError::from_io(path, error)),
        };

        if !meta.is_dir() {
            return Err(DeleteError::NotADirectory {
                path: path.to_owned(),
            });
        }

        if self.dry_run {
            log::info!("Dry run, not deleting {}", path.display());
            return Ok(());
        }

        log::debug!("Deleting {}", path.display());
        match fs::remove_dir_all(path) {
            Ok(()) => Ok(()),
            Err(error)
                if error.kind() == io::ErrorKind::NotFound
                    && fs::symlink_metadata(path).is_err() =>
            {
                log::debug!("{} vanished while deleting it", path.display());
                Ok(())
            }
            Err(error) => {
                log::warn!("Failed to delete {}: {:#}", path.display(), error);
                Err(DeleteError::from_io(path, error))
            }
        }
    }

    /// Delete all `paths` in order.
    ///
    /// A failing path does not abort the batch. The returned outcomes are index aligned with `paths`.
    pub fn delete_many<P, C>(&self, paths: &[P], progress: &mut C) -> Vec<DeletionOutcome>
    where
        P: AsRef<Path>,
        C: DeleteProgressConsumer + ?Sized,
    {
        let total = paths.len();
        let mut outcomes = Vec::with_capacity(total);

        for (index, path) in paths.iter().enumerate() {
            let path = path.as_ref();
            let outcome = if self.is_cancelled() {
                DeletionOutcome::failed(path.to_owned(), "cancelled")
            } else {
                match self.delete_one(path) {
                    Ok(()) => DeletionOutcome::succeeded(path.to_owned()),
                    Err(error) => DeletionOutcome::failed(path.to_owned(), error),
                }
            };

            let completed = index + 1;
            progress.consume_progress(DeleteProgress {
                completed,
                total,
                percent: progress_percent(completed, total),
                path: outcome.path.clone(),
                success: outcome.success,
            });
            outcomes.push(outcome);
        }

        outcomes
    }
}

#[cfg(test)]
mod test {
    use super::progress_percent;

    #[test]
    fn percent_rounds_to_nearest() {
        assert_eq!(progress_percent(1, 3), 33);
        assert_eq!(progress_percent(2, 3), 67);
        assert_eq!(progress_percent(1, 8), 13);
        assert_eq!(progress_percent(3, 3), 100);
        assert_eq!(progress_percent(199, 200), 99);
        assert_eq!(progress_percent(0, 0), 100);
    }
}
