use std::{
    fs::{
        self,
        DirEntry,
        Metadata,
    },
    io,
    iter,
    path::{
        Path,
        PathBuf,
    },
};

use crate::DirEntryEx;

/// Depth first directory walker.
///
/// Entries of every inserted directory are handed out in ascending name order,
/// and entries inserted later are handed out before the remaining siblings of
/// the directory they originate from.
pub(crate) struct DirWalker {
    pending_entries: Vec<DirEntry>,
}

impl DirWalker {
    pub fn new() -> Self {
        Self {
            pending_entries: Vec::with_capacity(1024),
        }
    }

    pub fn next_item(&mut self) -> Option<DirEntry> {
        self.pending_entries.pop()
    }

    pub fn insert_entries(&mut self, path: &Path) -> io::Result<()> {
        let mut entries = Vec::new();
        for entry in fs::read_dir(path)? {
            match entry {
                Ok(entry) => entries.push(entry),
                Err(error) => {
                    log::trace!("Skipping unreadable entry in {}: {}", path.display(), error)
                }
            }
        }

        /* the pending entries are a stack, the smallest name has to end up on top */
        entries.sort_unstable_by(|a, b| b.file_name().cmp(&a.file_name()));
        self.pending_entries.extend(entries);
        Ok(())
    }
}

/// How the size of a file gets accounted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeStrategy {
    /// Allocated disk space (`st_blocks * 512`).
    /// An empty file accounts for zero bytes, any other file for a multiple of the
    /// file system block size. Unlike `du`, a hard linked file is counted once per
    /// link rather than once per inode. Only available on unix, elsewhere it behaves
    /// like [SizeStrategy::Apparent].
    DiskUsage,

    /// Sum of the file lengths.
    Apparent,
}

impl SizeStrategy {
    /// Select the fastest strategy the current platform supports.
    pub fn detect() -> Self {
        if cfg!(unix) {
            Self::DiskUsage
        } else {
            Self::Apparent
        }
    }

    fn file_size(&self, meta: &Metadata) -> u64 {
        match self {
            #[cfg(unix)]
            Self::DiskUsage => {
                use std::os::unix::fs::MetadataExt;
                meta.blocks() * 512
            }
            _ => meta.len(),
        }
    }
}

impl Default for SizeStrategy {
    fn default() -> Self {
        Self::detect()
    }
}

/// Progressively estimate the size of all regular files within `dir`.
///
/// The returned iterator yields the running total in steps of roughly a thousand files.
/// Symbolic links are neither followed nor counted. Directories which can not be read
/// contribute nothing.
pub fn estimate_size(dir: PathBuf, strategy: SizeStrategy) -> impl Iterator<Item = u64> {
    let mut walker = DirWalker::new();
    if let Err(error) = walker.insert_entries(&dir) {
        log::warn!("Failed to measure {}: {}", dir.display(), error);
    }

    let mut size_iter = iter::from_fn(move || {
        while let Some(current_entry) = walker.next_item() {
            if current_entry.is_dir() {
                if let Err(error) = walker.insert_entries(&current_entry.path()) {
                    log::debug!(
                        "Failed to measure {}: {}",
                        current_entry.path().display(),
                        error
                    );
                }
                continue;
            }

            if !current_entry.is_file() {
                continue;
            }

            match current_entry.metadata() {
                Ok(meta) => return Some(strategy.file_size(&meta)),
                Err(error) => {
                    log::debug!(
                        "Failed to stat {}: {}",
                        current_entry.path().display(),
                        error
                    );
                }
            }
        }
        None
    });

    let mut size_total = 0;
    iter::from_fn(move || {
        size_total += size_iter.next()?;
        for _ in 0..1_000 {
            match size_iter.next() {
                Some(file_size) => size_total += file_size,
                None => break,
            }
        }

        Some(size_total)
    })
}

/// Compute the total size of all regular files within `dir`.
/// Measurement errors are logged and never returned, an unreadable directory measures zero bytes.
pub fn compute_size(dir: &Path, strategy: SizeStrategy) -> u64 {
    estimate_size(dir.to_owned(), strategy).last().unwrap_or(0)
}
