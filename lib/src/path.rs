use std::{
    ffi::OsStr,
    fs::DirEntry,
    path::Path,
};

static EMPTY_STR: &'static str = "";

/// Utility functions for the systems path library
pub trait PathEx {
    /// Returns the file name from the current path, or an empty string if the file name is empty
    fn file_name_truncate(&self) -> &str;

    /// Returns the base name of the parent directory.
    /// Falls back to the displayed parent path if the parent has no name (e.g. a file system root).
    fn parent_name(&self) -> String;
}

impl PathEx for Path {
    fn file_name_truncate(&self) -> &str {
        self.file_name()
            .and_then(OsStr::to_str)
            .unwrap_or(EMPTY_STR)
    }

    fn parent_name(&self) -> String {
        let Some(parent) = self.parent() else {
            return String::new();
        };

        match parent.file_name() {
            Some(name) => name.to_string_lossy().into_owned(),
            None => parent.display().to_string(),
        }
    }
}

/// File type checks which never traverse symbolic links.
pub trait DirEntryEx {
    fn is_file(&self) -> bool;
    fn is_dir(&self) -> bool;
}

impl DirEntryEx for DirEntry {
    fn is_file(&self) -> bool {
        self.file_type()
            .map_or(false, |file_type| file_type.is_file())
    }

    fn is_dir(&self) -> bool {
        self.file_type()
            .map_or(false, |file_type| file_type.is_dir())
    }
}
