use std::{
    fs,
    path::Path,
    sync::{
        Arc,
        Mutex,
    },
};

use dirsweep::{
    compute_size,
    ArtifactKind,
    DirectoryEntry,
    ScanError,
    ScanOptions,
    ScanReport,
    ScanReportConsumer,
    Scanner,
    SizeStrategy,
    VoidScanReportConsumer,
};
use tempfile::TempDir;

fn apparent_scanner() -> Scanner {
    Scanner::new(ScanOptions {
        size_strategy: SizeStrategy::Apparent,
        report_consumer: Box::new(VoidScanReportConsumer),
    })
}

fn write_file(path: &Path, size: usize) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, vec![b'x'; size]).unwrap();
}

/// `projA/node_modules` with 12 files totalling 4096 bytes and an empty `projB/target`.
fn setup_work_dir() -> TempDir {
    let work = tempfile::tempdir().unwrap();
    let node_modules = work.path().join("projA/node_modules");
    for index in 0..12 {
        let size = if index < 4 { 342 } else { 341 };
        write_file(&node_modules.join(format!("pkg{index}/index.js")), size);
    }
    fs::create_dir_all(work.path().join("projB/target")).unwrap();
    fs::write(work.path().join("projB/Cargo.toml"), "[package]").unwrap();
    work
}

#[test]
fn scan_reports_node_modules_and_targets() {
    let work = setup_work_dir();
    let result = apparent_scanner().scan(work.path()).unwrap();

    assert_eq!(
        result.node_modules,
        vec![DirectoryEntry::new(
            ArtifactKind::NodeModules,
            work.path().join("projA/node_modules"),
            4096
        )]
    );
    assert_eq!(result.node_modules[0].name(), "projA");

    assert_eq!(result.targets.len(), 1);
    assert_eq!(result.targets[0].path(), work.path().join("projB/target"));
    assert_eq!(result.targets[0].size(), 0);
    assert_eq!(result.targets[0].name(), "projB");
}

#[test]
fn nested_target_in_node_modules_is_not_reported() {
    let work = tempfile::tempdir().unwrap();
    write_file(&work.path().join("a/node_modules/target/out.bin"), 100);

    let result = apparent_scanner().scan(work.path()).unwrap();
    assert_eq!(result.node_modules.len(), 1);
    assert_eq!(result.node_modules[0].path(), work.path().join("a/node_modules"));
    assert_eq!(result.node_modules[0].size(), 100);
    assert!(result.targets.is_empty());
}

#[test]
fn entries_are_never_nested() {
    let work = tempfile::tempdir().unwrap();
    write_file(&work.path().join("x/target/debug/node_modules/a.js"), 1);
    write_file(&work.path().join("y/node_modules/pkg/node_modules/b.js"), 1);
    write_file(&work.path().join("z/deep/er/target/c.rlib"), 1);
    write_file(&work.path().join("z/node_modules/d.js"), 1);

    let result = apparent_scanner().scan(work.path()).unwrap();
    let entries = result.entries().collect::<Vec<_>>();
    assert_eq!(entries.len(), 4);

    for entry in &entries {
        for other in &entries {
            if entry.path() != other.path() {
                assert!(!entry.path().starts_with(other.path()));
            }
        }
    }
}

#[test]
fn skipped_directories_are_not_visited() {
    let work = tempfile::tempdir().unwrap();
    write_file(&work.path().join(".git/node_modules/a.js"), 1);
    write_file(&work.path().join("proj/.idea/target/b"), 1);
    write_file(&work.path().join("proj2/.Idea/target/c"), 1);

    let visited = Arc::new(Mutex::new(Vec::new()));
    struct Recorder(Arc<Mutex<Vec<std::path::PathBuf>>>);
    impl ScanReportConsumer for Recorder {
        fn consume_report(&mut self, report: ScanReport) {
            match report {
                ScanReport::StatusInspecting(path) | ScanReport::StatusMeasuring(path) => {
                    self.0.lock().unwrap().push(path)
                }
                ScanReport::ErrorFs { .. } => {}
            }
        }
    }

    let mut scanner = Scanner::new(ScanOptions {
        size_strategy: SizeStrategy::Apparent,
        report_consumer: Box::new(Recorder(visited.clone())),
    });
    let result = scanner.scan(work.path()).unwrap();

    /* the skip names are case sensitive */
    assert!(result.node_modules.is_empty());
    assert_eq!(result.targets.len(), 1);
    assert_eq!(result.targets[0].path(), work.path().join("proj2/.Idea/target"));

    let visited = visited.lock().unwrap();
    assert!(!visited.is_empty());
    assert!(visited.iter().all(|path| {
        !path.components().any(|component| {
            component.as_os_str() == ".git" || component.as_os_str() == ".idea"
        })
    }));
}

#[test]
fn files_named_like_artifacts_are_ignored() {
    let work = tempfile::tempdir().unwrap();
    write_file(&work.path().join("proj/target"), 10);
    write_file(&work.path().join("proj/node_modules"), 10);

    let result = apparent_scanner().scan(work.path()).unwrap();
    assert!(result.is_empty());
}

#[test]
fn unreadable_root_fails() {
    let work = tempfile::tempdir().unwrap();
    let missing = work.path().join("missing");

    match apparent_scanner().scan(&missing) {
        Err(ScanError::RootUnreadable { path, .. }) => assert_eq!(path, missing),
        other => panic!("unexpected scan result: {:?}", other),
    }
}

#[cfg(unix)]
#[test]
fn symlink_cycles_terminate() {
    let work = tempfile::tempdir().unwrap();
    fs::create_dir_all(work.path().join("proj")).unwrap();
    std::os::unix::fs::symlink(work.path(), work.path().join("proj/loop")).unwrap();
    write_file(&work.path().join("proj/target/a"), 3);

    let result = apparent_scanner().scan(work.path()).unwrap();
    assert_eq!(result.targets.len(), 1);
    assert_eq!(result.targets[0].size(), 3);
}

#[test]
fn scan_order_is_stable() {
    let work = tempfile::tempdir().unwrap();
    for project in ["c", "a", "b"] {
        fs::create_dir_all(work.path().join(project).join("target")).unwrap();
    }

    let result = apparent_scanner().scan(work.path()).unwrap();
    let names = result
        .targets
        .iter()
        .map(|entry| entry.name().to_string())
        .collect::<Vec<_>>();
    assert_eq!(names, ["a", "b", "c"]);
}

#[test]
fn spawned_scan_streams_entries() {
    let work = setup_work_dir();
    let (handle, rx) = apparent_scanner().spawn(work.path().to_owned());

    let streamed = rx.iter().collect::<Vec<_>>();
    let result = handle.join().unwrap().unwrap();

    assert_eq!(streamed.len(), 2);
    assert_eq!(result.len(), 2);
    for entry in result.entries() {
        assert!(streamed.contains(entry));
    }
}

#[test]
fn empty_directory_measures_zero() {
    let work = tempfile::tempdir().unwrap();
    assert_eq!(compute_size(work.path(), SizeStrategy::Apparent), 0);
    assert_eq!(compute_size(work.path(), SizeStrategy::detect()), 0);
}

#[test]
fn adding_a_file_increases_size() {
    let work = tempfile::tempdir().unwrap();
    write_file(&work.path().join("a/b/c.bin"), 100);

    for (index, strategy) in [SizeStrategy::Apparent, SizeStrategy::detect()]
        .into_iter()
        .enumerate()
    {
        let before = compute_size(work.path(), strategy);
        write_file(&work.path().join(format!("a/added{index}.bin")), 8192);
        let after = compute_size(work.path(), strategy);
        assert!(after > before, "{:?}: {} <= {}", strategy, after, before);
    }
}

#[test]
fn apparent_size_ignores_directories() {
    let work = tempfile::tempdir().unwrap();
    fs::create_dir_all(work.path().join("a/b/c/d")).unwrap();
    write_file(&work.path().join("a/b/file"), 7);
    write_file(&work.path().join("a/other"), 5);

    assert_eq!(compute_size(work.path(), SizeStrategy::Apparent), 12);
}

#[test]
#[cfg(unix)]
fn unreadable_directories_are_skipped() {
    use std::os::unix::fs::PermissionsExt;

    let work = tempfile::tempdir().unwrap();
    fs::create_dir_all(work.path().join("ok/target")).unwrap();
    write_file(&work.path().join("locked/target/out.bin"), 100);
    write_file(&work.path().join("sized/node_modules/index.js"), 5);
    write_file(&work.path().join("sized/node_modules/hidden/blob.bin"), 1000);

    let locked = [
        work.path().join("locked"),
        work.path().join("sized/node_modules/hidden"),
    ];
    let set_mode = |mode: u32| {
        for path in &locked {
            fs::set_permissions(path, fs::Permissions::from_mode(mode)).unwrap();
        }
    };

    set_mode(0o000);
    if fs::read_dir(&locked[0]).is_ok() {
        /* permission bits are not enforced, e.g. when running as root */
        set_mode(0o755);
        return;
    }

    let errors = Arc::new(Mutex::new(Vec::new()));
    struct ErrorRecorder(Arc<Mutex<Vec<std::path::PathBuf>>>);
    impl ScanReportConsumer for ErrorRecorder {
        fn consume_report(&mut self, report: ScanReport) {
            if let ScanReport::ErrorFs { path, .. } = report {
                self.0.lock().unwrap().push(path);
            }
        }
    }

    let mut scanner = Scanner::new(ScanOptions {
        size_strategy: SizeStrategy::Apparent,
        report_consumer: Box::new(ErrorRecorder(errors.clone())),
    });
    let result = scanner.scan(work.path());
    set_mode(0o755);

    let result = result.unwrap();
    assert_eq!(result.targets.len(), 1);
    assert_eq!(result.targets[0].path(), work.path().join("ok/target"));

    assert_eq!(result.node_modules.len(), 1);
    assert_eq!(result.node_modules[0].size(), 5);

    assert_eq!(*errors.lock().unwrap(), vec![work.path().join("locked")]);
}
