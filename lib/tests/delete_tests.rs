use std::{
    fs,
    path::PathBuf,
    sync::{
        atomic::AtomicBool,
        Arc,
    },
};

use dirsweep::{
    BatchDeleter,
    DeleteError,
    DeleteProgress,
    DeletionOutcome,
    VoidDeleteProgressConsumer,
};

fn make_tree(root: &std::path::Path, name: &str) -> PathBuf {
    let path = root.join(name);
    fs::create_dir_all(path.join("nested/deeper")).unwrap();
    fs::write(path.join("nested/deeper/file.txt"), "content").unwrap();
    fs::write(path.join("top.txt"), "content").unwrap();
    path
}

#[test]
fn delete_one_removes_tree() {
    let work = tempfile::tempdir().unwrap();
    let path = make_tree(work.path(), "node_modules");

    BatchDeleter::new().delete_one(&path).unwrap();
    assert!(!path.exists());
    assert!(work.path().exists());
}

#[test]
fn delete_one_missing_is_success() {
    let work = tempfile::tempdir().unwrap();
    BatchDeleter::new()
        .delete_one(&work.path().join("missing"))
        .unwrap();
}

#[test]
fn delete_one_rejects_files() {
    let work = tempfile::tempdir().unwrap();
    let file = work.path().join("target");
    fs::write(&file, "not a directory").unwrap();

    let error = BatchDeleter::new().delete_one(&file).unwrap_err();
    assert!(matches!(error, DeleteError::NotADirectory { .. }));
    assert!(file.exists());
}

#[cfg(unix)]
#[test]
fn delete_one_does_not_follow_symlinks() {
    let work = tempfile::tempdir().unwrap();
    let real = make_tree(work.path(), "real");
    let link = work.path().join("link");
    std::os::unix::fs::symlink(&real, &link).unwrap();

    assert!(BatchDeleter::new().delete_one(&link).is_err());
    assert!(real.join("top.txt").exists());
}

#[test]
fn delete_many_empty() {
    let mut events = Vec::new();
    let outcomes = BatchDeleter::new().delete_many::<PathBuf, _>(&[], &mut |progress: DeleteProgress| {
        events.push(progress)
    });

    assert!(outcomes.is_empty());
    assert!(events.is_empty());
}

#[test]
fn delete_many_continues_after_failure() {
    let work = tempfile::tempdir().unwrap();
    let p1 = make_tree(work.path(), "a");
    let p2 = work.path().join("b");
    fs::write(&p2, "a file can not be deleted as directory").unwrap();
    let p3 = make_tree(work.path(), "c");

    let mut events: Vec<DeleteProgress> = Vec::new();
    let paths = vec![p1.clone(), p2.clone(), p3.clone()];
    let outcomes = BatchDeleter::new().delete_many(&paths, &mut |progress: DeleteProgress| {
        events.push(progress)
    });

    assert_eq!(outcomes.len(), 3);
    assert_eq!(outcomes[0], DeletionOutcome::succeeded(p1.clone()));
    assert_eq!(outcomes[1].path, p2);
    assert!(!outcomes[1].success);
    assert!(outcomes[1].error.is_some());
    assert_eq!(outcomes[2], DeletionOutcome::succeeded(p3.clone()));

    assert!(!p1.exists());
    assert!(p2.exists());
    assert!(!p3.exists());

    let percents = events.iter().map(|event| event.percent).collect::<Vec<_>>();
    assert_eq!(percents, [33, 67, 100]);
    assert_eq!(
        events.iter().map(|event| event.success).collect::<Vec<_>>(),
        [true, false, true]
    );
}

#[test]
fn delete_many_progress_is_monotonic() {
    let work = tempfile::tempdir().unwrap();
    let paths = (0..7)
        .map(|index| make_tree(work.path(), &format!("target{index}")))
        .collect::<Vec<_>>();

    let mut percents = Vec::new();
    let outcomes = BatchDeleter::new().delete_many(&paths, &mut |progress: DeleteProgress| {
        percents.push(progress.percent)
    });

    assert_eq!(outcomes.len(), paths.len());
    for (outcome, path) in outcomes.iter().zip(&paths) {
        assert_eq!(&outcome.path, path);
        assert!(outcome.success);
    }
    assert!(percents.windows(2).all(|pair| pair[0] <= pair[1]));
    assert_eq!(percents.last().copied(), Some(100));
    assert_eq!(percents.iter().filter(|percent| **percent == 100).count(), 1);
}

#[test]
fn dry_run_keeps_directories() {
    let work = tempfile::tempdir().unwrap();
    let path = make_tree(work.path(), "node_modules");

    let outcomes = BatchDeleter::new()
        .with_dry_run(true)
        .delete_many(&[&path], &mut VoidDeleteProgressConsumer);

    assert_eq!(outcomes, vec![DeletionOutcome::succeeded(path.clone())]);
    assert!(path.join("top.txt").exists());
}

#[test]
fn cancelled_batch_reports_remaining_paths() {
    let work = tempfile::tempdir().unwrap();
    let p1 = make_tree(work.path(), "a");
    let p2 = make_tree(work.path(), "b");

    let cancel = Arc::new(AtomicBool::new(true));
    let mut percents = Vec::new();
    let outcomes = BatchDeleter::new()
        .with_cancel_flag(cancel)
        .delete_many(&[&p1, &p2], &mut |progress: DeleteProgress| {
            percents.push(progress.percent)
        });

    assert_eq!(outcomes.len(), 2);
    assert!(outcomes.iter().all(|outcome| !outcome.success));
    assert_eq!(outcomes[0].error.as_deref(), Some("cancelled"));
    assert_eq!(percents, [50, 100]);
    assert!(p1.exists());
    assert!(p2.exists());
}

#[test]
fn outcome_serializes_error_as_null() {
    let outcome = DeletionOutcome::succeeded(PathBuf::from("/work/a/node_modules"));
    let json = serde_json::to_value(&outcome).unwrap();
    assert_eq!(
        json,
        serde_json::json!({ "path": "/work/a/node_modules", "success": true, "error": null })
    );
}
