// Integration tests for the backup ledger

use mender::healing::BackupLedger;
use std::fs;
use std::path::Path;

#[test]
fn test_snapshot_then_restore_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("service.py");
    fs::write(&target, "def run():\n    return 1\n").unwrap();

    let ledger = BackupLedger::new(dir.path().join("backups"));
    let original = fs::read_to_string(&target).unwrap();
    let backup = ledger.snapshot(&target, &original).unwrap();
    assert!(backup.starts_with(ledger.root()));

    fs::write(&target, "def run(:\n").unwrap();
    assert!(ledger.restore(&target).unwrap());
    assert_eq!(fs::read_to_string(&target).unwrap(), original);
}

#[test]
fn test_restore_without_backups_leaves_file() {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("service.py");
    fs::write(&target, "current").unwrap();

    let ledger = BackupLedger::new(dir.path().join("backups"));
    assert!(!ledger.restore(&target).unwrap());
    assert_eq!(fs::read_to_string(&target).unwrap(), "current");
    assert!(!ledger.root().exists());
}

#[test]
fn test_backups_are_keyed_by_basename() {
    let dir = tempfile::tempdir().unwrap();
    let ledger = BackupLedger::new(dir.path().join("backups"));

    ledger
        .snapshot(Path::new("/project/a/config.py"), "a")
        .unwrap();

    // Same basename in another directory sees the same history
    let listed = ledger.list(Some(Path::new("/elsewhere/config.py"))).unwrap();
    assert_eq!(listed.len(), 1);
    assert!(ledger.list(Some(Path::new("/project/a/other.py"))).unwrap().is_empty());
    assert_eq!(ledger.list(None).unwrap().len(), 1);
}
