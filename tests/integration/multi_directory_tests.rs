use blockdupe::config::ScanConfig;
use blockdupe::duplicates::DuplicateFinder;
use std::fs::{self, File};
use std::io::Write;
use tempfile::tempdir;

#[test]
fn test_scan_two_non_overlapping_directories() {
    let dir1 = tempdir().unwrap();
    let dir2 = tempdir().unwrap();

    File::create(dir1.path().join("a.txt"))
        .unwrap()
        .write_all(b"dup")
        .unwrap();
    File::create(dir2.path().join("b.txt"))
        .unwrap()
        .write_all(b"dup")
        .unwrap();

    let config = ScanConfig::new(vec![dir1.path().to_path_buf(), dir2.path().to_path_buf()]);
    let (groups, summary) = DuplicateFinder::new(config).find_duplicates().unwrap();

    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].files.len(), 2);
    assert_eq!(summary.total_files, 2);
}

#[test]
fn test_scan_overlapping_directories() {
    let dir = tempdir().unwrap();
    let sub = dir.path().join("sub");
    fs::create_dir(&sub).unwrap();

    File::create(dir.path().join("a.txt"))
        .unwrap()
        .write_all(b"content")
        .unwrap();
    File::create(sub.join("b.txt"))
        .unwrap()
        .write_all(b"content")
        .unwrap();

    // The child root is walked twice but each path is collected once
    let config = ScanConfig::new(vec![dir.path().to_path_buf(), sub.clone()]);
    let (groups, summary) = DuplicateFinder::new(config).find_duplicates().unwrap();

    assert_eq!(summary.total_files, 2);
    assert_eq!(summary.fingerprinted_files, 2);
    assert_eq!(summary.repeated_paths, 1);
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].files.len(), 2);
}

#[test]
fn test_same_root_listed_twice() {
    let dir = tempdir().unwrap();
    File::create(dir.path().join("only.txt"))
        .unwrap()
        .write_all(b"alone")
        .unwrap();

    let config = ScanConfig::new(vec![dir.path().to_path_buf(), dir.path().to_path_buf()]);
    let (groups, _) = DuplicateFinder::new(config).find_duplicates().unwrap();
    assert!(groups.is_empty(), "a file must never duplicate itself");
}

#[test]
fn test_cross_directory_duplicate_detection() {
    let dir1 = tempdir().unwrap();
    let dir2 = tempdir().unwrap();
    let dir3 = tempdir().unwrap();

    for (dir, name) in [(&dir1, "1.txt"), (&dir2, "2.txt"), (&dir3, "3.txt")] {
        File::create(dir.path().join(name))
            .unwrap()
            .write_all(b"triple")
            .unwrap();
    }

    let config = ScanConfig::new(vec![
        dir1.path().to_path_buf(),
        dir2.path().to_path_buf(),
        dir3.path().to_path_buf(),
    ]);
    let (groups, summary) = DuplicateFinder::new(config).find_duplicates().unwrap();

    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].files.len(), 3);
    assert_eq!(summary.total_files, 3);
    assert_eq!(summary.duplicate_files, 2);
}

#[test]
fn test_root_order_does_not_change_groups() {
    let dir1 = tempdir().unwrap();
    let dir2 = tempdir().unwrap();

    for i in 0..4u8 {
        File::create(dir1.path().join(format!("a{}", i)))
            .unwrap()
            .write_all(&[i; 64])
            .unwrap();
        File::create(dir2.path().join(format!("b{}", i)))
            .unwrap()
            .write_all(&[i; 64])
            .unwrap();
    }

    let forward = ScanConfig::new(vec![dir1.path().to_path_buf(), dir2.path().to_path_buf()]);
    let backward = ScanConfig::new(vec![dir2.path().to_path_buf(), dir1.path().to_path_buf()]);

    let (g1, _) = DuplicateFinder::new(forward).find_duplicates().unwrap();
    let (g2, _) = DuplicateFinder::new(backward).find_duplicates().unwrap();
    assert_eq!(g1.len(), 4);
    assert_eq!(g1, g2);
}

#[test]
fn test_exclusion_applies_across_roots() {
    let dir1 = tempdir().unwrap();
    let dir2 = tempdir().unwrap();
    let skipped = dir2.path().join("backup");
    fs::create_dir(&skipped).unwrap();

    File::create(dir1.path().join("a"))
        .unwrap()
        .write_all(b"payload")
        .unwrap();
    File::create(skipped.join("a"))
        .unwrap()
        .write_all(b"payload")
        .unwrap();

    let config = ScanConfig::new(vec![dir1.path().to_path_buf(), dir2.path().to_path_buf()])
        .with_exclude(vec![skipped]);
    let (groups, summary) = DuplicateFinder::new(config).find_duplicates().unwrap();

    assert!(groups.is_empty());
    assert_eq!(summary.total_files, 1);
}
