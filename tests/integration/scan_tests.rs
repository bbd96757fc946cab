use blockdupe::config::{ChecksumAlgorithm, ScanConfig, ScanDepth};
use blockdupe::duplicates::DuplicateFinder;
use blockdupe::scanner::{FileDescriptor, Fingerprinter};
use std::fs::{self, File};
use std::io::Write;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

fn write(path: &Path, content: &[u8]) -> PathBuf {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    File::create(path).unwrap().write_all(content).unwrap();
    path.canonicalize().unwrap()
}

fn scan_paths(config: ScanConfig) -> Vec<Vec<PathBuf>> {
    let (groups, _) = DuplicateFinder::new(config).find_duplicates().unwrap();
    groups.iter().map(|g| g.paths()).collect()
}

#[test]
fn test_scan_empty_directory() {
    let dir = tempdir().unwrap();
    let (groups, summary) = DuplicateFinder::new(ScanConfig::new(vec![dir.path().to_path_buf()]))
        .find_duplicates()
        .unwrap();

    assert!(groups.is_empty());
    assert_eq!(summary.total_files, 0);
    assert_eq!(summary.duplicate_groups, 0);
    assert!(summary.diagnostics.is_empty());
}

#[test]
fn test_three_identical_files_across_two_roots() {
    let root1 = tempdir().unwrap();
    let root2 = tempdir().unwrap();
    let content: Vec<u8> = (0..1000u32).map(|i| (i % 251) as u8).collect();

    let a = write(&root1.path().join("a.dat"), &content);
    let b = write(&root1.path().join("deep/b.dat"), &content);
    let c = write(&root2.path().join("c.dat"), &content);

    let config = ScanConfig::new(vec![root1.path().to_path_buf(), root2.path().to_path_buf()])
        .with_block_size(512);
    let groups = scan_paths(config);

    assert_eq!(groups.len(), 1);
    let mut expected = vec![a, b, c];
    expected.sort();
    assert_eq!(groups[0], expected);
}

#[test]
fn test_one_byte_difference_in_final_block() {
    let dir = tempdir().unwrap();
    let original = vec![0x5au8; 1000];
    let mut changed = original.clone();
    changed[999] = 0x5b;

    let a = write(&dir.path().join("a"), &original);
    let b = write(&dir.path().join("b"), &changed);

    let fingerprinter = Fingerprinter::new(NonZeroUsize::new(512).unwrap());
    let fa = fingerprinter.fingerprint_path(&a).unwrap();
    let fb = fingerprinter.fingerprint_path(&b).unwrap();
    assert_eq!(fa.block_count(), 2);
    assert_eq!(fa.block(0), fb.block(0));
    assert_ne!(fa.block(1), fb.block(1));

    let groups = scan_paths(ScanConfig::new(vec![dir.path().to_path_buf()]).with_block_size(512));
    assert!(groups.is_empty());
}

#[test]
fn test_flat_depth_skips_nested_pair() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("sub/one.txt"), b"nested duplicate");
    write(&dir.path().join("sub/two.txt"), b"nested duplicate");

    let groups = scan_paths(
        ScanConfig::new(vec![dir.path().to_path_buf()]).with_depth(ScanDepth::Flat),
    );
    assert!(groups.is_empty());
}

#[test]
fn test_mask_selects_only_matching_pair() {
    let dir = tempdir().unwrap();
    let content = b"same bytes in all four files";
    let t1 = write(&dir.path().join("one.txt"), content);
    let t2 = write(&dir.path().join("two.TXT"), content);
    write(&dir.path().join("one.bin"), content);
    write(&dir.path().join("two.bin"), content);

    let groups = scan_paths(ScanConfig::new(vec![dir.path().to_path_buf()]).with_mask("*.txt"));
    assert_eq!(groups, vec![vec![t1, t2]]);
}

#[test]
fn test_scan_nested_directories() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("a.txt"), b"nested");
    write(&dir.path().join("x/y/z/b.txt"), b"nested");

    let groups = scan_paths(ScanConfig::new(vec![dir.path().to_path_buf()]));
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].len(), 2);
}

#[test]
fn test_different_block_counts_never_group() {
    let dir = tempdir().unwrap();
    // 513 bytes is two blocks; 512 bytes of the same value is one
    write(&dir.path().join("short"), &[9u8; 512]);
    write(&dir.path().join("long"), &[9u8; 513]);

    let groups = scan_paths(ScanConfig::new(vec![dir.path().to_path_buf()]).with_block_size(512));
    assert!(groups.is_empty());
}

#[test]
fn test_trailing_zero_padding_limitation() {
    let dir = tempdir().unwrap();
    // Both fit in one block and differ only by trailing zero bytes
    write(&dir.path().join("a"), b"abc");
    write(&dir.path().join("b"), b"abc\0\0");

    let groups = scan_paths(ScanConfig::new(vec![dir.path().to_path_buf()]).with_block_size(512));
    assert_eq!(groups.len(), 1, "zero padding hides trailing zero bytes");
}

#[test]
fn test_min_size_filters_candidates() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("small1"), b"tiny");
    write(&dir.path().join("small2"), b"tiny");
    write(&dir.path().join("big1"), &[1u8; 100]);
    write(&dir.path().join("big2"), &[1u8; 100]);

    let (groups, summary) = DuplicateFinder::new(
        ScanConfig::new(vec![dir.path().to_path_buf()]).with_min_size(50),
    )
    .find_duplicates()
    .unwrap();

    assert_eq!(groups.len(), 1);
    assert!(groups[0].files.iter().all(|f| f.size == 100));
    assert_eq!(summary.total_files, 2);
}

#[test]
fn test_empty_files_group_only_when_min_size_zero() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("e1"), b"");
    write(&dir.path().join("e2"), b"");

    let default_groups = scan_paths(ScanConfig::new(vec![dir.path().to_path_buf()]));
    assert!(default_groups.is_empty());

    let (groups, _) = DuplicateFinder::new(
        ScanConfig::new(vec![dir.path().to_path_buf()]).with_min_size(0),
    )
    .find_duplicates()
    .unwrap();
    assert_eq!(groups.len(), 1);
    assert!(groups[0].fingerprint.is_empty());
}

#[test]
fn test_blake3_finds_same_groups_as_crc32() {
    let dir = tempdir().unwrap();
    for i in 0..6u8 {
        write(&dir.path().join(format!("f{}", i)), &vec![i % 3; 2000]);
    }

    let base = ScanConfig::new(vec![dir.path().to_path_buf()]).with_block_size(1024);
    let crc = scan_paths(base.clone());
    let blake = scan_paths(base.with_checksum(ChecksumAlgorithm::Blake3));

    assert_eq!(crc.len(), 3);
    assert_eq!(crc, blake);
}

#[test]
fn test_repeated_scans_are_identical() {
    let dir = tempdir().unwrap();
    for i in 0..20u8 {
        write(
            &dir.path().join(format!("d{}/f{}", i % 4, i)),
            &vec![i % 6; 300 + usize::from(i % 2)],
        );
    }

    let finder = DuplicateFinder::new(ScanConfig::new(vec![dir.path().to_path_buf()]));
    let (first, _) = finder.find_duplicates().unwrap();
    let (second, _) = finder.find_duplicates().unwrap();
    assert_eq!(first, second);
    assert!(!first.is_empty());
}

#[test]
fn test_group_members_are_candidates() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("a"), b"same");
    write(&dir.path().join("b"), b"same");

    let (groups, _) = DuplicateFinder::new(ScanConfig::new(vec![dir.path().to_path_buf()]))
        .find_duplicates()
        .unwrap();
    for file in &groups[0].files {
        assert!(file.path.is_absolute());
        assert_eq!(
            file,
            &FileDescriptor::new(file.path.clone(), fs::metadata(&file.path).unwrap().len())
        );
    }
}
