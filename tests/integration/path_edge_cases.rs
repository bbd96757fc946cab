use blockdupe::config::ScanConfig;
use blockdupe::duplicates::DuplicateFinder;
use std::fs::{self, File};
use std::io::Write;
use tempfile::tempdir;

fn scan(config: ScanConfig) -> Vec<blockdupe::duplicates::DuplicateGroup> {
    DuplicateFinder::new(config).find_duplicates().unwrap().0
}

#[test]
fn test_paths_with_quotes() {
    let dir = tempdir().unwrap();

    // Windows does not allow double quotes in filenames.
    if cfg!(not(windows)) {
        File::create(dir.path().join("file_with_\"quote\".txt"))
            .expect("Failed to create file with quotes")
            .write_all(b"content")
            .unwrap();
        File::create(dir.path().join("duplicate.txt"))
            .unwrap()
            .write_all(b"content")
            .unwrap();

        let groups = scan(ScanConfig::new(vec![dir.path().to_path_buf()]));
        assert_eq!(groups.len(), 1);
        assert!(groups[0]
            .files
            .iter()
            .any(|f| f.path.to_string_lossy().contains('"')));
    }
}

#[test]
fn test_extremely_long_paths() {
    let dir = tempdir().unwrap();
    let mut deep = dir.path().to_path_buf();
    for i in 0..20 {
        deep.push(format!("level_{:02}_with_a_fairly_long_directory_name", i));
    }
    if fs::create_dir_all(&deep).is_err() {
        // Filesystem refuses the length; nothing to test
        return;
    }

    File::create(deep.join("deep.bin"))
        .unwrap()
        .write_all(b"far away")
        .unwrap();
    File::create(dir.path().join("near.bin"))
        .unwrap()
        .write_all(b"far away")
        .unwrap();

    let groups = scan(ScanConfig::new(vec![dir.path().to_path_buf()]));
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].len(), 2);
}

#[test]
fn test_exclusion_matches_relative_spelling() {
    let dir = tempdir().unwrap();
    let skipped = dir.path().join("skip");
    fs::create_dir(&skipped).unwrap();
    File::create(dir.path().join("a"))
        .unwrap()
        .write_all(b"x")
        .unwrap();
    File::create(skipped.join("a"))
        .unwrap()
        .write_all(b"x")
        .unwrap();

    let dotted = dir.path().join("skip").join("..").join("skip").join(".");
    let groups = scan(ScanConfig::new(vec![dir.path().to_path_buf()]).with_exclude(vec![dotted]));
    assert!(groups.is_empty());
}

#[test]
fn test_exclusion_is_not_prefix_match() {
    let dir = tempdir().unwrap();
    let excluded = dir.path().join("data");
    let sibling = dir.path().join("data2");
    fs::create_dir(&excluded).unwrap();
    fs::create_dir(&sibling).unwrap();
    File::create(sibling.join("one"))
        .unwrap()
        .write_all(b"kept")
        .unwrap();
    File::create(sibling.join("two"))
        .unwrap()
        .write_all(b"kept")
        .unwrap();

    let groups = scan(ScanConfig::new(vec![dir.path().to_path_buf()]).with_exclude(vec![excluded]));
    assert_eq!(groups.len(), 1);
}

#[test]
fn test_mask_is_anchored_and_case_insensitive() {
    let dir = tempdir().unwrap();
    for name in ["photo.JPG", "copy.jpg", "photo.jpg.bak", "jpg"] {
        File::create(dir.path().join(name))
            .unwrap()
            .write_all(b"pixels")
            .unwrap();
    }

    let groups = scan(ScanConfig::new(vec![dir.path().to_path_buf()]).with_mask("*.jpg"));
    assert_eq!(groups.len(), 1);
    let names: Vec<String> = groups[0]
        .files
        .iter()
        .map(|f| f.path.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["copy.jpg", "photo.JPG"]);
}

#[test]
fn test_question_mark_matches_single_character() {
    let dir = tempdir().unwrap();
    for name in ["a1.log", "a2.log", "a10.log"] {
        File::create(dir.path().join(name))
            .unwrap()
            .write_all(b"log line")
            .unwrap();
    }

    let groups = scan(ScanConfig::new(vec![dir.path().to_path_buf()]).with_mask("a?.log"));
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].len(), 2);
}

#[cfg(unix)]
#[test]
fn test_non_utf8_file_names() {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    let dir = tempdir().unwrap();
    let name = OsStr::from_bytes(b"bad\xffname");
    if File::create(dir.path().join(name))
        .and_then(|mut f| f.write_all(b"bytes"))
        .is_err()
    {
        // Some filesystems (e.g. macOS APFS) reject invalid UTF-8
        return;
    }
    File::create(dir.path().join("good"))
        .unwrap()
        .write_all(b"bytes")
        .unwrap();

    let groups = scan(ScanConfig::new(vec![dir.path().to_path_buf()]));
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].len(), 2);
}

#[cfg(unix)]
#[test]
fn test_excluding_symlink_keeps_its_target() {
    let dir = tempdir().unwrap();
    let real = dir.path().join("real");
    fs::create_dir(&real).unwrap();
    File::create(real.join("a")).unwrap().write_all(b"dup").unwrap();
    File::create(dir.path().join("b")).unwrap().write_all(b"dup").unwrap();
    std::os::unix::fs::symlink(&real, dir.path().join("link")).unwrap();

    let groups = scan(
        ScanConfig::new(vec![dir.path().to_path_buf()])
            .with_exclude(vec![dir.path().join("link")]),
    );
    assert_eq!(groups.len(), 1);
    let names: Vec<String> = groups[0]
        .files
        .iter()
        .map(|f| f.path.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["b", "a"]);
}

#[test]
fn test_mask_brackets_are_literal() {
    let dir = tempdir().unwrap();
    let first = dir.path().join("one");
    let second = dir.path().join("two");
    fs::create_dir(&first).unwrap();
    fs::create_dir(&second).unwrap();
    for parent in [&first, &second] {
        File::create(parent.join("Movie [1080p].mkv"))
            .unwrap()
            .write_all(b"frames")
            .unwrap();
    }
    File::create(dir.path().join("Movie 1.mkv"))
        .unwrap()
        .write_all(b"frames")
        .unwrap();

    let groups = scan(ScanConfig::new(vec![dir.path().to_path_buf()]).with_mask("Movie [1080p].mkv"));
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].len(), 2);
}

#[test]
fn test_mask_with_unbalanced_bracket_is_valid() {
    let dir = tempdir().unwrap();
    for name in ["a[1", "b[2", "plain"] {
        File::create(dir.path().join(name))
            .unwrap()
            .write_all(b"same")
            .unwrap();
    }

    let groups = scan(ScanConfig::new(vec![dir.path().to_path_buf()]).with_mask("*[*"));
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].len(), 2);
}
