use blockdupe::config::{
    ChecksumAlgorithm, ConfigError, ConfigOverrides, ScanConfig, ScanDepth,
};
use figment::providers::{Format, Serialized, Toml};
use figment::Figment;
use std::fs;
use std::path::PathBuf;
use tempfile::tempdir;

#[test]
fn test_config_load_defaults() {
    // Use figment directly without Env to avoid interference from other tests
    let figment = Figment::from(Serialized::defaults(ScanConfig::default()));
    let config: ScanConfig = figment.extract().unwrap();
    assert_eq!(config, ScanConfig::default());
    assert_eq!(config.block_size, 512);
    assert_eq!(config.depth, ScanDepth::Recursive);
}

#[test]
fn test_config_load_from_toml() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");

    let toml_content = r#"
roots = ["/srv/media", "/mnt/backup"]
exclude = ["/srv/media/cache"]
depth = 0
block_size = 4096
min_size = 1024
mask = "*.jpg"
checksum = "blake3"
threads = 2
"#;
    fs::write(&config_path, toml_content).unwrap();

    let figment = Figment::from(Serialized::defaults(ScanConfig::default()))
        .merge(Toml::file(&config_path));
    let config: ScanConfig = figment.extract().unwrap();

    assert_eq!(
        config.roots,
        vec![PathBuf::from("/srv/media"), PathBuf::from("/mnt/backup")]
    );
    assert_eq!(config.exclude, vec![PathBuf::from("/srv/media/cache")]);
    assert_eq!(config.depth, ScanDepth::Flat);
    assert_eq!(config.block_size, 4096);
    assert_eq!(config.min_size, 1024);
    assert_eq!(config.mask, "*.jpg");
    assert_eq!(config.checksum, ChecksumAlgorithm::Blake3);
    assert_eq!(config.threads, 2);
}

#[test]
fn test_depth_levels_above_one_are_recursive() {
    let figment = Figment::from(Serialized::defaults(ScanConfig::default()))
        .merge(Toml::string("depth = 7"));
    let config: ScanConfig = figment.extract().unwrap();
    assert_eq!(config.depth, ScanDepth::Recursive);
}

#[test]
fn test_partial_toml_keeps_defaults() {
    let figment = Figment::from(Serialized::defaults(ScanConfig::default()))
        .merge(Toml::string("mask = \"*.iso\""));
    let config: ScanConfig = figment.extract().unwrap();
    assert_eq!(config.mask, "*.iso");
    assert_eq!(config.block_size, 512);
    assert_eq!(config.min_size, 1);
    assert_eq!(config.threads, 4);
}

#[test]
fn test_load_with_file_and_overrides() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("blockdupe.toml");
    fs::write(&config_path, "mask = \"*.png\"\nmin_size = 10\nroots = [\"/from/file\"]\n").unwrap();

    let overrides = ConfigOverrides {
        roots: vec![PathBuf::from("/from/cli")],
        min_size: Some(0),
        ..Default::default()
    };
    let config = ScanConfig::load(Some(&config_path), &overrides).unwrap();

    // Command line wins over the file, unset flags leave the file alone
    assert_eq!(config.roots, vec![PathBuf::from("/from/cli")]);
    assert_eq!(config.min_size, 0);
    assert_eq!(config.mask, "*.png");
}

#[test]
fn test_load_missing_explicit_file() {
    let temp_dir = tempdir().unwrap();
    let missing = temp_dir.path().join("nope.toml");
    let err = ScanConfig::load(Some(&missing), &ConfigOverrides::default()).unwrap_err();
    assert!(matches!(err, ConfigError::MissingFile(p) if p == missing));
}

#[test]
fn test_load_malformed_file() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("bad.toml");
    fs::write(&config_path, "block_size = \"huge\"\n").unwrap();

    let err = ScanConfig::load(Some(&config_path), &ConfigOverrides::default()).unwrap_err();
    assert!(matches!(err, ConfigError::Load(_)));
}

#[test]
fn test_config_load_from_env() {
    std::env::set_var("BLOCKDUPE_BLOCK_SIZE", "2048");
    std::env::set_var("BLOCKDUPE_CHECKSUM", "blake3");

    let config = ScanConfig::figment(None)
        .unwrap()
        .extract::<ScanConfig>()
        .unwrap();

    std::env::remove_var("BLOCKDUPE_BLOCK_SIZE");
    std::env::remove_var("BLOCKDUPE_CHECKSUM");

    assert_eq!(config.block_size, 2048);
    assert_eq!(config.checksum, ChecksumAlgorithm::Blake3);
}

#[test]
fn test_loaded_config_still_needs_validation() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("zero.toml");
    fs::write(&config_path, "roots = [\"/tmp\"]\nthreads = 0\n").unwrap();

    let config = ScanConfig::load(Some(&config_path), &ConfigOverrides::default()).unwrap();
    assert!(matches!(config.validate(), Err(ConfigError::ZeroThreads)));
}
