use dirdupes::config::{Config, ConfigError};
use dirdupes::scanner::HashAlgorithm;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use std::fs;
use std::path::PathBuf;
use tempfile::tempdir;

#[test]
fn test_config_load_from_env() {
    std::env::set_var("DDTEST_ENV_IO_THREADS", "8");
    std::env::set_var("DDTEST_ENV_ALGORITHM", "sha256");

    let config: Config = Figment::from(Serialized::defaults(Config::default()))
        .merge(Env::prefixed("DDTEST_ENV_"))
        .extract()
        .unwrap();

    assert_eq!(config.io_threads, 8);
    assert_eq!(config.algorithm, HashAlgorithm::Sha256);

    std::env::remove_var("DDTEST_ENV_IO_THREADS");
    std::env::remove_var("DDTEST_ENV_ALGORITHM");
}

#[test]
fn test_env_overrides_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "io_threads = 2\nskip_hidden = true\n").unwrap();
    std::env::set_var("DDTEST_LAYER_IO_THREADS", "6");

    let config: Config = Figment::from(Serialized::defaults(Config::default()))
        .merge(Toml::file(&path))
        .merge(Env::prefixed("DDTEST_LAYER_"))
        .extract()
        .unwrap();

    assert_eq!(config.io_threads, 6);
    assert!(config.skip_hidden);

    std::env::remove_var("DDTEST_LAYER_IO_THREADS");
}

#[test]
fn test_load_explicit_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("dirdupes.toml");
    fs::write(&path, "index = \"elsewhere.json\"\nmax_pairs_per_set = 1000\n").unwrap();

    let config = Config::load(Some(&path)).unwrap();

    assert_eq!(config.index, PathBuf::from("elsewhere.json"));
    assert_eq!(config.max_pairs_per_set, Some(1000));
}

#[test]
fn test_load_invalid_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("dirdupes.toml");
    fs::write(&path, "io_threads = \"many\"\n").unwrap();

    assert!(matches!(
        Config::load(Some(&path)),
        Err(ConfigError::Invalid(_))
    ));
}

#[test]
fn test_config_serializes_to_toml() {
    let config = Config {
        io_threads: 3,
        ..Config::default()
    };
    let content = toml::to_string_pretty(&config).unwrap();
    assert!(content.contains("io_threads = 3"));
    assert!(content.contains("algorithm = \"blake3\""));
}
