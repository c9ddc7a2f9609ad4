use std::fs;
use std::path::PathBuf;

use shipment_loader::LoaderError;
use shipment_loader::config::LoaderConfig;
use shipment_loader::model::Stage;
use tempfile::tempdir;

#[test]
fn defaults_point_at_the_data_directory() {
    let config = LoaderConfig::default();

    assert_eq!(
        config.stage_path(Stage::Products),
        PathBuf::from("data").join("shipping_data_1.csv")
    );
    assert_eq!(
        config.stage_path(Stage::Shipments),
        PathBuf::from("data").join("shipping_data_2.csv")
    );
    assert_eq!(config.database, PathBuf::from("shipment_database.db"));
    assert_eq!(config.delimiter_byte().expect("delimiter"), b',');
}

#[test]
fn stages_run_in_file_order() {
    let numbers: Vec<u8> = Stage::ALL.iter().map(|stage| stage.number()).collect();
    assert_eq!(numbers, vec![1, 2]);
    assert_eq!(Stage::Products.handler_name(), "register");
    assert_eq!(Stage::Shipments.handler_name(), "aggregate");
}

#[test]
fn toml_file_overrides_only_named_fields() {
    let temp_dir = tempdir().expect("temporary directory");
    let path = temp_dir.path().join("loader.toml");
    fs::write(
        &path,
        "data_dir = \"inputs\"\nfile_template = \"batch_{stage}.tsv\"\ndelimiter = \"\\t\"\n",
    )
    .expect("config written");

    let config = LoaderConfig::from_toml_file(&path).expect("config loaded");

    assert_eq!(config.data_dir, PathBuf::from("inputs"));
    assert_eq!(config.database, PathBuf::from("shipment_database.db"));
    assert_eq!(
        config.stage_path(Stage::Shipments),
        PathBuf::from("inputs").join("batch_2.tsv")
    );
    assert_eq!(config.delimiter_byte().expect("delimiter"), b'\t');
}

#[test]
fn template_without_stage_placeholder_is_rejected() {
    let config = LoaderConfig {
        file_template: "shipping_data.csv".to_string(),
        ..LoaderConfig::default()
    };

    assert!(matches!(
        config.validate(),
        Err(LoaderError::InvalidConfig(_))
    ));
}

#[test]
fn non_ascii_delimiter_is_rejected() {
    let config = LoaderConfig {
        delimiter: '§',
        ..LoaderConfig::default()
    };

    assert!(matches!(
        config.validate(),
        Err(LoaderError::InvalidConfig(_))
    ));
}

#[test]
fn missing_config_file_is_reported() {
    let temp_dir = tempdir().expect("temporary directory");
    let path = temp_dir.path().join("absent.toml");

    match LoaderConfig::from_toml_file(&path) {
        Err(LoaderError::MissingInput(missing)) => assert_eq!(missing, path),
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn malformed_config_file_is_a_parse_error() {
    let temp_dir = tempdir().expect("temporary directory");
    let path = temp_dir.path().join("loader.toml");
    fs::write(&path, "delimiter = 7\n").expect("config written");

    assert!(matches!(
        LoaderConfig::from_toml_file(&path),
        Err(LoaderError::ConfigParse(_))
    ));
}
