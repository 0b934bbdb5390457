use crate::config::{
    ConfigBuilder, ConfigLoader, LogFormat, LogLevel, MediaFuseConfig, validation,
};
use crate::fusion::{FusionStrategy, ObjectAggregation};
use std::io::Write;

#[test]
fn test_default_config() {
    let config = MediaFuseConfig::default();
    assert_eq!(config.fusion.strategy, FusionStrategy::Temporal);
    assert_eq!(config.fusion.temporal_distance_cap_secs, 30.0);
    assert_eq!(config.fusion.object_aggregation, ObjectAggregation::Max);
    assert_eq!(config.fusion.default_category_weight, 1.0);
    assert_eq!(config.ranking.limit, None);
    assert!(!config.ranking.include_unscored);
    assert_eq!(config.logging.level, LogLevel::Info);
    assert!(validation::validate_config(&config).is_ok());
}

#[test]
fn test_config_builder() {
    let config = ConfigBuilder::new()
        .with_strategy(FusionStrategy::Default)
        .with_object_aggregation(ObjectAggregation::Average)
        .with_temporal_distance_cap(12.5)
        .with_default_category_weight(0.5)
        .with_ranking_limit(10)
        .with_log_level(LogLevel::Debug)
        .build()
        .unwrap();

    assert_eq!(config.fusion.strategy, FusionStrategy::Default);
    assert_eq!(config.fusion.object_aggregation, ObjectAggregation::Average);
    assert_eq!(config.fusion.temporal_distance_cap_secs, 12.5);
    assert_eq!(config.fusion.default_category_weight, 0.5);
    assert_eq!(config.ranking.limit, Some(10));
    assert_eq!(config.logging.level, LogLevel::Debug);
}

#[test]
fn test_validation_rejects_bad_values() {
    assert!(ConfigBuilder::new().with_temporal_distance_cap(0.0).build().is_err());
    assert!(
        ConfigBuilder::new()
            .with_temporal_distance_cap(f64::INFINITY)
            .build()
            .is_err()
    );
    assert!(ConfigBuilder::new().with_default_category_weight(-1.0).build().is_err());
    assert!(ConfigBuilder::new().with_ranking_limit(0).build().is_err());
    assert!(ConfigBuilder::new().with_default_category_weight(0.0).build().is_ok());
}

#[test]
fn test_predefined_configs() {
    let dev = ConfigBuilder::development().build().unwrap();
    let test = ConfigBuilder::testing().build().unwrap();
    let prod = ConfigBuilder::production().build().unwrap();

    assert_eq!(dev.logging.level, LogLevel::Debug);
    assert_eq!(test.logging.level, LogLevel::Warn);
    assert_eq!(prod.logging.level, LogLevel::Info);
    assert_eq!(prod.logging.format, LogFormat::Json);
    assert_eq!(prod.ranking.limit, Some(1000));
}

#[test]
fn test_load_toml_file() {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    writeln!(
        file,
        "[fusion]\nstrategy = \"default\"\ntemporal_distance_cap_secs = 10.0\n\n[ranking]\nlimit = 5"
    )
    .unwrap();

    let config = ConfigLoader::new().load_file(file.path()).unwrap().extract().unwrap();
    assert_eq!(config.fusion.strategy, FusionStrategy::Default);
    assert_eq!(config.fusion.temporal_distance_cap_secs, 10.0);
    assert_eq!(config.ranking.limit, Some(5));
    // Untouched sections keep their defaults
    assert_eq!(config.fusion.default_category_weight, 1.0);
}

#[test]
fn test_invalid_file_values_fail_validation() {
    let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
    write!(file, r#"{{"fusion": {{"temporal_distance_cap_secs": -3.0}}}}"#).unwrap();

    let mut loader = ConfigLoader::new();
    loader.load_file(file.path()).unwrap();
    assert!(loader.extract().is_err());
}

#[test]
fn test_missing_and_unsupported_files() {
    assert!(ConfigLoader::new().load_file("/nonexistent/mediafuse.toml").is_err());

    let file = tempfile::Builder::new().suffix(".ini").tempfile().unwrap();
    assert!(ConfigLoader::new().load_file(file.path()).is_err());
}

#[test]
fn test_env_overrides_file() {
    figment::Jail::expect_with(|jail| {
        jail.create_file("mediafuse.toml", "[fusion]\nstrategy = \"default\"")?;
        jail.set_env("MEDIAFUSE_FUSION__OBJECT_AGGREGATION", "average");
        jail.set_env("MEDIAFUSE_LOGGING__LEVEL", "debug");

        let config = ConfigLoader::new()
            .load_default_files()
            .load_env()
            .extract()
            .map_err(|e| e.to_string())?;

        assert_eq!(config.fusion.strategy, FusionStrategy::Default);
        assert_eq!(config.fusion.object_aggregation, ObjectAggregation::Average);
        assert_eq!(config.logging.level, LogLevel::Debug);
        Ok(())
    });
}

#[test]
fn test_config_serialization() {
    let config = ConfigBuilder::production().build().unwrap();
    let json = serde_json::to_string(&config).unwrap();
    let deserialized: MediaFuseConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(config, deserialized);
}

#[test]
fn test_log_level_parse() {
    assert_eq!("WARN".parse::<LogLevel>(), Ok(LogLevel::Warn));
    assert!("loud".parse::<LogLevel>().is_err());
    assert_eq!(LogLevel::Trace.to_string(), "trace");
}

#[test]
fn test_builder_logging_destinations() {
    let config = ConfigBuilder::testing()
        .with_log_file("logs/mediafuse.log")
        .without_stdout_logging()
        .build()
        .unwrap();
    assert_eq!(
        config.logging.file,
        Some(std::path::PathBuf::from("logs/mediafuse.log"))
    );
    assert!(!config.logging.stdout);

    assert!(ConfigBuilder::new().with_log_file("").build().is_err());
}
