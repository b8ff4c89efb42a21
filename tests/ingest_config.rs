// tests/ingest_config.rs
use std::{env, fs, path::PathBuf};
use trends_mx::config::{AppConfig, ENV_CONFIG_PATH, ENV_FALLBACK, ENV_MAX_AGE_MINUTES, ENV_OUTPUT_DIR, ENV_TIMEZONE};
use trends_mx::SourceKind;

fn clear_env() {
    for k in [ENV_CONFIG_PATH, ENV_TIMEZONE, ENV_OUTPUT_DIR, ENV_MAX_AGE_MINUTES, ENV_FALLBACK] {
        env::remove_var(k);
    }
}

#[test]
fn parse_toml_file() {
    let dir = tempfile::tempdir().unwrap();
    let p = dir.path().join("trends.toml");
    fs::write(
        &p,
        r#"
output_dir = "out"
fallback_on_failure = false

[sources]
max_trends = 10
"#,
    )
    .unwrap();

    let cfg = AppConfig::load_from(&p).unwrap();
    assert_eq!(cfg.output_path(SourceKind::XTrends), PathBuf::from("out/twitter_trends_data.json"));
    assert!(!cfg.fallback_on_failure);
    assert_eq!(cfg.sources.max_for(SourceKind::TwitterTrending), 10);
    assert_eq!(cfg.sources.max_for(SourceKind::GoogleTrends), 25);
}

#[serial_test::serial]
#[test]
fn default_uses_env_then_fallbacks() {
    // isolate CWD so the repo's own config/ is not read
    let old = env::current_dir().unwrap();
    let tmp = tempfile::tempdir().unwrap();
    env::set_current_dir(tmp.path()).unwrap();
    clear_env();

    // 1) nothing at all -> defaults
    let cfg = AppConfig::load_default().unwrap();
    assert_eq!(cfg.timezone, "America/Mexico_City");
    assert_eq!(cfg.freshness.max_age_minutes, 20);

    // 2) ./config/trends.toml
    let cfg_dir = tmp.path().join("config");
    fs::create_dir_all(&cfg_dir).unwrap();
    fs::write(cfg_dir.join("trends.toml"), "[freshness]\nmax_age_minutes = 45\n").unwrap();
    assert_eq!(AppConfig::load_default().unwrap().freshness.max_age_minutes, 45);

    // 3) env path wins over the fallback file
    let p_env = tmp.path().join("other.toml");
    fs::write(&p_env, "[freshness]\nmax_age_minutes = 7\n").unwrap();
    env::set_var(ENV_CONFIG_PATH, p_env.display().to_string());
    assert_eq!(AppConfig::load_default().unwrap().freshness.max_age_minutes, 7);

    // 4) value overrides win over any file
    env::set_var(ENV_MAX_AGE_MINUTES, "3");
    env::set_var(ENV_OUTPUT_DIR, "snapshots");
    env::set_var(ENV_FALLBACK, "off");
    let cfg = AppConfig::load_default().unwrap();
    assert_eq!(cfg.freshness.max_age_minutes, 3);
    assert_eq!(cfg.output_dir, PathBuf::from("snapshots"));
    assert!(!cfg.fallback_on_failure);

    // 5) missing env path is an error
    env::set_var(ENV_CONFIG_PATH, tmp.path().join("nope.toml").display().to_string());
    assert!(AppConfig::load_default().is_err());

    clear_env();
    env::set_current_dir(&old).unwrap();
}

#[serial_test::serial]
#[test]
fn bad_env_values_are_errors() {
    let old = env::current_dir().unwrap();
    let tmp = tempfile::tempdir().unwrap();
    env::set_current_dir(tmp.path()).unwrap();
    clear_env();

    env::set_var(ENV_TIMEZONE, "Mars/Olympus_Mons");
    assert!(AppConfig::load_default().is_err());
    env::set_var(ENV_TIMEZONE, "America/Monterrey");
    assert_eq!(AppConfig::load_default().unwrap().target_tz().unwrap(), chrono_tz::America::Monterrey);

    env::set_var(ENV_MAX_AGE_MINUTES, "twenty");
    assert!(AppConfig::load_default().is_err());

    clear_env();
    env::set_current_dir(&old).unwrap();
}
