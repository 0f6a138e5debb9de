//! Configuration discovery and overrides.

use cotton::config::CottonConfig;
use serial_test::serial;
use std::fs;
use tempfile::TempDir;

use super::cotton_cmd;

/// Project whose components live in `templates/components/`.
fn project_with_components_dir() -> TempDir {
    let temp = TempDir::new().unwrap();
    let components = temp.path().join("templates/components");
    fs::create_dir_all(&components).unwrap();
    fs::write(components.join("tag.html"), "<{{ slot }}>").unwrap();
    fs::write(temp.path().join("templates/page.html"), "<c-tag>x</c-tag>").unwrap();
    temp
}

#[test]
fn test_project_config_file_is_used() {
    let temp = project_with_components_dir();
    fs::write(temp.path().join("cotton.toml"), "cotton_dir = \"components\"\n").unwrap();

    cotton_cmd(temp.path()).args(["render", "page.html"]).assert().success().stdout("<x>");
}

#[test]
fn test_explicit_config_flag() {
    let temp = project_with_components_dir();
    fs::write(temp.path().join("alt.toml"), "cotton_dir = \"components\"\n").unwrap();

    cotton_cmd(temp.path())
        .args(["--config", "alt.toml", "render", "page.html"])
        .assert()
        .success()
        .stdout("<x>");
}

#[test]
fn test_cotton_dir_env_override() {
    let temp = project_with_components_dir();
    fs::write(temp.path().join("cotton.toml"), "cotton_dir = \"elsewhere\"\n").unwrap();

    cotton_cmd(temp.path())
        .env("COTTON_DIR", "components")
        .args(["render", "page.html"])
        .assert()
        .success()
        .stdout("<x>");
}

#[test]
fn test_invalid_config_file() {
    let temp = project_with_components_dir();
    fs::write(temp.path().join("cotton.toml"), "max_depth = \"deep\"\n").unwrap();

    cotton_cmd(temp.path())
        .args(["render", "page.html"])
        .assert()
        .failure()
        .stderr(predicates::str::contains("Failed to parse config file"));
}

#[cfg(target_os = "linux")]
#[test]
#[serial]
fn test_user_config_file() {
    let temp = TempDir::new().unwrap();
    let config_dir = temp.path().join("cotton");
    fs::create_dir_all(&config_dir).unwrap();
    fs::write(config_dir.join("config.toml"), "max_depth = 3\ntemplate_dirs = [\"site\"]\n").unwrap();

    let previous = std::env::var_os("XDG_CONFIG_HOME");
    // SAFETY: serialized with every other test touching the environment
    unsafe {
        std::env::set_var("XDG_CONFIG_HOME", temp.path());
        std::env::remove_var("COTTON_CONFIG_PATH");
    }
    let path = CottonConfig::user_config_path();
    let config = CottonConfig::load(None);
    unsafe {
        match previous {
            Some(value) => std::env::set_var("XDG_CONFIG_HOME", value),
            None => std::env::remove_var("XDG_CONFIG_HOME"),
        }
    }

    assert_eq!(path, Some(config_dir.join("config.toml")));
    let config = config.unwrap();
    assert_eq!(config.max_depth, 3);
    assert_eq!(config.template_dirs, vec![std::path::PathBuf::from("site")]);
}

#[test]
#[serial]
fn test_env_config_path_must_exist() {
    // SAFETY: serialized with every other test touching the environment
    unsafe {
        std::env::set_var("COTTON_CONFIG_PATH", "/nonexistent/cotton.toml");
    }
    let result = CottonConfig::load(None);
    unsafe {
        std::env::remove_var("COTTON_CONFIG_PATH");
    }

    let err = result.unwrap_err();
    assert!(err.to_string().contains("COTTON_CONFIG_PATH"));
}
