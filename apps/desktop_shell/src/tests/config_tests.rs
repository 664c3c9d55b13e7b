use super::*;

use std::{
    collections::HashMap,
    env,
    time::{SystemTime, UNIX_EPOCH},
};

fn temp_settings_file(contents: &str) -> std::path::PathBuf {
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let temp_root = env::temp_dir().join(format!("rflow_shell_config_test_{suffix}"));
    fs::create_dir_all(&temp_root).expect("temp root");
    let path = temp_root.join(SETTINGS_FILE);
    fs::write(&path, contents).expect("write settings");
    path
}

fn no_env(_: &str) -> Option<String> {
    None
}

#[test]
fn missing_file_and_env_yield_defaults() {
    let settings = load_settings_from(Path::new("/nonexistent/shell.toml"), no_env);
    assert_eq!(settings, Settings::default());
    assert_eq!(settings.ipc_port, DEFAULT_IPC_PORT);
    assert_eq!(
        Duration::from_secs(settings.request_timeout_secs),
        DEFAULT_REQUEST_TIMEOUT
    );
}

#[test]
fn file_values_are_applied() {
    let path = temp_settings_file(
        "ipc_port = 9100\nbackend_url = \"http://127.0.0.1:7000/chat\"\nrequest_timeout_secs = 5\n",
    );
    let settings = load_settings_from(&path, no_env);
    assert_eq!(settings.ipc_port, 9100);
    assert_eq!(
        settings.backend_url.as_deref(),
        Some("http://127.0.0.1:7000/chat")
    );
    assert_eq!(settings.request_timeout_secs, 5);
    fs::remove_dir_all(path.parent().expect("parent")).expect("cleanup");
}

#[test]
fn environment_overrides_file_and_bad_values_are_ignored() {
    let path = temp_settings_file("ipc_port = 9100\nrequest_timeout_secs = 5\n");
    let vars: HashMap<&str, &str> = [
        ("RFLOW_IPC_PORT", "9200"),
        ("RFLOW_REQUEST_TIMEOUT_SECS", "soon"),
        ("RFLOW_BACKEND_URL", "http://backend.local/api"),
    ]
    .into_iter()
    .collect();

    let settings = load_settings_from(&path, |name| vars.get(name).map(|v| v.to_string()));
    assert_eq!(settings.ipc_port, 9200);
    assert_eq!(settings.request_timeout_secs, 5);
    assert_eq!(
        settings.backend_url.as_deref(),
        Some("http://backend.local/api")
    );
    fs::remove_dir_all(path.parent().expect("parent")).expect("cleanup");
}

#[test]
fn malformed_file_falls_back_to_defaults() {
    let path = temp_settings_file("ipc_port = \"not a number\"");
    let settings = load_settings_from(&path, no_env);
    assert_eq!(settings, Settings::default());
    fs::remove_dir_all(path.parent().expect("parent")).expect("cleanup");
}

#[test]
fn positional_arguments_follow_the_launcher_order() {
    let args = Args::try_parse_from([
        "rflow-shell",
        "http://127.0.0.1:3838",
        "http://127.0.0.1:8000/message",
        "http://staging.example.com",
        "--ipc-port",
        "9300",
    ])
    .expect("parse args");

    let startup = resolve_startup_config(args, Settings::default());
    assert_eq!(startup.render_url, "http://127.0.0.1:3838");
    assert_eq!(
        startup.backend_url.as_deref(),
        Some("http://127.0.0.1:8000/message")
    );
    assert_eq!(
        startup.environment_url.as_deref(),
        Some("http://staging.example.com")
    );
    assert_eq!(startup.ipc_port, 9300);
    assert_eq!(startup.request_timeout, DEFAULT_REQUEST_TIMEOUT);
}

#[test]
fn settings_fill_in_what_the_command_line_omits() {
    let args = Args::try_parse_from(["rflow-shell", "http://127.0.0.1:3838"]).expect("parse");
    let settings = Settings {
        ipc_port: 9400,
        backend_url: Some("  ".to_string()),
        request_timeout_secs: 0,
    };

    let startup = resolve_startup_config(args, settings);
    assert_eq!(startup.ipc_port, 9400);
    assert_eq!(startup.backend_url, None);
    assert_eq!(startup.environment_url, None);
    assert_eq!(startup.request_timeout, Duration::from_secs(1));
}

#[test]
fn missing_render_url_is_a_usage_error() {
    let err = Args::try_parse_from(["rflow-shell"]).expect_err("render url is required");
    assert_eq!(
        err.kind(),
        clap::error::ErrorKind::MissingRequiredArgument
    );
    assert_ne!(err.exit_code(), 0);
}
