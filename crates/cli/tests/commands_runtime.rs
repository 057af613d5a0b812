use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock};

use serde_json::{json, Value};
use tempfile::TempDir;
use wardrobe_cli::commands::config;
use wardrobe_cli::commands::generate::{self, GenerateRequest};
use wardrobe_cli::commands::outfit::{self, OutfitRequest};
use wardrobe_core::Occasion;

#[test]
fn generate_returns_the_work_outfit() {
    with_env(&[], || {
        let dir = workspace();
        let catalog = write_json(&dir, "closet.json", &work_catalog());

        let result = generate::run(&GenerateRequest {
            occasion: Some(Occasion::Work),
            ..request(&dir, catalog)
        });
        assert_eq!(result.exit_code, 0, "unexpected failure: {}", result.output);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "generate");
        assert_eq!(payload["status"], "ok");
        assert_eq!(payload["data"]["catalog_items"], 4);

        let outfits = payload["data"]["outfits"].as_array().cloned().unwrap_or_default();
        assert_eq!(outfits.len(), 1);
        assert_eq!(outfits[0]["items"].as_array().map(Vec::len), Some(4));
        assert_eq!(outfits[0]["score"]["breakdown"]["occasion_suitability"], 1.0);
    });
}

#[test]
fn generate_accepts_a_wrapped_catalog() {
    with_env(&[], || {
        let dir = workspace();
        let catalog = write_json(&dir, "closet.json", &json!({ "items": work_catalog() }));

        let result = generate::run(&request(&dir, catalog));
        assert_eq!(result.exit_code, 0, "unexpected failure: {}", result.output);
        assert_eq!(parse_payload(&result.output)["data"]["catalog_items"], 4);
    });
}

#[test]
fn generate_reports_a_missing_catalog() {
    with_env(&[], || {
        let dir = workspace();
        let result = generate::run(&request(&dir, dir.path().join("absent.json")));
        assert_eq!(result.exit_code, 3, "expected catalog input failure code");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["status"], "error");
        assert_eq!(payload["error_class"], "catalog_input");
    });
}

#[test]
fn generate_rejects_invalid_options() {
    with_env(&[], || {
        let dir = workspace();
        let catalog = write_json(&dir, "closet.json", &work_catalog());

        let result =
            generate::run(&GenerateRequest { max_results: Some(0), ..request(&dir, catalog) });
        assert_eq!(result.exit_code, 4, "expected options validation failure code");
        assert_eq!(parse_payload(&result.output)["error_class"], "options_validation");
    });
}

#[test]
fn generate_reads_an_options_file_and_lets_flags_win() {
    with_env(&[], || {
        let dir = workspace();
        let catalog = write_json(&dir, "closet.json", &work_catalog());
        let options =
            write_json(&dir, "options.json", &json!({ "occasion": "party", "max_results": 0 }));

        let result = generate::run(&GenerateRequest {
            options_file: Some(options),
            occasion: Some(Occasion::Work),
            max_results: Some(3),
            ..request(&dir, catalog)
        });
        assert_eq!(result.exit_code, 0, "unexpected failure: {}", result.output);

        let payload = parse_payload(&result.output);
        let breakdown = &payload["data"]["outfits"][0]["score"]["breakdown"];
        assert_eq!(breakdown["occasion_suitability"], 1.0);
    });
}

#[test]
fn generate_returns_config_failure_for_invalid_env() {
    with_env(&[("WARDROBE_SEARCH_MAX_DEPTH", "deep")], || {
        let dir = workspace();
        let catalog = write_json(&dir, "closet.json", &work_catalog());

        let result = generate::run(&request(&dir, catalog));
        assert_eq!(result.exit_code, 2, "expected config validation failure code");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "generate");
        assert_eq!(payload["error_class"], "config_validation");
    });
}

#[test]
fn generate_persists_history_between_runs() {
    with_env(&[], || {
        let dir = workspace();
        let catalog = write_json(&dir, "closet.json", &work_catalog());
        let history = dir.path().join("history.json");
        let with_history = || GenerateRequest {
            history: Some(history.clone()),
            min_score: Some(0.0),
            ..request(&dir, catalog.clone())
        };

        let first = parse_payload(&generate::run(&with_history()).output);
        assert!(history.exists(), "history file should be written");
        assert_eq!(first["data"]["history_entries"], 1);

        let second = parse_payload(&generate::run(&with_history()).output);
        let variety = |payload: &Value| {
            payload["data"]["outfits"][0]["score"]["breakdown"]["variety"].as_f64().unwrap_or(1.0)
        };
        assert!(variety(&second) < variety(&first), "repeat outfit should lose variety");
    });
}

#[test]
fn generate_reports_an_unwritable_history_file() {
    with_env(&[], || {
        let dir = workspace();
        let catalog = write_json(&dir, "closet.json", &work_catalog());
        let history = dir.path().join("missing-dir").join("history.json");

        let result = generate::run(&GenerateRequest {
            history: Some(history.clone()),
            ..request(&dir, catalog)
        });
        assert_eq!(result.exit_code, 6, "expected history failure code");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["error_class"], "history_io");
        let message = payload["message"].as_str().unwrap_or_default();
        assert!(message.contains("history file"), "got: {message}");
        assert!(message.contains(&history.display().to_string()), "got: {message}");
    });
}

#[test]
fn generate_reports_an_unreadable_history_file() {
    with_env(&[], || {
        let dir = workspace();
        let catalog = write_json(&dir, "closet.json", &work_catalog());

        let result = generate::run(&GenerateRequest {
            history: Some(dir.path().to_path_buf()),
            ..request(&dir, catalog)
        });
        assert_eq!(result.exit_code, 6, "expected history failure code");
        assert_eq!(parse_payload(&result.output)["error_class"], "history_io");
    });
}

#[test]
fn outfit_assembles_items_in_request_order() {
    with_env(&[], || {
        let dir = workspace();
        let catalog = write_json(&dir, "closet.json", &work_catalog());

        let result = outfit::run(&OutfitRequest {
            catalog,
            item_ids: vec!["black-loafers".to_string(), "navy-top".to_string()],
            name: "  Monday  ".to_string(),
        });
        assert_eq!(result.exit_code, 0, "unexpected failure: {}", result.output);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "outfit");
        assert_eq!(payload["data"]["name"], "Monday");
        assert_eq!(payload["data"]["item_ids"], json!(["black-loafers", "navy-top"]));
        assert_eq!(payload["data"]["occasion"], json!(["work"]));
    });
}

#[test]
fn outfit_rejects_unknown_item_ids() {
    with_env(&[], || {
        let dir = workspace();
        let catalog = write_json(&dir, "closet.json", &work_catalog());

        let result = outfit::run(&OutfitRequest {
            catalog,
            item_ids: vec!["navy-top".to_string(), "ghost".to_string()],
            name: String::new(),
        });
        assert_eq!(result.exit_code, 3);
        let payload = parse_payload(&result.output);
        assert_eq!(payload["error_class"], "catalog_input");
        assert!(payload["message"].as_str().unwrap_or_default().contains("ghost"));
    });
}

#[test]
fn config_attributes_env_and_file_sources() {
    with_env(&[("WARDROBE_SEARCH_MAX_DEPTH", "20"), ("WARDROBE_LOG_LEVEL", "debug")], || {
        let dir = workspace();
        let path = dir.path().join("wardrobe.toml");
        write_file(&path, "[scoring]\nscore_floor = 0.5\n");

        let output = config::run(Some(&path));
        assert!(
            output.contains("- search.max_depth = 20 (source: env (WARDROBE_SEARCH_MAX_DEPTH))")
        );
        assert!(output.contains("- logging.level = debug (source: env (WARDROBE_LOG_LEVEL))"));
        assert!(output.contains(&format!(
            "- scoring.score_floor = 0.5 (source: file ({}))",
            path.display()
        )));
        assert!(output.contains("- search.max_outfits = 500 (source: default)"));
    });
}

#[test]
fn config_reports_validation_failure() {
    with_env(&[("WARDROBE_SCORING_SCORE_FLOOR", "1.5")], || {
        let dir = workspace();
        let output = config::run(Some(&dir.path().join("wardrobe.toml")));
        assert!(output.starts_with("config validation failed"), "got: {output}");
    });
}

fn workspace() -> TempDir {
    tempfile::tempdir().expect("temp dir should be created")
}

fn request(dir: &TempDir, catalog: PathBuf) -> GenerateRequest {
    GenerateRequest {
        config_path: Some(dir.path().join("wardrobe.toml")),
        catalog,
        ..GenerateRequest::default()
    }
}

fn work_catalog() -> Value {
    json!([
        { "id": "navy-top", "category": "tops", "color": "#000080", "occasion": ["work"] },
        { "id": "black-trousers", "category": "bottoms", "color": "#000000", "occasion": ["work"] },
        { "id": "black-loafers", "category": "shoes", "color": "#000000", "occasion": ["work"] },
        { "id": "silver-necklace", "category": "jewelry", "color": "#c0c0c0", "occasion": ["work"] }
    ])
}

fn write_json(dir: &TempDir, name: &str, value: &Value) -> PathBuf {
    let path = dir.path().join(name);
    write_file(&path, &value.to_string());
    path
}

fn write_file(path: &Path, contents: &str) {
    fs::write(path, contents).expect("fixture should be written");
}

fn parse_payload(output: &str) -> Value {
    serde_json::from_str(output).expect("command output should be valid JSON")
}

fn with_env(vars: &[(&str, &str)], test_fn: impl FnOnce()) {
    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    let _guard =
        ENV_LOCK.get_or_init(|| Mutex::new(())).lock().expect("env mutex should not be poisoned");

    let keys = [
        "WARDROBE_SEARCH_MAX_DEPTH",
        "WARDROBE_SEARCH_MAX_OUTFITS",
        "WARDROBE_SEARCH_MAX_ITEMS_PER_CATEGORY",
        "WARDROBE_SCORING_DEFAULT_MIN_SCORE",
        "WARDROBE_SCORING_SCORE_FLOOR",
        "WARDROBE_SCORING_DIVERSITY_THRESHOLD",
        "WARDROBE_RECENCY_WINDOW_DAYS",
        "WARDROBE_LOGGING_LEVEL",
        "WARDROBE_LOGGING_FORMAT",
        "WARDROBE_LOG_LEVEL",
        "WARDROBE_LOG_FORMAT",
    ];

    let previous_values: Vec<(&str, Option<String>)> =
        keys.iter().map(|key| (*key, env::var(key).ok())).collect();

    for key in &keys {
        env::remove_var(key);
    }
    for (key, value) in vars {
        env::set_var(key, value);
    }

    test_fn();

    for (key, value) in previous_values {
        if let Some(value) = value {
            env::set_var(key, value);
        } else {
            env::remove_var(key);
        }
    }
}
