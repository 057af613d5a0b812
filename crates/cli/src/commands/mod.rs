pub mod config;
pub mod generate;
pub mod outfit;

use std::fs;
use std::path::Path;

use anyhow::Context;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use wardrobe_core::config::{AppConfig, LoadOptions};
use wardrobe_core::{ApplicationError, ClothingItem, DomainError};

#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

#[derive(Debug, Serialize)]
struct CommandOutcome {
    command: String,
    status: String,
    error_class: Option<String>,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<serde_json::Value>,
}

impl CommandResult {
    pub fn success(command: &str, message: impl Into<String>) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "ok".to_string(),
            error_class: None,
            message: message.into(),
            data: None,
        };
        Self { exit_code: 0, output: serialize_payload(payload) }
    }

    pub fn success_with_data<T: Serialize>(
        command: &str,
        message: impl Into<String>,
        data: &T,
    ) -> Self {
        let data = match serde_json::to_value(data) {
            Ok(data) => data,
            Err(error) => return Self::failure(command, "serialization", error.to_string(), 1),
        };
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "ok".to_string(),
            error_class: None,
            message: message.into(),
            data: Some(data),
        };
        Self { exit_code: 0, output: serialize_payload(payload) }
    }

    pub fn failure(
        command: &str,
        error_class: &str,
        message: impl Into<String>,
        exit_code: u8,
    ) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "error".to_string(),
            error_class: Some(error_class.to_string()),
            message: message.into(),
            data: None,
        };
        Self { exit_code, output: serialize_payload(payload) }
    }

    pub fn from_error(command: &str, error: &ApplicationError) -> Self {
        tracing::warn!(
            event_name = "cli.command.failed",
            command,
            error_class = error.error_class(),
            error = %error,
            "command failed"
        );
        Self::failure(
            command,
            error.error_class(),
            format!("{} ({error})", error.user_message()),
            exit_code_for(error),
        )
    }
}

/// Exit codes: 2 config, 3 catalog input, 4 rejected options, 5 internal, 6 history file.
pub fn exit_code_for(error: &ApplicationError) -> u8 {
    match error {
        ApplicationError::Configuration(_) => 2,
        ApplicationError::Catalog(_) => 3,
        ApplicationError::Domain(DomainError::InvalidOptions(_)) => 4,
        ApplicationError::Domain(DomainError::InvariantViolation(_)) => 5,
        ApplicationError::History(_) => 6,
    }
}

fn serialize_payload(payload: CommandOutcome) -> String {
    serde_json::to_string(&payload).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"unknown\",\"status\":\"error\",\"error_class\":\"serialization\",\"message\":\"{}\"}}",
            error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
        )
    })
}

pub(crate) fn load_config(options: LoadOptions) -> Result<AppConfig, ApplicationError> {
    AppConfig::load(options).map_err(|error| ApplicationError::Configuration(error.to_string()))
}

/// A catalog file is either a bare JSON array of items or an object with an `items` array.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CatalogDocument {
    Items(Vec<ClothingItem>),
    Wrapped { items: Vec<ClothingItem> },
}

pub(crate) fn load_catalog(path: &Path) -> Result<Vec<ClothingItem>, ApplicationError> {
    let document: CatalogDocument =
        read_json(path).map_err(|error| ApplicationError::Catalog(format!("{error:#}")))?;
    let items = match document {
        CatalogDocument::Items(items) | CatalogDocument::Wrapped { items } => items,
    };
    tracing::debug!(
        event_name = "cli.catalog.loaded",
        path = %path.display(),
        items = items.len(),
        "catalog loaded"
    );
    Ok(items)
}

pub(crate) fn read_json<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read `{}`", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("failed to parse `{}`", path.display()))
}
