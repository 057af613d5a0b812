use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("invalid generation options: {0}")]
    InvalidOptions(String),
    #[error("domain invariant violation: {0}")]
    InvariantViolation(String),
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ApplicationError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("catalog failure: {0}")]
    Catalog(String),
    #[error("configuration failure: {0}")]
    Configuration(String),
    #[error("history failure: {0}")]
    History(String),
}

impl ApplicationError {
    /// Stable machine-readable class used by operator-facing payloads.
    pub fn error_class(&self) -> &'static str {
        match self {
            Self::Domain(DomainError::InvalidOptions(_)) => "options_validation",
            Self::Domain(DomainError::InvariantViolation(_)) => "internal",
            Self::Catalog(_) => "catalog_input",
            Self::Configuration(_) => "config_validation",
            Self::History(_) => "history_io",
        }
    }

    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Domain(DomainError::InvalidOptions(_)) => {
                "The generation options were rejected. Check inputs and try again."
            }
            Self::Domain(DomainError::InvariantViolation(_)) => {
                "An unexpected internal error occurred."
            }
            Self::Catalog(_) => "The wardrobe catalog could not be read.",
            Self::Configuration(_) => "The engine configuration is invalid.",
            Self::History(_) => "The outfit history file could not be read or written.",
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::errors::{ApplicationError, DomainError};

    #[test]
    fn invalid_options_map_to_options_validation_class() {
        let error = ApplicationError::from(DomainError::InvalidOptions(
            "max_results must be greater than zero".to_owned(),
        ));

        assert_eq!(error.error_class(), "options_validation");
        assert_eq!(
            error.user_message(),
            "The generation options were rejected. Check inputs and try again."
        );
    }

    #[test]
    fn domain_errors_display_through_transparently() {
        let error = ApplicationError::from(DomainError::InvariantViolation("empty key".to_owned()));
        assert_eq!(error.to_string(), "domain invariant violation: empty key");
        assert_eq!(error.error_class(), "internal");
    }

    #[test]
    fn catalog_and_configuration_errors_have_distinct_classes() {
        assert_eq!(ApplicationError::Catalog("bad json".to_owned()).error_class(), "catalog_input");
        assert_eq!(
            ApplicationError::Configuration("weights".to_owned()).error_class(),
            "config_validation"
        );
        assert_eq!(ApplicationError::History("disk full".to_owned()).error_class(), "history_io");
    }
}
