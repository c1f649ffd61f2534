//! Provider errors and host diagnostics

use crate::segment::{format_api_error, ApiError};
use serde::Serialize;
use thiserror::Error;

/// Error returned by a lifecycle handler
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("unknown resource type '{0}'")]
    UnknownResourceType(String),

    #[error("invalid {resource} state: {source}")]
    InvalidState {
        resource: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("{resource} '{id}' not found")]
    NotFound { resource: &'static str, id: String },

    #[error("{resource} must be replaced to change {}", .attributes.join(", "))]
    RequiresReplacement {
        resource: &'static str,
        attributes: Vec<&'static str>,
    },

    #[error("{resource} state has no id")]
    MissingId { resource: &'static str },

    #[error("invalid value for {attribute}: {message}")]
    InvalidValue { attribute: String, message: String },

    #[error("invalid configuration: {}", summarize(.0))]
    Validation(Vec<Diagnostic>),
}

fn summarize(diagnostics: &[Diagnostic]) -> String {
    diagnostics
        .iter()
        .map(|d| match &d.attribute {
            Some(attribute) => format!("{}: {}", attribute, d.summary),
            None => d.summary.clone(),
        })
        .collect::<Vec<_>>()
        .join("; ")
}

impl ProviderError {
    /// True when the remote object is gone
    pub fn is_not_found(&self) -> bool {
        match self {
            ProviderError::Api(err) => err.is_not_found(),
            ProviderError::NotFound { .. } => true,
            _ => false,
        }
    }

    /// Diagnostics to hand to the host
    pub fn to_diagnostics(&self) -> Vec<Diagnostic> {
        match self {
            ProviderError::Validation(diagnostics) => diagnostics.clone(),
            ProviderError::Api(err) => vec![Diagnostic::error(format_api_error(err), err.to_string())],
            ProviderError::NotFound { .. } => {
                vec![Diagnostic::error("Resource not found.", self.to_string())]
            }
            ProviderError::RequiresReplacement { attributes, .. } => attributes
                .iter()
                .map(|attribute| {
                    Diagnostic::error("Attribute cannot be updated in place", self.to_string())
                        .with_attribute(attribute)
                })
                .collect(),
            ProviderError::InvalidValue { attribute, message } => {
                vec![Diagnostic::error("Invalid value", message.clone()).with_attribute(attribute)]
            }
            other => vec![Diagnostic::error("Provider error", other.to_string())],
        }
    }
}

pub type ProviderResult<T> = Result<T, ProviderError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
}

/// A host-facing message about a failed or suspicious operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub summary: String,
    pub detail: String,
    /// Dotted attribute path such as `settings.0.port`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attribute: Option<String>,
}

impl Diagnostic {
    pub fn error(summary: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            summary: summary.into(),
            detail: detail.into(),
            attribute: None,
        }
    }

    pub fn with_attribute(mut self, attribute: &str) -> Self {
        self.attribute = Some(attribute.to_string());
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}
