use std::error::Error as StdError;

use thiserror::Error;

use crate::{
    domain::error::DomainError, infra::error::InfraError,
    presentation::views::TemplateRenderError,
};

/// Flattened error chain, outermost message first.
#[derive(Debug, Clone)]
pub struct ErrorReport {
    pub source: &'static str,
    pub messages: Vec<String>,
}

impl ErrorReport {
    pub fn from_error(source: &'static str, error: &dyn StdError) -> Self {
        let mut messages = Vec::new();
        messages.push(error.to_string());
        let mut current = error.source();
        while let Some(inner) = current {
            messages.push(inner.to_string());
            current = inner.source();
        }
        Self { source, messages }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Infra(#[from] InfraError),
    #[error(transparent)]
    Render(#[from] TemplateRenderError),
    #[error("stylesheet compilation failed: {0}")]
    Stylesheet(String),
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl AppError {
    pub fn stylesheet(message: impl Into<String>) -> Self {
        Self::Stylesheet(message.into())
    }

    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::Unexpected(message.into())
    }

    /// Where in the pipeline the error was raised.
    pub fn origin(&self) -> &'static str {
        match self {
            AppError::Domain(_) => "domain::engagements",
            AppError::Infra(InfraError::Io { .. }) => "infra::io",
            AppError::Infra(InfraError::DataSource { .. }) => "infra::data",
            AppError::Infra(InfraError::Telemetry(_)) => "infra::telemetry",
            AppError::Infra(InfraError::Configuration { .. }) => "config",
            AppError::Render(err) => err.origin(),
            AppError::Stylesheet(_) => "application::styles",
            AppError::Unexpected(_) => "application",
        }
    }

    pub fn report(&self) -> ErrorReport {
        ErrorReport::from_error(self.origin(), self)
    }
}
