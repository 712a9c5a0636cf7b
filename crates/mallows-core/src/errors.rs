//! Structured error types shared across the Mallows crates.

use std::collections::BTreeMap;
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structured payload attached to every [`MallowsError`] variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Stable machine readable error code.
    pub code: String,
    /// Human readable diagnostic message.
    pub message: String,
    /// Contextual key value pairs (item counts, offending names, etc.).
    #[serde(default)]
    pub context: BTreeMap<String, String>,
    /// Optional hint that may help the caller resolve the issue.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ErrorInfo {
    /// Creates a new error payload with the provided code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            context: BTreeMap::new(),
            hint: None,
        }
    }

    /// Adds a context entry to the payload.
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// Sets a human readable hint for remediation.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

/// Canonical error type for the Mallows engine.
///
/// Every variant is fatal and surfaced synchronously: a rejected MCMC
/// proposal is normal control flow and never travels through this type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "family", content = "detail")]
pub enum MallowsError {
    /// Unrecognized distance metric name.
    #[error("metric error: {0}")]
    Metric(ErrorInfo),
    /// Unrecognized augmentation error-model name.
    #[error("error model error: {0}")]
    ErrorModel(ErrorInfo),
    /// A ranking vector is not a valid permutation of `1..=n`.
    #[error("permutation error: {0}")]
    Permutation(ErrorInfo),
    /// An assessor's constraint set admits no valid completion.
    #[error("constraint error: {0}")]
    Constraint(ErrorInfo),
    /// Invalid run parameters or mis-shapen caller-supplied tables.
    #[error("config error: {0}")]
    Config(ErrorInfo),
    /// Randomness and distribution construction errors.
    #[error("rng error: {0}")]
    Rng(ErrorInfo),
}

impl Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code: {})", self.message, self.code)?;
        if !self.context.is_empty() {
            write!(f, " | context: [")?;
            for (idx, (key, value)) in self.context.iter().enumerate() {
                if idx > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{key}={value}")?;
            }
            write!(f, "]")?;
        }
        if let Some(hint) = &self.hint {
            write!(f, " | hint: {hint}")?;
        }
        Ok(())
    }
}

impl MallowsError {
    /// Returns a reference to the payload describing the error.
    pub fn info(&self) -> &ErrorInfo {
        match self {
            MallowsError::Metric(info)
            | MallowsError::ErrorModel(info)
            | MallowsError::Permutation(info)
            | MallowsError::Constraint(info)
            | MallowsError::Config(info)
            | MallowsError::Rng(info) => info,
        }
    }
}
