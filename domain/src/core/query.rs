//! Query value object

use super::error::DomainError;
use serde::{Deserialize, Serialize};

/// Optional per-query generation overrides.
///
/// Unset fields fall back to the team configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_round_bound: Option<usize>,
}

impl GenerationParams {
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_tool_round_bound(mut self, bound: usize) -> Self {
        self.tool_round_bound = Some(bound);
        self
    }

    /// Check every set field against its allowed range.
    pub fn validate(&self) -> Result<(), DomainError> {
        if let Some(t) = self.temperature
            && !(0.0..=1.0).contains(&t)
        {
            return Err(DomainError::InvalidParameter(format!(
                "temperature must be within [0, 1], got {}",
                t
            )));
        }
        if self.max_tokens == Some(0) {
            return Err(DomainError::InvalidParameter(
                "max_tokens must be greater than 0".to_string(),
            ));
        }
        if self.tool_round_bound == Some(0) {
            return Err(DomainError::InvalidParameter(
                "tool_round_bound must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// A user request dispatched to the team (Value Object)
///
/// Immutable once built; lives for one coordinator invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Query {
    text: String,
    #[serde(default)]
    params: GenerationParams,
}

impl Query {
    /// Create a query with default generation parameters.
    pub fn new(text: impl Into<String>) -> Result<Self, DomainError> {
        Self::with_params(text, GenerationParams::default())
    }

    /// Create a query with explicit generation overrides.
    pub fn with_params(
        text: impl Into<String>,
        params: GenerationParams,
    ) -> Result<Self, DomainError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(DomainError::InvalidQuery(
                "query text cannot be empty".to_string(),
            ));
        }
        params.validate()?;
        Ok(Self { text, params })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn params(&self) -> &GenerationParams {
        &self.params
    }
}

impl std::fmt::Display for Query {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_creation() {
        let q = Query::new("Analyze NVIDIA").unwrap();
        assert_eq!(q.text(), "Analyze NVIDIA");
        assert_eq!(q.params(), &GenerationParams::default());
    }

    #[test]
    fn test_empty_query_rejected() {
        assert!(matches!(Query::new(""), Err(DomainError::InvalidQuery(_))));
        assert!(matches!(Query::new("  \n"), Err(DomainError::InvalidQuery(_))));
    }

    #[test]
    fn test_temperature_range() {
        let ok = GenerationParams::default().with_temperature(1.0);
        assert!(Query::with_params("q", ok).is_ok());

        let bad = GenerationParams::default().with_temperature(1.5);
        assert!(matches!(
            Query::with_params("q", bad),
            Err(DomainError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_zero_bounds_rejected() {
        assert!(GenerationParams::default().with_max_tokens(0).validate().is_err());
        assert!(
            GenerationParams::default()
                .with_tool_round_bound(0)
                .validate()
                .is_err()
        );
        assert!(
            GenerationParams::default()
                .with_max_tokens(3000)
                .with_tool_round_bound(3)
                .validate()
                .is_ok()
        );
    }
}
