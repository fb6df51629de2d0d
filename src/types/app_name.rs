// ABOUTME: Validated application name used for workload, service and selector names.
// ABOUTME: Must be a valid RFC 1123 label so it can name cluster objects directly.

use std::fmt;

use super::label::{self, LabelError};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AppName(String);

impl AppName {
    pub fn new(value: &str) -> Result<Self, LabelError> {
        label::validate(value, "app name")?;
        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Default label selector for the application's pods.
    pub fn selector(&self) -> String {
        format!("app={}", self.0)
    }
}

impl fmt::Display for AppName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
