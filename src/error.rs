use crate::ConfigError;
use std::fmt::{Display, Formatter};

impl ConfigError {
    pub fn new(what: &'static str, message: String) -> Self {
        Self { what, message }
    }
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "ConfigError: {}-{}", self.what, self.message)
    }
}

impl std::error::Error for ConfigError {}
