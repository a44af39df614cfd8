use clap::ValueEnum;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Server environment the CLI talks to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum Environment {
    /// Local development server.
    Local,
    /// Staging environment for pre-production testing.
    Staging,
    /// Production environment.
    #[default]
    Production,
}

impl Environment {
    /// Base URL of the Gizmo server for this environment.
    pub fn base_url(&self) -> String {
        match self {
            Environment::Local => "http://localhost:8000".to_string(),
            Environment::Staging => "https://staging.gizmo-analytics.io".to_string(),
            Environment::Production => "https://gizmo-analytics.io".to_string(),
        }
    }
}

impl FromStr for Environment {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "local" => Ok(Environment::Local),
            "staging" => Ok(Environment::Staging),
            "production" => Ok(Environment::Production),
            _ => Err(()),
        }
    }
}

impl Display for Environment {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Local => write!(f, "Local"),
            Environment::Staging => write!(f, "Staging"),
            Environment::Production => write!(f, "Production"),
        }
    }
}
