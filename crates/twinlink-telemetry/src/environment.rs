use std::fmt::Display;

/// Deployment profile selecting log format and default level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Environment {
    /// Pretty output at `debug`.
    #[default]
    Local,
    /// JSON output at `debug`.
    Dev,
    /// JSON output at `info`.
    Prod,
}

impl Environment {
    pub fn default_level(self) -> &'static str {
        match self {
            Environment::Local | Environment::Dev => "debug",
            Environment::Prod => "info",
        }
    }

    pub fn is_json(self) -> bool {
        !matches!(self, Environment::Local)
    }
}

/// Unknown names fall back to [`Environment::Prod`].
impl From<&str> for Environment {
    fn from(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "local" => Environment::Local,
            "dev" => Environment::Dev,
            _ => Environment::Prod,
        }
    }
}

impl Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Environment::Local => "local",
            Environment::Dev => "dev",
            Environment::Prod => "prod",
        };
        f.write_str(name)
    }
}
