use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::error::CliError;

pub const DATABASE_URL: &str = "DATABASE_URL";

/// Environment variable manager that loads from system and .env files.
/// Values from a loaded file take precedence over the process environment.
#[derive(Debug, Clone)]
pub struct EnvManager {
    vars: HashMap<String, String>,
}

impl EnvManager {
    pub fn new() -> Self {
        Self {
            vars: std::env::vars().collect(),
        }
    }

    /// Builds the manager for a command: process environment plus the
    /// optional `.env` file.
    pub fn with_env_file(env_file: Option<&str>) -> Result<Self, CliError> {
        let mut env = Self::new();
        if let Some(path) = env_file {
            env.load_from_file(path)?;
        }
        Ok(env)
    }

    /// Load variables from a .env file
    pub fn load_from_file<P: AsRef<Path>>(&mut self, path: P) -> Result<(), CliError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            CliError::Config(format!("Failed to read env file {}: {}", path.display(), e))
        })?;

        self.parse_env_content(&content)?;
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    /// An explicit URL wins over `DATABASE_URL`.
    pub fn database_url(&self, explicit: Option<String>) -> Result<String, CliError> {
        explicit
            .or_else(|| self.get(DATABASE_URL).map(str::to_string))
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| {
                CliError::Config(format!("no connection URL: pass --url or set {DATABASE_URL}"))
            })
    }

    fn parse_env_content(&mut self, content: &str) -> Result<(), CliError> {
        for (line_num, line) in content.lines().enumerate() {
            let line = line.trim();

            // Skip empty lines and comments
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            // Parse KEY=VALUE format
            if let Some(eq_pos) = line.find('=') {
                let key = line[..eq_pos].trim();
                let value = line[eq_pos + 1..].trim();

                if key.is_empty() {
                    return Err(CliError::Config(format!(
                        "Invalid env file: empty key at line {}",
                        line_num + 1
                    )));
                }

                // Remove quotes from value if present
                let value = Self::unquote_value(value);

                self.vars.insert(key.to_string(), value);
            } else {
                return Err(CliError::Config(format!(
                    "Invalid env file: malformed line {} (expected KEY=VALUE)",
                    line_num + 1
                )));
            }
        }

        Ok(())
    }

    fn unquote_value(value: &str) -> String {
        let value = value.trim();

        // Handle double quotes
        if value.starts_with('"') && value.ends_with('"') && value.len() >= 2 {
            return value[1..value.len() - 1].to_string();
        }

        // Handle single quotes
        if value.starts_with('\'') && value.ends_with('\'') && value.len() >= 2 {
            return value[1..value.len() - 1].to_string();
        }

        value.to_string()
    }
}

impl Default for EnvManager {
    fn default() -> Self {
        Self::new()
    }
}
