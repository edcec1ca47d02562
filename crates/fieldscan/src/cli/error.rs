//! Helpful error types for CLI commands
//!
//! Every error includes:
//! - What went wrong
//! - Context about the situation
//! - Suggestions for how to fix it

use std::fmt;
use std::path::Path;

/// An error with helpful context and suggestions
#[derive(Debug)]
pub struct HelpfulError {
    pub message: String,
    pub context: Option<String>,
    pub suggestions: Vec<String>,
}

impl HelpfulError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            context: None,
            suggestions: Vec::new(),
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    pub fn with_suggestions(
        mut self,
        suggestions: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.suggestions.extend(suggestions.into_iter().map(|s| s.into()));
        self
    }

    /// Root directory does not exist
    pub fn root_not_found(path: &Path) -> Self {
        Self::new(format!("Root directory not found: {}", path.display()))
            .with_context("Every --root must be an existing directory")
            .with_suggestions([
                format!("TRY: Check that the path exists: ls -la {}", path.display()),
                "TRY: Check for typos in the path".to_string(),
            ])
    }

    /// Root exists but is a file
    pub fn not_a_directory(path: &Path) -> Self {
        Self::new(format!("Not a directory: {}", path.display()))
            .with_context("Roots are walked recursively, so they must be directories")
            .with_suggestion(format!(
                "TRY: Use the parent directory: fieldscan run --root {}",
                path.parent()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| ".".to_string())
            ))
    }

    /// No roots given
    pub fn no_roots() -> Self {
        Self::new("No root directories given")
            .with_context("At least one directory to scan is required")
            .with_suggestion("TRY: fieldscan run --root /data/field --output ./inventory")
    }

    /// Output prefix would escape the output directory
    pub fn invalid_prefix(prefix: &str) -> Self {
        Self::new(format!("Invalid output prefix: '{}'", prefix))
            .with_context("The prefix becomes part of each output file name")
            .with_suggestions([
                "TRY: Use letters, digits, '-' and '_' only".to_string(),
                "TRY: Put directories in --output instead".to_string(),
            ])
    }

    /// Config file could not be loaded
    pub fn config_error(path: &Path, details: &str) -> Self {
        Self::new(format!("Cannot load config: {}", path.display()))
            .with_context(details.to_string())
            .with_suggestions([
                "TRY: Print a default config: fieldscan config > fieldscan.toml".to_string(),
                "TRY: Check the TOML syntax and field names".to_string(),
            ])
    }

    /// A category pipeline could not write its output
    pub fn pipeline_failed(category: &str, details: &str) -> Self {
        Self::new(format!("The {} pipeline failed", category))
            .with_context(details.to_string())
            .with_suggestions([
                "TRY: Check that the output directory is writable".to_string(),
                "TRY: Re-run with -v for details".to_string(),
            ])
    }
}

impl fmt::Display for HelpfulError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "ERROR: {}", self.message)?;

        if let Some(ctx) = &self.context {
            writeln!(f, "CONTEXT: {}", ctx)?;
        }

        if !self.suggestions.is_empty() {
            writeln!(f)?;
            for suggestion in &self.suggestions {
                writeln!(f, "  {}", suggestion)?;
            }
        }

        Ok(())
    }
}

impl std::error::Error for HelpfulError {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_helpful_error_display() {
        let err = HelpfulError::new("Something went wrong")
            .with_context("While scanning")
            .with_suggestion("Try again");

        let display = format!("{}", err);
        assert!(display.contains("ERROR: Something went wrong"));
        assert!(display.contains("CONTEXT: While scanning"));
        assert!(display.contains("Try again"));
    }

    #[test]
    fn test_root_not_found() {
        let err = HelpfulError::root_not_found(&PathBuf::from("/nonexistent/root"));
        let display = format!("{}", err);
        assert!(display.contains("/nonexistent/root"));
        assert!(display.contains("TRY:"));
    }

    #[test]
    fn test_invalid_prefix() {
        let display = HelpfulError::invalid_prefix("../x").to_string();
        assert!(display.contains("'../x'"));
    }
}
