//! Runtime variables and placeholder substitution.
//!
//! A fixed set of `{{token}}` placeholders may appear in any manifest string.
//! Their values are captured once when the process starts and then passed by
//! reference to every component that substitutes them.

use chrono::{DateTime, Utc};
use std::env;

/// Placeholder for the run start timestamp.
pub const NOW: &str = "{{now}}";
/// Placeholder for the process working directory.
pub const CWD: &str = "{{cwd}}";
/// Placeholder for the invoking user's home directory.
pub const HOME: &str = "{{home}}";
/// Placeholder for the invoking user's login name.
pub const USER: &str = "{{user}}";

/// Timestamp layout used for `{{now}}` and for archive file names.
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d-%H%M%S-%6f";

/// Immutable mapping of placeholder token to value.
///
/// A token whose value could not be resolved is absent, so it is left
/// untouched by [`RuntimeVars::substitute`].
#[derive(Debug, Clone)]
pub struct RuntimeVars {
    timestamp: String,
    values: Vec<(&'static str, String)>,
}

impl RuntimeVars {
    /// Captures the runtime variables of the current process.
    pub fn capture() -> Self {
        let mut vars = Self::new(Utc::now());
        match env::current_dir() {
            Ok(cwd) => vars.set(CWD, cwd.to_string_lossy()),
            Err(e) => tracing::warn!("working directory is unavailable: {e}"),
        }
        match dirs::home_dir() {
            Some(home) => vars.set(HOME, home.to_string_lossy()),
            None => tracing::warn!("home directory is unavailable"),
        }
        match env::var("USER").or_else(|_| env::var("LOGNAME")) {
            Ok(user) => vars.set(USER, user),
            Err(_) => tracing::warn!("login name is unavailable"),
        }
        vars
    }

    /// Creates a mapping holding only `{{now}}` for the given instant.
    pub fn new(start: DateTime<Utc>) -> Self {
        let timestamp = start.format(TIMESTAMP_FORMAT).to_string();
        Self {
            values: vec![(NOW, timestamp.clone())],
            timestamp,
        }
    }

    /// Sets the value of a placeholder, replacing any previous one.
    pub fn set(&mut self, token: &'static str, value: impl Into<String>) {
        let value = value.into();
        match self.values.iter_mut().find(|(t, _)| *t == token) {
            Some(entry) => entry.1 = value,
            None => self.values.push((token, value)),
        }
    }

    /// Builder-style variant of [`RuntimeVars::set`].
    pub fn with(mut self, token: &'static str, value: impl Into<String>) -> Self {
        self.set(token, value);
        self
    }

    #[cfg(test)]
    fn get(&self, token: &str) -> Option<&str> {
        self.values
            .iter()
            .find(|(t, _)| *t == token)
            .map(|(_, v)| v.as_str())
    }

    /// The run start timestamp, shared by every archive of one invocation.
    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    /// Replaces every occurrence of every known placeholder in `text`.
    ///
    /// Tokens are matched as literal text, scanning left to right; replaced
    /// values are never rescanned.
    pub fn substitute(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        let mut rest = text;
        while let Some((pos, token, value)) = self.next_token(rest) {
            out.push_str(&rest[..pos]);
            out.push_str(value);
            rest = &rest[pos + token.len()..];
        }
        out.push_str(rest);
        out
    }

    /// Finds the leftmost placeholder in `text`.
    fn next_token<'a>(&'a self, text: &str) -> Option<(usize, &'static str, &'a str)> {
        self.values
            .iter()
            .filter_map(|(token, value)| text.find(token).map(|pos| (pos, *token, value.as_str())))
            .min_by_key(|(pos, _, _)| *pos)
    }
}
