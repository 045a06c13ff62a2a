//! Credential resolution: environment variables first, interactive prompt
//! as a fallback.
//!
//! Secrets are wrapped in [`SecureString`] so they cannot leak through Debug
//! or Display formatting.

use std::io::{self, BufRead, Write};

/// Username environment variable.
pub const USERNAME_VAR: &str = "TROLLEY_USERNAME";
/// Password environment variable.
pub const PASSWORD_VAR: &str = "TROLLEY_PASSWORD";
/// Bearer-token override: when set, login is bypassed for the whole process.
pub const TOKEN_VAR: &str = "TROLLEY_TOKEN";

/// Wrapper for sensitive strings that prevents accidental logging.
///
/// The inner value is never exposed via Debug or Display traits.
/// Use `expose()` to access the actual value when needed for API calls.
#[derive(Clone)]
pub struct SecureString(String);

impl SecureString {
    pub fn new(value: String) -> Self {
        Self(value)
    }

    /// Expose the inner value. Use sparingly, only when actually sending
    /// to the API.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for SecureString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SecureString(••••••••)")
    }
}

impl std::fmt::Display for SecureString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "••••••••")
    }
}

/// A username/password pair. Never persisted in plaintext; only the derived
/// session tokens reach the session store.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: SecureString,
}

/// Source of login credentials.
///
/// `resolve` is called on demand, once per login attempt, and is never
/// cached by the caller; an interactive source may prompt each time.
pub trait CredentialSource {
    fn resolve(&self) -> Option<Credentials>;
}

/// Reads `TROLLEY_USERNAME` / `TROLLEY_PASSWORD`. Both must be non-empty.
pub struct EnvCredentialSource;

impl CredentialSource for EnvCredentialSource {
    fn resolve(&self) -> Option<Credentials> {
        let username = non_empty_var(USERNAME_VAR)?;
        let password = non_empty_var(PASSWORD_VAR)?;
        Some(Credentials {
            username,
            password: SecureString::new(password),
        })
    }
}

/// Prompts on stderr and reads from stdin. Stdout stays clean for command
/// output so the CLI remains pipeable.
pub struct PromptCredentialSource;

impl CredentialSource for PromptCredentialSource {
    fn resolve(&self) -> Option<Credentials> {
        let username = prompt_line("Username: ")?;
        let password = prompt_line("Password: ")?;
        if username.is_empty() || password.is_empty() {
            return None;
        }
        Some(Credentials {
            username,
            password: SecureString::new(password),
        })
    }
}

/// Tries each source in order; first hit wins.
pub struct CredentialChain {
    sources: Vec<Box<dyn CredentialSource>>,
}

impl CredentialChain {
    pub fn new(sources: Vec<Box<dyn CredentialSource>>) -> Self {
        Self { sources }
    }

    /// Environment variables, then the interactive prompt.
    pub fn default_chain() -> Self {
        Self::new(vec![
            Box::new(EnvCredentialSource),
            Box::new(PromptCredentialSource),
        ])
    }
}

impl CredentialSource for CredentialChain {
    fn resolve(&self) -> Option<Credentials> {
        self.sources.iter().find_map(|s| s.resolve())
    }
}

/// The `TROLLEY_TOKEN` override, if set and non-empty.
pub fn bearer_token_from_env() -> Option<String> {
    non_empty_var(TOKEN_VAR)
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

fn prompt_line(prompt: &str) -> Option<String> {
    let mut err = io::stderr();
    err.write_all(prompt.as_bytes()).ok()?;
    err.flush().ok()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line).ok()?;
    let trimmed = line.trim_end_matches(['\r', '\n']).to_string();
    Some(trimmed)
}
