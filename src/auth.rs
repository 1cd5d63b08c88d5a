use std::fmt;

/// Environment variable the CLI checks for a bearer token.
pub const TOKEN_ENV_VAR: &str = "CHATMETER_TOKEN";

/// Opaque bearer credential for the usage service.
///
/// The token is forwarded to the provider verbatim and never decoded or
/// inspected. `Debug` redacts it so contexts can be logged safely.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthContext {
    token: String,
}

impl AuthContext {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }

    /// The raw token, for placement in an Authorization header.
    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn is_empty(&self) -> bool {
        self.token.is_empty()
    }
}

impl fmt::Debug for AuthContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthContext")
            .field("token", &"<redacted>")
            .finish()
    }
}

/// Resolve the CLI's bearer token: explicit flag first, then the
/// [`TOKEN_ENV_VAR`] environment variable, then the config file.
/// Empty candidates are skipped rather than accepted.
pub fn resolve_token(explicit: Option<&str>, from_config: Option<&str>) -> Option<AuthContext> {
    let env = std::env::var(TOKEN_ENV_VAR).ok();
    let resolved = [explicit, env.as_deref(), from_config]
        .into_iter()
        .flatten()
        .map(AuthContext::new)
        .find(|auth| !auth.is_empty());
    resolved
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_redacts_the_token() {
        let auth = AuthContext::new("secret-jwt-value");
        let debug = format!("{:?}", auth);
        assert!(!debug.contains("secret-jwt-value"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn token_round_trips() {
        let auth = AuthContext::new("abc123");
        assert_eq!(auth.token(), "abc123");
        assert!(!auth.is_empty());
        assert!(AuthContext::new("").is_empty());
    }

    // Single test for the whole precedence chain: it owns the env var for
    // its duration, so no other test may touch TOKEN_ENV_VAR.
    #[test]
    fn resolve_token_precedence() {
        std::env::remove_var(TOKEN_ENV_VAR);

        // Nothing configured anywhere.
        assert!(resolve_token(None, None).is_none());

        // Empty candidates are skipped, not accepted.
        assert!(resolve_token(Some(""), Some("")).is_none());

        // Config is the last resort.
        let auth = resolve_token(None, Some("from-config")).unwrap();
        assert_eq!(auth.token(), "from-config");

        // Env var beats config.
        std::env::set_var(TOKEN_ENV_VAR, "from-env");
        let auth = resolve_token(None, Some("from-config")).unwrap();
        assert_eq!(auth.token(), "from-env");

        // Explicit flag beats both.
        let auth = resolve_token(Some("from-flag"), Some("from-config")).unwrap();
        assert_eq!(auth.token(), "from-flag");

        std::env::remove_var(TOKEN_ENV_VAR);
    }
}
