use std::collections::HashMap;

use axum::http::HeaderMap;

use pixvault_types::Owner;

/// Resolves an inbound request to the owner it acts for.
///
/// Session and identity management is an external collaborator; this seam
/// is all the core needs from it. Implementations look at whatever
/// credential material they recognize and either name an owner or don't.
pub trait SessionManager: Send + Sync {
    fn resolve(&self, headers: &HeaderMap) -> Option<Owner>;
}

/// A fixed token-to-owner table.
///
/// Recognizes `Authorization: Bearer <token>` and a `sid=<token>` cookie.
/// Suitable for tests and single-user deployments; real deployments plug a
/// session backend in behind the trait.
#[derive(Debug, Default)]
pub struct StaticTokenSessions {
    tokens: HashMap<String, Owner>,
}

impl StaticTokenSessions {
    pub fn new(tokens: HashMap<String, Owner>) -> Self {
        Self { tokens }
    }

    /// Build from the config-file representation (token -> owner id).
    pub fn from_table(table: &HashMap<String, String>) -> Self {
        Self {
            tokens: table
                .iter()
                .map(|(tok, owner)| (tok.clone(), Owner::new(owner.clone())))
                .collect(),
        }
    }

    fn token_from(headers: &HeaderMap) -> Option<&str> {
        if let Some(auth) = headers.get("authorization").and_then(|v| v.to_str().ok()) {
            if let Some(token) = auth.strip_prefix("Bearer ") {
                return Some(token.trim());
            }
        }
        let cookies = headers.get("cookie")?.to_str().ok()?;
        cookies.split(';').find_map(|pair| {
            let (k, v) = pair.trim().split_once('=')?;
            (k == "sid").then_some(v)
        })
    }
}

impl SessionManager for StaticTokenSessions {
    fn resolve(&self, headers: &HeaderMap) -> Option<Owner> {
        let token = Self::token_from(headers)?;
        self.tokens.get(token).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn sessions() -> StaticTokenSessions {
        let mut tokens = HashMap::new();
        tokens.insert("tok-alice".to_string(), Owner::new("alice"));
        StaticTokenSessions::new(tokens)
    }

    #[test]
    fn bearer_token_resolves() {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_static("Bearer tok-alice"));
        assert_eq!(sessions().resolve(&headers), Some(Owner::new("alice")));
    }

    #[test]
    fn cookie_resolves() {
        let mut headers = HeaderMap::new();
        headers.insert("cookie", HeaderValue::from_static("theme=dark; sid=tok-alice"));
        assert_eq!(sessions().resolve(&headers), Some(Owner::new("alice")));
    }

    #[test]
    fn unknown_token_does_not_resolve() {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_static("Bearer nope"));
        assert_eq!(sessions().resolve(&headers), None);
    }

    #[test]
    fn missing_credentials_do_not_resolve() {
        assert_eq!(sessions().resolve(&HeaderMap::new()), None);
    }
}
