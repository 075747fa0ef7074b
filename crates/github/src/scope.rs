//! The access-scope enforcer.
//!
//! Every statically-defined tool addresses resources through this guard:
//! the owner segment of a request path is always the authenticated
//! identity, and a caller-supplied owner that disagrees fails closed —
//! before any network call, never silently rewritten. Search tools scope
//! by query text instead of path, so the guard also rewrites queries.

use octoagent_core::ToolError;

/// The single authenticated identity, fixed at startup.
#[derive(Debug, Clone)]
pub struct ScopeGuard {
    username: String,
}

impl ScopeGuard {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
        }
    }

    /// The owner segment used in every resource path.
    pub fn owner(&self) -> &str {
        &self.username
    }

    /// Reject a supplied owner that is not the authenticated identity.
    /// GitHub logins are case-insensitive, so the comparison is too.
    pub fn expect_owner(&self, supplied: &str) -> Result<(), ToolError> {
        if supplied.eq_ignore_ascii_case(&self.username) {
            Ok(())
        } else {
            Err(ToolError::ScopeViolation {
                owner: supplied.to_string(),
                identity: self.username.clone(),
            })
        }
    }

    /// Resolve a repo argument to its bare name.
    ///
    /// Accepts `name` (rebound to the identity) or `owner/name` (owner
    /// checked). Anything else is malformed.
    pub fn repo_name<'a>(&self, repo: &'a str) -> Result<&'a str, ToolError> {
        match repo.split_once('/') {
            None => {
                if repo.is_empty() {
                    return Err(ToolError::InvalidArguments("empty repo name".into()));
                }
                Ok(repo)
            }
            Some((owner, name)) => {
                if owner.is_empty() || name.is_empty() || name.contains('/') {
                    return Err(ToolError::InvalidArguments(format!(
                        "malformed repo reference '{repo}'"
                    )));
                }
                self.expect_owner(owner)?;
                Ok(name)
            }
        }
    }

    /// Restrict a search query to resources owned by the identity.
    pub fn scope_query(&self, query: &str) -> String {
        format!("{query} user:{}", self.username)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alice() -> ScopeGuard {
        ScopeGuard::new("alice")
    }

    #[test]
    fn owner_matches_identity() {
        assert!(alice().expect_owner("alice").is_ok());
        assert!(alice().expect_owner("Alice").is_ok());
    }

    #[test]
    fn foreign_owner_fails_closed() {
        let err = alice().expect_owner("other").unwrap_err();
        assert!(matches!(err, ToolError::ScopeViolation { .. }));
    }

    #[test]
    fn bare_repo_name_is_rebound() {
        assert_eq!(alice().repo_name("demo").unwrap(), "demo");
    }

    #[test]
    fn qualified_repo_checked_against_identity() {
        assert_eq!(alice().repo_name("alice/demo").unwrap(), "demo");
        let err = alice().repo_name("other/demo").unwrap_err();
        assert!(matches!(err, ToolError::ScopeViolation { .. }));
    }

    #[test]
    fn malformed_repo_rejected() {
        assert!(alice().repo_name("").is_err());
        assert!(alice().repo_name("/demo").is_err());
        assert!(alice().repo_name("alice/").is_err());
        assert!(alice().repo_name("a/b/c").is_err());
    }

    #[test]
    fn queries_are_scoped_by_text() {
        assert_eq!(alice().scope_query("crash"), "crash user:alice");
    }
}
