// Session module: the in-memory authentication state for one run of the
// client. The menu loop owns the only `Session` and lends it to handlers;
// nothing else keeps a copy of the token.

/// Current user's authentication state.
///
/// `token` and `user_id` are only ever set or cleared together, so
/// `is_authenticated()` can never observe one without the other.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    base_url: String,
    token: Option<String>,
    user_id: Option<String>,
}

impl Session {
    /// Create an empty session against `base_url`. A single trailing slash
    /// is dropped so `base_url + "/api/..."` never yields `//`.
    pub fn new(base_url: &str) -> Self {
        let base_url = base_url.strip_suffix('/').unwrap_or(base_url);
        Session {
            base_url: base_url.to_string(),
            token: None,
            user_id: None,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    /// True iff both the bearer token and the user id are present.
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some() && self.user_id.is_some()
    }

    /// Store credentials from a successful register/login.
    pub fn authenticate(&mut self, user_id: String, token: String) {
        self.user_id = Some(user_id);
        self.token = Some(token);
    }

    /// Drop credentials. Calling this on an empty session is a no-op.
    pub fn clear(&mut self) {
        self.user_id = None;
        self.token = None;
    }
}
