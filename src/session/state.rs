//! Session state snapshot.

use super::user::User;

/// Published state of the session.
///
/// Built only through [`SessionState::derive`], so `is_authenticated` is
/// always `user.is_some() && token.is_some()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    pub user: Option<User>,
    pub token: Option<String>,
    pub is_authenticated: bool,
    /// True until the first `initialize()` completes.
    pub is_loading: bool,
}

impl SessionState {
    /// Build a state, deriving `is_authenticated` from `user` and `token`.
    pub fn derive(user: Option<User>, token: Option<String>, is_loading: bool) -> Self {
        let is_authenticated = user.is_some() && token.is_some();
        Self {
            user,
            token,
            is_authenticated,
            is_loading,
        }
    }

    /// Same loading flag, no session.
    pub fn signed_out(&self) -> Self {
        Self::derive(None, None, self.is_loading)
    }

    /// Whether the authentication invariant holds.
    pub fn is_consistent(&self) -> bool {
        self.is_authenticated == (self.user.is_some() && self.token.is_some())
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::derive(None, None, true)
    }
}
