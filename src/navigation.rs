//! Navigation gate read model.

use crate::session::SessionState;

/// Which screen graph the root navigator shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RootRoute {
    /// Session not restored yet; show a splash.
    Loading,
    /// Main and profile screens.
    Authenticated,
    /// Login and register screens.
    Unauthenticated,
}

impl RootRoute {
    pub fn for_state(state: &SessionState) -> Self {
        if state.is_loading {
            RootRoute::Loading
        } else if state.is_authenticated {
            RootRoute::Authenticated
        } else {
            RootRoute::Unauthenticated
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RootRoute::Loading => "loading",
            RootRoute::Authenticated => "authenticated",
            RootRoute::Unauthenticated => "unauthenticated",
        }
    }
}

impl std::fmt::Display for RootRoute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
