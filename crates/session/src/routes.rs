use crate::gate::SessionState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Login,
    Signup,
    Home,
    Logout,
}

impl Route {
    pub fn path(&self) -> &'static str {
        match self {
            Self::Login => "/login",
            Self::Signup => "/signup",
            Self::Home => "/",
            Self::Logout => "/logout",
        }
    }

    /// Exact match, tolerating a trailing slash.
    pub fn parse(path: &str) -> Option<Self> {
        let trimmed = path.trim_end_matches('/');
        match trimmed {
            "" => Some(Self::Home),
            "/login" => Some(Self::Login),
            "/signup" => Some(Self::Signup),
            "/logout" => Some(Self::Logout),
            _ => None,
        }
    }

    pub fn is_protected(&self) -> bool {
        matches!(self, Self::Home | Self::Logout)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    Render(Route),
    Placeholder,
    Redirect(Route),
}

/// Resolves a path against the current session state.
pub fn navigate(path: &str, state: SessionState) -> Navigation {
    let Some(route) = Route::parse(path) else {
        return Navigation::Redirect(Route::Home);
    };
    if !route.is_protected() {
        return Navigation::Render(route);
    }
    match state {
        SessionState::Unknown => Navigation::Placeholder,
        SessionState::Unauthenticated => Navigation::Redirect(Route::Login),
        SessionState::Authenticated => Navigation::Render(route),
    }
}
