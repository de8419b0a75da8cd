//! Route guard.
//!
//! Decides which screen a request for `requested` actually lands on, given
//! whether a session exists.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Root,
    Login,
    Register,
    Dashboard,
    /// Any path the client does not know.
    Unknown(String),
}

impl Route {
    /// Parses a path such as `/login`. Trailing slashes are ignored.
    pub fn parse(path: &str) -> Self {
        match path.trim().trim_end_matches('/') {
            "" => Route::Root,
            "/login" => Route::Login,
            "/register" => Route::Register,
            "/dashboard" => Route::Dashboard,
            other => Route::Unknown(other.to_string()),
        }
    }

    pub fn path(&self) -> &str {
        match self {
            Route::Root => "/",
            Route::Login => "/login",
            Route::Register => "/register",
            Route::Dashboard => "/dashboard",
            Route::Unknown(path) => path,
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Resolves `requested` to the route that is actually shown.
///
/// The result is always one of `Login`, `Register` or `Dashboard`.
pub fn resolve(requested: &Route, is_authenticated: bool) -> Route {
    match (requested, is_authenticated) {
        (Route::Root, true) => Route::Dashboard,
        (Route::Root, false) => Route::Login,
        (Route::Login | Route::Register, true) => Route::Dashboard,
        (Route::Login, false) => Route::Login,
        (Route::Register, false) => Route::Register,
        (Route::Dashboard, true) => Route::Dashboard,
        (Route::Dashboard, false) => Route::Login,
        (Route::Unknown(_), _) => resolve(&Route::Root, is_authenticated),
    }
}
