use std::fmt;

use log::debug;

/// Screens of the application.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Route {
    Index,
    Login,
    Register,
    WingSelection,
    Test { wing_id: String },
    Control,
    Users,
}

impl Route {
    /// Where the guard sends a user who has just signed in.
    pub const DEFAULT_AUTHENTICATED: Route = Route::WingSelection;
    /// Where the guard sends a user without a session.
    pub const DEFAULT_UNAUTHENTICATED: Route = Route::Login;

    /// Screens reserved for users without a session.
    pub fn is_unauthenticated_area(&self) -> bool {
        matches!(self, Route::Login | Route::Register)
    }

    pub fn test(wing_id: &str) -> Self {
        Route::Test {
            wing_id: wing_id.to_string(),
        }
    }

    pub fn path(&self) -> String {
        match self {
            Route::Index => "/".to_string(),
            Route::Login => "/login".to_string(),
            Route::Register => "/register".to_string(),
            Route::WingSelection => "/wing-selection".to_string(),
            Route::Test { wing_id } => format!("/test?wingId={}", wing_id),
            Route::Control => "/control".to_string(),
            Route::Users => "/users".to_string(),
        }
    }

    pub fn from_path(path: &str) -> Option<Self> {
        let (base, query) = match path.split_once('?') {
            Some((base, query)) => (base, Some(query)),
            None => (path, None),
        };
        match base {
            "/" | "" => Some(Route::Index),
            "/login" => Some(Route::Login),
            "/register" => Some(Route::Register),
            "/wing-selection" => Some(Route::WingSelection),
            "/control" => Some(Route::Control),
            "/users" => Some(Route::Users),
            "/test" => query?
                .split('&')
                .filter_map(|pair| pair.split_once('='))
                .find(|(key, _)| *key == "wingId")
                .map(|(_, wing_id)| Route::test(wing_id)),
            _ => None,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Route::Index => "Wind Tunnel",
            Route::Login => "Sign In",
            Route::Register => "Register",
            Route::WingSelection => "Wing Profile Selection",
            Route::Test { .. } => "Wind Tunnel Test",
            Route::Control => "Wind Tunnel Control",
            Route::Users => "Users",
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path())
    }
}

/// A screen stack. `replace` swaps the top screen, `push` stacks a new one and
/// `back` pops it.
#[derive(Debug, Clone)]
pub struct Navigator {
    stack: Vec<Route>,
}

impl Default for Navigator {
    fn default() -> Self {
        Self::new(Route::Index)
    }
}

impl Navigator {
    pub fn new(initial: Route) -> Self {
        Self {
            stack: vec![initial],
        }
    }

    pub fn current(&self) -> &Route {
        // the stack is never empty: back() refuses to pop the root
        &self.stack[self.stack.len() - 1]
    }

    pub fn replace(&mut self, route: Route) {
        debug!("navigation: replace {} -> {}", self.current(), route);
        let top = self.stack.len() - 1;
        self.stack[top] = route;
    }

    pub fn push(&mut self, route: Route) {
        debug!("navigation: push {}", route);
        self.stack.push(route);
    }

    /// Pop the top screen. Returns false at the root screen.
    pub fn back(&mut self) -> bool {
        if !self.can_go_back() {
            return false;
        }
        let popped = self.stack.pop();
        debug!("navigation: back from {:?} to {}", popped, self.current());
        true
    }

    pub fn can_go_back(&self) -> bool {
        self.stack.len() > 1
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Every route on the stack, root first.
    pub fn routes(&self) -> &[Route] {
        &self.stack
    }
}

/// State for each screen on a [`Navigator`]'s stack.
///
/// Screens below the top keep their state while others are pushed over them.
/// A screen is rebuilt only when its stack entry is replaced or popped.
#[derive(Debug)]
pub struct ScreenStack<S> {
    entries: Vec<(Route, S)>,
}

impl<S> Default for ScreenStack<S> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<S> ScreenStack<S> {
    /// Match the stack to `navigator`, dropping the state of screens that left it
    /// and calling `build` for the ones that joined.
    pub fn sync(&mut self, navigator: &Navigator, mut build: impl FnMut(&Route) -> S) {
        let routes = navigator.routes();
        let kept = self
            .entries
            .iter()
            .zip(routes)
            .take_while(|(entry, route)| entry.0 == **route)
            .count();
        if kept < self.entries.len() {
            debug!("screens: dropping {} screen(s)", self.entries.len() - kept);
            self.entries.truncate(kept);
        }
        for route in &routes[kept..] {
            debug!("screens: mounting {}", route);
            self.entries.push((route.clone(), build(route)));
        }
    }

    pub fn top_mut(&mut self) -> Option<&mut S> {
        self.entries.last_mut().map(|(_, screen)| screen)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
