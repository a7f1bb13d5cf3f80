//! Route table, route guard and navigator.
//!
//! The guard evaluates two gates per navigation (authentication required,
//! admin required) after hydrating the session. Navigation is suspended
//! until hydration has finished.

use std::sync::Arc;

use async_trait::async_trait;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use tokio::sync::Mutex;

use crate::http::SessionInvalidator;
use crate::session_store::{SessionStore, SharedSession};

pub const HOME: &str = "/";
pub const LOGIN: &str = "/login";

/// Characters left unescaped in the `redirect` query value.
const REDIRECT_SAFE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Route {
    pub name: &'static str,
    pub pattern: &'static str,
    pub requires_auth: bool,
    pub requires_admin: bool,
}

impl Route {
    pub const fn public(name: &'static str, pattern: &'static str) -> Self {
        Self {
            name,
            pattern,
            requires_auth: false,
            requires_admin: false,
        }
    }

    pub const fn authenticated(name: &'static str, pattern: &'static str) -> Self {
        Self {
            name,
            pattern,
            requires_auth: true,
            requires_admin: false,
        }
    }

    pub const fn admin(name: &'static str, pattern: &'static str) -> Self {
        Self {
            name,
            pattern,
            requires_auth: true,
            requires_admin: true,
        }
    }

    /// `:name` segments match any single non-empty segment.
    pub fn matches(&self, path: &str) -> bool {
        let mut pattern = segments(self.pattern);
        let mut actual = segments(path);
        loop {
            match (pattern.next(), actual.next()) {
                (None, None) => return true,
                (Some(p), Some(a)) if p.starts_with(':') || p == a => {}
                _ => return false,
            }
        }
    }
}

fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

#[derive(Debug, Clone)]
pub struct RouteTable {
    routes: Vec<Route>,
}

impl Default for RouteTable {
    fn default() -> Self {
        Self::new(vec![
            Route::public("home", HOME),
            Route::public("login", LOGIN),
            Route::public("catalog", "/catalog"),
            Route::public("product", "/products/:id"),
            Route::public("cart", "/cart"),
            Route::authenticated("checkout", "/checkout"),
            Route::authenticated("receipt", "/orders/:id/receipt"),
            Route::admin("admin", "/admin"),
            Route::admin("admin-products", "/admin/products"),
            Route::admin("admin-users", "/admin/users"),
            Route::admin("admin-purchases", "/admin/purchases"),
            Route::admin("admin-stock-report", "/admin/stock-report"),
        ])
    }
}

impl RouteTable {
    pub fn new(routes: Vec<Route>) -> Self {
        Self { routes }
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// First route matching the path part of `target` (query ignored).
    pub fn resolve(&self, target: &str) -> Option<&Route> {
        let path = Location::parse(target).path;
        self.routes.iter().find(|r| r.matches(&path))
    }
}

/// A path plus optional query string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub path: String,
    pub query: Option<String>,
}

impl Location {
    pub fn parse(target: &str) -> Self {
        let target = target.trim();
        let (path, query) = match target.split_once('?') {
            Some((path, query)) => (path, Some(query.to_string()).filter(|q| !q.is_empty())),
            None => (target, None),
        };
        let path = if path.is_empty() {
            HOME.to_string()
        } else if path.starts_with('/') {
            path.to_string()
        } else {
            format!("/{path}")
        };
        Self { path, query }
    }

    pub fn home() -> Self {
        Self::parse(HOME)
    }

    /// `/login?redirect=<target>`.
    pub fn login_with_redirect(target: &str) -> Self {
        let encoded = utf8_percent_encode(target, REDIRECT_SAFE).to_string();
        Self {
            path: LOGIN.to_string(),
            query: Some(format!("redirect={encoded}")),
        }
    }

    /// Decoded value of the `redirect` query parameter, if any.
    pub fn redirect_target(&self) -> Option<String> {
        let query = self.query.as_deref()?;
        query
            .split('&')
            .filter_map(|pair| pair.split_once('='))
            .find(|(k, _)| *k == "redirect")
            .and_then(|(_, v)| percent_encoding::percent_decode_str(v).decode_utf8().ok())
            .map(|v| v.into_owned())
            .filter(|v| v.starts_with('/'))
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.query {
            Some(query) => write!(f, "{}?{}", self.path, query),
            None => f.write_str(&self.path),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationDecision {
    Allow,
    Redirect(Location),
}

#[derive(Debug, Clone, Default)]
pub struct RouteGuard {
    table: RouteTable,
}

impl RouteGuard {
    pub fn new(table: RouteTable) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    /// Decide whether navigation to `target` may proceed.
    ///
    /// Unknown paths carry no flags and are allowed.
    pub async fn check(&self, target: &str, session: &mut SessionStore) -> NavigationDecision {
        let state = session.ensure_session().await;
        let location = Location::parse(target);
        let route = self.table.resolve(target);

        if location.path == LOGIN && state.is_logged_in() {
            return NavigationDecision::Redirect(Location::home());
        }

        let Some(route) = route else {
            return NavigationDecision::Allow;
        };

        if route.requires_auth && !state.is_logged_in() {
            return NavigationDecision::Redirect(Location::login_with_redirect(&location.to_string()));
        }
        if route.requires_admin && !state.is_admin() {
            return NavigationDecision::Redirect(Location::home());
        }
        NavigationDecision::Allow
    }
}

/// Current location of the shell. Clones share the same location.
#[derive(Debug, Clone)]
pub struct Navigator {
    guard: Arc<RouteGuard>,
    current: Arc<Mutex<Location>>,
}

impl Navigator {
    pub fn new(guard: RouteGuard) -> Self {
        Self {
            guard: Arc::new(guard),
            current: Arc::new(Mutex::new(Location::home())),
        }
    }

    pub async fn current(&self) -> Location {
        self.current.lock().await.clone()
    }

    /// Run the guard for `target` and commit wherever it leads.
    pub async fn navigate(&self, target: &str, session: &mut SessionStore) -> NavigationDecision {
        let decision = self.guard.check(target, session).await;
        let next = match &decision {
            NavigationDecision::Allow => Location::parse(target),
            NavigationDecision::Redirect(to) => to.clone(),
        };
        tracing::debug!(target, location = %next, "navigated");
        *self.current.lock().await = next;
        decision
    }

    /// Move without consulting the guard.
    pub async fn replace(&self, location: Location) {
        *self.current.lock().await = location;
    }
}

/// Tears down the in-memory session and sends the shell to the login page,
/// keeping the interrupted location as the return target.
#[derive(Debug, Clone)]
pub struct RedirectToLogin {
    session: SharedSession,
    navigator: Navigator,
}

impl RedirectToLogin {
    pub fn new(session: SharedSession, navigator: Navigator) -> Self {
        Self { session, navigator }
    }
}

#[async_trait]
impl SessionInvalidator for RedirectToLogin {
    async fn session_invalidated(&self) {
        self.session.lock().await.clear();

        let current = self.navigator.current().await;
        let next = if current.path == LOGIN || current.path == HOME {
            Location::parse(LOGIN)
        } else {
            Location::login_with_redirect(&current.to_string())
        };
        tracing::info!(location = %next, "session invalidated; redirecting to login");
        self.navigator.replace(next).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn patterns_match_params_and_ignore_query() {
        let table = RouteTable::default();

        assert_eq!(table.resolve("/products/42").map(|r| r.name), Some("product"));
        assert_eq!(table.resolve("/orders/7/receipt?print=1").map(|r| r.name), Some("receipt"));
        assert_eq!(table.resolve("/admin/").map(|r| r.name), Some("admin"));
        assert_eq!(table.resolve("/").map(|r| r.name), Some("home"));
        assert!(table.resolve("/products").is_none());
        assert!(table.resolve("/nowhere").is_none());
    }

    #[test]
    fn admin_routes_require_auth_too() {
        for route in RouteTable::default().routes() {
            if route.requires_admin {
                assert!(route.requires_auth, "{} must require auth", route.name);
            }
        }
    }

    #[test]
    fn login_redirect_round_trips_the_target() {
        let location = Location::login_with_redirect("/orders/9/receipt?copy=2");

        assert_eq!(location.path, LOGIN);
        assert_eq!(
            location.to_string(),
            "/login?redirect=%2Forders%2F9%2Freceipt%3Fcopy%3D2"
        );
        assert_eq!(
            location.redirect_target().as_deref(),
            Some("/orders/9/receipt?copy=2")
        );
    }

    proptest::proptest! {
        #[test]
        fn any_local_target_survives_the_login_redirect(rest in "\\PC*") {
            let target = format!("/{rest}");
            let location = Location::login_with_redirect(&target);
            proptest::prop_assert_eq!(location.redirect_target(), Some(target));
        }
    }

    #[test]
    fn redirect_target_rejects_external_urls() {
        let location = Location::parse("/login?redirect=https%3A%2F%2Fevil.example");
        assert_eq!(location.redirect_target(), None);
    }

    mod guard {
        use std::sync::Arc;

        use super::super::*;
        use crate::session_store::tests::{store_with, FakeAuth};
        use crate::storage::{ClientStorage, MemoryStorage};

        async fn logged_in(admin: bool) -> SessionStore {
            let mut store = store_with(FakeAuth::new(admin), Arc::new(MemoryStorage::new()));
            store.login("ana@ferreteria.gt", "secreto").await.unwrap();
            store
        }

        fn anonymous() -> SessionStore {
            store_with(FakeAuth::new(false), Arc::new(MemoryStorage::new()))
        }

        #[tokio::test]
        async fn admin_route_as_customer_goes_home() {
            let guard = RouteGuard::default();
            let mut session = logged_in(false).await;

            let decision = guard.check("/admin/products", &mut session).await;
            assert_eq!(decision, NavigationDecision::Redirect(Location::home()));
        }

        #[tokio::test]
        async fn admin_route_as_admin_is_allowed() {
            let guard = RouteGuard::default();
            let mut session = logged_in(true).await;

            assert_eq!(
                guard.check("/admin/stock-report", &mut session).await,
                NavigationDecision::Allow
            );
        }

        #[tokio::test]
        async fn login_while_authenticated_goes_home() {
            let guard = RouteGuard::default();
            let mut session = logged_in(false).await;

            assert_eq!(
                guard.check("/login?redirect=%2Fcart", &mut session).await,
                NavigationDecision::Redirect(Location::home())
            );
        }

        #[tokio::test]
        async fn protected_route_while_anonymous_goes_to_login_with_return_path() {
            let guard = RouteGuard::default();
            let mut session = anonymous();

            let decision = guard.check("/orders/12/receipt", &mut session).await;
            let NavigationDecision::Redirect(location) = decision else {
                panic!("expected a redirect");
            };
            assert_eq!(location.path, LOGIN);
            assert_eq!(location.redirect_target().as_deref(), Some("/orders/12/receipt"));
        }

        #[tokio::test]
        async fn public_and_unknown_routes_are_allowed_anonymously() {
            let guard = RouteGuard::default();
            let mut session = anonymous();

            for target in ["/", "/catalog", "/products/3", "/login", "/nowhere"] {
                assert_eq!(guard.check(target, &mut session).await, NavigationDecision::Allow);
            }
        }

        #[tokio::test]
        async fn guard_hydrates_a_persisted_session() {
            let storage = Arc::new(MemoryStorage::new());
            storage.set(crate::storage::keys::TOKEN, "persisted").await.unwrap();
            let mut session = store_with(FakeAuth::new(true), storage);

            assert_eq!(
                RouteGuard::default().check("/admin", &mut session).await,
                NavigationDecision::Allow
            );
        }

        #[tokio::test]
        async fn navigator_commits_the_redirect() {
            let navigator = Navigator::new(RouteGuard::default());
            let mut session = anonymous();

            navigator.navigate("/checkout", &mut session).await;
            assert_eq!(navigator.current().await.to_string(), "/login?redirect=%2Fcheckout");

            let mut session = logged_in(false).await;
            navigator.navigate("/checkout", &mut session).await;
            assert_eq!(navigator.current().await.path, "/checkout");
        }

        #[tokio::test]
        async fn invalidation_clears_session_and_keeps_return_path() {
            let navigator = Navigator::new(RouteGuard::default());
            let mut session = logged_in(false).await;
            navigator.navigate("/checkout", &mut session).await;

            let invalidator = RedirectToLogin::new(session.shared(), navigator.clone());
            invalidator.session_invalidated().await;

            assert!(!session.is_logged_in().await);
            let current = navigator.current().await;
            assert_eq!(current.path, LOGIN);
            assert_eq!(current.redirect_target().as_deref(), Some("/checkout"));
        }
    }

    #[test]
    fn parse_normalizes_relative_paths() {
        assert_eq!(Location::parse("cart").path, "/cart");
        assert_eq!(Location::parse("").path, "/");
        assert_eq!(Location::parse("/cart?").query, None);
    }
}
