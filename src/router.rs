//! Maps URL paths to pages and keeps every page except sign-in behind the credential check.

use crate::model::PartyRole;
use crate::session::Session;
use std::fmt::{Display, Formatter};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

/// A page of the application, addressed by its URL path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Dashboard,
    SignIn,
    CreateCompany,
    ViewCompany,
    CreateUser,
    ViewUser,
    CreateTransactions,
    ViewTransactions,
    EditTransaction(u64),
    ViewSlip { id: u64, role: PartyRole },
    Cashbook,
    NotFound(String),
}

impl Route {
    /// Parses a path such as `/view-slips/4?type=borrower`. Unknown paths become `NotFound`.
    pub fn parse(path: &str) -> Self {
        let path = path.trim();
        let (path_part, query) = match path.split_once('?') {
            Some((p, q)) => (p, q),
            None => (path, ""),
        };
        let segments: Vec<&str> = path_part
            .split('/')
            .filter(|s| !s.is_empty())
            .collect();

        match segments.as_slice() {
            [] => Route::Dashboard,
            ["signin"] => Route::SignIn,
            ["create-company"] => Route::CreateCompany,
            ["view-company"] => Route::ViewCompany,
            ["create-user"] => Route::CreateUser,
            ["view-user"] => Route::ViewUser,
            ["create-transactions"] => Route::CreateTransactions,
            ["view-transactions"] => Route::ViewTransactions,
            ["view-cashbook"] => Route::Cashbook,
            ["edit-transaction", id] => match id.parse() {
                Ok(id) => Route::EditTransaction(id),
                Err(_) => Route::NotFound(path.to_string()),
            },
            ["view-slips", id] => match id.parse() {
                Ok(id) => Route::ViewSlip {
                    id,
                    role: slip_role(query),
                },
                Err(_) => Route::NotFound(path.to_string()),
            },
            _ => Route::NotFound(path.to_string()),
        }
    }

    /// The canonical path of the route.
    pub fn path(&self) -> String {
        match self {
            Route::Dashboard => "/".into(),
            Route::SignIn => "/signin".into(),
            Route::CreateCompany => "/create-company".into(),
            Route::ViewCompany => "/view-company".into(),
            Route::CreateUser => "/create-user".into(),
            Route::ViewUser => "/view-user".into(),
            Route::CreateTransactions => "/create-transactions".into(),
            Route::ViewTransactions => "/view-transactions".into(),
            Route::EditTransaction(id) => format!("/edit-transaction/{id}"),
            Route::ViewSlip { id, role } => format!("/view-slips/{id}?type={role}"),
            Route::Cashbook => "/view-cashbook".into(),
            Route::NotFound(path) => path.clone(),
        }
    }

    /// Every dashboard page requires a credential. Sign-in and the not-found page do not.
    pub fn is_protected(&self) -> bool {
        !matches!(self, Route::SignIn | Route::NotFound(_))
    }
}

impl Display for Route {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.path())
    }
}

/// `type` defaults to lender when missing or unrecognised.
fn slip_role(query: &str) -> PartyRole {
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(k, _)| k == "type")
        .and_then(|(_, v)| v.parse().ok())
        .unwrap_or_default()
}

#[derive(Debug)]
struct History {
    current: Route,
    previous: Vec<Route>,
}

/// A cloneable handle to the current route. All clones share the same history.
#[derive(Debug, Clone)]
pub struct Navigator {
    history: Arc<Mutex<History>>,
}

impl Default for Navigator {
    fn default() -> Self {
        Self::new(Route::SignIn)
    }
}

impl Navigator {
    pub fn new(start: Route) -> Self {
        Self {
            history: Arc::new(Mutex::new(History {
                current: start,
                previous: Vec::new(),
            })),
        }
    }

    pub async fn current(&self) -> Route {
        self.history.lock().await.current.clone()
    }

    /// Goes to `route` if the session allows it. A protected route without a usable credential
    /// lands on sign-in instead. Returns the route that was actually entered.
    pub async fn navigate(&self, route: Route, session: &Session) -> Route {
        let target = if route.is_protected() && !session.is_signed_in().await {
            debug!("No usable credential for {route}, redirecting to sign-in");
            Route::SignIn
        } else {
            route
        };
        self.redirect(target.clone()).await;
        target
    }

    /// Goes to `route` without checking the session.
    pub async fn redirect(&self, route: Route) {
        let mut history = self.history.lock().await;
        if history.current != route {
            let previous = std::mem::replace(&mut history.current, route);
            history.previous.push(previous);
        }
    }

    /// Returns to the previous route, if any.
    pub async fn back(&self) -> Route {
        let mut history = self.history.lock().await;
        if let Some(previous) = history.previous.pop() {
            history.current = previous;
        }
        history.current.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{encode_token, Claims};
    use tempfile::TempDir;

    #[test]
    fn test_parse_routes() {
        assert_eq!(Route::parse("/"), Route::Dashboard);
        assert_eq!(Route::parse(""), Route::Dashboard);
        assert_eq!(Route::parse("/signin"), Route::SignIn);
        assert_eq!(Route::parse("/view-cashbook/"), Route::Cashbook);
        assert_eq!(Route::parse("edit-transaction/12"), Route::EditTransaction(12));
        assert_eq!(
            Route::parse("/view-slips/4?type=borrower"),
            Route::ViewSlip {
                id: 4,
                role: PartyRole::Borrower
            }
        );
        assert_eq!(
            Route::parse("/view-slips/4"),
            Route::ViewSlip {
                id: 4,
                role: PartyRole::Lender
            }
        );
        assert_eq!(
            Route::parse("/edit-transaction/abc"),
            Route::NotFound("/edit-transaction/abc".into())
        );
        assert_eq!(Route::parse("/calendar"), Route::NotFound("/calendar".into()));
    }

    #[test]
    fn test_path_round_trips() {
        for route in [
            Route::Dashboard,
            Route::ViewUser,
            Route::EditTransaction(3),
            Route::ViewSlip {
                id: 9,
                role: PartyRole::Borrower,
            },
        ] {
            assert_eq!(Route::parse(&route.path()), route);
        }
    }

    #[test]
    fn test_protected() {
        assert!(Route::Dashboard.is_protected());
        assert!(Route::Cashbook.is_protected());
        assert!(!Route::SignIn.is_protected());
        assert!(!Route::NotFound("/x".into()).is_protected());
    }

    #[tokio::test]
    async fn test_navigate_requires_credential() {
        let dir = TempDir::new().unwrap();
        let session = Session::load(dir.path().join("t.json")).await.unwrap();
        let nav = Navigator::default();

        assert_eq!(nav.navigate(Route::Cashbook, &session).await, Route::SignIn);
        assert_eq!(nav.current().await, Route::SignIn);

        let claims = Claims {
            sub: 1,
            email: "a@b.c".into(),
            iat: 0,
            exp: 0,
        };
        session.store(&encode_token(&claims)).await.unwrap();
        assert_eq!(nav.navigate(Route::Cashbook, &session).await, Route::Cashbook);
        assert_eq!(nav.current().await, Route::Cashbook);
    }

    #[tokio::test]
    async fn test_back() {
        let nav = Navigator::new(Route::Dashboard);
        nav.redirect(Route::ViewTransactions).await;
        nav.redirect(Route::EditTransaction(1)).await;
        assert_eq!(nav.back().await, Route::ViewTransactions);
        assert_eq!(nav.back().await, Route::Dashboard);
        assert_eq!(nav.back().await, Route::Dashboard);
    }
}
