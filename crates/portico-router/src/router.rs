//! The route table and its builder.

use http::Method;
use portico_core::DispatchError;
use thiserror::Error;

use crate::handler::Handler;
use crate::pattern::PatternError;
use crate::route::Route;

/// Why a path and method could not be resolved to a route.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    /// No route pattern matches the path.
    #[error("route not found")]
    NotFound,

    /// The first route matching the path rejects the method.
    #[error("method not allowed")]
    MethodNotAllowed {
        /// The method that route accepts.
        allowed: Method,
    },
}

impl From<RouteError> for DispatchError {
    fn from(error: RouteError) -> Self {
        match error {
            RouteError::NotFound => Self::RouteNotFound,
            RouteError::MethodNotAllowed { allowed } => Self::MethodNotAllowed { allowed },
        }
    }
}

/// An immutable, ordered route table.
///
/// Registration order is significant: [`Router::resolve`] stops at the
/// first route whose pattern matches.
#[derive(Debug, Clone, Default)]
pub struct Router {
    routes: Vec<Route>,
}

impl Router {
    /// Creates a router from routes in registration order.
    pub fn new(routes: impl IntoIterator<Item = Route>) -> Self {
        Self {
            routes: routes.into_iter().collect(),
        }
    }

    /// Starts a [`RouterBuilder`].
    #[must_use]
    pub fn builder() -> RouterBuilder {
        RouterBuilder::new()
    }

    /// Resolves a path and method to a route.
    ///
    /// # Errors
    ///
    /// Returns [`RouteError::NotFound`] if no pattern matches `path`, or
    /// [`RouteError::MethodNotAllowed`] if the first matching route does not
    /// accept `method`. Later routes are never consulted in that case.
    pub fn resolve(&self, path: &str, method: &Method) -> Result<&Route, RouteError> {
        let route = self
            .routes
            .iter()
            .find(|route| route.match_path(path).is_some())
            .ok_or(RouteError::NotFound)?;

        if route.match_method(method) {
            Ok(route)
        } else {
            Err(RouteError::MethodNotAllowed {
                allowed: route.method().clone(),
            })
        }
    }

    /// Returns every route pattern in registration order, duplicates kept.
    #[must_use]
    pub fn list_paths(&self) -> Vec<&str> {
        self.routes.iter().map(Route::path).collect()
    }

    /// Returns the registered routes.
    #[must_use]
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// Returns the number of routes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Returns `true` if no routes are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

impl FromIterator<Route> for Router {
    fn from_iter<I: IntoIterator<Item = Route>>(iter: I) -> Self {
        Self::new(iter)
    }
}

/// Collects routes fluently.
///
/// Pattern errors are held until [`RouterBuilder::build`], which reports
/// the first one.
#[derive(Debug, Default)]
#[must_use]
pub struct RouterBuilder {
    routes: Vec<Route>,
    error: Option<PatternError>,
}

impl RouterBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a handler for `method` on `path`.
    pub fn route(mut self, method: Method, path: &str, handler: impl Handler) -> Self {
        if self.error.is_none() {
            match Route::new(path, handler) {
                Ok(route) => self.routes.push(route.with_method(method)),
                Err(error) => self.error = Some(error),
            }
        }
        self
    }

    /// Registers a `GET` handler.
    pub fn get(self, path: &str, handler: impl Handler) -> Self {
        self.route(Method::GET, path, handler)
    }

    /// Registers a `POST` handler.
    pub fn post(self, path: &str, handler: impl Handler) -> Self {
        self.route(Method::POST, path, handler)
    }

    /// Registers a `PUT` handler.
    pub fn put(self, path: &str, handler: impl Handler) -> Self {
        self.route(Method::PUT, path, handler)
    }

    /// Registers a `DELETE` handler.
    pub fn delete(self, path: &str, handler: impl Handler) -> Self {
        self.route(Method::DELETE, path, handler)
    }

    /// Appends an already constructed route.
    pub fn add(mut self, route: Route) -> Self {
        self.routes.push(route);
        self
    }

    /// Finishes the table.
    ///
    /// # Errors
    ///
    /// Returns the first [`PatternError`] raised during registration.
    pub fn build(self) -> Result<Router, PatternError> {
        match self.error {
            Some(error) => Err(error),
            None => Ok(Router::new(self.routes)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::HandlerParams;
    use http::StatusCode;
    use portico_core::{Response, ResponseExt};

    async fn ok(_: HandlerParams) -> Response {
        Response::text(StatusCode::OK, "ok")
    }

    #[test]
    fn test_empty_router() {
        let router = Router::default();
        assert!(router.is_empty());
        assert_eq!(router.resolve("/", &Method::GET).unwrap_err(), RouteError::NotFound);
        assert!(router.list_paths().is_empty());
    }

    #[test]
    fn test_resolve_first_match_wins() {
        let router = Router::builder()
            .get("/a/:x", ok)
            .post("/a/:y", ok)
            .build()
            .unwrap();

        let route = router.resolve("/a/1", &Method::GET).unwrap();
        assert_eq!(route.path(), "/a/:x");

        // The POST route is shadowed by the earlier GET route.
        assert_eq!(
            router.resolve("/a/1", &Method::POST).unwrap_err(),
            RouteError::MethodNotAllowed {
                allowed: Method::GET
            }
        );
    }

    #[test]
    fn test_builder_reports_pattern_error() {
        let result = Router::builder().get("/", ok).get("/:", ok).build();
        assert!(matches!(result, Err(PatternError::EmptyParamName { .. })));
    }

    #[test]
    fn test_builder_methods() {
        let router = Router::builder()
            .get("/g", ok)
            .post("/p", ok)
            .put("/u", ok)
            .delete("/d", ok)
            .route(Method::PATCH, "/x", ok)
            .build()
            .unwrap();

        assert_eq!(router.len(), 5);
        assert!(router.resolve("/p", &Method::POST).is_ok());
        assert!(router.resolve("/u", &Method::PUT).is_ok());
        assert!(router.resolve("/d", &Method::DELETE).is_ok());
        assert!(router.resolve("/x", &Method::PATCH).is_ok());
    }

    #[test]
    fn test_route_error_into_dispatch_error() {
        let error: DispatchError = RouteError::MethodNotAllowed {
            allowed: Method::DELETE,
        }
        .into();
        assert_eq!(error.status_code(), StatusCode::METHOD_NOT_ALLOWED);
        assert!(matches!(
            error,
            DispatchError::MethodNotAllowed { ref allowed } if allowed == Method::DELETE
        ));

        let error: DispatchError = RouteError::NotFound.into();
        assert_eq!(error.status_code(), StatusCode::NOT_FOUND);
    }
}
