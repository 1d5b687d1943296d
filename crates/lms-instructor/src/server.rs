//! HTTP server for the instructor API.
//!
//! [`LmsApp`] combines the startup context with a student store and turns
//! them into an Axum router, or serves them directly.
//!
//! # Examples
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use lms_core::{startup, Settings};
//! use lms_instructor::server::LmsApp;
//! use lms_instructor::store::MemoryStore;
//!
//! # async fn example() -> Result<(), lms_core::LmsError> {
//! let context = startup::run(Settings::default())?.shared();
//! let app = LmsApp::new(context, Arc::new(MemoryStore::new()));
//! app.run("127.0.0.1:8000").await?;
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use axum::routing::{get, post};
use lms_core::{LmsError, LmsResult, StartupContext};

use crate::store::StudentStore;
use crate::views::{self, AppState};

/// Route of the students query endpoint.
///
/// `{course_id}` is a single path segment. Course ids containing slashes
/// (`Org/CS101/2024`) must be sent percent-encoded (`Org%2FCS101%2F2024`);
/// the handler receives them decoded.
pub const STUDENTS_QUERY_ROUTE: &str = "/courses/{course_id}/instructor/api/students_query";

/// The instructor web application.
pub struct LmsApp {
    context: Arc<StartupContext>,
    store: Arc<dyn StudentStore>,
}

impl LmsApp {
    /// Creates an application serving queries from `store`.
    pub fn new(context: Arc<StartupContext>, store: Arc<dyn StudentStore>) -> Self {
        Self { context, store }
    }

    /// The startup context.
    pub fn context(&self) -> &StartupContext {
        &self.context
    }

    /// Returns `true` if the students query route will be mounted.
    pub fn serves_instructor_queries(&self) -> bool {
        self.context.settings().features.enable_instructor_queries
    }

    /// Converts the application into an Axum router.
    ///
    /// The students query route is only mounted when the
    /// `enable_instructor_queries` feature is on.
    pub fn into_axum_router(self) -> axum::Router {
        let mut router = axum::Router::new().route("/health", get(views::health));
        if self.serves_instructor_queries() {
            router = router.route(STUDENTS_QUERY_ROUTE, post(views::students_query));
        }

        let state = AppState {
            context: self.context,
            store: self.store,
        };
        router
            .layer(axum::middleware::from_fn(views::request_id))
            .with_state(state)
    }

    /// Binds `addr` and serves the application until the server stops.
    ///
    /// # Errors
    ///
    /// Returns [`LmsError::ImproperlyConfigured`] if the address cannot be
    /// bound, or [`LmsError::InternalServerError`] if serving fails.
    pub async fn run(self, addr: &str) -> LmsResult<()> {
        let debug = self.context.settings().debug;
        let router = self.into_axum_router();
        let listener = tokio::net::TcpListener::bind(addr).await.map_err(|e| {
            LmsError::ImproperlyConfigured(format!("Failed to bind to {addr}: {e}"))
        })?;

        if debug {
            tracing::info!("Starting development server at http://{addr}/");
        } else {
            tracing::info!(%addr, "listening");
        }

        axum::serve(listener, router)
            .await
            .map_err(|e| LmsError::InternalServerError(format!("Server error: {e}")))?;

        Ok(())
    }
}

impl std::fmt::Debug for LmsApp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LmsApp")
            .field("debug", &self.context.settings().debug)
            .field("instructor_queries", &self.serves_instructor_queries())
            .field("services", &self.context.services().names())
            .finish_non_exhaustive()
    }
}
