//! Runtime service registry.
//!
//! Proctoring integrations look up collaborators by name (`credit`,
//! `instructor`). Startup registers them into a [`ServiceRegistry`] owned by
//! the [`StartupContext`](crate::startup::StartupContext) instead of a
//! process-wide table.

use std::collections::BTreeMap;
use std::sync::Arc;

/// A named collaborator made available to integrations at runtime.
///
/// # Examples
///
/// ```
/// use lms_core::services::RuntimeService;
///
/// struct Grades;
///
/// impl RuntimeService for Grades {
///     fn name(&self) -> &str { "grades" }
/// }
/// ```
pub trait RuntimeService: Send + Sync {
    /// The name the service is looked up by.
    fn name(&self) -> &str;

    /// A human-readable description, shown by `lms check`.
    fn description(&self) -> &str {
        self.name()
    }

    /// Called once after startup has registered every service.
    fn ready(&self) {}
}

/// Credit eligibility lookups used by proctored exams.
#[derive(Debug, Default, Clone, Copy)]
pub struct CreditService;

impl RuntimeService for CreditService {
    fn name(&self) -> &str {
        "credit"
    }

    fn description(&self) -> &str {
        "Credit eligibility and requirement status"
    }
}

/// Deleting student attempts and managing staff access roles.
#[derive(Debug, Default, Clone, Copy)]
pub struct InstructorService;

impl RuntimeService for InstructorService {
    fn name(&self) -> &str {
        "instructor"
    }

    fn description(&self) -> &str {
        "Student attempt resets and staff access roles"
    }
}

/// Registry of runtime services keyed by name.
///
/// Registering a name twice replaces the earlier service. Once
/// [`populate`](ServiceRegistry::populate) has run, the registry is frozen.
#[derive(Default)]
pub struct ServiceRegistry {
    services: BTreeMap<String, Arc<dyn RuntimeService>>,
    ready: bool,
}

impl ServiceRegistry {
    /// Creates a new, empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a service under its own name.
    ///
    /// # Panics
    ///
    /// Panics if the registry has already been populated.
    pub fn register(&mut self, service: Arc<dyn RuntimeService>) {
        assert!(
            !self.ready,
            "Cannot register services after the registry has been populated"
        );

        let name = service.name().to_string();
        if self.services.insert(name.clone(), service).is_some() {
            tracing::debug!(service = %name, "replaced runtime service");
        }
    }

    /// Returns the service registered under `name`.
    pub fn get(&self, name: &str) -> Option<Arc<dyn RuntimeService>> {
        self.services.get(name).cloned()
    }

    /// Returns the registered service names in sorted order.
    pub fn names(&self) -> Vec<&str> {
        self.services.keys().map(String::as_str).collect()
    }

    /// Returns the number of registered services.
    pub fn len(&self) -> usize {
        self.services.len()
    }

    /// Returns `true` if no service is registered.
    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }

    /// Calls `ready()` on each service in name order and freezes the registry.
    ///
    /// # Panics
    ///
    /// Panics if `populate` has already been called.
    pub fn populate(&mut self) {
        assert!(!self.ready, "ServiceRegistry has already been populated");

        for service in self.services.values() {
            service.ready();
        }

        self.ready = true;
    }

    /// Returns `true` if the registry has been populated.
    pub const fn is_ready(&self) -> bool {
        self.ready
    }
}

impl std::fmt::Debug for ServiceRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceRegistry")
            .field("services", &self.names())
            .field("ready", &self.ready)
            .finish()
    }
}
