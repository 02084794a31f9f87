//! In-memory route store.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use tracing::info;

use crate::error::SourceError;
use crate::route::{PlannedRoute, RouteSnapshot};
use crate::traits::RouteSource;

/// Routes by name, snapshotted on insert.
///
/// Routes are authored before tracking starts; readers get a shared
/// [`RouteSnapshot`] and never see a route change underneath them.
#[derive(Debug, Default)]
pub struct InMemoryRouteStore {
    routes: RwLock<HashMap<String, Arc<RouteSnapshot>>>,
}

impl InMemoryRouteStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `route`, replacing any route with the same name.
    pub fn insert(&self, route: PlannedRoute) -> Arc<RouteSnapshot> {
        let snapshot = Arc::new(RouteSnapshot::new(route));
        info!(route = %snapshot.name(), points = snapshot.len(), "route stored");
        self.routes
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(snapshot.name().to_string(), Arc::clone(&snapshot));
        snapshot
    }

    /// Return the stored route, or author and store it with `build`.
    pub fn get_or_build<F, E>(&self, name: &str, build: F) -> Result<Arc<RouteSnapshot>, E>
    where
        F: FnOnce() -> Result<PlannedRoute, E>,
    {
        if let Ok(existing) = self.route(name) {
            return Ok(existing);
        }

        let snapshot = Arc::new(RouteSnapshot::new(build()?));
        let mut routes = self
            .routes
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        // another writer may have built the same route meanwhile
        let stored = routes
            .entry(name.to_string())
            .or_insert_with(|| snapshot)
            .clone();
        Ok(stored)
    }

    pub fn remove(&self, name: &str) -> Result<Arc<RouteSnapshot>, SourceError> {
        self.routes
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .remove(name)
            .ok_or_else(|| SourceError::RouteNotFound(name.to_string()))
    }
}

impl RouteSource for InMemoryRouteStore {
    fn route(&self, name: &str) -> Result<Arc<RouteSnapshot>, SourceError> {
        self.routes
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(name)
            .cloned()
            .ok_or_else(|| SourceError::RouteNotFound(name.to_string()))
    }

    fn route_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .routes
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .keys()
            .cloned()
            .collect();
        names.sort();
        names
    }
}
