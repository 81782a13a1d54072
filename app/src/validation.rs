use std::fmt;

use log::*;
use serde_json::Value;

use infra::ids::{Entity, Id};

use crate::error::ApiError;
use crate::payload::Payload;

type Check<P> = Box<dyn Fn(&P) -> Result<(), ApiError> + Send + Sync>;

/// An ordered list of checks. Running the chain stops at the first check
/// that fails, so the order of registration decides which error wins.
pub struct Chain<P> {
    name: &'static str,
    checks: Vec<Check<P>>,
}

impl<P> Chain<P> {
    pub fn new(name: &'static str) -> Self {
        let checks = Vec::new();
        Chain { name, checks }
    }

    pub fn check<F>(mut self, f: F) -> Self
    where
        F: Fn(&P) -> Result<(), ApiError> + Send + Sync + 'static,
    {
        self.checks.push(Box::new(f));
        self
    }

    /// Appends the checks of `other`, which run after ours.
    pub fn then(mut self, other: Chain<P>) -> Self {
        self.checks.extend(other.checks);
        self
    }

    pub fn len(&self) -> usize {
        self.checks.len()
    }

    pub fn run(&self, payload: &P) -> Result<(), ApiError> {
        for (i, check) in self.checks.iter().enumerate() {
            if let Err(e) = check(payload) {
                debug!("{}: check #{} rejected: {}", self.name, i, e);
                return Err(e);
            }
        }
        trace!("{}: all {} checks passed", self.name, self.checks.len());
        Ok(())
    }
}

impl<P> fmt::Debug for Chain<P> {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        fmt.debug_struct("Chain")
            .field("name", &self.name)
            .field("checks", &self.len())
            .finish()
    }
}

/// A payload may repeat the id of the record it is addressed to, but must
/// not name a different one. Ids are strings, so a number never matches.
pub fn ensure_id_matches<T: Entity>(route_id: &Id<T>, payload: &Payload) -> Result<(), ApiError> {
    match payload.id() {
        None => Ok(()),
        Some(Value::String(id)) if id == route_id.as_str() => Ok(()),
        Some(id) => {
            let shown = id.as_str().map(str::to_string).unwrap_or_else(|| id.to_string());
            Err(ApiError::conflict(format!(
                "{name} id does not match route id. {name}: {}, Route: {}",
                shown,
                route_id,
                name = T::NAME
            )))
        }
    }
}
