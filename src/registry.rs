// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Obsolescence Simulation Suite - Failure Registry

use crate::types::{Failure, FailureId, FailureType};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors from registry insertion.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// The id is already present. Ids are generated to be unique, so this
    /// indicates a caller bug.
    #[error("duplicate failure id: {id}")]
    DuplicateId { id: FailureId },
}

// ---------------------------------------------------------------------------
// FailureRegistry
// ---------------------------------------------------------------------------

/// Active failures in detection order. Entries never expire on their own.
#[derive(Debug, Clone, Default)]
pub struct FailureRegistry {
    failures: Vec<Failure>,
    total_inserted: u32,
}

impl FailureRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a failure.
    ///
    /// # Errors
    ///
    /// [`RegistryError::DuplicateId`] if a failure with the same id exists.
    pub fn add(&mut self, failure: Failure) -> Result<(), RegistryError> {
        if self.contains(&failure.id) {
            return Err(RegistryError::DuplicateId { id: failure.id });
        }
        self.failures.push(failure);
        self.total_inserted += 1;
        Ok(())
    }

    /// Remove by id. Returns the removed failure; absent ids are a no-op.
    pub fn remove(&mut self, id: &FailureId) -> Option<Failure> {
        let pos = self.failures.iter().position(|f| &f.id == id)?;
        Some(self.failures.remove(pos))
    }

    pub fn contains(&self, id: &FailureId) -> bool {
        self.failures.iter().any(|f| &f.id == id)
    }

    /// Lazy view of failures matching any of `types`.
    pub fn query_by_type<'a>(
        &'a self,
        types: &'a [FailureType],
    ) -> impl Iterator<Item = &'a Failure> + 'a {
        self.failures
            .iter()
            .filter(move |f| types.contains(&f.failure_type))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Failure> {
        self.failures.iter()
    }

    pub fn as_slice(&self) -> &[Failure] {
        &self.failures
    }

    pub fn len(&self) -> usize {
        self.failures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }

    /// Failures ever inserted; removal does not decrement.
    pub fn total_inserted(&self) -> u32 {
        self.total_inserted
    }
}
