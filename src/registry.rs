use crate::errors::RegistryError;
use crate::models::{Attempt, Outcome, Routine};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Routines in the order they were added. Ids are unique.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Routine>", into = "Vec<Routine>")]
pub struct Registry {
    routines: Vec<Routine>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn routines(&self) -> &[Routine] {
        &self.routines
    }

    pub fn len(&self) -> usize {
        self.routines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routines.is_empty()
    }

    pub fn get(&self, id: Uuid) -> Option<&Routine> {
        self.routines.iter().find(|r| r.id == id)
    }

    pub fn contains(&self, id: Uuid) -> bool {
        self.get(id).is_some()
    }

    pub fn add_routine(&mut self, name: impl Into<String>, discipline: impl Into<String>) -> &Routine {
        let mut routine = Routine::new(name, discipline);
        while self.contains(routine.id) {
            routine.id = Uuid::new_v4();
        }
        self.routines.push(routine);
        &self.routines[self.routines.len() - 1]
    }

    pub fn insert(&mut self, routine: Routine) -> Result<(), RegistryError> {
        if self.contains(routine.id) {
            return Err(RegistryError::DuplicateId(routine.id));
        }
        self.routines.push(routine);
        Ok(())
    }

    /// Appends an attempt to the routine with `id`. Unknown ids are a no-op.
    pub fn append_attempt(&mut self, id: Uuid, attempt: Attempt) -> Option<&Attempt> {
        let routine = self.routines.iter_mut().find(|r| r.id == id)?;
        routine.add_attempt(attempt);
        routine.attempts.last()
    }

    pub fn log_attempt(&mut self, id: Uuid, outcome: Outcome, timestamp: DateTime<Utc>) -> Option<&Attempt> {
        self.append_attempt(id, Attempt::at(timestamp, outcome))
    }

    pub fn delete_routine(&mut self, id: Uuid) -> Option<Routine> {
        let index = self.routines.iter().position(|r| r.id == id)?;
        Some(self.routines.remove(index))
    }

    pub fn all_attempts(&self) -> impl Iterator<Item = &Attempt> {
        self.routines.iter().flat_map(|r| r.attempts.iter())
    }

    /// Routines keyed by discipline (alphabetical). Within a group the
    /// registry order is kept.
    pub fn by_discipline(&self) -> BTreeMap<&str, Vec<&Routine>> {
        let mut groups: BTreeMap<&str, Vec<&Routine>> = BTreeMap::new();
        for routine in &self.routines {
            groups.entry(routine.discipline.as_str()).or_default().push(routine);
        }
        groups
    }
}

impl TryFrom<Vec<Routine>> for Registry {
    type Error = RegistryError;

    fn try_from(routines: Vec<Routine>) -> Result<Self, Self::Error> {
        let mut registry = Registry::new();
        for routine in routines {
            registry.insert(routine)?;
        }
        Ok(registry)
    }
}

impl From<Registry> for Vec<Routine> {
    fn from(registry: Registry) -> Self {
        registry.routines
    }
}
