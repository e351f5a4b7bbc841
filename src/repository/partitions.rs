use std::collections::HashSet;

use serde::Serialize;

use crate::model::{Dream, DreamId};

/// Pending (pending/processing) and completed (completed/failed) dreams.
/// Every id lives in exactly one of the two lists.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct DreamPartitions {
    pub pending: Vec<Dream>,
    pub completed: Vec<Dream>,
}

impl DreamPartitions {
    pub fn from_dreams(dreams: impl IntoIterator<Item = Dream>) -> Self {
        let mut out = Self::default();
        for dream in dreams {
            out.upsert(dream);
        }
        out
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty() && self.completed.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pending.len() + self.completed.len()
    }

    pub fn get(&self, id: &DreamId) -> Option<&Dream> {
        self.pending
            .iter()
            .chain(self.completed.iter())
            .find(|d| &d.id == id)
    }

    pub fn contains(&self, id: &DreamId) -> bool {
        self.get(id).is_some()
    }

    /// Take `id` out of whichever partition holds it.
    pub(crate) fn remove(&mut self, id: &DreamId) -> Option<Dream> {
        if let Some(pos) = self.pending.iter().position(|d| &d.id == id) {
            return Some(self.pending.remove(pos));
        }
        if let Some(pos) = self.completed.iter().position(|d| &d.id == id) {
            return Some(self.completed.remove(pos));
        }
        None
    }

    fn insert(&mut self, dream: Dream) {
        if dream.status.is_pending() {
            self.pending.push(dream);
        } else {
            self.completed.push(dream);
        }
    }

    /// Remove-then-insert by status. A dream already in a terminal state
    /// keeps that state even if `incoming` claims otherwise. Returns the
    /// dream as stored.
    pub(crate) fn upsert(&mut self, incoming: Dream) -> Dream {
        let stored = match self.remove(&incoming.id) {
            Some(existing) if !existing.status.can_transition_to(incoming.status) => {
                tracing::warn!(
                    "ignoring {} -> {} for dream {}",
                    existing.status,
                    incoming.status,
                    existing.id
                );
                existing
            }
            _ => incoming,
        };
        self.insert(stored.clone());
        stored
    }

    /// Rebuild from an authoritative server listing. Local placeholders the
    /// server does not know about survive when `keep_local` is set.
    pub(crate) fn replace_with(&mut self, server: Vec<Dream>, keep_local: bool) {
        let mut previous = std::mem::take(self);
        let server_ids: HashSet<DreamId> = server.iter().map(|d| d.id.clone()).collect();

        for dream in server {
            match previous.remove(&dream.id) {
                Some(existing) if !existing.status.can_transition_to(dream.status) => {
                    self.upsert(existing);
                }
                _ => {
                    self.upsert(dream);
                }
            }
        }

        if keep_local {
            let locals = previous
                .pending
                .into_iter()
                .chain(previous.completed)
                .filter(|d| d.id.is_local() && !server_ids.contains(&d.id));
            for dream in locals {
                self.upsert(dream);
            }
        }
    }
}

#[cfg(test)]
#[path = "../tests/repository/partitions_tests.rs"]
mod tests;
