use crate::model::{Label, Target, TargetId};
use dashmap::DashMap;
use std::sync::{Arc, Mutex};
use thiserror::*;
use tracing::*;

/// The outcome of registering a target.
///
#[derive(Debug)]
pub enum Registration {
    Registered(TargetId),
    Duplicate {
        id: TargetId,
        existing: Arc<Target>,
    },
}

/// The Target Registry keeps track of every target declared across a workspace's buildfiles,
/// interning their labels so that the rest of the system can pass around cheap `TargetId` handles.
///
#[derive(Default, Debug, Clone)]
pub struct TargetRegistry {
    ids: DashMap<Arc<Label>, TargetId>,
    labels: DashMap<TargetId, Arc<Label>>,
    targets: DashMap<TargetId, Arc<Target>>,

    // NOTE: only used to serialize the calls to `register_target` and prevent registering
    // the same label under two different ids.
    _register_lock: Arc<Mutex<()>>,
}

impl TargetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern a target. The first declaration of a label wins; a second declaration of the same
    /// label is reported as a `Registration::Duplicate` carrying the surviving target.
    ///
    #[tracing::instrument(name = "TargetRegistry::register", skip(self))]
    pub fn register_target(&self, target: Target) -> Registration {
        let _lock = self._register_lock.lock().unwrap();

        let label = Arc::new(target.label().clone());
        if let Some(id) = self.ids.get(&label).map(|r| *r.value()) {
            let existing = (*self.targets.get(&id).unwrap()).clone();
            return Registration::Duplicate { id, existing };
        }

        let id = TargetId::next();
        self.ids.insert(label.clone(), id);
        self.labels.insert(id, label);
        self.targets.insert(id, Arc::new(target));
        Registration::Registered(id)
    }

    /// Find the id of a label that has already been registered.
    ///
    #[tracing::instrument(name = "TargetRegistry::find", skip(self))]
    pub fn find_label(&self, label: &Label) -> Option<TargetId> {
        self.ids.get(label).map(|r| *r.value())
    }

    /// Get the label behind a handle. Only call this with handles this registry returned.
    ///
    #[tracing::instrument(name = "TargetRegistry::get_label", skip(self))]
    pub fn get_label(&self, id: TargetId) -> Arc<Label> {
        (*self.labels.get(&id).unwrap()).clone()
    }

    /// Get the target behind a handle. Only call this with handles this registry returned.
    ///
    #[tracing::instrument(name = "TargetRegistry::get_target", skip(self))]
    pub fn get_target(&self, id: TargetId) -> Arc<Target> {
        (*self.targets.get(&id).unwrap()).clone()
    }

    /// Every registered id, ordered by label so that consumers iterate deterministically.
    ///
    pub fn target_ids(&self) -> Vec<TargetId> {
        let mut entries: Vec<(Arc<Label>, TargetId)> = self
            .labels
            .iter()
            .map(|e| (e.value().clone(), *e.key()))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries.into_iter().map(|(_, id)| id).collect()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Error, Debug)]
pub enum TargetRegistryError {}
