//! Active layer and selected entity, shared between the renderer, its click
//! handler and the details panel.

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::model::{LayerKind, MapEntity, Snapshot};

/// The currently shown layer and the selected entity id, if any.
///
/// The selected id is a loose reference: it may name an entity that is absent
/// from the latest snapshot or that lives on another layer. Switching layers
/// keeps the selection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionState {
    pub active_layer: LayerKind,
    pub selected: Option<String>,
}

impl SelectionState {
    pub fn new(active_layer: LayerKind) -> Self {
        Self {
            active_layer,
            selected: None,
        }
    }

    /// Resolve the selection against the active layer of `snapshot`.
    pub fn selected_entity<'a>(&self, snapshot: &'a Snapshot) -> Option<&'a dyn MapEntity> {
        let id = self.selected.as_deref()?;
        snapshot.layer(self.active_layer).find(id)
    }
}

/// Cheaply clonable handle to a [`SelectionState`].
#[derive(Debug, Clone, Default)]
pub struct SelectionHandle {
    inner: Arc<RwLock<SelectionState>>,
}

impl SelectionHandle {
    pub fn new(active_layer: LayerKind) -> Self {
        Self {
            inner: Arc::new(RwLock::new(SelectionState::new(active_layer))),
        }
    }

    // A panic while holding the lock cannot leave the two plain fields in an
    // inconsistent state, so poisoning is ignored.
    fn read(&self) -> RwLockReadGuard<'_, SelectionState> {
        self.inner.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, SelectionState> {
        self.inner.write().unwrap_or_else(|e| e.into_inner())
    }

    pub fn get(&self) -> SelectionState {
        self.read().clone()
    }

    pub fn active_layer(&self) -> LayerKind {
        self.read().active_layer
    }

    pub fn selected(&self) -> Option<String> {
        self.read().selected.clone()
    }

    pub fn set_layer(&self, layer: LayerKind) {
        self.write().active_layer = layer;
    }

    pub fn select(&self, id: Option<String>) {
        self.write().selected = id;
    }

    pub fn clear(&self) {
        self.select(None);
    }
}
