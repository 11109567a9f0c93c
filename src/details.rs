//! Attribute rows for the details side panel.

use serde_json::Value;

use crate::model::{LayerKind, MapEntity, Snapshot};
use crate::selection::SelectionState;

#[derive(Debug, Clone, PartialEq)]
pub struct EntityDetails {
    pub id: String,
    pub name: String,
    pub status: String,
    pub layer: LayerKind,
    /// Remaining attributes in document order, rendered as text.
    pub rows: Vec<(String, String)>,
}

fn render_value(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        Value::Null => "—".to_string(),
        other => other.to_string(),
    }
}

pub fn describe(entity: &dyn MapEntity, layer: LayerKind) -> EntityDetails {
    let mut rows = Vec::with_capacity(entity.attributes().len() + 2);
    if let Some(kind) = entity.kind() {
        rows.push(("type".to_string(), kind.to_string()));
    }
    if let Some(load) = entity.load() {
        rows.push(("load".to_string(), format!("{:.0}%", load * 100.0)));
    }
    rows.extend(
        entity
            .attributes()
            .iter()
            .map(|(k, v)| (k.clone(), render_value(v))),
    );
    EntityDetails {
        id: entity.id().to_string(),
        name: entity.display_name().to_string(),
        status: entity.status().as_str().to_string(),
        layer,
        rows,
    }
}

/// Details of the selected entity on the active layer. `None` when nothing is
/// selected or the id is not present there.
pub fn selected_details(snapshot: &Snapshot, selection: &SelectionState) -> Option<EntityDetails> {
    selection
        .selected_entity(snapshot)
        .map(|entity| describe(entity, selection.active_layer))
}
