use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::de::{DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

// ────────────────────────────────────────────────────────────────────────────
// Layer kind
// ────────────────────────────────────────────────────────────────────────────

/// One of the four fixed views over the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerKind {
    #[default]
    City,
    Space,
    Nodes,
    Agents,
}

impl LayerKind {
    pub const ALL: [LayerKind; 4] = [
        LayerKind::City,
        LayerKind::Space,
        LayerKind::Nodes,
        LayerKind::Agents,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            LayerKind::City => "city",
            LayerKind::Space => "space",
            LayerKind::Nodes => "nodes",
            LayerKind::Agents => "agents",
        }
    }

    /// Human readable title used by the layer selector.
    pub fn title(self) -> &'static str {
        match self {
            LayerKind::City => "City",
            LayerKind::Space => "Space",
            LayerKind::Nodes => "Nodes",
            LayerKind::Agents => "Agents",
        }
    }
}

impl std::fmt::Display for LayerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for LayerKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "city" => Ok(LayerKind::City),
            "space" => Ok(LayerKind::Space),
            "nodes" => Ok(LayerKind::Nodes),
            "agents" => Ok(LayerKind::Agents),
            other => Err(format!(
                "unknown layer '{other}' (expected city, space, nodes or agents)"
            )),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Entity status
// ────────────────────────────────────────────────────────────────────────────

/// Coarse health of an entity. The service uses a handful of synonyms for each
/// state; anything unrecognised maps to [`EntityStatus::Unknown`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EntityStatus {
    Online,
    Degraded,
    Offline,
    #[default]
    Unknown,
}

impl EntityStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            EntityStatus::Online => "online",
            EntityStatus::Degraded => "degraded",
            EntityStatus::Offline => "offline",
            EntityStatus::Unknown => "unknown",
        }
    }
}

impl std::str::FromStr for EntityStatus {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "online" | "active" | "healthy" | "ok" | "up" | "running" => Self::Online,
            "degraded" | "warning" | "warn" | "busy" | "idle" | "pending" => Self::Degraded,
            "offline" | "down" | "error" | "failed" | "critical" | "stopped" => Self::Offline,
            _ => Self::Unknown,
        })
    }
}

impl Serialize for EntityStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for EntityStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<Value>::deserialize(deserializer)?;
        Ok(raw
            .as_ref()
            .and_then(Value::as_str)
            .and_then(|s| s.parse().ok())
            .unwrap_or_default())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Entities
// ────────────────────────────────────────────────────────────────────────────

/// Common read access to anything placed on the map.
pub trait MapEntity {
    fn id(&self) -> &str;
    fn name(&self) -> &str;
    fn status(&self) -> EntityStatus;
    /// Every field of the source document not modelled explicitly.
    fn attributes(&self) -> &IndexMap<String, Value>;

    fn kind(&self) -> Option<&str> {
        None
    }

    fn load(&self) -> Option<f32> {
        None
    }

    /// The name, falling back to the id for unnamed entities.
    fn display_name(&self) -> &str {
        let name = self.name();
        if name.trim().is_empty() { self.id() } else { name }
    }
}

/// A plain entity: city districts, agents and orbital satellites.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    #[serde(deserialize_with = "de_id")]
    pub id: String,
    #[serde(default, deserialize_with = "de_string")]
    pub name: String,
    #[serde(default)]
    pub status: EntityStatus,
    /// Optional classification (`type` on the wire).
    #[serde(
        default,
        rename = "type",
        alias = "kind",
        deserialize_with = "de_opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub kind: Option<String>,
    #[serde(flatten)]
    pub attributes: IndexMap<String, Value>,
}

impl Entity {
    pub fn new(id: impl Into<String>, name: impl Into<String>, status: EntityStatus) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            status,
            kind: None,
            attributes: IndexMap::new(),
        }
    }
}

/// A compute node carrying a load metric in `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComputeNode {
    #[serde(deserialize_with = "de_id")]
    pub id: String,
    #[serde(default, deserialize_with = "de_string")]
    pub name: String,
    #[serde(default)]
    pub status: EntityStatus,
    #[serde(default, alias = "cpu", deserialize_with = "de_load")]
    pub load: f32,
    #[serde(flatten)]
    pub attributes: IndexMap<String, Value>,
}

impl ComputeNode {
    pub fn new(id: impl Into<String>, status: EntityStatus, load: f32) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            status,
            load,
            attributes: IndexMap::new(),
        }
    }
}

/// A primary body of the orbital layer with the ids of its satellites.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Planet {
    #[serde(deserialize_with = "de_id")]
    pub id: String,
    #[serde(default, deserialize_with = "de_string")]
    pub name: String,
    #[serde(default)]
    pub status: EntityStatus,
    #[serde(
        default,
        rename = "type",
        alias = "kind",
        deserialize_with = "de_opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub kind: Option<String>,
    #[serde(default, deserialize_with = "de_id_list")]
    pub satellites: Vec<String>,
    #[serde(flatten)]
    pub attributes: IndexMap<String, Value>,
}

impl Planet {
    pub fn new(id: impl Into<String>, satellites: &[&str]) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            status: EntityStatus::Online,
            kind: None,
            satellites: satellites.iter().map(|s| s.to_string()).collect(),
            attributes: IndexMap::new(),
        }
    }
}

impl MapEntity for Entity {
    fn id(&self) -> &str {
        &self.id
    }
    fn name(&self) -> &str {
        &self.name
    }
    fn status(&self) -> EntityStatus {
        self.status
    }
    fn attributes(&self) -> &IndexMap<String, Value> {
        &self.attributes
    }
    fn kind(&self) -> Option<&str> {
        self.kind.as_deref()
    }
}

impl MapEntity for ComputeNode {
    fn id(&self) -> &str {
        &self.id
    }
    fn name(&self) -> &str {
        &self.name
    }
    fn status(&self) -> EntityStatus {
        self.status
    }
    fn attributes(&self) -> &IndexMap<String, Value> {
        &self.attributes
    }
    fn load(&self) -> Option<f32> {
        Some(self.load)
    }
}

impl MapEntity for Planet {
    fn id(&self) -> &str {
        &self.id
    }
    fn name(&self) -> &str {
        &self.name
    }
    fn status(&self) -> EntityStatus {
        self.status
    }
    fn attributes(&self) -> &IndexMap<String, Value> {
        &self.attributes
    }
    fn kind(&self) -> Option<&str> {
        self.kind.as_deref()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Layers
// ────────────────────────────────────────────────────────────────────────────

/// Organisational sub-units, laid out on a grid.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CityLayer {
    #[serde(default, deserialize_with = "lenient_vec")]
    pub items: Vec<Entity>,
}

/// Planets on a ring with their satellites on secondary rings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpaceLayer {
    #[serde(default, deserialize_with = "lenient_vec")]
    pub planets: Vec<Planet>,
    #[serde(default, alias = "nodes", deserialize_with = "lenient_vec")]
    pub satellites: Vec<Entity>,
}

/// Compute nodes, laid out on a grid scaled by load.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodesLayer {
    #[serde(default, deserialize_with = "lenient_vec")]
    pub items: Vec<ComputeNode>,
}

/// Software agents, laid out on a spiral.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentsLayer {
    #[serde(default, deserialize_with = "lenient_vec")]
    pub items: Vec<Entity>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Layers {
    #[serde(default)]
    pub city: CityLayer,
    #[serde(default)]
    pub space: SpaceLayer,
    #[serde(default)]
    pub nodes: NodesLayer,
    #[serde(default)]
    pub agents: AgentsLayer,
}

/// Borrowed, tagged view of one layer's payload.
#[derive(Debug, Clone, Copy)]
pub enum LayerPayload<'a> {
    City(&'a CityLayer),
    Space(&'a SpaceLayer),
    Nodes(&'a NodesLayer),
    Agents(&'a AgentsLayer),
}

impl<'a> LayerPayload<'a> {
    pub fn kind(&self) -> LayerKind {
        match self {
            LayerPayload::City(_) => LayerKind::City,
            LayerPayload::Space(_) => LayerKind::Space,
            LayerPayload::Nodes(_) => LayerKind::Nodes,
            LayerPayload::Agents(_) => LayerKind::Agents,
        }
    }

    /// All entities of the layer. Space lists planets before satellites.
    pub fn entities(&self) -> Vec<&'a dyn MapEntity> {
        match *self {
            LayerPayload::City(l) => l.items.iter().map(|e| e as &dyn MapEntity).collect(),
            LayerPayload::Space(l) => l
                .planets
                .iter()
                .map(|p| p as &dyn MapEntity)
                .chain(l.satellites.iter().map(|s| s as &dyn MapEntity))
                .collect(),
            LayerPayload::Nodes(l) => l.items.iter().map(|n| n as &dyn MapEntity).collect(),
            LayerPayload::Agents(l) => l.items.iter().map(|e| e as &dyn MapEntity).collect(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            LayerPayload::City(l) => l.items.len(),
            LayerPayload::Space(l) => l.planets.len() + l.satellites.len(),
            LayerPayload::Nodes(l) => l.items.len(),
            LayerPayload::Agents(l) => l.items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Find an entity by id within this layer only.
    pub fn find(&self, id: &str) -> Option<&'a dyn MapEntity> {
        self.entities().into_iter().find(|e| e.id() == id)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Snapshot
// ────────────────────────────────────────────────────────────────────────────

/// Provenance of a snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SnapshotMeta {
    /// Services that contributed to this snapshot.
    #[serde(default, deserialize_with = "de_id_list")]
    pub sources: Vec<String>,
    #[serde(
        default,
        alias = "schemaVersion",
        alias = "version",
        deserialize_with = "de_opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub schema_version: Option<String>,
}

/// Point-in-time state of all four layers. Never mutated once published; a
/// newer snapshot replaces it wholesale.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(
        default,
        alias = "generatedAt",
        deserialize_with = "de_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub generated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub layers: Layers,
    #[serde(default)]
    pub meta: SnapshotMeta,
}

impl Snapshot {
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }

    pub fn layer(&self, kind: LayerKind) -> LayerPayload<'_> {
        match kind {
            LayerKind::City => LayerPayload::City(&self.layers.city),
            LayerKind::Space => LayerPayload::Space(&self.layers.space),
            LayerKind::Nodes => LayerPayload::Nodes(&self.layers.nodes),
            LayerKind::Agents => LayerPayload::Agents(&self.layers.agents),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Stream messages
// ────────────────────────────────────────────────────────────────────────────

/// A message pushed over the streaming endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum StreamMessage {
    /// Full replacement of the held snapshot.
    Snapshot { data: Box<Snapshot> },
    /// Incremental notification. Informational only; it is not merged.
    Event {
        #[serde(default)]
        event_type: String,
        #[serde(flatten)]
        payload: IndexMap<String, Value>,
    },
}

impl StreamMessage {
    pub fn parse(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Lenient decoding helpers
// ────────────────────────────────────────────────────────────────────────────

fn value_to_string(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn de_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let v = Value::deserialize(deserializer)?;
    value_to_string(&v).ok_or_else(|| serde::de::Error::custom("id must be a string or number"))
}

fn de_id_list<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    let v = Option::<Value>::deserialize(deserializer)?;
    Ok(match v {
        Some(Value::Array(items)) => items.iter().filter_map(value_to_string).collect(),
        _ => Vec::new(),
    })
}

fn de_opt_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    let v = Option::<Value>::deserialize(deserializer)?;
    Ok(v.as_ref().and_then(value_to_string))
}

/// Strings and numbers as text; `null` and other shapes become empty.
fn de_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(de_opt_string(deserializer)?.unwrap_or_default())
}

fn de_load<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f32, D::Error> {
    let v = Option::<Value>::deserialize(deserializer)?;
    let load = v.as_ref().and_then(Value::as_f64).unwrap_or(0.0) as f32;
    Ok(if load.is_finite() { load } else { 0.0 })
}

fn de_timestamp<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<DateTime<Utc>>, D::Error> {
    let v = Option::<Value>::deserialize(deserializer)?;
    Ok(v.as_ref()
        .and_then(Value::as_str)
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|t| t.with_timezone(&Utc)))
}

/// Decode a list, dropping (and logging) items that fail to decode instead of
/// failing the whole document.
fn lenient_vec<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let v = Option::<Value>::deserialize(deserializer)?;
    let items = match v {
        Some(Value::Array(items)) => items,
        Some(Value::Null) | None => return Ok(Vec::new()),
        Some(other) => {
            tracing::debug!(found = %other, "expected an entity list; treating as empty");
            return Ok(Vec::new());
        }
    };
    Ok(items
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| match serde_json::from_value(item) {
            Ok(entity) => Some(entity),
            Err(error) => {
                tracing::debug!(index, %error, "skipping malformed entity");
                None
            }
        })
        .collect())
}
