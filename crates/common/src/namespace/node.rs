use std::collections::BTreeMap;
use std::fmt;

use bytes::Bytes;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::object_id::ObjectId;

use super::path::CdmiPath;

/// User metadata. Keys are ordered so responses are stable.
pub type Metadata = BTreeMap<String, String>;

/// Mimetype given to data objects created without one
pub const DEFAULT_MIMETYPE: &str = "text/plain";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Container,
    DataObject,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKind::Container => f.write_str("container"),
            NodeKind::DataObject => f.write_str("data object"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Container {
        children: BTreeMap<String, ResourceNode>,
    },
    DataObject {
        mimetype: String,
        value: Bytes,
    },
}

/**
 * Resource nodes
 * ==============
 * A node is either a container or a data object. Containers own
 *  their children outright, so the tree has exactly one owner per
 *  node and a move is a detach followed by an attach.
 * A node does not know its own path: that is its position in the
 *  tree, mirrored in the object id index.
 */
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceNode {
    id: ObjectId,
    metadata: Metadata,
    created: DateTime<Utc>,
    modified: DateTime<Utc>,
    payload: Payload,
}

/// Changes carried by a create or update. `None` leaves the field alone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeUpdate {
    pub metadata: Option<Metadata>,
    pub mimetype: Option<String>,
    pub value: Option<Bytes>,
}

impl NodeUpdate {
    pub fn is_empty(&self) -> bool {
        self.metadata.is_none() && self.mimetype.is_none() && self.value.is_none()
    }
}

impl ResourceNode {
    pub fn container(id: ObjectId) -> Self {
        Self::with_payload(
            id,
            Payload::Container {
                children: BTreeMap::new(),
            },
        )
    }

    pub fn data_object(id: ObjectId, mimetype: impl Into<String>, value: Bytes) -> Self {
        Self::with_payload(
            id,
            Payload::DataObject {
                mimetype: mimetype.into(),
                value,
            },
        )
    }

    /// Build a new node of `kind` from a create request
    pub fn from_update(id: ObjectId, kind: NodeKind, update: NodeUpdate) -> Self {
        let mut node = match kind {
            NodeKind::Container => Self::container(id),
            NodeKind::DataObject => Self::data_object(
                id,
                update
                    .mimetype
                    .clone()
                    .unwrap_or_else(|| DEFAULT_MIMETYPE.to_string()),
                update.value.clone().unwrap_or_default(),
            ),
        };
        if let Some(metadata) = update.metadata {
            node.metadata = metadata;
        }
        node
    }

    fn with_payload(id: ObjectId, payload: Payload) -> Self {
        let now = Utc::now();
        Self {
            id,
            metadata: Metadata::new(),
            created: now,
            modified: now,
            payload,
        }
    }

    pub fn id(&self) -> ObjectId {
        self.id
    }

    pub fn kind(&self) -> NodeKind {
        match self.payload {
            Payload::Container { .. } => NodeKind::Container,
            Payload::DataObject { .. } => NodeKind::DataObject,
        }
    }

    pub fn is_container(&self) -> bool {
        self.kind() == NodeKind::Container
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn created(&self) -> DateTime<Utc> {
        self.created
    }

    pub fn modified(&self) -> DateTime<Utc> {
        self.modified
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    pub fn mimetype(&self) -> Option<&str> {
        match &self.payload {
            Payload::DataObject { mimetype, .. } => Some(mimetype),
            Payload::Container { .. } => None,
        }
    }

    pub fn value(&self) -> Option<&Bytes> {
        match &self.payload {
            Payload::DataObject { value, .. } => Some(value),
            Payload::Container { .. } => None,
        }
    }

    pub fn children(&self) -> Option<&BTreeMap<String, ResourceNode>> {
        match &self.payload {
            Payload::Container { children } => Some(children),
            Payload::DataObject { .. } => None,
        }
    }

    pub fn has_children(&self) -> bool {
        self.children().is_some_and(|children| !children.is_empty())
    }

    pub fn child(&self, name: &str) -> Option<&ResourceNode> {
        self.children()?.get(name)
    }

    pub fn child_mut(&mut self, name: &str) -> Option<&mut ResourceNode> {
        match &mut self.payload {
            Payload::Container { children } => children.get_mut(name),
            Payload::DataObject { .. } => None,
        }
    }

    /// Attach `node` under `name`. Returns the node back if this is
    ///  not a container or the name is taken.
    pub fn insert_child(&mut self, name: &str, node: ResourceNode) -> Result<(), ResourceNode> {
        match &mut self.payload {
            Payload::Container { children } if !children.contains_key(name) => {
                children.insert(name.to_string(), node);
                self.modified = Utc::now();
                Ok(())
            }
            _ => Err(node),
        }
    }

    pub fn remove_child(&mut self, name: &str) -> Option<ResourceNode> {
        let removed = match &mut self.payload {
            Payload::Container { children } => children.remove(name),
            Payload::DataObject { .. } => None,
        }?;
        self.modified = Utc::now();
        Some(removed)
    }

    /// Apply an update in place: metadata merges key by key,
    ///  mimetype and value replace. Containers ignore value fields.
    pub fn apply(&mut self, update: NodeUpdate) {
        if let Some(delta) = update.metadata {
            self.metadata.extend(delta);
        }
        if let Payload::DataObject { mimetype, value } = &mut self.payload {
            if let Some(new_mimetype) = update.mimetype {
                *mimetype = new_mimetype;
            }
            if let Some(new_value) = update.value {
                *value = new_value;
            }
        }
        self.modified = Utc::now();
    }

    /// Visit this node and every descendant with its path, parents first
    pub fn walk<F>(&self, path: &CdmiPath, visit: &mut F)
    where
        F: FnMut(&CdmiPath, &ResourceNode),
    {
        visit(path, self);
        if let Some(children) = self.children() {
            for (name, child) in children {
                child.walk(&path.join(name), visit);
            }
        }
    }

    /// Number of nodes in this subtree, including this one
    #[cfg(test)]
    pub(crate) fn subtree_len(&self) -> usize {
        let mut count = 0;
        self.walk(&CdmiPath::root(), &mut |_, _| count += 1);
        count
    }

    /// Children names as CDMI lists them: containers end with `/`
    pub fn child_names(&self) -> Vec<String> {
        self.children()
            .map(|children| {
                children
                    .iter()
                    .map(|(name, child)| {
                        if child.is_container() {
                            format!("{}/", name)
                        } else {
                            name.clone()
                        }
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// User metadata merged with the `cdmi_*` system metadata
    pub fn metadata_with_defaults(&self) -> Metadata {
        let mut metadata = self.metadata.clone();
        metadata.insert("cdmi_ctime".to_string(), format_time(self.created));
        metadata.insert("cdmi_mtime".to_string(), format_time(self.modified));
        if let Some(value) = self.value() {
            metadata.insert("cdmi_size".to_string(), value.len().to_string());
        }
        metadata
    }
}

fn format_time(time: DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Point in time copy of a node, handed out to callers outside the lock
#[derive(Debug, Clone, PartialEq)]
pub struct NodeView {
    pub id: ObjectId,
    pub path: CdmiPath,
    pub kind: NodeKind,
    pub parent_id: Option<ObjectId>,
    pub metadata: Metadata,
    pub mimetype: Option<String>,
    pub value: Option<Bytes>,
    pub children: Vec<String>,
}

impl NodeView {
    pub fn new(node: &ResourceNode, path: CdmiPath, parent_id: Option<ObjectId>) -> Self {
        Self {
            id: node.id(),
            path,
            kind: node.kind(),
            parent_id,
            metadata: node.metadata_with_defaults(),
            mimetype: node.mimetype().map(str::to_string),
            value: node.value().cloned(),
            children: node.child_names(),
        }
    }

    pub fn is_container(&self) -> bool {
        self.kind == NodeKind::Container
    }

    /// Leaf name as CDMI reports it, `/` for the root
    pub fn object_name(&self) -> String {
        match self.path.name() {
            Some(name) if self.is_container() => format!("{}/", name),
            Some(name) => name.to_string(),
            None => "/".to_string(),
        }
    }

    /// Parent container URI, `None` for the root
    pub fn parent_uri(&self) -> Option<String> {
        self.path.parent().map(|parent| parent.to_uri(true))
    }
}
