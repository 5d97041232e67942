//! Capability objects
//!
//! Three read-only documents describe what the server supports: the
//! system-wide root at `/cdmi_capabilities/` and one per resource kind
//! below it. Each one has its own object id, registered in the namespace
//! index when the namespace is created.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::cdmi::{index_range, CDMI_CAPABILITY};
use crate::namespace::NodeKind;
use crate::object_id::ObjectId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CapabilityClass {
    System,
    Container,
    DataObject,
}

// Capabilities advertised on the root document
const SYSTEM_CAPABILITIES: &[(&str, &str)] = &[
    ("cdmi_domains", "false"),
    ("cdmi_export_cifs", "false"),
    ("cdmi_export_nfs", "false"),
    ("cdmi_queues", "false"),
    ("cdmi_notification", "false"),
    ("cdmi_query", "false"),
    ("cdmi_dataobjects", "true"),
    ("cdmi_metadata_maxitems", "1024"),
    ("cdmi_metadata_maxsize", "4096"),
    ("cdmi_object_access_by_ID", "true"),
    ("cdmi_object_move_from_ID", "true"),
    ("cdmi_object_move_from_local", "true"),
    ("cdmi_object_copy_from_local", "false"),
    ("cdmi_security_https_transport", "true"),
    ("cdmi_security_access_control", "false"),
];

const CONTAINER_CAPABILITIES: &[(&str, &str)] = &[
    ("cdmi_read_metadata", "true"),
    ("cdmi_modify_metadata", "true"),
    ("cdmi_list_children", "true"),
    ("cdmi_list_children_range", "false"),
    ("cdmi_create_container", "true"),
    ("cdmi_delete_container", "true"),
    ("cdmi_move_container", "true"),
    ("cdmi_create_dataobject", "true"),
    ("cdmi_move_dataobject", "true"),
    ("cdmi_size", "true"),
    ("cdmi_ctime", "true"),
    ("cdmi_mtime", "true"),
];

const DATA_OBJECT_CAPABILITIES: &[(&str, &str)] = &[
    ("cdmi_read_metadata", "true"),
    ("cdmi_modify_metadata", "true"),
    ("cdmi_read_value", "true"),
    ("cdmi_read_value_range", "false"),
    ("cdmi_modify_value", "true"),
    ("cdmi_modify_value_range", "false"),
    ("cdmi_delete_dataobject", "true"),
    ("cdmi_move_dataobject", "true"),
    ("cdmi_size", "true"),
    ("cdmi_ctime", "true"),
    ("cdmi_mtime", "true"),
];

impl CapabilityClass {
    pub const ALL: [CapabilityClass; 3] = [
        CapabilityClass::System,
        CapabilityClass::Container,
        CapabilityClass::DataObject,
    ];

    pub fn for_kind(kind: NodeKind) -> Self {
        match kind {
            NodeKind::Container => CapabilityClass::Container,
            NodeKind::DataObject => CapabilityClass::DataObject,
        }
    }

    /// Look up a capability object from the segments following
    ///  `cdmi_capabilities` in a request path
    pub fn from_segments<S: AsRef<str>>(segments: &[S]) -> Option<Self> {
        match segments {
            [] => Some(CapabilityClass::System),
            [name] if name.as_ref() == "container" => Some(CapabilityClass::Container),
            [name] if name.as_ref() == "dataobject" => Some(CapabilityClass::DataObject),
            _ => None,
        }
    }

    pub fn uri(&self) -> &'static str {
        match self {
            CapabilityClass::System => "/cdmi_capabilities/",
            CapabilityClass::Container => "/cdmi_capabilities/container/",
            CapabilityClass::DataObject => "/cdmi_capabilities/dataobject/",
        }
    }

    pub fn object_name(&self) -> &'static str {
        match self {
            CapabilityClass::System => "cdmi_capabilities/",
            CapabilityClass::Container => "container/",
            CapabilityClass::DataObject => "dataobject/",
        }
    }

    pub fn parent(&self) -> Option<CapabilityClass> {
        match self {
            CapabilityClass::System => None,
            _ => Some(CapabilityClass::System),
        }
    }

    pub fn children(&self) -> Vec<String> {
        match self {
            CapabilityClass::System => vec!["container/".to_string(), "dataobject/".to_string()],
            _ => Vec::new(),
        }
    }

    fn entries(&self) -> &'static [(&'static str, &'static str)] {
        match self {
            CapabilityClass::System => SYSTEM_CAPABILITIES,
            CapabilityClass::Container => CONTAINER_CAPABILITIES,
            CapabilityClass::DataObject => DATA_OBJECT_CAPABILITIES,
        }
    }
}

impl fmt::Display for CapabilityClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.uri())
    }
}

/// Object ids of the three capability objects
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapabilityIds {
    pub system: ObjectId,
    pub container: ObjectId,
    pub data_object: ObjectId,
}

impl CapabilityIds {
    pub fn get(&self, class: CapabilityClass) -> ObjectId {
        match class {
            CapabilityClass::System => self.system,
            CapabilityClass::Container => self.container,
            CapabilityClass::DataObject => self.data_object,
        }
    }
}

/// CDMI JSON body of a capability object
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CapabilityDocument {
    #[serde(rename = "objectType")]
    pub object_type: &'static str,
    #[serde(rename = "objectID")]
    pub object_id: ObjectId,
    #[serde(rename = "objectName")]
    pub object_name: &'static str,
    #[serde(rename = "parentURI", skip_serializing_if = "Option::is_none")]
    pub parent_uri: Option<&'static str>,
    #[serde(rename = "parentID", skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<ObjectId>,
    pub capabilities: BTreeMap<String, String>,
    pub childrenrange: String,
    pub children: Vec<String>,
}

impl CapabilityDocument {
    pub fn new(class: CapabilityClass, ids: &CapabilityIds) -> Self {
        let parent = class.parent();
        let children = class.children();
        Self {
            object_type: CDMI_CAPABILITY,
            object_id: ids.get(class),
            object_name: class.object_name(),
            parent_uri: parent.map(|p| p.uri()),
            parent_id: parent.map(|p| ids.get(p)),
            capabilities: class
                .entries()
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            childrenrange: index_range(children.len()),
            children,
        }
    }
}
