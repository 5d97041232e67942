use serde::{Deserialize, Serialize};

use crate::object_id::{ObjectId, ObjectIdError, DEFAULT_ENTERPRISE_NUMBER};

mod mv;
mod node;
mod path;
mod registry;
mod store;

pub use node::{Metadata, NodeKind, NodeUpdate, NodeView, Payload, ResourceNode, DEFAULT_MIMETYPE};
pub use path::{
    node_at_mut, resolve, CdmiPath, Resolution, Target, CAPABILITIES_SEGMENT, OBJECT_ID_SEGMENT,
};
pub use registry::{Locator, ObjectIdIndex};
pub use store::{Located, Namespace, Outcome, PutOutcome, PutRequest};

#[derive(Debug, thiserror::Error)]
pub enum NamespaceError {
    #[error("path not found: {0}")]
    NotFound(String),
    #[error("object id not found: {0}")]
    ObjectIdNotFound(ObjectId),
    #[error("destination parent container does not exist: {0}")]
    ParentNotFound(CdmiPath),
    #[error("path already exists: {0}")]
    AlreadyExists(CdmiPath),
    #[error("{path} is a {actual}, not a {expected}")]
    KindMismatch {
        path: CdmiPath,
        expected: NodeKind,
        actual: NodeKind,
    },
    #[error("cannot move '{from}' to '{to}': destination is inside source")]
    MoveIntoSelf { from: CdmiPath, to: CdmiPath },
    #[error("the root container cannot be moved or deleted")]
    RootImmutable,
    #[error("container is not empty: {0}")]
    ContainerNotEmpty(CdmiPath),
    #[error("invalid path: {0}")]
    InvalidPath(String),
    #[error("invalid object id: {0}")]
    InvalidObjectId(#[from] ObjectIdError),
    #[error("{0} is read-only")]
    ReadOnly(String),
}

/// Coarse error families, used by the HTTP layer to pick a status code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    NotFound,
    Conflict,
    InvalidRequest,
}

impl NamespaceError {
    pub fn class(&self) -> ErrorClass {
        match self {
            NamespaceError::NotFound(_) | NamespaceError::ObjectIdNotFound(_) => {
                ErrorClass::NotFound
            }
            NamespaceError::ParentNotFound(_)
            | NamespaceError::AlreadyExists(_)
            | NamespaceError::KindMismatch { .. }
            | NamespaceError::ContainerNotEmpty(_) => ErrorClass::Conflict,
            NamespaceError::MoveIntoSelf { .. }
            | NamespaceError::RootImmutable
            | NamespaceError::InvalidPath(_)
            | NamespaceError::InvalidObjectId(_)
            | NamespaceError::ReadOnly(_) => ErrorClass::InvalidRequest,
        }
    }
}

/// What happens to a DELETE on a container that still has children
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeletePolicy {
    /// Refuse with a conflict
    #[default]
    Reject,
    /// Remove the whole subtree and retire every id in it
    Recursive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NamespaceConfig {
    pub enterprise_number: u32,
    pub delete_policy: DeletePolicy,
}

impl Default for NamespaceConfig {
    fn default() -> Self {
        Self {
            enterprise_number: DEFAULT_ENTERPRISE_NUMBER,
            delete_policy: DeletePolicy::default(),
        }
    }
}
