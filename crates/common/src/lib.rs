/**
 * Read-only capability documents and the
 *  classes of object they describe.
 */
pub mod capabilities;
/**
 * CDMI wire schema: content types, the
 *  specification version header and typed
 *  request/response bodies.
 */
pub mod cdmi;
/**
 * The resource model: a tree of containers
 *  and data objects, the object id index,
 *  path resolution and the move engine.
 */
pub mod namespace;
/**
 * CDMI object identifiers and the generator
 *  that issues them.
 */
pub mod object_id;
/**
 * Helper for setting build version information
 *  at compile time.
 */
pub mod version;

pub mod prelude {
    pub use crate::capabilities::{CapabilityClass, CapabilityDocument};
    pub use crate::cdmi::{CdmiContentType, CdmiObject, ContainerRequest, DataObjectRequest};
    pub use crate::namespace::{
        CdmiPath, DeletePolicy, Namespace, NamespaceConfig, NamespaceError, NodeKind, Outcome,
        Target,
    };
    pub use crate::object_id::ObjectId;
    pub use crate::version::build_info;
}
