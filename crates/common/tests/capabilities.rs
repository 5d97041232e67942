//! Integration tests for capability lookups through the namespace

mod common;

use ::common::capabilities::CapabilityClass;
use ::common::namespace::{Located, NamespaceError, Target};

#[test]
fn test_capability_objects_have_ids() {
    let ns = common::setup_namespace();
    let ids = ns.capability_ids();

    for class in CapabilityClass::ALL {
        let id = ids.get(class);
        assert_eq!(
            ns.locate(&Target::object_id(id)).unwrap(),
            Located::Capability(class)
        );
        assert_eq!(ns.capability(class).object_id, id);
    }
}

#[test]
fn test_capability_of_resource_follows_kind() {
    let ns = common::setup_namespace();
    common::mkdirs(&ns, &["/c"]);
    ns.put(&common::target("/c/o.txt"), common::object("x"))
        .unwrap();

    let doc = ns.capability_of(&common::target("/c")).unwrap();
    assert_eq!(doc.object_name, "container/");

    let doc = ns.capability_of(&common::target("/c/o.txt")).unwrap();
    assert_eq!(doc.object_name, "dataobject/");

    let missing = ns.capability_of(&common::target("/c/nope"));
    assert!(matches!(missing, Err(NamespaceError::NotFound(_))));
}

#[test]
fn test_capability_objects_are_read_only() {
    let ns = common::setup_namespace();
    let id = ns.capability_ids().container;

    let put = ns.put(&Target::object_id(id), common::container(&[]));
    assert!(matches!(put, Err(NamespaceError::ReadOnly(_))));

    let delete = ns.delete(&Target::object_id(id));
    assert!(matches!(delete, Err(NamespaceError::ReadOnly(_))));
}
