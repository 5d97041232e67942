use std::collections::{HashMap, HashSet};

use crate::capabilities::CapabilityClass;
use crate::object_id::{ObjectId, ObjectIdGenerator};

use super::path::CdmiPath;
use super::NamespaceError;

/// Where an object id currently points
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Locator {
    /// A container or data object at this path
    Node(CdmiPath),
    /// One of the built-in capability objects
    Capability(CapabilityClass),
}

/**
 * Object id index
 * ===============
 * Maps ids to locators. This is a lookup table, not an owner:
 *  the namespace tree owns the nodes, the index only says where
 *  to find them. Retired ids are kept so they are never issued
 *  again and always resolve to NotFound.
 */
#[derive(Debug)]
pub struct ObjectIdIndex {
    generator: ObjectIdGenerator,
    live: HashMap<ObjectId, Locator>,
    retired: HashSet<ObjectId>,
}

impl ObjectIdIndex {
    pub fn new(generator: ObjectIdGenerator) -> Self {
        Self {
            generator,
            live: HashMap::new(),
            retired: HashSet::new(),
        }
    }

    /// Issue a fresh id for `locator`
    pub fn register(&mut self, locator: Locator) -> ObjectId {
        let id = self.fresh_id();
        self.live.insert(id, locator);
        id
    }

    /// Issue a fresh id without registering it yet. The caller must
    ///  follow up with [`ObjectIdIndex::insert`] once the node is placed.
    pub fn fresh_id(&self) -> ObjectId {
        loop {
            let id = self.generator.generate();
            if !self.live.contains_key(&id) && !self.retired.contains(&id) {
                return id;
            }
            tracing::warn!(%id, "object id collision, generating another");
        }
    }

    pub fn insert(&mut self, id: ObjectId, locator: Locator) {
        self.live.insert(id, locator);
    }

    pub fn resolve(&self, id: &ObjectId) -> Result<&Locator, NamespaceError> {
        self.live
            .get(id)
            .ok_or(NamespaceError::ObjectIdNotFound(*id))
    }

    /// Point a live id at a new path
    pub fn relocate(&mut self, id: &ObjectId, path: CdmiPath) {
        if let Some(locator) = self.live.get_mut(id) {
            *locator = Locator::Node(path);
        }
    }

    /// Drop a live id for good
    pub fn retire(&mut self, id: &ObjectId) {
        if self.live.remove(id).is_some() {
            self.retired.insert(*id);
        }
    }

    #[cfg(test)]
    pub(crate) fn is_retired(&self, id: &ObjectId) -> bool {
        self.retired.contains(id)
    }

    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }
}
