use std::sync::Arc;

use parking_lot::RwLock;

use crate::capabilities::{CapabilityClass, CapabilityDocument, CapabilityIds};
use crate::object_id::{ObjectId, ObjectIdGenerator};

use super::mv::MoveEngine;
use super::node::{NodeKind, NodeUpdate, NodeView, ResourceNode};
use super::path::{node_at_mut, resolve, CdmiPath, Resolution, Target};
use super::registry::{Locator, ObjectIdIndex};
use super::{DeletePolicy, NamespaceConfig, NamespaceError};

/// A create, update or move, already decoded from the wire
#[derive(Debug, Clone, PartialEq)]
pub struct PutRequest {
    /// Kind named by the request content type
    pub kind: NodeKind,
    pub update: NodeUpdate,
    /// Present when the body carries `move`
    pub source: Option<Target>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Created,
    Updated,
    Moved,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PutOutcome {
    pub outcome: Outcome,
    pub node: NodeView,
}

/// Result of looking up a target for reading
#[derive(Debug, Clone, PartialEq)]
pub enum Located {
    Node(NodeView),
    Capability(CapabilityClass),
}

/**
 * Namespace
 * =========
 * The resource store: the tree of containers and data objects plus
 *  the object id index, behind one lock.
 * Reads share the lock. Every mutation takes the write lock for a
 *  short synchronous section and validates everything before the
 *  first change, so readers never see a half-applied operation and
 *  a move never races an update of the same node.
 */
#[derive(Debug, Clone)]
pub struct Namespace(pub(super) Arc<RwLock<NamespaceInner>>);

#[derive(Debug)]
pub(super) struct NamespaceInner {
    pub(super) root: ResourceNode,
    pub(super) index: ObjectIdIndex,
    capability_ids: CapabilityIds,
    config: NamespaceConfig,
}

impl NamespaceInner {
    /// Turn a target into a tree path. Capability ids are not part of
    ///  the tree and are read-only.
    pub(super) fn target_path(&self, target: &Target) -> Result<CdmiPath, NamespaceError> {
        match target {
            Target::Path(path) => Ok(path.clone()),
            Target::ObjectId { id, rest } => match self.index.resolve(id)? {
                Locator::Node(path) => Ok(path.extend(rest)),
                Locator::Capability(class) => Err(NamespaceError::ReadOnly(class.uri().to_string())),
            },
        }
    }

    pub(super) fn view(&self, path: &CdmiPath) -> Result<NodeView, NamespaceError> {
        let node = resolve(&self.root, path)?
            .found()
            .ok_or_else(|| NamespaceError::NotFound(path.to_string()))?;
        let parent_id = match path.parent() {
            Some(parent) => resolve(&self.root, &parent)?.found().map(|n| n.id()),
            None => None,
        };
        Ok(NodeView::new(node, path.clone(), parent_id))
    }

    fn create(
        &mut self,
        path: &CdmiPath,
        kind: NodeKind,
        update: NodeUpdate,
    ) -> Result<(), NamespaceError> {
        let (Some(parent_path), Some(name)) = (path.parent(), path.name()) else {
            return Err(NamespaceError::AlreadyExists(path.clone()));
        };

        let id = self.index.fresh_id();
        let node = ResourceNode::from_update(id, kind, update);
        let parent = node_at_mut(&mut self.root, &parent_path)
            .ok_or_else(|| NamespaceError::NotFound(path.to_string()))?;
        parent
            .insert_child(name, node)
            .map_err(|_| NamespaceError::AlreadyExists(path.clone()))?;
        self.index.insert(id, Locator::Node(path.clone()));

        tracing::debug!(%id, %path, %kind, "created");
        Ok(())
    }

    fn update(&mut self, path: &CdmiPath, update: NodeUpdate) -> Result<(), NamespaceError> {
        let node = node_at_mut(&mut self.root, path)
            .ok_or_else(|| NamespaceError::NotFound(path.to_string()))?;
        node.apply(update);
        tracing::debug!(id = %node.id(), %path, "updated");
        Ok(())
    }
}

impl Default for Namespace {
    fn default() -> Self {
        Self::with_generator(ObjectIdGenerator::default(), DeletePolicy::default())
    }
}

impl Namespace {
    pub fn new(config: NamespaceConfig) -> Result<Self, NamespaceError> {
        let generator = ObjectIdGenerator::new(config.enterprise_number)?;
        Ok(Self::with_generator(generator, config.delete_policy))
    }

    fn with_generator(generator: ObjectIdGenerator, delete_policy: DeletePolicy) -> Self {
        let mut index = ObjectIdIndex::new(generator);
        let root_id = index.register(Locator::Node(CdmiPath::root()));
        let capability_ids = CapabilityIds {
            system: index.register(Locator::Capability(CapabilityClass::System)),
            container: index.register(Locator::Capability(CapabilityClass::Container)),
            data_object: index.register(Locator::Capability(CapabilityClass::DataObject)),
        };
        let config = NamespaceConfig {
            enterprise_number: generator.enterprise_number(),
            delete_policy,
        };

        Self(Arc::new(RwLock::new(NamespaceInner {
            root: ResourceNode::container(root_id),
            index,
            capability_ids,
            config,
        })))
    }

    pub fn config(&self) -> NamespaceConfig {
        self.0.read().config
    }

    pub fn root_id(&self) -> ObjectId {
        self.0.read().root.id()
    }

    pub fn capability_ids(&self) -> CapabilityIds {
        self.0.read().capability_ids
    }

    /// Number of live ids, capability objects included
    pub fn len(&self) -> usize {
        self.0.read().index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Look up a target for reading
    pub fn locate(&self, target: &Target) -> Result<Located, NamespaceError> {
        let inner = self.0.read();
        if let Target::ObjectId { id, rest } = target {
            if let Locator::Capability(class) = inner.index.resolve(id)? {
                if !rest.is_root() {
                    return Err(NamespaceError::NotFound(target.to_string()));
                }
                return Ok(Located::Capability(*class));
            }
        }
        let path = inner.target_path(target)?;
        Ok(Located::Node(inner.view(&path)?))
    }

    /// Snapshot of the node at `target`
    pub fn get(&self, target: &Target) -> Result<NodeView, NamespaceError> {
        match self.locate(target)? {
            Located::Node(view) => Ok(view),
            Located::Capability(class) => Err(NamespaceError::NotFound(class.uri().to_string())),
        }
    }

    /// Resolve an object id to the current path of its node
    pub fn resolve_id(&self, id: &ObjectId) -> Result<CdmiPath, NamespaceError> {
        match self.0.read().index.resolve(id)? {
            Locator::Node(path) => Ok(path.clone()),
            Locator::Capability(_) => Err(NamespaceError::ObjectIdNotFound(*id)),
        }
    }

    pub fn capability(&self, class: CapabilityClass) -> CapabilityDocument {
        CapabilityDocument::new(class, &self.0.read().capability_ids)
    }

    /// Capability document describing whatever `target` names
    pub fn capability_of(&self, target: &Target) -> Result<CapabilityDocument, NamespaceError> {
        let class = match self.locate(target)? {
            Located::Node(view) => CapabilityClass::for_kind(view.kind),
            Located::Capability(class) => class,
        };
        Ok(self.capability(class))
    }

    /// Create, update or move.
    ///  - with a move source, the move engine relocates the source to
    ///    `target` and applies the update to it
    ///  - an existing node of the same kind is updated in place
    ///  - a vacant leaf under an existing container is created
    pub fn put(&self, target: &Target, request: PutRequest) -> Result<PutOutcome, NamespaceError> {
        let mut inner = self.0.write();
        let path = inner.target_path(target)?;
        let PutRequest {
            kind,
            update,
            source,
        } = request;

        if let Some(source) = source {
            let destination = MoveEngine::new(&mut inner, source, path, kind, update).run()?;
            return Ok(PutOutcome {
                outcome: Outcome::Moved,
                node: inner.view(&destination)?,
            });
        }

        let existing = match resolve(&inner.root, &path)? {
            Resolution::Found(node) => Some(node.kind()),
            Resolution::Vacant { .. } => None,
        };

        let outcome = match existing {
            Some(actual) if actual != kind => {
                return Err(NamespaceError::KindMismatch {
                    path,
                    expected: kind,
                    actual,
                })
            }
            Some(_) => {
                inner.update(&path, update)?;
                Outcome::Updated
            }
            None => {
                inner.create(&path, kind, update)?;
                Outcome::Created
            }
        };

        Ok(PutOutcome {
            outcome,
            node: inner.view(&path)?,
        })
    }

    /// Create a container at `path` with no metadata
    pub fn mkdir(&self, path: &CdmiPath) -> Result<PutOutcome, NamespaceError> {
        self.put(
            &Target::Path(path.clone()),
            PutRequest {
                kind: NodeKind::Container,
                update: NodeUpdate::default(),
                source: None,
            },
        )
    }

    /// Remove the node at `target`. Returns how many nodes were removed.
    pub fn delete(&self, target: &Target) -> Result<usize, NamespaceError> {
        let mut guard = self.0.write();
        let inner = &mut *guard;
        let path = inner.target_path(target)?;
        let (Some(parent_path), Some(name)) = (path.parent(), path.name()) else {
            return Err(NamespaceError::RootImmutable);
        };

        let node = resolve(&inner.root, &path)?
            .found()
            .ok_or_else(|| NamespaceError::NotFound(path.to_string()))?;
        if node.has_children() && inner.config.delete_policy == DeletePolicy::Reject {
            return Err(NamespaceError::ContainerNotEmpty(path.clone()));
        }

        let removed = node_at_mut(&mut inner.root, &parent_path)
            .and_then(|parent| parent.remove_child(name))
            .ok_or_else(|| NamespaceError::NotFound(path.to_string()))?;

        let index = &mut inner.index;
        let mut count = 0;
        removed.walk(&path, &mut |_, node| {
            index.retire(&node.id());
            count += 1;
        });

        tracing::debug!(id = %removed.id(), %path, count, "deleted");
        Ok(count)
    }

    /// Every path at which a node with `id` appears in the tree.
    ///  Walks the whole tree; a healthy namespace returns at most one.
    #[cfg(test)]
    pub(crate) fn find_paths(&self, id: &ObjectId) -> Vec<CdmiPath> {
        let inner = self.0.read();
        let mut found = Vec::new();
        inner.root.walk(&CdmiPath::root(), &mut |path, node| {
            if node.id() == *id {
                found.push(path.clone());
            }
        });
        found
    }
}
