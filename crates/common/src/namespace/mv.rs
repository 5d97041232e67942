use super::node::{NodeKind, NodeUpdate};
use super::path::{node_at_mut, resolve, CdmiPath, Resolution, Target};
use super::store::NamespaceInner;
use super::NamespaceError;

/// Where a move currently stands. Each step either advances to the
///  next state or fails without having touched the tree; only
///  `Relocate` mutates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum MoveState {
    Idle,
    ResolveSource,
    ResolveDestination { source: CdmiPath },
    Relocate { source: CdmiPath },
    Commit,
}

/**
 * Move engine
 * ===========
 * Relocates a node (and its whole subtree) to a new path, keeping
 *  every object id, and applies the metadata/value changes that came
 *  in the same request. Runs entirely under the namespace write lock.
 */
pub(super) struct MoveEngine<'a> {
    inner: &'a mut NamespaceInner,
    source: Target,
    destination: CdmiPath,
    kind: NodeKind,
    update: Option<NodeUpdate>,
}

impl<'a> MoveEngine<'a> {
    pub(super) fn new(
        inner: &'a mut NamespaceInner,
        source: Target,
        destination: CdmiPath,
        kind: NodeKind,
        update: NodeUpdate,
    ) -> Self {
        Self {
            inner,
            source,
            destination,
            kind,
            update: Some(update),
        }
    }

    /// Drive the move to completion. Returns the node's new path.
    pub(super) fn run(mut self) -> Result<CdmiPath, NamespaceError> {
        let mut state = MoveState::Idle;
        loop {
            tracing::trace!(
                ?state,
                source = %self.source,
                destination = %self.destination,
                "move step"
            );
            state = match state {
                MoveState::Idle => MoveState::ResolveSource,
                MoveState::ResolveSource => self.resolve_source()?,
                MoveState::ResolveDestination { source } => self.resolve_destination(source)?,
                MoveState::Relocate { source } => self.relocate(source)?,
                MoveState::Commit => return Ok(self.destination),
            };
        }
    }

    fn resolve_source(&mut self) -> Result<MoveState, NamespaceError> {
        let source = self.inner.target_path(&self.source)?;
        if source.is_root() {
            return Err(NamespaceError::RootImmutable);
        }

        let node = resolve(&self.inner.root, &source)?
            .found()
            .ok_or_else(|| NamespaceError::NotFound(self.source.to_string()))?;
        if node.kind() != self.kind {
            return Err(NamespaceError::KindMismatch {
                path: source.clone(),
                expected: self.kind,
                actual: node.kind(),
            });
        }

        Ok(MoveState::ResolveDestination { source })
    }

    fn resolve_destination(&mut self, source: CdmiPath) -> Result<MoveState, NamespaceError> {
        let destination = &self.destination;

        // Moving onto itself only applies the update
        if *destination == source {
            return Ok(MoveState::Relocate { source });
        }

        if destination.starts_with(&source) {
            return Err(NamespaceError::MoveIntoSelf {
                from: source,
                to: destination.clone(),
            });
        }

        match resolve(&self.inner.root, destination) {
            Ok(Resolution::Vacant { .. }) => Ok(MoveState::Relocate { source }),
            Ok(Resolution::Found(_)) => Err(NamespaceError::AlreadyExists(destination.clone())),
            Err(NamespaceError::NotFound(_)) => Err(NamespaceError::ParentNotFound(
                destination.parent().unwrap_or_default(),
            )),
            Err(e) => Err(e),
        }
    }

    fn relocate(&mut self, source: CdmiPath) -> Result<MoveState, NamespaceError> {
        let update = self.update.take().unwrap_or_default();
        let destination = self.destination.clone();
        let NamespaceInner { root, index, .. } = &mut *self.inner;

        if source != destination {
            let (Some(source_parent), Some(source_name)) = (source.parent(), source.name()) else {
                return Err(NamespaceError::RootImmutable);
            };
            let (Some(dest_parent), Some(dest_name)) = (destination.parent(), destination.name())
            else {
                return Err(NamespaceError::AlreadyExists(destination.clone()));
            };

            // ============================================================
            // Detach from the old parent
            // ============================================================
            let node = node_at_mut(root, &source_parent)
                .and_then(|parent| parent.remove_child(source_name))
                .ok_or_else(|| NamespaceError::NotFound(source.to_string()))?;

            // ============================================================
            // Attach under the new parent
            // ============================================================
            let attached = match node_at_mut(root, &dest_parent) {
                Some(parent) => parent.insert_child(dest_name, node),
                None => Err(node),
            };
            if let Err(node) = attached {
                // Validation rules this out; put the node back where it was
                let restored = match node_at_mut(root, &source_parent) {
                    Some(parent) => parent.insert_child(source_name, node),
                    None => Err(node),
                };
                if let Err(lost) = restored {
                    tracing::error!(
                        id = %lost.id(),
                        path = %source,
                        "move rollback failed, dropping subtree"
                    );
                    lost.walk(&source, &mut |_, node| index.retire(&node.id()));
                }
                return Err(NamespaceError::ParentNotFound(dest_parent));
            }

            // ============================================================
            // Point every id in the subtree at its new path
            // ============================================================
            if let Some(moved) = resolve(root, &destination)?.found() {
                moved.walk(&destination, &mut |path, node| {
                    index.relocate(&node.id(), path.clone());
                });
            }
        }

        let node = node_at_mut(root, &destination)
            .ok_or_else(|| NamespaceError::NotFound(destination.to_string()))?;
        node.apply(update);
        tracing::debug!(id = %node.id(), from = %source, to = %destination, "moved");

        Ok(MoveState::Commit)
    }
}
