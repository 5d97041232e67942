use std::fmt;
use std::str::FromStr;

use crate::object_id::ObjectId;

use super::node::ResourceNode;
use super::NamespaceError;

/// First path segment reserved for object id addressing
pub const OBJECT_ID_SEGMENT: &str = "cdmi_objectid";
/// First path segment reserved for capability documents
pub const CAPABILITIES_SEGMENT: &str = "cdmi_capabilities";

/// A normalized namespace path.
///  Repeated and trailing slashes are dropped, so `/a//b/` and `/a/b`
///  parse to the same value. The root is the empty segment list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CdmiPath {
    segments: Vec<String>,
}

impl CdmiPath {
    pub fn root() -> Self {
        Self::default()
    }

    /// Parse a request path. Rejects `.`/`..` segments and the
    ///  reserved `cdmi_objectid`/`cdmi_capabilities` names in
    ///  first position.
    pub fn parse(raw: &str) -> Result<Self, NamespaceError> {
        let path = Self::parse_relative(raw)?;
        if let Some(first) = path.segments.first() {
            if first == OBJECT_ID_SEGMENT || first == CAPABILITIES_SEGMENT {
                return Err(NamespaceError::InvalidPath(format!(
                    "'{}' is a reserved name",
                    first
                )));
            }
        }
        Ok(path)
    }

    // Same as parse, but allows any first segment. Used for the
    //  remainder of an object id URI.
    fn parse_relative(raw: &str) -> Result<Self, NamespaceError> {
        let mut segments = Vec::new();
        for segment in raw.split('/').filter(|s| !s.is_empty()) {
            if segment == "." || segment == ".." {
                return Err(NamespaceError::InvalidPath(raw.to_string()));
            }
            segments.push(segment.to_string());
        }
        Ok(Self { segments })
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Leaf name, `None` for the root
    pub fn name(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    pub fn parent(&self) -> Option<CdmiPath> {
        if self.is_root() {
            return None;
        }
        Some(Self {
            segments: self.segments[..self.segments.len() - 1].to_vec(),
        })
    }

    pub fn join(&self, name: &str) -> CdmiPath {
        let mut segments = self.segments.clone();
        segments.push(name.to_string());
        Self { segments }
    }

    /// Append every segment of `other`
    pub fn extend(&self, other: &CdmiPath) -> CdmiPath {
        let mut segments = self.segments.clone();
        segments.extend(other.segments.iter().cloned());
        Self { segments }
    }

    /// True if `self` is `ancestor` or lies below it
    pub fn starts_with(&self, ancestor: &CdmiPath) -> bool {
        self.segments.starts_with(&ancestor.segments)
    }

    /// Swap the `from` prefix of this path for `to`
    pub fn rebase(&self, from: &CdmiPath, to: &CdmiPath) -> Option<CdmiPath> {
        let rest = self.segments.strip_prefix(from.segments.as_slice())?;
        let mut segments = to.segments.clone();
        segments.extend(rest.iter().cloned());
        Some(Self { segments })
    }

    /// URI form; containers get a trailing slash
    pub fn to_uri(&self, is_container: bool) -> String {
        let mut uri = self.to_string();
        if is_container && !self.is_root() {
            uri.push('/');
        }
        uri
    }
}

impl fmt::Display for CdmiPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_root() {
            return f.write_str("/");
        }
        for segment in &self.segments {
            write!(f, "/{}", segment)?;
        }
        Ok(())
    }
}

impl FromStr for CdmiPath {
    type Err = NamespaceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// What a request addresses: a path, or an object id plus an
///  optional path below it
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Path(CdmiPath),
    ObjectId { id: ObjectId, rest: CdmiPath },
}

impl Target {
    /// Parse `/a/b` or `/cdmi_objectid/<ID>[/rest]`.
    ///  Also accepts a bare object id URI as found in `move` values.
    pub fn parse(raw: &str) -> Result<Self, NamespaceError> {
        let trimmed = raw.trim_start_matches('/');
        let mut parts = trimmed.splitn(2, '/');
        let first = parts.next().unwrap_or_default();

        if first != OBJECT_ID_SEGMENT {
            return Ok(Target::Path(CdmiPath::parse(raw)?));
        }

        let remainder = parts.next().unwrap_or_default();
        let mut parts = remainder.splitn(2, '/');
        let id = parts.next().unwrap_or_default();
        if id.is_empty() {
            return Err(NamespaceError::InvalidPath(raw.to_string()));
        }
        let id = ObjectId::from_str(id)?;
        let rest = CdmiPath::parse_relative(parts.next().unwrap_or_default())?;
        Ok(Target::ObjectId { id, rest })
    }

    pub fn object_id(id: ObjectId) -> Self {
        Target::ObjectId {
            id,
            rest: CdmiPath::root(),
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Path(path) => write!(f, "{}", path),
            Target::ObjectId { id, rest } if rest.is_root() => write!(f, "{}", id.uri()),
            Target::ObjectId { id, rest } => write!(f, "{}{}", id.uri(), rest),
        }
    }
}

impl From<CdmiPath> for Target {
    fn from(path: CdmiPath) -> Self {
        Target::Path(path)
    }
}

/// Outcome of walking a path through the tree
#[derive(Debug)]
pub enum Resolution<'a> {
    /// The path names an existing node
    Found(&'a ResourceNode),
    /// The parent container exists, the leaf does not
    Vacant {
        parent: &'a ResourceNode,
        name: &'a str,
    },
}

impl<'a> Resolution<'a> {
    pub fn found(self) -> Option<&'a ResourceNode> {
        match self {
            Resolution::Found(node) => Some(node),
            Resolution::Vacant { .. } => None,
        }
    }
}

/// Walk `path` from `root`.
///  A missing intermediate segment, or a data object in intermediate
///  position, is `NotFound`; only the leaf may be vacant.
pub fn resolve<'a>(
    root: &'a ResourceNode,
    path: &'a CdmiPath,
) -> Result<Resolution<'a>, NamespaceError> {
    let Some((leaf, ancestors)) = path.segments().split_last() else {
        return Ok(Resolution::Found(root));
    };

    let mut current = root;
    for segment in ancestors {
        current = current
            .child(segment)
            .filter(|node| node.is_container())
            .ok_or_else(|| NamespaceError::NotFound(path.to_string()))?;
    }

    if !current.is_container() {
        return Err(NamespaceError::NotFound(path.to_string()));
    }
    match current.child(leaf) {
        Some(node) => Ok(Resolution::Found(node)),
        None => Ok(Resolution::Vacant {
            parent: current,
            name: leaf,
        }),
    }
}

/// Mutable lookup of an existing node
pub fn node_at_mut<'a>(root: &'a mut ResourceNode, path: &CdmiPath) -> Option<&'a mut ResourceNode> {
    let mut current = root;
    for segment in path.segments() {
        current = current.child_mut(segment)?;
    }
    Some(current)
}
