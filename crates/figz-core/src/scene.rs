//! Scene graph reconstruction from flat records.
//!
//! Records are stored in an arena; parent links are consumed by the builder and never stored on
//! the finished graph. Children are ordered by descending sibling position.

use crate::record::{Blob, DecodedNode, Identifier, NodeRecord, ParentLink, SiblingKey};
use crate::{Error, Result};
use rustc_hash::FxHashMap;
use serde::ser::{SerializeSeq, SerializeStruct};
use serde::{Serialize, Serializer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeIndex(usize);

#[derive(Debug, Clone)]
pub struct SceneGraph {
    records: Vec<NodeRecord>,
    children: Vec<Vec<NodeIndex>>,
    index: FxHashMap<Identifier, NodeIndex>,
    root: NodeIndex,
}

impl SceneGraph {
    /// Builds the tree. Records whose parent is unknown stay in the flat map but are never
    /// attached; the first record wins when identifiers repeat.
    pub fn build(nodes: Vec<DecodedNode>) -> Result<Self> {
        let mut records = Vec::with_capacity(nodes.len());
        let mut links: Vec<Option<ParentLink>> = Vec::with_capacity(nodes.len());
        let mut index = FxHashMap::default();

        for node in nodes {
            let id = node.record.id;
            if index.contains_key(&id) {
                tracing::warn!(%id, "duplicate node identifier; keeping the first record");
                continue;
            }
            index.insert(id, NodeIndex(records.len()));
            records.push(node.record);
            links.push(node.parent);
        }

        let root = *index.get(&Identifier::ROOT).ok_or(Error::MissingRoot)?;

        // (child, position) pairs per parent, in input order.
        let mut pending: Vec<Vec<(NodeIndex, SiblingKey)>> = vec![Vec::new(); records.len()];
        for (i, link) in links.into_iter().enumerate() {
            let Some(link) = link else {
                continue;
            };
            let child = NodeIndex(i);
            if child == root || link.parent == records[i].id {
                continue;
            }
            match index.get(&link.parent) {
                Some(parent) => pending[parent.0].push((child, link.position)),
                None => {
                    tracing::debug!(id = %records[i].id, parent = %link.parent, "orphaned record");
                }
            }
        }

        let children = pending
            .into_iter()
            .map(|mut list| {
                list.sort_by(|a, b| b.1.cmp(&a.1));
                list.into_iter().map(|(child, _)| child).collect()
            })
            .collect();

        Ok(Self {
            records,
            children,
            index,
            root,
        })
    }

    pub fn root(&self) -> SceneNode<'_> {
        self.node(self.root)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: Identifier) -> Option<SceneNode<'_>> {
        self.index.get(&id).map(|idx| self.node(*idx))
    }

    /// Every record in input order, attached or not.
    pub fn records(&self) -> impl ExactSizeIterator<Item = &NodeRecord> + '_ {
        self.records.iter()
    }

    fn node(&self, index: NodeIndex) -> SceneNode<'_> {
        SceneNode { graph: self, index }
    }
}

/// A borrowed view of one node in a [`SceneGraph`].
#[derive(Clone, Copy)]
pub struct SceneNode<'a> {
    graph: &'a SceneGraph,
    index: NodeIndex,
}

impl<'a> SceneNode<'a> {
    pub fn record(&self) -> &'a NodeRecord {
        &self.graph.records[self.index.0]
    }

    pub fn id(&self) -> Identifier {
        self.record().id
    }

    pub fn child_count(&self) -> usize {
        self.graph.children[self.index.0].len()
    }

    pub fn child(&self, i: usize) -> Option<SceneNode<'a>> {
        self.graph.children[self.index.0]
            .get(i)
            .map(|idx| self.graph.node(*idx))
    }

    pub fn children(&self) -> impl ExactSizeIterator<Item = SceneNode<'a>> + 'a {
        let graph = self.graph;
        graph.children[self.index.0]
            .iter()
            .map(move |idx| graph.node(*idx))
    }
}

impl std::fmt::Debug for SceneNode<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SceneNode")
            .field("id", &self.id())
            .field("children", &self.child_count())
            .finish()
    }
}

impl Serialize for SceneNode<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        struct Children<'a>(SceneNode<'a>);

        impl Serialize for Children<'_> {
            fn serialize<S: Serializer>(
                &self,
                serializer: S,
            ) -> std::result::Result<S::Ok, S::Error> {
                let mut seq = serializer.serialize_seq(Some(self.0.child_count()))?;
                for child in self.0.children() {
                    seq.serialize_element(&child)?;
                }
                seq.end()
            }
        }

        let mut s = serializer.serialize_struct("SceneNode", 2)?;
        s.serialize_field("record", self.record())?;
        s.serialize_field("children", &Children(*self))?;
        s.end()
    }
}

#[derive(Debug, Clone)]
pub struct Document {
    pub version: u32,
    pub graph: SceneGraph,
    pub blobs: Vec<Blob>,
}

impl Document {
    pub fn root(&self) -> SceneNode<'_> {
        self.graph.root()
    }
}

impl Serialize for Document {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("Document", 3)?;
        s.serialize_field("version", &self.version)?;
        s.serialize_field("root", &self.root())?;
        s.serialize_field("blobs", &self.blobs)?;
        s.end()
    }
}
