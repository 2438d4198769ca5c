//! Space/folder/document hierarchy reconstruction
//!
//! The remote API exposes spaces, folders and documents as three flat collections.
//! Each item points at its parent through `parent_entity_uid`. This module turns the
//! raw collections into a nested, deterministically ordered tree:
//!
//! 1. [`normalize_collection`] maps raw items of one kind to [`TreeEntity`]
//! 2. [`index_by_parent`] groups entities by parent uid and sorts every sibling group
//! 3. [`assemble`] walks the index from a starting group down to a depth bound
//!
//! The shell crate does the fetching; everything here is pure.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{HashMap, HashSet};

/// Kind of entity that can appear in the tree.
///
/// Declaration order is the sibling sort precedence: spaces first, then folders,
/// then documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Space,
    Folder,
    Document,
}

impl EntityKind {
    /// Collection path relative to the API base URL
    pub fn collection_path(self) -> &'static str {
        match self {
            EntityKind::Space => "/spaces",
            EntityKind::Folder => "/folders",
            EntityKind::Document => "/documents",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            EntityKind::Space => "space",
            EntityKind::Folder => "folder",
            EntityKind::Document => "document",
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A normalized entity, before nesting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeEntity {
    pub kind: EntityKind,
    pub uid: String,
    pub id: Option<i64>,
    pub title: String,
    pub parent_uid: Option<String>,
}

/// A node of the assembled tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeNode {
    pub kind: EntityKind,
    pub uid: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_uid: Option<String>,
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    fn leaf(entity: &TreeEntity) -> Self {
        Self {
            kind: entity.kind,
            uid: entity.uid.clone(),
            id: entity.id,
            title: entity.title.clone(),
            parent_uid: entity.parent_uid.clone(),
            children: Vec::new(),
        }
    }

    /// Total number of nodes in this subtree, including `self`
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(TreeNode::count).sum::<usize>()
    }
}

/// Sibling groups keyed by parent uid (`None` is the root group)
pub type ParentIndex = HashMap<Option<String>, Vec<TreeEntity>>;

fn str_field<'a>(item: &'a Value, key: &str) -> Option<&'a str> {
    item.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// Normalize a single raw item of the given kind.
///
/// Returns `None` when the item has no `uid`.
pub fn normalize_entity(kind: EntityKind, item: &Value) -> Option<TreeEntity> {
    let uid = str_field(item, "uid")?.to_string();
    let id = item.get("id").and_then(Value::as_i64);
    let parent_uid = str_field(item, "parent_entity_uid").map(str::to_string);

    let title = match kind {
        EntityKind::Space => str_field(item, "title"),
        // Folders created through the older endpoints only carry `name`.
        EntityKind::Folder => str_field(item, "title").or_else(|| str_field(item, "name")),
        EntityKind::Document => str_field(item, "title"),
    };
    let title = title.map(str::to_string).unwrap_or_else(|| match kind {
        EntityKind::Document => "Untitled".to_string(),
        _ => uid.clone(),
    });

    Some(TreeEntity {
        kind,
        uid,
        id,
        title,
        parent_uid,
    })
}

/// Normalize a whole collection response.
///
/// Accepts a JSON array or `null` (no items); any other shape yields no entities.
/// Items without a `uid` are dropped.
pub fn normalize_collection(kind: EntityKind, collection: Option<&Value>) -> Vec<TreeEntity> {
    collection
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|item| normalize_entity(kind, item))
                .collect()
        })
        .unwrap_or_default()
}

/// Group entities by parent uid and sort each group by kind, then title.
pub fn index_by_parent(entities: impl IntoIterator<Item = TreeEntity>) -> ParentIndex {
    let mut index: ParentIndex = HashMap::new();
    for entity in entities {
        index
            .entry(entity.parent_uid.clone())
            .or_default()
            .push(entity);
    }

    for siblings in index.values_mut() {
        siblings.sort_by(|a, b| {
            a.kind
                .cmp(&b.kind)
                .then_with(|| a.title.cmp(&b.title))
                .then_with(|| a.uid.cmp(&b.uid))
        });
    }

    index
}

/// Whether any indexed entity carries this uid
pub fn contains_uid(index: &ParentIndex, uid: &str) -> bool {
    index.values().flatten().any(|e| e.uid == uid)
}

/// Outcome of an assembly pass
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Assembly {
    pub nodes: Vec<TreeNode>,
    /// Uids whose subtree was cut because they already appear among their ancestors
    pub cycles: Vec<String>,
}

/// Build the nested tree starting at the group keyed by `root_uid`.
///
/// `max_depth == 0` means unlimited. Nodes at the depth bound keep an empty
/// `children` list even when the index holds deeper descendants. A node whose uid
/// is already on the path from the start group is emitted without children and
/// reported in [`Assembly::cycles`].
pub fn assemble(index: &ParentIndex, root_uid: Option<&str>, max_depth: usize) -> Assembly {
    let mut assembly = Assembly::default();
    let mut path = HashSet::new();
    if let Some(root) = root_uid {
        path.insert(root.to_string());
    }

    let key = root_uid.map(str::to_string);
    assembly.nodes = assemble_group(index, &key, 0, max_depth, &mut path, &mut assembly.cycles);
    assembly
}

fn assemble_group(
    index: &ParentIndex,
    key: &Option<String>,
    depth: usize,
    max_depth: usize,
    path: &mut HashSet<String>,
    cycles: &mut Vec<String>,
) -> Vec<TreeNode> {
    let Some(siblings) = index.get(key) else {
        return Vec::new();
    };

    let mut nodes = Vec::with_capacity(siblings.len());
    for entity in siblings {
        let mut node = TreeNode::leaf(entity);

        if path.contains(&entity.uid) {
            cycles.push(entity.uid.clone());
            nodes.push(node);
            continue;
        }

        if max_depth == 0 || depth < max_depth {
            path.insert(entity.uid.clone());
            let child_key = Some(entity.uid.clone());
            node.children = assemble_group(index, &child_key, depth + 1, max_depth, path, cycles);
            path.remove(&entity.uid);
        }

        nodes.push(node);
    }

    nodes
}

/// One level of the tree: the sorted group keyed by `parent_uid`, with the parent
/// reference stripped from each node.
pub fn children_of(index: &ParentIndex, parent_uid: Option<&str>) -> Vec<TreeNode> {
    index
        .get(&parent_uid.map(str::to_string))
        .map(|siblings| {
            siblings
                .iter()
                .map(|entity| TreeNode {
                    parent_uid: None,
                    ..TreeNode::leaf(entity)
                })
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entity(kind: EntityKind, uid: &str, title: &str, parent: Option<&str>) -> TreeEntity {
        TreeEntity {
            kind,
            uid: uid.to_string(),
            id: None,
            title: title.to_string(),
            parent_uid: parent.map(str::to_string),
        }
    }

    fn chain() -> ParentIndex {
        index_by_parent(vec![
            entity(EntityKind::Space, "A", "A", None),
            entity(EntityKind::Folder, "B", "B", Some("A")),
            entity(EntityKind::Document, "C", "C", Some("B")),
        ])
    }

    #[test]
    fn test_normalize_entity_space() {
        let item = json!({"uid": "s-1", "id": 12, "title": "Team", "parent_entity_uid": null});
        let entity = normalize_entity(EntityKind::Space, &item).unwrap();
        assert_eq!(entity.uid, "s-1");
        assert_eq!(entity.id, Some(12));
        assert_eq!(entity.title, "Team");
        assert_eq!(entity.parent_uid, None);
    }

    #[test]
    fn test_normalize_entity_missing_uid_dropped() {
        let item = json!({"id": 12, "title": "No uid"});
        assert!(normalize_entity(EntityKind::Space, &item).is_none());
        let item = json!({"uid": "  ", "title": "Blank uid"});
        assert!(normalize_entity(EntityKind::Document, &item).is_none());
    }

    #[test]
    fn test_normalize_folder_name_fallback() {
        let item = json!({"uid": "f-1", "name": "Specs", "parent_entity_uid": "s-1"});
        let entity = normalize_entity(EntityKind::Folder, &item).unwrap();
        assert_eq!(entity.title, "Specs");
        assert_eq!(entity.parent_uid.as_deref(), Some("s-1"));
    }

    #[test]
    fn test_normalize_document_untitled() {
        let item = json!({"uid": "d-1"});
        let entity = normalize_entity(EntityKind::Document, &item).unwrap();
        assert_eq!(entity.title, "Untitled");
        assert_eq!(entity.id, None);
    }

    #[test]
    fn test_normalize_collection_non_array() {
        assert!(normalize_collection(EntityKind::Space, None).is_empty());
        assert!(normalize_collection(EntityKind::Space, Some(&json!({"uid": "x"}))).is_empty());

        let items = json!([{"uid": "a"}, {"title": "skip"}, {"uid": "b"}]);
        let entities = normalize_collection(EntityKind::Document, Some(&items));
        assert_eq!(entities.len(), 2);
    }

    #[test]
    fn test_index_sorts_by_kind_then_title() {
        let index = index_by_parent(vec![
            entity(EntityKind::Document, "d1", "Alpha", None),
            entity(EntityKind::Folder, "f1", "Zulu", None),
            entity(EntityKind::Space, "s2", "Beta", None),
            entity(EntityKind::Space, "s1", "Alpha", None),
        ]);
        let uids: Vec<_> = index[&None].iter().map(|e| e.uid.as_str()).collect();
        assert_eq!(uids, vec!["s1", "s2", "f1", "d1"]);
    }

    #[test]
    fn test_assemble_unlimited_depth() {
        let assembly = assemble(&chain(), None, 0);
        assert_eq!(assembly.nodes.len(), 1);

        let a = &assembly.nodes[0];
        assert_eq!(a.uid, "A");
        assert_eq!(a.children.len(), 1);
        assert_eq!(a.children[0].uid, "B");
        assert_eq!(a.children[0].children[0].uid, "C");
        assert!(a.children[0].children[0].children.is_empty());
        assert_eq!(a.count(), 3);
        assert!(assembly.cycles.is_empty());
    }

    #[test]
    fn test_assemble_depth_one() {
        let assembly = assemble(&chain(), None, 1);
        let a = &assembly.nodes[0];
        assert_eq!(a.children[0].uid, "B");
        assert!(a.children[0].children.is_empty());
    }

    #[test]
    fn test_assemble_from_root_uid() {
        let assembly = assemble(&chain(), Some("A"), 0);
        assert_eq!(assembly.nodes.len(), 1);
        assert_eq!(assembly.nodes[0].uid, "B");
        assert_eq!(assembly.nodes[0].children[0].uid, "C");
    }

    #[test]
    fn test_assemble_leaf_root_is_empty() {
        let assembly = assemble(&chain(), Some("C"), 0);
        assert!(assembly.nodes.is_empty());
    }

    #[test]
    fn test_assemble_cuts_cycles() {
        let index = index_by_parent(vec![
            entity(EntityKind::Space, "root", "Root", None),
            entity(EntityKind::Folder, "X", "X", Some("Y")),
            entity(EntityKind::Folder, "Y", "Y", Some("X")),
        ]);

        let assembly = assemble(&index, Some("X"), 0);
        assert_eq!(assembly.nodes.len(), 1);
        let y = &assembly.nodes[0];
        assert_eq!(y.uid, "Y");
        assert_eq!(y.children.len(), 1);
        assert_eq!(y.children[0].uid, "X");
        assert!(y.children[0].children.is_empty());
        assert_eq!(assembly.cycles, vec!["X".to_string()]);
    }

    #[test]
    fn test_children_of_strips_parent() {
        let children = children_of(&chain(), Some("A"));
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].uid, "B");
        assert_eq!(children[0].parent_uid, None);
        assert!(children[0].children.is_empty());

        assert!(children_of(&chain(), Some("missing")).is_empty());
    }

    #[test]
    fn test_contains_uid() {
        let index = chain();
        assert!(contains_uid(&index, "C"));
        assert!(!contains_uid(&index, "missing"));
    }

    #[test]
    fn test_tree_node_serialization() {
        let node = children_of(&chain(), None).remove(0);
        let value = serde_json::to_value(&node).unwrap();
        assert_eq!(
            value,
            json!({"kind": "space", "uid": "A", "title": "A", "children": []})
        );
    }
}
