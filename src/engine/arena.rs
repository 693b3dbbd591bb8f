//! Id-addressed view of one container's items.
//!
//! Items only store `parent_id`; children, subtrees and ancestry are derived
//! here from a per-call index instead of being cached on the rows.

use std::collections::{HashMap, HashSet};

use crate::models::{Item, ItemNode};

#[derive(Debug, Default)]
pub struct ItemArena {
    items: HashMap<i64, Item>,
    children: HashMap<Option<i64>, Vec<i64>>,
}

impl ItemArena {
    pub fn new(items: impl IntoIterator<Item = Item>) -> Self {
        let mut by_id = HashMap::new();
        let mut children: HashMap<Option<i64>, Vec<i64>> = HashMap::new();
        for item in items {
            children.entry(item.parent_id).or_default().push(item.id);
            by_id.insert(item.id, item);
        }
        for ids in children.values_mut() {
            ids.sort_unstable();
        }
        Self {
            items: by_id,
            children,
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: i64) -> Option<&Item> {
        self.items.get(&id)
    }

    /// Direct children of `parent` (`None` for roots), in id order.
    pub fn children(&self, parent: Option<i64>) -> &[i64] {
        self.children
            .get(&parent)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// `id` followed by each of its ancestors up to the root.
    ///
    /// Stops at a dangling parent reference or when an id repeats.
    pub fn ancestry(&self, id: i64) -> Vec<i64> {
        let mut chain = Vec::new();
        let mut seen = HashSet::new();
        let mut current = Some(id);
        while let Some(cur) = current {
            if !seen.insert(cur) {
                break;
            }
            chain.push(cur);
            current = self.items.get(&cur).and_then(|item| item.parent_id);
        }
        chain
    }

    /// True when `candidate` is `root` or one of its descendants.
    pub fn is_in_subtree(&self, candidate: i64, root: i64) -> bool {
        self.ancestry(candidate).contains(&root)
    }

    /// Every item of the subtree rooted at `root`, depth-first with the root
    /// first, paired with its distance from `root`.
    pub fn subtree(&self, root: i64) -> Vec<(i64, u32)> {
        if !self.items.contains_key(&root) {
            return Vec::new();
        }

        let mut out = Vec::new();
        let mut seen = HashSet::new();
        let mut stack = vec![(root, 0u32)];
        while let Some((id, level)) = stack.pop() {
            if !seen.insert(id) {
                continue;
            }
            out.push((id, level));
            // Reverse so the smallest id is visited first.
            for child in self.children(Some(id)).iter().rev() {
                stack.push((*child, level + 1));
            }
        }
        out
    }

    /// Levels between `root` and its deepest descendant; 0 without children.
    pub fn relative_height(&self, root: i64) -> u32 {
        self.subtree(root)
            .into_iter()
            .map(|(_, level)| level)
            .max()
            .unwrap_or(0)
    }

    /// Root items with their children nested, siblings in id order.
    pub fn hierarchy(&self) -> Vec<ItemNode> {
        fn build_subtree(parent_id: Option<i64>, arena: &ItemArena) -> Vec<ItemNode> {
            arena
                .children(parent_id)
                .iter()
                .filter_map(|id| arena.get(*id))
                .map(|item| ItemNode {
                    item: item.clone(),
                    children: build_subtree(Some(item.id), arena),
                })
                .collect()
        }

        build_subtree(None, self)
    }

    /// All leaf items ordered by `(depth, id)`.
    pub fn ordered_leaves(&self) -> Vec<Item> {
        let mut leaves: Vec<Item> = self
            .items
            .values()
            .filter(|item| item.is_leaf())
            .cloned()
            .collect();
        leaves.sort_by_key(|item| (item.depth, item.id));
        leaves
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ContainerKind;
    use chrono::Utc;

    fn item(id: i64, parent_id: Option<i64>, depth: u32, is_folder: bool) -> Item {
        Item {
            id,
            container_kind: ContainerKind::Course,
            container_id: 1,
            parent_id,
            name: format!("item-{id}"),
            is_folder,
            depth,
            leaf_payload_ref: if is_folder { None } else { Some(id * 100) },
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    /// 1 (folder)
    /// ├── 4 (folder)
    /// │   └── 6 (leaf)
    /// └── 2 (leaf)
    /// 3 (leaf)
    fn sample() -> ItemArena {
        ItemArena::new(vec![
            item(6, Some(4), 2, false),
            item(1, None, 0, true),
            item(2, Some(1), 1, false),
            item(3, None, 0, false),
            item(4, Some(1), 1, true),
        ])
    }

    #[test]
    fn test_children_sorted_by_id() {
        let arena = sample();
        assert_eq!(arena.children(None), &[1, 3]);
        assert_eq!(arena.children(Some(1)), &[2, 4]);
        assert!(arena.children(Some(2)).is_empty());
    }

    #[test]
    fn test_ancestry_walks_to_root() {
        let arena = sample();
        assert_eq!(arena.ancestry(6), vec![6, 4, 1]);
        assert_eq!(arena.ancestry(3), vec![3]);
    }

    #[test]
    fn test_ancestry_terminates_on_parent_loop() {
        let arena = ItemArena::new(vec![item(1, Some(2), 1, true), item(2, Some(1), 1, true)]);
        assert_eq!(arena.ancestry(1), vec![1, 2]);
    }

    #[test]
    fn test_is_in_subtree() {
        let arena = sample();
        assert!(arena.is_in_subtree(6, 1));
        assert!(arena.is_in_subtree(1, 1));
        assert!(!arena.is_in_subtree(1, 6));
        assert!(!arena.is_in_subtree(3, 1));
    }

    #[test]
    fn test_subtree_is_preorder_with_levels() {
        let arena = sample();
        assert_eq!(arena.subtree(1), vec![(1, 0), (2, 1), (4, 1), (6, 2)]);
        assert!(arena.subtree(99).is_empty());
    }

    #[test]
    fn test_relative_height() {
        let arena = sample();
        assert_eq!(arena.relative_height(1), 2);
        assert_eq!(arena.relative_height(4), 1);
        assert_eq!(arena.relative_height(3), 0);
    }

    #[test]
    fn test_hierarchy_nests_children() {
        let arena = sample();
        let tree = arena.hierarchy();
        assert_eq!(tree.len(), 2);
        assert_eq!(tree[0].item.id, 1);
        assert_eq!(tree[0].children.len(), 2);
        assert_eq!(tree[0].children[1].children[0].item.id, 6);
        assert_eq!(tree[1].item.id, 3);
    }

    #[test]
    fn test_ordered_leaves_by_depth_then_id() {
        let arena = ItemArena::new(vec![
            item(5, None, 0, false),
            item(3, None, 0, false),
            item(1, None, 0, true),
            item(9, Some(1), 1, false),
        ]);
        let ids: Vec<i64> = arena.ordered_leaves().iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![3, 5, 9]);
    }
}
