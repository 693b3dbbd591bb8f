//! Plain-text rendering of item hierarchies and learning paths.

use crate::models::{ItemNode, RelationPath};

const FOLDER: char = '▸';
const LEAF: char = '•';

fn kind_symbol(node: &ItemNode) -> char {
    if node.item.is_folder {
        FOLDER
    } else {
        LEAF
    }
}

/// Render an item hierarchy as an ASCII tree.
///
/// Example output:
/// ```text
/// ▸ Module 1
/// ├── • Welcome
/// └── ▸ Basics
///     └── • Variables
/// • Wrap-up
/// ```
pub fn render_hierarchy(nodes: &[ItemNode]) -> String {
    let mut output = String::new();
    for (i, node) in nodes.iter().enumerate() {
        let is_last = i == nodes.len() - 1;
        render_node(&mut output, node, "", is_last, true);
    }
    output
}

fn render_node(output: &mut String, node: &ItemNode, prefix: &str, is_last: bool, is_root: bool) {
    if !is_root {
        output.push_str(prefix);
        output.push_str(if is_last { "└── " } else { "├── " });
    }
    output.push(kind_symbol(node));
    output.push(' ');
    output.push_str(&node.item.name);
    output.push('\n');

    let child_prefix = if is_root {
        String::new()
    } else {
        let continuation = if is_last { "    " } else { "│   " };
        format!("{}{}", prefix, continuation)
    };

    for (i, child) in node.children.iter().enumerate() {
        let child_is_last = i == node.children.len() - 1;
        render_node(output, child, &child_prefix, child_is_last, false);
    }
}

/// Render a learning path as a numbered list, one item per line.
///
/// Returns `"(no learning path)\n"` when the path has no start point.
pub fn render_path(path: &RelationPath) -> String {
    if path.items.is_empty() {
        return "(no learning path)\n".to_string();
    }

    let width = path.items.len().to_string().len();
    path.items
        .iter()
        .map(|entry| {
            format!(
                "{:>width$}. {} (#{})\n",
                entry.order,
                entry.name,
                entry.item_id,
                width = width
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ContainerKind, Item, PathEntry};
    use chrono::Utc;

    fn make_node(id: i64, name: &str, is_folder: bool, children: Vec<ItemNode>) -> ItemNode {
        ItemNode {
            item: Item {
                id,
                container_kind: ContainerKind::Course,
                container_id: 1,
                parent_id: None,
                name: name.to_string(),
                is_folder,
                depth: 0,
                leaf_payload_ref: (!is_folder).then_some(100 + id),
                created_at: Utc::now(),
                updated_at: Utc::now(),
            },
            children,
        }
    }

    #[test]
    fn test_single_root() {
        let tree = vec![make_node(1, "Module 1", true, vec![])];
        assert_eq!(render_hierarchy(&tree), "▸ Module 1\n");
    }

    #[test]
    fn test_empty_hierarchy() {
        assert_eq!(render_hierarchy(&[]), "");
    }

    #[test]
    fn test_nested_children() {
        let tree = vec![
            make_node(
                1,
                "Module 1",
                true,
                vec![
                    make_node(2, "Welcome", false, vec![]),
                    make_node(
                        3,
                        "Basics",
                        true,
                        vec![
                            make_node(4, "Variables", false, vec![]),
                            make_node(5, "Loops", false, vec![]),
                        ],
                    ),
                ],
            ),
            make_node(6, "Wrap-up", false, vec![]),
        ];
        let expected = "▸ Module 1\n├── • Welcome\n└── ▸ Basics\n    ├── • Variables\n    └── • Loops\n• Wrap-up\n";
        assert_eq!(render_hierarchy(&tree), expected);
    }

    #[test]
    fn test_path_numbering() {
        let path = RelationPath {
            items: vec![
                PathEntry {
                    item_id: 3,
                    name: "Intro".to_string(),
                    order: 1,
                },
                PathEntry {
                    item_id: 5,
                    name: "Setup".to_string(),
                    order: 2,
                },
            ],
            relations: vec![],
        };
        assert_eq!(render_path(&path), "1. Intro (#3)\n2. Setup (#5)\n");
    }

    #[test]
    fn test_empty_path() {
        assert_eq!(render_path(&RelationPath::default()), "(no learning path)\n");
    }
}
