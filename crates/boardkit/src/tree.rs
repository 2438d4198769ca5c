use crate::api::BoardClient;
use crate::config::Config;
use crate::prelude::{println, *};
use boardkit_core::tree::{EntityKind, TreeNode};
use colored::Colorize;
use serde::{Deserialize, Serialize};

#[derive(Debug, clap::Args, Serialize, Deserialize, Clone)]
#[command(after_help = "EXAMPLES:
  # Whole hierarchy:
  boardkit tree

  # Only the first two levels below a space:
  boardkit tree --root 3f2a... --depth 2")]
pub struct TreeOptions {
    /// Start below this entity uid (default: top level)
    #[arg(long)]
    pub root: Option<String>,

    /// Maximum nesting depth, 0 for unlimited
    #[arg(short, long, default_value = "0")]
    pub depth: usize,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, clap::Args, Serialize, Deserialize, Clone)]
pub struct ChildrenOptions {
    /// Parent entity uid (default: top level)
    #[arg(long)]
    pub parent: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Flatten a tree depth-first into `(depth, node)` pairs, in display order
fn flatten(nodes: &[TreeNode]) -> Vec<(usize, &TreeNode)> {
    fn walk<'a>(nodes: &'a [TreeNode], depth: usize, out: &mut Vec<(usize, &'a TreeNode)>) {
        for node in nodes {
            out.push((depth, node));
            walk(&node.children, depth + 1, out);
        }
    }

    let mut out = Vec::new();
    walk(nodes, 0, &mut out);
    out
}

fn kind_label(kind: EntityKind) -> colored::ColoredString {
    match kind {
        EntityKind::Space => kind.as_str().bold().cyan(),
        EntityKind::Folder => kind.as_str().bright_yellow(),
        EntityKind::Document => kind.as_str().bright_black(),
    }
}

pub async fn run_tree(options: TreeOptions, global: crate::Global) -> Result<()> {
    let config = Config::from_global(&global)?;
    let client = BoardClient::connect(&config);

    let result = client
        .build_tree(options.root.as_deref(), options.depth)
        .await;
    client.close().await;
    let nodes = result?;

    if options.json {
        println!("{}", serde_json::to_string_pretty(&nodes)?);
        return Ok(());
    }

    if nodes.is_empty() {
        println!("No entities found.");
        return Ok(());
    }

    for (depth, node) in flatten(&nodes) {
        println!(
            "{}{} {} {}",
            "  ".repeat(depth),
            kind_label(node.kind),
            node.title.bright_white(),
            node.uid.bright_black()
        );
    }

    let total: usize = nodes.iter().map(TreeNode::count).sum();
    if global.verbose {
        println!();
        println!("{total} entities");
    }

    Ok(())
}

pub async fn run_children(options: ChildrenOptions, global: crate::Global) -> Result<()> {
    let config = Config::from_global(&global)?;
    let client = BoardClient::connect(&config);

    let result = client.list_children(options.parent.as_deref()).await;
    client.close().await;
    let children = result?;

    if options.json {
        println!("{}", serde_json::to_string_pretty(&children)?);
    } else if children.is_empty() {
        println!("No children found.");
    } else {
        let mut table = new_table();
        table.add_row(prettytable::row![
            "Kind".bold().cyan(),
            "Title".bold().cyan(),
            "UID".bold().cyan(),
            "ID".bold().cyan()
        ]);
        for child in &children {
            table.add_row(prettytable::row![
                kind_label(child.kind),
                child.title.bright_white(),
                child.uid.bright_black(),
                child
                    .id
                    .map(|id| id.to_string())
                    .unwrap_or_else(|| "-".to_string())
                    .green()
            ]);
        }
        table.printstd();
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(uid: &str, children: Vec<TreeNode>) -> TreeNode {
        TreeNode {
            kind: EntityKind::Folder,
            uid: uid.to_string(),
            id: None,
            title: uid.to_string(),
            parent_uid: None,
            children,
        }
    }

    #[test]
    fn test_flatten_depth_first() {
        let nodes = vec![
            node("a", vec![node("a1", vec![node("a1x", vec![])]), node("a2", vec![])]),
            node("b", vec![]),
        ];

        let flat: Vec<_> = flatten(&nodes)
            .into_iter()
            .map(|(depth, n)| (depth, n.uid.as_str()))
            .collect();

        assert_eq!(
            flat,
            vec![(0, "a"), (1, "a1"), (2, "a1x"), (1, "a2"), (0, "b")]
        );
    }
}
