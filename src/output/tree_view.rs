use crate::core_types::FileNode;
use anyhow::Result;
use std::io::Write;

/// Writes `nodes` as an indented tree, directories suffixed with `/`.
///
/// ```text
/// ├── src/
/// │   └── main.rs
/// └── README.md
/// ```
pub fn render_tree(writer: &mut dyn Write, nodes: &[FileNode]) -> Result<()> {
    render_level(writer, nodes, "")
}

fn render_level(writer: &mut dyn Write, nodes: &[FileNode], prefix: &str) -> Result<()> {
    for (i, node) in nodes.iter().enumerate() {
        let last = i + 1 == nodes.len();
        let branch = if last { "└── " } else { "├── " };
        let suffix = if node.is_dir() { "/" } else { "" };
        writeln!(writer, "{}{}{}{}", prefix, branch, node.name, suffix)?;

        if let Some(children) = &node.children {
            let child_prefix = format!("{}{}", prefix, if last { "    " } else { "│   " });
            render_level(writer, children, &child_prefix)?;
        }
    }
    Ok(())
}
