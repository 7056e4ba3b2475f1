// src/output/mod.rs

//! Renders loaded repositories: the tree view and the combined Markdown document.

use crate::core_types::AllFilesContent;
use anyhow::Result;
use log::debug;
use std::io::Write;

pub mod file_block;
pub mod tree_view;
pub mod writer; // Manages the output destination

pub use tree_view::render_tree;

/// Writes one Markdown block per path of `paths` that has content.
///
/// Paths are written in the given order (normally tree order). Binary and
/// failed files appear with their placeholder or error marker. Paths absent
/// from `content` are skipped. Returns the number of blocks written.
pub fn write_markdown(
    writer: &mut dyn Write,
    paths: &[String],
    content: &AllFilesContent,
) -> Result<usize> {
    debug!("Starting output generation...");

    let mut written = 0;
    for path in paths {
        let Some(file) = content.get(path) else {
            debug!("No content for '{}', skipping", path);
            continue;
        };
        if written > 0 {
            // Add a blank line separator between file blocks
            writeln!(writer)?;
        }
        file_block::write_file_block(writer, path, &file.display_text())?;
        written += 1;
    }

    debug!("Output generation complete: {} block(s).", written);
    writer.flush()?;
    Ok(written)
}
