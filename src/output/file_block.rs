use anyhow::Result;
use std::io::Write;

/// Writes a single file's header and fenced content block.
///
/// The fence's language hint is the file extension, or nothing if the file
/// has none. The fence is one backtick longer than the longest backtick run
/// in `content`, and never shorter than three. Content is written as-is; a
/// trailing newline is added only if missing.
pub fn write_file_block(writer: &mut dyn Write, path: &str, content: &str) -> Result<()> {
    log::debug!("Writing block for '{}'", path);
    writeln!(writer, "## File: {}", path)?;

    let file_name = path.rsplit('/').next().unwrap_or(path);
    let extension_hint = match file_name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => ext,
        _ => "",
    };
    let fence = "`".repeat(longest_backtick_run(content).max(2) + 1);
    writeln!(writer, "{}{}", fence, extension_hint)?;

    if !content.is_empty() {
        write!(writer, "{}", content)?;
        if !content.ends_with('\n') {
            writeln!(writer)?;
        }
    }
    writeln!(writer, "{}", fence)?;
    Ok(())
}

fn longest_backtick_run(content: &str) -> usize {
    content
        .split(|c| c != '`')
        .map(str::len)
        .max()
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn render(path: &str, content: &str) -> String {
        let mut writer = Cursor::new(Vec::new());
        write_file_block(&mut writer, path, content).unwrap();
        String::from_utf8(writer.into_inner()).unwrap()
    }

    #[test]
    fn test_write_file_block_basic() {
        assert_eq!(
            render("src/main.rs", "fn main() {\n    println!(\"Hi\");\n}\n"),
            "## File: src/main.rs\n```rs\nfn main() {\n    println!(\"Hi\");\n}\n```\n"
        );
    }

    #[test]
    fn test_write_file_block_no_extension_or_newline() {
        assert_eq!(render("Makefile", "all: build"), "## File: Makefile\n```\nall: build\n```\n");
        assert_eq!(render(".gitignore", "target/"), "## File: .gitignore\n```\ntarget/\n```\n");
    }

    #[test]
    fn test_write_file_block_widens_fence_around_backticks() {
        let readme = "Usage:\n```sh\nrun\n```\n";
        assert_eq!(
            render("README.md", readme),
            "## File: README.md\n````md\nUsage:\n```sh\nrun\n```\n````\n"
        );
        assert_eq!(
            render("notes.txt", "````` five"),
            "## File: notes.txt\n``````txt\n````` five\n``````\n"
        );
    }

    #[test]
    fn test_write_file_block_empty_file() {
        assert_eq!(render("empty.txt", ""), "## File: empty.txt\n```txt\n```\n");
    }
}
