// src/filtering/binary.rs

// Extensions whose content is never worth fetching as text (case-insensitive check)
const BINARY_EXTENSIONS: &[&str] = &[
    // --- Images ---
    "png", "jpg", "jpeg", "gif", "bmp", "ico", "webp", "tif", "tiff", "psd", "heic", "avif",
    // --- Audio / Video ---
    "mp3", "wav", "ogg", "flac", "aac", "m4a", "mp4", "mov", "avi", "mkv", "webm",
    // --- Archives ---
    "zip", "tar", "gz", "tgz", "bz2", "xz", "7z", "rar", "zst", "jar", "war",
    // --- Fonts ---
    "ttf", "otf", "woff", "woff2", "eot",
    // --- Documents ---
    "pdf", "doc", "docx", "xls", "xlsx", "ppt", "pptx",
    // --- Compiled artifacts ---
    "exe", "dll", "so", "dylib", "a", "lib", "o", "obj", "class", "pyc", "wasm", "rlib",
    // --- Data blobs ---
    "bin", "dat", "db", "sqlite", "sqlite3", "lockb",
];

/// Guesses from the extension whether `path` names a binary file.
///
/// No content is inspected: the point is to avoid fetching the file at all.
///
/// # Examples
/// ```
/// use repo_explorer::filtering::is_binary_path;
///
/// assert!(is_binary_path("assets/logo.PNG"));
/// assert!(!is_binary_path("src/main.rs"));
/// assert!(!is_binary_path("Makefile"));
/// ```
pub fn is_binary_path(path: &str) -> bool {
    let file_name = path.rsplit('/').next().unwrap_or(path);
    match file_name.rsplit_once('.') {
        // `.gitignore` and friends have no extension.
        Some((stem, ext)) if !stem.is_empty() => {
            let ext = ext.to_ascii_lowercase();
            BINARY_EXTENSIONS.contains(&ext.as_str())
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_binary_path() {
        assert!(is_binary_path("image.jpeg"));
        assert!(is_binary_path("dist/app.wasm"));
        assert!(is_binary_path("archive.tar.gz"));
        assert!(!is_binary_path("README.md"));
        assert!(!is_binary_path("config/.env"));
        assert!(!is_binary_path(".png"));
        assert!(!is_binary_path("docs.png/readme.txt"));
    }
}
