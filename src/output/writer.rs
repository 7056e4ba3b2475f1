// src/output/writer.rs

//! Manages the output destination (stdout, file, or clipboard).
//!
//! This module provides functions to set up the appropriate `Write` trait object
//! for the chosen destination and to handle finalization steps, such as
//! copying the output to the clipboard.

#[cfg(feature = "clipboard")]
use crate::errors::ClipboardError;
#[cfg(feature = "clipboard")]
use anyhow::anyhow;
use anyhow::{Context, Result};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

/// Where generated Markdown goes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum OutputDestination {
    /// Standard output.
    #[default]
    Stdout,
    /// A file, created or truncated.
    File(PathBuf),
    /// The system clipboard.
    #[cfg(feature = "clipboard")]
    Clipboard,
}

/// The configured output writer and, for the clipboard, the buffer behind it.
pub struct OutputWriterSetup {
    /// A boxed `Write` trait object that can be written to.
    pub writer: Box<dyn Write + Send>,
    /// Holds the buffer only if the destination is Clipboard, so its content
    /// can be copied once all writes are complete.
    pub clipboard_buffer: Option<Arc<Mutex<Vec<u8>>>>,
}

/// Creates the writer for `destination`.
///
/// # Errors
/// Returns an error if a file cannot be created for writing.
pub fn setup_output_writer(destination: &OutputDestination) -> Result<OutputWriterSetup> {
    #[cfg_attr(not(feature = "clipboard"), allow(unused_mut))]
    let mut clipboard_buffer = None;
    let writer: Box<dyn Write + Send> = match destination {
        OutputDestination::Stdout => Box::new(io::stdout()),
        OutputDestination::File(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file '{}'", path.display()))?;
            Box::new(BufWriter::new(file))
        }
        #[cfg(feature = "clipboard")]
        OutputDestination::Clipboard => {
            let buffer = Arc::new(Mutex::new(Vec::<u8>::new()));
            clipboard_buffer = Some(buffer.clone());
            Box::new(ArcMutexVecWriter(buffer))
        }
    };
    Ok(OutputWriterSetup {
        writer,
        clipboard_buffer,
    })
}

/// Flushes the writer and, for the clipboard destination, copies the buffered
/// output to the system clipboard.
///
/// # Errors
/// Returns an error if flushing or the clipboard operation fails.
#[cfg_attr(not(feature = "clipboard"), allow(unused_variables))]
pub fn finalize_output(
    mut writer: Box<dyn Write + Send>,
    clipboard_buffer: Option<Arc<Mutex<Vec<u8>>>>,
    destination: &OutputDestination,
) -> Result<()> {
    writer.flush()?;

    #[cfg(feature = "clipboard")]
    {
        if *destination == OutputDestination::Clipboard {
            let buffer_arc = clipboard_buffer.ok_or_else(|| {
                anyhow!("Clipboard destination specified, but no buffer found during finalization.")
            })?;
            let buffer = buffer_arc
                .lock()
                .map_err(|e| anyhow!("Failed to lock clipboard buffer mutex: {}", e))?;
            let content = String::from_utf8(buffer.clone())?;
            copy_to_clipboard(&content)?;
            log::info!("Copied {} bytes to the clipboard.", content.len());
        }
    }
    Ok(())
}

#[cfg(feature = "clipboard")]
fn copy_to_clipboard(content: &str) -> Result<(), ClipboardError> {
    use arboard::Clipboard;
    let mut clipboard =
        Clipboard::new().map_err(|e| ClipboardError::Initialization(e.to_string()))?;
    clipboard
        .set_text(content)
        .map_err(|e| ClipboardError::SetContent(e.to_string()))?;
    Ok(())
}

// Local newtype so `Write` can be implemented for the shared buffer.
#[cfg(feature = "clipboard")]
#[derive(Debug, Clone)]
struct ArcMutexVecWriter(Arc<Mutex<Vec<u8>>>);

#[cfg(feature = "clipboard")]
impl Write for ArcMutexVecWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut buffer = self
            .0
            .lock()
            .map_err(|e| io::Error::other(format!("Mutex poisoned: {}", e)))?;
        buffer.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
