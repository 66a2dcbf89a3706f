use crate::error::{Result, StnoError};
use crate::store::unique::allocate;
use std::env;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::SystemTime;
use tracing::debug;

const FALLBACK_EDITOR: &str = "vi";
const BUFFER_PREFIX: &str = "stno";
const BUFFER_SUFFIX: &str = ".toml";

/// Gets the editor command.
/// Checks the configured editor, then $EDITOR, then $VISUAL, then falls back to `vi`.
pub fn get_editor(configured: Option<&str>) -> String {
    pick_editor(
        configured,
        env::var("EDITOR").ok(),
        env::var("VISUAL").ok(),
    )
}

fn pick_editor(configured: Option<&str>, editor: Option<String>, visual: Option<String>) -> String {
    configured
        .map(str::to_string)
        .into_iter()
        .chain(editor)
        .chain(visual)
        .find(|candidate| !candidate.trim().is_empty())
        .unwrap_or_else(|| FALLBACK_EDITOR.to_string())
}

/// Splits an editor command with shell quoting rules, so that
/// `"/opt/My Editor/bin/ed" --wait` is one program plus one argument.
fn editor_command(editor: &str) -> Result<(String, Vec<String>)> {
    let mut parts = shell_words::split(editor)
        .map_err(|e| StnoError::Editor(format!("Invalid editor command '{}': {}", editor, e)))?
        .into_iter();
    let program = parts
        .next()
        .ok_or_else(|| StnoError::Editor("Editor command is empty".to_string()))?;
    Ok((program, parts.collect()))
}

/// Opens a file in the editor and waits for it to close. The editor command
/// may carry arguments (`code --wait`); the file path is appended last.
pub fn open_in_editor<P: AsRef<Path>>(editor: &str, file_path: P) -> Result<()> {
    let (program, args) = editor_command(editor)?;

    let status = Command::new(&program)
        .args(&args)
        .arg(file_path.as_ref())
        .status()
        .map_err(|e| StnoError::Editor(format!("Failed to launch editor '{}': {}", editor, e)))?;

    if !status.success() {
        return Err(StnoError::Editor(format!(
            "Editor '{}' exited with non-zero status",
            editor
        )));
    }
    Ok(())
}

/// A temporary file in the OS temp dir that is handed to the editor.
/// The file is removed when the buffer is dropped.
#[derive(Debug)]
pub struct EditBuffer {
    path: PathBuf,
}

impl EditBuffer {
    pub fn create(initial: &str) -> Result<Self> {
        let (path, mut file) = allocate(&env::temp_dir(), BUFFER_PREFIX, BUFFER_SUFFIX)?;
        let buffer = Self { path };
        file.write_all(initial.as_bytes())?;
        file.flush()?;
        Ok(buffer)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn read(&self) -> Result<String> {
        Ok(fs::read_to_string(&self.path)?)
    }

    /// Runs the editor on the buffer. Returns the new text, or `None` when the
    /// editor left the file untouched.
    pub fn edit(&self, editor: &str) -> Result<Option<String>> {
        let before = self.modified()?;
        open_in_editor(editor, &self.path)?;
        if self.modified()? == before {
            debug!(path = %self.path.display(), "editor made no changes");
            return Ok(None);
        }
        self.read().map(Some)
    }

    fn modified(&self) -> Result<SystemTime> {
        Ok(fs::metadata(&self.path)?.modified()?)
    }
}

impl Drop for EditBuffer {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.path) {
            debug!(path = %self.path.display(), error = %e, "could not remove edit buffer");
        }
    }
}

/// Opens an editor with initial content and returns the edited content, or
/// `None` if nothing was saved.
pub fn edit_text(editor: &str, initial: &str) -> Result<Option<String>> {
    EditBuffer::create(initial)?.edit(editor)
}
