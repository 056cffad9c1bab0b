//! Managed text blocks
//!
//! A block is the run of lines between `# >>> deskforge:<name> >>>` and
//! `# <<< deskforge:<name> <<<`. Upserting removes every instance of the
//! named block, then appends a fresh one, so the file ends up with exactly
//! one. A start marker without a matching end marker swallows the rest of
//! the file.

use std::fs;
use std::path::Path;

use crate::error::{DeskforgeError, Result};
use crate::exec::{Action, Executor};
use crate::ui::Reporter;

pub fn begin_marker(name: &str) -> String {
    format!("# >>> deskforge:{name} >>>")
}

pub fn end_marker(name: &str) -> String {
    format!("# <<< deskforge:{name} <<<")
}

/// `text` with every `name` block removed
pub fn strip_blocks(text: &str, name: &str) -> String {
    let begin = begin_marker(name);
    let end = end_marker(name);
    let mut kept = String::with_capacity(text.len());
    let mut inside = false;

    for line in text.split_inclusive('\n') {
        let bare = line.trim_end_matches(['\n', '\r']);
        if inside {
            if bare == end {
                inside = false;
            }
            continue;
        }
        if bare == begin {
            inside = true;
            continue;
        }
        kept.push_str(line);
    }
    kept
}

/// `text` with its `name` blocks replaced by one block holding `content`
pub fn with_block(text: &str, name: &str, content: &str) -> String {
    let mut result = strip_blocks(text, name);
    if !result.is_empty() && !result.ends_with('\n') {
        result.push('\n');
    }
    result.push_str(&begin_marker(name));
    result.push('\n');
    let body = content.trim_end_matches('\n');
    if !body.is_empty() {
        result.push_str(body);
        result.push('\n');
    }
    result.push_str(&end_marker(name));
    result.push('\n');
    result
}

/// Body of the first `name` block in `text`
pub fn read_block(text: &str, name: &str) -> Option<String> {
    let begin = begin_marker(name);
    let end = end_marker(name);
    let mut lines = text.lines().skip_while(|line| *line != begin);
    lines.next()?;

    let body: Vec<&str> = lines.take_while(|line| *line != end).collect();
    Some(body.join("\n"))
}

/// Ensure `file` holds exactly one `name` block with `content`
///
/// Returns whether the file was (or in a dry run, would be) written.
pub fn upsert_text_block(
    exec: &mut dyn Executor,
    ui: &Reporter,
    file: &Path,
    name: &str,
    content: &str,
) -> Result<bool> {
    let current = if file.exists() {
        fs::read_to_string(file).map_err(|e| DeskforgeError::FileReadFailed {
            path: file.display().to_string(),
            reason: e.to_string(),
        })?
    } else {
        String::new()
    };

    let updated = with_block(&current, name, content);
    if updated == current {
        ui.ok(format!("{}: block '{name}' up to date", file.display()));
        return Ok(false);
    }

    exec.execute(Action::WriteFile {
        path: file.to_path_buf(),
        contents: updated,
        mode: None,
        privileged: false,
    })?;
    ui.ok(format!("{}: block '{name}' written", file.display()));
    Ok(true)
}
