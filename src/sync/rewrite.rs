//! In-place setting lines: replace the first match, drop the rest, append
//! when absent

use std::fs;
use std::path::Path;

use regex::Regex;

use crate::config::LineEdit;
use crate::error::{DeskforgeError, Result};
use crate::exec::{Action, Executor, MODE_DATA};
use crate::ui::Reporter;

/// A compiled line edit
#[derive(Debug, Clone)]
pub struct LineRule {
    pub pattern: Regex,
    pub line: String,
    pub create: bool,
}

impl LineRule {
    pub fn compile(edit: &LineEdit, jobs: usize) -> Result<Self> {
        let pattern = Regex::new(&edit.pattern).map_err(|e| DeskforgeError::InvalidPattern {
            pattern: edit.pattern.clone(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            pattern,
            line: edit.rendered_line(jobs),
            create: edit.create,
        })
    }
}

/// Apply `rules` in order to `text`
pub fn apply_rules(text: &str, rules: &[LineRule]) -> String {
    let mut lines: Vec<String> = text.lines().map(str::to_string).collect();

    for rule in rules {
        let mut replaced = false;
        lines.retain_mut(|line| {
            if !rule.pattern.is_match(line) {
                return true;
            }
            if replaced {
                return false;
            }
            replaced = true;
            *line = rule.line.clone();
            true
        });
        if !replaced {
            lines.push(rule.line.clone());
        }
    }

    if lines.is_empty() {
        return String::new();
    }
    let mut result = lines.join("\n");
    result.push('\n');
    result
}

/// Apply `rules` to `file`, writing only when the text changes
///
/// A missing file is created only from rules that allow it; with none, the
/// file is reported and skipped.
pub fn set_lines(
    exec: &mut dyn Executor,
    ui: &Reporter,
    file: &Path,
    rules: &[LineRule],
    privileged: bool,
) -> Result<bool> {
    let (current, applicable): (String, Vec<LineRule>) = if file.exists() {
        let text = fs::read_to_string(file).map_err(|e| DeskforgeError::FileReadFailed {
            path: file.display().to_string(),
            reason: e.to_string(),
        })?;
        (text, rules.to_vec())
    } else {
        let creatable: Vec<LineRule> = rules.iter().filter(|r| r.create).cloned().collect();
        if creatable.is_empty() {
            ui.warn(format!("{} not found, leaving it alone", file.display()));
            return Ok(false);
        }
        (String::new(), creatable)
    };

    let updated = apply_rules(&current, &applicable);
    if updated == current {
        ui.ok(format!("{} already tuned", file.display()));
        return Ok(false);
    }

    exec.execute(Action::WriteFile {
        path: file.to_path_buf(),
        contents: updated,
        mode: Some(MODE_DATA),
        privileged,
    })?;
    ui.ok(format!("{} tuned", file.display()));
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exec::SystemExecutor;
    use tempfile::TempDir;

    fn rule(pattern: &str, line: &str, create: bool) -> LineRule {
        LineRule {
            pattern: Regex::new(pattern).unwrap(),
            line: line.to_string(),
            create,
        }
    }

    #[test]
    fn test_first_match_replaced_later_matches_removed() {
        let text = "#Color\n[options]\nColor\nVerbosePkgLists\n";
        let result = apply_rules(text, &[rule(r"^#?\s*Color\s*$", "Color", false)]);
        assert_eq!(result, "Color\n[options]\nVerbosePkgLists\n");
    }

    #[test]
    fn test_missing_setting_is_appended() {
        let result = apply_rules(
            "vm.dirty_ratio = 10\n",
            &[rule(r"^\s*vm\.swappiness\s*=", "vm.swappiness = 10", true)],
        );
        assert_eq!(result, "vm.dirty_ratio = 10\nvm.swappiness = 10\n");
    }

    #[test]
    fn test_rules_are_idempotent() {
        let rules = [
            rule(r"^#?\s*ParallelDownloads\s*=", "ParallelDownloads = 10", false),
            rule(r"^#?\s*Color\s*$", "Color", false),
        ];
        let once = apply_rules("#ParallelDownloads = 5\n#Color\n", &rules);
        assert_eq!(apply_rules(&once, &rules), once);
    }

    #[test]
    fn test_compile_expands_jobs_and_rejects_bad_patterns() {
        let edit = LineEdit {
            file: "/etc/makepkg.conf".to_string(),
            pattern: r"^#?\s*MAKEFLAGS=".to_string(),
            line: "MAKEFLAGS=\"-j{jobs}\"".to_string(),
            create: false,
        };
        assert_eq!(LineRule::compile(&edit, 8).unwrap().line, "MAKEFLAGS=\"-j8\"");

        let bad = LineEdit {
            pattern: "([".to_string(),
            ..edit
        };
        assert!(matches!(
            LineRule::compile(&bad, 8),
            Err(DeskforgeError::InvalidPattern { .. })
        ));
    }

    #[test]
    fn test_missing_file_without_create_is_skipped_with_warning() {
        let temp = TempDir::new_in(crate::temp::temp_dir_base()).unwrap();
        let file = temp.path().join("journald.conf");
        let ui = Reporter::buffered();
        let mut exec = SystemExecutor::quiet();

        let written = set_lines(
            &mut exec,
            &ui,
            &file,
            &[rule(r"^#?SystemMaxUse=", "SystemMaxUse=200M", false)],
            false,
        )
        .unwrap();

        assert!(!written);
        assert_eq!(ui.warnings(), 1);
        assert!(!file.exists());
    }

    #[test]
    fn test_missing_file_with_create_is_written_once() {
        let temp = TempDir::new_in(crate::temp::temp_dir_base()).unwrap();
        let file = temp.path().join("sysctl.d/99-deskforge.conf");
        let rules = [
            rule(r"^\s*vm\.swappiness\s*=", "vm.swappiness = 10", true),
            rule(r"^\s*vm\.vfs_cache_pressure\s*=", "vm.vfs_cache_pressure = 50", true),
        ];
        let ui = Reporter::buffered();
        let mut exec = SystemExecutor::quiet();

        assert!(set_lines(&mut exec, &ui, &file, &rules, false).unwrap());
        assert!(!set_lines(&mut exec, &ui, &file, &rules, false).unwrap());

        assert_eq!(
            fs::read_to_string(&file).unwrap(),
            "vm.swappiness = 10\nvm.vfs_cache_pressure = 50\n"
        );
        assert_eq!(exec.journal().len(), 1);
    }
}
