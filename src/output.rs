//! Terminal output formatting for the assetpack CLI.
//!
//! Cargo-style status lines with right-aligned coloured verbs.
//! All status output goes to stderr; stdout is reserved for `--json`.

use std::io::{self, IsTerminal, Write};

use crate::report::{BuildReport, Severity};

/// ANSI escape codes.
const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const RED: &str = "\x1b[31m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const CYAN: &str = "\x1b[36m";

/// Width for right-aligned verb column.
const VERB_WIDTH: usize = 12;

/// Terminal-aware status printer.
///
/// Colour is enabled when stderr is a terminal.
pub struct Printer {
    color: bool,
    verbose: bool,
}

impl Printer {
    pub fn new(verbose: bool) -> Self {
        Self {
            color: io::stderr().is_terminal(),
            verbose,
        }
    }

    /// Print a status line with a green bold verb.
    /// e.g. "   Compiling code:main (412 B)"
    pub fn status(&self, verb: &str, message: &str) {
        self.print_line(GREEN, verb, message);
    }

    /// Print an informational line with a cyan bold verb.
    pub fn info(&self, verb: &str, message: &str) {
        self.print_line(CYAN, verb, message);
    }

    /// Print a warning line with a yellow bold verb.
    pub fn warning(&self, verb: &str, message: &str) {
        self.print_line(YELLOW, verb, message);
    }

    /// Print an error line with a red bold verb.
    pub fn error(&self, verb: &str, message: &str) {
        self.print_line(RED, verb, message);
    }

    /// Format a string as dim/grey.
    pub fn dim(&self, text: &str) -> String {
        if self.color {
            format!("{DIM}{text}{RESET}")
        } else {
            text.to_string()
        }
    }

    /// Print everything a build did, then a one-line summary.
    pub fn report(&self, report: &BuildReport) {
        for entry in &report.compiled {
            let size = if entry.compressed {
                format!(
                    "{} {}",
                    format_size(entry.stored_len),
                    self.dim(&format!("(from {})", format_size(entry.raw_len)))
                )
            } else {
                format_size(entry.stored_len)
            };
            self.status("Compiling", &format!("{} {}", entry.key, size));
        }

        if self.verbose {
            for key in &report.fresh {
                self.info("Fresh", &key.to_string());
            }
        }

        for key in &report.pruned {
            self.info("Pruned", &key.to_string());
        }

        for d in &report.diagnostics {
            let subject = match &d.entry {
                Some(key) => format!("{}: {}", key, d.message),
                None => d.message.clone(),
            };
            match d.severity {
                Severity::Warning => self.warning("warning", &subject),
                Severity::Error => self.error("error", &subject),
            }
            if let Some(help) = &d.help {
                self.print_line(CYAN, "help", &self.dim(help));
            }
        }

        let mut summary = format!(
            "{} compiled, {} fresh, {} pruned",
            report.compiled.len(),
            report.fresh.len(),
            report.pruned.len()
        );
        if report.has_errors() {
            summary.push_str(&format!(
                " ({})",
                plural(report.error_count(), "error", "errors")
            ));
        }
        self.status("Finished", &summary);
    }

    fn print_line(&self, color: &str, verb: &str, message: &str) {
        let mut stderr = io::stderr().lock();
        if self.color {
            let _ = writeln!(
                stderr,
                "{BOLD}{color}{verb:>VERB_WIDTH$}{RESET} {message}"
            );
        } else {
            let _ = writeln!(stderr, "{verb:>VERB_WIDTH$} {message}");
        }
    }
}

/// Pluralize a count: `plural(1, "error", "errors")` → "1 error".
pub fn plural(n: usize, singular: &str, pluralized: &str) -> String {
    if n == 1 {
        format!("{} {}", n, singular)
    } else {
        format!("{} {}", n, pluralized)
    }
}

/// Human-readable byte count.
pub fn format_size(bytes: usize) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else {
        format!("{:.1} KiB", bytes as f64 / 1024.0)
    }
}

/// Return a relative display path when possible, absolute otherwise.
pub fn display_path(path: &std::path::Path) -> String {
    if let Ok(cwd) = std::env::current_dir() {
        if let Ok(relative) = path.strip_prefix(&cwd) {
            let s = relative.display().to_string();
            if s.is_empty() {
                return ".".to_string();
            }
            return s;
        }
    }
    path.display().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plural() {
        assert_eq!(plural(1, "error", "errors"), "1 error");
        assert_eq!(plural(0, "error", "errors"), "0 errors");
        assert_eq!(plural(5, "entry", "entries"), "5 entries");
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(0), "0 B");
        assert_eq!(format_size(1023), "1023 B");
        assert_eq!(format_size(65536), "64.0 KiB");
        assert_eq!(format_size(1536), "1.5 KiB");
    }

    #[test]
    fn test_display_path_absolute() {
        use std::path::Path;
        // An absolute path outside cwd should stay absolute
        let p = Path::new("/nonexistent/path/to/game.db");
        assert_eq!(display_path(p), "/nonexistent/path/to/game.db");
    }
}
