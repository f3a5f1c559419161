use std::io::{self, IsTerminal, Write};

use owo_colors::OwoColorize;
use tracing_subscriber::EnvFilter;

use crate::export::Summary;

/// Colour only when stderr is a terminal and NO_COLOR is unset.
pub fn use_color() -> bool {
    std::env::var_os("NO_COLOR").is_none() && io::stderr().is_terminal()
}

/// Log to stderr. RUST_LOG wins over the -v count when set.
pub fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_ansi(use_color())
        .with_target(false)
        .init();
}

pub fn summary_line(summary: &Summary, color: bool) -> String {
    let ok = format!("✓ {}", summary.formatted);
    let failed = format!("✗ {}", summary.failed);
    let mut line = if color {
        format!("{}  {}", ok.green(), failed.red())
    } else {
        format!("{ok}  {failed}")
    };
    if summary.skipped > 0 {
        let note = format!("({} attachments or notes skipped)", summary.skipped);
        if color {
            line.push_str(&format!("  {}", note.dimmed()));
        } else {
            line.push_str(&format!("  {note}"));
        }
    }
    line
}

pub fn print_summary(summary: &Summary) -> io::Result<()> {
    writeln!(io::stderr().lock(), "{}", summary_line(summary, use_color()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_summary() {
        let s = Summary { formatted: 3, skipped: 0, failed: 1 };
        assert_eq!(summary_line(&s, false), "✓ 3  ✗ 1");
    }

    #[test]
    fn summary_mentions_skipped_attachments() {
        let s = Summary { formatted: 2, skipped: 4, failed: 0 };
        assert_eq!(summary_line(&s, false), "✓ 2  ✗ 0  (4 attachments or notes skipped)");
    }

    #[test]
    fn coloured_summary_has_same_text() {
        let s = Summary { formatted: 5, skipped: 1, failed: 2 };
        let coloured = summary_line(&s, true);
        let stripped = String::from_utf8(strip_ansi_escapes::strip(coloured.as_bytes())).unwrap();
        assert_eq!(stripped, summary_line(&s, false));
    }
}
