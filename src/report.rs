//! # Result Rendering
//!
//! Turns a finished [`BatchResult`] into the text printed after the live
//! progress view: one rounded box per repository with its captured output,
//! a compact table for `status`, and a footer with totals and elapsed time.
//!
//! Every function returns a `String`; printing is the caller's business.

use std::fmt::Write as _;

use console::measure_text_width;

use crate::batch::{BatchResult, OperationOutcome};
use crate::output::OutputConfig;
use crate::status::StatusSummary;

/// Which repositories get a full box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expand {
    /// Every repository with output, successful or not.
    All,
    /// Only failures; successes collapse to one line.
    FailuresOnly,
}

/// Boxes (or one-liners) for every repository, then the footer.
pub fn render_results(result: &BatchResult, config: &OutputConfig, expand: Expand) -> String {
    let mut out = String::new();
    for outcome in &result.outcomes {
        let boxed = outcome.failed || (expand == Expand::All && outcome.has_output());
        if boxed {
            out.push_str(&render_box(&result.label, outcome, config));
        } else {
            let _ = writeln!(
                out,
                "{} {}",
                config.symbol_success(),
                config.repo_name(&outcome.repo_name)
            );
        }
    }
    out.push('\n');
    out.push_str(&render_footer(result, config));
    out
}

/// One repository's output in a rounded box.
pub fn render_box(label: &str, outcome: &OperationOutcome, config: &OutputConfig) -> String {
    let symbol = if outcome.failed {
        config.symbol_error()
    } else {
        config.symbol_success()
    };
    let title = format!(" {} {} ", symbol, config.repo_name(&outcome.repo_name));

    let mut body = vec![config.dim(format!("$ {}", label)).to_string()];
    if let Some(error) = &outcome.error {
        body.push(config.error(error).to_string());
    }
    body.extend(display_lines(&outcome.stdout));
    let stderr = display_lines(&outcome.stderr);
    if !stderr.is_empty() {
        body.push(config.warning("stderr:").to_string());
        body.extend(stderr);
    }

    let inner = body
        .iter()
        .map(|line| measure_text_width(line))
        .chain(std::iter::once(measure_text_width(&title)))
        .max()
        .unwrap_or(0);

    let mut out = String::new();
    let top_fill = "─".repeat(inner + 1 - measure_text_width(&title));
    let _ = writeln!(
        out,
        "{}{}{}",
        config.border("╭─", outcome.failed),
        title,
        config.border(format!("{}╮", top_fill), outcome.failed)
    );
    for line in &body {
        let pad = " ".repeat(inner - measure_text_width(line));
        let _ = writeln!(
            out,
            "{} {}{} {}",
            config.border("│", outcome.failed),
            line,
            pad,
            config.border("│", outcome.failed)
        );
    }
    let _ = writeln!(
        out,
        "{}",
        config.border(format!("╰{}╯", "─".repeat(inner + 2)), outcome.failed)
    );
    out
}

/// `Total: N | Successful: S | Failed: F | Time: X.Ys`
pub fn render_footer(result: &BatchResult, config: &OutputConfig) -> String {
    let failed = result.failed();
    let failed_text = format!("Failed: {}", failed);
    let failed_text = if failed > 0 {
        config.error(failed_text).to_string()
    } else {
        failed_text
    };
    format!(
        "Total: {} | {} | {} | Time: {:.1}s\n",
        result.total(),
        config.success(format!("Successful: {}", result.succeeded())),
        failed_text,
        result.elapsed.as_secs_f64()
    )
}

/// One line per repository summarising its status, then the footer.
pub fn render_status_table(result: &BatchResult, config: &OutputConfig) -> String {
    let width = result
        .outcomes
        .iter()
        .map(|o| measure_text_width(&o.repo_name))
        .max()
        .unwrap_or(0);

    let mut out = String::new();
    for outcome in &result.outcomes {
        let name = config.repo_name(format!("{:<width$}", outcome.repo_name, width = width));
        match (&outcome.summary, outcome.failed) {
            (Some(summary), false) => {
                let _ = writeln!(
                    out,
                    "{}  {}  {}",
                    config.symbol_success(),
                    name,
                    status_cells(summary, config)
                );
            }
            _ => {
                let _ = writeln!(
                    out,
                    "{}  {}  {}",
                    config.symbol_error(),
                    name,
                    config.error("failed")
                );
            }
        }
    }
    out
}

/// `branch[|STATE p/q]  ↑a ↓b  !c conflict +s staged ~m modified ?u untracked`
pub fn status_cells(summary: &StatusSummary, config: &OutputConfig) -> String {
    let mut branch = summary.branch.clone();
    if let Some(state) = summary.special_state {
        let _ = write!(branch, "|{}", state);
        if let Some(progress) = summary.progress {
            let _ = write!(branch, " {}", progress);
        }
    }
    let branch = match summary.special_state {
        Some(_) => config.warning(branch).to_string(),
        None => config.command(branch).to_string(),
    };
    let mut cells = vec![branch];

    let mut divergence = Vec::new();
    if summary.ahead > 0 {
        divergence.push(config.success(format!("↑{}", summary.ahead)).to_string());
    }
    if summary.behind > 0 {
        divergence.push(config.error(format!("↓{}", summary.behind)).to_string());
    }
    if !divergence.is_empty() {
        cells.push(divergence.join(" "));
    }

    if summary.is_clean() {
        cells.push(config.success("clean").to_string());
        return cells.join("  ");
    }

    let mut changes = Vec::new();
    if summary.conflicts > 0 {
        changes.push(
            config
                .error(format!("!{} conflict", summary.conflicts))
                .to_string(),
        );
    }
    if summary.staged > 0 {
        changes.push(
            config
                .success(format!("+{} staged", summary.staged))
                .to_string(),
        );
    }
    if summary.modified > 0 {
        changes.push(
            config
                .warning(format!("~{} modified", summary.modified))
                .to_string(),
        );
    }
    if summary.untracked > 0 {
        changes.push(
            config
                .dim(format!("?{} untracked", summary.untracked))
                .to_string(),
        );
    }
    cells.push(changes.join(" "));
    cells.join("  ")
}

/// Captured bytes as display lines: tabs expanded, progress rewrites
/// (`\r`) collapsed to their last state, blank edges dropped.
fn display_lines(bytes: &[u8]) -> Vec<String> {
    let text = String::from_utf8_lossy(bytes);
    let lines: Vec<String> = text
        .lines()
        .map(|line| {
            let line = line.trim_end_matches('\r');
            let line = line.rsplit('\r').next().unwrap_or(line);
            line.replace('\t', "    ").trim_end().to_string()
        })
        .collect();

    let start = lines.iter().position(|l| !l.is_empty());
    let end = lines.iter().rposition(|l| !l.is_empty());
    match (start, end) {
        (Some(start), Some(end)) => lines[start..=end].to_vec(),
        _ => Vec::new(),
    }
}
