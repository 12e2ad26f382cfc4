//! Terminal rendering
//!
//! Formats proposals, resolutions and tool results for the REPL and the
//! `resolve` command. Numbers are shown with four decimals.

use std::fmt::Write as _;

use colored::Colorize;

use crate::debate::{DebateObserver, DebateStats};
use crate::llm::ToolCall;
use crate::resolver::{Proposal, Resolution, ResolutionReport};
use crate::tools::ToolResult;

const MAX_RESULT_CHARS: usize = 2000;

/// Proposals table: proposer, nominated action, motivation
pub fn format_proposals(title: &str, proposals: &[Proposal]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", title.bright_cyan().bold());
    let width = proposals.iter().map(|p| p.action.len()).max().unwrap_or(0);
    for p in proposals {
        let _ = writeln!(
            out,
            "  {} {}  {}",
            format!("{:6}", p.proposer).bright_white(),
            format!("{:width$}", p.action, width = width).yellow(),
            p.motivation.dimmed()
        );
    }
    out
}

/// Winner line followed by action statistics and proposer metrics
pub fn format_report(report: &ResolutionReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} {}", "Selected:".bright_green().bold(), report.winner.bright_white().bold());
    let _ = writeln!(
        out,
        "{}",
        format!(
            "seed {} | {} permutations | {}",
            report.seed, report.permutations, report.semantics
        )
        .dimmed()
    );

    let _ = writeln!(out, "{}", "Actions".bright_cyan());
    let _ = writeln!(
        out,
        "  {:20} {:>13} {:>9} {:>12}",
        "action", "mean_strength", "win_rate", "mean_margin"
    );
    for a in &report.actions {
        let name = format!("{:20}", a.action);
        let name = if a.action == report.winner {
            name.bright_green().to_string()
        } else {
            name
        };
        let _ = writeln!(
            out,
            "  {} {:>13.4} {:>9.4} {:>12.4}",
            name, a.mean_strength, a.win_rate, a.mean_margin
        );
    }

    let _ = writeln!(out, "{}", "Proposers".bright_cyan());
    let _ = writeln!(
        out,
        "  {:10} {:>14} {:>13} {:>17}",
        "proposer", "mean_influence", "influence_std", "proposal_win_rate"
    );
    for p in &report.proposers {
        let _ = writeln!(
            out,
            "  {:10} {:>14.4} {:>13.4} {:>17.4}",
            p.proposer, p.mean_influence, p.influence_std, p.proposal_win_rate
        );
    }
    out
}

/// Tool call and its (possibly truncated) result
pub fn format_tool_result(call: &ToolCall, result: &ToolResult) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} {} {}", "Tool:".bright_yellow(), call.name.bright_white(), call.input.to_string().dimmed());

    let total = result.content.chars().count();
    let shown = if total > MAX_RESULT_CHARS {
        let head: String = result.content.chars().take(MAX_RESULT_CHARS).collect();
        format!("{}... ({} chars total)", head, total)
    } else {
        result.content.clone()
    };

    if result.is_error {
        let _ = writeln!(out, "{} {}", "Error:".red(), shown);
    } else {
        let _ = writeln!(out, "{}", shown.dimmed());
    }
    out
}

/// Session counters for `/stats`
pub fn format_stats(stats: &DebateStats) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", "Session".bright_cyan());
    let _ = writeln!(out, "  {:14} {}", "turns", stats.turns);
    let _ = writeln!(out, "  {:14} {}", "failed turns", stats.failed_turns);
    let _ = writeln!(out, "  {:14} {}", "rounds", stats.rounds);
    let _ = writeln!(out, "  {:14} {} ({} errors)", "tool calls", stats.tool_calls, stats.tool_errors);
    if !stats.wins.is_empty() {
        let _ = writeln!(out, "{}", "Round wins".bright_cyan());
        for (action, wins) in &stats.wins {
            let _ = writeln!(out, "  {:14} {}", action, wins);
        }
    }
    out
}

/// Observer that prints every step of a turn to stdout
#[derive(Debug, Default)]
pub struct TerminalRenderer {
    /// Also print the per-round statistics tables
    pub verbose: bool,
}

impl TerminalRenderer {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

impl DebateObserver for TerminalRenderer {
    fn on_proposals(&mut self, round: u32, proposals: &[Proposal]) {
        println!();
        print!("{}", format_proposals(&format!("Round {} proposals", round), proposals));
    }

    fn on_resolution(&mut self, _round: u32, resolution: &Resolution) {
        if self.verbose {
            print!("{}", format_report(&resolution.report));
        } else {
            println!(
                "{} {}",
                "Selected:".bright_green().bold(),
                resolution.winner.bright_white().bold()
            );
        }
    }

    fn on_tool_result(&mut self, call: &ToolCall, result: &ToolResult) {
        print!("{}", format_tool_result(call, result));
    }
}
