//! REPL session management

use std::path::PathBuf;

use colored::Colorize;
use eyre::Result;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing::debug;

use crate::debate::Debate;
use crate::ui::{TerminalRenderer, format_report, format_stats};

/// Interactive REPL session
pub struct ReplSession {
    debate: Debate,
    renderer: TerminalRenderer,
    root: PathBuf,
}

impl ReplSession {
    /// Create a new REPL session
    pub fn new(debate: Debate, root: PathBuf, verbose: bool) -> Self {
        debug!(?root, %verbose, "ReplSession::new: called");
        Self {
            debate,
            renderer: TerminalRenderer::new(verbose),
            root,
        }
    }

    /// Run the REPL main loop
    pub async fn run(&mut self) -> Result<()> {
        self.print_welcome();

        let mut rl = DefaultEditor::new().map_err(|e| eyre::eyre!("Failed to initialize readline: {}", e))?;

        loop {
            let readline = rl.readline(&format!("{} ", ">".bright_green()));

            match readline {
                Ok(line) => {
                    let input = line.trim();
                    if input.is_empty() {
                        continue;
                    }

                    let _ = rl.add_history_entry(input);

                    if input.starts_with('/') {
                        match self.handle_slash_command(input) {
                            SlashResult::Continue => continue,
                            SlashResult::Quit => break,
                        }
                    } else {
                        self.process_user_input(input).await;
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("^C");
                    continue;
                }
                Err(ReadlineError::Eof) => {
                    println!();
                    break;
                }
                Err(err) => {
                    return Err(eyre::eyre!("Readline error: {}", err));
                }
            }
        }

        println!("Goodbye!");
        Ok(())
    }

    fn print_welcome(&self) {
        println!();
        println!("{}", "Formally MAD".bright_cyan().bold());
        println!("Working directory: {}", self.root.display());
        println!(
            "Workers: {} | up to {} tool rounds per request",
            self.debate.worker_ids().join(", "),
            self.debate.max_rounds()
        );
        println!("Type {} for help, {} to quit", "/help".yellow(), "/quit".yellow());
        println!();
    }

    /// Handle slash commands
    pub fn handle_slash_command(&mut self, input: &str) -> SlashResult {
        debug!(%input, "ReplSession::handle_slash_command: called");
        let cmd = input.split_whitespace().next().unwrap_or("");

        match cmd {
            "/help" | "/h" => {
                self.print_help();
                SlashResult::Continue
            }
            "/quit" | "/q" | "/exit" => SlashResult::Quit,
            "/stats" | "/s" => {
                self.print_stats();
                SlashResult::Continue
            }
            _ => {
                println!("{} Unknown command: {}", "?".yellow(), cmd);
                println!("Type {} for available commands", "/help".yellow());
                SlashResult::Continue
            }
        }
    }

    fn print_help(&self) {
        println!();
        println!("{}", "Available Commands:".bright_cyan());
        println!("  {:14} Show this help", "/help".yellow());
        println!("  {:14} Exit the REPL", "/quit".yellow());
        println!("  {:14} Show session counters and the last resolution", "/stats".yellow());
        println!();
        println!("{}", "Tools the workers choose from:".bright_cyan());
        println!("  {:18} Read a file", "read_file".yellow());
        println!("  {:18} List a directory", "list_files".yellow());
        println!("  {:18} Create or edit a file", "edit_file".yellow());
        println!("  {:18} Create a directory", "create_directory".yellow());
        println!("  {:18} Answer without a tool", crate::tools::SKIP_ACTION.yellow());
        println!();
    }

    fn print_stats(&self) {
        println!();
        print!("{}", format_stats(self.debate.stats()));
        match self.debate.resolver().last_run() {
            Some(report) => {
                println!("{}", "Last resolution".bright_cyan());
                print!("{}", format_report(&report));
            }
            None => println!("{}", "No resolution yet.".dimmed()),
        }
        println!();
    }

    /// Run one debate turn and print the answer or the error
    async fn process_user_input(&mut self, input: &str) {
        debug!(input_len = input.len(), "ReplSession::process_user_input: called");
        let cancel = self.debate.cancel_flag();
        let watcher = tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        });

        let outcome = self.debate.run_turn(input, &mut self.renderer).await;
        watcher.abort();

        match outcome {
            Ok(outcome) => {
                println!();
                if outcome.exhausted {
                    println!("{}", format!("[round limit of {} reached]", outcome.rounds).yellow());
                }
                println!("{}", outcome.answer);
            }
            Err(e) => {
                println!();
                println!("{} {}", "Error:".red(), e);
            }
        }
        println!();
    }
}

/// Result of handling a slash command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlashResult {
    Continue,
    Quit,
}
