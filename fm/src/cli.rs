//! CLI command definitions and offline resolution

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use eyre::{Context, Result};
use serde::Deserialize;
use tracing::debug;

use crate::config::Config;
use crate::resolver::{Proposal, Resolution, Resolver, ResolverConfig, Roster, RosterEntry};
use crate::ui::{format_proposals, format_report};

/// Formally MAD - multi-agent tool selection by argumentation
#[derive(Parser)]
#[command(
    name = "fm",
    about = "Multi-agent tool selection resolved through quantitative bipolar argumentation",
    version,
    after_help = "Logs are written to: ~/.local/share/formallymad/logs/formallymad.log"
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands
#[derive(Subcommand)]
pub enum Command {
    /// Start an interactive session in the current directory
    Chat,

    /// Resolve a proposal file offline and print the decision
    Resolve {
        /// YAML or JSON file with `roster` and `proposals`
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Sampler seed
        #[arg(long)]
        seed: Option<u64>,

        /// Number of sampled orderings
        #[arg(short, long)]
        permutations: Option<usize>,

        /// Semantics identifier (see `fm semantics`)
        #[arg(short, long)]
        semantics: Option<String>,

        /// Worker threads for permutation evaluation (0 = all CPUs)
        #[arg(long)]
        parallelism: Option<usize>,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,

        /// Also write the natural-order argument graph as Graphviz DOT
        #[arg(short, long, value_name = "PATH")]
        graph: Option<PathBuf>,
    },

    /// List supported semantics identifiers
    Semantics,
}

/// Output format for the resolve command
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "plain" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(format!("Unknown format: {}. Use: text or json", s)),
        }
    }
}

/// Contents of a proposal file
///
/// An empty roster falls back to the configured workers.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProposalFile {
    pub roster: Vec<RosterEntry>,
    pub proposals: Vec<Proposal>,
}

impl ProposalFile {
    /// Load from YAML, or JSON when the extension is `.json`
    pub fn load(path: &Path) -> Result<Self> {
        debug!(?path, "ProposalFile::load: called");
        let content = fs::read_to_string(path).context(format!("Failed to read {}", path.display()))?;
        let is_json = path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        let file = if is_json {
            serde_json::from_str(&content).context("Failed to parse proposal file as JSON")?
        } else {
            serde_yaml::from_str(&content).context("Failed to parse proposal file as YAML")?
        };
        Ok(file)
    }

    /// The file's roster, or the configured workers when it has none
    pub fn roster(&self, config: &Config) -> Result<Roster> {
        let roster = if self.roster.is_empty() {
            config.roster()
        } else {
            Roster::new(self.roster.clone())
        };
        roster.context("Invalid roster")
    }
}

/// Command-line overrides for the resolver section of the config
#[derive(Debug, Clone, Default)]
pub struct ResolveOverrides {
    pub seed: Option<u64>,
    pub permutations: Option<usize>,
    pub semantics: Option<String>,
    pub parallelism: Option<usize>,
}

impl ResolveOverrides {
    /// Apply the overrides on top of the configured resolver settings
    pub fn apply(&self, base: &ResolverConfig) -> ResolverConfig {
        ResolverConfig {
            semantics: self.semantics.clone().unwrap_or_else(|| base.semantics.clone()),
            permutations: self.permutations.unwrap_or(base.permutations),
            seed: self.seed.or(base.seed),
            parallelism: self.parallelism.unwrap_or(base.parallelism),
        }
    }
}

/// Resolve a proposal file and render the result
///
/// With `graph`, the settled natural-order framework is written there as DOT.
pub fn run_resolve(
    config: &Config,
    path: &Path,
    overrides: &ResolveOverrides,
    format: OutputFormat,
    graph: Option<&Path>,
) -> Result<String> {
    debug!(?path, ?format, ?graph, "run_resolve: called");
    let file = ProposalFile::load(path)?;
    let roster = file.roster(config)?;
    let resolver = Resolver::new(roster, &overrides.apply(&config.resolver)).context("Invalid resolver settings")?;
    let resolution = resolver.resolve(&file.proposals).context("Resolution failed")?;

    if let Some(graph) = graph {
        let settled = resolver.natural_framework(&file.proposals).context("Failed to settle the argument graph")?;
        fs::write(graph, settled.to_dot()).context(format!("Failed to write {}", graph.display()))?;
    }

    render_resolution(&file.proposals, &resolution, format)
}

fn render_resolution(proposals: &[Proposal], resolution: &Resolution, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => {
            let mut json = serde_json::to_string_pretty(&resolution.report)?;
            json.push('\n');
            Ok(json)
        }
        OutputFormat::Text => Ok(format!(
            "{}\n{}",
            format_proposals("Proposals", proposals),
            format_report(&resolution.report)
        )),
    }
}

/// One line per supported semantics identifier
pub fn semantics_listing() -> String {
    crate::qbaf::Semantics::ALL
        .iter()
        .map(|s| format!("{}\n", s.id()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const SCENARIO: &str = r#"
roster:
  - id: P1
    strength: 0.1
  - id: P2
    strength: 0.9
  - id: P3
    strength: 0.2
proposals:
  - proposer: P1
    action: read_file
    motivation: look before editing
  - proposer: P2
    action: edit_file
  - proposer: P3
    action: read_file
"#;

    fn overrides() -> ResolveOverrides {
        ResolveOverrides {
            seed: Some(7),
            permutations: Some(20),
            ..Default::default()
        }
    }

    #[test]
    fn test_output_format_parse() {
        assert_eq!("json".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("TEXT".parse::<OutputFormat>().unwrap(), OutputFormat::Text);
        assert!("table".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_overrides_apply() {
        let base = ResolverConfig::default();
        let merged = overrides().apply(&base);
        assert_eq!(merged.seed, Some(7));
        assert_eq!(merged.permutations, 20);
        assert_eq!(merged.semantics, base.semantics);
        assert_eq!(merged.parallelism, base.parallelism);
    }

    #[test]
    fn test_run_resolve_json() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("scenario.yml");
        fs::write(&path, SCENARIO).unwrap();

        let out = run_resolve(&Config::default(), &path, &overrides(), OutputFormat::Json, None).unwrap();
        let report: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(report["seed"], 7);
        assert_eq!(report["permutations"], 20);
        assert_eq!(report["proposers"].as_array().unwrap().len(), 3);
        let winner = report["winner"].as_str().unwrap();
        assert!(winner == "read_file" || winner == "edit_file");
    }

    #[test]
    fn test_run_resolve_json_file_and_config_roster() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("round.json");
        fs::write(
            &path,
            r#"{"proposals": [{"proposer": "A2", "action": "no_tool", "motivation": "done"}]}"#,
        )
        .unwrap();

        // no roster in the file: the default workers A1, A2, A3 are used
        let out = run_resolve(&Config::default(), &path, &overrides(), OutputFormat::Text, None).unwrap();
        assert!(out.contains("no_tool"));
        assert!(out.contains("A1"));
        assert!(out.contains("A3"));
    }

    #[test]
    fn test_run_resolve_rejects_unknown_proposer() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("bad.yml");
        fs::write(&path, "proposals:\n  - proposer: Z9\n    action: read_file\n").unwrap();
        assert!(run_resolve(&Config::default(), &path, &overrides(), OutputFormat::Text, None).is_err());
    }

    #[test]
    fn test_run_resolve_writes_graph() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("scenario.yml");
        fs::write(&path, SCENARIO).unwrap();
        let graph = temp.path().join("qbaf.dot");

        run_resolve(&Config::default(), &path, &overrides(), OutputFormat::Text, Some(&graph)).unwrap();
        let dot = fs::read_to_string(&graph).unwrap();
        assert!(dot.starts_with("digraph qbaf {"));
        for label in ["proposer:P1", "proposer:P2", "proposer:P3", "action:read_file", "action:edit_file"] {
            assert!(dot.contains(label), "missing {label}");
        }
        // P2 attacks P1, P3 attacks P2 and supports P1
        assert_eq!(dot.matches("arrowhead=tee").count(), 2);
    }

    #[test]
    fn test_semantics_listing() {
        let listing = semantics_listing();
        assert_eq!(listing.lines().count(), 6);
        assert!(listing.lines().any(|l| l == "QuadraticEnergy_model"));
    }
}
