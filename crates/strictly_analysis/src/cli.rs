//! Command-line interface for strictly_analysis.

use clap::Parser;
use std::path::PathBuf;

/// Ultimate tic-tac-toe analysis board backed by an external engine
#[derive(Parser, Debug)]
#[command(name = "strictly_analysis")]
#[command(about = "Explore ultimate tic-tac-toe lines with live engine evaluation", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Line to preload, as space-separated <DIR>/<DIR> moves (e.g. "NW/C C/SE")
    pub script: Option<String>,

    /// Path to the engine configuration file
    #[arg(short, long, default_value = "strictly_analysis.toml")]
    pub config: PathBuf,

    /// Engine command (space-separated), overrides config and ULTIMATTT_PATH
    #[arg(short, long)]
    pub engine: Option<String>,

    /// Time budget passed to the engine (e.g. "30s")
    #[arg(long)]
    pub limit: Option<String>,

    /// Transposition table size passed to the engine (e.g. "64M")
    #[arg(long)]
    pub table_mem: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::parse_from(["strictly_analysis"]);
        assert_eq!(cli.script, None);
        assert_eq!(cli.config, PathBuf::from("strictly_analysis.toml"));
        assert_eq!(cli.engine, None);
    }

    #[test]
    fn test_script_and_overrides() {
        let cli = Cli::parse_from([
            "strictly_analysis",
            "NW/C N/N",
            "--engine",
            "ultimattt --threads 2",
            "--limit",
            "30s",
            "--table-mem",
            "64M",
        ]);
        assert_eq!(cli.script.as_deref(), Some("NW/C N/N"));
        assert_eq!(cli.engine.as_deref(), Some("ultimattt --threads 2"));
        assert_eq!(cli.limit.as_deref(), Some("30s"));
        assert_eq!(cli.table_mem.as_deref(), Some("64M"));
    }
}
