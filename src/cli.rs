use std::path::PathBuf;
use clap::{Parser, Subcommand};

#[derive(Debug, Parser, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct CLI {
    /// Print debug output (overridden by `LOCALTOOLS_LOG`)
    #[clap(short, long, global = true)]
    pub(crate) verbose: bool,
    /// Read configuration from this file instead of the per-user `config.toml`
    #[clap(long, global = true)]
    pub(crate) config: Option<PathBuf>,
    #[command(subcommand)]
    pub(crate) command: LocalToolsCommand,
}

#[derive(Debug, Subcommand, Clone, PartialEq)]
pub enum LocalToolsCommand {
    /// Installs every tool listed in the tool manifest using `dotnet tool install`
    Install {
        /// Path of the tool manifest. Defaults to `.config/dotnet-tools.json`
        #[clap(long)]
        manifest: Option<PathBuf>,
        /// Directory to install the tools into. Defaults to `tools`
        #[clap(long)]
        tool_path: Option<PathBuf>,
    },
    /// List all tools in the tool manifest
    List {
        /// Path of the tool manifest. Defaults to `.config/dotnet-tools.json`
        #[clap(long)]
        manifest: Option<PathBuf>,
    },
}
