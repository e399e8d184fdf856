//! CLI argument definitions

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "netctl")]
#[command(about = "Serve and inspect energy network models")]
#[command(version = "0.1.0")]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// NetLens API endpoint URL
    #[arg(short, long, global = true)]
    pub endpoint: Option<String>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Output format
    #[arg(short = 'f', long, global = true, value_enum)]
    pub format: Option<OutputFormat>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP bridge
    Serve {
        /// Folder holding saved networks
        #[arg(long)]
        folder: Option<PathBuf>,
        /// Address to listen on
        #[arg(short, long)]
        bind: Option<SocketAddr>,
        /// Serve the built-in demo network instead of the folder
        #[arg(long)]
        demo: bool,
        /// Network to load at startup
        #[arg(short, long)]
        load: Option<String>,
    },
    /// Saved network operations
    Networks {
        #[command(subcommand)]
        command: NetworkCommands,
    },
    /// List component types of the active network that hold data
    Components,
    /// Show static and varying attributes of a component type
    Attributes {
        /// Component type, e.g. Generator
        component: String,
    },
    /// Show the static table of a component type
    Static {
        /// Component type, e.g. Generator
        component: String,
    },
    /// Show one varying attribute of a component type
    Varying {
        /// Component type, e.g. Generator
        component: String,
        /// Attribute name, e.g. p_max_pu
        attribute: String,
    },
    /// Health check
    Health,
}

#[derive(Subcommand)]
pub enum NetworkCommands {
    /// List saved networks
    List,
    /// Make a saved network the active one
    Load {
        /// Network file name
        name: String,
    },
}

#[derive(clap::ValueEnum, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Table => write!(f, "table"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Csv => write!(f, "csv"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_varying_command() {
        let cli = Cli::try_parse_from(["netctl", "-f", "csv", "varying", "Generator", "p_max_pu"]).unwrap();
        assert_eq!(cli.format, Some(OutputFormat::Csv));
        match cli.command {
            Commands::Varying { component, attribute } => {
                assert_eq!(component, "Generator");
                assert_eq!(attribute, "p_max_pu");
            }
            _ => panic!("expected varying command"),
        }
    }

    #[test]
    fn test_parse_serve_command() {
        let cli = Cli::try_parse_from(["netctl", "-vv", "serve", "--demo", "--bind", "127.0.0.1:8080"]).unwrap();
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Serve { demo, bind, folder, load } => {
                assert!(demo);
                assert_eq!(bind.unwrap().port(), 8080);
                assert!(folder.is_none());
                assert!(load.is_none());
            }
            _ => panic!("expected serve command"),
        }
    }
}
