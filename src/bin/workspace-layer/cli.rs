//! CLI definitions using clap.

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Args, Parser, Subcommand};

use workspace_layer::Config;

/// workspace-layer - materialize node_modules for one npm workspace package
#[derive(Parser)]
#[command(name = "workspace-layer")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build the layer and copy internal dependencies for a package
    Package(PackageArgs),

    /// Print the resolved configuration
    Config(ConfigCmdArgs),
}

#[derive(Args)]
pub struct PackageArgs {
    #[command(flatten)]
    pub config: ConfigArgs,
}

#[derive(Args)]
pub struct ConfigCmdArgs {
    #[command(flatten)]
    pub config: ConfigArgs,
}

/// Settings shared by every command.
#[derive(Args)]
pub struct ConfigArgs {
    /// Package to deploy (defaults to the current directory)
    #[arg(long)]
    pub package_dir: Option<PathBuf>,

    /// Workspace root, relative to the package
    #[arg(long, env = "WORKSPACE_LAYER_WORKSPACE_ROOT")]
    pub workspace_root: Option<PathBuf>,

    /// Layer directory, relative to the package
    #[arg(long, env = "WORKSPACE_LAYER_LAYER_PATH")]
    pub layer_path: Option<PathBuf>,

    /// Packaging pattern to exclude from copied internal packages (repeatable)
    #[arg(long = "pattern")]
    pub patterns: Vec<String>,
}

impl ConfigArgs {
    /// The package directory.
    pub fn package_dir(&self) -> Result<PathBuf> {
        match &self.package_dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(std::env::current_dir()?),
        }
    }

    /// Load the package's config file and apply command line overrides.
    pub fn resolve(&self, package_dir: &Path) -> Result<Config> {
        let mut config = Config::load_for_package(package_dir)?;
        let mut overrides = Config {
            workspace_root_directory_path: self.workspace_root.clone(),
            layer_path: self.layer_path.clone(),
            ..Config::default()
        };
        overrides.package.patterns = self.patterns.clone();
        config.merge(overrides);
        Ok(config)
    }
}
