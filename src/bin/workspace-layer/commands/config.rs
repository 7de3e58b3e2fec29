//! `workspace-layer config` command

use anyhow::Result;

use crate::cli::ConfigCmdArgs;
use workspace_layer::Config;

pub fn execute(args: ConfigCmdArgs) -> Result<()> {
    let package_dir = args.config.package_dir()?;
    let config = args.config.resolve(&package_dir)?;

    // Show the defaults that will actually be used.
    let resolved = Config {
        workspace_root_directory_path: Some(config.workspace_root()),
        layer_path: Some(config.layer_path()),
        package: config.package.clone(),
    };

    print!("{}", resolved.to_toml()?);
    Ok(())
}
