//! `workspace-layer package` command

use anyhow::Result;

use crate::cli::PackageArgs;
use workspace_layer::plugin::{HostContext, TracingLogger};
use workspace_layer::{HookRegistry, LifecycleEvent, WorkspaceLayerPlugin};

pub fn execute(args: PackageArgs) -> Result<()> {
    let package_dir = args.config.package_dir()?;
    let config = args.config.resolve(&package_dir)?;

    let mut registry = HookRegistry::new();
    registry.register(Box::new(WorkspaceLayerPlugin::new()));

    let logger = TracingLogger;
    let ctx = HostContext {
        package_dir: &package_dir,
        config: &config,
        logger: &logger,
    };

    registry.fire(LifecycleEvent::AfterPackageInitialize, &ctx)?;

    eprintln!("    Finished {}", package_dir.join(config.layer_path()).display());
    Ok(())
}
