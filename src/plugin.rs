//! Host interface.
//!
//! The layer build runs as a plugin of a packaging host. The host owns the
//! lifecycle and fires [`LifecycleEvent`]s through a [`HookRegistry`]; the
//! plugin only needs a [`Logger`], the resolved [`Config`] and the package
//! directory. Fatal conditions come back as a `MaterializeError` and abort
//! the host's packaging step.

use std::fmt;
use std::path::Path;

use crate::core::workspace::WorkspaceLayout;
use crate::error::Result;
use crate::ops::install::{Installer, NpmInstaller};
use crate::ops::materialize::{materialize, MaterializeOptions};
use crate::util::Config;

/// Name every log line is tagged with.
pub const PLUGIN_NAME: &str = "workspace-layer";

/// Points in the host's packaging lifecycle a plugin can hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleEvent {
    /// Packaging has been initialized but nothing is bundled yet.
    AfterPackageInitialize,
}

impl LifecycleEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            LifecycleEvent::AfterPackageInitialize => "after:package:initialize",
        }
    }
}

impl fmt::Display for LifecycleEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The host's logging facility.
pub trait Logger {
    fn log(&self, message: &str);
}

/// Logger that forwards to `tracing`, prefixed with [`PLUGIN_NAME`].
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn log(&self, message: &str) {
        tracing::info!("{}: {}", PLUGIN_NAME, message);
    }
}

/// What the host hands a plugin when firing an event.
pub struct HostContext<'a> {
    /// Directory of the package being packaged.
    pub package_dir: &'a Path,
    /// Resolved plugin configuration.
    pub config: &'a Config,
    pub logger: &'a dyn Logger,
}

/// A host plugin.
pub trait Plugin {
    fn name(&self) -> &str;

    /// Events this plugin wants to receive.
    fn events(&self) -> &[LifecycleEvent];

    fn on_event(&self, event: LifecycleEvent, ctx: &HostContext<'_>) -> Result<()>;
}

/// Registered plugins, dispatched in registration order.
#[derive(Default)]
pub struct HookRegistry {
    plugins: Vec<Box<dyn Plugin>>,
}

impl HookRegistry {
    pub fn new() -> Self {
        HookRegistry::default()
    }

    pub fn register(&mut self, plugin: Box<dyn Plugin>) {
        tracing::debug!("registered plugin {}", plugin.name());
        self.plugins.push(plugin);
    }

    /// Fire `event`, stopping at the first plugin that fails.
    ///
    /// Returns how many plugins handled the event.
    pub fn fire(&self, event: LifecycleEvent, ctx: &HostContext<'_>) -> Result<usize> {
        let mut handled = 0;
        for plugin in self.plugins.iter().filter(|p| p.events().contains(&event)) {
            tracing::debug!("{} -> {}", event, plugin.name());
            plugin.on_event(event, ctx)?;
            handled += 1;
        }
        Ok(handled)
    }
}

/// Builds the deployment layer when packaging initializes.
pub struct WorkspaceLayerPlugin<I = NpmInstaller> {
    installer: I,
}

impl WorkspaceLayerPlugin<NpmInstaller> {
    pub fn new() -> Self {
        WorkspaceLayerPlugin {
            installer: NpmInstaller,
        }
    }
}

impl Default for WorkspaceLayerPlugin<NpmInstaller> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I: Installer> WorkspaceLayerPlugin<I> {
    /// Use a different install command.
    pub fn with_installer(installer: I) -> Self {
        WorkspaceLayerPlugin { installer }
    }
}

impl<I: Installer> Plugin for WorkspaceLayerPlugin<I> {
    fn name(&self) -> &str {
        PLUGIN_NAME
    }

    fn events(&self) -> &[LifecycleEvent] {
        &[LifecycleEvent::AfterPackageInitialize]
    }

    fn on_event(&self, event: LifecycleEvent, ctx: &HostContext<'_>) -> Result<()> {
        match event {
            LifecycleEvent::AfterPackageInitialize => {
                let layout = WorkspaceLayout::new(ctx.package_dir, ctx.config);
                let opts = MaterializeOptions {
                    patterns: ctx.config.package.patterns.clone(),
                };
                let report = materialize(&layout, &opts, &self.installer, ctx.logger)?;
                ctx.logger.log(&format!(
                    "packaged {}: {} internal dependencies, {} layer files",
                    report.package_name,
                    report.dependencies.len(),
                    report.layer_files
                ));
                Ok(())
            }
        }
    }
}
