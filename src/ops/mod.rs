//! High-level operations.

pub mod copy_deps;
pub mod install;
pub mod materialize;

pub use copy_deps::{CopiedDependency, DependencyCopier};
pub use install::{InstallOutcome, Installer, NpmInstaller};
pub use materialize::{materialize, MaterializeOptions, MaterializeReport, Phase};
