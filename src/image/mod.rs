//! Container build and launch contract
//!
//! Models the image that ships the experiment suite: a pinned base, a
//! working directory, manifest-driven dependency installation with the
//! toolchain pruned afterwards, the application tree, and a single
//! entry point. The contract can be rendered as a Dockerfile or checked
//! against a build context.

pub mod descriptor;
pub mod manifest;
pub mod plan;
pub mod render;

pub use descriptor::{BaseImage, EntryPoint, ImageDescriptor, DICTIONARY_PATH};
pub use manifest::{load_manifest, parse_manifest, DependencyManifest, DependencySpec};
pub use plan::{check_build, plan_steps, BuildOutcome, BuildReport, BuildStep, PlannedStep, StepStatus};
pub use render::render_dockerfile;
