//! Build manifest model for the gantry asset pipeline.
//!
//! A gantry project is described by a single `gantry.toml`. This crate
//! owns the manifest schema, the ordered file-type routing table, page
//! discovery, output filename patterns, and the validation that runs
//! before any build starts. Finalizing a [`Manifest`] against a project
//! root yields a [`BuildPlan`]: the fully resolved inputs the pipeline
//! crate consumes.
//!
//! ```no_run
//! use gantry_config::discovery;
//!
//! let (manifest, path) = discovery::discover_from(std::path::Path::new("."))?;
//! let root = path.parent().unwrap();
//! let plan = manifest.finalize(root)?;
//! println!("{} pages, {} entries", plan.pages.len(), plan.entries.len());
//! # Ok::<(), gantry_config::ConfigError>(())
//! ```

pub mod dev;
pub mod discovery;
pub mod entries;
pub mod error;
pub mod manifest;
pub mod pages;
pub mod pattern;
pub mod paths;
pub mod rules;
pub mod validation;

pub use dev::DevOptions;
pub use discovery::{ConfigDiscovery, MANIFEST_FILE};
pub use entries::{resolve_entries, EntrySet, ResolvedEntry, DEFAULT_ENTRY_FILE};
pub use error::{ConfigError, Result};
pub use manifest::{
    BuildPlan, Manifest, Mode, OutputOptions, PageOptions, PluginInvocation, DEFAULT_PLUGINS,
};
pub use pages::{discover_pages, PageDescriptor};
pub use pattern::{OutputPattern, Substitutions, DEFAULT_HASH_LEN};
pub use paths::ProjectPaths;
pub use rules::{
    default_table, Emit, LintWarning, Matcher, RouteMatch, RuleTable, TransformRule, TransformStep,
};
pub use validation::{validate_fs, validate_schema, ConfigValidator, FsValidator, SchemaValidator};
