//! Directive-resolving settings system.
//!
//! Materializes the `[tool.django]` section of a pyproject document as a
//! flat mapping of setting names to resolved values:
//! 1. **Classify** - each mapping node is matched against a fixed set of
//!    directive shapes (`env`, `path`, `insert`, `con`/`poetry`/`cat`)
//! 2. **Resolve** - directive nodes are substituted with their computed
//!    values, recursively resolving operands that are themselves directives
//! 3. **Merge** - tiers overwrite each other in a fixed order:
//!    base, per-app, docker, production
//!
//! ## Tier activation
//! - docker tier: the configured env var is set non-empty (default `DJANGO_ENV`)
//! - production tier: the configured env var equals its expected value
//!   (default `DJANGO_ENV == "production"`); also forces `DEBUG = false`

mod directive;
mod loader;
mod paths;
mod resolve;

pub use directive::{Directive, classify};
pub use loader::{DEFAULT_DOCUMENT, Settings, SettingsLoader};
pub use paths::rewrite_path;
pub use resolve::{RESERVED_TIER_KEYS, Resolver, Scope, insert_into_list, normalize_key};
