//! Generator module - turns a stored template plus a rendering context into
//! a print-ready certificate document.
//!
//! The pipeline runs in a fixed order:
//! - `migration` - lifts older template layouts to the current shape
//! - `css` - forces layout rules in the template stylesheet
//! - `resolver` - substitutes bracket tokens from the context
//! - `cleanup` - collapses punctuation left behind by removed phrases
//!
//! Everything here is pure and synchronous; `engine::render` may be called
//! from any thread.

pub mod cleanup;
pub mod common;
pub mod context;
pub mod css;
pub mod default_template;
pub mod engine;
pub mod migration;
pub mod print;
pub mod program;
pub mod resolver;
pub mod tokens;

pub use context::{
    CertificateTemplate, CompanySnapshot, EmployeeSnapshot, Orientation, RenderingContext,
    SignerSnapshot,
};
pub use default_template::{default_template, DEFAULT_TEMPLATE_ID};
pub use engine::{render, RenderOutput};
pub use migration::{migrate_from, MigratedTemplate, CURRENT_SCHEMA_VERSION};
pub use print::prepare_for_print;
pub use tokens::Token;
