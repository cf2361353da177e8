//! ddlforge: dialect-neutral schema modelling, DDL generation and migration
//! planning
//!
//! ddlforge models relational database schemas in a dialect-neutral form,
//! compiles that model into engine-specific schema definition statements,
//! and computes the minimal, safely-ordered set of structural changes that
//! turns one schema state into another.
//!
//! The core is computation-only: no connections, no I/O against live
//! engines. Current schema state is supplied by any external producer of
//! [`model::Database`] values; executing the generated statements is the
//! caller's responsibility.

pub mod config;
pub mod dialect;
pub mod diff;
pub mod error;
pub mod model;
pub mod platform;
pub mod sql;
pub mod utils;

#[cfg(test)]
mod test;

// Re-export main types for easier access
pub use config::{Config, EngineConfig};
pub use dialect::{DialectProfile, TypeMapping};
pub use diff::{ChangePlanner, ModelChange, ModelDiffer};
pub use error::{Error, Result};
pub use model::{Column, Database, ForeignKey, Index, Reference, SqlType, Table};
pub use platform::{default_registry, platform_for, Platform, PlatformRegistry};
pub use sql::SqlBuilder;
