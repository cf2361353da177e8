//! The dialect-neutral schema model

pub mod io;
pub mod types;

pub use types::{
    creation_order, Column, Database, ForeignKey, Index, Reference, SqlType, Table,
};
