//! Domain models for bikelogic.
//!
//! Canonical definitions for the core entities:
//! - `Component`: one catalog entry with interface and attribute maps
//! - `Catalog`: read-only snapshot indexed by id
//! - `Build`: the parts selected so far, one per category slot

pub mod catalog;
pub mod category;
pub mod component;
pub mod error;
pub mod value;

pub use catalog::{Build, Catalog};
pub use category::Category;
pub use component::{AttributeKey, Attributes, Component, InterfaceKey, Interfaces};
pub use error::{EngineError, Result};
pub use value::{FieldKey, FieldMap, FieldValue, ValueKind};
