//! Schema validation module.
//!
//! Declarative record schemas, the structural validator that normalizes
//! untyped JSON against them, and the named registry holding the built-in
//! datastore schemas.

pub mod normalized;
pub mod registry;
pub mod schema;
pub mod validator;
pub mod violation;

pub use normalized::*;
pub use registry::*;
pub use schema::*;
pub use validator::*;
pub use violation::*;
