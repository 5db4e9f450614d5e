//! Code generation for validated descriptors.
//!
//! Every descriptor produces two units: the factory itself and its entries in
//! the link-time index. Both are emitted into the namespace of the declaration
//! so the generated code sees the same names the source does.

mod factory;
mod index;

pub use factory::FactoryGenerator;
pub use index::IndexGenerator;
