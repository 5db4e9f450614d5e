pub use builder::Builder;
pub use declaration::{
    Constructor, ConstructorKind, Declaration, FunctionDeclaration, MisplacedDeclaration, Owner,
    Supertype, TypeDeclaration,
};
pub use env::{
    ArtifactWriter, Diagnostic, Diagnostics, Enumerator, GeneratedUnit, Reporter, TypeSystem,
    UnitKind,
};
pub use error::{Error, Result};
pub use generate::{FactoryGenerator, IndexGenerator};
pub use model::{
    Call, Cardinality, Construction, FactoryDescriptor, Namespace, ParameterDescriptor, Scoping,
    TypeSelector,
};
pub use options::Options;
pub use processor::Processor;

pub mod attribute;
pub mod builder;
pub mod declaration;
pub mod env;
mod error;
pub mod generate;
pub mod model;
mod options;
pub mod parameter;
mod processor;
pub mod validate;

#[cfg(test)]
mod fixtures;
