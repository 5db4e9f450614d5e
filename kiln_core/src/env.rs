//! Collaborators the compiler consumes: declaration source, type queries,
//! diagnostics and artifact output.

use log::error;
use proc_macro2::TokenStream;
use syn::Type;

use crate::{declaration::Declaration, model::Namespace, Result};

pub trait Enumerator {
    /// Declarations carrying the `marker` attribute in the current round.
    fn annotated(&self, marker: &str) -> Vec<Declaration>;
}

pub trait TypeSystem {
    /// Whether `source`, named relative to `namespace`, can be used as `target`.
    fn is_assignable(&self, namespace: &Namespace, source: &Type, target: &Type) -> bool;
}

pub trait Reporter {
    fn report_error(&mut self, element: &str, message: &str);
}

pub trait ArtifactWriter {
    fn write(&mut self, namespace: &Namespace, unit: GeneratedUnit) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitKind {
    Factory,
    Index,
}

#[derive(Debug, Clone)]
pub struct GeneratedUnit {
    /// Name of the factory the unit belongs to.
    pub name: String,
    pub kind: UnitKind,
    pub tokens: TokenStream,
}

impl ArtifactWriter for Vec<(Namespace, GeneratedUnit)> {
    fn write(&mut self, namespace: &Namespace, unit: GeneratedUnit) -> Result<()> {
        self.push((namespace.clone(), unit));
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub element: String,
    pub message: String,
}

/// Reporter collecting every error of a round.
#[derive(Debug, Default)]
pub struct Diagnostics {
    errors: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn errors(&self) -> &[Diagnostic] {
        &self.errors
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

impl Reporter for Diagnostics {
    fn report_error(&mut self, element: &str, message: &str) {
        error!("{element}: {message}");
        self.errors.push(Diagnostic {
            element: element.to_string(),
            message: message.to_string(),
        });
    }
}
