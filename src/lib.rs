//! ## kiln - compile-time instance factories
//!
//! `kiln` turns items marked with [`#[instance]`](instance) into generated
//! factories. The factories are written by `kiln_scan` from the crate's build
//! script, included into the declaring module with [`include_factories!`] and
//! registered in [`INSTANCE_INDEX`] at link time. There is no runtime
//! scanning and no reflection.
//!
//! ## Declaring instances
//!
//! ```ignore
//! use std::sync::Arc;
//! use kiln::{inject, instance, Scope};
//!
//! pub trait Page {}
//!
//! #[instance(type = dyn Page, scoping = unscoped)]
//! pub struct HomePage {
//!     user: Option<Arc<UserData>>,
//! }
//!
//! impl HomePage {
//!     #[inject]
//!     pub fn new(#[classifier("main")] user: Option<Arc<UserData>>) -> Self {
//!         Self { user }
//!     }
//! }
//!
//! impl Page for HomePage {}
//!
//! kiln::include_factories!();
//! ```
//!
//! ### Properties of `#[instance]`
//!
//! * `type` - The type the instance is provided as. Only a struct implementing no
//!   trait and dereferencing to nothing may leave it out; it is then provided as itself.
//! * `types(..)` - Several provided types; scoped instances only.
//! * `scoping` - `unscoped`, `direct` or `topmost` (default).
//! * `factory` - A [`CustomFactory`] taking over creation.
//! * `classifier` - Distinguishes instances of the same type.
//! * `disabled` - Keeps the item but generates nothing.
//!
//! Constructor parameters are `Arc<T>` (required), `Option<Arc<T>>` (optional),
//! `Vec<Arc<T>>` (all matches), [`Lazy<T>`] (required, resolved on first use)
//! or `&dyn Scope` (the scope itself).
//!
//! ## Build script
//!
//! ```ignore
//! fn main() -> kiln_scan::Result<()> {
//!     kiln_scan::build()
//! }
//! ```

#[doc(hidden)]
pub use linkme;

pub use error::{KilnError, Result};
pub use factory::{CustomFactory, InstanceFactory, Instantiate, Scoping};
pub use index::{factories_for, index, type_id_of, IndexEntry, INSTANCE_INDEX};
pub use kiln_macro::{inject, instance};
pub use lazy::Lazy;
pub use scope::{Erased, Request, Scope};

mod error;
mod factory;
mod index;
mod lazy;
pub mod log;
mod scope;

/// Includes the factories generated for the calling module.
///
/// Without arguments the crate root's file is included; otherwise the module
/// path below the crate root, separated by `/`:
///
/// ```ignore
/// mod pages {
///     kiln::include_factories!("pages");
/// }
/// ```
#[macro_export]
macro_rules! include_factories {
    () => {
        include!(concat!(env!("OUT_DIR"), "/kiln/factories.rs"));
    };
    ($namespace:literal) => {
        include!(concat!(env!("OUT_DIR"), "/kiln/", $namespace, "/factories.rs"));
    };
}
