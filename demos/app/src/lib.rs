//! A small site wired with kiln: pages resolve repositories, settings and the
//! current user from a scope backed by the instance index.

use kiln::instance;

pub mod model;
pub mod pages;
pub mod scope;

#[instance]
pub struct AppInfo;

impl AppInfo {
    pub fn name(&self) -> &'static str {
        env!("CARGO_PKG_NAME")
    }
}

kiln::include_factories!();
