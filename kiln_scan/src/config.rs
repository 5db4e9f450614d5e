use std::{
    fs,
    path::{Path as FsPath, PathBuf},
};

use kiln_core::Options;
use proc_macro_crate::{crate_name, FoundCrate};
use quote::format_ident;
use serde::Deserialize;
use syn::{parse_quote, Path};

use crate::Result;

/// `[package.metadata.kiln]` of the crate being compiled.
#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct KilnConfig {
    /// Crate root to scan, relative to the manifest directory.
    pub root: Option<PathBuf>,
    /// Path of the runtime crate in generated code, e.g. `"::kiln"`.
    pub runtime: Option<String>,
    pub suffix: Option<String>,
    pub scope: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct Metadata {
    #[serde(default)]
    kiln: Option<KilnConfig>,
}

#[derive(Debug, Default, Deserialize)]
struct Package {
    #[serde(default)]
    metadata: Option<Metadata>,
}

#[derive(Debug, Default, Deserialize)]
struct CargoToml {
    #[serde(default)]
    package: Option<Package>,
}

fn resolve_runtime(configured: Option<&str>) -> Result<Path> {
    if let Some(runtime) = configured {
        return Ok(syn::parse_str(runtime)?);
    }
    match crate_name("kiln")? {
        FoundCrate::Itself => Ok(parse_quote!(crate)),
        FoundCrate::Name(name) => {
            let ident = format_ident!("{}", name);
            Ok(parse_quote!(::#ident))
        }
    }
}

impl KilnConfig {
    pub fn parse(manifest: &str) -> Result<Self> {
        let cargo_toml: CargoToml = toml::from_str(manifest)?;
        Ok(cargo_toml
            .package
            .and_then(|package| package.metadata)
            .and_then(|metadata| metadata.kiln)
            .unwrap_or_default())
    }

    pub fn load(manifest: impl AsRef<FsPath>) -> Result<Self> {
        let manifest = fs::read_to_string(manifest)?;
        Self::parse(&manifest)
    }

    /// The configured root, else `src/lib.rs`, else `src/main.rs`.
    pub fn root_file(&self, manifest_dir: &FsPath) -> PathBuf {
        if let Some(root) = &self.root {
            return manifest_dir.join(root);
        }
        let lib = manifest_dir.join("src/lib.rs");
        if lib.is_file() {
            lib
        } else {
            manifest_dir.join("src/main.rs")
        }
    }

    pub fn options(&self) -> Result<Options> {
        let mut options = Options::new().runtime(resolve_runtime(self.runtime.as_deref())?);
        if let Some(suffix) = &self.suffix {
            options = options.suffix(suffix);
        }
        if let Some(scope) = &self.scope {
            options = options.scope(scope);
        }
        Ok(options)
    }
}
