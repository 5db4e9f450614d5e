use std::{env, path::PathBuf};

use kiln_core::{Diagnostic, Diagnostics, Processor};
use log::info;

pub use config::KilnConfig;
pub use error::{Error, Result};
pub use scan::{Module, Scanner};
pub use space::TypeSpace;
pub use writer::{FsWriter, FACTORIES_FILE};

mod config;
mod error;
mod scan;
mod space;
mod writer;

/// Directory below `OUT_DIR` holding the generated files; `kiln::include_factories!` reads from here.
pub const OUT_SUBDIR: &str = "kiln";

/// Outcome of one compilation round.
#[derive(Debug)]
pub struct Compilation {
    /// At least one `#[instance]` item was found, failed and disabled ones included.
    pub built: bool,
    pub diagnostics: Vec<Diagnostic>,
    pub sources: Vec<PathBuf>,
    pub outputs: Vec<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct Compiler {
    manifest_dir: PathBuf,
    out_dir: PathBuf,
}

impl Compiler {
    pub fn new(manifest_dir: impl Into<PathBuf>, out_dir: impl Into<PathBuf>) -> Self {
        Self {
            manifest_dir: manifest_dir.into(),
            out_dir: out_dir.into(),
        }
    }

    /// Reads `CARGO_MANIFEST_DIR` and `OUT_DIR` as set for build scripts.
    pub fn from_env() -> Result<Self> {
        let manifest_dir =
            env::var_os("CARGO_MANIFEST_DIR").ok_or(Error::MissingEnv("CARGO_MANIFEST_DIR"))?;
        let out_dir = env::var_os("OUT_DIR").ok_or(Error::MissingEnv("OUT_DIR"))?;
        Ok(Self::new(manifest_dir, out_dir))
    }

    /// Scans the crate and writes its factories. Validation errors are returned
    /// as diagnostics; only compiler faults and io errors fail.
    pub fn compile(&self) -> Result<Compilation> {
        let config = KilnConfig::load(self.manifest_dir.join("Cargo.toml"))?;
        let options = config.options()?;
        let root = config.root_file(&self.manifest_dir);

        let space = TypeSpace::scan(&root, &options)?;
        let mut diagnostics = Diagnostics::new();
        let mut writer = FsWriter::new(self.out_dir.join(OUT_SUBDIR));
        for namespace in space.annotated_namespaces(&options.marker) {
            writer.touch(&namespace);
        }

        let built = Processor::new(&options, &space).process(&space, &mut diagnostics, &mut writer)?;
        let outputs = writer.finish()?;
        info!(
            "{}: {} file(s) generated, {} error(s)",
            root.display(),
            outputs.len(),
            diagnostics.errors().len()
        );

        Ok(Compilation {
            built,
            diagnostics: diagnostics.errors().to_vec(),
            sources: space.files().to_vec(),
            outputs,
        })
    }

    /// Build script entry: compiles, tells cargo what to watch and fails on reported errors.
    pub fn run(&self) -> Result<Compilation> {
        let compilation = self.compile()?;

        println!("cargo:rerun-if-changed=Cargo.toml");
        for source in compilation.sources.iter() {
            println!("cargo:rerun-if-changed={}", source.display());
        }
        for diagnostic in compilation.diagnostics.iter() {
            println!("cargo:warning={}: {}", diagnostic.element, diagnostic.message);
        }

        if compilation.diagnostics.is_empty() {
            Ok(compilation)
        } else {
            Err(Error::Reported(compilation.diagnostics.len()))
        }
    }
}

/// `kiln_scan::build()` from `build.rs`.
pub fn build() -> Result<()> {
    Compiler::from_env()?.run().map(|_| ())
}
