use std::{
    collections::BTreeMap,
    fs,
    path::{Path as FsPath, PathBuf},
};

use kiln_core::{ArtifactWriter, GeneratedUnit, Namespace};
use log::debug;
use proc_macro2::TokenStream;

use crate::Result;

pub const FACTORIES_FILE: &str = "factories.rs";

const HEADER: &str = "// @generated by kiln from the #[instance] items of this module.\n\
                      // Changes are overwritten on the next build.\n\n";

/// Writes every unit of a namespace into `<out>/<namespace path>/factories.rs`.
#[derive(Debug)]
pub struct FsWriter {
    out_dir: PathBuf,
    units: BTreeMap<Namespace, Vec<GeneratedUnit>>,
}

impl FsWriter {
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
            units: BTreeMap::new(),
        }
    }

    pub fn out_dir(&self) -> &FsPath {
        &self.out_dir
    }

    /// Makes sure the namespace gets a file, even one without factories.
    pub fn touch(&mut self, namespace: &Namespace) {
        self.units.entry(namespace.clone()).or_default();
    }

    fn render(units: &[GeneratedUnit]) -> Result<String> {
        let tokens: TokenStream = units.iter().map(|unit| unit.tokens.clone()).collect();
        let file: syn::File = syn::parse2(tokens)?;
        Ok(format!("{HEADER}{}", prettyplease::unparse(&file)))
    }

    /// Replaces the output directory with the buffered units and returns the files written.
    pub fn finish(self) -> Result<Vec<PathBuf>> {
        if self.out_dir.exists() {
            fs::remove_dir_all(&self.out_dir)?;
        }

        let mut written = Vec::with_capacity(self.units.len());
        for (namespace, units) in self.units.iter() {
            let dir = self.out_dir.join(namespace.relative_dir());
            fs::create_dir_all(&dir)?;

            let file = dir.join(FACTORIES_FILE);
            fs::write(&file, Self::render(units)?)?;
            debug!("{} unit(s) written to {}", units.len(), file.display());
            written.push(file);
        }
        Ok(written)
    }
}

impl ArtifactWriter for FsWriter {
    fn write(&mut self, namespace: &Namespace, unit: GeneratedUnit) -> kiln_core::Result<()> {
        self.units.entry(namespace.clone()).or_default().push(unit);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use kiln_core::UnitKind;
    use quote::quote;

    use super::*;

    fn unit(name: &str, tokens: TokenStream) -> GeneratedUnit {
        GeneratedUnit {
            name: name.to_string(),
            kind: UnitKind::Factory,
            tokens,
        }
    }

    #[test]
    fn writes_one_file_per_namespace() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("kiln");
        let app = Namespace::root().child("app");

        let mut writer = FsWriter::new(&out);
        writer.write(&app, unit("A", quote!(pub struct AKilnFactory;))).unwrap();
        writer.write(&app, unit("B", quote!(pub struct BKilnFactory;))).unwrap();
        writer.touch(&Namespace::root());
        let written = writer.finish().unwrap();

        assert_eq!(vec![out.join(FACTORIES_FILE), out.join("app").join(FACTORIES_FILE)], written);

        let app_file = fs::read_to_string(out.join("app/factories.rs")).unwrap();
        assert!(app_file.starts_with("// @generated by kiln"));
        let a = app_file.find("pub struct AKilnFactory;").unwrap();
        let b = app_file.find("pub struct BKilnFactory;").unwrap();
        assert!(a < b);

        let root_file = fs::read_to_string(out.join("factories.rs")).unwrap();
        assert_eq!(HEADER, root_file);
    }

    #[test]
    fn stale_output_is_removed() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("kiln");
        fs::create_dir_all(out.join("gone")).unwrap();
        fs::write(out.join("gone/factories.rs"), "pub struct Old;").unwrap();

        FsWriter::new(&out).finish().unwrap();
        assert!(!out.join("gone").exists());
    }

    #[test]
    fn unparsable_units_fail() {
        let dir = tempfile::tempdir().unwrap();
        let mut writer = FsWriter::new(dir.path().join("kiln"));
        writer.write(&Namespace::root(), unit("Bad", quote!(struct))).unwrap();
        assert!(writer.finish().is_err());
    }
}
