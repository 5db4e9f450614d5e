use std::collections::HashSet;

use log::{debug, info};

use crate::{
    builder::Builder,
    declaration::Declaration,
    env::{ArtifactWriter, Enumerator, GeneratedUnit, Reporter, TypeSystem},
    generate::{FactoryGenerator, IndexGenerator},
    model::{FactoryDescriptor, Namespace},
    Error, Options, Result,
};

/// Runs one round: declarations in, generated units out.
pub struct Processor<'a> {
    options: &'a Options,
    types: &'a dyn TypeSystem,
}

impl<'a> Processor<'a> {
    pub fn new(options: &'a Options, types: &'a dyn TypeSystem) -> Self {
        Self { options, types }
    }

    /// Builds `declarations`, reporting validation errors and skipping the
    /// failed declaration. Internal and io errors end the round.
    fn build_all(
        &self,
        declarations: &[&Declaration],
        reporter: &mut dyn Reporter,
        built: &mut Vec<FactoryDescriptor>,
    ) -> Result<()> {
        let builder = Builder::new(self.options, self.types);
        for declaration in declarations {
            match builder.build(declaration) {
                Ok(descriptors) => built.extend(descriptors),
                Err(Error::Validation { element, message }) => {
                    reporter.report_error(&element, &message);
                }
                Err(err) => return Err(err),
            }
        }
        Ok(())
    }

    /// Returns `true` when the round saw at least one annotated declaration,
    /// whether or not it built.
    pub fn process(
        &self,
        enumerator: &dyn Enumerator,
        reporter: &mut dyn Reporter,
        writer: &mut dyn ArtifactWriter,
    ) -> Result<bool> {
        let declarations = enumerator.annotated(&self.options.marker);
        let (types, functions): (Vec<&Declaration>, Vec<&Declaration>) = declarations
            .iter()
            .partition(|declaration| matches!(declaration, Declaration::Type(_)));

        let any_annotated = !declarations.is_empty();
        let mut built = Vec::new();
        self.build_all(&types, reporter, &mut built)?;
        self.build_all(&functions, reporter, &mut built)?;

        let mut descriptors: Vec<FactoryDescriptor> =
            built.into_iter().filter(|descriptor| !descriptor.disabled).collect();
        descriptors.sort_by(|a, b| {
            a.factory_name
                .to_string()
                .cmp(&b.factory_name.to_string())
                .then_with(|| a.namespace.cmp(&b.namespace))
        });

        let factories = FactoryGenerator::new(self.options);
        let index = IndexGenerator::new(self.options);

        let mut seen: HashSet<(Namespace, String)> = HashSet::new();
        let mut units: Vec<(Namespace, GeneratedUnit)> = Vec::with_capacity(descriptors.len() * 2);
        for descriptor in descriptors.iter() {
            let name = descriptor.factory_name.to_string();
            if !seen.insert((descriptor.namespace.clone(), name.clone())) {
                reporter.report_error(
                    &descriptor.element,
                    &format!(
                        "factory `{}` is generated twice; set distinct classifiers or rename the item",
                        descriptor.namespace.qualify(&name)
                    ),
                );
                continue;
            }
            debug!("generating {}", descriptor.namespace.qualify(&name));
            units.push((descriptor.namespace.clone(), factories.generate(descriptor)?));
            units.push((descriptor.namespace.clone(), index.generate(descriptor)?));
        }

        for (namespace, unit) in units {
            writer.write(&namespace, unit)?;
        }

        info!(
            "{} declaration(s), {} factory(ies) generated",
            declarations.len(),
            seen.len()
        );
        Ok(any_annotated)
    }
}
