//! Type catalog construction.
//!
//! Filters the program's symbol tables down to the classes it owns and
//! assembles pipeline descriptors for them, one at a time, in the image's
//! own metadata order.

use std::sync::Arc;

use futures::stream::{self, Stream, StreamExt};
use tracing::debug;

use crate::descriptor::{ClassDescriptor, MethodDescriptor};
use crate::error::{AsmDocError, Result};
use crate::image::{ProgramImage, TypeKind, TypeSymbol};
use crate::reconstruct::SourceReconstructor;

pub struct CatalogBuilder {
    image: Arc<dyn ProgramImage>,
    reconstructor: SourceReconstructor,
}

impl CatalogBuilder {
    pub fn new(image: Arc<dyn ProgramImage>, reconstructor: SourceReconstructor) -> Self {
        Self {
            image,
            reconstructor,
        }
    }

    /// Every class symbol the program owns: kind is `Class` and the
    /// fully-qualified name starts with the first dot-delimited segment of
    /// the program's root namespace. Interfaces, structs, enums and
    /// delegates are excluded.
    ///
    /// `include_methods = false` strips method lists from the returned
    /// symbols.
    pub fn owned_types(&self, include_methods: bool) -> Result<Vec<TypeSymbol>> {
        let root = self.root_segment()?;

        let owned = self
            .image
            .type_symbols()
            .into_iter()
            .filter(|t| t.kind == TypeKind::Class && t.full_name.starts_with(&root))
            .map(|mut t| {
                if !include_methods {
                    t.methods.clear();
                }
                t
            })
            .collect();

        Ok(owned)
    }

    fn root_segment(&self) -> Result<String> {
        let namespace = self.image.root_namespace().trim();
        let segment = namespace.split('.').next().unwrap_or_default();
        if segment.is_empty() {
            return Err(AsmDocError::Configuration(
                "root namespace of the program image could not be determined".into(),
            ));
        }
        Ok(segment.to_string())
    }

    /// Lazy, single-pass descriptor sequence in image metadata order.
    ///
    /// Each call re-reads the symbol tables and re-runs reconstruction, so
    /// invoking this again repeats the expensive work; drive one stream to
    /// completion per pass.
    pub fn class_descriptors(
        &self,
    ) -> Result<impl Stream<Item = ClassDescriptor> + '_> {
        let owned = self.owned_types(true)?;
        debug!(classes = owned.len(), "catalog pass starting");
        Ok(stream::iter(owned).then(move |symbol| self.assemble(symbol)))
    }

    async fn assemble(&self, symbol: TypeSymbol) -> ClassDescriptor {
        debug!(class = %symbol.full_name, "assembling class descriptor");

        let mut methods = Vec::with_capacity(symbol.methods.len());
        for method in &symbol.methods {
            let source_code = self.reconstructor.reconstruct_method(method).await;
            methods.push(MethodDescriptor {
                name: method.name.clone(),
                method_name: method.full_name.clone(),
                source_code,
            });
        }

        let source_code = self.reconstructor.reconstruct_type(&symbol).await;

        ClassDescriptor {
            assembly: self.image.root_namespace().to_string(),
            name: symbol.name,
            class_name: symbol.full_name,
            methods,
            parent_type: symbol.parent,
            source_code,
        }
    }
}
