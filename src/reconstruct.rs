//! Source reconstruction from compiled symbols.
//!
//! Decompilation is CPU-heavy and frequently fails for synthetic members or
//! programs built without debug metadata. A failure never aborts a scan: it
//! degrades to absent source text, which every downstream stage tolerates.

use std::sync::Arc;

use tracing::{debug, error};

use crate::error::DecompileError;
use crate::image::{MethodHandle, MethodSymbol, TypeSymbol};
use crate::markup::decode_entities;

/// Decompiler backend scoped to one compiled program.
///
/// One context is created per image and reused for the whole scan. Methods
/// take `&self` and implementations must be safe for concurrent reads; the
/// reconstructor never mutates the context after construction.
pub trait Decompiler: Send + Sync {
    fn decompile_type(&self, full_name: &str) -> Result<String, DecompileError>;
    fn decompile_method(&self, handle: MethodHandle) -> Result<String, DecompileError>;
}

/// Reconstructs source text for symbols, degrading to `None` on failure.
///
/// Backend calls run under `spawn_blocking` so the single logical worker is
/// not stalled; from the pipeline's point of view reconstruction is still
/// synchronous.
#[derive(Clone)]
pub struct SourceReconstructor {
    backend: Arc<dyn Decompiler>,
}

impl SourceReconstructor {
    pub fn new(backend: Arc<dyn Decompiler>) -> Self {
        Self { backend }
    }

    /// Full decompilation of a type, with markup entities decoded in the
    /// output.
    pub async fn reconstruct_type(&self, symbol: &TypeSymbol) -> Option<String> {
        let backend = Arc::clone(&self.backend);
        let full_name = symbol.full_name.clone();
        let outcome =
            tokio::task::spawn_blocking(move || backend.decompile_type(&full_name)).await;

        match outcome {
            Ok(Ok(source)) => Some(decode_entities(&source)),
            Ok(Err(err)) => {
                error!(class = %symbol.full_name, %err, "could not decompile class");
                None
            }
            Err(join_err) => {
                error!(class = %symbol.full_name, error = %join_err, "decompilation task failed");
                None
            }
        }
    }

    /// Decompiles a method by its metadata handle.
    ///
    /// A `None` handle marks a synthetic member; the backend is not invoked
    /// for those and the skip is not an error.
    pub async fn reconstruct_method(&self, symbol: &MethodSymbol) -> Option<String> {
        let handle = match symbol.handle {
            Some(handle) => handle,
            None => {
                debug!(method = %symbol.name, "method handle is nil");
                return None;
            }
        };

        let backend = Arc::clone(&self.backend);
        let outcome = tokio::task::spawn_blocking(move || backend.decompile_method(handle)).await;

        match outcome {
            Ok(Ok(source)) => Some(decode_entities(&source)),
            Ok(Err(err)) => {
                error!(method = %symbol.full_name, %err, "could not decompile method");
                None
            }
            Err(join_err) => {
                error!(method = %symbol.full_name, error = %join_err, "decompilation task failed");
                None
            }
        }
    }
}
