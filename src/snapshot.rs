//! Recorded program snapshots.
//!
//! A snapshot is a JSON capture of a compiled program: its symbol tables
//! plus the decompiler output recorded per type and per method body,
//! markup-escaped exactly as the backend emitted it. Loading one yields a
//! [`ProgramImage`] and a [`Decompiler`] scoped to the same program, which
//! makes the worker runnable offline and the integration tests hermetic. A
//! live decompiler backend plugs in behind the same two traits.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{AsmDocError, DecompileError, Result};
use crate::image::{MethodHandle, ProgramImage, TypeSymbol};
use crate::reconstruct::Decompiler;

/// On-disk snapshot of a compiled program image.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProgramSnapshot {
    /// Root namespace of the captured program.
    pub name: String,
    /// Type symbols in the image's metadata order.
    pub types: Vec<TypeSymbol>,
    /// Captured decompiler output per fully-qualified type name.
    #[serde(default)]
    pub type_sources: HashMap<String, String>,
    /// Captured decompiler output per method handle token.
    #[serde(default)]
    pub method_sources: HashMap<u32, String>,
}

impl ProgramSnapshot {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let snapshot: Self = serde_json::from_str(&raw).map_err(|e| {
            AsmDocError::Snapshot(format!("invalid snapshot {}: {e}", path.display()))
        })?;
        debug!(
            program = %snapshot.name,
            types = snapshot.types.len(),
            "program snapshot loaded"
        );
        Ok(snapshot)
    }

    /// Splits the snapshot into the image and its long-lived decompilation
    /// context.
    pub fn into_parts(self) -> (Arc<dyn ProgramImage>, Arc<dyn Decompiler>) {
        let image = SnapshotImage {
            name: self.name,
            types: self.types,
        };
        let backend = SnapshotDecompiler {
            type_sources: self.type_sources,
            method_sources: self.method_sources,
        };
        (Arc::new(image), Arc::new(backend))
    }
}

struct SnapshotImage {
    name: String,
    types: Vec<TypeSymbol>,
}

impl ProgramImage for SnapshotImage {
    fn root_namespace(&self) -> &str {
        &self.name
    }

    fn type_symbols(&self) -> Vec<TypeSymbol> {
        self.types.clone()
    }
}

/// Replays captured decompiler output. Symbols the capture never saw fail
/// exactly like a live backend failing on them.
struct SnapshotDecompiler {
    type_sources: HashMap<String, String>,
    method_sources: HashMap<u32, String>,
}

impl Decompiler for SnapshotDecompiler {
    fn decompile_type(&self, full_name: &str) -> std::result::Result<String, DecompileError> {
        self.type_sources
            .get(full_name)
            .cloned()
            .ok_or_else(|| DecompileError::UnknownType(full_name.to_string()))
    }

    fn decompile_method(&self, handle: MethodHandle) -> std::result::Result<String, DecompileError> {
        self.method_sources
            .get(&handle.0)
            .cloned()
            .ok_or(DecompileError::UnknownHandle(handle.0))
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::image::{MethodSymbol, TypeKind};

    fn sample() -> ProgramSnapshot {
        ProgramSnapshot {
            name: "App".into(),
            types: vec![TypeSymbol {
                kind: TypeKind::Class,
                name: "Foo".into(),
                full_name: "App.Foo".into(),
                parent: None,
                methods: vec![MethodSymbol {
                    name: "Bar".into(),
                    full_name: "App.Foo.Bar".into(),
                    handle: Some(MethodHandle(0x0600_0001)),
                }],
            }],
            type_sources: HashMap::from([("App.Foo".into(), "class Foo {}".into())]),
            method_sources: HashMap::from([(0x0600_0001, "void Bar() {}".into())]),
        }
    }

    #[test]
    fn test_load_round_trip() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(serde_json::to_string(&sample()).unwrap().as_bytes())
            .unwrap();

        let loaded = ProgramSnapshot::load(file.path()).unwrap();
        assert_eq!(loaded.name, "App");
        assert_eq!(loaded.types, sample().types);
        assert_eq!(loaded.method_sources.get(&0x0600_0001).unwrap(), "void Bar() {}");
    }

    #[test]
    fn test_load_rejects_invalid_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"{ not json").unwrap();

        assert!(matches!(
            ProgramSnapshot::load(file.path()),
            Err(AsmDocError::Snapshot(_))
        ));
    }

    #[test]
    fn test_backend_replays_captured_sources() {
        let (_, backend) = sample().into_parts();

        assert_eq!(backend.decompile_type("App.Foo").unwrap(), "class Foo {}");
        assert_eq!(
            backend.decompile_type("App.Gone"),
            Err(DecompileError::UnknownType("App.Gone".into()))
        );
        assert_eq!(
            backend.decompile_method(MethodHandle(0x0600_0001)).unwrap(),
            "void Bar() {}"
        );
        assert_eq!(
            backend.decompile_method(MethodHandle(9)),
            Err(DecompileError::UnknownHandle(9))
        );
    }
}
