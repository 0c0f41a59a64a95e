//! Symbol model of the compiled program under analysis.
//!
//! The program is inspected through its own type/method symbol tables; no
//! external file format is defined here. [`ProgramImage`] is the seam a
//! metadata reader implements; the shipped implementation is the recorded
//! snapshot in [`crate::snapshot`].

use serde::{Deserialize, Serialize};

/// Kind of a type symbol in the program's metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeKind {
    Class,
    Interface,
    Struct,
    Enum,
    Delegate,
}

/// Opaque metadata token identifying a method body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MethodHandle(pub u32);

/// A method symbol as declared in the image metadata.
///
/// `handle` is `None` for synthetic, compiler-generated members (e.g.
/// auto-property accessors emitted without a body token).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodSymbol {
    pub name: String,
    pub full_name: String,
    #[serde(default)]
    pub handle: Option<MethodHandle>,
}

/// A type symbol with its declared methods in metadata order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeSymbol {
    pub kind: TypeKind,
    pub name: String,
    pub full_name: String,
    /// Enclosing type, for nested declarations.
    #[serde(default)]
    pub parent: Option<String>,
    #[serde(default)]
    pub methods: Vec<MethodSymbol>,
}

/// The compiled program under analysis, seen through its symbol tables.
///
/// `type_symbols` yields symbols in the image's own metadata order. That
/// order is not sorted and not guaranteed stable across compiler versions;
/// callers must not depend on cross-build ordering.
pub trait ProgramImage: Send + Sync {
    /// Root namespace of the program (e.g. `App.Tool`).
    fn root_namespace(&self) -> &str;

    /// All type symbols in metadata order.
    fn type_symbols(&self) -> Vec<TypeSymbol>;
}
