//! Descriptor value objects flowing through the dispatch pipeline.
//!
//! Descriptors are assembled once per scan pass by the catalog builder and
//! never mutated afterwards. Source text is a snapshot taken at scan time,
//! not a live view of the underlying symbol, and a descriptor does not
//! outlive the pass that produced it.

use serde::Serialize;

/// One method of a scanned class.
///
/// `source_code` is absent when reconstruction failed or the method is a
/// synthetic member; downstream consumers must tolerate that.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MethodDescriptor {
    pub name: String,
    /// Fully-qualified method name.
    pub method_name: String,
    pub source_code: Option<String>,
}

/// One class owned by the scanned program.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassDescriptor {
    /// Root namespace of the owning image.
    pub assembly: String,
    pub name: String,
    /// Fully-qualified class name.
    pub class_name: String,
    /// Method descriptors in metadata order.
    pub methods: Vec<MethodDescriptor>,
    /// Enclosing type, for nested classes.
    pub parent_type: Option<String>,
    pub source_code: Option<String>,
}
