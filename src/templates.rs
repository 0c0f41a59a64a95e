//! Prompt template engine over a closed set of embedded assets.
//!
//! The four prompt assets are a closed set, so each [`PromptKind`] tag maps
//! to a fixed resource resolved at compile time; there is no runtime
//! resource lookup. All templates are registered with handlebars at
//! construction; a template that fails to compile is a startup error, and
//! the registry is read-only afterwards.

use handlebars::Handlebars;
use serde::Serialize;

use crate::error::{AsmDocError, Result};
use crate::markup::decode_entities;

/// The closed set of prompt assets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PromptKind {
    /// Class/method metadata rendered into preprocessed info text.
    ClassInfo,
    /// Wraps the preprocessed info into the final documentation prompt.
    MethodInstruction,
    /// System instructions for the documentation agent.
    DocumentationInstruction,
    /// System instructions for the analysis agent.
    AnalysisInstruction,
}

impl PromptKind {
    pub const ALL: [PromptKind; 4] = [
        PromptKind::ClassInfo,
        PromptKind::MethodInstruction,
        PromptKind::DocumentationInstruction,
        PromptKind::AnalysisInstruction,
    ];

    fn template_name(self) -> &'static str {
        match self {
            PromptKind::ClassInfo => "class-info",
            PromptKind::MethodInstruction => "method-instruct",
            PromptKind::DocumentationInstruction => "docgen-instruct",
            PromptKind::AnalysisInstruction => "analysis-instruct",
        }
    }

    fn asset(self) -> &'static str {
        match self {
            PromptKind::ClassInfo => include_str!("../templates/class-info.hbs"),
            PromptKind::MethodInstruction => include_str!("../templates/method-instruct.md"),
            PromptKind::DocumentationInstruction => include_str!("../templates/docgen-instruct.md"),
            PromptKind::AnalysisInstruction => include_str!("../templates/analysis-instruct.md"),
        }
    }
}

/// Renders prompt templates and undoes markup escaping in the result.
///
/// Decompiled source arrives markup-escaped and handlebars escapes
/// substituted values again; rendering therefore always finishes with
/// entity decoding so the final prompt contains literal source syntax.
pub struct PromptEngine {
    handlebars: Handlebars<'static>,
}

impl PromptEngine {
    pub fn new() -> Result<Self> {
        let mut handlebars = Handlebars::new();
        for kind in PromptKind::ALL {
            handlebars
                .register_template_string(kind.template_name(), kind.asset())
                .map_err(|e| {
                    AsmDocError::TemplateRegister(format!("{}: {e}", kind.template_name()))
                })?;
        }
        Ok(Self { handlebars })
    }

    /// Renders `data` into the named template, then decodes markup
    /// entities in the output.
    pub fn render<T: Serialize>(&self, kind: PromptKind, data: &T) -> Result<String> {
        let rendered = self
            .handlebars
            .render(kind.template_name(), data)
            .map_err(|e| AsmDocError::TemplateRender(e.to_string()))?;
        Ok(decode_entities(&rendered))
    }

    /// Raw asset text, used for system-instruction turns.
    pub fn instructions(&self, kind: PromptKind) -> &'static str {
        kind.asset()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::descriptor::{ClassDescriptor, MethodDescriptor};

    fn engine() -> PromptEngine {
        PromptEngine::new().unwrap()
    }

    fn descriptor() -> ClassDescriptor {
        ClassDescriptor {
            assembly: "App".into(),
            name: "Foo".into(),
            class_name: "App.Foo".into(),
            methods: vec![MethodDescriptor {
                name: "Bar".into(),
                method_name: "App.Foo.Bar".into(),
                source_code: Some("void Bar() { if (a < b && c > d) return; }".into()),
            }],
            parent_type: None,
            source_code: Some("class Foo { }".into()),
        }
    }

    #[test]
    fn test_all_templates_register() {
        let engine = engine();
        for kind in PromptKind::ALL {
            assert!(!engine.instructions(kind).is_empty());
        }
    }

    #[test]
    fn test_class_info_render_keeps_literal_source() {
        let rendered = engine().render(PromptKind::ClassInfo, &descriptor()).unwrap();

        assert!(rendered.contains("# Class `App.Foo`"));
        assert!(rendered.contains("### `App.Foo.Bar`"));
        // Escaping applied during rendering must be fully undone.
        assert!(rendered.contains("if (a < b && c > d) return;"));
        assert!(!rendered.contains("&lt;"));
        assert!(!rendered.contains("&amp;"));
    }

    #[test]
    fn test_missing_method_source_renders_placeholder() {
        let mut descriptor = descriptor();
        descriptor.methods[0].source_code = None;

        let rendered = engine().render(PromptKind::ClassInfo, &descriptor).unwrap();
        assert!(rendered.contains("No source text could be reconstructed for this method."));
    }

    #[test]
    fn test_two_stage_documentation_prompt() {
        let engine = engine();
        let class_info = engine.render(PromptKind::ClassInfo, &descriptor()).unwrap();
        let prompt = engine
            .render(
                PromptKind::MethodInstruction,
                &json!({ "preprocessed_method_info": class_info }),
            )
            .unwrap();

        assert!(prompt.contains("# Class `App.Foo`"));
        assert!(prompt.contains("Write reference documentation"));
        assert!(prompt.contains("if (a < b && c > d) return;"));
    }

    #[test]
    fn test_render_then_decode_is_idempotent() {
        let engine = engine();
        let first = engine.render(PromptKind::ClassInfo, &descriptor()).unwrap();
        assert_eq!(decode_entities(&first), first);
    }
}
