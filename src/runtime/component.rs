//! Per-component ref state across render passes

use std::sync::Arc;

use crate::compiler::CompiledTemplate;

use super::binding::{LiveRefBinding, Refs, RenderedNode};

/// Ref state owned by one component instance.
///
/// The renderer calls [`ComponentRefs::on_render_complete`] after every
/// finished pass. Until then, reads see the previous pass.
#[derive(Debug)]
pub struct ComponentRefs<H> {
    template: Option<Arc<CompiledTemplate>>,
    binding: LiveRefBinding<H>,
}

impl<H> Default for ComponentRefs<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H> ComponentRefs<H> {
    pub fn new() -> Self {
        Self {
            template: None,
            binding: LiveRefBinding::empty(),
        }
    }

    /// Binding of the last completed render pass (empty before the first)
    pub fn refs(&self) -> Refs<'_, H> {
        self.binding.refs()
    }

    pub fn active_template(&self) -> Option<&Arc<CompiledTemplate>> {
        self.template.as_ref()
    }

    /// Rebuild the binding from a completed render pass.
    ///
    /// A different template (by identity) discards everything bound so far.
    pub fn on_render_complete<I>(&mut self, template: &Arc<CompiledTemplate>, rendered: I)
    where
        I: IntoIterator<Item = RenderedNode<H>>,
    {
        let swapped = match &self.template {
            Some(current) => !Arc::ptr_eq(current, template),
            None => true,
        };
        if swapped {
            tracing::debug!(
                previous_refs = self.binding.len(),
                "active template changed, discarding ref binding"
            );
            self.template = Some(Arc::clone(template));
        }

        self.binding = LiveRefBinding::from_render(template, rendered);
        tracing::debug!(refs = self.binding.len(), "ref binding rebuilt");
    }

    /// Drop the binding and the active template
    pub fn disconnect(&mut self) {
        self.template = None;
        self.binding = LiveRefBinding::empty();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::{compile, CompileOptions};
    use crate::parser::ast::NodeId;
    use crate::parser::parse;

    fn template(source: &str) -> Arc<CompiledTemplate> {
        Arc::new(
            compile(&parse(source).expect("Should parse"), &CompileOptions::default())
                .expect("Should compile"),
        )
    }

    fn render(template: &CompiledTemplate, truthy: &[&str]) -> Vec<RenderedNode<usize>> {
        template
            .materialize(|expr| truthy.contains(&expr.as_str()))
            .into_iter()
            .map(|id| RenderedNode::new(id, id.0))
            .collect()
    }

    #[test]
    fn test_empty_before_first_pass() {
        let component: ComponentRefs<usize> = ComponentRefs::new();
        assert!(component.refs().is_empty());
        assert!(component.active_template().is_none());
    }

    #[test]
    fn test_rebuilt_after_every_pass() {
        let template = template(r#"<div><p if:true={open} ref="body"></p></div>"#);
        let mut component = ComponentRefs::new();

        component.on_render_complete(&template, render(&template, &[]));
        assert_eq!(component.refs().get("body"), None);

        component.on_render_complete(&template, render(&template, &["open"]));
        assert_eq!(component.refs().get("body"), Some(&1));

        component.on_render_complete(&template, render(&template, &[]));
        assert_eq!(component.refs().get("body"), None);
    }

    #[test]
    fn test_template_swap_discards_binding() {
        let first = template(r#"<div><p ref="old"></p><i ref="shared"></i></div>"#);
        let second = template(r#"<div><b ref="shared"></b></div>"#);
        let mut component = ComponentRefs::new();

        component.on_render_complete(&first, render(&first, &[]));
        assert_eq!(component.refs().node("shared"), Some(NodeId(2)));

        component.on_render_complete(&second, render(&second, &[]));
        assert_eq!(component.refs().get("old"), None);
        assert_eq!(component.refs().node("shared"), Some(NodeId(1)));
        assert!(Arc::ptr_eq(component.active_template().unwrap(), &second));
    }

    #[test]
    fn test_disconnect() {
        let template = template(r#"<p ref="x"></p>"#);
        let mut component = ComponentRefs::new();
        component.on_render_complete(&template, render(&template, &[]));
        assert!(component.refs().contains("x"));

        component.disconnect();
        assert!(component.refs().is_empty());
        assert!(component.active_template().is_none());
    }
}
