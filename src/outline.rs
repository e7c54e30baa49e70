//! Plain-text outline of a compiled template
//!
//! One line per node, two spaces of indentation per level. Whitespace-only
//! text is omitted. Used by the `tdc` binary and in snapshot tests.

use std::fmt::{self, Write};

use crate::compiler::{BranchConstruct, CompiledElement, CompiledNode, CompiledTemplate};
use crate::parser::ast::{Attribute, AttributeValue};
use crate::runtime::Refs;

const INDENT: &str = "  ";

/// Render the compiled tree followed by its ref table
pub fn render(template: &CompiledTemplate) -> String {
    Outline(template).to_string()
}

/// Render a live binding as `name -> #id` lines
pub fn render_binding<H>(refs: Refs<'_, H>) -> String {
    BindingOutline(refs).to_string()
}

/// Display adapter for a compiled template outline
pub struct Outline<'a>(pub &'a CompiledTemplate);

impl fmt::Display for Outline<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for node in self.0.nodes() {
            write_node(f, node, 0)?;
        }

        let table = self.0.ref_table();
        if !table.is_empty() {
            writeln!(f, "refs")?;
            for entry in table.iter() {
                let candidates: Vec<String> =
                    entry.candidates.iter().map(|c| c.to_string()).collect();
                writeln!(
                    f,
                    "{INDENT}{} -> <{}> {} (candidates {})",
                    entry.name,
                    entry.tag,
                    entry.node,
                    candidates.join(", ")
                )?;
            }
        }
        Ok(())
    }
}

/// Display adapter for a live ref binding
pub struct BindingOutline<'a, H>(pub Refs<'a, H>);

impl<H> fmt::Display for BindingOutline<'_, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let refs = self.0;
        for name in refs.names() {
            if let Some(node) = refs.node(name) {
                writeln!(f, "{} -> {}", name, node)?;
            }
        }
        Ok(())
    }
}

fn write_node(out: &mut impl Write, node: &CompiledNode, depth: usize) -> fmt::Result {
    let pad = INDENT.repeat(depth);
    match node {
        CompiledNode::Element(el) => {
            write!(out, "{pad}")?;
            write_open_tag(out, el)?;
            writeln!(out, " {}", el.id)?;
            for child in &el.children {
                write_node(out, child, depth + 1)?;
            }
        }
        CompiledNode::Text { content, .. } => {
            let trimmed = content.trim();
            if !trimmed.is_empty() {
                writeln!(out, "{pad}{:?}", trimmed)?;
            }
        }
        CompiledNode::Comment { content, .. } => writeln!(out, "{pad}<!--{}-->", content)?,
        CompiledNode::Branch(branch) => write_branch(out, branch, depth)?,
    }
    Ok(())
}

fn write_branch(out: &mut impl Write, branch: &BranchConstruct, depth: usize) -> fmt::Result {
    let pad = INDENT.repeat(depth);
    writeln!(out, "{pad}branch")?;
    for (i, entry) in branch.entries.iter().enumerate() {
        let keyword = if i == 0 { "if" } else { "elseif" };
        writeln!(
            out,
            "{pad}{INDENT}{}:{} {}",
            keyword,
            entry.polarity(),
            entry.expression()
        )?;
        write_node(out, &entry.subtree, depth + 2)?;
    }
    if let Some(default) = &branch.default {
        writeln!(out, "{pad}{INDENT}else")?;
        write_node(out, default, depth + 2)?;
    }
    Ok(())
}

fn write_open_tag(out: &mut impl Write, el: &CompiledElement) -> fmt::Result {
    write!(out, "<{}", el.tag)?;
    for attr in &el.attributes {
        write!(out, " ")?;
        write_attribute(out, attr)?;
    }
    if let Some(name) = &el.reference {
        write!(out, " ref=\"{}\"", name)?;
    }
    write!(out, ">")
}

fn write_attribute(out: &mut impl Write, attr: &Attribute) -> fmt::Result {
    match attr.value.as_ref().map(|v| &v.node) {
        None => write!(out, "{}", attr.name()),
        Some(AttributeValue::Literal(s)) => write!(out, "{}=\"{}\"", attr.name(), s),
        Some(AttributeValue::Expression(expr)) => write!(out, "{}={}", attr.name(), expr),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compile_source;
    use crate::compiler::CompileOptions;
    use crate::runtime::LiveRefBinding;

    fn outline(source: &str) -> String {
        render(&compile_source(source, &CompileOptions::default()).expect("Should compile"))
    }

    #[test]
    fn test_outline_chain() {
        let out = outline(
            r#"<div class="card">
  <p if:true={a} ref="msg">X</p>
  <p elseif:false={b}>Y</p>
  <p else ref="msg">Z</p>
</div>"#,
        );
        insta::assert_snapshot!(out, @r###"
        <div class="card"> #0
          branch
            if:true {a}
              <p ref="msg"> #2
                "X"
            elseif:false {b}
              <p> #5
                "Y"
            else
              <p ref="msg"> #8
                "Z"
        refs
          msg -> <p> #8 (candidates #2, #8)
        "###);
    }

    #[test]
    fn test_outline_comments_and_attributes() {
        let out = outline(
            r#"<template preserve-comments><!-- note --><input type="text" value={name} disabled/></template>"#,
        );
        insta::assert_snapshot!(out, @r###"
        <template> #0
          <!-- note -->
          <input type="text" value={name} disabled> #2
        "###);
    }

    #[test]
    fn test_outline_display_writes_into_formatter() {
        let template = compile_source(r#"<p ref="x">hi</p>"#, &CompileOptions::default())
            .expect("Should compile");
        let mut out = String::from("> ");
        write!(out, "{}", Outline(&template)).expect("String writes cannot fail");
        assert_eq!(out, format!("> {}", render(&template)));
        assert_eq!(render(&template), "<p ref=\"x\"> #0\n  \"hi\"\nrefs\n  x -> <p> #0 (candidates #0)\n");
    }

    #[test]
    fn test_render_binding() {
        let template =
            compile_source(r#"<div><a ref="z"></a><b ref="y"></b></div>"#, &CompileOptions::default())
                .expect("Should compile");
        let ids = template.materialize(|_| true);
        let binding = LiveRefBinding::from_render(
            &template,
            ids.into_iter()
                .map(|id| crate::runtime::RenderedNode::new(id, ())),
        );
        assert_eq!(render_binding(binding.refs()), "y -> #2\nz -> #1\n");
    }
}
