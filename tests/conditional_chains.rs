//! Integration tests for conditional chain compilation and branch selection

use std::collections::HashMap;

use pretty_assertions::assert_eq;
use template_directives::{
    compile_source, CompileError, CompileOptions, CompiledNode, CompiledTemplate, NodeId, Polarity,
};

fn compile_ok(source: &str) -> CompiledTemplate {
    compile_source(source, &CompileOptions::default()).expect("Should compile")
}

fn compile_err(source: &str) -> Vec<CompileError> {
    match compile_source(source, &CompileOptions::default()) {
        Err(template_directives::Error::Compile(errors)) => errors,
        other => panic!("Expected compile errors, got {:?}", other),
    }
}

fn root_children(compiled: &CompiledTemplate) -> &[CompiledNode] {
    match &compiled.nodes()[0] {
        CompiledNode::Element(el) => &el.children,
        other => panic!("Expected element, got {:?}", other),
    }
}

fn branches(nodes: &[CompiledNode]) -> Vec<&template_directives::BranchConstruct> {
    nodes
        .iter()
        .filter_map(|n| match n {
            CompiledNode::Branch(b) => Some(b),
            _ => None,
        })
        .collect()
}

const XYZ: &str = r#"<div>
  <p if:true={a}>X</p>
  <p elseif:true={b}>Y</p>
  <p elseif:true={c}>W</p>
  <p else>Z</p>
</div>"#;

#[test]
fn test_chain_entries_follow_source_order() {
    let compiled = compile_ok(XYZ);
    let found = branches(root_children(&compiled));
    assert_eq!(found.len(), 1);
    let exprs: Vec<_> = found[0]
        .entries
        .iter()
        .map(|e| e.expression().as_str())
        .collect();
    assert_eq!(exprs, vec!["a", "b", "c"]);
    assert!(found[0].default.is_some());
}

#[test]
fn test_scenario_second_branch_selected_with_single_evaluations() {
    let compiled = compile_ok(XYZ);
    let values: HashMap<&str, bool> = [("a", false), ("b", true), ("c", true)].into();
    let mut calls = Vec::new();

    let rendered = compiled.materialize(|expr| {
        calls.push(expr.as_str().to_string());
        values[expr.as_str()]
    });

    // Surrounding whitespace text, then only the "Y" paragraph and its text
    assert_eq!(
        rendered,
        vec![NodeId(0), NodeId(1), NodeId(5), NodeId(6), NodeId(13)]
    );
    assert_eq!(calls, vec!["a", "b"]);
}

#[test]
fn test_no_match_without_else_renders_nothing() {
    let compiled = compile_ok("<div><p if:true={a}>X</p><p elseif:false={b}>Y</p></div>");
    let rendered = compiled.materialize(|expr| expr.as_str() == "b");
    assert_eq!(rendered, vec![NodeId(0)]);
}

#[test]
fn test_false_polarity_matches_falsy() {
    let compiled = compile_ok("<div><p if:false={loading}>ready</p><p else>wait</p></div>");
    let found = branches(root_children(&compiled));
    assert_eq!(found[0].entries[0].polarity(), Polarity::False);

    let ready = compiled.materialize(|_| false);
    assert_eq!(ready, vec![NodeId(0), NodeId(1), NodeId(2)]);
    let waiting = compiled.materialize(|_| true);
    assert_eq!(waiting, vec![NodeId(0), NodeId(3), NodeId(4)]);
}

#[test]
fn test_if_after_chain_starts_new_chain() {
    let compiled = compile_ok("<div><i if:true={a}></i><i else></i><b if:true={c}></b><b else></b></div>");
    assert_eq!(branches(root_children(&compiled)).len(), 2);
}

#[test]
fn test_template_grouping_as_branch() {
    let compiled = compile_ok(
        "<div><template if:true={a}><p>one</p><p>two</p></template><template else><p>none</p></template></div>",
    );
    let rendered = compiled.materialize(|_| true);
    assert_eq!(
        rendered,
        vec![NodeId(0), NodeId(1), NodeId(2), NodeId(3), NodeId(4), NodeId(5)]
    );
}

#[test]
fn test_elseif_without_if_is_orphaned() {
    let errors = compile_err("<div><p elseif:true={b}>Y</p></div>");
    assert_eq!(errors.len(), 1);
    assert!(matches!(&errors[0], CompileError::OrphanedElseDirective { .. }));
}

#[test]
fn test_else_at_top_level_is_orphaned() {
    let errors = compile_err("<p else>Z</p>");
    assert!(matches!(&errors[0], CompileError::OrphanedElseDirective { .. }));
}

#[test]
fn test_if_in_parent_does_not_open_chain_for_children() {
    let errors = compile_err("<div if:true={a}><p else>Z</p></div>");
    assert_eq!(errors.len(), 1);
    assert!(matches!(
        &errors[0],
        CompileError::OrphanedElseDirective { node, .. } if *node == NodeId(1)
    ));
}

#[test]
fn test_text_between_members_is_non_adjacent() {
    let errors = compile_err("<div><p if:true={a}>X</p> hello <p else>Z</p></div>");
    assert_eq!(errors.len(), 1);
    assert!(matches!(&errors[0], CompileError::NonAdjacentConditional { .. }));
}

#[test]
fn test_element_between_members_is_non_adjacent() {
    let errors = compile_err("<div><p if:true={a}>X</p><hr/><p elseif:true={b}>Y</p></div>");
    assert!(matches!(&errors[0], CompileError::NonAdjacentConditional { .. }));
}

#[test]
fn test_comment_adjacency_depends_on_scope() {
    let source = "<template preserve-comments><p if:true={a}></p><!-- c --><p else></p></template>";
    let errors = compile_err(source);
    assert!(matches!(&errors[0], CompileError::NonAdjacentConditional { .. }));

    let relaxed = "<template><p if:true={a}></p><!-- c --><p else></p></template>";
    assert!(compile_source(relaxed, &CompileOptions::default()).is_ok());
}

#[test]
fn test_two_conditionals_on_one_node() {
    for source in [
        "<div><p if:true={a} elseif:true={b}></p></div>",
        "<div><p if:true={a} else></p></div>",
        "<div><p elseif:false={a} else></p></div>",
    ] {
        let errors = compile_err(source);
        assert!(
            errors
                .iter()
                .any(|e| matches!(e, CompileError::MultipleConditionalDirectives { .. })),
            "source: {}",
            source
        );
    }
}

#[test]
fn test_literal_condition_rejected() {
    let errors = compile_err(r#"<div><p if:true="a">X</p></div>"#);
    assert_eq!(errors.len(), 1);
    assert!(matches!(&errors[0], CompileError::DynamicRefValue { .. }));
}

#[test]
fn test_else_with_value_rejected() {
    let errors = compile_err("<div><p if:true={a}></p><p else={b}></p></div>");
    assert_eq!(errors.len(), 1);
    assert!(matches!(&errors[0], CompileError::ElseWithValue { .. }));
}

#[test]
fn test_all_errors_are_reported() {
    let errors = compile_err(
        r#"<div>
  <p else>a</p>
  <section>
    <p if:true={x}></p>
    <hr/>
    <p elseif:true={y}></p>
  </section>
  <input ref={field}/>
</div>"#,
    );
    let kinds: Vec<_> = errors
        .iter()
        .map(|e| match e {
            CompileError::OrphanedElseDirective { .. } => "orphaned",
            CompileError::NonAdjacentConditional { .. } => "non-adjacent",
            CompileError::DynamicRefValue { .. } => "value",
            _ => "other",
        })
        .collect();
    assert_eq!(kinds, vec!["orphaned", "non-adjacent", "value"]);
}

#[test]
fn test_compilation_is_deterministic() {
    assert_eq!(compile_ok(XYZ), compile_ok(XYZ));
}
