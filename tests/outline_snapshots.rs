//! Snapshot tests for the compiled outline of the fixture templates

use template_directives::{compile_source, outline, CompileOptions};

fn outline_of(source: &str) -> String {
    outline::render(&compile_source(source, &CompileOptions::default()).expect("Should compile"))
}

#[test]
fn test_login_form_outline() {
    insta::assert_snapshot!(outline_of(include_str!("fixtures/login-form.html")), @r###"
    <template> #2
      <form ref="form"> #4
        <input type="text" value={username} ref="user"> #6
        branch
          if:true {error}
            <p class="error" ref="message"> #8
              "Login failed"
          elseif:false {online}
            <p ref="message"> #11
              "Offline"
          else
            <p> #14
              "Welcome back"
        <button disabled={busy}> #17
          "Sign in"
    refs
      form -> <form> #4 (candidates #4)
      message -> <p> #11 (candidates #8, #11)
      user -> <input> #6 (candidates #6)
    "###);
}

#[test]
fn test_tabs_outline() {
    insta::assert_snapshot!(outline_of(include_str!("fixtures/tabs.html")), @r###"
    <template> #2
      <nav ref="tabs"> #4
        branch
          if:true {tab.home}
            <a class="active"> #6
              "Home"
          else
            <a> #9
              "Home"
      <!-- panels -->
      branch
        if:false {loading}
          <section> #15
            branch
              if:true {items.length}
                <article ref="list"> #17
                  <slot> #19
              else
                <p ref="empty"> #22
                  "Nothing here"
        else
          <section ref="spinner"> #26
            "Loading"
    refs
      empty -> <p> #22 (candidates #22)
      list -> <article> #17 (candidates #17)
      spinner -> <section> #26 (candidates #26)
      tabs -> <nav> #4 (candidates #4)
    "###);
}

#[test]
fn test_duplicate_refs_outline() {
    insta::assert_snapshot!(outline_of(include_str!("fixtures/duplicate-refs.html")), @r###"
    <ul> #2
      <li ref="foo"> #4
        "first"
      <li ref="foo"> #7
        "second"
    refs
      foo -> <li> #7 (candidates #4, #7)
    "###);
}
