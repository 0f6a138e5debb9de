//! Tests for the `cotton render` and `cotton compile` commands.

use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

use super::cotton_cmd;

/// Project with `templates/cotton/button.html` and `templates/page.html`.
fn project() -> TempDir {
    let temp = TempDir::new().unwrap();
    let templates = temp.path().join("templates");
    fs::create_dir_all(templates.join("cotton")).unwrap();
    fs::write(templates.join("cotton/button.html"), "<button {{ attrs }}>{{ slot }}</button>").unwrap();
    fs::write(templates.join("page.html"), r#"<c-button class="big">{{ label }}</c-button>"#).unwrap();
    temp
}

#[test]
fn test_render_with_var() {
    let temp = project();
    cotton_cmd(temp.path())
        .args(["render", "page.html", "--var", "label=Go"])
        .assert()
        .success()
        .stdout(r#"<button class="big">Go</button>"#);
}

#[test]
fn test_render_typed_vars() {
    let temp = project();
    fs::write(temp.path().join("templates/sum.html"), "{{ n + 1 }} {{ tags | length }}").unwrap();

    cotton_cmd(temp.path())
        .args(["render", "sum.html", "--var", "n=41", "--var", "tags=['a', 'b']"])
        .assert()
        .success()
        .stdout("42 2");
}

#[test]
fn test_render_context_file_to_output_file() {
    let temp = project();
    fs::write(temp.path().join("a.json"), r#"{"label": "First"}"#).unwrap();
    fs::write(temp.path().join("b.json"), r#"{"label": "Second"}"#).unwrap();

    cotton_cmd(temp.path())
        .args(["render", "page.html", "--context", "a.json", "--context", "b.json", "-o", "out.html"])
        .assert()
        .success()
        .stdout("");

    let written = fs::read_to_string(temp.path().join("out.html")).unwrap();
    assert_eq!(written, r#"<button class="big">Second</button>"#);
}

#[test]
fn test_render_template_dir_and_cotton_dir() {
    let temp = TempDir::new().unwrap();
    let site = temp.path().join("site");
    fs::create_dir_all(site.join("parts")).unwrap();
    fs::write(site.join("parts/note.html"), "[{{ slot }}]").unwrap();
    fs::write(site.join("index.html"), "<c-note>hi</c-note>").unwrap();

    cotton_cmd(temp.path())
        .args(["render", "index.html", "--template-dir", "site", "--cotton-dir", "parts"])
        .assert()
        .success()
        .stdout("[hi]");
}

#[test]
fn test_render_missing_template_suggests() {
    let temp = project();
    cotton_cmd(temp.path())
        .args(["render", "pag.html"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("template 'pag.html' not found"))
        .stderr(predicate::str::contains("Did you mean: page.html?"));
}

#[test]
fn test_render_invalid_var() {
    let temp = project();
    cotton_cmd(temp.path())
        .args(["render", "page.html", "--var", "label"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid variable assignment 'label'"));
}

#[test]
fn test_render_context_must_be_object() {
    let temp = project();
    fs::write(temp.path().join("list.json"), "[1, 2, 3]").unwrap();

    cotton_cmd(temp.path())
        .args(["render", "page.html", "--context", "list.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid context file"));
}

#[test]
fn test_render_syntax_error() {
    let temp = project();
    fs::write(temp.path().join("templates/broken.html"), "<div>\n<c-button>unclosed\n</div>").unwrap();

    cotton_cmd(temp.path())
        .args(["render", "broken.html"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("syntax error in 'broken.html'"));
}

#[test]
fn test_compile_prints_tag_syntax() {
    let temp = project();
    cotton_cmd(temp.path())
        .args(["compile", "templates/page.html"])
        .assert()
        .success()
        .stdout(r#"{% cotton_component 'button' 'button_0' class="big" %}{{ label }}{% end_cotton_component %}"#);
}

#[test]
fn test_compile_missing_file() {
    let temp = TempDir::new().unwrap();
    cotton_cmd(temp.path())
        .args(["compile", "nope.html"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read template: nope.html"));
}
