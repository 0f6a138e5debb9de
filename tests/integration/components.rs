//! Rendering components from template directories on disk.

use anyhow::Result;
use cotton::config::CottonConfig;
use cotton::templating::{Engine, FileSystemLoader, TemplateError, TemplateLoader};
use cotton::test_utils::{TemplateDir, init_test_logging};
use serde_json::json;

#[test]
fn test_page_with_nested_components() -> Result<()> {
    init_test_logging(None);
    let dir = TemplateDir::new()?
        .with_template("cotton/layout.html", "<main><header>{{ title }}</header>{{ slot }}</main>")?
        .with_template("cotton/forms/text_input.html", "<input {{ attrs }}>")?
        .with_template(
            "pages/signup.html",
            r#"<c-layout><c-slot name="title">Join {{ site }}</c-slot><c-forms.text-input name="email" required /></c-layout>"#,
        )?;

    let html = dir.engine().render("pages/signup.html", &json!({"site": "docs"}))?;
    assert_eq!(
        html,
        r#"<main><header>Join docs</header><input name="email" required="true"></main>"#
    );
    Ok(())
}

#[test]
fn test_component_list_from_context() -> Result<()> {
    let dir = TemplateDir::new()?
        .with_template("cotton/item.html", "<li>{{ label }}:{{ note }}</li>")?
        .with_template(
            "list.html",
            r#"<ul>{% for entry in entries %}<c-item :label="entry.name"><c-slot name="note">{{ entry.note }}</c-slot></c-item>{% endfor %}</ul>"#,
        )?;

    let html = dir.engine().render(
        "list.html",
        &json!({"entries": [{"name": "a", "note": "first"}, {"name": "b", "note": "second"}]}),
    )?;
    assert_eq!(html, "<ul><li>a:first</li><li>b:second</li></ul>");
    Ok(())
}

#[test]
fn test_dynamic_component_from_variable() -> Result<()> {
    let dir = TemplateDir::new()?
        .with_template("cotton/icons/star.html", "*")?
        .with_template("cotton/icons/heart.html", "<3")?
        .with_template("icons.html", r#"{% for name in names %}<c-component is="icons.{{ name }}" />{% endfor %}"#)?;

    let html = dir.engine().render("icons.html", &json!({"names": ["star", "heart", "star"]}))?;
    assert_eq!(html, "*<3*");
    Ok(())
}

#[test]
fn test_first_template_root_wins() -> Result<()> {
    let theme = TemplateDir::new()?.with_template("cotton/button.html", "theme")?;
    let base = TemplateDir::new()?
        .with_template("cotton/button.html", "base")?
        .with_template("cotton/link.html", "link")?;

    let config = CottonConfig {
        template_dirs: vec![theme.path().to_path_buf(), base.path().to_path_buf()],
        ..CottonConfig::default()
    };
    let engine = Engine::from_config(config);

    assert_eq!(engine.render_str("<c-button /> <c-link />", &json!({}))?, "theme link");
    Ok(())
}

#[test]
fn test_not_found_reports_searched_roots() -> Result<()> {
    let dir = TemplateDir::new()?.with_template("cotton/alert.html", "!")?;

    let err = dir.engine().render_str("<c-alret />", &json!({})).unwrap_err();
    match err {
        TemplateError::TemplateNotFound {
            name,
            searched,
            suggestions,
        } => {
            assert_eq!(name, "cotton/alret.html");
            assert_eq!(searched, vec![dir.path().to_path_buf()]);
            assert_eq!(suggestions, vec!["cotton/alert.html".to_string()]);
        }
        other => panic!("unexpected error: {other:?}"),
    }
    Ok(())
}

#[test]
fn test_template_names_cannot_escape_root() -> Result<()> {
    let dir = TemplateDir::new()?.with_template("page.html", "ok")?;
    let engine = dir.engine();

    let err = engine.render("../page.html", &json!({})).unwrap_err();
    assert!(matches!(err, TemplateError::InvalidTemplateName { .. }), "got {err:?}");
    Ok(())
}

#[test]
fn test_loader_lists_available_templates() -> Result<()> {
    let dir = TemplateDir::new()?
        .with_template("page.html", "")?
        .with_template("cotton/b.html", "")?
        .with_template("cotton/a.html", "")?;

    let loader = FileSystemLoader::new([dir.path()]);
    assert_eq!(loader.available(), vec!["cotton/a.html", "cotton/b.html", "page.html"]);
    Ok(())
}

#[test]
fn test_edited_template_needs_cache_clear() -> Result<()> {
    let dir = TemplateDir::new()?.with_template("cotton/tag.html", "v1")?;
    let engine = dir.engine();

    assert_eq!(engine.render_str("<c-tag />", &json!({}))?, "v1");
    dir.write("cotton/tag.html", "v2")?;
    assert_eq!(engine.render_str("<c-tag />", &json!({}))?, "v1");

    engine.clear_cache();
    assert_eq!(engine.render_str("<c-tag />", &json!({}))?, "v2");
    Ok(())
}
