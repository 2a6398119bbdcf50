//! Integration tests for template rendering.

use std::fs;
use std::path::Path;

use netcfg_render::{render_path, RenderError, TemplateRenderer};
use serde_json::json;
use tempfile::tempdir;

fn write(root: &Path, name: &str, content: &str) {
    let path = root.join(name);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

#[test]
fn test_include_relative_to_including_template() {
    let dir = tempdir().unwrap();
    let root = dir.path().join("templates");
    write(&root, "a/main.j2", "main\n{% include \"../b/part.j2\" %}");
    write(&root, "b/part.j2", "part for {{ hostname }}\n");
    // Would be picked up if the path were taken relative to the root's parent
    write(dir.path(), "b/part.j2", "WRONG\n");

    let out = TemplateRenderer::new(&root)
        .render("a/main.j2", &json!({ "hostname": "r1" }))
        .unwrap();
    assert_eq!(out, "main\npart for r1\n");
}

#[test]
fn test_nested_includes_chain_relative_paths() {
    let dir = tempdir().unwrap();
    write(dir.path(), "os/eos/leaf.j2", "{% include \"../../common/base.j2\" %}");
    write(dir.path(), "common/base.j2", "{% include \"aaa.j2\" %}");
    write(dir.path(), "common/aaa.j2", "aaa new-model\n");

    let out = TemplateRenderer::new(dir.path())
        .render("os/eos/leaf.j2", &json!({}))
        .unwrap();
    assert_eq!(out, "aaa new-model\n");
}

#[test]
fn test_include_escaping_root_fails() {
    let dir = tempdir().unwrap();
    let root = dir.path().join("templates");
    write(&root, "main.j2", "{% include \"../secret.j2\" %}");
    write(dir.path(), "secret.j2", "leaked\n");

    let err = TemplateRenderer::new(&root)
        .render("main.j2", &json!({}))
        .unwrap_err();
    assert!(matches!(err, RenderError::Template(_)));
}

#[test]
fn test_raise_reports_file_and_line() {
    let dir = tempdir().unwrap();
    write(
        dir.path(),
        "router.j2",
        "hostname {{ hostname }}\n{% if ASN is None %}\n{{ raise(\"bad config\") }}\n{% endif %}\n",
    );

    let err = TemplateRenderer::new(dir.path())
        .render("router.j2", &json!({ "hostname": "r1", "ASN": null }))
        .unwrap_err();

    match &err {
        RenderError::Raised {
            template,
            line,
            message,
        } => {
            assert_eq!(template, "router.j2");
            assert_eq!(*line, 3);
            assert_eq!(message, "bad config");
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert_eq!(err.to_string(), "router.j2:3: bad config");
}

#[test]
fn test_raise_inside_include_names_included_file() {
    let dir = tempdir().unwrap();
    write(dir.path(), "main.j2", "line one\n{% include \"parts/bgp.j2\" %}");
    write(dir.path(), "parts/bgp.j2", "{{ raise(\"ASN required\") }}\n");

    let err = TemplateRenderer::new(dir.path())
        .render("main.j2", &json!({}))
        .unwrap_err();
    let text = err.to_string();
    assert!(text.contains("parts/bgp.j2"), "{}", text);
    assert!(text.contains("ASN required"), "{}", text);
}

#[test]
fn test_helpers_available_in_templates() {
    let dir = tempdir().unwrap();
    write(
        dir.path(),
        "intf.j2",
        concat!(
            "{% for name in INTF_DESC|ifaces_numeric %}\n",
            "interface {{ name }}\n",
            "{% if name is startswith(\"Vlan\") %}\n",
            " ip address {{ INTF_IPADDR[name] }}\n",
            "{% endif %}\n",
            "{% if name is contains(shutdown) %}\n",
            " shutdown\n",
            "{% endif %}\n",
            "{% endfor %}\n",
        ),
    );

    let vars = json!({
        "INTF_DESC": { "Ethernet10": "", "Ethernet2": "", "Vlan1": "svi" },
        "INTF_IPADDR": { "Vlan1": "10.0.0.1/24" },
        "shutdown": ["Ethernet10"],
    });

    let out = TemplateRenderer::new(dir.path()).render("intf.j2", &vars).unwrap();
    assert_eq!(
        out,
        "interface Ethernet2\ninterface Ethernet10\n shutdown\ninterface Vlan1\n ip address 10.0.0.1/24\n"
    );
}

#[test]
fn test_render_path_uses_template_directory() {
    let dir = tempdir().unwrap();
    write(dir.path(), "site/main.j2", "{% include \"snmp.j2\" %}");
    write(dir.path(), "site/snmp.j2", "snmp-server community {{ community }}\n");

    let out = render_path(&dir.path().join("site/main.j2"), &json!({ "community": "ro" })).unwrap();
    assert_eq!(out, "snmp-server community ro\n");
}

#[test]
fn test_other_engine_errors_pass_through() {
    let dir = tempdir().unwrap();
    write(dir.path(), "broken.j2", "{% if %}\n");

    let err = TemplateRenderer::new(dir.path())
        .render("broken.j2", &json!({}))
        .unwrap_err();
    assert!(matches!(err, RenderError::Template(_)));
}
