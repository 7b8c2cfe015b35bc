//! Renders the shipped demo descriptions with the shipped templates

use std::path::{Path, PathBuf};

use touchosc_compiler::template::TemplateSource;
use touchosc_compiler::{
    render, write_output, Description, OutputOptions, RenderConfig, DEFAULT_ROOT,
};

fn repo_path(relative: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join(relative)
}

fn render_demo(name: &str) -> String {
    let description = Description::from_file(&repo_path(&format!("demos/{}.json", name)))
        .expect("Demo should parse");
    render(&description, DEFAULT_ROOT, &repo_path("templates")).expect("Demo should render")
}

#[test]
fn test_mixer_demo_structure() {
    let xml = render_demo("mixer");

    assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?><layout version=\"17\""));
    assert!(xml.trim_end().ends_with("</layout>"));
    assert_eq!(xml.matches("<tabpage ").count(), 2);
    assert_eq!(xml.matches("type=\"faderv\"").count(), 8);
    assert_eq!(xml.matches("type=\"labelh\"").count(), 9);
    assert_eq!(xml.matches("type=\"push\"").count(), 4);
    assert_eq!(xml.matches("<control ").count(), xml.matches("</control>").count());
}

#[test]
fn test_mixer_demo_placeholders() {
    let xml = render_demo("mixer");

    // Page and title text: "Live Mixer"
    assert!(xml.contains("name=\"TGl2ZSBNaXhlcg==\""));
    // Fader name "ch_fader_1" from reusable arguments, OSC "/mixer/fader/8"
    assert!(xml.contains("name=\"Y2hfZmFkZXJfMQ==\""));
    assert!(xml.contains("osc_cs=\"L21peGVyL2ZhZGVyLzg=\""));
    // Group arguments override the reusable component's color
    assert!(xml.contains("color=\"green\""));
    assert!(!xml.contains("color=\"yellow\""));
    // Second channel label reads "Snare"
    assert!(xml.contains("text=\"U25hcmU=\""));
    // Scene grid: last cell is column 2, row 2 showing "Outro"
    assert!(xml.contains("name=\"c2NlbmVfMl8y\""));
    assert!(xml.contains("text=\"T3V0cm8=\""));
    // Eighth fader column: 10 + 7 * 62
    assert!(xml.contains("x=\"444\""));
    assert!(!xml.contains("{{"));
}

#[test]
fn test_shipped_templates_listed() {
    let names = RenderConfig::new()
        .with_templates_dir(repo_path("templates"))
        .composer()
        .list_templates()
        .unwrap();
    assert_eq!(names, vec!["_header.xml", "component.xml", "layout.xml"]);
}

#[test]
fn test_mixer_demo_archive() {
    let xml = render_demo("mixer");
    let dir = tempfile::tempdir().unwrap();
    let options = OutputOptions::new("mixer", dir.path().join("mixer"));

    let paths = write_output(&xml, &options).unwrap();
    let archive = paths.archive.expect("archive should be written");
    assert!(archive.ends_with("mixer/mixer.touchosc"));

    let mut zip = zip::ZipArchive::new(std::fs::File::open(&archive).unwrap()).unwrap();
    assert_eq!(zip.len(), 1);
    assert_eq!(zip.by_index(0).unwrap().name(), "index.xml");
}
