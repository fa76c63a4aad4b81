#![cfg(unix)]

use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

const DOCKERFILE: &str = r#"FROM alpine:3.20

# @description: Port the app listens on
# @required: true
ARG APP_PORT=8080

# @description: Log verbosity
ENV LOG_LEVEL=info

EXPOSE 8080
"#;

const README: &str = "# My App\n\n<!-- BEGIN: dock-docs -->\nOLD CONTENT\n<!-- END: dock-docs -->\n\nFooter\n";

struct Workspace {
    dir: TempDir,
    empty_bin: TempDir,
}

impl Workspace {
    fn new() -> Self {
        let dir = TempDir::new().expect("temp workspace");
        fs::write(dir.path().join("Dockerfile"), DOCKERFILE).expect("write Dockerfile");
        Self {
            dir,
            empty_bin: TempDir::new().expect("temp bin dir"),
        }
    }

    fn path(&self) -> &Path {
        self.dir.path()
    }

    /// The binary run inside the workspace with no analysis tools reachable.
    fn command(&self) -> Command {
        let mut cmd = Command::cargo_bin("dock-docs").expect("binary built");
        cmd.current_dir(self.path())
            .env("HOME", self.path())
            .env("PATH", self.empty_bin.path())
            .env_remove("DOCKER_HOST")
            .env_remove("RUST_LOG");
        cmd
    }
}

#[test]
fn dry_run_prints_configuration() {
    let ws = Workspace::new();
    ws.command()
        .arg("--dry-run")
        .assert()
        .success()
        .stdout(predicate::str::contains("## Configuration"))
        .stdout(predicate::str::contains("APP_PORT"))
        .stdout(predicate::str::contains("LOG_LEVEL"));
}

#[test]
fn injects_between_markers() {
    let ws = Workspace::new();
    let readme = ws.path().join("README.md");
    fs::write(&readme, README).unwrap();

    ws.command().assert().success();

    let updated = fs::read_to_string(&readme).unwrap();
    assert!(!updated.contains("OLD CONTENT"));
    assert!(updated.contains("APP_PORT"));
    assert!(updated.starts_with("# My App\n\n<!-- BEGIN: dock-docs -->\n"));
    assert!(updated.ends_with("<!-- END: dock-docs -->\n\nFooter\n"));

    // A second run leaves the file as it was
    ws.command().assert().success();
    assert_eq!(fs::read_to_string(&readme).unwrap(), updated);
}

#[test]
fn missing_output_prints_to_stdout() {
    let ws = Workspace::new();
    ws.command()
        .args(["-o", "DOCS.md"])
        .assert()
        .success()
        .stdout(predicate::str::contains("APP_PORT"))
        .stderr(predicate::str::contains("output file does not exist"));
    assert!(!ws.path().join("DOCS.md").exists());
}

#[test]
fn missing_markers_print_to_stdout() {
    let ws = Workspace::new();
    let readme = ws.path().join("README.md");
    fs::write(&readme, "# No markers here\n").unwrap();

    ws.command()
        .assert()
        .success()
        .stdout(predicate::str::contains("APP_PORT"));
    assert_eq!(fs::read_to_string(&readme).unwrap(), "# No markers here\n");
}

#[test]
fn missing_dockerfile_fails() {
    let ws = Workspace::new();
    ws.command()
        .args(["-f", "nope/Dockerfile", "--dry-run"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to parse Dockerfile"));
}

#[test]
fn image_analysis_without_tools_fails() {
    let ws = Workspace::new();
    ws.command()
        .args(["--dry-run", "--image", "app:1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("analysis failed"));
}

#[test]
fn ignore_errors_renders_partial_results() {
    let ws = Workspace::new();
    ws.command()
        .args(["--dry-run", "--image", "app:1", "--ignore-errors"])
        .assert()
        .success()
        .stdout(predicate::str::contains("APP_PORT"))
        .stdout(predicate::str::contains("app:1"));
}

#[test]
fn json_template_prints_items() {
    let ws = Workspace::new();
    let output = ws
        .command()
        .args(["--dry-run", "--template", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let items = value["items"].as_array().unwrap();
    assert_eq!(items.len(), 3);
    assert_eq!(items[0]["name"], "APP_PORT");
    assert_eq!(items[0]["type"], "ARG");
    assert_eq!(items[0]["required"], true);
}

#[test]
fn html_template_writes_standalone_file() {
    let ws = Workspace::new();
    ws.command().args(["--template", "html"]).assert().success();

    let html = fs::read_to_string(ws.path().join("README.html")).unwrap();
    assert!(html.contains("<html"));
    assert!(html.contains("APP_PORT"));
    assert!(!ws.path().join("README.md").exists());
}

#[test]
fn unknown_template_fails() {
    let ws = Workspace::new();
    ws.command()
        .args(["--dry-run", "--template", "fancy"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown built-in template: fancy"));
}

#[test]
fn list_templates() {
    let ws = Workspace::new();
    ws.command()
        .arg("--list-templates")
        .assert()
        .success()
        .stdout(predicate::str::contains("Available built-in templates:"))
        .stdout(predicate::str::contains("minimal"))
        .stdout(predicate::str::contains("[html]"))
        .stdout(predicate::str::contains("dock-docs --template <name>"));
}

#[test]
fn describe_template() {
    let ws = Workspace::new();
    ws.command()
        .args(["--describe-template", "compact"])
        .assert()
        .success()
        .stdout(predicate::str::contains("name: compact"))
        .stdout(predicate::str::contains("format: markdown"));

    ws.command()
        .args(["--describe-template", "fancy"])
        .assert()
        .failure();
}

#[test]
fn check_reports_missing_tools() {
    let ws = Workspace::new();
    ws.command()
        .arg("--check")
        .assert()
        .success()
        .stdout(predicate::str::contains("Tool Status:"))
        .stdout(predicate::str::contains("[MISSING] docker or podman"))
        .stdout(predicate::str::contains("[MISSING] syft"))
        .stdout(predicate::str::contains("dock-docs setup"));
}

#[test]
fn setup_check_reads_the_given_dir() {
    let ws = Workspace::new();
    let tools = ws.path().join("tools");
    fs::create_dir_all(&tools).unwrap();
    let syft = tools.join("syft");
    fs::write(&syft, "#!/bin/sh\n").unwrap();
    fs::set_permissions(&syft, fs::Permissions::from_mode(0o755)).unwrap();

    ws.command()
        .args(["setup", "--check", "--dir"])
        .arg(&tools)
        .assert()
        .success()
        .stdout(predicate::str::contains("Tool Status:"))
        .stdout(predicate::str::contains("[OK] syft (source: dock-docs"))
        .stdout(predicate::str::contains("[MISSING] grype"));
}

#[test]
fn config_mode_writes_every_section() {
    let ws = Workspace::new();
    fs::write(
        ws.path().join("README.md"),
        "# App\n<!-- BEGIN: main -->\n<!-- END: main -->\n<!-- BEGIN: other -->\nkeep\n<!-- END: other -->\n",
    )
    .unwrap();
    fs::write(
        ws.path().join("dock-docs.yaml"),
        r#"
output: README.md
sections:
  - type: image
    marker: main
    source: Dockerfile
  - type: image
    marker: page
    template:
      name: html
  - type: gallery
    marker: other
  - type: comparison
    marker: other
    images: []
"#,
    )
    .unwrap();

    ws.command()
        .args(["-c", "dock-docs.yaml"])
        .assert()
        .success()
        .stderr(predicate::str::contains("unknown section type"));

    let readme = fs::read_to_string(ws.path().join("README.md")).unwrap();
    assert!(readme.contains("<!-- BEGIN: main -->\n## Configuration"));
    assert!(readme.contains("<!-- BEGIN: other -->\nkeep\n<!-- END: other -->"));

    let page = fs::read_to_string(ws.path().join("README-page.html")).unwrap();
    assert!(page.contains("APP_PORT"));
}

#[test]
fn config_mode_dry_run_leaves_files_untouched() {
    let ws = Workspace::new();
    let readme = ws.path().join("README.md");
    fs::write(&readme, README).unwrap();
    fs::write(
        ws.path().join("dock-docs.yaml"),
        "sections:\n  - type: image\n  - type: image\n    template: { name: json }\n",
    )
    .unwrap();

    ws.command()
        .args(["-c", "dock-docs.yaml", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("APP_PORT"))
        .stdout(predicate::str::contains("README-section1.json"));

    assert_eq!(fs::read_to_string(&readme).unwrap(), README);
    assert!(!ws.path().join("README-section1.json").exists());
}

#[test]
fn config_mode_missing_file_fails() {
    let ws = Workspace::new();
    ws.command()
        .args(["-c", "missing.yaml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read config file"));
}
