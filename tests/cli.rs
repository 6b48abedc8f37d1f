use assert_cmd::prelude::*;
use predicates::str::contains;
use std::io::Write;
use std::process::Command;
use tempfile::NamedTempFile;

fn write_scene() -> NamedTempFile {
    let scene = r#"<scene>
  <sun>
    <elevation>12</elevation>
    <azimuth>200</azimuth>
  </sun>
  <water>
    <distortion-scale>2.5</distortion-scale>
  </water>
  <sky>
    <turbidity>4</turbidity>
  </sky>
</scene>
"#;
    let mut tmp = NamedTempFile::new().expect("temp scene");
    tmp.write_all(scene.as_bytes()).expect("write scene");
    tmp
}

#[test]
fn cli_prints_stage_summary_for_scene_file() {
    let scene = write_scene();
    let mut cmd = Command::cargo_bin("seascape-runtime").expect("binary exists");
    cmd.arg(scene.path()).arg("--summary-only");
    cmd.assert()
        .success()
        .stdout(contains("Loaded ocean scene (sun elevation 12.0, azimuth 200.0)"))
        .stdout(contains("Stage contains 3 nodes"))
        .stdout(contains(" - water plane 10000 x 10000 (distortion 2.5, speed 0.0)"))
        .stdout(contains(" - sky dome scale 10000 (turbidity 4.0)"))
        .stdout(contains(" - environment map baked 64x32"));
}

#[test]
fn cli_defaults_to_the_stock_scene() {
    let mut cmd = Command::cargo_bin("seascape-runtime").expect("binary exists");
    cmd.arg("--summary-only");
    cmd.assert()
        .success()
        .stdout(contains("Loaded ocean scene (sun elevation 3.0, azimuth 115.0)"))
        .stdout(contains(" - hemisphere light intensity 1.0"))
        .stdout(contains(" - sun direction"));
}

#[test]
fn cli_rejects_unknown_flags() {
    let mut cmd = Command::cargo_bin("seascape-runtime").expect("binary exists");
    cmd.arg("--bogus");
    cmd.assert().failure().stderr(contains("Unknown argument"));
}

#[test]
fn cli_rejects_missing_scene_file() {
    let mut cmd = Command::cargo_bin("seascape-runtime").expect("binary exists");
    cmd.arg("no-such-scene.xml").arg("--summary-only");
    cmd.assert()
        .failure()
        .stderr(contains("failed to read scene"));
}
