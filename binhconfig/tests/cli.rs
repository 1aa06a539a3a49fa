use std::fs;
use std::path::Path;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::PredicateBooleanExt;
use predicates::str::contains;
use tempfile::TempDir;

fn write_file(path: &Path, contents: &str) {
    fs::write(path, contents).expect("write test file");
}

#[test]
fn hcnf_to_json_by_default() {
    let dir = TempDir::new().expect("tempdir");
    let input = dir.path().join("input.hcnf");
    write_file(&input, "foo { bar 55 baz \"Hello World\" }\nbar 10\n");

    cargo_bin_cmd!("hconfig")
        .arg(&input)
        .assert()
        .success()
        .stdout("{\n  \"foo\": {\n    \"bar\": 55,\n    \"baz\": \"Hello World\"\n  },\n  \"bar\": 10\n}\n");
}

#[test]
fn root_value_from_stdin() {
    cargo_bin_cmd!("hconfig")
        .arg("--root-value")
        .write_stdin("[10 5 no]")
        .assert()
        .success()
        .stdout("[\n  10,\n  5,\n  \"no\"\n]\n");
}

#[test]
fn conf_with_schema() {
    let dir = TempDir::new().expect("tempdir");
    let input = dir.path().join("site.hcnf");
    let schema = dir.path().join("site.schema");
    write_file(&input, "general { port 8080 }\nvhost a.example.com { root /var/www }\n");
    write_file(&schema, "general once\nvhost many\n");

    cargo_bin_cmd!("hconfig")
        .arg(&input)
        .arg("--schema")
        .arg(&schema)
        .args(["--to", "hcnf"])
        .assert()
        .success()
        .stdout(
            "general {\n  name null\n  port 8080\n}\n\
             vhost [\n  {\n    name a.example.com\n    root /var/www\n  }\n]\n",
        );
}

#[test]
fn schema_violation_reports_location() {
    let dir = TempDir::new().expect("tempdir");
    let input = dir.path().join("site.hcnf");
    let schema = dir.path().join("site.schema");
    write_file(&input, "general { port 8080 }\ngeneral { port 8081 }\n");
    write_file(&schema, "general once\n");

    cargo_bin_cmd!("hconfig")
        .arg(&input)
        .arg("-s")
        .arg(&schema)
        .assert()
        .failure()
        .stderr(contains("Error: Section \"general\" must appear exactly once, found 2 at 2:1"));
}

#[test]
fn syntax_error_fails_check() {
    cargo_bin_cmd!("hconfig")
        .arg("--check")
        .write_stdin("key [ value")
        .assert()
        .failure()
        .stderr(contains("Unexpected end of input"));
}

#[test]
fn deep_nesting_is_rejected() {
    let depth = 100_000;
    cargo_bin_cmd!("hconfig")
        .arg("--root-value")
        .write_stdin("[".repeat(depth) + &"]".repeat(depth))
        .assert()
        .code(1)
        .stderr(contains("Error: Nesting deeper than 512 levels at 1:513"));
}

#[test]
fn out_of_range_number_stays_text() {
    cargo_bin_cmd!("hconfig")
        .write_stdin("big 1e400\n")
        .assert()
        .success()
        .stdout("{\n  \"big\": \"1e400\"\n}\n");
}

#[test]
fn check_prints_ok() {
    cargo_bin_cmd!("hconfig")
        .arg("--check")
        .write_stdin("port 8080\n")
        .assert()
        .success()
        .stdout("ok\n");
}

#[test]
fn write_uses_target_extension() {
    let dir = TempDir::new().expect("tempdir");
    let input = dir.path().join("app.hcnf");
    write_file(&input, "port 8080\nhosts [a b]\n");

    cargo_bin_cmd!("hconfig")
        .arg(&input)
        .args(["--to", "yaml", "--write"])
        .assert()
        .success()
        .stdout("");

    let written = fs::read_to_string(dir.path().join("app.yaml")).expect("read output");
    assert_eq!(written, "port: 8080\nhosts:\n- a\n- b\n");
}

#[test]
fn json_to_hcnf() {
    cargo_bin_cmd!("hconfig")
        .args(["--from", "json", "--to", "hcnf"])
        .write_stdin(r#"{"title": "two words", "n": [1, 2.5]}"#)
        .assert()
        .success()
        .stdout("title \"two words\"\nn [1 2.5]\n");
}

#[test]
fn conf_flags_require_hcnf_input() {
    cargo_bin_cmd!("hconfig")
        .args(["--from", "json", "--conf"])
        .write_stdin("{}")
        .assert()
        .failure()
        .stderr(contains("only apply to hcnf input").and(contains("Error:")));
}
