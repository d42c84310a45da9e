use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::tempdir;

#[test]
fn formats_listing_is_sorted_and_nonempty() {
    let mut cmd = Command::cargo_bin("ptv").unwrap();
    cmd.arg("--formats");
    let output = cmd.assert().success().get_output().stdout.clone();
    let text = String::from_utf8(output).unwrap();
    let names: Vec<&str> = text
        .lines()
        .filter(|l| l.starts_with("  "))
        .map(|l| l.trim())
        .collect();
    assert!(names.contains(&"kerberos_keytab"));
    assert!(names.contains(&"combolist_user_pass"));
    let mut sorted = names.clone();
    sorted.sort_unstable();
    assert_eq!(names, sorted);
}

#[test]
fn converts_combolist_file_to_csv_file() {
    let tmp = tempdir().unwrap();
    let input = tmp.path().join("combo.txt");
    let output = tmp.path().join("out.csv");
    fs::write(&input, "a@b.com:hunter2\nalice:letmein\n").unwrap();

    let mut cmd = Command::cargo_bin("ptv").unwrap();
    cmd.arg("--from")
        .arg("combolist_user_pass")
        .arg("--to")
        .arg("csv")
        .arg("-i")
        .arg(&input)
        .arg("-o")
        .arg(&output);
    cmd.assert().success();

    let text = fs::read_to_string(&output).unwrap();
    assert!(text.contains("a@b.com"));
    assert!(text.contains("letmein"));
}

#[test]
fn stdin_to_stdout_conversion() {
    let mut cmd = Command::cargo_bin("ptv").unwrap();
    cmd.arg("--from")
        .arg("combolist_email_pass")
        .arg("--to")
        .arg("ptv_json")
        .write_stdin("a@b.com:pw\n");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("\"ptv_version\": \"1.0\""))
        .stdout(predicate::str::contains("a@b.com"));
}

#[test]
fn unknown_formats_are_reported_together() {
    let mut cmd = Command::cargo_bin("ptv").unwrap();
    cmd.arg("--from")
        .arg("bogus_src")
        .arg("--to")
        .arg("bogus_dst")
        .write_stdin("");
    cmd.assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("bogus_src"))
        .stderr(predicate::str::contains("bogus_dst"));
}

#[test]
fn parse_failure_exits_with_parse_code() {
    let mut cmd = Command::cargo_bin("ptv").unwrap();
    cmd.arg("--from")
        .arg("kerberos_keytab")
        .arg("--to")
        .arg("csv")
        .write_stdin(&b"\x00\x01"[..]);
    cmd.assert().failure().code(3);
}

#[test]
fn batch_mode_writes_one_output_per_input() {
    let tmp = tempdir().unwrap();
    let in1 = tmp.path().join("one.txt");
    let in2 = tmp.path().join("two.txt");
    let outdir = tmp.path().join("out");
    fs::write(&in1, "a@b.com:pw1\n").unwrap();
    fs::write(&in2, "c@d.com:pw2\n").unwrap();

    let mut cmd = Command::cargo_bin("ptv").unwrap();
    cmd.arg("--from")
        .arg("combolist_email_pass")
        .arg("--to")
        .arg("jtr_pot")
        .arg("-i")
        .arg(&in1)
        .arg("-i")
        .arg(&in2)
        .arg("--parallel")
        .arg("-o")
        .arg(&outdir);
    cmd.assert().success();

    assert!(outdir.join("one.jtr_pot").exists());
    assert!(outdir.join("two.jtr_pot").exists());
}

#[test]
fn mmap_threshold_zero_still_converts() {
    let tmp = tempdir().unwrap();
    let input = tmp.path().join("combo.txt");
    fs::write(&input, "a@b.com:pw\n").unwrap();

    let mut cmd = Command::cargo_bin("ptv").unwrap();
    cmd.arg("--from")
        .arg("combolist_email_pass")
        .arg("--to")
        .arg("csv")
        .arg("--mmap-threshold")
        .arg("0")
        .arg("-i")
        .arg(&input);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("a@b.com"));
}
