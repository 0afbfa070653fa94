// End-to-end runs of the `mtrace` binary.
// Requires: assert_cmd, predicates, tempfile in [dev-dependencies]

mod common;

use std::fs::{self, File};
use std::process::{Command as StdCommand, Stdio};

use assert_cmd::cargo::CommandCargoExt;
use assert_cmd::Command;
use common::write_file;
use predicates::prelude::PredicateBooleanExt;
use predicates::str::contains;

const DEFINE_TRACE: &str = "\
- op: debugmode
  flags: aeq
- op: pre
  id: 1
  name: define
  args: [{text: foo}, {text: bar}]
- op: post
  id: 1
  name: define
  args: [{text: foo}, {text: bar}]
  result: ''
";

fn mtrace() -> Command {
    let mut cmd = Command::cargo_bin("mtrace").unwrap();
    cmd.arg("--color").arg("never");
    cmd
}

#[test]
fn cli_traces_to_stderr() {
    let dir = tempfile::tempdir().unwrap();
    let script = write_file(dir.path(), "run.yaml", DEFINE_TRACE);
    mtrace()
        .arg(&script)
        .assert()
        .success()
        .stdout("")
        .stderr("m4trace: -1- define(`foo', `bar') -> `'\n");
}

#[test]
fn cli_error_sets_failure_exit_code() {
    let dir = tempfile::tempdir().unwrap();
    let script = write_file(
        dir.path(),
        "run.yaml",
        "- op: location\n  file: in.m4\n  line: 3\n\
         - op: error\n  text: oops\n\
         - op: output\n  text: \"still running\\n\"\n",
    );
    mtrace()
        .arg(&script)
        .assert()
        .code(1)
        .stdout("still running\n")
        .stderr("m4:in.m4:3: oops\n");
}

#[test]
fn cli_error_status_ends_run_immediately() {
    let dir = tempfile::tempdir().unwrap();
    let script = write_file(
        dir.path(),
        "run.json",
        r#"[{"op": "error", "status": 2, "text": "giving up"},
            {"op": "output", "text": "unreachable\n"}]"#,
    );
    mtrace()
        .arg(&script)
        .assert()
        .code(2)
        .stdout("")
        .stderr("m4: giving up\n");
}

#[test]
fn cli_fatal_warnings() {
    let dir = tempfile::tempdir().unwrap();
    let script = write_file(
        dir.path(),
        "run.yaml",
        "- op: numeric\n  name: incr\n  text: 12x\n- op: output\n  text: after\n",
    );
    mtrace()
        .arg("-E")
        .arg(&script)
        .assert()
        .code(1)
        .stdout("")
        .stderr("m4: Warning: incr: non-numeric argument `12x'\n");
}

#[test]
fn cli_quiet_suppresses_warnings() {
    let dir = tempfile::tempdir().unwrap();
    let script = write_file(
        dir.path(),
        "run.yaml",
        "- op: argc\n  name: len\n  argc: 1\n  min: 1\n  max: 1\n- op: warn\n  text: loud\n",
    );
    mtrace()
        .arg("-Q")
        .arg(&script)
        .assert()
        .success()
        .stdout("true\n")
        .stderr("");
}

#[test]
fn cli_flags_override_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_file(
        dir.path(),
        "diag.json",
        r#"{"program_name": "gm4", "debug_flags": "t", "max_debug_arg_length": 2}"#,
    );
    let script = write_file(
        dir.path(),
        "run.yaml",
        "- op: pre\n  id: 1\n  name: len\n  args: [{text: abcdef}]\n\
         - op: post\n  id: 1\n  name: len\n  args: [{text: abcdef}]\n  result: '6'\n",
    );
    mtrace()
        .arg("--config")
        .arg(&config)
        .arg("-d=ae")
        .arg(&script)
        .assert()
        .success()
        .stderr("gm4trace: -1- len(ab...) -> 6\n");
}

#[test]
fn cli_bad_debug_flags_is_a_setup_error() {
    let dir = tempfile::tempdir().unwrap();
    let script = write_file(dir.path(), "run.yaml", DEFINE_TRACE);
    mtrace()
        .arg("--debug=aZ")
        .arg(&script)
        .assert()
        .failure()
        .stderr(contains("mtrace::debug::flag").and(contains("help")));
}

#[test]
fn cli_reports_miette_diagnostics_for_bad_script() {
    let dir = tempfile::tempdir().unwrap();
    let script = write_file(dir.path(), "run.yaml", "- op: frobnicate\n");
    mtrace()
        .arg(&script)
        .assert()
        .failure()
        .stderr(contains("mtrace::script"));
}

#[test]
fn cli_debugfile_collects_trace() {
    let dir = tempfile::tempdir().unwrap();
    let log = dir.path().join("trace.log");
    let script = write_file(dir.path(), "run.yaml", DEFINE_TRACE);
    mtrace()
        .arg("-o")
        .arg(&log)
        .arg(&script)
        .assert()
        .success()
        .stderr("");
    assert_eq!(
        fs::read_to_string(&log).unwrap(),
        "m4trace: -1- define(`foo', `bar') -> `'\n"
    );
}

#[test]
fn cli_unopenable_debugfile_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let script = write_file(
        dir.path(),
        "run.yaml",
        "- op: debugfile\n  path: /nonexistent-dir/trace.log\n",
    );
    mtrace()
        .arg(&script)
        .assert()
        .code(1)
        .stderr(contains("m4: debugfile: cannot set debug file `/nonexistent-dir/trace.log'"));
}

#[cfg(unix)]
#[test]
fn cli_debugfile_shared_with_stdout_keeps_order() {
    let dir = tempfile::tempdir().unwrap();
    let out_path = dir.path().join("combined.txt");
    let script = write_file(
        dir.path(),
        "run.yaml",
        &format!(
            "- op: debugmode\n  flags: aeq\n\
             - op: debugfile\n  path: {}\n\
             - op: output\n  text: \"before\\n\"\n\
             - op: pre\n  id: 1\n  name: foo\n\
             - op: post\n  id: 1\n  name: foo\n  result: x\n\
             - op: output\n  text: \"after\\n\"\n",
            out_path.display()
        ),
    );

    let stdout = File::create(&out_path).unwrap();
    let status = StdCommand::cargo_bin("mtrace")
        .unwrap()
        .arg(&script)
        .stdout(Stdio::from(stdout))
        .status()
        .unwrap();
    assert!(status.success());
    assert_eq!(
        fs::read_to_string(&out_path).unwrap(),
        "before\nm4trace: -1- foo -> `x'\nafter\n"
    );
}

#[cfg(unix)]
#[test]
fn cli_unknown_builtin_aborts() {
    use std::os::unix::process::ExitStatusExt;

    const SIGABRT: i32 = 6;

    let dir = tempfile::tempdir().unwrap();
    let script = write_file(
        dir.path(),
        "run.yaml",
        "- op: debugmode\n  flags: aeq\n\
         - op: output\n  text: \"before\\n\"\n\
         - op: pre\n  id: 1\n  name: define\n  args: [{text: x}, {builtin: 999}]\n\
         - op: output\n  text: \"unreachable\\n\"\n",
    );
    let output = StdCommand::cargo_bin("mtrace")
        .unwrap()
        .arg("--color")
        .arg("never")
        .arg(&script)
        .output()
        .unwrap();

    assert_eq!(output.status.code(), None);
    assert_eq!(output.status.signal(), Some(SIGABRT));
    assert_eq!(String::from_utf8_lossy(&output.stdout), "before\n");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("INTERNAL ERROR"), "stderr: {stderr}");
    assert!(stderr.contains("builtin #999"), "stderr: {stderr}");
    assert!(stderr.contains("macro `define'"), "stderr: {stderr}");
}
