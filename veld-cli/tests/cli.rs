use std::fs;
use std::process::Command;

use anyhow::{ensure, Result};
use tempfile::tempdir;

fn veld() -> Command {
    Command::new(env!("CARGO_BIN_EXE_veld"))
}

#[test]
fn compiles_a_file_to_ir_on_stdout() -> Result<()> {
    let dir = tempdir()?;
    let input = dir.path().join("square.vd");
    fs::write(&input, "fn square(x) = x * x\n")?;

    let output = veld().arg(&input).output()?;
    ensure!(output.status.success(), "veld failed: {output:?}");
    let stdout = String::from_utf8(output.stdout)?;
    assert!(stdout.contains("fn @square(i64 %x) -> i64"));
    assert!(stdout.contains("mul.i64 %x, %x"));
    Ok(())
}

#[test]
fn writes_ir_to_the_requested_output_file() -> Result<()> {
    let dir = tempdir()?;
    let input = dir.path().join("answer.vd");
    let out = dir.path().join("nested/answer.ir");
    fs::write(&input, "fn answer() = 42\n")?;

    let status = veld().arg(&input).arg("-o").arg(&out).status()?;
    ensure!(status.success(), "veld failed");
    let ir = fs::read_to_string(&out)?;
    assert!(ir.contains("ret.i64 42"));
    Ok(())
}

#[test]
fn emits_tokens_in_snapshot_form() -> Result<()> {
    let dir = tempdir()?;
    let input = dir.path().join("tokens.vd");
    fs::write(&input, "fn f() = 7\n")?;

    let output = veld().arg(&input).arg("--emit").arg("tokens").output()?;
    ensure!(output.status.success(), "veld failed: {output:?}");
    let stdout = String::from_utf8(output.stdout)?;
    let mut lines = stdout.lines();
    assert_eq!(lines.next(), Some("(keyword fn 1:0)"));
    assert_eq!(lines.next(), Some("(id f 1:3)"));
    assert!(stdout.lines().last().unwrap().starts_with("(eof"));
    Ok(())
}

#[test]
fn emits_the_ast_as_s_expressions() -> Result<()> {
    let dir = tempdir()?;
    let input = dir.path().join("ast.vd");
    fs::write(&input, "fn f() = 1 + 2\n")?;

    let output = veld().arg(&input).arg("--emit").arg("ast").output()?;
    ensure!(output.status.success(), "veld failed: {output:?}");
    let stdout = String::from_utf8(output.stdout)?;
    assert!(stdout.starts_with("(fn (proto f ())"));
    assert!(stdout.contains("(int 1)"));
    Ok(())
}

#[test]
fn diagnostics_go_to_stderr_and_fail_the_run() -> Result<()> {
    let dir = tempdir()?;
    let input = dir.path().join("bad.vd");
    fs::write(&input, "fn")?;

    let output = veld().arg(&input).output()?;
    ensure!(!output.status.success(), "expected failure");
    let stderr = String::from_utf8(output.stderr)?;
    assert!(stderr.contains("SYN: Unexpected (eof 1:2)"));
    assert!(stderr.contains("Expected fn name"));
    Ok(())
}

#[test]
fn no_opt_keeps_the_unfolded_arithmetic() -> Result<()> {
    let dir = tempdir()?;
    let input = dir.path().join("fold.vd");
    fs::write(&input, "fn f() = 1 + 2\n")?;

    let optimized = veld().arg(&input).output()?;
    let raw = veld().arg(&input).arg("--no-opt").output()?;
    let optimized = String::from_utf8(optimized.stdout)?;
    let raw = String::from_utf8(raw.stdout)?;
    assert!(optimized.contains("ret.i64 3"));
    assert!(!optimized.contains("add.i64"));
    assert!(raw.contains("add.i64 1, 2"));
    Ok(())
}
