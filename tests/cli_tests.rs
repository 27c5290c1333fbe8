mod common;
use common::*;

use std::fs;
use tempfile::tempdir;

#[test]
fn test_generate_then_scan() {
    let dir = tempdir().unwrap();
    let config = write_config(
        dir.path(),
        "[writer]\nfile = cli.log\nmax_size = 32K\nproducers = 3\n\n[scanner]\nworkers = 4\n",
    );

    let (stdout, stderr, exit_code) = run_logbench(&["generate"], dir.path(), &config);
    assert_eq!(exit_code, 0, "generate failed: {}", stderr);
    assert!(stdout.contains("Lines written:"));
    let size = fs::metadata(dir.path().join("cli.log")).unwrap().len();
    assert!(size > 0 && size <= 32 * 1024);

    let (stdout, stderr, exit_code) = run_logbench(&["scan"], dir.path(), &config);
    assert_eq!(exit_code, 0, "scan failed: {}", stderr);
    assert!(stdout.contains("Lines scanned:"));
    assert!(stdout.contains("with 4 workers"));

    let total: u64 = stdout
        .lines()
        .filter_map(|line| line.split_once(' '))
        .filter(|(severity, _)| ["INFO", "WARN", "ERROR", "DEBUG"].contains(severity))
        .map(|(_, count)| count.trim().parse::<u64>().unwrap())
        .sum();
    let lines_in_file = fs::read_to_string(dir.path().join("cli.log"))
        .unwrap()
        .lines()
        .count() as u64;
    assert_eq!(total, lines_in_file);
}

#[test]
fn test_run_mode_prints_both_stats() {
    let dir = tempdir().unwrap();
    let config = write_config(
        dir.path(),
        "[writer]\nfile = run.log\nmax_size = 8K\nseverities = INFO, WARN\nproducers = 2\n",
    );

    let (stdout, stderr, exit_code) = run_logbench(&["run"], dir.path(), &config);
    assert_eq!(exit_code, 0, "run failed: {}", stderr);
    assert!(stdout.contains("Lines written:"));
    assert!(stdout.contains("Lines scanned:"));
    assert!(!stdout.contains("ERROR "));
}

#[test]
fn test_scan_reports_malformed_lines() {
    let dir = tempdir().unwrap();
    fs::write(
        dir.path().join("hand.log"),
        "t [INFO] ProducerID:1 Message:a\nbroken\nt [INFO] ProducerID:2 Message:b\n",
    )
    .unwrap();
    let config = write_config(dir.path(), "[scanner]\nfile = hand.log\nworkers = 2\n");

    let (stdout, _stderr, exit_code) = run_logbench(&["scan"], dir.path(), &config);
    assert_eq!(exit_code, 0);
    assert!(stdout.contains("INFO 2"));
    assert!(stdout.contains("<malformed> 1"));
}

#[test]
fn test_scan_missing_file_exits_nonzero() {
    let dir = tempdir().unwrap();
    let config = write_config(dir.path(), "[scanner]\nfile = absent.log\n");

    let (_stdout, stderr, exit_code) = run_logbench(&["scan"], dir.path(), &config);
    assert_eq!(exit_code, 1);
    assert!(stderr.contains("absent.log"));
}

#[test]
fn test_invalid_config_exits_nonzero() {
    let dir = tempdir().unwrap();
    let config = write_config(dir.path(), "[writer]\nmax_size = lots\n");

    let (_stdout, stderr, exit_code) = run_logbench(&["generate"], dir.path(), &config);
    assert_eq!(exit_code, 1);
    assert!(stderr.contains("max_size"));
}

#[test]
fn test_unknown_flag_is_usage_error() {
    let dir = tempdir().unwrap();
    let config = write_config(dir.path(), "");

    let (_stdout, _stderr, exit_code) = run_logbench(&["scan", "--workers", "3"], dir.path(), &config);
    assert_eq!(exit_code, 2);
}

#[test]
fn test_config_command_lists_search_paths() {
    let dir = tempdir().unwrap();
    let config = write_config(dir.path(), "[scanner]\nworkers = 6\n");

    let (stdout, _stderr, exit_code) = run_logbench(&["config"], dir.path(), &config);
    assert_eq!(exit_code, 0);
    assert!(stdout.contains("logbench.ini"));
    assert!(stdout.contains("workers: 6"));
}

#[test]
fn test_scan_with_failed_workers_exits_nonzero() {
    let dir = tempdir().unwrap();
    fs::create_dir(dir.path().join("logs")).unwrap();
    fs::write(dir.path().join("logs").join("inside.log"), "x\n").unwrap();
    let config = write_config(dir.path(), "[scanner]\nfile = logs\nworkers = 1\n");

    let (stdout, _stderr, exit_code) = run_logbench(&["scan"], dir.path(), &config);
    assert_eq!(exit_code, 1);
    assert!(stdout.contains("Worker 0 failed on [0, "));
    assert!(stdout.contains("Lines scanned: 0"));
    assert!(stdout.contains("partial result"));
}

#[cfg(unix)]
#[test]
fn test_sigterm_stops_generate_with_term_exit_code() {
    use std::process::{Command, Stdio};
    use std::thread;
    use std::time::Duration;

    let dir = tempdir().unwrap();
    let config = write_config(
        dir.path(),
        "[writer]\nfile = term.log\nmax_size = 64G\nproducers = 2\n",
    );
    let child = Command::new(env!("CARGO_BIN_EXE_logbench"))
        .arg("generate")
        .current_dir(dir.path())
        .env("LOGBENCH_CONFIG", &config)
        .env("LOGBENCH_LOG", "logbench=warn")
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();

    thread::sleep(Duration::from_millis(500));
    let status = Command::new("kill")
        .args(["-TERM", &child.id().to_string()])
        .status()
        .unwrap();
    assert!(status.success());

    let output = child.wait_with_output().unwrap();
    assert_eq!(output.status.code(), Some(143));
    assert!(String::from_utf8_lossy(&output.stdout).contains("(interrupted)"));
}
