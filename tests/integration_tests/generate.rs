// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::fs;

use tempfile::TempDir;

use crate::{generate_files, get_cmd_output, hyperdft, Files};

#[test]
fn test_generate_writes_counts() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let Files {
        sources,
        visibilities,
    } = generate_files(tmp_dir.path());

    let sources = fs::read_to_string(sources).unwrap();
    let mut lines = sources.lines();
    assert_eq!(lines.next(), Some("5"));
    assert_eq!(lines.count(), 5);

    let visibilities = fs::read_to_string(visibilities).unwrap();
    let mut lines = visibilities.lines();
    assert_eq!(lines.next(), Some("200"));
    assert!(lines.all(|l| l.split_ascii_whitespace().count() == 6));
}

#[test]
fn test_generate_save_toml_reproduces_run() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let toml = tmp_dir.path().join("args.toml");
    let first = tmp_dir.path().join("first.txt");

    #[rustfmt::skip]
    let cmd = hyperdft()
        .args([
            "generate",
            "--num-visibilities", "10",
            "--seed", "7",
            "--sources-output", &tmp_dir.path().join("s.txt").display().to_string(),
            "--visibilities-output", &first.display().to_string(),
            "--save-toml", &toml.display().to_string(),
        ])
        .ok();
    assert!(cmd.is_ok(), "generate failed: {}", cmd.err().unwrap());
    assert!(toml.exists());

    // Running from the saved arguments, but with a different output, gives
    // the same visibilities.
    let second = tmp_dir.path().join("second.txt");
    #[rustfmt::skip]
    let cmd = hyperdft()
        .args([
            "generate",
            &toml.display().to_string(),
            "--visibilities-output", &second.display().to_string(),
        ])
        .ok();
    assert!(cmd.is_ok(), "generate failed: {}", cmd.err().unwrap());
    assert_eq!(
        fs::read_to_string(first).unwrap(),
        fs::read_to_string(second).unwrap()
    );
}

#[test]
fn test_generate_dry_run_writes_nothing() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let output = tmp_dir.path().join("vis.txt");
    #[rustfmt::skip]
    let cmd = hyperdft()
        .args([
            "generate",
            "--dry-run",
            "--sources-output", &tmp_dir.path().join("s.txt").display().to_string(),
            "--visibilities-output", &output.display().to_string(),
        ])
        .ok();
    let (stdout, _) = get_cmd_output(cmd);
    assert!(stdout.contains("Dry run"), "{stdout}");
    assert!(!output.exists());
}
