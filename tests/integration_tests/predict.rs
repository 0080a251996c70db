// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::fs;

use tempfile::TempDir;

use crate::{generate_files, get_cmd_output, hyperdft, Files};

#[test]
fn test_predict_agrees_with_generate() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let Files {
        sources,
        visibilities,
    } = generate_files(tmp_dir.path());
    let output = tmp_dir.path().join("predicted.txt");

    #[rustfmt::skip]
    let cmd = hyperdft()
        .args([
            "predict",
            "--sources", &sources.display().to_string(),
            "--visibilities", &visibilities.display().to_string(),
            "--output", &output.display().to_string(),
            "--compare",
            #[cfg(any(feature = "cuda", feature = "hip"))]
            "--cpu",
        ])
        .ok();
    assert!(cmd.is_ok(), "predict failed: {}", cmd.err().unwrap());
    let (stdout, _) = get_cmd_output(cmd);
    assert!(stdout.contains("within"), "{stdout}");

    let predicted = fs::read_to_string(output).unwrap();
    assert_eq!(predicted.lines().next(), Some("200"));
}

#[test]
fn test_predict_fails_comparison_with_other_sources() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let Files { visibilities, .. } = generate_files(tmp_dir.path());
    let sources = tmp_dir.path().join("bright.txt");
    fs::write(&sources, "1\n0 0 100\n").unwrap();

    #[rustfmt::skip]
    let cmd = hyperdft()
        .args([
            "predict",
            "--sources", &sources.display().to_string(),
            "--visibilities", &visibilities.display().to_string(),
            "--output", &tmp_dir.path().join("out.txt").display().to_string(),
            "--compare",
            #[cfg(any(feature = "cuda", feature = "hip"))]
            "--cpu",
        ])
        .ok();
    assert!(cmd.is_err());
    let (_, stderr) = get_cmd_output(cmd);
    assert!(stderr.contains("more than the tolerance"), "{stderr}");
}

#[test]
fn test_predict_reports_bad_files() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let sources = tmp_dir.path().join("sources.txt");
    fs::write(&sources, "2\n1 2 3\n").unwrap();

    #[rustfmt::skip]
    let cmd = hyperdft()
        .args([
            "predict",
            "--sources", &sources.display().to_string(),
            "--output", &tmp_dir.path().join("out.txt").display().to_string(),
            #[cfg(any(feature = "cuda", feature = "hip"))]
            "--cpu",
        ])
        .ok();
    assert!(cmd.is_err());
    let (_, stderr) = get_cmd_output(cmd);
    assert!(stderr.contains("Expected 2 records, but only found 1"), "{stderr}");
}

#[test]
fn test_predict_warns_about_extra_records() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let sources = tmp_dir.path().join("sources.txt");
    fs::write(&sources, "1\n0 0 1\n10 10 1\n").unwrap();

    #[rustfmt::skip]
    let cmd = hyperdft()
        .args([
            "predict",
            "--sources", &sources.display().to_string(),
            "--output", &tmp_dir.path().join("out.txt").display().to_string(),
            #[cfg(any(feature = "cuda", feature = "hip"))]
            "--cpu",
        ])
        .ok();
    assert!(cmd.is_ok(), "predict failed: {}", cmd.err().unwrap());
    let (stdout, _) = get_cmd_output(cmd);
    assert!(
        stdout.contains("Expected 1 records, but found 1 more; ignoring them"),
        "{stdout}"
    );
}
