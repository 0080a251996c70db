// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Tests to ensure there is no stderr output for successful commands.

use tempfile::TempDir;

use crate::{generate_files, get_cmd_output, hyperdft, Files};

#[test]
fn test_predict_no_stderr() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let Files {
        sources,
        visibilities,
    } = generate_files(tmp_dir.path());

    #[rustfmt::skip]
    let cmd = hyperdft()
        .args([
            "predict",
            "--sources", &sources.display().to_string(),
            "--visibilities", &visibilities.display().to_string(),
            "--output", &tmp_dir.path().join("out.txt").display().to_string(),
            #[cfg(any(feature = "cuda", feature = "hip"))]
            "--cpu",
        ])
        .ok();
    assert!(
        cmd.is_ok(),
        "predict failed on simple test data: {}",
        cmd.err().unwrap()
    );
    let (_, stderr) = get_cmd_output(cmd);
    assert!(stderr.is_empty(), "stderr wasn't empty: {stderr}");
}

#[test]
fn test_generate_no_stderr() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");

    #[rustfmt::skip]
    let cmd = hyperdft()
        .args([
            "generate",
            "--sources-output", &tmp_dir.path().join("s.txt").display().to_string(),
            "--visibilities-output", &tmp_dir.path().join("v.txt").display().to_string(),
        ])
        .ok();
    assert!(
        cmd.is_ok(),
        "generate failed: {}",
        cmd.err().unwrap()
    );
    let (_, stderr) = get_cmd_output(cmd);
    assert!(stderr.is_empty(), "stderr wasn't empty: {stderr}");
}
