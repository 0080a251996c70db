// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Integration tests.
//!
//! Some help for laying out these tests was taken from:
//! https://matklad.github.io/2021/02/27/delete-cargo-integration-tests.html

mod generate;
mod no_stderr;
mod predict;

use std::{
    path::{Path, PathBuf},
    process::Output,
    str::from_utf8,
};

use assert_cmd::{output::OutputError, Command};

fn hyperdft() -> Command {
    Command::cargo_bin("hyperdft").unwrap()
}

fn get_cmd_output(result: Result<Output, OutputError>) -> (String, String) {
    let output = match result {
        Ok(o) => o,
        Err(o) => o.as_output().unwrap().clone(),
    };
    (
        from_utf8(&output.stdout).unwrap().to_string(),
        from_utf8(&output.stderr).unwrap().to_string(),
    )
}

struct Files {
    sources: PathBuf,
    visibilities: PathBuf,
}

/// Use `hyperdft generate` to make a small set of sources and visibilities,
/// with predicted brightnesses.
fn generate_files(dir: &Path) -> Files {
    let files = Files {
        sources: dir.join("sources.txt"),
        visibilities: dir.join("vis.txt"),
    };

    #[rustfmt::skip]
    let cmd = hyperdft()
        .args([
            "generate",
            "--num-sources", "5",
            "--num-visibilities", "200",
            "--grid-size", "1000",
            "--seed", "99",
            "--predict",
            "--sources-output", &files.sources.display().to_string(),
            "--visibilities-output", &files.visibilities.display().to_string(),
            #[cfg(any(feature = "cuda", feature = "hip"))]
            "--cpu",
        ])
        .ok();
    assert!(cmd.is_ok(), "generate failed: {}", cmd.err().unwrap());
    assert!(files.sources.exists());
    assert!(files.visibilities.exists());
    files
}
