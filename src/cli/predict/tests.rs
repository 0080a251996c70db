// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::{
    fs,
    path::{Path, PathBuf},
};

use indoc::{formatdoc, indoc};
use tempfile::{tempdir, TempDir};

use super::*;
use crate::io::read_visibilities;

fn cpu_transform() -> TransformArgs {
    TransformArgs {
        #[cfg(any(feature = "cuda", feature = "hip"))]
        cpu: true,
        ..Default::default()
    }
}

/// A single source at the phase centre has the same intensity at every
/// visibility.
fn write_inputs(dir: &Path, brightness: f64) -> (PathBuf, PathBuf) {
    let sources = dir.join("sources.txt");
    fs::write(&sources, "1\n0 0 2.0\n").unwrap();
    let visibilities = dir.join("vis.txt");
    fs::write(
        &visibilities,
        formatdoc! {"
            3
            10 20 0.5 {b} 0.0 1.0
            -5 3 1 {b} 0.0 1.0
            0 0 0 {b} 0.0 0.5
        ", b = brightness},
    )
    .unwrap();
    (sources, visibilities)
}

fn file_args(dir: &TempDir, brightness: f64) -> PredictArgs {
    let (sources, visibilities) = write_inputs(dir.path(), brightness);
    PredictArgs {
        transform_args: cpu_transform(),
        predict_args: PredictCliArgs {
            sources: Some(sources),
            visibilities: Some(visibilities),
            output: Some(dir.path().join("out.txt")),
            compare: true,
            ..Default::default()
        },
        ..Default::default()
    }
}

#[test]
fn predictions_match_file_brightness() {
    let dir = tempdir().unwrap();
    let args = file_args(&dir, 2.0);
    let result = args.run(false);
    assert!(result.is_ok(), "{result:?}");

    let output: crate::io::VisibilityFile<f64> =
        read_visibilities(dir.path().join("out.txt"), &DftConfig::default()).unwrap();
    assert_eq!(output.len(), 3);
    for b in output.brightness {
        assert_eq!(b, num_complex::Complex::new(2.0, 0.0));
    }
    assert_eq!(output.weights, vec![1.0, 1.0, 0.5]);
}

#[test]
fn predictions_match_in_single_precision_with_exact_correction() {
    let dir = tempdir().unwrap();
    let mut args = file_args(&dir, 2.0);
    args.transform_args.precision = Some("single".to_string());
    args.transform_args.exact_correction = true;
    let result = args.run(false);
    assert!(result.is_ok(), "{result:?}");
}

#[test]
fn mismatched_brightness_fails_the_comparison() {
    let dir = tempdir().unwrap();
    let args = file_args(&dir, 3.0);
    let result = args.run(false);
    assert!(matches!(result, Err(HyperdftError::Comparison(_))), "{result:?}");
    // The predictions are still written.
    assert!(dir.path().join("out.txt").exists());

    // A big enough tolerance lets it through.
    let mut args = file_args(&dir, 3.0);
    args.predict_args.tolerance = Some(1.5);
    assert!(args.run(false).is_ok());
}

#[test]
fn synthetic_predictions_are_written() {
    let dir = tempdir().unwrap();
    let output = dir.path().join("synthetic.txt");
    let args = PredictArgs {
        transform_args: cpu_transform(),
        synthetic_args: SyntheticArgs {
            num_sources: Some(4),
            num_visibilities: Some(25),
            grid_size: Some(100),
            ..Default::default()
        },
        predict_args: PredictCliArgs {
            output: Some(output.clone()),
            ..Default::default()
        },
        ..Default::default()
    };
    let result = args.run(false);
    assert!(result.is_ok(), "{result:?}");

    let file: crate::io::VisibilityFile<f64> =
        read_visibilities(&output, &DftConfig::default()).unwrap();
    assert_eq!(file.len(), 25);
    assert!(file.weights.iter().all(|&w| w == 1.0));
    // Four unit sources near the phase centre can't sum to much more than 4.
    assert!(file.brightness.iter().all(|b| b.norm() <= 4.0 + 1e-6));
}

#[test]
fn dry_runs_dont_write() {
    let dir = tempdir().unwrap();
    let args = file_args(&dir, 2.0);
    assert!(args.run(true).is_ok());
    assert!(!dir.path().join("out.txt").exists());
}

#[test]
fn comparing_needs_a_visibility_file() {
    let args = PredictArgs {
        transform_args: cpu_transform(),
        predict_args: PredictCliArgs {
            compare: true,
            ..Default::default()
        },
        ..Default::default()
    };
    let result = args.run(true);
    assert!(matches!(result, Err(HyperdftError::Predict(_))), "{result:?}");
}

#[test]
fn bad_arguments_are_rejected() {
    let mut args = PredictArgs {
        transform_args: cpu_transform(),
        ..Default::default()
    };
    args.transform_args.precision = Some("quadruple".to_string());
    let result = args.run(true);
    assert!(matches!(result, Err(HyperdftError::Config(_))), "{result:?}");

    let mut args = PredictArgs {
        transform_args: cpu_transform(),
        ..Default::default()
    };
    args.transform_args.threads_per_block = Some(0);
    let result = args.run(true);
    assert!(matches!(result, Err(HyperdftError::Config(_))), "{result:?}");

    let dir = tempdir().unwrap();
    let mut args = file_args(&dir, 2.0);
    args.predict_args.tolerance = Some(-1.0);
    let result = args.run(true);
    assert!(matches!(result, Err(HyperdftError::Predict(_))), "{result:?}");

    let mut args = file_args(&dir, 2.0);
    args.predict_args.sources = Some(dir.path().join("missing.txt"));
    let result = args.run(false);
    assert!(matches!(result, Err(HyperdftError::SourceFile(_))), "{result:?}");
}

#[test]
fn cli_arguments_override_file_arguments() {
    let dir = tempdir().unwrap();
    let arg_file = dir.path().join("args.toml");
    fs::write(
        &arg_file,
        indoc! {r#"
            [transform]
            precision = "single"
            cell_size = 0.001

            [predict]
            output = "from_file.txt"
            compare = true
        "#},
    )
    .unwrap();

    let args = PredictArgs {
        args_file: Some(arg_file),
        predict_args: PredictCliArgs {
            output: Some(PathBuf::from("from_cli.txt")),
            ..Default::default()
        },
        ..Default::default()
    }
    .merge()
    .unwrap();
    assert!(args.args_file.is_none());
    assert_eq!(args.transform_args.precision.as_deref(), Some("single"));
    assert_eq!(args.transform_args.cell_size, Some(0.001));
    assert_eq!(args.predict_args.output, Some(PathBuf::from("from_cli.txt")));
    assert!(args.predict_args.compare);
}

#[test]
fn json_argument_files_work_too() {
    let dir = tempdir().unwrap();
    let arg_file = dir.path().join("args.json");
    fs::write(&arg_file, r#"{"synthetic": {"num_visibilities": 7}}"#).unwrap();
    let args = PredictArgs {
        args_file: Some(arg_file),
        ..Default::default()
    }
    .merge()
    .unwrap();
    assert_eq!(args.synthetic_args.num_visibilities, Some(7));
}

#[test]
fn unknown_argument_files_are_rejected() {
    let dir = tempdir().unwrap();
    let arg_file = dir.path().join("args.yaml");
    fs::write(&arg_file, "predict: {}").unwrap();
    let result = PredictArgs {
        args_file: Some(arg_file),
        ..Default::default()
    }
    .merge();
    assert!(matches!(result, Err(HyperdftError::ArgFile(_))));

    let arg_file = dir.path().join("bad.toml");
    fs::write(&arg_file, "[predict]\ncompare = \"yes\"\n").unwrap();
    let result = PredictArgs {
        args_file: Some(arg_file),
        ..Default::default()
    }
    .merge();
    assert!(matches!(result, Err(HyperdftError::ArgFile(_))));
}
