// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::str::FromStr;

use approx::assert_abs_diff_eq;
use indoc::indoc;

use super::*;

#[test]
fn defaults_are_valid() {
    let config = DftConfig::default();
    assert!(config.validate().is_ok());
    assert_eq!(config.precision, Precision::Double);
    assert_eq!(config.max_threads_per_block, 1024);
    assert_eq!(config.direction_correction, DirectionCorrection::SmallAngle);
    assert!(!config.force_zero_w_term);
    assert!(!config.right_ascension);
}

#[test]
fn zero_threads_per_block_is_invalid() {
    let config = DftConfig {
        max_threads_per_block: 0,
        ..Default::default()
    };
    assert_eq!(config.validate(), Err(ConfigError::ZeroThreadsPerBlock));
}

#[test]
fn bad_scalars_are_invalid() {
    let config = DftConfig {
        cell_size_rad: -1.0,
        ..Default::default()
    };
    assert!(matches!(
        config.validate(),
        Err(ConfigError::NotPositive {
            name: "cell size",
            ..
        })
    ));

    let config = DftConfig {
        frequency_hz: f64::NAN,
        ..Default::default()
    };
    assert!(matches!(
        config.validate(),
        Err(ConfigError::NotPositive {
            name: "frequency",
            ..
        })
    ));

    let config = DftConfig {
        grid_size: 0,
        ..Default::default()
    };
    assert_eq!(config.validate(), Err(ConfigError::ZeroGridSize));
}

#[test]
fn with_counts_only_changes_counts() {
    let config = DftConfig {
        force_zero_w_term: true,
        ..Default::default()
    };
    let new = config.with_counts(5, 7);
    assert_eq!(new.num_sources, 5);
    assert_eq!(new.num_visibilities, 7);
    assert!(new.force_zero_w_term);
    assert_eq!(new.max_threads_per_block, config.max_threads_per_block);
}

#[test]
fn metres_to_wavelengths_uses_frequency() {
    let config = DftConfig {
        frequency_hz: crate::constants::VEL_C,
        ..Default::default()
    };
    assert_abs_diff_eq!(config.metres_to_wavelengths(), 1.0);
}

#[test]
fn precision_parses() {
    assert_eq!(Precision::from_str("single"), Ok(Precision::Single));
    assert_eq!(Precision::from_str("double"), Ok(Precision::Double));
    assert!(Precision::from_str("half").is_err());
    assert_eq!(Precision::Single.to_string(), "single");
    assert_eq!(Precision::Single.bits(), 32);
}

#[test]
fn partial_toml_uses_defaults() {
    let contents = indoc! {r#"
        num_sources = 3
        precision = "single"
        force_zero_w_term = true
        direction_correction = "exact"
    "#};
    let config: DftConfig = toml::from_str(contents).unwrap();
    assert_eq!(config.num_sources, 3);
    assert_eq!(config.precision, Precision::Single);
    assert!(config.force_zero_w_term);
    assert_eq!(config.direction_correction, DirectionCorrection::Exact);
    assert_eq!(config.max_threads_per_block, 1024);
    assert_abs_diff_eq!(config.frequency_hz, 100e6);
}
