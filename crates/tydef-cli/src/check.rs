//! # Check Subcommand
//!
//! Builds the library from a resource directory and reports the outcome,
//! including documentation warnings.

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Args;

use crate::{load_library, report_build_error, Loaded};

/// Arguments for the `tydef check` subcommand.
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Directory searched recursively for `*.yaml`, `*.yml` and `*.json` resources.
    #[arg(long, default_value = "resources")]
    pub resources: PathBuf,
}

/// Execute the check subcommand.
///
/// Returns exit code: 0 on success, 1 if the definitions are invalid.
pub fn run_check(args: &CheckArgs, config: Option<&Path>) -> Result<u8> {
    match load_library(&args.resources, config)? {
        Loaded::Invalid { error, paths } => {
            report_build_error(&error, &paths);
            Ok(1)
        }
        Loaded::Library(library) => {
            for warning in library.documentation_warnings() {
                println!("WARN: {warning}");
            }
            println!(
                "OK: {} type(s), {} enum(s)",
                library.type_names().len(),
                library.enum_names().len()
            );
            Ok(0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const SMALL_INT: &str = "kind: int\nsystem: test\nname: smallInt\nminimum: -128\nmaximum: 128\n";

    fn args(dir: &Path) -> CheckArgs {
        CheckArgs {
            resources: dir.to_path_buf(),
        }
    }

    #[test]
    fn test_check_valid_directory() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("smallInt.yaml"), SMALL_INT).unwrap();
        assert_eq!(run_check(&args(dir.path()), None).unwrap(), 0);
    }

    #[test]
    fn test_check_invalid_definitions() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("rec.yaml"),
            "kind: record\nsystem: test\nname: rec\nproperties:\n  - name: one\n    propertyType: missing\n",
        )
        .unwrap();
        assert_eq!(run_check(&args(dir.path()), None).unwrap(), 1);
    }

    #[test]
    fn test_check_strict_documentation_from_config() {
        let dir = tempfile::tempdir().unwrap();
        let resources = dir.path().join("resources");
        fs::create_dir(&resources).unwrap();
        fs::write(resources.join("smallInt.yaml"), SMALL_INT).unwrap();
        let config = dir.path().join("tydef.yaml");
        fs::write(&config, "strict_documentation: true\n").unwrap();
        assert_eq!(run_check(&args(&resources), Some(config.as_path())).unwrap(), 1);
    }

    #[test]
    fn test_check_missing_directory_is_operational_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(run_check(&args(&dir.path().join("absent")), None).is_err());
    }
}
