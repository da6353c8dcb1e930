//! # Validate Subcommand
//!
//! Validates a YAML or JSON value file against one type of the library.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Args;
use serde_json::Value;
use tydef_core::parse_resource;
use tydef_schema::ValueValidationError;

use crate::{load_library, report_build_error, Loaded};

/// Arguments for the `tydef validate` subcommand.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Directory searched recursively for resources.
    #[arg(long, default_value = "resources")]
    pub resources: PathBuf,

    /// Qualified type name, e.g. `test/smallInt`.
    #[arg(value_name = "TYPE")]
    pub type_name: String,

    /// File holding the value to validate (YAML or JSON).
    #[arg(value_name = "VALUE_FILE")]
    pub value_file: PathBuf,

    /// Treat the file as an array and validate each element.
    #[arg(long)]
    pub array: bool,
}

fn read_value(path: &Path) -> Result<Value> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    parse_resource(&text).with_context(|| format!("failed to parse {}", path.display()))
}

/// Execute the validate subcommand.
///
/// Returns exit code: 0 if the value conforms, 1 if it does not or the
/// library is invalid.
pub fn run_validate(args: &ValidateArgs, config: Option<&Path>) -> Result<u8> {
    let value = read_value(&args.value_file)?;
    let library = match load_library(&args.resources, config)? {
        Loaded::Library(library) => library,
        Loaded::Invalid { error, paths } => {
            report_build_error(&error, &paths);
            return Ok(1);
        }
    };

    let outcome = if args.array {
        let Value::Array(values) = &value else {
            bail!("{} does not hold an array", args.value_file.display());
        };
        library.validate_value_array(&args.type_name, values)
    } else {
        library.validate_value(&args.type_name, &value)
    };

    match outcome {
        Ok(()) => {
            println!("OK: {} conforms to {}", args.value_file.display(), args.type_name);
            Ok(0)
        }
        Err(e @ ValueValidationError::UnrecognisedType { .. }) => {
            println!("FAIL: {e}");
            Ok(1)
        }
        Err(ValueValidationError::ValidationFailed { violations, .. }) => {
            println!(
                "FAIL: {} does not conform to {} ({} violation(s))",
                args.value_file.display(),
                args.type_name,
                violations.len()
            );
            println!("{violations}");
            Ok(1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    struct Fixture {
        dir: tempfile::TempDir,
    }

    impl Fixture {
        fn new() -> Self {
            let dir = tempfile::tempdir().unwrap();
            let resources = dir.path().join("resources");
            fs::create_dir(&resources).unwrap();
            fs::write(
                resources.join("smallInt.yaml"),
                "kind: int\nsystem: test\nname: smallInt\nminimum: -128\nmaximum: 128\n",
            )
            .unwrap();
            fs::write(
                resources.join("testRecord.yaml"),
                "kind: record\nsystem: test\nname: testRecord\nproperties:\n  - name: one\n    propertyType: smallInt\nrequired: [one]\n",
            )
            .unwrap();
            Self { dir }
        }

        fn run(&self, type_name: &str, value: &str, array: bool) -> Result<u8> {
            let value_file = self.dir.path().join("value.yaml");
            fs::write(&value_file, value).unwrap();
            let args = ValidateArgs {
                resources: self.dir.path().join("resources"),
                type_name: type_name.to_string(),
                value_file,
                array,
            };
            run_validate(&args, None)
        }
    }

    #[test]
    fn test_conforming_value() {
        let fx = Fixture::new();
        assert_eq!(fx.run("test/testRecord", "one: 1\n", false).unwrap(), 0);
    }

    #[test]
    fn test_non_conforming_value() {
        let fx = Fixture::new();
        assert_eq!(fx.run("test/testRecord", "one: 200\n", false).unwrap(), 1);
        assert_eq!(fx.run("test/testRecord", "{}", false).unwrap(), 1);
    }

    #[test]
    fn test_unknown_type() {
        let fx = Fixture::new();
        assert_eq!(fx.run("test/missing", "1", false).unwrap(), 1);
    }

    #[test]
    fn test_array_mode() {
        let fx = Fixture::new();
        assert_eq!(fx.run("test/smallInt", "[1, 2, 3]", true).unwrap(), 0);
        assert_eq!(fx.run("test/smallInt", "[1, 900]", true).unwrap(), 1);
        assert!(fx.run("test/smallInt", "1", true).is_err());
    }

    #[test]
    fn test_missing_value_file() {
        let fx = Fixture::new();
        let args = ValidateArgs {
            resources: fx.dir.path().join("resources"),
            type_name: "test/smallInt".to_string(),
            value_file: fx.dir.path().join("absent.yaml"),
            array: false,
        };
        assert!(run_validate(&args, None).is_err());
    }
}
