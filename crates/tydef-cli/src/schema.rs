//! # Schema Subcommand
//!
//! Prints the compiled JSON Schema document of one type.

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Args;

use crate::{load_library, report_build_error, Loaded};

/// Arguments for the `tydef schema` subcommand.
#[derive(Args, Debug)]
pub struct SchemaArgs {
    /// Directory searched recursively for resources.
    #[arg(long, default_value = "resources")]
    pub resources: PathBuf,

    /// Qualified type name, e.g. `test/smallInt`.
    #[arg(value_name = "TYPE")]
    pub type_name: String,
}

/// Render the document for `args.type_name`, or `None` after reporting why
/// it could not be produced.
pub fn render_schema(args: &SchemaArgs, config: Option<&Path>) -> Result<Option<String>> {
    let library = match load_library(&args.resources, config)? {
        Loaded::Library(library) => library,
        Loaded::Invalid { error, paths } => {
            report_build_error(&error, &paths);
            return Ok(None);
        }
    };
    match library.json_schema(&args.type_name) {
        Ok(document) => Ok(Some(serde_json::to_string_pretty(document)?)),
        Err(e) => {
            println!("FAIL: {e}");
            Ok(None)
        }
    }
}

/// Execute the schema subcommand.
///
/// Returns exit code: 0 on success, 1 if the library is invalid or the
/// type is unknown.
pub fn run_schema(args: &SchemaArgs, config: Option<&Path>) -> Result<u8> {
    match render_schema(args, config)? {
        Some(text) => {
            println!("{text}");
            Ok(0)
        }
        None => Ok(1),
    }
}
