//! Build command implementation.
//!
//! Compiles the input directory into the store and reports the result.
//! Per-file failures are printed but do not fail the command.

use crate::error::{PackError, Result};
use crate::output::{display_path, Printer};
use crate::pipeline::{build, BuildOptions};

use super::Cli;

pub fn run(cli: Cli, printer: &Printer) -> Result<()> {
    if !cli.input_directory.is_dir() {
        return Err(PackError::Io {
            path: cli.input_directory.clone(),
            message: "Input directory does not exist".to_string(),
        });
    }

    printer.status(
        "Packing",
        &format!(
            "{} {} {}",
            display_path(&cli.input_directory),
            printer.dim("->"),
            display_path(&cli.database_name)
        ),
    );

    let options = BuildOptions {
        clean: cli.clean,
        cache_dir: cli.cache_dir,
        jobs: cli.jobs,
        level: cli.level,
    };
    if options.clean {
        printer.info("Cleaning", &display_path(&cli.database_name));
    }

    let report = build(&cli.input_directory, &cli.database_name, &options)?;
    printer.report(&report);

    if cli.json {
        let json = serde_json::to_string_pretty(&report).map_err(|e| PackError::Config {
            message: format!("Failed to serialize report: {}", e),
            help: None,
        })?;
        println!("{}", json);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::ffi::OsStr;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_run_builds_store() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("game");
        fs::create_dir_all(input.join("code")).unwrap();
        fs::write(input.join("code/main.lua"), "print('hi')").unwrap();
        let db = dir.path().join("game.db");

        let cli = Cli::parse_from([
            OsStr::new("assetpack"),
            input.as_os_str(),
            db.as_os_str(),
        ]);
        run(cli, &Printer::new(false)).unwrap();

        assert!(db.exists());
    }

    #[test]
    fn test_run_missing_input_directory() {
        let dir = tempdir().unwrap();
        let cli = Cli::parse_from([
            OsStr::new("assetpack"),
            dir.path().join("nope").as_os_str(),
            dir.path().join("game.db").as_os_str(),
        ]);

        assert!(run(cli, &Printer::new(false)).is_err());
        assert!(!dir.path().join("game.db").exists());
    }
}
