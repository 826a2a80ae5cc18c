//! Subcommand handlers. Each returns the process exit code.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::{error, info};

use super::commands::{BuildArgs, DiscoveryArgs, FindArgs};
use super::output::{OutputFormat, OutputFormatter};
use crate::app::BuildSystemId;
use crate::build::{build_apps, BuildOptions, IdfBuilder};
use crate::config::BuildAppsConfig;
use crate::context::{compile_ignore_warnings, RunContext};
use crate::error::SetupError;
use crate::finder::{find_apps, ExcludeSet, FindOptions, ScanOptions};
use crate::manifest::Manifest;
use crate::rules::parse_rules;

pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_BUILD_FAILED: i32 = 1;
pub const EXIT_SETUP_ERROR: i32 = 2;

/// Builds the run context and discovery options. Any failure here is a
/// setup error and nothing has been built yet.
fn prepare(
    args: &DiscoveryArgs,
    ignore_warning_str: &[String],
    ignore_warning_file: Option<&Path>,
) -> Result<(RunContext, FindOptions)> {
    let config = BuildAppsConfig::default();
    config
        .validate()
        .context("Invalid environment configuration")?;

    let build_system: BuildSystemId = args.build_system.parse().map_err(SetupError::from)?;
    let mut ctx = RunContext::new(config, build_system)?;

    if !args.manifest_file.is_empty() {
        let manifest = Manifest::from_files(&args.manifest_file).map_err(SetupError::from)?;
        info!(rules = manifest.rules().count(), "Loaded manifest");
        ctx = ctx.with_manifest(manifest);
    }

    let ignore = compile_ignore_warnings(ignore_warning_str, ignore_warning_file)?;
    ctx = ctx.with_ignore_warnings(ignore);

    let rules = parse_rules(&args.config).map_err(SetupError::from)?;
    let template = args.template(ctx.build_system().id(), &ctx.config.build_dir);
    let scan = ScanOptions::new(args.target.clone(), rules).with_template(template);
    let options = FindOptions::new(scan)
        .recursive(args.recursive)
        .exclude(ExcludeSet::new(&args.exclude));

    Ok((ctx, options))
}

fn setup_failed(e: &anyhow::Error) -> i32 {
    error!("{:#}", e);
    eprintln!("Error: {:#}", e);
    EXIT_SETUP_ERROR
}

pub fn handle_find(args: &FindArgs) -> i32 {
    let (ctx, options) = match prepare(&args.discovery, &[], None) {
        Ok(prepared) => prepared,
        Err(e) => return setup_failed(&e),
    };

    let apps = find_apps(&ctx, &args.discovery.paths, &options);
    let formatter = OutputFormatter::new(OutputFormat::from(args.format));

    let written = formatter.format_apps(&apps).and_then(|out| match &args.output {
        Some(path) => fs::write(path, out)
            .with_context(|| format!("Failed to write {}", path.display())),
        None => {
            print!("{}", out);
            Ok(())
        }
    });

    match written {
        Ok(()) => EXIT_SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            EXIT_BUILD_FAILED
        }
    }
}

pub fn handle_build(args: &BuildArgs) -> i32 {
    let (ctx, options) = match prepare(
        &args.discovery,
        &args.ignore_warning_str,
        args.ignore_warning_file.as_deref(),
    ) {
        Ok(prepared) => prepared,
        Err(e) => return setup_failed(&e),
    };

    let mut apps = find_apps(&ctx, &args.discovery.paths, &options);

    let builder =
        IdfBuilder::from_context(&ctx).with_size_collection(args.collect_size_info.is_some());
    let build_options = BuildOptions {
        parallel_count: args.parallel_count,
        parallel_index: args.parallel_index,
        dry_run: args.dry_run,
        keep_going: args.keep_going,
        verbose: args.build_verbose,
        collect_size_info: args.collect_size_info.clone(),
    };

    let report = match build_apps(&mut apps, &builder, &build_options) {
        Ok(report) => report,
        Err(e) => return setup_failed(&anyhow::Error::from(e)),
    };

    match OutputFormatter::new(OutputFormat::from(args.format)).format_report(&report) {
        Ok(out) => println!("{}", out.trim_end()),
        Err(e) => eprintln!("Error: {:#}", e),
    }

    report.exit_code()
}
