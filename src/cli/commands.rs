use crate::app::{AppTemplate, BuildSystemId};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Find and build firmware apps across a source tree
#[derive(Parser, Debug)]
#[command(
    name = "buildapps",
    about = "Find and build firmware apps across a source tree",
    version,
    long_about = "buildapps walks source trees looking for app directories, expands each \
                  one into sdkconfig variants using config rules, filters them by target \
                  and manifest, and builds one partition of the result so CI jobs can \
                  share the work."
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, global = true, value_name = "LEVEL", help = "Set logging level")]
    pub log_level: Option<String>,

    #[arg(short = 'v', long, global = true, help = "Enable debug logging")]
    pub verbose: bool,

    #[arg(
        short = 'q',
        long,
        global = true,
        conflicts_with = "verbose",
        help = "Quiet mode - only log errors"
    )]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(
        about = "List the apps that would be built",
        long_about = "Finds apps under the given paths and prints one line per app.\n\n\
                      Examples:\n  \
                      buildapps find -p examples --recursive -t esp32\n  \
                      buildapps find -p examples -r -t esp32s3 --config 'sdkconfig.ci.*=' --format json"
    )]
    Find(FindArgs),

    #[command(
        about = "Build one partition of the found apps",
        long_about = "Finds apps like `find`, then builds the slice assigned to \
                      --parallel-index out of --parallel-count workers.\n\n\
                      Examples:\n  \
                      buildapps build -p examples -r -t esp32 --dry-run\n  \
                      buildapps build -p examples -r -t esp32 --parallel-count 4 --parallel-index 2 --keep-going"
    )]
    Build(BuildArgs),
}

/// Discovery arguments shared by `find` and `build`
#[derive(Args, Debug, Clone)]
pub struct DiscoveryArgs {
    #[arg(
        short = 'p',
        long = "paths",
        value_name = "PATH",
        num_args = 1..,
        required = true,
        help = "Directories to search for apps"
    )]
    pub paths: Vec<PathBuf>,

    #[arg(short = 't', long, value_name = "TARGET", help = "Target to find apps for")]
    pub target: String,

    #[arg(
        long,
        value_name = "NAME",
        default_value = "cmake",
        help = "Build system of the apps"
    )]
    pub build_system: String,

    #[arg(short = 'r', long, help = "Search subdirectories of the given paths")]
    pub recursive: bool,

    #[arg(
        long,
        value_name = "PATH",
        num_args = 1..,
        help = "Directories skipped during a recursive search"
    )]
    pub exclude: Vec<PathBuf>,

    #[arg(
        long,
        value_name = "TEMPLATE",
        help = "Copy each app here before building (supports @t @w @n @f @i)"
    )]
    pub work_dir: Option<String>,

    #[arg(
        long,
        value_name = "TEMPLATE",
        help = "Build directory, relative to the work directory unless absolute [default: BUILDAPPS_BUILD_DIR or build]"
    )]
    pub build_dir: Option<String>,

    #[arg(long, value_name = "TEMPLATE", help = "Write build output to this file")]
    pub build_log: Option<String>,

    #[arg(
        long,
        value_name = "TEMPLATE",
        help = "Size report path, relative to the build directory unless absolute"
    )]
    pub size_file: Option<String>,

    #[arg(
        long = "config",
        value_name = "RULE",
        num_args = 1..,
        help = "Config rules as PATTERN=NAME, at most one '*' per pattern"
    )]
    pub config: Vec<String>,

    #[arg(
        long,
        value_name = "FILE",
        num_args = 1..,
        help = "Manifest files enabling or disabling targets per folder"
    )]
    pub manifest_file: Vec<PathBuf>,

    #[arg(long, help = "Remove build artifacts after a successful build")]
    pub no_preserve: bool,

    #[arg(long, help = "Treat warnings in the build log as failures")]
    pub check_warnings: bool,
}

impl DiscoveryArgs {
    pub fn template(&self, build_system: BuildSystemId, default_build_dir: &str) -> AppTemplate {
        AppTemplate {
            build_system,
            work_dir: self.work_dir.clone(),
            build_dir: self
                .build_dir
                .clone()
                .unwrap_or_else(|| default_build_dir.to_string()),
            build_log_path: self.build_log.clone(),
            size_json_path: self.size_file.clone(),
            preserve: !self.no_preserve,
            check_warnings: self.check_warnings,
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct FindArgs {
    #[command(flatten)]
    pub discovery: DiscoveryArgs,

    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: OutputFormatArg,

    #[arg(
        short = 'o',
        long,
        value_name = "FILE",
        help = "Write output to file instead of stdout"
    )]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct BuildArgs {
    #[command(flatten)]
    pub discovery: DiscoveryArgs,

    #[arg(long, value_name = "N", default_value = "1", help = "Number of parallel workers")]
    pub parallel_count: usize,

    #[arg(
        long,
        value_name = "N",
        default_value = "1",
        help = "1-based index of this worker"
    )]
    pub parallel_index: usize,

    #[arg(long, help = "Log what would be built without building")]
    pub dry_run: bool,

    #[arg(long, help = "Continue past failed builds and report them at the end")]
    pub keep_going: bool,

    #[arg(long, help = "Show build driver output")]
    pub build_verbose: bool,

    #[arg(
        long,
        value_name = "FILE",
        help = "Append one size-info line per built app to this file"
    )]
    pub collect_size_info: Option<PathBuf>,

    #[arg(
        long,
        value_name = "TEXT",
        num_args = 1..,
        help = "Ignore warnings containing this text"
    )]
    pub ignore_warning_str: Vec<String>,

    #[arg(
        long,
        value_name = "FILE",
        help = "File with one warning regex to ignore per line"
    )]
    pub ignore_warning_file: Option<PathBuf>,

    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Build report format"
    )]
    pub format: OutputFormatArg,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormatArg {
    Human,
    Json,
}

impl From<OutputFormatArg> for super::output::OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Human => super::output::OutputFormat::Human,
            OutputFormatArg::Json => super::output::OutputFormat::Json,
        }
    }
}
