use buildapps::cli::commands::{CliArgs, Commands};
use buildapps::cli::handlers::{handle_build, handle_find};
use buildapps::util::logging;
use buildapps::VERSION;

use clap::Parser;
use tracing::{debug, Level};

fn main() {
    let args = CliArgs::parse();
    init_logging_from_args(&args);

    debug!("buildapps v{} starting", VERSION);
    debug!("Arguments: {:?}", args);

    let exit_code = match &args.command {
        Commands::Find(find_args) => handle_find(find_args),
        Commands::Build(build_args) => handle_build(build_args),
    };

    std::process::exit(exit_code);
}

fn init_logging_from_args(args: &CliArgs) {
    let mut config = logging::config_from_env();

    if let Some(level_str) = &args.log_level {
        config.level = logging::parse_level(level_str);
    } else if args.verbose {
        config.level = Level::DEBUG;
    } else if args.quiet {
        config.level = Level::ERROR;
    }

    logging::init_logging(config);
}
