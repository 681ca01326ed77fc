use anyhow::Result;
use clap::Parser;

mod cli;
mod commands;
mod distro;
mod error;
mod exec;
mod logging;
mod paths;
mod platform;
mod prompt;
mod resources;
mod tasks;
mod template;

fn main() -> Result<()> {
    let args = cli::Cli::parse();
    logging::init_subscriber(args.verbose, "install");

    // interruption at a prompt aborts the whole run; partial state is left
    // behind and cleaned up by simply re-running
    let _ = ctrlc::set_handler(|| {
        eprintln!();
        eprintln!("aborting");
        std::process::exit(1);
    });

    let log = logging::Logger::new("install");
    commands::install::run(&args, &log)
}
