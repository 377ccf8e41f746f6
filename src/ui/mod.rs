mod init_config;
mod list;
pub mod print_macros;
mod run;

use crate::eprintln_error;
use crate::imp::config::ConfigFile;
use crate::ExitStatus;
use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[clap(
    version = "0.1",
    author = "statiolake",
    about = "Minifies JS and CSS assets through remote minification services"
)]
struct Options {
    #[clap(short, long, help = "Suppresses informational output")]
    quiet: bool,

    #[clap(
        short,
        long,
        help = "Config file to use instead of ./minify.json or the user config"
    )]
    config: Option<PathBuf>,

    #[clap(subcommand)]
    subcommand: SubCommand,
}

#[derive(clap::Subcommand)]
enum SubCommand {
    #[clap(name = "run", aliases = &["r"])]
    Run(run::Run),

    #[clap(name = "list", aliases = &["ls"])]
    List(list::List),

    #[clap(name = "init-config", aliases = &["init"])]
    InitConfig(init_config::InitConfig),
}

impl Options {
    fn run(self) -> anyhow::Result<ExitStatus> {
        let Options {
            quiet,
            config,
            subcommand,
        } = self;
        let load_config =
            || ConfigFile::get_config(config.as_deref()).context("failed to load the config");

        match subcommand {
            SubCommand::Run(cmd) => cmd.run(quiet, &load_config()?).map_err(Into::into),
            SubCommand::List(cmd) => cmd.run(quiet, &load_config()?).map_err(Into::into),
            SubCommand::InitConfig(cmd) => cmd.run(quiet).map_err(Into::into),
        }
    }
}

pub fn main() {
    let opts = Options::parse();
    let quiet = opts.quiet;
    match opts.run() {
        Ok(status) => std::process::exit(status.code()),
        Err(e) => {
            eprintln_error!("{}", e);
            print_macros::print_causes(quiet, &*e);
            std::process::exit(1);
        }
    }
}
