use crate::eprintln_info;
use crate::imp::config::{ConfigFile, Source};
use crate::ExitStatus;
use anyhow::Result;

#[derive(clap::Args)]
#[clap(about = "Lists the configured pipelines")]
pub struct List;

impl List {
    pub fn run(self, quiet: bool, config: &ConfigFile) -> Result<ExitStatus> {
        if config.pipelines.is_empty() && !quiet {
            eprintln_info!("no pipelines are configured");
        }

        for pipeline in &config.pipelines {
            println!("{}", pipeline.name);
            println!("    POST {}", pipeline.endpoint_url());
            match &pipeline.source {
                Source::RemoteSources { urls, extra_params } => {
                    for url in urls {
                        println!("    code_url {}", url);
                    }
                    for (key, value) in extra_params {
                        println!("    {} {}", key, value);
                    }
                }
                Source::LocalText { path } => println!("    input <- {}", path.display()),
            }
            println!("    -> {}", pipeline.output.display());
        }

        Ok(ExitStatus::Success)
    }
}
