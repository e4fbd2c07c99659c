use clap::Parser;
use log::*;
use std::{process::ExitCode, rc::Rc};

use lambda_release::{
    DeployError, Result, Workflow,
    cli::Args,
    config,
    prompt::LinePrompter,
    repo::GitRepository,
    shell::SystemShell,
    types::{DeploymentTarget, Environment},
};

fn initialize_logger(debug: bool) -> Result<()> {
    let filter = if debug {
        simplelog::LevelFilter::Debug
    } else {
        simplelog::LevelFilter::Info
    };

    let config = simplelog::ConfigBuilder::new()
        .add_filter_allow_str("lambda_release")
        .build();

    simplelog::TermLogger::init(
        filter,
        config,
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )?;

    Ok(())
}

async fn release(args: Args) -> Result<()> {
    let (config, region) = config::resolve(&args)?;
    let target = DeploymentTarget::new(region, args.function_name)?;
    let env = Environment::from_production_flag(args.production);

    let vcs = GitRepository::open(&config.workdir)?;
    let shell = SystemShell::new(&config);

    let mut workflow = Workflow::builder()
        .config(Rc::new(config))
        .env(env)
        .target(target)
        .vcs(Box::new(vcs))
        .shell(Box::new(shell))
        .prompter(Box::new(LinePrompter::stdio()))
        .build()?;

    let deployment = workflow.run().await?;

    if let Some(tag) = deployment.tag {
        info!("released {tag}");
    }

    Ok(())
}

/// Logs the outcome of a run and maps it to the process exit status.
fn exit_code(result: &Result<()>) -> ExitCode {
    match result {
        Ok(()) => {
            info!("Done.");
            ExitCode::SUCCESS
        }
        Err(DeployError::UserDeclined) => {
            info!("Aborted.");
            ExitCode::FAILURE
        }
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> color_eyre::Result<ExitCode> {
    color_eyre::install()?;

    let args = Args::parse();

    initialize_logger(args.debug)?;

    let result = release(args).await;

    Ok(exit_code(&result))
}
