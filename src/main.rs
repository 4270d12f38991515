//! assetline - a static asset pipeline with a live-reload dev server.

mod asset;
mod cli;
mod config;
mod core;
mod embed;
mod image;
mod logger;
mod pipeline;
mod serve;
mod template;
mod utils;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands};
use config::PipelineConfig;
use crate::core::BuildProfile;
use owo_colors::OwoColorize;
use pipeline::{Task, TaskContext, build_plan, run_plan};

use crate::asset::AssetClass;

fn main() {
    if let Err(e) = run() {
        eprintln!("{} {:#}", "[error]".bright_red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    // Setup global Ctrl+C handler (before any blocking operations)
    crate::core::setup_shutdown_handler()?;

    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }
    logger::set_verbose(cli.verbose);

    let config = PipelineConfig::load(&cli)?;
    let profile = resolve_profile(&cli);
    let ctx = TaskContext::new(&config.paths, profile);
    debug!("config"; "profile {} -> {}", profile, config.paths.relative(&ctx.output_root()).display());

    match &cli.command {
        Commands::Build => build(&ctx),
        Commands::Dev { .. } => {
            build(&ctx)?;
            serve::serve(&config)
        }
        Commands::Server { .. } => serve::serve(&config),
        Commands::Clear => run_single(Task::Clear, &ctx),
        Commands::Html => run_single(Task::Asset(AssetClass::Markup), &ctx),
        Commands::Sass => run_single(Task::Asset(AssetClass::Sass), &ctx),
        Commands::Css => run_single(Task::Asset(AssetClass::Css), &ctx),
        Commands::Js => run_single(Task::Asset(AssetClass::Script), &ctx),
        Commands::Img => run_single(Task::Asset(AssetClass::Image), &ctx),
    }
}

/// `dev` and `server` only ever build into the staging root.
fn resolve_profile(cli: &Cli) -> BuildProfile {
    let requested = BuildProfile::from_flag(cli.hard);
    if cli.serves() && requested.is_hard() {
        log!("serve"; "--hard is ignored, the dev server always uses the soft profile");
        return BuildProfile::Soft;
    }
    requested
}

fn build(ctx: &TaskContext) -> Result<()> {
    let report = run_plan(&build_plan(), ctx)?;
    log!("build"; "{} build: {} files in {:.2?}", ctx.profile, report.files_written(), report.elapsed);
    Ok(())
}

fn run_single(task: Task, ctx: &TaskContext) -> Result<()> {
    run_plan(&[task], ctx).map(|_| ())
}
