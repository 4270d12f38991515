//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

/// assetline static asset pipeline CLI
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Project root (default: current directory)
    #[arg(short, long, global = true, value_hint = clap::ValueHint::DirPath)]
    pub root: Option<PathBuf>,

    /// Config file path, relative to the project root (optional file)
    #[arg(short = 'C', long, global = true, default_value = "assetline.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// Use the production ("hard") profile: prefix, minify, bundle, output to the production root
    #[arg(long, global = true)]
    pub hard: bool,

    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Soft build, then serve the staging root with live reload
    #[command(visible_alias = "d")]
    Dev {
        #[command(flatten)]
        serve: ServeArgs,
    },

    /// Clean and build every asset class
    #[command(visible_alias = "b")]
    Build,

    /// Delete previous output for the active profile
    Clear,

    /// Resolve @@include directives in markup
    Html,

    /// Compile SCSS
    Sass,

    /// Copy or minify plain CSS
    Css,

    /// Copy or transpile + bundle scripts
    Js,

    /// Optimize images
    Img,

    /// Serve the staging root and watch sources, without an initial build
    Server {
        #[command(flatten)]
        serve: ServeArgs,
    },
}

/// Shared arguments for commands that start the dev server
#[derive(clap::Args, Debug, Clone, Default)]
pub struct ServeArgs {
    /// Network interface to bind (e.g., 127.0.0.1, 0.0.0.0)
    #[arg(short, long)]
    pub interface: Option<std::net::IpAddr>,

    /// Port number to listen on
    #[arg(short, long)]
    pub port: Option<u16>,
}

impl Cli {
    /// Commands that run the dev server, which only ever uses the soft profile.
    pub const fn serves(&self) -> bool {
        matches!(self.command, Commands::Dev { .. } | Commands::Server { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_build_hard() {
        let cli = Cli::try_parse_from(["assetline", "build", "--hard"]).unwrap();
        assert!(cli.hard);
        assert!(matches!(cli.command, Commands::Build));

        let cli = Cli::try_parse_from(["assetline", "--hard", "build"]).unwrap();
        assert!(cli.hard);
    }

    #[test]
    fn test_parse_default_is_soft() {
        let cli = Cli::try_parse_from(["assetline", "build"]).unwrap();
        assert!(!cli.hard);
        assert_eq!(cli.config, PathBuf::from("assetline.toml"));
    }

    #[test]
    fn test_parse_dev_serve_args() {
        let cli = Cli::try_parse_from(["assetline", "dev", "-p", "8080", "-i", "0.0.0.0"]).unwrap();
        assert!(cli.serves());
        let Commands::Dev { serve } = cli.command else {
            panic!("expected dev");
        };
        assert_eq!(serve.port, Some(8080));
        assert!(serve.interface.is_some());
    }

    #[test]
    fn test_parse_standalone_tasks() {
        for name in ["clear", "html", "sass", "css", "js", "img", "server"] {
            let cli = Cli::try_parse_from(["assetline", name]).unwrap();
            assert_eq!(cli.serves(), name == "server", "{name}");
        }
    }
}
