use clap::{Parser, Subcommand, ValueEnum};

use crate::{fuzz::Fuzz, test::Test};

mod build;
mod doc;
mod fuzz;
mod run;

#[derive(Parser)]
#[command(about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

/// The frontends that can be ran in a VM.
#[derive(Clone, Copy, Default, ValueEnum)]
pub enum Frontend {
    /// The boot menu
    #[default]
    Menu,

    /// The file browser
    Browser,

    /// The directory tree printer
    Tree,
}

impl Frontend {
    pub const fn bin(self) -> &'static str {
        match self {
            Self::Menu => "bootnav-menu",
            Self::Browser => "bootnav-browser",
            Self::Tree => "bootnav-tree",
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build all crates in workspace
    Build {
        /// Build with release profile
        #[arg(short, long, default_value_t = false)]
        release: bool,

        /// Build with target architecture
        #[arg(short, long, default_value = "x86_64-unknown-uefi")]
        target: String,
    },

    /// Build docs for bootnav-core crate
    Doc {
        /// Document private items in crate
        #[arg(short, long, default_value_t = false)]
        private: bool,

        /// Open in web browser after documenting
        #[arg(short, long, default_value_t = false)]
        open: bool,
    },

    /// Run a bootnav frontend in VM with uefi-run
    Run {
        /// The frontend to run
        #[arg(value_enum, default_value_t)]
        frontend: Frontend,

        /// Path to the OVMF code file
        #[arg(long)]
        ovmf_code: Option<String>,

        /// Build with release profile
        #[arg(short, long, default_value_t = false)]
        release: bool,

        /// Add an additional file to the root of the image
        #[arg(long)]
        add_file: Option<String>,
    },

    /// Run unit tests and clippy on host, or integration tests in VM
    Test {
        #[command(subcommand)]
        command: Option<Test>,
    },

    /// Fuzz a parser with cargo-fuzz
    Fuzz {
        #[command(subcommand)]
        command: Fuzz,
    },
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    match args.command {
        Commands::Build { release, target } => build::build_all_crates(release, &target)?,
        Commands::Doc { private, open } => doc::doc_crate(private, open)?,
        Commands::Run {
            frontend,
            ovmf_code,
            release,
            add_file,
        } => run::run_frontend(frontend, ovmf_code.as_deref(), release, add_file.as_deref())?,
        Commands::Test { command } => test::test_crate(command)?,
        Commands::Fuzz { command } => fuzz::fuzz_parsers(command)?,
    }
    Ok(())
}
