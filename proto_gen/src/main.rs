use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod cmds;

#[derive(Parser)]
#[command(name = "proto-gen")]
#[command(about = "Schema-to-codec compiler for the protobuf wire format", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /* Compile a resolved schema into a codec manifest */
    Compile {
        /* Input schema file (resolved tree, YAML or JSON) */
        #[arg(short = 'f', long = "file", value_name = "FILE")]
        file: PathBuf,

        /* Manifest output path; printed to stdout when omitted */
        #[arg(short = 'o', long = "output", value_name = "FILE")]
        output: Option<PathBuf>,

        /* Enable verbose compiler output */
        #[arg(short = 'v', long = "verbose")]
        verbose: bool,
    },

    /* Analyze a resolved schema and list its compiled artifacts */
    Analyze {
        /* Input schema file (resolved tree, YAML or JSON) */
        #[arg(short = 'f', long = "file", value_name = "FILE")]
        file: PathBuf,

        /* Enable verbose compiler output */
        #[arg(short = 'v', long = "verbose")]
        verbose: bool,
    },
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Compile {
            file,
            output,
            verbose,
        } => {
            init_tracing(verbose);
            cmds::compile::run(&file, output.as_deref(), verbose)?;
        }

        Commands::Analyze { file, verbose } => {
            init_tracing(verbose);
            cmds::analyze::run(&file)?;
        }
    }

    Ok(())
}
