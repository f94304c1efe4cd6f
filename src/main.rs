use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Debug, Parser)]
#[command(name = "gitling")]
#[command(about = "A minimal, Git-compatible content-addressed object store", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Create a new, empty repository.
    Init {
        /// Where to create the repository (defaults to the current directory).
        path: Option<String>,
    },
    /// Hash a file as a blob, optionally writing it into the object store.
    HashObject {
        /// Write the object into the repository instead of only reporting its hash.
        #[arg(short = 'w', long)]
        write: bool,
        /// Object kind to write (only "blob" is supported).
        #[arg(short = 't', long, default_value = "blob")]
        object_type: String,
        file: PathBuf,
    },
    /// Print an object's payload to stdout.
    CatFile {
        object_type: String,
        object: String,
    },
    /// Materialize a commit's tree into the working directory.
    Checkout {
        commit: String,
    },
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Cli::parse();

    match args.command {
        Commands::Init { path } => commands::init::run(path.as_deref()),
        Commands::HashObject {
            write,
            object_type,
            file,
        } => commands::hash_object::run(write, &object_type, file),
        Commands::CatFile {
            object_type,
            object,
        } => commands::cat_file::run(&object_type, &object),
        Commands::Checkout { commit } => commands::checkout::run(&commit),
    }
}
