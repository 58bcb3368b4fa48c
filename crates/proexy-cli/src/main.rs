mod commands;
mod output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "proexy",
    version,
    about = "Sort Ex inspection certificates by template and export them to spreadsheets"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify every PDF in a folder and write one workbook per family
    Process {
        /// Folder holding the certificate PDFs
        folder: PathBuf,

        /// JSON config file overriding the defaults
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Where family folders and workbooks go (default: the input folder)
        #[arg(long, value_name = "DIR")]
        output_dir: Option<PathBuf>,

        /// Summary format: table (default) or json
        #[arg(short, long, default_value = "table")]
        output: String,
    },
    /// Print the certificate family of each PDF
    Classify {
        /// PDF files to classify
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Extract the labelled fields of one Oman certificate
    Oman {
        input_file: PathBuf,

        /// JSON config file overriding the defaults
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Output format: table (default) or json
        #[arg(short, long, default_value = "table")]
        output: String,
    },
    /// Extract the inspection rows of one Proserv certificate
    Proserv {
        input_file: PathBuf,

        /// JSON config file overriding the defaults
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Output format: table (default) or json
        #[arg(short, long, default_value = "table")]
        output: String,
    },
    /// List the Oman field dictionary and the Proserv columns
    Fields,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Process {
            folder,
            config,
            output_dir,
            output,
        } => commands::process::run(folder, config, output_dir, &output),
        Commands::Classify { files } => commands::classify::run(&files).map(|()| true),
        Commands::Oman {
            input_file,
            config,
            output,
        } => commands::extract::oman(&input_file, config.as_deref(), &output).map(|()| true),
        Commands::Proserv {
            input_file,
            config,
            output,
        } => commands::extract::proserv(&input_file, config.as_deref(), &output).map(|()| true),
        Commands::Fields => {
            commands::fields::list();
            Ok(true)
        }
    };

    match result {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}
