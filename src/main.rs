use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use kispec::{BuildOutcome, Settings};

/// Build an ESKD parts specification from a KiCad XML netlist.
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// KiCad netlist exported in XML format
    netlist: PathBuf,

    /// Output PDF (defaults to the netlist name with a .pdf extension)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Settings file in TOML format
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// First-page layout variant (1-4), overrides the settings file
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=4))]
    variant: Option<u8>,
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    let mut settings = match cli.config.as_deref().map(Settings::load).transpose() {
        Ok(settings) => settings.unwrap_or_default(),
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };
    if let Some(variant) = cli.variant {
        settings.render.first_page_variant = variant;
    }

    let output = cli
        .output
        .unwrap_or_else(|| cli.netlist.with_extension("pdf"));

    match kispec::convert_netlist_to_pdf(&cli.netlist, &output, &settings) {
        Ok(BuildOutcome::Built { rows, pages }) => {
            println!("Wrote {} ({rows} rows, {pages} pages)", output.display());
            ExitCode::SUCCESS
        }
        Ok(BuildOutcome::NoData) => {
            eprintln!("No components found in {}", cli.netlist.display());
            ExitCode::FAILURE
        }
        Ok(BuildOutcome::Busy) => {
            eprintln!("Another build is in progress");
            ExitCode::FAILURE
        }
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
