use clap::Parser;
use std::io::Read;
use std::path::{Path, PathBuf};

use proposal_pdf::{Error, ProposalRequest};

#[derive(Parser)]
#[command(name = "proposal-pdf", about = "Render a proposal request to PDF")]
struct Args {
    /// Proposal request JSON file, or `-` for stdin
    input: PathBuf,
    /// Output PDF file or directory (defaults to the current directory)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn read_request(input: &Path) -> Result<ProposalRequest, Error> {
    let json = if input == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        std::fs::read_to_string(input)?
    };
    Ok(serde_json::from_str(&json)?)
}

fn run(args: &Args) -> Result<PathBuf, Error> {
    let request = read_request(&args.input)?;
    let document = proposal_pdf::generate(&request)?;
    let target = match &args.output {
        Some(path) if path.is_dir() => path.join(&document.filename),
        Some(path) => path.clone(),
        None => PathBuf::from(&document.filename),
    };
    std::fs::write(&target, &document.bytes)?;
    Ok(target)
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    match run(&args) {
        Ok(path) => log::info!("Wrote {}", path.display()),
        Err(e) => {
            let response = e.to_response();
            match serde_json::to_string(&response) {
                Ok(json) => eprintln!("{json}"),
                Err(_) => eprintln!("Error: {e}"),
            }
            std::process::exit(1);
        }
    }
}
