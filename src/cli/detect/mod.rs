//! Detect command - prints the sniffed document type

use std::path::PathBuf;

use clap::Args;

use crate::infrastructure::ingestion::detect_file_type;

#[derive(Args, Debug)]
pub struct DetectArgs {
    /// File to inspect
    pub file: PathBuf,
}

pub async fn run(args: DetectArgs) -> anyhow::Result<()> {
    crate::cli::bootstrap()?;

    match detect_file_type(&args.file).await? {
        Some(document_type) => println!("{}", document_type),
        None => anyhow::bail!("'{}': unrecognized document type", args.file.display()),
    }

    Ok(())
}
