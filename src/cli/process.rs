// ABOUTME: `repobridge process`: run the data transform against a local checkout

use anyhow::Result;

use super::{OutputFormat, ProcessArgs};
use crate::process;

pub fn execute(args: ProcessArgs, format: OutputFormat) -> Result<()> {
    let summary = process::run(&args.root)?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&summary)?),
        OutputFormat::Text => println!(
            "wrote {} ({} lines)",
            summary.output_path.display(),
            summary.lines_out
        ),
    }

    Ok(())
}
