use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use inciscan_core::SegmentPipeline;

pub fn run(file: &Path) -> Result<()> {
    let raw = read_input(file)?;
    let output = SegmentPipeline::default().run(&raw);

    if output.tokens.is_empty() {
        eprintln!("No ingredient tokens found");
    } else {
        eprintln!(
            "{} tokens ({})",
            output.tokens.len(),
            if output.anchored {
                "header found"
            } else {
                "no header, whole text"
            }
        );
    }

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

pub(crate) fn read_input(file: &Path) -> Result<String> {
    if file.as_os_str() == "-" {
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .context("failed to read stdin")?;
        return Ok(buffer);
    }
    std::fs::read_to_string(file).with_context(|| format!("failed to read {}", file.display()))
}
