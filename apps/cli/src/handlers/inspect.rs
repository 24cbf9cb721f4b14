use anyhow::{Context, Result};
use docfill::features::batch::sheet::ReplacementSheet;
use std::fs;
use std::path::Path;

/// Prints the tokens, row count and categories of a sheet.
///
/// # Errors
/// Returns an error if the file cannot be read or is not a valid sheet.
pub fn inspect_sheet(path: &Path) -> Result<()> {
    let bytes = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let sheet = ReplacementSheet::from_csv(&bytes)?;

    println!("Tokens ({}):", sheet.tokens().len());
    for token in sheet.tokens() {
        println!("  {token}");
    }
    println!("Rows: {}", sheet.len());

    let categories = sheet.categories();
    if !categories.is_empty() {
        println!("Categories: {}", categories.join(", "));
    }

    Ok(())
}
