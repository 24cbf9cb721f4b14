use crate::models::args::GenerateArgs;
use anyhow::{Context, Result};
use docfill::domain::config::ReplaceScope;
use docfill::domain::constants::{SHEET_EXTENSION, TEMPLATE_EXTENSION};
use docfill::features::batch::docx::DocxTemplate;
use docfill::features::batch::sheet::ReplacementSheet;
use docfill::features::batch::{BatchOptions, TemplateSet, build_archive, check_extension, generate};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// Generates the documents described by `args` into the output directory.
///
/// # Errors
/// Returns an error for unreadable or invalid inputs, failed generation, or if the
/// output cannot be written.
pub async fn generate_documents(args: GenerateArgs) -> Result<()> {
    check_extension(&args.template.to_string_lossy(), TEMPLATE_EXTENSION)?;
    check_extension(&args.sheet.to_string_lossy(), SHEET_EXTENSION)?;

    let sheet = ReplacementSheet::from_csv(&read(&args.sheet)?)?;
    let templates = load_templates(&args, &sheet)?;

    let options = BatchOptions {
        max_documents: args.max_documents,
        base_name: args.base_name.clone(),
        scope: if args.all_parts { ReplaceScope::All } else { ReplaceScope::Body },
        ..BatchOptions::default()
    };

    let report = tokio::task::spawn_blocking(move || generate(&templates, sheet, &options))
        .await
        .context("Generation task failed")??;

    fs::create_dir_all(&args.output)
        .with_context(|| format!("Failed to create {}", args.output.display()))?;

    for document in &report.documents {
        let path = args.output.join(&document.file_name);
        fs::write(&path, &document.bytes)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        println!("{}", path.display());
    }

    if let Some(name) = &args.zip {
        let path = args.output.join(name);
        fs::write(&path, build_archive(&report.documents)?)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        println!("{}", path.display());
    }

    info!(
        documents = report.documents.len(),
        skipped_rows = report.skipped_rows,
        elapsed_ms = report.elapsed.as_millis(),
        "Generation complete"
    );
    Ok(())
}

fn load_templates(args: &GenerateArgs, sheet: &ReplacementSheet) -> Result<TemplateSet> {
    let mut templates = TemplateSet::new(DocxTemplate::from_bytes(&read(&args.template)?)?);

    let Some(dir) = &args.templates_dir else {
        return Ok(templates);
    };
    let file_name = args.template.file_name().context("Template path has no file name")?;

    for category in sheet.categories() {
        let path = dir.join(category).join(file_name);
        if !path.is_file() {
            debug!(%category, path = %path.display(), "No category template");
            continue;
        }
        debug!(%category, path = %path.display(), "Category template loaded");
        templates = templates.with_category(category, DocxTemplate::from_bytes(&read(&path)?)?);
    }

    Ok(templates)
}

fn read(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).with_context(|| format!("Failed to read {}", path.display()))
}
