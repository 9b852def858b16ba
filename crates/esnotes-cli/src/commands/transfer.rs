use anyhow::{Context, Result};
use colored::Colorize;
use esnotes_application::SessionMerger;
use std::path::{Path, PathBuf};

use super::context::AppContext;

pub async fn import(ctx: &AppContext, file: &Path) -> Result<()> {
    let merger = SessionMerger::new(ctx.store());
    let count = merger
        .import_file(file)
        .await
        .with_context(|| format!("Failed to import {}", file.display()))?;

    println!(
        "{}",
        format!("{} sessions imported successfully", count).green()
    );
    Ok(())
}

pub async fn export(ctx: &AppContext, dir: Option<PathBuf>) -> Result<()> {
    let dir = match dir {
        Some(dir) => dir,
        None => std::env::current_dir().context("Failed to get current directory")?,
    };

    let merger = SessionMerger::new(ctx.store());
    let path = merger
        .export_to_dir(&dir, &ctx.config.export.file_name)
        .await?;

    println!("{}", format!("Exported sessions to {}", path.display()).green());
    Ok(())
}
