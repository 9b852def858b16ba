use anyhow::Result;
use colored::{ColoredString, Colorize};
use esnotes_application::report::{format_duration, render_report};
use esnotes_core::EsnotesError;
use esnotes_core::note::{Note, NoteIndicator, NoteType};
use esnotes_core::session::{Session, SessionStore};
use esnotes_core::timestamp;

use super::context::AppContext;

/// Colored dot for a note type.
pub fn indicator(note_type: &NoteType) -> ColoredString {
    let dot = "●";
    match note_type.indicator() {
        NoteIndicator::Green => dot.green(),
        NoteIndicator::Red => dot.red(),
        NoteIndicator::Yellow => dot.yellow(),
        NoteIndicator::Blue => dot.blue(),
        NoteIndicator::Magenta => dot.magenta(),
    }
}

pub fn print_note(index: usize, note: &Note) {
    println!(
        "{} {} {}",
        format!("{:>3}.", index + 1).bright_black(),
        indicator(&note.note_type),
        note.note_type.as_str().bold()
    );
    for line in note.content.lines() {
        println!("      {}", line);
    }
    println!(
        "      {}",
        format!("app: {}  os: {}  env: {}", note.app, note.os, note.env).bright_black()
    );
}

fn find(ctx: &AppContext, id: &str) -> Result<Session> {
    ctx.store
        .get(id)
        .ok_or_else(|| EsnotesError::not_found("Session", id).into())
}

pub fn list(ctx: &AppContext) -> Result<()> {
    let sessions = ctx.store.list();
    if sessions.is_empty() {
        println!("{}", "No sessions stored.".bright_black());
        return Ok(());
    }

    for session in &sessions {
        println!(
            "{}  {}  {}  {} notes  {}",
            session.id.bright_black(),
            timestamp::to_canonical(&session.date),
            format_duration(session.duration),
            session.note_count(),
            session.name.bold()
        );
    }
    Ok(())
}

pub fn show(ctx: &AppContext, id: &str) -> Result<()> {
    let session = find(ctx, id)?;

    println!("{}", session.name.bright_magenta().bold());
    println!(
        "{}",
        format!(
            "{}  duration {}  {} notes",
            timestamp::to_canonical(&session.date),
            format_duration(session.duration),
            session.note_count()
        )
        .bright_black()
    );
    println!();
    for (index, note) in session.notes.iter().enumerate() {
        print_note(index, note);
    }
    Ok(())
}

pub fn delete(ctx: &AppContext, id: &str) -> Result<()> {
    let session = find(ctx, id)?;
    ctx.store.remove(id)?;
    println!("{}", format!("Deleted session '{}'", session.name).green());
    Ok(())
}

pub fn report(ctx: &AppContext, id: &str, lines_per_page: Option<usize>) -> Result<()> {
    let session = find(ctx, id)?;
    let lines_per_page = lines_per_page.unwrap_or(ctx.config.report.lines_per_page);
    print!("{}", render_report(&session, lines_per_page));
    Ok(())
}
