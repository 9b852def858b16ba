//! Plain-text session report.
//!
//! Renders a session header followed by one block per note, split into pages of
//! at most `lines_per_page` lines. Each page ends with a `Page N/M` footer and
//! pages are separated by a form feed.

use esnotes_core::session::Session;
use esnotes_core::timestamp;

/// Lines reserved at the bottom of every page: a blank spacer and the footer.
const FOOTER_LINES: usize = 2;

/// Smallest usable page: one content line plus the footer.
const MIN_LINES_PER_PAGE: usize = FOOTER_LINES + 1;

const PAGE_BREAK: &str = "\u{c}";

/// Formats seconds as `HH:MM:SS`. Hours are not wrapped at 24.
pub fn format_duration(seconds: u64) -> String {
    format!(
        "{:02}:{:02}:{:02}",
        seconds / 3600,
        (seconds % 3600) / 60,
        seconds % 60
    )
}

fn header(session: &Session) -> Vec<String> {
    vec![
        format!("Session: {}", session.name),
        format!("Date: {}", timestamp::to_canonical(&session.date)),
        format!("Duration: {}", format_duration(session.duration)),
        format!("Notes: {}", session.note_count()),
        String::new(),
    ]
}

fn note_blocks(session: &Session) -> Vec<Vec<String>> {
    session
        .notes
        .iter()
        .enumerate()
        .map(|(index, note)| {
            let mut block = vec![format!("{}. [{}]", index + 1, note.note_type)];
            block.extend(note.content.lines().map(|line| format!("   {}", line)));
            block.push(format!(
                "   App: {} | OS: {} | Env: {}",
                note.app, note.os, note.env
            ));
            block.push(String::new());
            block
        })
        .collect()
}

/// Packs blocks into pages of `body` lines, keeping a block on one page when it fits.
fn paginate(blocks: Vec<Vec<String>>, body: usize) -> Vec<Vec<String>> {
    let mut pages: Vec<Vec<String>> = Vec::new();
    let mut current: Vec<String> = Vec::new();

    for block in blocks {
        if !current.is_empty() && current.len() + block.len() > body {
            pages.push(std::mem::take(&mut current));
        }
        for line in block {
            if current.len() == body {
                pages.push(std::mem::take(&mut current));
            }
            current.push(line);
        }
    }
    if !current.is_empty() || pages.is_empty() {
        pages.push(current);
    }
    pages
}

/// Renders `session` as paginated text.
///
/// `lines_per_page` counts every line on a page including the footer; values
/// below the minimum are raised to it.
pub fn render_report(session: &Session, lines_per_page: usize) -> String {
    let body = lines_per_page.max(MIN_LINES_PER_PAGE) - FOOTER_LINES;

    let mut blocks = vec![header(session)];
    blocks.extend(note_blocks(session));

    let pages = paginate(blocks, body);
    let total = pages.len();

    pages
        .into_iter()
        .enumerate()
        .map(|(index, mut lines)| {
            while lines.last().is_some_and(|line| line.is_empty()) {
                lines.pop();
            }
            lines.push(String::new());
            lines.push(format!("Page {}/{}", index + 1, total));
            lines.join("\n") + "\n"
        })
        .collect::<Vec<_>>()
        .join(PAGE_BREAK)
}
