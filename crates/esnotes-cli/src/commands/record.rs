//! Interactive recording REPL.
//!
//! Plain lines become notes tagged with the current type/app/os/env selection;
//! slash commands change the selection or act on the session.

use std::borrow::Cow::{self, Borrowed, Owned};

use anyhow::Result;
use colored::Colorize;
use esnotes_application::SessionRecorder;
use esnotes_application::report::format_duration;
use esnotes_core::config::RecordingConfig;
use esnotes_core::note::{NoteDraft, NoteType};
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::Validator;
use rustyline::{Context, Editor, Helper};

use super::context::AppContext;
use super::sessions::{indicator, print_note};

const COMMANDS: [&str; 9] = [
    "/type", "/app", "/os", "/env", "/name", "/clear", "/notes", "/save", "/quit",
];

#[derive(Debug, Clone, PartialEq)]
enum ReplCommand {
    Empty,
    Note(String),
    Type(Option<String>),
    App(Option<String>),
    Os(Option<String>),
    Env(Option<String>),
    Name(Option<String>),
    Clear,
    Notes,
    Save,
    Quit,
    Unknown(String),
}

fn parse_line(line: &str) -> ReplCommand {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return ReplCommand::Empty;
    }
    if !trimmed.starts_with('/') {
        return ReplCommand::Note(trimmed.to_string());
    }

    let (command, rest) = match trimmed.split_once(char::is_whitespace) {
        Some((command, rest)) => (command, rest.trim()),
        None => (trimmed, ""),
    };
    let arg = (!rest.is_empty()).then(|| rest.to_string());

    match command {
        "/type" => ReplCommand::Type(arg),
        "/app" => ReplCommand::App(arg),
        "/os" => ReplCommand::Os(arg),
        "/env" => ReplCommand::Env(arg),
        "/name" => ReplCommand::Name(arg),
        "/clear" => ReplCommand::Clear,
        "/notes" => ReplCommand::Notes,
        "/save" => ReplCommand::Save,
        "/quit" | "/exit" => ReplCommand::Quit,
        other => ReplCommand::Unknown(other.to_string()),
    }
}

/// Tags applied to the next note.
#[derive(Debug, Clone, PartialEq)]
struct Selection {
    note_type: NoteType,
    app: Option<String>,
    os: Option<String>,
    env: Option<String>,
}

impl Selection {
    fn new(config: &RecordingConfig) -> Self {
        Self {
            note_type: config.default_note_type.clone(),
            app: None,
            os: None,
            env: None,
        }
    }

    fn draft(&self, content: String) -> NoteDraft {
        NoteDraft {
            note_type: self.note_type.clone(),
            content,
            app: self.app.clone(),
            os: self.os.clone(),
            env: self.env.clone(),
        }
    }

    fn prompt(&self) -> String {
        let tags: Vec<&str> = [&self.app, &self.os, &self.env]
            .into_iter()
            .filter_map(|tag| tag.as_deref())
            .collect();
        if tags.is_empty() {
            format!("[{}] > ", self.note_type)
        } else {
            format!("[{} {}] > ", self.note_type, tags.join("/"))
        }
    }
}

/// `none` (any case) clears a tag.
fn tag_value(value: String) -> Option<String> {
    (!value.eq_ignore_ascii_case("none")).then_some(value)
}

/// Completion, hints and highlighting for the recording prompt.
struct RecordHelper {
    types: Vec<String>,
    apps: Vec<String>,
    oses: Vec<String>,
    envs: Vec<String>,
}

impl RecordHelper {
    fn new(config: &RecordingConfig) -> Self {
        Self {
            types: NoteType::BUILTIN.iter().map(|t| t.to_string()).collect(),
            apps: config.apps.clone(),
            oses: config.oses.clone(),
            envs: config.envs.clone(),
        }
    }

    fn options_for(&self, command: &str) -> Option<&[String]> {
        match command {
            "/type" => Some(self.types.as_slice()),
            "/app" => Some(self.apps.as_slice()),
            "/os" => Some(self.oses.as_slice()),
            "/env" => Some(self.envs.as_slice()),
            _ => None,
        }
    }

    /// Returns the replacement start and the matching candidates for `line`.
    fn candidates(&self, line: &str) -> (usize, Vec<String>) {
        if !line.starts_with('/') {
            return (0, Vec::new());
        }

        match line.split_once(' ') {
            None => (
                0,
                COMMANDS
                    .iter()
                    .filter(|cmd| cmd.starts_with(line))
                    .map(|cmd| cmd.to_string())
                    .collect(),
            ),
            Some((command, partial)) => {
                let start = command.len() + 1;
                let partial = partial.to_lowercase();
                let matches = self
                    .options_for(command)
                    .unwrap_or_default()
                    .iter()
                    .filter(|option| option.to_lowercase().starts_with(&partial))
                    .cloned()
                    .collect();
                (start, matches)
            }
        }
    }
}

impl Helper for RecordHelper {}

impl Completer for RecordHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let (start, matches) = self.candidates(&line[..pos]);
        let pairs = matches
            .into_iter()
            .map(|candidate| Pair {
                display: candidate.clone(),
                replacement: candidate,
            })
            .collect();
        Ok((start, pairs))
    }
}

impl Highlighter for RecordHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        if line.starts_with('/') {
            Owned(line.bright_cyan().to_string())
        } else {
            Borrowed(line)
        }
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}

impl Hinter for RecordHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        let line = &line[..pos];
        if line.starts_with('/') && !line.contains(' ') {
            COMMANDS
                .iter()
                .find(|cmd| cmd.starts_with(line) && cmd.len() > line.len())
                .map(|cmd| cmd[line.len()..].to_string())
        } else {
            None
        }
    }
}

impl Validator for RecordHelper {}

fn print_options(label: &str, options: &[String], current: Option<&str>) {
    println!(
        "{} {}",
        format!("{}:", label).bright_black(),
        current.unwrap_or("None").bold()
    );
    if !options.is_empty() {
        println!("{}", format!("  options: {}", options.join(", ")).bright_black());
    }
}

fn print_banner(recorder: &SessionRecorder) {
    println!("{}", "=== esnotes recorder ===".bright_magenta().bold());
    if !recorder.name().is_empty() {
        println!("{}", format!("Session: {}", recorder.name()).bold());
    }
    println!(
        "{}",
        "Type a line to add a note. Commands: /type /app /os /env /name /clear /notes /save /quit"
            .bright_black()
    );
    println!();
}

/// Runs the recording REPL until `/quit`, Ctrl-C or Ctrl-D.
pub async fn run(ctx: &AppContext, name: Option<String>, open: Option<String>) -> Result<()> {
    let recording = &ctx.config.recording;
    let mut recorder = match open {
        Some(id) => SessionRecorder::open(ctx.store(), &id)?,
        None => SessionRecorder::start(ctx.store())?,
    };
    if let Some(name) = name {
        recorder.set_name(name);
    }

    let mut selection = Selection::new(recording);
    let mut dirty = false;

    let mut rl: Editor<RecordHelper, DefaultHistory> = Editor::new()?;
    rl.set_helper(Some(RecordHelper::new(recording)));

    print_banner(&recorder);

    loop {
        let prompt = selection.prompt();
        let readline = tokio::task::block_in_place(|| rl.readline(&prompt));

        let line = match readline {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => return Err(e.into()),
        };

        let command = parse_line(&line);
        if command != ReplCommand::Empty {
            let _ = rl.add_history_entry(line.as_str());
        }

        match command {
            ReplCommand::Empty => {}
            ReplCommand::Note(content) => {
                let index = recorder.notes().len();
                match recorder.add_note(selection.draft(content)) {
                    Ok(note) => {
                        print_note(index, note);
                        dirty = true;
                    }
                    Err(e) => println!("{}", e.to_string().red()),
                }
            }
            ReplCommand::Type(Some(value)) => {
                selection.note_type = NoteType::from(value);
                println!(
                    "{} {}",
                    indicator(&selection.note_type),
                    format!("type: {}", selection.note_type).bright_black()
                );
            }
            ReplCommand::Type(None) => {
                for note_type in NoteType::BUILTIN.iter() {
                    let marker = if *note_type == selection.note_type { "*" } else { " " };
                    println!("{} {} {}", marker, indicator(note_type), note_type);
                }
            }
            ReplCommand::App(Some(value)) => selection.app = tag_value(value),
            ReplCommand::App(None) => {
                print_options("app", &recording.apps, selection.app.as_deref())
            }
            ReplCommand::Os(Some(value)) => selection.os = tag_value(value),
            ReplCommand::Os(None) => print_options("os", &recording.oses, selection.os.as_deref()),
            ReplCommand::Env(Some(value)) => selection.env = tag_value(value),
            ReplCommand::Env(None) => {
                print_options("env", &recording.envs, selection.env.as_deref())
            }
            ReplCommand::Name(Some(value)) => {
                recorder.set_name(value);
                dirty = true;
                println!("{}", format!("Session name: {}", recorder.name()).bright_black());
            }
            ReplCommand::Name(None) => {
                let name = recorder.name();
                println!("{}", if name.is_empty() { "(unnamed)" } else { name });
            }
            ReplCommand::Clear => {
                recorder.clear_notes();
                dirty = true;
                println!("{}", "Notes cleared.".bright_black());
            }
            ReplCommand::Notes => {
                if recorder.notes().is_empty() {
                    println!("{}", "No notes yet.".bright_black());
                }
                for (index, note) in recorder.notes().iter().enumerate() {
                    print_note(index, note);
                }
                println!(
                    "{}",
                    format!("elapsed {}", format_duration(recorder.elapsed())).bright_black()
                );
            }
            ReplCommand::Save => match recorder.save() {
                Ok(session) => {
                    dirty = false;
                    println!(
                        "{}",
                        format!(
                            "Session '{}' saved ({} notes, {})",
                            session.name,
                            session.note_count(),
                            format_duration(session.duration)
                        )
                        .green()
                    );
                }
                Err(e) => println!("{}", format!("Error saving session: {}", e).red()),
            },
            ReplCommand::Quit => break,
            ReplCommand::Unknown(command) => {
                println!("{}", format!("Unknown command: {}", command).bright_black())
            }
        }
    }

    if dirty {
        println!("{}", "Unsaved changes discarded.".yellow());
    }
    recorder.close();
    Ok(())
}
