//! Line-oriented command loop over a [`SessionHandle`].
//!
//! Each input line is one command. Text arguments accept `\n`, `\t`, and
//! `\\` escapes so multi-line content can be typed on a single line.


use chrono::Local;
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use vellum_editor::{SessionHandle, SessionStatus};

/// A parsed input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
	/// Replace the buffer.
	Edit(String),
	/// Append to the buffer.
	Append(String),
	Undo,
	Redo,
	Save,
	Show,
	Status,
	Help,
	Quit,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
	#[error("unknown command `{0}` (try `help`)")]
	Unknown(String),
	#[error("`{0}` takes no arguments")]
	UnexpectedArgument(&'static str),
}

const HELP: &str = "\
edit <text>    replace the buffer
append <text>  append to the buffer
undo | redo    step through snapshots
save           persist now
show           print the buffer
status         print sync and history state
quit           exit
";

/// Parses one input line. Blank lines yield `None`.
pub fn parse_line(line: &str) -> Result<Option<Command>, ParseError> {
	let line = line.trim_end_matches(['\r', '\n']);
	if line.trim().is_empty() {
		return Ok(None);
	}
	let trimmed = line.trim_start();
	let (word, rest) = match trimmed.split_once(' ') {
		Some((word, rest)) => (word, rest),
		None => (trimmed, ""),
	};

	let bare = |command: Command, name: &'static str| {
		if rest.trim().is_empty() {
			Ok(Some(command))
		} else {
			Err(ParseError::UnexpectedArgument(name))
		}
	};

	match word {
		"edit" | "e" => Ok(Some(Command::Edit(unescape(rest)))),
		"append" | "a" => Ok(Some(Command::Append(unescape(rest)))),
		"undo" | "u" => bare(Command::Undo, "undo"),
		"redo" | "r" => bare(Command::Redo, "redo"),
		"save" | "w" => bare(Command::Save, "save"),
		"show" | "p" => bare(Command::Show, "show"),
		"status" | "s" => bare(Command::Status, "status"),
		"help" | "?" => bare(Command::Help, "help"),
		"quit" | "q" => bare(Command::Quit, "quit"),
		other => Err(ParseError::Unknown(other.to_string())),
	}
}

/// Expands `\n`, `\t`, and `\\`. Other backslashes are kept literally.
pub fn unescape(text: &str) -> String {
	let mut out = String::with_capacity(text.len());
	let mut chars = text.chars();
	while let Some(ch) = chars.next() {
		if ch != '\\' {
			out.push(ch);
			continue;
		}
		match chars.next() {
			Some('n') => out.push('\n'),
			Some('t') => out.push('\t'),
			Some('\\') => out.push('\\'),
			Some(other) => {
				out.push('\\');
				out.push(other);
			}
			None => out.push('\\'),
		}
	}
	out
}

/// One-line rendering of a status snapshot.
pub fn format_status(status: &SessionStatus) -> String {
	let saved = status.last_saved_at.map_or_else(
		|| "never".to_string(),
		|at| at.with_timezone(&Local).format("%H:%M:%S").to_string(),
	);
	let position = if status.history_len == 0 {
		"0/0".to_string()
	} else {
		format!("{}/{}", status.history_index + 1, status.history_len)
	};
	format!(
		"{}  history {}  undo {}  redo {}  saved {}",
		status.sync,
		position,
		yes_no(status.can_undo),
		yes_no(status.can_redo),
		saved
	)
}

fn yes_no(value: bool) -> &'static str {
	if value { "yes" } else { "no" }
}

/// Reads commands from `input` until `quit` or end of input.
pub async fn run<R, W>(handle: &SessionHandle, input: R, mut output: W) -> anyhow::Result<()>
where
	R: AsyncBufRead + Unpin,
	W: AsyncWrite + Unpin,
{
	let mut lines = input.lines();
	while let Some(line) = lines.next_line().await? {
		let reply = match parse_line(&line) {
			Ok(None) => continue,
			Ok(Some(Command::Quit)) => break,
			Ok(Some(command)) => execute(handle, command).await?,
			Err(error) => Some(format!("error: {error}")),
		};
		if let Some(reply) = reply {
			output.write_all(reply.as_bytes()).await?;
			if !reply.ends_with('\n') {
				output.write_all(b"\n").await?;
			}
			output.flush().await?;
		}
	}
	Ok(())
}

async fn execute(handle: &SessionHandle, command: Command) -> anyhow::Result<Option<String>> {
	let reply = match command {
		Command::Edit(text) => {
			handle.edit(text)?;
			None
		}
		Command::Append(text) => {
			let Some(artifact) = handle.export().await? else {
				return Ok(Some("nothing loaded".into()));
			};
			let mut content = artifact.content;
			content.push_str(&text);
			handle.edit(content)?;
			None
		}
		Command::Undo => {
			handle.undo()?;
			None
		}
		Command::Redo => {
			handle.redo()?;
			None
		}
		Command::Save => Some(match handle.manual_save().await? {
			Some(at) => format!("saved {}", at.with_timezone(&Local).format("%H:%M:%S")),
			None => "up to date".to_string(),
		}),
		Command::Show => Some(
			handle
				.export()
				.await?
				.map_or_else(|| "nothing loaded".to_string(), |artifact| artifact.content),
		),
		Command::Status => {
			// Round trip so commands sent earlier are reflected.
			handle.export().await?;
			Some(format_status(&handle.current_status()))
		}
		Command::Help => Some(HELP.to_string()),
		Command::Quit => None,
	};
	Ok(reply)
}
