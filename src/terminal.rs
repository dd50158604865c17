//! Line-oriented operator console.
//!
//! Reads one command per line (stdin by default) and prints the resulting
//! page as plain text. Plot rendering is left to richer front ends that
//! consume [`PageView`] directly.

use std::fmt::Write as _;

use anyhow::Result;
use tokio::io::{self, AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};

use crate::{
    labels::ClassSet,
    session::{CheckpointOutcome, Event, PageView, SessionHandle, SlotContent},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Session(Event),
    Show,
    Help,
    Quit,
}

pub fn parse_command(line: &str, classes: &ClassSet) -> Result<Command, String> {
    let word = line.trim();
    let command = match word {
        "n" | "next" => Command::Session(Event::AdvancePage),
        "p" | "prev" => Command::Session(Event::RetreatPage),
        "b" | "back" => Command::Session(Event::GoBackOneLabel),
        "f" | "find" => Command::Session(Event::FindFirstUnlabeled),
        "s" | "save" => Command::Session(Event::Save),
        "v" | "view" | "" => Command::Show,
        "?" | "h" | "help" => Command::Help,
        "q" | "quit" | "exit" => Command::Quit,
        other => {
            let mut chars = other.chars();
            match (chars.next(), chars.next()) {
                (Some(key), None) => classes
                    .from_key(key)
                    .map(|class| Command::Session(Event::AssignLabel(class)))
                    .ok_or_else(|| format!("no class bound to '{key}'"))?,
                _ => return Err(format!("unknown command '{other}' (? for help)")),
            }
        }
    };
    Ok(command)
}

pub fn help(classes: &ClassSet) -> String {
    let mut out = String::from(
        "n next page | p previous page | b go back one | f find first unlabeled\n\
         s save | v redraw | q save and quit\n",
    );
    for (index, name) in classes.names().iter().enumerate() {
        let _ = writeln!(out, "{} {name}", index + 1);
    }
    out
}

pub fn render(view: &PageView) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{}  ({}/{} labeled)",
        view.caption, view.labeled, view.total
    );

    for slot in &view.slots {
        let marker = if slot.slot == view.cursor.slot_index { '>' } else { ' ' };
        let detail = match &slot.content {
            SlotContent::Empty => {
                let _ = writeln!(out, "{marker} [{}] -", slot.slot);
                continue;
            }
            SlotContent::Folded { series, range, .. } => match range {
                Some(range) => format!(
                    "{} samples, mag {:.2}..{:.2}",
                    series.band_len(),
                    range.end,
                    range.start
                ),
                None => "no samples".to_string(),
            },
            SlotContent::Unavailable { reason } => format!("unavailable: {reason}"),
        };
        let _ = writeln!(out, "{marker} [{}] {}  | {detail}", slot.slot, slot.title);
    }
    out
}

fn describe_checkpoint(outcome: &CheckpointOutcome) -> String {
    match outcome {
        CheckpointOutcome::Saved { location } => format!("saved labels to {location}\n"),
        CheckpointOutcome::Failed { reason } => {
            format!("WARNING: labels NOT saved ({reason}); progress is kept in memory\n")
        }
    }
}

/// Drive the session from stdin until `quit` or end of input, then save.
pub async fn run_console(session: &SessionHandle, classes: &ClassSet) -> Result<()> {
    drive_console(session, classes, BufReader::new(io::stdin()), io::stdout()).await
}

/// Feed commands from `input` to the session and echo pages to `output`.
///
/// The session is closed with a final save however the loop ends, including
/// a read or write error; that error is returned after the save.
pub async fn drive_console<R, W>(
    session: &SessionHandle,
    classes: &ClassSet,
    input: R,
    mut output: W,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let interaction = interact(session, classes, input, &mut output).await;
    let closed = session.close().await;
    interaction?;

    output
        .write_all(describe_checkpoint(&closed?).as_bytes())
        .await?;
    output.flush().await?;
    Ok(())
}

async fn interact<R, W>(
    session: &SessionHandle,
    classes: &ClassSet,
    input: R,
    output: &mut W,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();

    output.write_all(help(classes).as_bytes()).await?;
    output.write_all(render(&session.view().await?).as_bytes()).await?;
    output.flush().await?;

    while let Some(line) = lines.next_line().await? {
        let text = match parse_command(&line, classes) {
            Ok(Command::Quit) => break,
            Ok(Command::Help) => help(classes),
            Ok(Command::Show) => render(&session.view().await?),
            Ok(Command::Session(event)) => {
                let update = session.dispatch(event).await?;
                let mut text = render(&update.view);
                if let Some(outcome) = &update.checkpoint {
                    text.push_str(&describe_checkpoint(outcome));
                }
                text
            }
            Err(message) => format!("{message}\n"),
        };
        output.write_all(text.as_bytes()).await?;
        output.flush().await?;
    }
    Ok(())
}
