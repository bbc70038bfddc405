use std::io::{self, BufRead, Write};

use tokio::sync::mpsc;

use crate::input::{Key, UiEvent};

/// Draws transcript appends onto a terminal.
///
/// The transcript may end mid-line (server-labelled lines carry no
/// terminator), but the terminal cursor must sit on a fresh line for the
/// user to type. The view prints the break early and swallows the matching
/// separator when the next line arrives.
pub struct TerminalView<W> {
    out: W,
    owes_break: bool,
}

impl<W: Write> TerminalView<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            owes_break: false,
        }
    }

    pub fn draw(&mut self, appended: &str) -> io::Result<()> {
        let mut text = appended;
        if self.owes_break {
            if let Some(rest) = text.strip_prefix('\n') {
                text = rest;
            }
            if text.is_empty() {
                return Ok(());
            }
            self.owes_break = false;
        }
        if text.is_empty() {
            return Ok(());
        }

        self.out.write_all(text.as_bytes())?;
        if !text.ends_with('\n') {
            self.out.write_all(b"\n")?;
            self.owes_break = true;
        }
        self.out.flush()
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

/// Each input line is the user typing the text, then releasing Enter.
pub fn line_events(line: String) -> [UiEvent; 2] {
    [UiEvent::SetInput(line), UiEvent::KeyUp(Key::Enter)]
}

/// Read lines on a blocking thread and forward them as UI events.
///
/// The channel closes when the reader hits EOF or an error.
pub fn spawn_line_reader<R>(reader: R) -> mpsc::Receiver<UiEvent>
where
    R: BufRead + Send + 'static,
{
    let (tx, rx) = mpsc::channel::<UiEvent>(64);
    std::thread::spawn(move || {
        for line in reader.lines() {
            let Ok(line) = line else {
                break;
            };
            for event in line_events(line) {
                if tx.blocking_send(event).is_err() {
                    return;
                }
            }
        }
    });
    rx
}

/// [`spawn_line_reader`] over the process's stdin.
pub fn spawn_stdin_reader() -> mpsc::Receiver<UiEvent> {
    spawn_line_reader(io::BufReader::new(io::stdin()))
}
