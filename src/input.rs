//! Line sources for the prompt loop.
//!
//! A terminal gets a rustyline editor (history, line editing). Anything else,
//! including pipes and tests, reads raw lines from a `BufRead`.

use anyhow::Result;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::io::{BufRead, ErrorKind, Write};
use std::path::PathBuf;

/// What one read produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadLine {
    /// Raw bytes of the line, minus a single trailing `\n`
    Line(Vec<u8>),
    /// Input ended (EOF or Ctrl-D)
    End,
    /// Ctrl-C at the prompt
    Interrupted,
}

/// Something that can show a prompt and hand back one line of input.
pub trait LineSource {
    fn read_line(&mut self, prompt: &str, out: &mut dyn Write) -> Result<ReadLine>;
}

/// Reads lines from any buffered reader, writing the prompt to `out`.
/// Bytes are passed through undecoded.
pub struct ReaderSource<R> {
    reader: R,
}

impl<R: BufRead> ReaderSource<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }
}

impl<R: BufRead> LineSource for ReaderSource<R> {
    fn read_line(&mut self, prompt: &str, out: &mut dyn Write) -> Result<ReadLine> {
        write!(out, "{}", prompt)?;
        out.flush()?;

        let mut buf = Vec::new();
        if self.reader.read_until(b'\n', &mut buf)? == 0 {
            return Ok(ReadLine::End);
        }
        if buf.last() == Some(&b'\n') {
            buf.pop();
        }
        Ok(ReadLine::Line(buf))
    }
}

/// Interactive terminal input with optional persistent history.
pub struct EditorSource {
    editor: DefaultEditor,
    history: Option<PathBuf>,
}

impl EditorSource {
    pub fn new(history: Option<PathBuf>) -> Result<Self> {
        let mut editor = DefaultEditor::new()?;
        if let Some(path) = &history {
            match editor.load_history(path) {
                Ok(()) => {}
                Err(e) if is_missing_file(&e) => {}
                Err(e) => eprintln!("Warning: failed to load history: {}", e),
            }
        }
        Ok(Self { editor, history })
    }

    fn save_history(&mut self) {
        let Some(path) = &self.history else {
            return;
        };
        if let Some(parent) = path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        if let Err(e) = self.editor.save_history(path) {
            eprintln!("Warning: failed to save history: {}", e);
        }
    }
}

impl LineSource for EditorSource {
    fn read_line(&mut self, prompt: &str, out: &mut dyn Write) -> Result<ReadLine> {
        // Messages from the previous attempt must be visible before rustyline
        // takes over the terminal.
        out.flush()?;

        match self.editor.readline(prompt) {
            Ok(line) => {
                if !line.is_empty() {
                    self.editor.add_history_entry(line.as_str())?;
                }
                Ok(ReadLine::Line(line.into_bytes()))
            }
            Err(ReadlineError::Interrupted) => Ok(ReadLine::Interrupted),
            Err(ReadlineError::Eof) => Ok(ReadLine::End),
            Err(e) => Err(e.into()),
        }
    }
}

/// No history file yet, as on the first run.
fn is_missing_file(err: &ReadlineError) -> bool {
    matches!(err, ReadlineError::Io(e) if e.kind() == ErrorKind::NotFound)
}

impl Drop for EditorSource {
    fn drop(&mut self) {
        self.save_history();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn line(s: &str) -> ReadLine {
        ReadLine::Line(s.as_bytes().to_vec())
    }

    #[test]
    fn test_reader_source_strips_one_newline() {
        let mut source = ReaderSource::new(Cursor::new("first\n\nlast"));
        let mut out = Vec::new();

        assert_eq!(source.read_line("> ", &mut out).unwrap(), line("first"));
        assert_eq!(source.read_line("> ", &mut out).unwrap(), line(""));
        assert_eq!(source.read_line("> ", &mut out).unwrap(), line("last"));
        assert_eq!(source.read_line("> ", &mut out).unwrap(), ReadLine::End);
        assert_eq!(String::from_utf8(out).unwrap(), "> > > > ");
    }

    #[test]
    fn test_reader_source_keeps_carriage_return() {
        let mut source = ReaderSource::new(Cursor::new("user@example.com\r\n"));
        let mut out = Vec::new();
        assert_eq!(
            source.read_line("", &mut out).unwrap(),
            line("user@example.com\r")
        );
    }

    #[test]
    fn test_reader_source_passes_raw_bytes() {
        let mut source = ReaderSource::new(Cursor::new(b"ab\xffc\n".to_vec()));
        let mut out = Vec::new();
        assert_eq!(
            source.read_line("", &mut out).unwrap(),
            ReadLine::Line(b"ab\xffc".to_vec())
        );
    }

    #[test]
    fn test_missing_history_file_is_not_an_error() {
        let missing = ReadlineError::Io(std::io::Error::from(ErrorKind::NotFound));
        assert!(is_missing_file(&missing));

        let denied = ReadlineError::Io(std::io::Error::from(ErrorKind::PermissionDenied));
        assert!(!is_missing_file(&denied));
        assert!(!is_missing_file(&ReadlineError::Eof));
    }
}
