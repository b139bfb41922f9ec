use std::fmt::Display;
use std::io::{self, BufRead, BufReader, ErrorKind, Lines, Read, Write};
use tracing::instrument;

/// A line oriented terminal interface.
#[derive(Debug)]
pub struct Io<W: Write, R: Read> {
    writer: W,
    reader: Lines<BufReader<R>>,
}

impl<W: Write, R: Read> Io<W, R> {
    pub fn new(writer: W, reader: R) -> Self {
        Io {
            writer,
            reader: BufReader::new(reader).lines(),
        }
    }

    /// Receive a line, with surrounding whitespace trimmed.
    #[instrument(level = "trace", skip(self), ret, err)]
    pub fn recv(&mut self) -> io::Result<String> {
        let line = self.reader.next().ok_or(ErrorKind::UnexpectedEof)??;
        Ok(line.trim().to_string())
    }

    /// Send a line.
    #[instrument(level = "trace", skip(self, msg), err, fields(%msg))]
    pub fn send<T: Display>(&mut self, msg: T) -> io::Result<()> {
        writeln!(&mut self.writer, "{msg}")
    }

    /// Ask for a line of input.
    #[instrument(level = "trace", skip(self, prompt), ret, err, fields(%prompt))]
    pub fn ask<T: Display>(&mut self, prompt: T) -> io::Result<String> {
        write!(&mut self.writer, "{prompt} > ")?;
        self.writer.flush()?;
        self.recv()
    }
}
