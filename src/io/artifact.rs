//! Portable artifact reader and writer.
//!
//! An artifact is a stream of entity records, one JSON object per line
//! (NDJSON). The codec is deliberately dumb: no header, no compression,
//! no per-record framing beyond the newline.

use crate::models::Entity;
use crate::{Error, Result};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// Writes entity records into an artifact.
pub struct ArtifactWriter<W: Write> {
    writer: W,
    written: u64,
}

impl ArtifactWriter<BufWriter<File>> {
    /// Creates an artifact file at `path`, truncating any existing file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created.
    pub fn create(path: &Path) -> Result<Self> {
        let file = File::create(path).map_err(|e| {
            Error::operation("create_artifact", format!("{}: {}", path.display(), e))
        })?;
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write> ArtifactWriter<W> {
    /// Creates a writer over any sink.
    pub const fn new(writer: W) -> Self {
        Self { writer, written: 0 }
    }

    /// Appends one entity record.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding or writing fails.
    pub fn write(&mut self, entity: &Entity) -> Result<()> {
        serde_json::to_writer(&mut self.writer, entity)
            .map_err(|e| Error::operation("write_artifact", e))?;
        writeln!(self.writer).map_err(|e| Error::operation("write_artifact", e))?;
        self.written += 1;
        Ok(())
    }

    /// Flushes and returns the number of records written.
    ///
    /// # Errors
    ///
    /// Returns an error if the flush fails.
    pub fn finish(mut self) -> Result<u64> {
        self.writer
            .flush()
            .map_err(|e| Error::operation("flush_artifact", e))?;
        Ok(self.written)
    }
}

/// Reads entity records out of an artifact.
///
/// Blank lines are skipped; a malformed line fails the stream with the
/// offending line number in the error.
pub struct ArtifactReader<R: BufRead> {
    reader: R,
    line_number: u64,
}

impl ArtifactReader<BufReader<File>> {
    /// Opens an artifact file for reading.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| {
            Error::operation("open_artifact", format!("{}: {}", path.display(), e))
        })?;
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: BufRead> ArtifactReader<R> {
    /// Creates a reader over any buffered source.
    pub const fn new(reader: R) -> Self {
        Self {
            reader,
            line_number: 0,
        }
    }

    /// Decodes the next record, or `None` at end of stream.
    ///
    /// # Errors
    ///
    /// Returns an error if reading fails or a line is not a valid
    /// entity record.
    pub fn next(&mut self) -> Result<Option<Entity>> {
        let mut line = String::new();
        loop {
            line.clear();
            let bytes_read = self
                .reader
                .read_line(&mut line)
                .map_err(|e| Error::operation("read_artifact", e))?;
            if bytes_read == 0 {
                return Ok(None);
            }
            self.line_number += 1;

            if !line.trim().is_empty() {
                break;
            }
        }

        let entity = serde_json::from_str(line.trim()).map_err(|e| {
            Error::operation(
                "decode_artifact",
                format!("line {}: {}", self.line_number, e),
            )
        })?;
        Ok(Some(entity))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EntityId, EntityKind};
    use serde_json::json;
    use std::io::Cursor;

    fn entity(stamp_ms: i64) -> Entity {
        Entity::new(
            EntityId::random(),
            EntityKind::Pattern,
            stamp_ms,
            json!({"stamp": stamp_ms}),
        )
    }

    #[test]
    fn test_write_then_read() {
        let entities = [entity(1), entity(2), entity(3)];

        let mut buf = Vec::new();
        let mut writer = ArtifactWriter::new(&mut buf);
        for e in &entities {
            writer.write(e).unwrap();
        }
        assert_eq!(writer.finish().unwrap(), 3);

        let mut reader = ArtifactReader::new(Cursor::new(buf));
        for expected in &entities {
            assert_eq!(&reader.next().unwrap().unwrap(), expected);
        }
        assert!(reader.next().unwrap().is_none());
    }

    #[test]
    fn test_read_skips_blank_lines() {
        let e = entity(7);
        let encoded = format!("\n{}\n\n", serde_json::to_string(&e).unwrap());

        let mut reader = ArtifactReader::new(Cursor::new(encoded));
        assert_eq!(reader.next().unwrap().unwrap(), e);
        assert!(reader.next().unwrap().is_none());
    }

    #[test]
    fn test_read_empty_stream() {
        let mut reader = ArtifactReader::new(Cursor::new(""));
        assert!(reader.next().unwrap().is_none());
    }

    #[test]
    fn test_malformed_line_reports_line_number() {
        let e = entity(1);
        let encoded = format!("{}\nnot json\n", serde_json::to_string(&e).unwrap());

        let mut reader = ArtifactReader::new(Cursor::new(encoded));
        reader.next().unwrap();
        let err = reader.next().unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }
}
