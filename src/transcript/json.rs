//! JSON transcripts: `{"config": {...}, "steps": [ ... ]}`.

use std::io::Write;

use super::{Step, TranscriptHeader, TranscriptWriter};
use crate::error::Result;

/// Streams a single JSON document, one step at a time.
#[derive(Debug)]
pub struct JsonTranscriptWriter<W: Write> {
    out: W,
    opened: bool,
    steps: usize,
}

impl<W: Write> JsonTranscriptWriter<W> {
    /// Stream into `out`. Nothing is written until the header or first step.
    pub fn new(out: W) -> Self {
        Self {
            out,
            opened: false,
            steps: 0,
        }
    }

    /// Recover the underlying writer.
    pub fn into_inner(self) -> W {
        self.out
    }

    fn open(&mut self, header: Option<&TranscriptHeader>) -> Result<()> {
        self.out.write_all(b"{\"config\":")?;
        match header {
            Some(h) => serde_json::to_writer(&mut self.out, h)?,
            None => self.out.write_all(b"null")?,
        }
        self.out.write_all(b",\"steps\":[")?;
        self.opened = true;
        Ok(())
    }
}

impl<W: Write> TranscriptWriter for JsonTranscriptWriter<W> {
    fn write_header(&mut self, header: &TranscriptHeader) -> Result<()> {
        if !self.opened {
            self.open(Some(header))?;
        }
        Ok(())
    }

    fn append(&mut self, step: &Step) -> Result<()> {
        if !self.opened {
            self.open(None)?;
        }
        if self.steps > 0 {
            self.out.write_all(b",")?;
        }
        serde_json::to_writer(&mut self.out, step)?;
        self.steps += 1;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        if !self.opened {
            self.open(None)?;
        }
        self.out.write_all(b"]}")?;
        self.out.flush()?;
        Ok(())
    }
}
