//! CSV transcripts.
//!
//! One header row, an optional `# config:` comment line, then one row per
//! step. Lists are space-separated inside a single quoted cell; absent values
//! are empty cells.

use std::fmt::Display;
use std::io::Write;

use super::{Step, TranscriptHeader, TranscriptWriter};
use crate::error::Result;

/// Column names, in row order.
pub const CSV_COLUMNS: &str = "step,round,action,openedCaseId,openedPrize,remainingCases,\
remainingAmounts,offer,ev,accepted,counteroffer";

/// Streams CSV rows, writing the column header first.
#[derive(Debug)]
pub struct CsvTranscriptWriter<W: Write> {
    out: W,
    header_written: bool,
}

impl<W: Write> CsvTranscriptWriter<W> {
    /// Stream into `out`.
    pub fn new(out: W) -> Self {
        Self {
            out,
            header_written: false,
        }
    }

    /// Recover the underlying writer.
    pub fn into_inner(self) -> W {
        self.out
    }

    fn columns(&mut self) -> Result<()> {
        if !self.header_written {
            writeln!(self.out, "{}", CSV_COLUMNS)?;
            self.header_written = true;
        }
        Ok(())
    }
}

impl<W: Write> TranscriptWriter for CsvTranscriptWriter<W> {
    fn write_header(&mut self, header: &TranscriptHeader) -> Result<()> {
        if self.header_written {
            return Ok(());
        }
        self.columns()?;
        let config = serde_json::to_string(header)?;
        writeln!(self.out, "# config: {}", config)?;
        Ok(())
    }

    fn append(&mut self, step: &Step) -> Result<()> {
        self.columns()?;
        writeln!(
            self.out,
            "{},{},{},{},{},{},{},{},{},{},{}",
            step.step,
            step.round,
            quote(step.action.as_str()),
            cell(step.opened_case_id.map(|id| id.raw())),
            cell(step.opened_prize),
            quote(&join(step.remaining_cases.iter().map(|id| id.raw()))),
            quote(&join(step.remaining_amounts.iter())),
            cell(step.offer),
            cell(step.ev),
            cell(step.accepted),
            cell(step.counteroffer),
        )?;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.columns()?;
        self.out.flush()?;
        Ok(())
    }
}

fn quote(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

fn cell<T: Display>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn join<T: Display>(values: impl Iterator<Item = T>) -> String {
    values.map(|v| v.to_string()).collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ContainerId, GameState};
    use crate::transcript::StepKind;

    #[test]
    fn test_rows() {
        let state = GameState::initial([100, 200, 500])
            .with_player_container(ContainerId::new(1))
            .with_round_quota(1)
            .with_opened(ContainerId::new(3));

        let mut writer = CsvTranscriptWriter::new(Vec::new());
        writer
            .write_header(&TranscriptHeader::new(
                3,
                7,
                chrono::DateTime::from_timestamp(0, 0).unwrap(),
            ))
            .unwrap();

        let mut open =
            Step::snapshot(StepKind::OpenCase, 1, &state).with_opened(ContainerId::new(3), 500);
        open.step = 1;
        writer.append(&open).unwrap();

        let mut offer = Step::snapshot(StepKind::Offer, 1, &state)
            .with_offer(140, 150.0)
            .with_accepted(false);
        offer.step = 2;
        writer.append(&offer).unwrap();
        writer.finish().unwrap();

        let text = String::from_utf8(writer.into_inner()).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], CSV_COLUMNS);
        assert_eq!(lines[1], "# config: {\"cases\":3,\"seed\":7,\"timestamp\":\"1970-01-01T00:00:00Z\"}");
        assert_eq!(lines[2], "1,1,\"open_case\",3,500,\"1 2\",\"100 200\",,,,");
        assert_eq!(lines[3], "2,1,\"offer\",,,\"1 2\",\"100 200\",140,150,false,");
    }

    #[test]
    fn test_header_row_without_config() {
        let mut writer = CsvTranscriptWriter::new(Vec::new());
        writer.finish().unwrap();
        let text = String::from_utf8(writer.into_inner()).unwrap();
        assert_eq!(text.trim_end(), CSV_COLUMNS);
    }

    #[test]
    fn test_quote_escapes() {
        assert_eq!(quote("a\"b"), "\"a\"\"b\"");
        assert_eq!(quote(""), "\"\"");
    }
}
