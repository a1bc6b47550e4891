//! Game transcripts for offline analysis.
//!
//! A transcript records one game as a sequence of steps, capturing:
//! - What happened (round start, open, offer, deal, no deal, counter, result)
//! - The containers and amounts still in play afterwards
//! - The offer and EV on the table, where relevant
//!
//! Writers stream steps as they happen. The output format is chosen from the
//! file extension: `.csv` gives CSV, anything else gives JSON.

pub mod csv;
pub mod json;

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::{ContainerId, GameState};
use crate::error::Result;

pub use self::csv::CsvTranscriptWriter;
pub use self::json::JsonTranscriptWriter;

/// What a step records.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    /// A round begins.
    StartRound,
    /// A container was opened.
    OpenCase,
    /// The banker made an offer.
    Offer,
    /// The player took the offer.
    Deal,
    /// The player refused the offer.
    #[serde(rename = "nodeal")]
    NoDeal,
    /// The player proposed a counteroffer and the banker answered.
    #[serde(rename = "counteroffer")]
    CounterOffer,
    /// The player's container was revealed.
    FinalResult,
}

impl StepKind {
    /// Wire name, as written to both formats.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            StepKind::StartRound => "start_round",
            StepKind::OpenCase => "open_case",
            StepKind::Offer => "offer",
            StepKind::Deal => "deal",
            StepKind::NoDeal => "nodeal",
            StepKind::CounterOffer => "counteroffer",
            StepKind::FinalResult => "final_result",
        }
    }
}

impl std::fmt::Display for StepKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single transcript row.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Step {
    /// Monotonic counter, 1-based.
    pub step: u32,

    /// Round number, 1-based.
    pub round: u32,

    /// What happened.
    pub action: StepKind,

    /// Container opened by this step, if any.
    pub opened_case_id: Option<ContainerId>,

    /// Amount revealed by an open, or the final winnings.
    pub opened_prize: Option<i64>,

    /// Unopened container ids after this step, ascending.
    pub remaining_cases: Vec<ContainerId>,

    /// Amounts still in play after this step, ascending.
    pub remaining_amounts: Vec<i64>,

    /// Offer on the table.
    pub offer: Option<i64>,

    /// Expected value of the unopened containers.
    pub ev: Option<f64>,

    /// Whether a deal or counteroffer was accepted.
    pub accepted: Option<bool>,

    /// Amount the player proposed.
    pub counteroffer: Option<i64>,
}

impl Step {
    /// Capture the board of `state`. Optional fields start empty.
    #[must_use]
    pub fn snapshot(kind: StepKind, round: u32, state: &GameState) -> Self {
        let mut remaining_amounts = state.remaining_amounts().into_vec();
        remaining_amounts.sort_unstable();

        Self {
            step: 0,
            round,
            action: kind,
            opened_case_id: None,
            opened_prize: None,
            remaining_cases: state.remaining_ids().into_vec(),
            remaining_amounts,
            offer: None,
            ev: None,
            accepted: None,
            counteroffer: None,
        }
    }

    /// Record an opened container and its amount.
    #[must_use]
    pub fn with_opened(mut self, id: ContainerId, prize: i64) -> Self {
        self.opened_case_id = Some(id);
        self.opened_prize = Some(prize);
        self
    }

    /// Record winnings without an opened container.
    #[must_use]
    pub fn with_prize(mut self, prize: Option<i64>) -> Self {
        self.opened_prize = prize;
        self
    }

    /// Record the offer on the table and the EV it was priced against.
    #[must_use]
    pub fn with_offer(mut self, offer: i64, ev: f64) -> Self {
        self.offer = Some(offer);
        self.ev = Some(ev);
        self
    }

    /// Record whether the deal or counteroffer went through.
    #[must_use]
    pub fn with_accepted(mut self, accepted: bool) -> Self {
        self.accepted = Some(accepted);
        self
    }

    /// Record a proposed counteroffer.
    #[must_use]
    pub fn with_counteroffer(mut self, amount: i64) -> Self {
        self.counteroffer = Some(amount);
        self
    }
}

/// Game configuration written ahead of the steps.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptHeader {
    /// Containers in play.
    pub cases: usize,
    /// Seed the game was dealt from.
    pub seed: u64,
    /// When the game started, as an ISO-8601 UTC instant.
    pub timestamp: DateTime<Utc>,
}

impl TranscriptHeader {
    /// Header for a game of `cases` containers dealt from `seed`.
    #[must_use]
    pub fn new(cases: usize, seed: u64, timestamp: DateTime<Utc>) -> Self {
        Self {
            cases,
            seed,
            timestamp,
        }
    }

    /// Header stamped with the current time.
    #[must_use]
    pub fn now(cases: usize, seed: u64) -> Self {
        Self::new(cases, seed, Utc::now())
    }
}

/// Streaming transcript sink.
pub trait TranscriptWriter {
    /// Write the configuration preface. Call at most once, before any step.
    fn write_header(&mut self, header: &TranscriptHeader) -> Result<()>;

    /// Append one step.
    fn append(&mut self, step: &Step) -> Result<()>;

    /// Close the document and flush.
    fn finish(&mut self) -> Result<()>;
}

impl<T: TranscriptWriter + ?Sized> TranscriptWriter for Box<T> {
    fn write_header(&mut self, header: &TranscriptHeader) -> Result<()> {
        (**self).write_header(header)
    }

    fn append(&mut self, step: &Step) -> Result<()> {
        (**self).append(step)
    }

    fn finish(&mut self) -> Result<()> {
        (**self).finish()
    }
}

/// Open a transcript file, picking the format from its extension.
pub fn create(path: impl AsRef<Path>) -> Result<Box<dyn TranscriptWriter>> {
    let path = path.as_ref();
    let out = BufWriter::new(File::create(path)?);

    let is_csv = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));

    if is_csv {
        Ok(Box::new(CsvTranscriptWriter::new(out)))
    } else {
        Ok(Box::new(JsonTranscriptWriter::new(out)))
    }
}

/// Numbers steps and forwards them to a writer.
pub struct Recorder<W> {
    writer: W,
    steps: u32,
}

impl<W: TranscriptWriter> Recorder<W> {
    /// Wrap a writer and emit its header.
    pub fn start(mut writer: W, header: &TranscriptHeader) -> Result<Self> {
        writer.write_header(header)?;
        Ok(Self { writer, steps: 0 })
    }

    /// Assign the next step number and append.
    pub fn record(&mut self, mut step: Step) -> Result<()> {
        self.steps += 1;
        step.step = self.steps;
        self.writer.append(&step)
    }

    /// Steps recorded so far.
    #[must_use]
    pub fn len(&self) -> u32 {
        self.steps
    }

    /// True until the first step is recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps == 0
    }

    /// Close the transcript and return the writer.
    pub fn finish(mut self) -> Result<W> {
        self.writer.finish()?;
        Ok(self.writer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board() -> GameState {
        GameState::initial([500, 100, 5_000, 200, 1_000])
            .with_player_container(ContainerId::new(1))
            .with_round_quota(1)
            .with_opened(ContainerId::new(3))
    }

    #[test]
    fn test_snapshot_sorts_amounts() {
        let step = Step::snapshot(StepKind::OpenCase, 1, &board())
            .with_opened(ContainerId::new(3), 5_000);

        assert_eq!(
            step.remaining_cases,
            vec![
                ContainerId::new(1),
                ContainerId::new(2),
                ContainerId::new(4),
                ContainerId::new(5)
            ]
        );
        assert_eq!(step.remaining_amounts, vec![100, 200, 500, 1_000]);
        assert_eq!(step.opened_prize, Some(5_000));
        assert_eq!(step.offer, None);
    }

    #[test]
    fn test_step_kind_wire_names() {
        for kind in [
            StepKind::StartRound,
            StepKind::OpenCase,
            StepKind::Offer,
            StepKind::Deal,
            StepKind::NoDeal,
            StepKind::CounterOffer,
            StepKind::FinalResult,
        ] {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.as_str()));
        }
    }

    #[test]
    fn test_step_json_field_names() {
        let step = Step::snapshot(StepKind::Offer, 2, &board()).with_offer(430, 450.0);
        let value = serde_json::to_value(&step).unwrap();

        assert_eq!(value["action"], "offer");
        assert_eq!(value["remainingCases"], serde_json::json!([1, 2, 4, 5]));
        assert_eq!(value["offer"], 430);
        assert!(value["openedCaseId"].is_null());
        assert!(value["counteroffer"].is_null());
    }

    #[test]
    fn test_recorder_numbers_steps() {
        let header = TranscriptHeader::new(5, 1, DateTime::<Utc>::UNIX_EPOCH);
        let mut recorder = Recorder::start(JsonTranscriptWriter::new(Vec::new()), &header).unwrap();
        assert!(recorder.is_empty());

        recorder.record(Step::snapshot(StepKind::StartRound, 1, &board())).unwrap();
        recorder.record(Step::snapshot(StepKind::Offer, 1, &board())).unwrap();
        assert_eq!(recorder.len(), 2);

        let bytes = recorder.finish().unwrap().into_inner();
        let doc: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(doc["steps"][0]["step"], 1);
        assert_eq!(doc["steps"][1]["step"], 2);
    }

    #[test]
    fn test_header_timestamp_is_iso_8601() {
        let stamp = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        let value = serde_json::to_value(TranscriptHeader::new(10, 42, stamp)).unwrap();
        assert_eq!(value["timestamp"], "2023-11-14T22:13:20Z");

        let back: TranscriptHeader = serde_json::from_value(value).unwrap();
        assert_eq!(back.timestamp, stamp);

        let now = serde_json::to_value(TranscriptHeader::now(10, 42)).unwrap();
        let text = now["timestamp"].as_str().unwrap();
        assert!(text.ends_with('Z'), "{}", text);
        assert!(text.parse::<DateTime<Utc>>().is_ok());
    }
}
