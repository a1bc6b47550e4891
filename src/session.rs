//! Interactive text session over an [`Engine`].
//!
//! Reads commands line by line and prints the board after every change.
//! Input and output are generic so a session can be driven from a terminal
//! or from an in-memory script.
//!
//! ## Commands
//!
//! At an offer:
//! - `d` / `deal`: accept
//! - `n` / `nodeal` / `no deal`: decline and continue
//! - `c <amount>`: counteroffer (`_` and `,` separators allowed)
//! - `help`
//!
//! Invalid input re-prompts. Every prompt gives up after
//! [`MAX_ATTEMPTS`] bad answers in a row. Engine errors re-prompt only when
//! [`GameError::is_retryable`]; anything else ends the session with that
//! error.

use std::io::{BufRead, Write};

use tracing::debug;

use crate::core::{ContainerId, GameState, Phase, MAX_CASES, MIN_CASES};
use crate::error::{GameError, Result};
use crate::policy::{OfferPolicy, PrizeLadder, RoundPolicy};
use crate::rules::Engine;
use crate::transcript::{Recorder, Step, StepKind, TranscriptWriter};

/// Bad answers accepted per prompt before the session gives up.
pub const MAX_ATTEMPTS: usize = 100;

/// How a session ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// The game reached its result.
    Finished { winnings: i64 },
    /// Input ran out (or never answered sensibly) before the game ended.
    NoInput,
}

/// A player's reply to a banker offer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    /// Take the offer.
    Deal,
    /// Refuse the offer and keep playing.
    NoDeal,
    /// Propose an amount. `None` when the amount is missing or unparsable.
    Counter(Option<i64>),
    /// List the commands.
    Help,
    /// Anything else.
    Unknown,
}

impl Command {
    /// Parse one input line.
    #[must_use]
    pub fn parse(line: &str) -> Self {
        let lower = line.trim().to_ascii_lowercase();
        match lower.as_str() {
            "d" | "deal" => Command::Deal,
            "n" | "nodeal" | "no deal" => Command::NoDeal,
            "help" | "h" | "?" => Command::Help,
            s if s.starts_with('c') => Command::Counter(parse_counter(s)),
            _ => Command::Unknown,
        }
    }
}

fn parse_counter(line: &str) -> Option<i64> {
    let amount = line.split_whitespace().nth(1)?;
    let digits: String = amount.chars().filter(|c| *c != '_' && *c != ',').collect();
    digits.parse().ok()
}

/// Format whole currency units as `$1,234`.
#[must_use]
pub fn format_usd(amount: i64) -> String {
    let digits = amount.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if amount < 0 {
        format!("-${}", grouped)
    } else {
        format!("${}", grouped)
    }
}

/// One interactive game.
pub struct Session<In, Out> {
    input: In,
    output: Out,
    show_ev: bool,
    recorder: Option<Recorder<Box<dyn TranscriptWriter>>>,
}

impl<In: BufRead, Out: Write> Session<In, Out> {
    /// Read from `input` and print to `output`, with the EV line shown.
    pub fn new(input: In, output: Out) -> Self {
        Self {
            input,
            output,
            show_ev: true,
            recorder: None,
        }
    }

    /// Show or hide the EV advisor line under each offer.
    #[must_use]
    pub fn with_show_ev(mut self, show_ev: bool) -> Self {
        self.show_ev = show_ev;
        self
    }

    /// Record every step to a transcript.
    #[must_use]
    pub fn with_recorder(mut self, recorder: Option<Recorder<Box<dyn TranscriptWriter>>>) -> Self {
        self.recorder = recorder;
        self
    }

    /// Close the transcript, if any, and return the output sink.
    pub fn finish(self) -> Result<Out> {
        if let Some(recorder) = self.recorder {
            recorder.finish()?;
        }
        Ok(self.output)
    }

    /// Ask for a case count in `MIN_CASES..=MAX_CASES`. `None` when input
    /// runs out.
    pub fn ask_case_count(&mut self) -> Result<Option<usize>> {
        let prompt = format!("Enter total number of cases ({}..{}): ", MIN_CASES, MAX_CASES);
        for _ in 0..MAX_ATTEMPTS {
            let Some(count) = self.ask_int(&prompt)? else {
                return Ok(None);
            };
            let count = count as usize;
            if (MIN_CASES..=MAX_CASES).contains(&count) {
                return Ok(Some(count));
            }
            writeln!(
                self.output,
                "Please enter a number between {} and {}.",
                MIN_CASES, MAX_CASES
            )?;
        }
        Ok(None)
    }

    /// Deal a game and play it to the end.
    pub fn run<L, R, O>(&mut self, engine: &mut Engine<L, R, O>) -> Result<Outcome>
    where
        L: PrizeLadder,
        R: RoundPolicy,
        O: OfferPolicy,
    {
        let mut state = engine.start()?;

        writeln!(self.output, "Welcome to Deal or No Deal")?;
        writeln!(self.output, "Cases: {}", state.case_count())?;
        self.print_board(&state)?;

        let prompt = format!("Pick your case id (1..{}): ", state.case_count());
        while state.phase() == Phase::PickCase {
            let Some(id) = self.ask_int(&prompt)? else {
                return Ok(Outcome::NoInput);
            };
            match engine.pick_player_case(&state, ContainerId::new(id)) {
                Ok(next) => state = next,
                Err(e) => self.retry(e)?,
            }
        }
        writeln!(
            self.output,
            "You picked case {}.",
            state.player_container().map_or_else(String::new, |id| id.to_string())
        )?;

        loop {
            match state.phase() {
                Phase::FinalReveal => return self.final_reveal(engine, &state),
                Phase::Result => {
                    return Ok(Outcome::Finished {
                        winnings: state.result().unwrap_or(0),
                    })
                }
                Phase::Round => {}
                phase => {
                    return Err(GameError::IllegalState(format!(
                        "session cannot continue from {}",
                        phase
                    )))
                }
            }

            let Some(next) = self.play_round(engine, &state)? else {
                return Ok(Outcome::NoInput);
            };
            state = next;
        }
    }

    // === Rounds ===

    /// Choose, open, hear the offer, decide. `None` when input runs out.
    fn play_round<L, R, O>(
        &mut self,
        engine: &Engine<L, R, O>,
        start: &GameState,
    ) -> Result<Option<GameState>>
    where
        L: PrizeLadder,
        R: RoundPolicy,
        O: OfferPolicy,
    {
        let round = start.round_index() + 1;
        writeln!(self.output)?;
        writeln!(self.output, "=== Round {} ===", round)?;
        self.print_board(start)?;
        self.record(Step::snapshot(StepKind::StartRound, round, start))?;

        let mut state = start.clone();
        while state.round_quota().is_none() {
            let Some(k) = self.ask_int("How many cases to open this round? ")? else {
                return Ok(None);
            };
            match engine.choose_to_open(&state, k as usize) {
                Ok(next) => state = next,
                Err(e) => self.retry(e)?,
            }
        }

        while state.to_open_this_round() > 0 {
            let Some(raw) = self.ask_int("Open which case id? ")? else {
                return Ok(None);
            };
            let id = ContainerId::new(raw);
            match engine.open_case(&state, id) {
                Ok(next) => state = next,
                Err(e) => {
                    self.retry(e)?;
                    continue;
                }
            }
            let prize = state.amount_of(id).unwrap_or(0);
            writeln!(self.output, "Opened case {} -> {}", id, format_usd(prize))?;
            self.print_amounts(&state)?;
            self.record(Step::snapshot(StepKind::OpenCase, round, &state).with_opened(id, prize))?;
        }

        state = engine.compute_offer(&state)?;
        let offer = state.current_offer().unwrap_or(0);
        let ev = state.expected_value().unwrap_or(0.0);
        self.print_offer(offer, ev)?;
        self.record(Step::snapshot(StepKind::Offer, round, &state).with_offer(offer, ev))?;

        self.decide(engine, &state, round, offer, ev)
    }

    fn decide<L, R, O>(
        &mut self,
        engine: &Engine<L, R, O>,
        state: &GameState,
        round: u32,
        offer: i64,
        ev: f64,
    ) -> Result<Option<GameState>>
    where
        L: PrizeLadder,
        R: RoundPolicy,
        O: OfferPolicy,
    {
        for _ in 0..MAX_ATTEMPTS {
            write!(self.output, "> ")?;
            self.output.flush()?;
            let Some(line) = self.read_line()? else {
                return Ok(None);
            };

            match Command::parse(&line) {
                Command::Deal => {
                    let done = engine.accept_deal(state)?;
                    let winnings = done.result().unwrap_or(offer);
                    self.record(
                        Step::snapshot(StepKind::Deal, round, &done)
                            .with_prize(done.result())
                            .with_offer(offer, ev)
                            .with_accepted(true),
                    )?;
                    writeln!(self.output, "DEAL! You took {}", format_usd(winnings))?;
                    return Ok(Some(done));
                }
                Command::NoDeal => {
                    let next = engine.decline_deal(state)?;
                    self.record(
                        Step::snapshot(StepKind::NoDeal, round, &next)
                            .with_offer(offer, ev)
                            .with_accepted(false),
                    )?;
                    return Ok(Some(next));
                }
                Command::Counter(Some(amount)) if amount > 0 => {
                    let next = match engine
                        .propose_counter(state, amount)
                        .and_then(|countered| engine.resolve_counter(&countered))
                    {
                        Ok(next) => next,
                        Err(e) => {
                            self.retry(e)?;
                            continue;
                        }
                    };
                    self.record(
                        Step::snapshot(StepKind::CounterOffer, round, &next)
                            .with_offer(offer, ev)
                            .with_counteroffer(amount),
                    )?;
                    match next.phase() {
                        Phase::Result => writeln!(
                            self.output,
                            "Counter accepted! You win {}",
                            format_usd(next.result().unwrap_or(amount))
                        )?,
                        Phase::FinalReveal => writeln!(
                            self.output,
                            "Counter rejected. Proceeding to final reveal..."
                        )?,
                        _ => writeln!(self.output, "Counter rejected. Next round...")?,
                    }
                    return Ok(Some(next));
                }
                Command::Counter(_) => {
                    writeln!(self.output, "Usage: c <amount>  (example: c 75000)")?;
                }
                Command::Help => self.print_help()?,
                Command::Unknown => {
                    writeln!(self.output, "Unknown command. Type 'help' for options.")?;
                }
            }
        }
        Ok(None)
    }

    fn final_reveal<L, R, O>(
        &mut self,
        engine: &Engine<L, R, O>,
        state: &GameState,
    ) -> Result<Outcome>
    where
        L: PrizeLadder,
        R: RoundPolicy,
        O: OfferPolicy,
    {
        writeln!(self.output)?;
        writeln!(self.output, "=== Final Reveal ===")?;
        self.print_board(state)?;

        let Some(swap) = self.ask_yes_no("Swap your case with the last unopened one? [y/n]: ")?
        else {
            return Ok(Outcome::NoInput);
        };

        let done = engine.reveal_final(state, swap)?;
        let winnings = done.result().unwrap_or(0);
        self.record(
            Step::snapshot(StepKind::FinalResult, state.round_index() + 1, &done)
                .with_prize(done.result()),
        )?;
        writeln!(self.output, "Result: {}", format_usd(winnings))?;
        Ok(Outcome::Finished { winnings })
    }

    // === Output ===

    fn print_board(&mut self, state: &GameState) -> Result<()> {
        writeln!(
            self.output,
            "Remaining unopened cases (incl. your case): {}",
            state.unopened_count()
        )?;
        self.print_amounts(state)
    }

    fn print_amounts(&mut self, state: &GameState) -> Result<()> {
        let mut amounts = state.remaining_amounts();
        amounts.sort_unstable();
        let amounts: Vec<_> = amounts.iter().map(|&a| format_usd(a)).collect();
        let ids: Vec<_> = state.remaining_ids().iter().map(|id| id.raw().to_string()).collect();

        writeln!(self.output, "Remaining amounts: [{}]", amounts.join(", "))?;
        writeln!(self.output, "Unopened case IDs: [{}]", ids.join(", "))?;
        Ok(())
    }

    fn print_offer(&mut self, offer: i64, ev: f64) -> Result<()> {
        writeln!(self.output, "Banker offers: {}", format_usd(offer))?;
        if self.show_ev {
            let ratio = if ev > 0.0 { offer as f64 / ev } else { 0.0 };
            writeln!(
                self.output,
                "Advisor: EV ~ {} | Offer/EV ~ {:.2}",
                format_usd(ev.round() as i64),
                ratio
            )?;
        }
        writeln!(
            self.output,
            "Choose: [d] Deal  |  [n] No Deal  |  [c <amount>] Counteroffer  |  [help]"
        )?;
        Ok(())
    }

    fn print_help(&mut self) -> Result<()> {
        writeln!(self.output, "Commands:")?;
        writeln!(self.output, "  d / deal      accept the current offer")?;
        writeln!(self.output, "  n / nodeal    decline the offer and continue")?;
        writeln!(self.output, "  c <amount>    counteroffer the banker")?;
        Ok(())
    }

    /// Show a rejected answer so the prompt can repeat. Errors the player
    /// cannot fix by answering again are returned instead.
    fn retry(&mut self, error: GameError) -> Result<()> {
        if !error.is_retryable() {
            return Err(error);
        }
        debug!(%error, "rejected input");
        writeln!(self.output, "Error: {}", error)?;
        Ok(())
    }

    fn record(&mut self, step: Step) -> Result<()> {
        match self.recorder.as_mut() {
            Some(recorder) => recorder.record(step),
            None => Ok(()),
        }
    }

    // === Input ===

    fn read_line(&mut self) -> Result<Option<String>> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    fn ask_int(&mut self, prompt: &str) -> Result<Option<u32>> {
        for _ in 0..MAX_ATTEMPTS {
            write!(self.output, "{}", prompt)?;
            self.output.flush()?;
            let Some(line) = self.read_line()? else {
                return Ok(None);
            };
            match line.parse() {
                Ok(value) => return Ok(Some(value)),
                Err(_) => writeln!(self.output, "Please enter a valid whole number.")?,
            }
        }
        Ok(None)
    }

    fn ask_yes_no(&mut self, prompt: &str) -> Result<Option<bool>> {
        for _ in 0..MAX_ATTEMPTS {
            write!(self.output, "{}", prompt)?;
            self.output.flush()?;
            let Some(line) = self.read_line()? else {
                return Ok(None);
            };
            match line.to_ascii_lowercase().chars().next() {
                Some('y') => return Ok(Some(true)),
                Some('n') => return Ok(Some(false)),
                _ => writeln!(self.output, "Please answer y/n.")?,
            }
        }
        Ok(None)
    }
}
