//! Transcript output tests: files on disk, both formats.

use std::fs;
use std::io::Cursor;

use deal_engine::rules::Engine;
use deal_engine::session::{Outcome, Session};
use deal_engine::transcript::{self, Recorder, Step, StepKind, TranscriptHeader};

fn header() -> TranscriptHeader {
    let stamp = chrono::DateTime::from_timestamp(1_700_000_000, 0).unwrap();
    TranscriptHeader::new(10, 42, stamp)
}

/// Play a scripted game while recording to `path`.
fn play_recorded(path: &std::path::Path, script: &str) -> Outcome {
    let mut engine = Engine::new(10, 42).unwrap();
    let writer = transcript::create(path).unwrap();
    let recorder = Recorder::start(writer, &header()).unwrap();

    let mut session = Session::new(Cursor::new(script.to_string()), Vec::new())
        .with_show_ev(false)
        .with_recorder(Some(recorder));
    let outcome = session.run(&mut engine).unwrap();
    session.finish().unwrap();
    outcome
}

// =============================================================================
// Format Selection
// =============================================================================

#[test]
fn test_extension_selects_format() {
    let dir = tempfile::tempdir().unwrap();
    let state = Engine::new(10, 42).unwrap().start().unwrap();

    for name in ["game.json", "game.csv", "GAME.CSV", "game.txt", "game"] {
        let path = dir.path().join(name);
        let mut recorder = Recorder::start(transcript::create(&path).unwrap(), &header()).unwrap();
        recorder
            .record(Step::snapshot(StepKind::StartRound, 1, &state))
            .unwrap();
        recorder.finish().unwrap();

        let text = fs::read_to_string(&path).unwrap();
        if name.to_ascii_lowercase().ends_with(".csv") {
            assert!(text.starts_with("step,round,action,"), "{}: {}", name, text);
        } else {
            assert!(text.starts_with("{\"config\":"), "{}: {}", name, text);
        }
    }
}

// =============================================================================
// Recorded Games
// =============================================================================

/// A deal in round one records start, open, offer, deal.
#[test]
fn test_json_transcript_of_a_deal() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("deal.json");

    let outcome = play_recorded(&path, "1\n1\n2\ndeal\n");
    let Outcome::Finished { winnings } = outcome else {
        panic!("game did not finish: {:?}", outcome);
    };

    let doc: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(doc["config"]["cases"], 10);
    assert_eq!(doc["config"]["seed"], 42);
    assert_eq!(doc["config"]["timestamp"], "2023-11-14T22:13:20Z");

    let steps = doc["steps"].as_array().unwrap();
    let actions: Vec<_> = steps.iter().map(|s| s["action"].as_str().unwrap()).collect();
    assert_eq!(actions, vec!["start_round", "open_case", "offer", "deal"]);

    for (i, step) in steps.iter().enumerate() {
        assert_eq!(step["step"], i as u64 + 1);
        assert_eq!(step["round"], 1);
    }

    assert_eq!(steps[0]["remainingCases"].as_array().unwrap().len(), 10);
    assert_eq!(steps[1]["openedCaseId"], 2);
    assert_eq!(steps[1]["remainingCases"].as_array().unwrap().len(), 9);
    assert!(steps[2]["offer"].is_i64());
    assert!(steps[2]["ev"].is_f64());
    assert_eq!(steps[3]["accepted"], true);
    assert_eq!(steps[3]["openedPrize"], winnings);
    assert_eq!(steps[3]["offer"], winnings);
}

/// Declines advance the round number; the final reveal is recorded.
#[test]
fn test_csv_transcript_to_final_reveal() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("reveal.csv");

    // Ten cases: pick 10, open 1..=7 in round one, open 8 in round two.
    let script = "10\n7\n1\n2\n3\n4\n5\n6\n7\nn\n1\n8\nn\nn\n";
    let outcome = play_recorded(&path, script);
    assert!(matches!(outcome, Outcome::Finished { .. }));

    let text = fs::read_to_string(&path).unwrap();
    let rows: Vec<_> = text.lines().skip(2).collect();
    let actions: Vec<_> = rows
        .iter()
        .map(|row| row.split(',').nth(2).unwrap().trim_matches('"'))
        .collect();

    assert_eq!(
        actions,
        vec![
            "start_round",
            "open_case",
            "open_case",
            "open_case",
            "open_case",
            "open_case",
            "open_case",
            "open_case",
            "offer",
            "nodeal",
            "start_round",
            "open_case",
            "offer",
            "nodeal",
            "final_result",
        ]
    );

    let rounds: Vec<_> = rows.iter().map(|row| row.split(',').nth(1).unwrap()).collect();
    assert_eq!(rounds[9], "1");
    assert_eq!(rounds[10], "2");
    assert_eq!(rounds[14], "2");

    assert!(text.lines().nth(1).unwrap().starts_with("# config: {\"cases\":10"));
}
