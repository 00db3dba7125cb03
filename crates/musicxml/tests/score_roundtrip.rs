//! End-to-end tests over a real exported score: parse it, write the bass
//! line, splice it back, and parse the result again.

use std::fs;
use std::path::Path;

use harmony::{write_bass_line, Degree, Inversion, NoteValue};
use musicxml::{parse_score, render_score};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn fixture(name: &str) -> String {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(format!("{}.musicxml", name));
    fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("failed to read fixture {}: {}", name, e))
}

#[test]
fn test_parse_exported_score() {
    let score = parse_score(&fixture("chorale_opening")).expect("fixture should parse");

    assert!(score.key.is_major());
    assert_eq!(score.final_degree, Degree::Tonic);

    let pitches: Vec<i32> = score.soprano.iter().map(|n| n.pitch).collect();
    assert_eq!(pitches, vec![48, 50, 52]);
    let values: Vec<NoteValue> = score.soprano.iter().map(|n| n.value).collect();
    assert_eq!(
        values,
        vec![NoteValue::Half, NoteValue::Quarter, NoteValue::Quarter]
    );

    assert_eq!(score.given_bass.len(), 1);
    assert_eq!(score.given_bass[0].pitch, 36);
    assert_eq!(score.given_bass[0].value, NoteValue::Half);
}

#[test]
fn test_compose_and_splice_roundtrip() {
    let text = fixture("chorale_opening");
    let score = parse_score(&text).expect("fixture should parse");

    let mut rng = StdRng::seed_from_u64(7);
    let harmonization = write_bass_line(
        &score.key,
        &score.soprano,
        &score.given_bass,
        score.final_degree,
        &mut rng,
    )
    .expect("the fixture's soprano line is harmonizable");
    assert_eq!(harmonization.bass_line.len(), 2);
    assert_eq!(
        harmonization.chords.last().unwrap().inversion,
        Inversion::Root
    );

    let out = render_score(&text, &harmonization, score.key.is_major())
        .expect("render should succeed");

    // the rest measure is gone, the surrounding file is intact
    assert!(!out.contains("<rest/>"));
    assert!(out.contains("<work-title>Chorale Opening</work-title>"));
    assert!(out.contains("<measure number=\"2\">"));
    assert!(out.trim_end().ends_with("</score-partwise>"));

    // the composed score parses back with a fully written bass part
    let completed = parse_score(&out).expect("rendered score should parse");
    assert_eq!(completed.soprano, score.soprano);
    assert_eq!(completed.given_bass.len(), 3);
    assert_eq!(completed.given_bass[0], score.given_bass[0]);
    for window in completed.given_bass.windows(2) {
        let leap = (window[1].pitch - window[0].pitch).abs();
        assert!(leap <= 7, "bass leap of {} semitones", leap);
        assert_ne!(leap, 6, "bass tritone leap");
    }
    for note in &completed.given_bass[1..] {
        assert!(
            (34..=48).contains(&note.pitch),
            "bass pitch {} out of range",
            note.pitch
        );
    }

    // soprano and bass cover the same number of ticks
    let ticks = |notes: &[harmony::Note]| -> u32 {
        notes.iter().map(|n| n.value.sixteenths()).sum()
    };
    assert_eq!(ticks(&completed.soprano), ticks(&completed.given_bass));
}
