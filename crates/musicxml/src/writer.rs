//! Splices a completed bass line back into the score it came from.
//!
//! The bass part's rest measures are replaced wholesale: everything from the
//! measure holding the first rest up to the part's closing tag is dropped and
//! the composed measures take its place. The rest of the file passes through
//! byte for byte, so the output stays whatever flavor of MusicXML the input
//! was.

use harmony::{Chord, Degree, Harmonization, Inversion, Note};
use tracing::debug;

use crate::parser::{enclosed, find_from, quoted, strip};
use crate::ScoreError;

fn element(name: &str, text: impl std::fmt::Display) -> String {
    format!("<{name}>{text}</{name}>")
}

/// Harmony annotation for one committed chord, placed under the staff.
///
/// The secondary dominant gets its numeral twice, which notation editors
/// render stacked as V of V.
fn push_harmony(lines: &mut Vec<String>, chord: &Chord, major: bool) {
    let numeral = chord.degree.numeral(major);
    lines.push("<harmony placement=\"below\">".to_string());
    lines.push(element("function", numeral));
    if chord.degree == Degree::SecondaryDominant {
        lines.push(element("function", numeral));
    }

    let seventh = chord.inversion == Inversion::Third;
    let kind = if seventh && chord.degree == Degree::Dominant {
        "dominant".to_string()
    } else {
        let base = if numeral.starts_with(char::is_lowercase) {
            "minor"
        } else {
            "major"
        };
        if seventh {
            format!("{base}-seventh")
        } else {
            base.to_string()
        }
    };
    lines.push(element("kind", kind));
    lines.push(element("inversion", chord.inversion.index()));
    lines.push(element("staff", 1));
    lines.push("</harmony>".to_string());
}

fn push_note(lines: &mut Vec<String>, note: &Note) {
    lines.push("<note>".to_string());
    lines.push("<pitch>".to_string());
    lines.push(element("step", note.spelling.letter.as_char()));
    if note.spelling.alter != 0 {
        lines.push(element("alter", note.spelling.alter));
    }
    // The spelled pitch class is what's left after the octaves; Bb2 is
    // (34 - 10) / 12, not (34 - 11) / 12.
    let octave = (note.pitch - note.spelling.semitone()) / 12;
    lines.push(element("octave", octave));
    lines.push("</pitch>".to_string());
    lines.push(element("duration", 1));
    lines.push(element("voice", 1));
    lines.push(element("type", note.value.name()));
    lines.push(element("staff", 1));
    lines.push("</note>".to_string());
}

/// Lay the composed line out into numbered measures. A measure closes only
/// when the note values land exactly on the barline; the caller's score is
/// expected to keep them aligned.
fn composed_measures(
    harmonization: &Harmonization,
    major: bool,
    measure_ticks: u32,
    first_measure: u32,
) -> Vec<String> {
    let mut lines = Vec::new();
    let mut measure = first_measure;
    let mut ticks = 0;
    for (chord, note) in harmonization.chords.iter().zip(&harmonization.bass_line) {
        if ticks == measure_ticks {
            lines.push("</measure>".to_string());
            ticks = 0;
            measure += 1;
        }
        if ticks == 0 {
            lines.push(format!("<measure number=\"{measure}\">"));
        }
        push_harmony(&mut lines, chord, major);
        push_note(&mut lines, note);
        ticks += note.value.sixteenths();
    }
    lines.push("</measure>".to_string());
    lines
}

/// Replace the bass part's rest measures with the composed line.
///
/// An empty harmonization means the given bass already covered the whole
/// soprano; the score comes back unchanged.
pub fn render_score(
    original: &str,
    harmonization: &Harmonization,
    major: bool,
) -> Result<String, ScoreError> {
    if harmonization.bass_line.is_empty() {
        return Ok(original.to_string());
    }

    let original_lines: Vec<&str> = original.lines().collect();
    let lines: Vec<String> = original_lines.iter().map(|line| strip(line)).collect();

    let beats_line = find_from(&lines, 0, "<beats>").ok_or(ScoreError::MissingBeats)?;
    let beats: u32 = enclosed(&lines[beats_line])
        .and_then(|text| text.parse().ok())
        .ok_or(ScoreError::MissingBeats)?;
    let measure_ticks = beats * 4;

    let rest_idx = lines
        .iter()
        .position(|line| line == "<rest/>")
        .ok_or(ScoreError::NoRestMeasures)?;
    let measure_idx = lines[..rest_idx]
        .iter()
        .rposition(|line| line.contains("measurenumber"))
        .ok_or(ScoreError::MissingMeasureNumber)?;
    let first_measure: u32 = quoted(&lines[measure_idx])
        .and_then(|text| text.parse().ok())
        .ok_or(ScoreError::MissingMeasureNumber)?;
    let part_close =
        find_from(&lines, rest_idx + 1, "</part>").ok_or(ScoreError::TruncatedScore)?;

    let composed = composed_measures(harmonization, major, measure_ticks, first_measure);
    debug!(
        notes = harmonization.bass_line.len(),
        from_measure = first_measure,
        "spliced composed bass line"
    );

    let mut out = Vec::with_capacity(original_lines.len() + composed.len());
    out.extend(original_lines[..measure_idx].iter().map(|l| l.to_string()));
    out.extend(composed);
    out.extend(original_lines[part_close..].iter().map(|l| l.to_string()));
    Ok(out.join("\n") + "\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use harmony::{Key, KeyQuality, Letter, NoteValue, Spelling};
    use pretty_assertions::assert_eq;

    const SKETCH: &str = "<score-partwise>\n\
        <beats>2</beats>\n\
        <part id=\"P2\">\n\
        <measure number=\"3\">\n\
        <note>\n\
        <rest/>\n\
        <duration>4</duration>\n\
        </note>\n\
        </measure>\n\
        </part>\n\
        </score-partwise>";

    fn c_major() -> Key {
        Key::new(KeyQuality::Major, Spelling::natural(Letter::C))
    }

    fn harmonized(chords: Vec<Chord>, notes: Vec<Note>) -> Harmonization {
        Harmonization {
            bass_line: notes,
            chords,
        }
    }

    #[test]
    fn test_render_replaces_rest_measures() {
        let key = c_major();
        let harmonization = harmonized(
            vec![
                key.chord(Degree::Dominant).clone(),
                key.chord(Degree::Tonic).clone(),
            ],
            vec![
                Note::new(Spelling::natural(Letter::G), 43, NoteValue::Quarter),
                Note::new(Spelling::natural(Letter::C), 36, NoteValue::Quarter),
            ],
        );
        let out = render_score(SKETCH, &harmonization, true).unwrap();

        assert!(!out.contains("<rest/>"));
        assert!(out.contains("<measure number=\"3\">"));
        assert!(out.contains("<function>V</function>"));
        assert!(out.contains("<function>I</function>"));
        assert!(out.contains("<step>G</step>"));
        assert!(out.contains("<octave>2</octave>"));
        assert!(out.contains("<octave>3</octave>"));
        assert!(out.ends_with("</part>\n</score-partwise>\n"));
        // two quarters fill the 2/4 measure exactly
        assert_eq!(out.matches("<measure number=").count(), 1);
        assert_eq!(out.matches("</measure>").count(), 1);
    }

    #[test]
    fn test_render_breaks_measures_on_the_barline() {
        let key = c_major();
        let chord = key.chord(Degree::Tonic).clone();
        let note = Note::new(Spelling::natural(Letter::C), 36, NoteValue::Half);
        let harmonization = harmonized(vec![chord.clone(), chord], vec![note, note]);
        let out = render_score(SKETCH, &harmonization, true).unwrap();

        // each half note fills a whole 2/4 measure
        assert!(out.contains("<measure number=\"3\">"));
        assert!(out.contains("<measure number=\"4\">"));
        assert_eq!(out.matches("</measure>").count(), 2);
    }

    #[test]
    fn test_secondary_dominant_numeral_is_doubled() {
        let key = c_major();
        let harmonization = harmonized(
            vec![key.chord(Degree::SecondaryDominant).clone()],
            vec![Note::new(Spelling::natural(Letter::D), 38, NoteValue::Half)],
        );
        let out = render_score(SKETCH, &harmonization, true).unwrap();
        assert_eq!(out.matches("<function>V</function>").count(), 2);
    }

    #[test]
    fn test_chord_kinds() {
        let key = c_major();
        let half = |letter, pitch| Note::new(Spelling::natural(letter), pitch, NoteValue::Half);

        // V7 with the seventh in the bass is plain "dominant"
        let v7 = key.chord(Degree::Dominant).with_inversion(Inversion::Third);
        let out = render_score(SKETCH, &harmonized(vec![v7], vec![half(Letter::F, 41)]), true)
            .unwrap();
        assert!(out.contains("<kind>dominant</kind>"));
        assert!(out.contains("<inversion>3</inversion>"));

        // ii7 in the same position is "minor-seventh"
        let ii7 = key.chord(Degree::Supertonic).with_inversion(Inversion::Third);
        let out = render_score(SKETCH, &harmonized(vec![ii7], vec![half(Letter::C, 36)]), true)
            .unwrap();
        assert!(out.contains("<kind>minor-seventh</kind>"));

        // triads are plain major or minor by numeral case
        let vi = key.chord(Degree::Submediant).clone();
        let out = render_score(SKETCH, &harmonized(vec![vi], vec![half(Letter::A, 45)]), true)
            .unwrap();
        assert!(out.contains("<kind>minor</kind>"));
    }

    #[test]
    fn test_flat_bass_notes_keep_their_octave() {
        let key = Key::new(KeyQuality::Major, Spelling::new(Letter::B, -1));
        let harmonization = harmonized(
            vec![key.chord(Degree::Tonic).clone()],
            vec![Note::new(Spelling::new(Letter::B, -1), 34, NoteValue::Half)],
        );
        let out = render_score(SKETCH, &harmonization, true).unwrap();
        assert!(out.contains("<step>B</step>"));
        assert!(out.contains("<alter>-1</alter>"));
        assert!(out.contains("<octave>2</octave>"));
    }

    #[test]
    fn test_empty_harmonization_passes_score_through() {
        let harmonization = harmonized(vec![], vec![]);
        let out = render_score(SKETCH, &harmonization, true).unwrap();
        assert_eq!(out, SKETCH);
    }

    #[test]
    fn test_render_errors() {
        let key = c_major();
        let harmonization = harmonized(
            vec![key.chord(Degree::Tonic).clone()],
            vec![Note::new(Spelling::natural(Letter::C), 36, NoteValue::Half)],
        );

        let no_beats = SKETCH.replace("<beats>2</beats>", "");
        assert_eq!(
            render_score(&no_beats, &harmonization, true),
            Err(ScoreError::MissingBeats)
        );

        let no_rests = SKETCH.replace("<rest/>", "");
        assert_eq!(
            render_score(&no_rests, &harmonization, true),
            Err(ScoreError::NoRestMeasures)
        );

        let no_number = SKETCH.replace("<measure number=\"3\">", "<measure>");
        assert_eq!(
            render_score(&no_number, &harmonization, true),
            Err(ScoreError::MissingMeasureNumber)
        );
    }
}
