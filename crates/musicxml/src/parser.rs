//! Reader for the MusicXML subset the tool understands.
//!
//! Notation editors export the same structure with wildly different
//! indentation, so every line is stripped of whitespace before scanning.
//! Elements of interest sit one per line and are located by substring; the
//! small grammars inside an element (key names, numerals) go through winnow.

use winnow::combinator::{alt, opt};
use winnow::prelude::*;
use winnow::token::{one_of, take_while};

use harmony::{Degree, Key, KeyQuality, Letter, Note, NoteValue, Spelling};
use tracing::debug;

use crate::score::Score;
use crate::ScoreError;

type PResult<T> = winnow::ModalResult<T>;

/// Parse a key annotation: a letter, then uniform accidental marks. Case
/// picks the mode, so "Eb" is E flat major and "g#" is G sharp harmonic
/// minor.
pub fn parse_key_name(input: &mut &str) -> PResult<(KeyQuality, Spelling)> {
    let c = one_of([
        'C', 'D', 'E', 'F', 'G', 'A', 'B', 'c', 'd', 'e', 'f', 'g', 'a', 'b',
    ])
    .parse_next(input)?;
    let quality = if c.is_ascii_lowercase() {
        KeyQuality::HarmonicMinor
    } else {
        KeyQuality::Major
    };
    let letter = match Letter::parse(c) {
        Some(letter) => letter,
        None => unreachable!(), // one_of already validated the character
    };
    let alter = opt(alt((
        take_while(1.., '#').map(|marks: &str| marks.len() as i8),
        take_while(1.., 'b').map(|marks: &str| -(marks.len() as i8)),
    )))
    .parse_next(input)?
    .unwrap_or(0);
    Ok((quality, Spelling::new(letter, alter)))
}

/// Collapse a line to bare markup. Whitespace carries no meaning anywhere in
/// the subset we read.
pub(crate) fn strip(line: &str) -> String {
    line.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Content of a one-line element: the text between the first `>` and the
/// next `<`.
pub(crate) fn enclosed(line: &str) -> Option<&str> {
    let start = line.find('>')? + 1;
    let rest = &line[start..];
    Some(&rest[..rest.find('<')?])
}

/// First attribute value on the line.
pub(crate) fn quoted(line: &str) -> Option<&str> {
    let start = line.find('"')? + 1;
    let rest = &line[start..];
    Some(&rest[..rest.find('"')?])
}

/// Index of the first line at or after `start` containing `needle`.
pub(crate) fn find_from(lines: &[String], start: usize, needle: &str) -> Option<usize> {
    lines
        .get(start..)?
        .iter()
        .position(|line| line.contains(needle))
        .map(|offset| start + offset)
}

fn find_either(lines: &[String], start: usize, a: &str, b: &str) -> Option<usize> {
    lines
        .get(start..)?
        .iter()
        .position(|line| line.contains(a) || line.contains(b))
        .map(|offset| start + offset)
}

/// Slice out each `<part id=..>` .. `</part>` region, in document order.
///
/// The `<score-part>` declarations in the part list don't match: stripping
/// leaves them as `<score-partid=`, which never contains `<partid`.
fn part_regions(lines: &[String]) -> Vec<&[String]> {
    let mut regions = Vec::new();
    let mut at = 0;
    while let Some(open) = find_from(lines, at, "<partid") {
        let Some(close) = find_from(lines, open + 1, "</part>") else {
            break;
        };
        regions.push(&lines[open..=close]);
        at = close + 1;
    }
    regions
}

/// Pull the notes out of one part region, in order.
///
/// Each pitched note is a `<step>` line, an optional `<alter>` line, an
/// `<octave>` line, and a `<type>` line. Rests have no `<step>` and fall
/// through the scan untouched, which is exactly what ends the given bass at
/// its rest measures.
fn part_notes(lines: &[String]) -> Result<Vec<Note>, ScoreError> {
    let mut notes = Vec::new();
    let mut at = 0;
    while let Some(step_idx) = find_from(lines, at, "<step>") {
        let letter = enclosed(&lines[step_idx])
            .and_then(|text| text.chars().next())
            .and_then(Letter::parse)
            .ok_or_else(|| ScoreError::MalformedNote(lines[step_idx].clone()))?;

        let found = find_either(lines, step_idx + 1, "alter", "octave")
            .ok_or_else(|| ScoreError::MalformedNote(lines[step_idx].clone()))?;
        let (alter, octave_idx) = if lines[found].contains("alter") {
            let alter = enclosed(&lines[found])
                .and_then(|text| text.parse().ok())
                .ok_or_else(|| ScoreError::MalformedNote(lines[found].clone()))?;
            let octave_idx = find_from(lines, found + 1, "octave")
                .ok_or_else(|| ScoreError::MalformedNote(lines[found].clone()))?;
            (alter, octave_idx)
        } else {
            (0, found)
        };
        let octave: i32 = enclosed(&lines[octave_idx])
            .and_then(|text| text.parse().ok())
            .ok_or_else(|| ScoreError::MalformedNote(lines[octave_idx].clone()))?;

        let type_idx = find_from(lines, octave_idx + 1, "<type>")
            .ok_or_else(|| ScoreError::MalformedNote(lines[octave_idx].clone()))?;
        let type_text = enclosed(&lines[type_idx])
            .ok_or_else(|| ScoreError::MalformedNote(lines[type_idx].clone()))?;
        let value = NoteValue::parse(type_text)
            .ok_or_else(|| ScoreError::UnknownNoteType(type_text.to_string()))?;

        let spelling = Spelling::new(letter, alter);
        notes.push(Note::new(spelling, spelling.semitone() + 12 * octave, value));
        at = type_idx + 1;
    }
    Ok(notes)
}

/// Parse an annotated two-part score.
///
/// The score must carry a `<words>` text annotation naming the key and a
/// `<function>` annotation naming the chord the given bass ends on. The first
/// part is read as the soprano, the second as the given bass.
pub fn parse_score(input: &str) -> Result<Score, ScoreError> {
    let lines: Vec<String> = input.lines().map(strip).collect();

    let key_line = lines
        .iter()
        .find(|line| line.contains("<words>"))
        .ok_or(ScoreError::MissingKey)?;
    let key_text = enclosed(key_line).unwrap_or("");
    let (quality, tonic) = parse_key_name
        .parse(key_text)
        .map_err(|_| ScoreError::UnknownKey(key_text.to_string()))?;
    let key = Key::new(quality, tonic);

    let numeral_line = lines
        .iter()
        .find(|line| line.contains("<function>"))
        .ok_or(ScoreError::MissingFinalChord)?;
    let numeral = enclosed(numeral_line).unwrap_or("");
    let final_degree = Degree::from_numeral(numeral)
        .ok_or_else(|| ScoreError::UnknownNumeral(numeral.to_string()))?;

    let regions = part_regions(&lines);
    let [soprano_region, bass_region, ..] = regions.as_slice() else {
        return Err(ScoreError::MissingParts);
    };
    let soprano = part_notes(soprano_region)?;
    let given_bass = part_notes(bass_region)?;
    debug!(
        key = %tonic,
        soprano = soprano.len(),
        given_bass = given_bass.len(),
        "parsed score"
    );

    Ok(Score {
        key,
        soprano,
        given_bass,
        final_degree,
    })
}
