//! Voice-leading rules.
//!
//! These predicates decide whether a candidate chord may follow the committed
//! one, and where its bass note may sit. They are kept apart from the search
//! loop so each rule can be exercised on its own.

use tracing::trace;

use crate::key::Key;
use crate::types::{Chord, Degree, Inversion, Note, Tone};

/// Bass register bounds in absolute semitones, Bb2 through middle C (C4 = 48).
pub const LOWEST_BASS_PITCH: i32 = 34;
pub const HIGHEST_BASS_PITCH: i32 = 48;

/// Largest melodic leap the bass may take, in semitones.
pub const LARGEST_BASS_LEAP: i32 = 7;

/// Whether `candidate`'s inversion is allowed after `parent`.
///
/// Three rejection filters run first; a candidate that survives them is
/// decided by its own degree. `is_final` marks the candidate as harmonizing
/// the last soprano note.
pub fn valid_inversion(candidate: &Chord, parent: &Chord, is_final: bool) -> bool {
    // The progression must close in root position.
    if is_final && candidate.inversion != Inversion::Root {
        return false;
    }
    // After the submediant, only root position.
    if parent.degree == Degree::Submediant && candidate.inversion != Inversion::Root {
        return false;
    }
    // After V of V, never a seventh in the bass.
    if parent.degree == Degree::SecondaryDominant && candidate.inversion == Inversion::Third {
        return false;
    }
    match candidate.degree {
        Degree::SecondaryDominant => candidate.inversion != Inversion::Third,
        Degree::Tonic => {
            candidate.inversion != Inversion::Second && candidate.inversion != Inversion::Third
        }
        Degree::Subdominant => candidate.inversion != Inversion::Third,
        // The submediant takes first inversion when arriving from V of V and
        // root position everywhere else.
        Degree::Submediant => match candidate.inversion {
            Inversion::First => parent.degree == Degree::SecondaryDominant,
            Inversion::Root => parent.degree != Degree::SecondaryDominant,
            _ => false,
        },
        // Leading-tone chords are never committed as destinations. The vii
        // edge in the progression graph matters only for caller-supplied
        // seed chords.
        Degree::LeadingTone => false,
        _ => true,
    }
}

/// The voiced bass tone for `destination`, or `None` when no octave
/// placement satisfies every rule.
///
/// `parent` is the committed chord being left; `prev_bass` its bass note;
/// `soprano_prev` and `soprano_next` the soprano notes either side of the
/// step being harmonized.
pub fn legal_bass_pitch(
    key: &Key,
    destination: &Chord,
    parent: &Chord,
    prev_bass: &Note,
    soprano_prev: &Note,
    soprano_next: &Note,
) -> Option<Tone> {
    let bass = destination.bass_tone()?;

    // Bass and soprano may not land on the same letter name two steps
    // running.
    if bass.spelling == soprano_next.spelling && prev_bass.spelling == soprano_prev.spelling {
        return None;
    }

    let needs_resolution = prev_bass.spelling == key.leading_tone().spelling;
    if needs_resolution {
        trace!(
            bass = %prev_bass.spelling,
            tonic = %key.tonic().spelling,
            "leading tone in the bass must resolve up to the tonic"
        );
        if bass.spelling != key.tonic().spelling {
            return None;
        }
    }

    let soprano_interval = soprano_next.pitch - soprano_prev.pitch;

    // Try octave placements of the chord tone in ascending order, keeping
    // the first one every rule accepts.
    let mut pitch = bass.pitch;
    loop {
        pitch += 12;
        if pitch > HIGHEST_BASS_PITCH {
            return None;
        }
        if pitch < LOWEST_BASS_PITCH {
            continue;
        }
        let leap = pitch - prev_bass.pitch;
        if leap.abs() > LARGEST_BASS_LEAP {
            continue;
        }
        // No tritone leaps.
        if leap.abs() == 6 {
            continue;
        }
        if needs_resolution && leap != 1 {
            continue;
        }
        // A chordal seventh in the bass resolves down by semitone: if the
        // chord being left is in third inversion, the next bass note sits
        // one semitone below it.
        if parent.inversion == Inversion::Third && leap != -1 {
            continue;
        }
        // Bass and soprano rising a perfect fifth in lockstep are parallel
        // fifths.
        if leap == soprano_interval && soprano_interval == 7 {
            continue;
        }
        return Some(Tone::new(bass.spelling, pitch));
    }
}
