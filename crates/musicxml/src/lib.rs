//! Reading and writing the MusicXML subset the bass line tool works with.
//!
//! This is deliberately not a general MusicXML implementation. It reads the
//! line-oriented scores that notation editors export, pulls out the two
//! voice parts and the key and final-chord annotations, and can splice a
//! composed bass line back over the rest measures of the original file.
//! Everything it does not understand passes through untouched.

pub mod parser;
pub mod score;
pub mod writer;

pub use parser::{parse_key_name, parse_score};
pub use score::Score;
pub use writer::render_score;

use thiserror::Error;

/// Ways a score can fail to parse or render.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScoreError {
    #[error(
        "no key annotation found; add a text annotation naming the key, \
         uppercase for major and lowercase for harmonic minor (Eb is E flat \
         major, g# is G sharp minor)"
    )]
    MissingKey,
    #[error("could not read a key from the annotation {0:?}")]
    UnknownKey(String),
    #[error("no final chord annotation found; add a function annotation naming the chord the given bass ends on")]
    MissingFinalChord,
    #[error("unknown chord numeral {0:?}; use I, ii, IV, V, or vi")]
    UnknownNumeral(String),
    #[error("expected a soprano part and a bass part")]
    MissingParts,
    #[error("malformed note element near {0:?}")]
    MalformedNote(String),
    #[error("unknown note type {0:?}")]
    UnknownNoteType(String),
    #[error("no beats-per-measure declaration found")]
    MissingBeats,
    #[error("no rest measures found to hold the composed bass line")]
    NoRestMeasures,
    #[error("could not find a measure number above the first rest")]
    MissingMeasureNumber,
    #[error("the bass part is not closed after its rest measures")]
    TruncatedScore,
}
