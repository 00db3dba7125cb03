//! Four-part harmony bass line writer.
//!
//! Given a key, a soprano line, and the already-written opening of a bass
//! line, the engine continues the bass to the end of the soprano: one chord
//! and one bass note per remaining soprano note, chosen by a randomized
//! backtracking search under classical voice-leading rules.
//!
//! # Example
//!
//! ```
//! use harmony::{write_bass_line, Degree, Key, KeyQuality, Letter, Note, NoteValue, Spelling};
//! use rand::rngs::StdRng;
//! use rand::SeedableRng;
//!
//! let key = Key::new(KeyQuality::Major, Spelling::natural(Letter::C));
//! let soprano: Vec<Note> = [(Letter::C, 48), (Letter::D, 50), (Letter::E, 52), (Letter::F, 53)]
//!     .map(|(letter, pitch)| Note::new(Spelling::natural(letter), pitch, NoteValue::Quarter))
//!     .to_vec();
//! let given = vec![Note::new(Spelling::natural(Letter::C), 36, NoteValue::Quarter)];
//!
//! let mut rng = StdRng::seed_from_u64(17);
//! let result = write_bass_line(&key, &soprano, &given, Degree::Tonic, &mut rng).unwrap();
//! assert_eq!(result.bass_line.len(), 3);
//! ```

pub mod key;
pub mod rules;
pub mod search;
pub mod types;

pub use key::{Key, KeyQuality};
pub use search::{write_bass_line, Harmonization};
pub use types::{Chord, Degree, Inversion, Letter, Note, NoteValue, Spelling, Tone};

use thiserror::Error;

/// Errors from the progression search.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HarmonyError {
    /// Every branch of the search tree was exhausted without completing the
    /// line.
    #[error("no legal chord progression fits this soprano line")]
    Unsolvable,
    /// The given bass line stops somewhere other than a soprano note
    /// boundary, or runs past the end of the soprano.
    #[error("the given bass line must end in alignment with the soprano voice")]
    MisalignedBassLine,
    /// The given bass line is empty, so there is nothing to continue from.
    #[error("the given bass line has no notes to continue from")]
    EmptyBassPrefix,
}
