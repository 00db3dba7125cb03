//! Parsed score data.

use harmony::{Degree, Key, Note};
use serde::{Deserialize, Serialize};

/// Everything the engine needs from an annotated score: the key, the two
/// voice lines, and the degree of the chord the given bass ends on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Score {
    pub key: Key,
    /// The full melody, first part in the file.
    pub soprano: Vec<Note>,
    /// The already-written opening of the bass, second part in the file.
    /// Ends where the rest measures begin.
    pub given_bass: Vec<Note>,
    /// Degree of the chord under the last given bass note.
    pub final_degree: Degree,
}
