//! Pitch, rhythm, and chord types for the bass line writer.
//!
//! Spellings are structural: C# and Db are different values even though they
//! sound the same pitch. All of the voice-leading rules that care about note
//! identity compare spellings, never raw semitones.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A note letter, without accidentals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Letter {
    C,
    D,
    E,
    F,
    G,
    A,
    B,
}

impl Letter {
    /// Semitone offset from C (0-11) of the plain letter.
    pub fn semitone(&self) -> i32 {
        match self {
            Letter::C => 0,
            Letter::D => 2,
            Letter::E => 4,
            Letter::F => 5,
            Letter::G => 7,
            Letter::A => 9,
            Letter::B => 11,
        }
    }

    /// The next letter up the musical alphabet, wrapping B back to C.
    pub fn next(&self) -> Letter {
        match self {
            Letter::C => Letter::D,
            Letter::D => Letter::E,
            Letter::E => Letter::F,
            Letter::F => Letter::G,
            Letter::G => Letter::A,
            Letter::A => Letter::B,
            Letter::B => Letter::C,
        }
    }

    /// Parse from a single character (case-insensitive).
    pub fn parse(c: char) -> Option<Letter> {
        match c.to_ascii_uppercase() {
            'C' => Some(Letter::C),
            'D' => Some(Letter::D),
            'E' => Some(Letter::E),
            'F' => Some(Letter::F),
            'G' => Some(Letter::G),
            'A' => Some(Letter::A),
            'B' => Some(Letter::B),
            _ => None,
        }
    }

    pub fn as_char(&self) -> char {
        match self {
            Letter::C => 'C',
            Letter::D => 'D',
            Letter::E => 'E',
            Letter::F => 'F',
            Letter::G => 'G',
            Letter::A => 'A',
            Letter::B => 'B',
        }
    }
}

/// A spelled note name: letter plus a signed accidental count.
///
/// `alter` is the number of sharps (positive) or flats (negative) applied to
/// the letter, so Bb is `{B, -1}` and F## is `{F, +2}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Spelling {
    pub letter: Letter,
    pub alter: i8,
}

impl Spelling {
    pub fn new(letter: Letter, alter: i8) -> Self {
        Spelling { letter, alter }
    }

    pub fn natural(letter: Letter) -> Self {
        Spelling { letter, alter: 0 }
    }

    /// Pitch class of this spelling relative to C natural. May fall outside
    /// 0-11 for spellings like Cb or B#.
    pub fn semitone(&self) -> i32 {
        self.letter.semitone() + self.alter as i32
    }

    /// The same letter raised one semitone: a flat is removed before a sharp
    /// is added, so Bb raises to B and F raises to F#.
    pub fn raised(&self) -> Spelling {
        Spelling {
            letter: self.letter,
            alter: self.alter + 1,
        }
    }
}

impl fmt::Display for Spelling {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter.as_char())?;
        for _ in 0..self.alter.abs() {
            write!(f, "{}", if self.alter > 0 { '#' } else { 'b' })?;
        }
        Ok(())
    }
}

/// A pitched chord tone: a spelling fixed to an absolute semitone.
///
/// Pitch 0 is C0; middle C (C4) is 48. Chord tones carry the pitch of the
/// scale octave they were built in; voicing into the bass register happens
/// later by octave displacement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tone {
    pub spelling: Spelling,
    pub pitch: i32,
}

impl Tone {
    pub fn new(spelling: Spelling, pitch: i32) -> Self {
        Tone { spelling, pitch }
    }
}

/// Rhythmic value, at the granularities the tool handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NoteValue {
    Eighth,
    Quarter,
    Half,
    Whole,
}

impl NoteValue {
    /// Length in sixteenth-note ticks.
    pub fn sixteenths(&self) -> u32 {
        match self {
            NoteValue::Eighth => 2,
            NoteValue::Quarter => 4,
            NoteValue::Half => 8,
            NoteValue::Whole => 16,
        }
    }

    /// Parse a MusicXML `<type>` name.
    pub fn parse(name: &str) -> Option<NoteValue> {
        match name {
            "eighth" => Some(NoteValue::Eighth),
            "quarter" => Some(NoteValue::Quarter),
            "half" => Some(NoteValue::Half),
            "whole" => Some(NoteValue::Whole),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            NoteValue::Eighth => "eighth",
            NoteValue::Quarter => "quarter",
            NoteValue::Half => "half",
            NoteValue::Whole => "whole",
        }
    }
}

/// A sounded note: a pitched spelling with a rhythmic value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub spelling: Spelling,
    pub pitch: i32,
    pub value: NoteValue,
}

impl Note {
    pub fn new(spelling: Spelling, pitch: i32, value: NoteValue) -> Self {
        Note {
            spelling,
            pitch,
            value,
        }
    }
}

/// Which chord tone is voiced in the bass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Inversion {
    #[default]
    Root,
    First,
    Second,
    Third,
}

impl Inversion {
    pub const ALL: [Inversion; 4] = [
        Inversion::Root,
        Inversion::First,
        Inversion::Second,
        Inversion::Third,
    ];

    /// Index of the bass tone within the chord's stacked tones.
    pub fn index(&self) -> usize {
        match self {
            Inversion::Root => 0,
            Inversion::First => 1,
            Inversion::Second => 2,
            Inversion::Third => 3,
        }
    }
}

/// Scale degree of a chord's root, or the secondary dominant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Degree {
    Tonic,
    Supertonic,
    Mediant,
    Subdominant,
    Dominant,
    Submediant,
    LeadingTone,
    SecondaryDominant,
}

impl Degree {
    /// The seven diatonic degrees in scale order.
    pub const DIATONIC: [Degree; 7] = [
        Degree::Tonic,
        Degree::Supertonic,
        Degree::Mediant,
        Degree::Subdominant,
        Degree::Dominant,
        Degree::Submediant,
        Degree::LeadingTone,
    ];

    /// Degrees a chord on this degree may progress to.
    ///
    /// This is the fixed progression graph. The mediant has no destinations
    /// and nothing routes to it; it exists only so the scale is complete.
    pub fn destinations(&self) -> &'static [Degree] {
        match self {
            Degree::Tonic => &[
                Degree::Subdominant,
                Degree::Dominant,
                Degree::Submediant,
                Degree::LeadingTone,
                Degree::SecondaryDominant,
            ],
            Degree::Supertonic => &[Degree::Dominant, Degree::LeadingTone],
            Degree::Mediant => &[],
            Degree::Subdominant => &[Degree::Tonic, Degree::Supertonic, Degree::Dominant],
            Degree::Dominant => &[
                Degree::Tonic,
                Degree::Submediant,
                Degree::SecondaryDominant,
            ],
            Degree::Submediant => &[Degree::Supertonic, Degree::Subdominant, Degree::Dominant],
            Degree::LeadingTone => &[Degree::Tonic],
            Degree::SecondaryDominant => &[Degree::Dominant, Degree::Submediant],
        }
    }

    /// Roman numeral for this degree in the given mode.
    pub fn numeral(&self, major: bool) -> &'static str {
        if major {
            match self {
                Degree::Tonic => "I",
                Degree::Supertonic => "ii",
                Degree::Mediant => "iii",
                Degree::Subdominant => "IV",
                Degree::Dominant => "V",
                Degree::Submediant => "vi",
                Degree::LeadingTone => "vii",
                Degree::SecondaryDominant => "V",
            }
        } else {
            match self {
                Degree::Tonic => "i",
                Degree::Supertonic => "ii",
                Degree::Mediant => "III",
                Degree::Subdominant => "iv",
                Degree::Dominant => "V",
                Degree::Submediant => "VI",
                Degree::LeadingTone => "vii",
                Degree::SecondaryDominant => "V",
            }
        }
    }

    /// Parse a roman numeral, either case. Only degrees that make sense as a
    /// final chord are accepted: 1, 2, 4, 5, and 6.
    pub fn from_numeral(s: &str) -> Option<Degree> {
        match s.to_lowercase().as_str() {
            "i" => Some(Degree::Tonic),
            "ii" => Some(Degree::Supertonic),
            "iv" => Some(Degree::Subdominant),
            "v" => Some(Degree::Dominant),
            "vi" => Some(Degree::Submediant),
            _ => None,
        }
    }
}

/// A stacked chord: root, third, fifth, and on degrees 2 and 5 a seventh.
///
/// `tones` keeps stacking order regardless of inversion; the inversion only
/// selects which tone the bass voices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chord {
    pub degree: Degree,
    pub tones: Vec<Tone>,
    pub inversion: Inversion,
}

impl Chord {
    pub fn new(degree: Degree, tones: Vec<Tone>) -> Self {
        Chord {
            degree,
            tones,
            inversion: Inversion::Root,
        }
    }

    /// A fresh copy of this chord voiced in the given inversion.
    pub fn with_inversion(&self, inversion: Inversion) -> Chord {
        Chord {
            degree: self.degree,
            tones: self.tones.clone(),
            inversion,
        }
    }

    /// The chord's root tone.
    pub fn root(&self) -> &Tone {
        &self.tones[0]
    }

    /// The tone this chord voices in the bass, or `None` when the inversion
    /// asks for a seventh the chord does not have.
    pub fn bass_tone(&self) -> Option<&Tone> {
        self.tones.get(self.inversion.index())
    }

    /// Whether the chord contains a tone with this spelling.
    pub fn contains(&self, spelling: Spelling) -> bool {
        self.tones.iter().any(|t| t.spelling == spelling)
    }

    /// Whether this chord carries a seventh.
    pub fn is_seventh(&self) -> bool {
        self.tones.len() == 4
    }
}
