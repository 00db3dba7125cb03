//! Key construction: the diatonic scale, its stacked chords, and the
//! secondary dominant.
//!
//! A [`Key`] is built once from a tonic spelling and a quality, and is
//! immutable afterwards. It owns all eight chord templates; the search engine
//! copies them when it voices candidates.

use serde::{Deserialize, Serialize};

use crate::types::{Chord, Degree, Spelling, Tone};

/// Major or harmonic minor. The harmonic form is the only minor scale here
/// since its raised seventh supplies the leading tone the progression rules
/// lean on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyQuality {
    Major,
    HarmonicMinor,
}

impl KeyQuality {
    /// Semitone steps above the tonic for scale degrees 2 through 7.
    fn steps(&self) -> [i32; 6] {
        match self {
            KeyQuality::Major => [2, 4, 5, 7, 9, 11],
            KeyQuality::HarmonicMinor => [2, 3, 5, 7, 8, 11],
        }
    }
}

/// A key: seven diatonic chords plus the secondary dominant.
///
/// Degrees 2 and 5 carry sevenths, the rest are triads. Chord tones keep the
/// template pitches of the scale octave they were stacked in; the bass range
/// is reached later by octave displacement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Key {
    quality: KeyQuality,
    chords: [Chord; 7],
    secondary_dominant: Chord,
}

impl Key {
    /// Candidacy order when matching a soprano note to chords. The mediant is
    /// deliberately absent: it never harmonizes and nothing progresses to it.
    const HARMONIZABLE: [Degree; 7] = [
        Degree::Tonic,
        Degree::Supertonic,
        Degree::Subdominant,
        Degree::Dominant,
        Degree::Submediant,
        Degree::LeadingTone,
        Degree::SecondaryDominant,
    ];

    pub fn new(quality: KeyQuality, tonic: Spelling) -> Key {
        let tonic_pitch = tonic.semitone();
        let mut scale = Vec::with_capacity(7);
        scale.push(Tone::new(tonic, tonic_pitch));

        // Walk the letter cycle upward from the tonic. Each degree's
        // alteration is whatever reconciles the plain letter, lifted into an
        // ascending frame, with the scale step's actual pitch. Double
        // accidentals fall out of this on their own (G# minor gets F##).
        let mut letter = tonic.letter;
        let mut frame = tonic.letter.semitone();
        for step in quality.steps() {
            letter = letter.next();
            let mut natural = letter.semitone();
            while natural < frame {
                natural += 12;
            }
            frame = natural;
            let pitch = tonic_pitch + step;
            scale.push(Tone::new(
                Spelling::new(letter, (pitch - natural) as i8),
                pitch,
            ));
        }

        let chords = std::array::from_fn(|i| {
            let degree = Degree::DIATONIC[i];
            let mut tones = vec![scale[i], scale[(i + 2) % 7], scale[(i + 4) % 7]];
            if matches!(degree, Degree::Supertonic | Degree::Dominant) {
                tones.push(scale[(i + 6) % 7]);
            }
            Chord::new(degree, tones)
        });

        // V of V: supertonic root, the fourth degree raised a semitone as its
        // third, submediant fifth.
        let secondary_dominant = Chord::new(
            Degree::SecondaryDominant,
            vec![
                scale[1],
                Tone::new(scale[3].spelling.raised(), scale[3].pitch + 1),
                scale[5],
            ],
        );

        Key {
            quality,
            chords,
            secondary_dominant,
        }
    }

    pub fn is_major(&self) -> bool {
        self.quality == KeyQuality::Major
    }

    /// The chord template for a degree.
    pub fn chord(&self, degree: Degree) -> &Chord {
        match degree {
            Degree::Tonic => &self.chords[0],
            Degree::Supertonic => &self.chords[1],
            Degree::Mediant => &self.chords[2],
            Degree::Subdominant => &self.chords[3],
            Degree::Dominant => &self.chords[4],
            Degree::Submediant => &self.chords[5],
            Degree::LeadingTone => &self.chords[6],
            Degree::SecondaryDominant => &self.secondary_dominant,
        }
    }

    /// The tonic scale tone.
    pub fn tonic(&self) -> &Tone {
        self.chords[0].root()
    }

    /// The leading tone, i.e. the root of the degree-7 chord.
    pub fn leading_tone(&self) -> &Tone {
        self.chords[6].root()
    }

    /// Every chord whose tones cover all the given spellings, in candidacy
    /// order. This is how the engine finds which chords can harmonize a
    /// soprano note.
    pub fn possible_chords(&self, spellings: &[Spelling]) -> Vec<&Chord> {
        Self::HARMONIZABLE
            .iter()
            .map(|&degree| self.chord(degree))
            .filter(|chord| spellings.iter().all(|&s| chord.contains(s)))
            .collect()
    }
}
