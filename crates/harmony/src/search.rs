//! The randomized backtracking search over chord progressions.
//!
//! Candidate chords form a lazily grown tree held in an arena and addressed
//! by index. The committed solution is a pair of parallel stacks, pushed when
//! the cursor descends and popped when it backtracks, so their length is
//! always the cursor's depth plus one. Element zero is the caller-supplied
//! seed and is stripped before the result is returned.

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::key::Key;
use crate::rules;
use crate::types::{Chord, Degree, Inversion, Note};
use crate::HarmonyError;

/// A finished continuation of the given bass line: one bass note and one
/// chord per harmonized soprano note, in order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Harmonization {
    pub bass_line: Vec<Note>,
    pub chords: Vec<Chord>,
}

/// One candidate in the search tree: a voiced chord under a soprano note.
///
/// Nodes are never removed. A failed candidate is only marked `explored`, so
/// revisiting its parent cannot regenerate it.
#[derive(Debug)]
struct SearchNode {
    chord: Chord,
    soprano_idx: usize,
    parent: Option<usize>,
    children: Vec<usize>,
    explored: bool,
    expanded: bool,
}

/// Search state for one `write_bass_line` call.
struct ProgressionSearch<'a> {
    key: &'a Key,
    soprano: &'a [Note],
    nodes: Vec<SearchNode>,
    cursor: Option<usize>,
    bass_line: Vec<Note>,
    chords: Vec<Chord>,
    goal: usize,
}

impl<'a> ProgressionSearch<'a> {
    fn new(
        key: &'a Key,
        soprano: &'a [Note],
        seed_note: Note,
        seed_chord: Chord,
        start_idx: usize,
        goal: usize,
    ) -> Self {
        let seed = SearchNode {
            chord: seed_chord.clone(),
            soprano_idx: start_idx,
            parent: None,
            children: Vec::new(),
            explored: false,
            expanded: false,
        };
        ProgressionSearch {
            key,
            soprano,
            nodes: vec![seed],
            cursor: Some(0),
            bass_line: vec![seed_note],
            chords: vec![seed_chord],
            // The seed chord does not count towards the goal.
            goal: goal + 1,
        }
    }

    /// Generate a node's children once: every chord that can harmonize the
    /// next soprano note and is a legal destination of the node's chord, in
    /// all four inversions.
    fn expand(&mut self, node: usize) {
        if self.nodes[node].expanded {
            return;
        }
        self.nodes[node].expanded = true;

        let key = self.key;
        let soprano = self.soprano;
        let next_idx = self.nodes[node].soprano_idx + 1;
        let Some(next_note) = soprano.get(next_idx) else {
            return;
        };

        let parent_degree = self.nodes[node].chord.degree;
        let mut children = Vec::new();
        for chord in key.possible_chords(&[next_note.spelling]) {
            if !parent_degree.destinations().contains(&chord.degree) {
                continue;
            }
            for inversion in Inversion::ALL {
                let idx = self.nodes.len();
                self.nodes.push(SearchNode {
                    chord: chord.with_inversion(inversion),
                    soprano_idx: next_idx,
                    parent: Some(node),
                    children: Vec::new(),
                    explored: false,
                    expanded: false,
                });
                children.push(idx);
            }
        }
        self.nodes[node].children = children;
    }

    /// One decision cycle: pick a random unexplored child of the cursor,
    /// validate it, and either commit it or mark it off. Backtracks when the
    /// cursor has nothing left to offer.
    fn step(&mut self, rng: &mut impl Rng) -> Result<(), HarmonyError> {
        let Some(cursor) = self.cursor else {
            // Backtracked past the seed: every branch is exhausted.
            return Err(HarmonyError::Unsolvable);
        };

        self.expand(cursor);

        let unexplored: Vec<usize> = self.nodes[cursor]
            .children
            .iter()
            .copied()
            .filter(|&child| !self.nodes[child].explored)
            .collect();

        if unexplored.is_empty() {
            debug!(depth = self.bass_line.len() - 1, "backtracking");
            self.nodes[cursor].explored = true;
            self.bass_line.pop();
            self.chords.pop();
            self.cursor = self.nodes[cursor].parent;
            return Ok(());
        }

        let pick = unexplored[rng.random_range(0..unexplored.len())];

        let is_final = self.nodes[pick].soprano_idx == self.soprano.len() - 1;
        let candidate = &self.nodes[pick].chord;
        let parent_chord = &self.nodes[cursor].chord;
        if !rules::valid_inversion(candidate, parent_chord, is_final) {
            self.nodes[pick].explored = true;
            return Ok(());
        }

        // The committed stacks hold exactly one entry per node from the seed
        // to the cursor, so the last element is the cursor's bass note.
        let prev_bass = &self.bass_line[self.bass_line.len() - 1];
        let soprano_prev = &self.soprano[self.nodes[cursor].soprano_idx];
        let soprano_next = &self.soprano[self.nodes[pick].soprano_idx];
        let Some(voiced) = rules::legal_bass_pitch(
            self.key,
            candidate,
            parent_chord,
            prev_bass,
            soprano_prev,
            soprano_next,
        ) else {
            self.nodes[pick].explored = true;
            return Ok(());
        };

        trace!(
            degree = ?self.nodes[pick].chord.degree,
            inversion = ?self.nodes[pick].chord.inversion,
            pitch = voiced.pitch,
            "committed"
        );
        self.cursor = Some(pick);
        self.bass_line.push(Note::new(
            voiced.spelling,
            voiced.pitch,
            soprano_next.value,
        ));
        self.chords.push(self.nodes[pick].chord.clone());
        Ok(())
    }

    fn run(&mut self, rng: &mut impl Rng) -> Result<(), HarmonyError> {
        while self.bass_line.len() < self.goal {
            self.step(rng)?;
        }
        Ok(())
    }

    /// Strip the seed entries and hand back the committed path.
    fn finish(mut self) -> Harmonization {
        self.bass_line.remove(0);
        self.chords.remove(0);
        Harmonization {
            bass_line: self.bass_line,
            chords: self.chords,
        }
    }
}

/// Continue `given_bass` under `soprano` to the end of the line.
///
/// `given_bass` is the already-written opening of the bass part; it must end
/// exactly on a soprano note boundary. `final_degree` names the chord the
/// given bass ends on, which seeds the progression. The search draws from
/// `rng` when ordering its exploration, so different seeds may find
/// different legal bass lines; whether a solution exists at all does not
/// depend on the seed, since the search is exhaustive.
pub fn write_bass_line(
    key: &Key,
    soprano: &[Note],
    given_bass: &[Note],
    final_degree: Degree,
    rng: &mut impl Rng,
) -> Result<Harmonization, HarmonyError> {
    let Some(seed_note) = given_bass.last() else {
        return Err(HarmonyError::EmptyBassPrefix);
    };

    let prefix_ticks: u32 = given_bass.iter().map(|n| n.value.sixteenths()).sum();

    // Find the soprano note the given bass ends under.
    let mut ticks = 0u32;
    let mut start_idx = None;
    for (idx, note) in soprano.iter().enumerate() {
        ticks += note.value.sixteenths();
        if ticks == prefix_ticks {
            start_idx = Some(idx);
            break;
        }
        if ticks > prefix_ticks {
            return Err(HarmonyError::MisalignedBassLine);
        }
    }
    let start_idx = start_idx.ok_or(HarmonyError::MisalignedBassLine)?;

    // One new bass note per soprano note after the start.
    let goal = soprano.len() - 1 - start_idx;
    debug!(start_idx, goal, "starting progression search");

    let seed_chord = key.chord(final_degree).clone();
    let mut search =
        ProgressionSearch::new(key, soprano, *seed_note, seed_chord, start_idx, goal);
    search.run(rng)?;
    Ok(search.finish())
}
