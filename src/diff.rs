use std::iter;

/// Per-position result of comparing typed text against the reference.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CharacterComparison {
    Correct,
    Incorrect,
    /// The cursor: the next position to be typed.
    Current,
    Pending,
}

/// Counts over one comparison, without materializing the per-position vector.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DiffTally {
    pub correct: usize,
    pub incorrect: usize,
    /// Characters typed past the end of the reference.
    pub overflow: usize,
    pub typed: usize,
}

/// Lazily compare `reference` against `typed`, yielding one item per
/// reference character. Characters typed beyond the reference are not
/// represented here; see [`tally`].
pub fn comparisons<'a>(
    reference: &'a str,
    typed: &'a str,
) -> impl Iterator<Item = CharacterComparison> + 'a {
    let mut typed = typed.chars().map(Some).chain(iter::once(None));
    let mut cursor_emitted = false;

    reference.chars().map(move |expected| {
        if cursor_emitted {
            return CharacterComparison::Pending;
        }
        match typed.next().flatten() {
            Some(actual) if actual == expected => CharacterComparison::Correct,
            Some(_) => CharacterComparison::Incorrect,
            None => {
                cursor_emitted = true;
                CharacterComparison::Current
            }
        }
    })
}

pub fn compare(reference: &str, typed: &str) -> Vec<CharacterComparison> {
    comparisons(reference, typed).collect()
}

/// Count correct, incorrect and overflow characters. Only walks the
/// overlapping range positionally.
pub fn tally(reference: &str, typed: &str) -> DiffTally {
    let mut tally = DiffTally::default();
    let mut reference = reference.chars();

    for actual in typed.chars() {
        tally.typed += 1;
        match reference.next() {
            Some(expected) if expected == actual => tally.correct += 1,
            Some(_) => tally.incorrect += 1,
            None => tally.overflow += 1,
        }
    }

    tally
}
