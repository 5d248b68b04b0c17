//! Randomized edit sequences.
//!
//! Every step applies one random structural edit through an `EditSession`
//! and then checks that the live distribution and consensus equal a
//! recount from the alignment, and that every row is still well formed.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use seqedit::model::is_gap;
use seqedit::symbol_rules::SymbolRuleSet;
use seqedit::{Alignment, EditSession, SequenceRow, SequenceType, SessionConfig};

const ALPHABET: &[u8] = b"ACGT";

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn residue(rng: &mut StdRng) -> u8 {
    ALPHABET[rng.random_range(0..ALPHABET.len())]
}

/// A row of `length` columns with at least one residue, displaying a window
/// of a longer source so that extensions have room to grow.
fn random_row(rng: &mut StdRng, id: String, length: usize) -> SequenceRow {
    let mut aligned: Vec<u8> = (0..length)
        .map(|_| if rng.random_bool(0.35) { b'-' } else { residue(rng) })
        .collect();
    let forced = rng.random_range(0..length);
    aligned[forced] = residue(rng);

    let prefix: Vec<u8> = (0..rng.random_range(0..4)).map(|_| residue(rng)).collect();
    let suffix: Vec<u8> = (0..rng.random_range(0..4)).map(|_| residue(rng)).collect();
    let window: Vec<u8> = aligned.iter().copied().filter(|&c| !is_gap(c)).collect();

    let start = prefix.len() + 1;
    let stop = prefix.len() + window.len();
    let source: Vec<u8> = prefix.into_iter().chain(window).chain(suffix).collect();
    SequenceRow::from_aligned(id, source, aligned, start, stop, SequenceType::Nucleotide)
        .expect("generated row is consistent")
}

fn random_alignment(rng: &mut StdRng) -> Alignment {
    let rows = rng.random_range(2..7);
    let length = rng.random_range(4..20);
    let mut aln = Alignment::new(SequenceType::Nucleotide);
    for i in 0..rows {
        let row = random_row(rng, format!("seq{}", i + 1), length);
        aln.append(row).expect("same length and alphabet");
    }
    aln
}

/// A valid signed index into `1..=count`, negative about a third of the time.
fn index(rng: &mut StdRng, count: usize) -> isize {
    let i = rng.random_range(1..=count) as isize;
    if rng.random_bool(0.33) {
        i - count as isize - 1
    } else {
        i
    }
}

fn assert_well_formed(session: &EditSession, step: usize, op: &str) {
    let aln = session.alignment();
    for row in aln.rows() {
        assert_eq!(row.len(), aln.length(), "step {step} ({op}): row length");
        assert!(row.residue_count() >= 1, "step {step} ({op}): empty row");
        assert!(
            row.as_bytes()
                .iter()
                .copied()
                .filter(|&c| !is_gap(c))
                .eq(row.ungapped().iter().copied()),
            "step {step} ({op}): residues out of sync with window"
        );
    }
    assert!(session.is_consistent(), "step {step} ({op}): live views drifted");
}

/// Applies one random edit, returning its name for diagnostics.
fn random_edit(rng: &mut StdRng, session: &mut EditSession, next_id: &mut usize) -> &'static str {
    let rows = session.alignment().row_count();
    let length = session.alignment().length();

    if rows == 0 {
        let length = rng.random_range(3..12);
        for _ in 0..rng.random_range(1..4) {
            *next_id += 1;
            let row = random_row(rng, format!("new{}", next_id), length);
            session.edit(|aln| aln.append(row)).expect("append into empty alignment");
        }
        return "refill";
    }

    match rng.random_range(0..17) {
        0 => {
            let column = index(rng, length + 1);
            let count = rng.random_range(1..4);
            session
                .edit(|aln| aln.insert_gap_columns(column, count, b'-'))
                .expect("insert gaps");
            "insert_gap_columns"
        }
        1 => {
            session.edit(|aln| aln.remove_gap_columns());
            "remove_gap_columns"
        }
        2 | 3 => {
            let row = rng.random_range(1..=rows);
            let len = session.alignment().rows()[row - 1].source().len();
            let position = rng.random_range(1..=len);
            let start = rng.random_bool(0.5);
            session
                .edit(|aln| {
                    if start {
                        aln.set_subseq_start(row as isize, position)
                    } else {
                        aln.set_subseq_stop(row as isize, position)
                    }
                })
                .expect("move window");
            if start {
                "set_subseq_start"
            } else {
                "set_subseq_stop"
            }
        }
        op @ 4..=9 => {
            let top = index(rng, rows);
            let bottom = index(rng, rows);
            let column = index(rng, length);
            session
                .edit(|aln| match op {
                    4 => aln.extend_subseqs_left(top, bottom, column),
                    5 => aln.extend_subseqs_right(top, bottom, column),
                    6 => aln.trim_subseqs_left(top, bottom, column),
                    7 => aln.trim_subseqs_right(top, bottom, column),
                    8 => aln.level_subseqs_left(top, bottom, column),
                    _ => aln.level_subseqs_right(top, bottom, column),
                })
                .expect("boundary batch");
            "boundary batch"
        }
        10 => {
            let (left, right) = (rng.random_range(1..=length), rng.random_range(1..=length));
            let (top, bottom) = (rng.random_range(1..=rows), rng.random_range(1..=rows));
            let rect = seqedit::coords::Rect::new(left, top, right, bottom);
            let left_side = rng.random_bool(0.5);
            session
                .edit(|aln| {
                    if left_side {
                        aln.collapse_left(rect)
                    } else {
                        aln.collapse_right(rect)
                    }
                })
                .expect("collapse");
            "collapse"
        }
        11 | 12 => {
            let (left, right) = (index(rng, length), index(rng, length));
            let (top, bottom) = (index(rng, rows), index(rng, rows));
            let delta = rng.random_range(-4i64..=4) as isize;
            session
                .edit(|aln| aln.slide_region(left, top, right, bottom, delta))
                .expect("slide");
            "slide_region"
        }
        13 => {
            let (a, b) = (index(rng, rows), index(rng, rows));
            session.edit(|aln| aln.swap(a, b)).expect("swap");
            "swap"
        }
        14 => {
            let (first, last) = (index(rng, rows), index(rng, rows));
            let delta = rng.random_range(-3i64..=3) as isize;
            session
                .edit(|aln| aln.move_row_range_relative(first, last, delta))
                .expect("move");
            "move_row_range_relative"
        }
        15 => {
            if rng.random_bool(0.5) {
                *next_id += 1;
                let row = random_row(rng, format!("new{}", next_id), length);
                let at = index(rng, rows + 1);
                session.edit(|aln| aln.insert(at, row)).expect("insert row");
                "insert"
            } else {
                let at = index(rng, rows);
                session.edit(|aln| aln.remove_at(at)).expect("remove row");
                "remove_at"
            }
        }
        _ => {
            if rng.random_bool(0.1) {
                session.edit(|aln| aln.clear());
                "clear"
            } else {
                session.edit(|aln| aln.sort_by(|a, b| a.ungapped().cmp(b.ungapped())));
                "sort_by"
            }
        }
    }
}

fn run(seed: u64, steps: usize, rules: Option<SymbolRuleSet>) {
    let mut rng = StdRng::seed_from_u64(seed);
    let aln = random_alignment(&mut rng);
    let mut session = EditSession::new(
        aln,
        SessionConfig {
            gap_char: b'-',
            rules,
        },
    );
    assert!(session.is_consistent());

    let mut next_id = 0;
    for step in 0..steps {
        let op = random_edit(&mut rng, &mut session, &mut next_id);
        assert_well_formed(&session, step, op);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[test]
fn test_random_edits_keep_live_views_in_sync() {
    for seed in 0..20 {
        run(seed, 200, Some(SymbolRuleSet::nucleotide_default()));
    }
}

#[test]
fn test_random_edits_without_consensus() {
    for seed in 100..110 {
        run(seed, 300, None);
    }
}

#[test]
fn test_insert_then_strip_restores_length() {
    let mut rng = StdRng::seed_from_u64(42);
    for _ in 0..25 {
        let aln = random_alignment(&mut rng);
        let mut session = EditSession::new(aln, SessionConfig::default());
        session.edit(|aln| aln.remove_gap_columns());
        let length = session.alignment().length();

        let column = rng.random_range(1..=length + 1) as isize;
        let count = rng.random_range(1..6);
        session
            .edit(|aln| aln.insert_gap_columns(column, count, b'-'))
            .unwrap();
        assert_eq!(session.alignment().length(), length + count);
        assert_eq!(session.edit(|aln| aln.remove_gap_columns()), count);
        assert_eq!(session.alignment().length(), length);
        assert!(session.is_consistent());
    }
}

#[test]
fn test_slide_then_reverse_restores_block() {
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..50 {
        let aln = random_alignment(&mut rng);
        let before: Vec<Vec<u8>> = aln.rows().iter().map(|r| r.as_bytes().to_vec()).collect();
        let mut session = EditSession::new(aln, SessionConfig::default());

        let length = session.alignment().length();
        let rows = session.alignment().row_count();
        let left = rng.random_range(1..=length);
        let right = rng.random_range(left..=length);
        let top = rng.random_range(1..=rows);
        let bottom = rng.random_range(top..=rows);
        let delta = rng.random_range(-5i64..=5) as isize;

        let (l, t, r, b) = (left as isize, top as isize, right as isize, bottom as isize);
        let moved = session
            .edit(|aln| aln.slide_region(l, t, r, b, delta))
            .unwrap();
        let back = session
            .edit(|aln| aln.slide_region(l + moved, t, r + moved, b, -moved))
            .unwrap();
        assert_eq!(back, -moved);

        let after: Vec<Vec<u8>> = session
            .alignment()
            .rows()
            .iter()
            .map(|r| r.as_bytes().to_vec())
            .collect();
        assert_eq!(after, before);
        assert!(session.is_consistent());
    }
}
