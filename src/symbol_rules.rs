//! Consensus symbol rules.
//!
//! A [`SymbolRuleSet`] turns one column's character proportions into a
//! single display symbol:
//! 1. every rule sums the proportions of the characters in its set
//! 2. a rule matches when that sum reaches its threshold
//! 3. no match yields the default symbol, one match yields its symbol
//! 4. among several matches the highest *effective threshold* (sum divided
//!    by set size) wins, so narrow rules beat broad ones; on a tie the rule
//!    inserted earliest wins
//!
//! Insertion order is tracked with a counter owned by the rule set. Putting
//! a rule in again under the same symbol replaces it and gives it a fresh,
//! later serial number.

use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};
use std::fmt;

use thiserror::Error;

use crate::distribution::CharProportionMap;

/// Errors raised when building rules.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RuleError {
    #[error("threshold {0} is outside 0..=1")]
    InvalidThreshold(f64),

    #[error("rule '{0}' has an empty character set")]
    EmptyCharacterSet(char),

    #[error("symbol {0:#04x} is not a printable ASCII character")]
    InvalidSymbol(u8),
}

/// One consensus rule: show `symbol` when the characters of `characters`
/// together make up at least `threshold` of a column.
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolRule {
    symbol: u8,
    characters: BTreeSet<u8>,
    threshold: f64,
}

impl SymbolRule {
    pub fn new(symbol: u8, characters: &[u8], threshold: f64) -> Result<Self, RuleError> {
        check_symbol(symbol)?;
        if !(0.0..=1.0).contains(&threshold) {
            return Err(RuleError::InvalidThreshold(threshold));
        }
        let characters: BTreeSet<u8> = characters.iter().copied().collect();
        if characters.is_empty() {
            return Err(RuleError::EmptyCharacterSet(symbol as char));
        }
        Ok(Self {
            symbol,
            characters,
            threshold,
        })
    }

    pub fn symbol(&self) -> u8 {
        self.symbol
    }

    pub fn characters(&self) -> &BTreeSet<u8> {
        &self.characters
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Summed proportion of this rule's characters in a column.
    pub fn proportion(&self, column: &CharProportionMap) -> f64 {
        self.characters
            .iter()
            .filter_map(|c| column.get(c))
            .sum()
    }
}

impl fmt::Display for SymbolRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let chars: String = self.characters.iter().map(|&c| c as char).collect();
        write!(f, "'{}' [{}] >= {}", self.symbol as char, chars, self.threshold)
    }
}

fn check_symbol(symbol: u8) -> Result<(), RuleError> {
    if symbol.is_ascii_graphic() || symbol == b' ' {
        Ok(())
    } else {
        Err(RuleError::InvalidSymbol(symbol))
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Entry {
    rule: SymbolRule,
    serial: u64,
}

/// Rules keyed by symbol plus a default symbol.
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolRuleSet {
    rules: HashMap<u8, Entry>,
    next_serial: u64,
    default_symbol: u8,
}

impl Default for SymbolRuleSet {
    fn default() -> Self {
        Self::new(b' ')
    }
}

impl SymbolRuleSet {
    /// Creates an empty rule set. Non-printable default symbols are
    /// replaced by a space.
    pub fn new(default_symbol: u8) -> Self {
        let default_symbol = if check_symbol(default_symbol).is_ok() {
            default_symbol
        } else {
            log::warn!("unprintable default symbol {:#04x}, using ' '", default_symbol);
            b' '
        };
        Self {
            rules: HashMap::new(),
            next_serial: 0,
            default_symbol,
        }
    }

    /// Amino acid consensus in the ClustalX manner: conserved residues,
    /// then physico-chemical classes.
    pub fn amino_acid_default() -> Self {
        let mut set = Self::new(b'.');
        for &aa in b"ACDEFGHIKLMNPQRSTVWY" {
            set.insert_rule(aa, &both_cases(&[aa]), 0.5);
        }
        set.insert_rule(b'#', &both_cases(b"ACFHILMVWY"), 0.5);
        set.insert_rule(b'+', &both_cases(b"KRH"), 0.6);
        set.insert_rule(b'~', &both_cases(b"DE"), 0.6);
        set.insert_rule(b'p', &both_cases(b"NQST"), 0.6);
        set.insert_rule(b'a', &both_cases(b"FWY"), 0.6);
        set
    }

    /// Nucleotide consensus: conserved bases, then IUPAC ambiguity codes.
    pub fn nucleotide_default() -> Self {
        let mut set = Self::new(b'.');
        for &base in b"ACGTU" {
            set.insert_rule(base, &both_cases(&[base]), 0.5);
        }
        let codes: [(u8, &[u8]); 6] = [
            (b'R', b"AG"),
            (b'Y', b"CTU"),
            (b'S', b"CG"),
            (b'W', b"ATU"),
            (b'K', b"GTU"),
            (b'M', b"AC"),
        ];
        for (code, bases) in codes {
            set.insert_rule(code, &both_cases(bases), 0.75);
        }
        set.insert_rule(b'N', &both_cases(b"ACGTU"), 0.9);
        set
    }

    /// Presets only use known-good rules.
    fn insert_rule(&mut self, symbol: u8, characters: &[u8], threshold: f64) {
        if let Ok(rule) = SymbolRule::new(symbol, characters, threshold) {
            self.insert(rule);
        }
    }

    /// Adds a rule, replacing any rule with the same symbol. Returns the
    /// replaced rule.
    pub fn insert(&mut self, rule: SymbolRule) -> Option<SymbolRule> {
        let serial = self.next_serial;
        self.next_serial += 1;
        log::trace!("rule {} gets serial {}", rule, serial);
        self.rules
            .insert(rule.symbol, Entry { rule, serial })
            .map(|e| e.rule)
    }

    /// Removes the rule for `symbol`.
    pub fn remove(&mut self, symbol: u8) -> Option<SymbolRule> {
        self.rules.remove(&symbol).map(|e| e.rule)
    }

    pub fn get(&self, symbol: u8) -> Option<&SymbolRule> {
        self.rules.get(&symbol).map(|e| &e.rule)
    }

    /// Insertion-order serial of the rule for `symbol`; lower is earlier.
    pub fn serial_number(&self, symbol: u8) -> Option<u64> {
        self.rules.get(&symbol).map(|e| e.serial)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn default_symbol(&self) -> u8 {
        self.default_symbol
    }

    pub fn set_default_symbol(&mut self, symbol: u8) -> Result<(), RuleError> {
        check_symbol(symbol)?;
        self.default_symbol = symbol;
        Ok(())
    }

    /// Rules in insertion order.
    pub fn rules(&self) -> Vec<&SymbolRule> {
        let mut entries: Vec<&Entry> = self.rules.values().collect();
        entries.sort_by_key(|e| e.serial);
        entries.into_iter().map(|e| &e.rule).collect()
    }

    /// Consensus symbol of one column.
    pub fn symbol_for(&self, column: &CharProportionMap) -> u8 {
        let mut best: Option<(f64, u64, u8)> = None;
        for entry in self.rules.values() {
            let sum = entry.rule.proportion(column);
            if sum < entry.rule.threshold {
                continue;
            }
            let effective = sum / entry.rule.characters.len() as f64;
            let wins = match best {
                None => true,
                Some((eff, serial, _)) => match effective.partial_cmp(&eff) {
                    Some(Ordering::Greater) => true,
                    Some(Ordering::Equal) => entry.serial < serial,
                    _ => false,
                },
            };
            if wins {
                best = Some((effective, entry.serial, entry.rule.symbol));
            }
        }
        best.map_or(self.default_symbol, |(_, _, symbol)| symbol)
    }

    /// Consensus symbols of consecutive columns.
    pub fn symbol_string(&self, columns: &[CharProportionMap]) -> Vec<u8> {
        columns.iter().map(|c| self.symbol_for(c)).collect()
    }
}

fn both_cases(chars: &[u8]) -> Vec<u8> {
    chars
        .iter()
        .flat_map(|c| [c.to_ascii_uppercase(), c.to_ascii_lowercase()])
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column(pairs: &[(u8, f64)]) -> CharProportionMap {
        pairs.iter().copied().collect()
    }

    fn rule(symbol: u8, chars: &[u8], threshold: f64) -> SymbolRule {
        SymbolRule::new(symbol, chars, threshold).unwrap()
    }

    #[test]
    fn test_specific_rule_beats_broad_rule() {
        let mut set = SymbolRuleSet::new(b' ');
        set.insert(rule(b'#', b"ACFHILMVWY", 0.5));
        set.insert(rule(b'A', b"A", 0.5));
        let col = column(&[(b'A', 0.6), (b'C', 0.4)]);
        assert_eq!(set.symbol_for(&col), b'A');
    }

    #[test]
    fn test_single_match_and_default() {
        let mut set = SymbolRuleSet::new(b'.');
        set.insert(rule(b'#', b"ACFHILMVWY", 0.5));
        set.insert(rule(b'A', b"A", 0.7));
        assert_eq!(set.symbol_for(&column(&[(b'A', 0.6), (b'C', 0.4)])), b'#');
        assert_eq!(set.symbol_for(&column(&[(b'G', 0.9)])), b'.');
        assert_eq!(set.symbol_for(&column(&[])), b'.');
    }

    #[test]
    fn test_tie_goes_to_earliest_rule() {
        let col = column(&[(b'A', 0.5), (b'C', 0.5)]);

        let mut set = SymbolRuleSet::new(b' ');
        set.insert(rule(b'x', b"A", 0.5));
        set.insert(rule(b'z', b"W", 0.1));
        set.remove(b'z');
        set.insert(rule(b'q', b"K", 0.2));
        set.insert(rule(b'y', b"C", 0.5));
        assert_eq!(set.symbol_for(&col), b'x');

        let mut set = SymbolRuleSet::new(b' ');
        set.insert(rule(b'y', b"C", 0.5));
        set.insert(rule(b'x', b"A", 0.5));
        assert_eq!(set.symbol_for(&col), b'y');
    }

    #[test]
    fn test_reinsert_gets_later_serial() {
        let mut set = SymbolRuleSet::new(b' ');
        set.insert(rule(b'x', b"A", 0.5));
        set.insert(rule(b'y', b"C", 0.5));
        assert!(set.serial_number(b'x') < set.serial_number(b'y'));

        let old = set.insert(rule(b'x', b"A", 0.4));
        assert_eq!(old.map(|r| r.threshold()), Some(0.5));
        assert!(set.serial_number(b'x') > set.serial_number(b'y'));
        assert_eq!(set.symbol_for(&column(&[(b'A', 0.5), (b'C', 0.5)])), b'y');
        assert_eq!(set.rules().iter().map(|r| r.symbol()).collect::<Vec<_>>(), vec![b'y', b'x']);
    }

    #[test]
    fn test_rule_validation() {
        assert_eq!(SymbolRule::new(b'x', b"A", 1.5), Err(RuleError::InvalidThreshold(1.5)));
        assert_eq!(SymbolRule::new(b'x', b"", 0.5), Err(RuleError::EmptyCharacterSet('x')));
        assert_eq!(SymbolRule::new(b'\n', b"A", 0.5), Err(RuleError::InvalidSymbol(b'\n')));
        assert!(SymbolRule::new(b'x', b"A", f64::NAN).is_err());
        assert_eq!(rule(b'x', b"AAC", 0.5).characters().len(), 2);
    }

    #[test]
    fn test_presets() {
        let aa = SymbolRuleSet::amino_acid_default();
        assert_eq!(aa.symbol_for(&column(&[(b'L', 0.9)])), b'L');
        assert_eq!(aa.symbol_for(&column(&[(b'L', 0.3), (b'I', 0.3)])), b'#');
        assert_eq!(aa.symbol_for(&column(&[(b'K', 0.4), (b'R', 0.3)])), b'+');
        assert_eq!(aa.symbol_for(&column(&[(b'G', 0.2)])), b'.');

        let nt = SymbolRuleSet::nucleotide_default();
        assert_eq!(nt.symbol_for(&column(&[(b'a', 1.0)])), b'A');
        assert_eq!(nt.symbol_for(&column(&[(b'A', 0.4), (b'G', 0.4)])), b'R');
        assert_eq!(
            nt.symbol_string(&[column(&[(b'C', 0.75)]), column(&[])]),
            b"C.".to_vec()
        );
    }
}
