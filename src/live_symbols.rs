//! Consensus string kept in step with a live distribution.

use std::borrow::Cow;

use crate::coords::ClosedRange;
use crate::event::{DistributionEvent, SymbolStringEvent};
use crate::live_distribution::LiveDistribution;
use crate::symbol_rules::SymbolRuleSet;

/// One consensus symbol per distribution column.
///
/// The events returned by one [`LiveDistribution::apply`] call must be
/// applied here, in order, before the distribution changes again.
#[derive(Debug, Clone)]
pub struct LiveSymbolString {
    rules: SymbolRuleSet,
    symbols: Vec<u8>,
}

impl LiveSymbolString {
    /// Computes the full string for the current distribution.
    pub fn new(source: &LiveDistribution, rules: SymbolRuleSet) -> Self {
        let mut live = Self {
            rules,
            symbols: Vec::new(),
        };
        live.recompute(source);
        live
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.symbols
    }

    pub fn as_str(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.symbols)
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn rules(&self) -> &SymbolRuleSet {
        &self.rules
    }

    /// Swaps the rule set and recomputes every symbol.
    pub fn set_rules(
        &mut self,
        source: &LiveDistribution,
        rules: SymbolRuleSet,
    ) -> Option<SymbolStringEvent> {
        self.rules = rules;
        self.recompute(source);
        let len = self.symbols.len();
        (len > 0).then(|| SymbolStringEvent::SymbolsChanged(ClosedRange::with_len(1, len)))
    }

    fn recompute(&mut self, source: &LiveDistribution) {
        self.symbols = (1..=source.len()).map(|col| self.symbol_at(source, col)).collect();
    }

    fn symbol_at(&self, source: &LiveDistribution, column: usize) -> u8 {
        self.rules.symbol_for(&source.proportions(column))
    }

    /// Applies one distribution event and reports the positions it changed.
    ///
    /// `SymbolsChanged` is only reported when at least one symbol in the
    /// range actually differs.
    pub fn apply(
        &mut self,
        source: &LiveDistribution,
        event: &DistributionEvent,
    ) -> Option<SymbolStringEvent> {
        match *event {
            DistributionEvent::ColumnsInserted(range) => {
                let at = range.begin - 1;
                let fresh: Vec<u8> = (range.begin..=range.end)
                    .map(|col| self.symbol_at(source, col))
                    .collect();
                self.symbols.splice(at..at, fresh);
                Some(SymbolStringEvent::SymbolsInserted(range))
            }
            DistributionEvent::ColumnsRemoved(range) => {
                self.symbols.drain(range.begin - 1..range.end);
                Some(SymbolStringEvent::SymbolsRemoved(range))
            }
            DistributionEvent::DataChanged(range) => {
                let mut changed = false;
                for col in range.begin..=range.end {
                    let symbol = self.symbol_at(source, col);
                    let slot = &mut self.symbols[col - 1];
                    changed |= *slot != symbol;
                    *slot = symbol;
                }
                changed.then_some(SymbolStringEvent::SymbolsChanged(range))
            }
        }
    }
}
