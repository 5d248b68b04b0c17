//! Edit session controller.
//!
//! This module ties the pieces together:
//! - an [`Alignment`] that records events as it is edited
//! - the [`LiveDistribution`] fed from those events
//! - an optional [`LiveSymbolString`] (consensus) fed from the distribution
//!
//! All edits go through [`EditSession::edit`]. Once the closure returns,
//! every queued alignment event is routed down the chain in order and each
//! event of each level is handed to the subscribed listeners.

use crate::alignment::Alignment;
use crate::event::{AlignmentEvent, DistributionEvent, SymbolStringEvent};
use crate::live_distribution::{from_scratch, LiveDistribution};
use crate::live_symbols::LiveSymbolString;
use crate::model::{SequenceType, DEFAULT_GAP};
use crate::symbol_rules::SymbolRuleSet;

/// Session settings.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Gap byte written by edits
    pub gap_char: u8,
    /// Consensus rules, `None` to skip the consensus
    pub rules: Option<SymbolRuleSet>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            gap_char: DEFAULT_GAP,
            rules: None,
        }
    }
}

impl SessionConfig {
    /// Picks the consensus preset matching an alphabet.
    pub fn for_sequence_type(sequence_type: SequenceType) -> Self {
        let rules = match sequence_type {
            SequenceType::Nucleotide => SymbolRuleSet::nucleotide_default(),
            SequenceType::AminoAcid | SequenceType::Unknown => SymbolRuleSet::amino_acid_default(),
        };
        Self {
            rules: Some(rules),
            ..Self::default()
        }
    }
}

/// Anything a listener can be told about.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    Alignment(AlignmentEvent),
    Distribution(DistributionEvent),
    Consensus(SymbolStringEvent),
}

/// Callback registered with [`EditSession::subscribe`].
pub type Listener = Box<dyn FnMut(&SessionEvent)>;

/// An alignment together with the live views derived from it.
pub struct EditSession {
    /// The document being edited
    alignment: Alignment,
    /// Column counts
    distribution: LiveDistribution,
    /// Consensus line
    consensus: Option<LiveSymbolString>,
    /// Subscribers, called in registration order
    listeners: Vec<Listener>,
}

impl EditSession {
    /// Starts a session. Events already queued on `alignment` are dropped:
    /// the live views are built from its current content.
    ///
    /// A `gap_char` that is not a gap is ignored and the alignment keeps
    /// its own.
    pub fn new(mut alignment: Alignment, config: SessionConfig) -> Self {
        let stale = alignment.take_events();
        if !stale.is_empty() {
            log::debug!("dropping {} events queued before the session", stale.len());
        }
        if let Err(e) = alignment.set_gap_char(config.gap_char) {
            log::warn!("{}, keeping {:?}", e, alignment.gap_char() as char);
        }

        let distribution = LiveDistribution::new(&alignment);
        let consensus = config
            .rules
            .map(|rules| LiveSymbolString::new(&distribution, rules));
        log::debug!(
            "session over {} rows x {} columns, consensus {}",
            alignment.row_count(),
            alignment.length(),
            if consensus.is_some() { "on" } else { "off" }
        );

        Self {
            alignment,
            distribution,
            consensus,
            listeners: Vec::new(),
        }
    }

    pub fn alignment(&self) -> &Alignment {
        &self.alignment
    }

    pub fn distribution(&self) -> &LiveDistribution {
        &self.distribution
    }

    pub fn consensus(&self) -> Option<&LiveSymbolString> {
        self.consensus.as_ref()
    }

    /// Ends the session and hands back the alignment.
    pub fn into_alignment(self) -> Alignment {
        self.alignment
    }

    /// Registers a listener for every event of every level.
    pub fn subscribe<F>(&mut self, listener: F)
    where
        F: FnMut(&SessionEvent) + 'static,
    {
        self.listeners.push(Box::new(listener));
    }

    /// Runs an edit against the alignment, then brings the live views up
    /// to date.
    ///
    /// The closure must leave the event queue alone; events it drains never
    /// reach the live views.
    pub fn edit<T, F>(&mut self, f: F) -> T
    where
        F: FnOnce(&mut Alignment) -> T,
    {
        let out = f(&mut self.alignment);
        self.sync();
        out
    }

    /// Replaces (or removes) the consensus rules.
    pub fn set_rules(&mut self, rules: Option<SymbolRuleSet>) {
        let Some(rules) = rules else {
            self.consensus = None;
            return;
        };
        match self.consensus.as_mut() {
            Some(consensus) => {
                if let Some(event) = consensus.set_rules(&self.distribution, rules) {
                    self.notify(&SessionEvent::Consensus(event));
                }
            }
            None => self.consensus = Some(LiveSymbolString::new(&self.distribution, rules)),
        }
    }

    /// Compares the live views with a recount from the alignment.
    pub fn is_consistent(&self) -> bool {
        if self.distribution.distribution() != &from_scratch(&self.alignment)
            || self.distribution.divisor() != self.alignment.row_count()
        {
            return false;
        }
        match &self.consensus {
            Some(live) => {
                let fresh = LiveSymbolString::new(&self.distribution, live.rules().clone());
                fresh.as_bytes() == live.as_bytes()
            }
            None => true,
        }
    }

    /// Routes queued alignment events down the chain. Returns how many
    /// alignment events were processed.
    fn sync(&mut self) -> usize {
        let events = self.alignment.take_events();
        for event in &events {
            let dist_events = self.distribution.apply(event);
            self.notify(&SessionEvent::Alignment(event.clone()));

            for dist_event in dist_events {
                let symbol_event = self
                    .consensus
                    .as_mut()
                    .and_then(|c| c.apply(&self.distribution, &dist_event));
                self.notify(&SessionEvent::Distribution(dist_event));
                if let Some(symbol_event) = symbol_event {
                    self.notify(&SessionEvent::Consensus(symbol_event));
                }
            }
        }
        debug_assert_eq!(self.distribution.len(), self.alignment.length());
        events.len()
    }

    fn notify(&mut self, event: &SessionEvent) {
        for listener in &mut self.listeners {
            listener(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::alignment::tests::alignment;
    use crate::alignment::EditError;
    use crate::coords::ClosedRange;

    #[test]
    fn test_session_routes_events() {
        let aln = alignment(&["AC-T", "AG-T", "AC-T"]);
        let config = SessionConfig::for_sequence_type(SequenceType::Nucleotide);
        let mut session = EditSession::new(aln, config);
        assert_eq!(session.consensus().unwrap().as_str(), "AC.T");

        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        session.subscribe(move |e| sink.borrow_mut().push(e.clone()));

        let range = session
            .edit(|aln| aln.insert_gap_columns(1, 2, b'-'))
            .unwrap();
        assert_eq!(range, ClosedRange::new(1, 2));
        assert_eq!(
            *seen.borrow(),
            vec![
                SessionEvent::Alignment(AlignmentEvent::GapColumnsInserted { columns: range }),
                SessionEvent::Distribution(DistributionEvent::ColumnsInserted(range)),
                SessionEvent::Consensus(SymbolStringEvent::SymbolsInserted(range)),
            ]
        );
        assert_eq!(session.consensus().unwrap().as_str(), "..AC.T");
        assert!(session.is_consistent());
    }

    #[test]
    fn test_failed_edit_emits_nothing() {
        let mut session = EditSession::new(alignment(&["AC"]), SessionConfig::default());
        let count = Rc::new(RefCell::new(0));
        let sink = Rc::clone(&count);
        session.subscribe(move |_| *sink.borrow_mut() += 1);

        assert!(session.edit(|aln| aln.swap(1, 3)).is_err());
        assert_eq!(*count.borrow(), 0);
        assert!(session.consensus().is_none());
    }

    #[test]
    fn test_set_rules() {
        let mut session = EditSession::new(alignment(&["AC", "AC"]), SessionConfig::default());
        session.set_rules(Some(SymbolRuleSet::nucleotide_default()));
        assert_eq!(session.consensus().unwrap().as_str(), "AC");
        session.set_rules(Some(SymbolRuleSet::new(b'*')));
        assert_eq!(session.consensus().unwrap().as_str(), "**");
        session.set_rules(None);
        assert!(session.consensus().is_none());
        assert!(session.is_consistent());
    }

    #[test]
    fn test_gap_char_from_config() {
        let config = SessionConfig {
            gap_char: b'.',
            rules: None,
        };
        let mut session = EditSession::new(alignment(&["AC"]), config);
        session.edit(|aln| aln.insert_gap_columns(-1, 1, aln.gap_char())).unwrap();
        assert_eq!(session.alignment().at(1, -1), Some(b'.'));
    }

    #[test]
    fn test_residue_gap_char_is_ignored() {
        let config = SessionConfig {
            gap_char: b'X',
            rules: Some(SymbolRuleSet::nucleotide_default()),
        };
        let mut session = EditSession::new(alignment(&["AC-T", "A--T"]), config);
        assert_eq!(session.alignment().gap_char(), b'-');

        session.edit(|aln| aln.insert_gap_columns(1, 1, aln.gap_char())).unwrap();
        assert_eq!(session.alignment().row(1).unwrap().as_str(), "-AC-T");
        assert_eq!(
            session.edit(|aln| aln.insert_gap_columns(1, 1, b'X')),
            Err(EditError::InvalidGapChar('X'))
        );
        assert!(session.is_consistent());
    }
}
