use ludo_core::*;
use serde::Deserialize;
use serde::Serialize;

/// A semantic game event, kept purely for observability and UI replay.
/// Engine logic never consults the history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum HistoryKind {
    Dice {
        player: Color,
        value: DiceValue,
        detail: String,
    },
    Capture {
        player: Color,
        victim: Color,
        token: String,
        location: usize,
    },
    Finish {
        player: Color,
        token: String,
    },
    Bonus {
        player: Color,
        detail: String,
    },
    Win {
        player: Color,
    },
    System {
        message: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    #[serde(flatten)]
    pub kind: HistoryKind,
    pub at: u64,
}

/// Append-only bounded event log. Holds at most [`HISTORY_CAP`] entries;
/// state snapshots expose only the last [`HISTORY_TAIL`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct History {
    entries: Vec<HistoryEntry>,
}

impl History {
    pub fn record(&mut self, kind: HistoryKind) {
        self.entries.push(HistoryEntry {
            kind,
            at: now_millis(),
        });
        if self.entries.len() > HISTORY_CAP {
            self.entries.remove(0);
        }
    }
    /// Last [`HISTORY_TAIL`] entries, oldest first.
    pub fn tail(&self) -> &[HistoryEntry] {
        let skip = self.entries.len().saturating_sub(HISTORY_TAIL);
        &self.entries[skip..]
    }
    pub fn len(&self) -> usize {
        self.entries.len()
    }
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    fn system(i: usize) -> HistoryKind {
        HistoryKind::System {
            message: format!("entry {}", i),
        }
    }
    #[test]
    fn log_is_capped() {
        let mut history = History::default();
        for i in 0..(HISTORY_CAP + 10) {
            history.record(system(i));
        }
        assert_eq!(history.len(), HISTORY_CAP);
        // oldest entries were dropped
        assert_eq!(
            history.tail().last().map(|e| &e.kind),
            Some(&system(HISTORY_CAP + 9))
        );
    }
    #[test]
    fn tail_is_at_most_ten() {
        let mut history = History::default();
        for i in 0..3 {
            history.record(system(i));
        }
        assert_eq!(history.tail().len(), 3);
        for i in 3..30 {
            history.record(system(i));
        }
        assert_eq!(history.tail().len(), HISTORY_TAIL);
    }
}
