// ── Loading flags ──
//
// Each loader owns one `LoadingStates`: a section → bool map plus the
// loader's own top-level flag. Consumers subscribe to a snapshot channel
// instead of polling.

use std::collections::BTreeMap;

use tokio::sync::watch;

/// Point-in-time view of a loader's flags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadingSnapshot {
    pub loading: bool,
    pub sections: BTreeMap<&'static str, bool>,
}

impl LoadingSnapshot {
    pub fn is_loading(&self, section: &str) -> bool {
        self.sections.get(section).copied().unwrap_or(false)
    }

    /// Top-level flag OR any section flag.
    pub fn any_loading(&self) -> bool {
        self.loading || self.sections.values().any(|v| *v)
    }
}

#[derive(Debug)]
pub struct LoadingStates {
    tx: watch::Sender<LoadingSnapshot>,
}

impl LoadingStates {
    /// Register the fixed set of sections, all idle.
    pub fn new(sections: &[&'static str]) -> Self {
        let snapshot = LoadingSnapshot {
            loading: false,
            sections: sections.iter().map(|s| (*s, false)).collect(),
        };
        let (tx, _) = watch::channel(snapshot);
        Self { tx }
    }

    pub fn set(&self, section: &'static str, value: bool) {
        self.tx.send_modify(|snap| {
            snap.sections.insert(section, value);
        });
    }

    pub fn set_many(&self, sections: &[&'static str], value: bool) {
        self.tx.send_modify(|snap| {
            for s in sections {
                snap.sections.insert(s, value);
            }
        });
    }

    pub fn set_loading(&self, value: bool) {
        self.tx.send_modify(|snap| snap.loading = value);
    }

    pub fn is_loading(&self, section: &str) -> bool {
        self.tx.borrow().is_loading(section)
    }

    pub fn any_loading(&self) -> bool {
        self.tx.borrow().any_loading()
    }

    pub fn snapshot(&self) -> LoadingSnapshot {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<LoadingSnapshot> {
        self.tx.subscribe()
    }
}
