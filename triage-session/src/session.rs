use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::context::Context;

/// Linear chat-flow phase for the kiosk UI.
///
/// The flow only ever moves forward; going back to `Initial` requires an
/// explicit session reset ("start new assessment").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Phase {
    Initial,
    Chat,
    Selection,
    Confirmation,
    ReadyForTests,
}

impl Phase {
    /// Next phase in the linear flow, saturating at the end
    pub fn advance(self) -> Self {
        match self {
            Phase::Initial => Phase::Chat,
            Phase::Chat => Phase::Selection,
            Phase::Selection => Phase::Confirmation,
            Phase::Confirmation => Phase::ReadyForTests,
            Phase::ReadyForTests => Phase::ReadyForTests,
        }
    }

    pub fn is_terminal(self) -> bool {
        self == Phase::ReadyForTests
    }
}

impl Default for Phase {
    fn default() -> Self {
        Phase::Initial
    }
}

/// One kiosk visitor's conversation state.
///
/// Accumulated symptoms and previously shown recommendations grow
/// monotonically across turns; nothing is removed except by [`Session::reset`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub phase: Phase,
    /// Deduplicated symptoms in first-seen order
    pub symptoms: Vec<String>,
    /// Test names already recommended in this session
    pub recommended: Vec<String>,
    #[serde(skip)]
    pub context: Context,
}

impl Session {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            created_at: Utc::now(),
            phase: Phase::Initial,
            symptoms: Vec::new(),
            recommended: Vec::new(),
            context: Context::new(),
        }
    }

    /// Merge newly extracted symptoms into the accumulated set.
    ///
    /// Deduplication is case-insensitive and first occurrence wins, so the
    /// accumulated list is monotonically non-decreasing across turns.
    /// Returns how many symptoms were actually new.
    pub fn add_symptoms<I>(&mut self, found: I) -> usize
    where
        I: IntoIterator<Item = String>,
    {
        let mut added = 0;
        for symptom in found {
            let lowered = symptom.to_lowercase();
            if !self
                .symptoms
                .iter()
                .any(|known| known.to_lowercase() == lowered)
            {
                self.symptoms.push(symptom);
                added += 1;
            }
        }
        added
    }

    /// Remember which tests were shown so later prompts can avoid repeats
    pub fn record_recommendations<I>(&mut self, names: I)
    where
        I: IntoIterator<Item = String>,
    {
        for name in names {
            let lowered = name.to_lowercase();
            if !self
                .recommended
                .iter()
                .any(|known| known.to_lowercase() == lowered)
            {
                self.recommended.push(name);
            }
        }
    }

    pub fn advance_phase(&mut self) -> Phase {
        self.phase = self.phase.advance();
        self.phase
    }

    /// "Start new assessment": back to `Initial` with all state cleared
    pub fn reset(&mut self) {
        debug!(session_id = %self.id, "resetting session");
        self.phase = Phase::Initial;
        self.symptoms.clear();
        self.recommended.clear();
        self.context = Context::new();
    }
}
