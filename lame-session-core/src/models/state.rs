use crate::contract::return_code::EngineFailure;

/// Encoder session state machine.
///
/// State transitions:
/// ```text
/// active → flushed → closed
///   ↓                  ↑
/// failed ──────────────┘
/// ```
/// `active` and `flushed` may also go straight to `closed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Active,
    Flushed,
    Failed(EngineFailure),
    Closed,
}

impl SessionState {
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }

    pub fn is_flushed(&self) -> bool {
        matches!(self, Self::Flushed)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    pub fn is_closed(&self) -> bool {
        matches!(self, Self::Closed)
    }

    /// No further input is accepted in a terminal state.
    pub fn is_terminal(&self) -> bool {
        !self.is_active()
    }
}
