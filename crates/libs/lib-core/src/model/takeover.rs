//! # Takeover State Machine
//!
//! Decides who answers a new customer message in a session. Persisted as two flags
//! (`ai_enabled`, `merchant_took_over`) for wire compatibility, handled here as a
//! [`ControlMode`]:
//!
//! | from          | command   | to                                             |
//! |---------------|-----------|------------------------------------------------|
//! | `AiActive`    | takeover  | `HumanActive`                                  |
//! | `AiDisabled`  | takeover  | `HumanActive`                                  |
//! | `HumanActive` | release   | `AiActive` if `ai_enabled`, else `AiDisabled`  |
//! | `HumanActive` | takeover  | unchanged                                      |
//! | `AiActive`    | release   | unchanged                                      |
//! | `AiDisabled`  | release   | unchanged                                      |
//!
//! Only merchant commands move a session between modes. Customer and AI messages never do.

use serde::{Deserialize, Serialize};

/// Who currently owns a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlMode {
    /// The AI responder answers customer messages.
    AiActive,
    /// A merchant took over; AI replies are suppressed.
    HumanActive,
    /// Nobody answers automatically and no merchant has claimed the session.
    AiDisabled,
}

/// Merchant-issued ownership commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TakeoverCommand {
    Takeover,
    Release,
}

/// Result of applying a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: ControlMode,
    pub to: ControlMode,
}

impl Transition {
    pub fn changed(&self) -> bool {
        self.from != self.to
    }

    /// Value of `merchant_took_over` after the transition.
    pub fn merchant_took_over(&self) -> bool {
        self.to == ControlMode::HumanActive
    }
}

impl ControlMode {
    /// Initial mode of every new session.
    pub const INITIAL: ControlMode = ControlMode::AiActive;

    /// Derive the mode from the persisted flags. `merchant_took_over` wins over `ai_enabled`.
    pub fn from_flags(ai_enabled: bool, merchant_took_over: bool) -> Self {
        match (ai_enabled, merchant_took_over) {
            (_, true) => ControlMode::HumanActive,
            (true, false) => ControlMode::AiActive,
            (false, false) => ControlMode::AiDisabled,
        }
    }

    /// Whether a new customer message should be answered by the AI responder.
    pub fn ai_replies(&self) -> bool {
        matches!(self, ControlMode::AiActive)
    }

    /// Apply a merchant command. `ai_enabled` is read, never changed.
    pub fn apply(self, command: TakeoverCommand, ai_enabled: bool) -> Transition {
        let to = match (self, command) {
            (_, TakeoverCommand::Takeover) => ControlMode::HumanActive,
            (ControlMode::HumanActive, TakeoverCommand::Release) => {
                ControlMode::from_flags(ai_enabled, false)
            }
            (mode, TakeoverCommand::Release) => mode,
        };

        Transition { from: self, to }
    }
}
