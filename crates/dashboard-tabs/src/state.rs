//! Transition State Machine
//!
//! ```text
//! Idle
//!   ↓ switch (a panel is showing)       ↓ switch (nothing showing)
//! FadingOut                             │
//!   ↓ fade-out elapsed                  │
//! FadingIn  ←───────────────────────────┘
//!   ↓ fade-in elapsed
//! Idle
//! ```

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionState {
    /// No transition in flight; switch requests are accepted
    #[default]
    Idle,
    /// The outgoing panel is fading out
    FadingOut,
    /// The incoming panel is active and fading in
    FadingIn,
}

impl TransitionState {
    /// Check if transition to another state is valid
    pub fn can_transition_to(&self, target: TransitionState) -> bool {
        matches!(
            (self, target),
            (TransitionState::Idle, TransitionState::FadingOut)
                | (TransitionState::Idle, TransitionState::FadingIn)
                | (TransitionState::FadingOut, TransitionState::FadingIn)
                | (TransitionState::FadingIn, TransitionState::Idle)
        )
    }

    /// True from the start of a switch until its fade-in completes
    pub fn is_transitioning(&self) -> bool {
        !matches!(self, TransitionState::Idle)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TransitionState::Idle => "idle",
            TransitionState::FadingOut => "fading_out",
            TransitionState::FadingIn => "fading_in",
        }
    }
}

impl std::fmt::Display for TransitionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for TransitionState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "idle" => Ok(TransitionState::Idle),
            "fading_out" => Ok(TransitionState::FadingOut),
            "fading_in" => Ok(TransitionState::FadingIn),
            _ => Err(format!("Unknown transition state: {}", s)),
        }
    }
}
