//! State machine for chat status transitions
//!
//! Lifecycle: a new chat waits for the worker, who accepts or refuses.
//! An accepted chat may fall back to the suggestion flow and is closed by
//! completing the booking. Refused and completed chats are absorbing.

pub use quickfix_common::StateError;

use super::entities::ChatStatus;

impl ChatStatus {
    /// Check if this is a terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::WorkerRefused | Self::Completed)
    }

    /// Get all valid next states from current state
    pub fn valid_transitions(&self) -> &'static [ChatStatus] {
        match self {
            Self::WaitingForResponse => &[
                Self::Accepted,
                Self::WorkerRefused,
                Self::GettingSuggestions,
            ],
            Self::Accepted => &[Self::GettingSuggestions, Self::Completed],
            Self::GettingSuggestions => &[Self::Accepted],
            Self::WorkerRefused => &[],
            Self::Completed => &[],
        }
    }
}

/// Events that trigger chat state transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatEvent {
    /// Worker accepts the request
    Accept,
    /// Worker refuses the request
    Refuse,
    /// Worker proposes alternatives instead of a plain accept
    OfferSuggestions,
    /// A participant replies while suggestions are open
    Reply,
    /// The linked booking is finished
    CompleteBooking,
}

impl std::fmt::Display for ChatEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Accept => write!(f, "accept"),
            Self::Refuse => write!(f, "refuse"),
            Self::OfferSuggestions => write!(f, "offer_suggestions"),
            Self::Reply => write!(f, "reply"),
            Self::CompleteBooking => write!(f, "complete_booking"),
        }
    }
}

/// Chat state machine
pub struct ChatStateMachine;

impl ChatStateMachine {
    /// Attempt a state transition
    ///
    /// Returns the new state if the transition is valid, or an error otherwise.
    pub fn transition(current: ChatStatus, event: ChatEvent) -> Result<ChatStatus, StateError> {
        if current.is_terminal() {
            return Err(StateError::TerminalState(current.to_string()));
        }

        let next = match (&current, &event) {
            // From WaitingForResponse
            (ChatStatus::WaitingForResponse, ChatEvent::Accept) => ChatStatus::Accepted,
            (ChatStatus::WaitingForResponse, ChatEvent::Refuse) => ChatStatus::WorkerRefused,
            (ChatStatus::WaitingForResponse, ChatEvent::OfferSuggestions) => {
                ChatStatus::GettingSuggestions
            }

            // From Accepted
            (ChatStatus::Accepted, ChatEvent::OfferSuggestions) => ChatStatus::GettingSuggestions,
            (ChatStatus::Accepted, ChatEvent::CompleteBooking) => ChatStatus::Completed,

            // From GettingSuggestions
            (ChatStatus::GettingSuggestions, ChatEvent::Reply) => ChatStatus::Accepted,

            _ => {
                return Err(StateError::InvalidTransition {
                    from: current.to_string(),
                    to: "unknown".to_string(),
                    event: event.to_string(),
                });
            }
        };

        Ok(next)
    }

    /// Move to an explicit target status, picking the event that leads there
    pub fn transition_to(current: ChatStatus, target: ChatStatus) -> Result<ChatStatus, StateError> {
        let event = match target {
            ChatStatus::Accepted if current == ChatStatus::GettingSuggestions => ChatEvent::Reply,
            ChatStatus::Accepted => ChatEvent::Accept,
            ChatStatus::WorkerRefused => ChatEvent::Refuse,
            ChatStatus::GettingSuggestions => ChatEvent::OfferSuggestions,
            ChatStatus::Completed => ChatEvent::CompleteBooking,
            ChatStatus::WaitingForResponse => {
                if current.is_terminal() {
                    return Err(StateError::TerminalState(current.to_string()));
                }
                return Err(StateError::InvalidTransition {
                    from: current.to_string(),
                    to: target.to_string(),
                    event: "none".to_string(),
                });
            }
        };

        match Self::transition(current, event) {
            Ok(next) if next == target => Ok(next),
            Ok(_) | Err(StateError::InvalidTransition { .. }) => {
                Err(StateError::InvalidTransition {
                    from: current.to_string(),
                    to: target.to_string(),
                    event: event.to_string(),
                })
            }
            Err(other) => Err(other),
        }
    }

    /// Status after a message is appended.
    ///
    /// Replying during the suggestion flow accepts the chat; absorbing
    /// chats take no new messages.
    pub fn on_message_sent(current: ChatStatus) -> Result<ChatStatus, StateError> {
        match current {
            ChatStatus::GettingSuggestions => Self::transition(current, ChatEvent::Reply),
            status if status.is_terminal() => Err(StateError::TerminalState(status.to_string())),
            status => Ok(status),
        }
    }

    /// Check if a transition is valid without performing it
    pub fn can_transition(current: ChatStatus, event: ChatEvent) -> bool {
        Self::transition(current, event).is_ok()
    }
}
