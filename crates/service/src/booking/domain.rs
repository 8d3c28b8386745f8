use std::{fmt, str::FromStr};

use models::booking::BookingStatus;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingAction {
    Cancel,
    Confirm,
    Reject,
    Complete,
}

impl BookingAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingAction::Cancel => "cancel",
            BookingAction::Confirm => "confirm",
            BookingAction::Reject => "reject",
            BookingAction::Complete => "complete",
        }
    }
}

impl fmt::Display for BookingAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

impl FromStr for BookingAction {
    type Err = TransitionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cancel" => Ok(BookingAction::Cancel),
            "confirm" => Ok(BookingAction::Confirm),
            "reject" => Ok(BookingAction::Reject),
            "complete" => Ok(BookingAction::Complete),
            other => Err(TransitionError::UnknownAction(other.to_string())),
        }
    }
}

/// How the acting user relates to a booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub is_customer: bool,
    pub is_owner: bool,
}

impl Actor {
    pub fn for_booking(user_id: uuid::Uuid, booking: &models::booking::Model) -> Self {
        Self { is_customer: booking.customer_id == user_id, is_owner: booking.owner_id == user_id }
    }

    pub fn is_party(&self) -> bool { self.is_customer || self.is_owner }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("unknown booking action '{0}'")]
    UnknownAction(String),
    #[error("not a party to this booking")]
    NotAParty,
    #[error("{actor} may not {action} a booking")]
    NotAllowed { action: BookingAction, actor: &'static str },
    #[error("cannot {action} a booking that is {from}")]
    InvalidState { action: BookingAction, from: BookingStatus },
}

/// Apply `action` by `actor` to a booking currently in `from`.
///
/// | action   | actor             | from                | to        |
/// |----------|-------------------|---------------------|-----------|
/// | cancel   | customer          | pending, confirmed  | cancelled |
/// | confirm  | owner             | pending             | confirmed |
/// | reject   | owner             | pending             | rejected  |
/// | complete | customer or owner | confirmed           | completed |
///
/// Permission is checked before the prior status.
pub fn transition(action: BookingAction, actor: Actor, from: BookingStatus) -> Result<BookingStatus, TransitionError> {
    use BookingAction::*;
    use BookingStatus::*;

    if !actor.is_party() {
        return Err(TransitionError::NotAParty);
    }
    let permitted = match action {
        Cancel => actor.is_customer,
        Confirm | Reject => actor.is_owner,
        Complete => true,
    };
    if !permitted {
        let who = if actor.is_owner { "service owner" } else { "customer" };
        return Err(TransitionError::NotAllowed { action, actor: who });
    }
    match (action, from) {
        (Cancel, Pending | Confirmed) => Ok(Cancelled),
        (Confirm, Pending) => Ok(Confirmed),
        (Reject, Pending) => Ok(Rejected),
        (Complete, Confirmed) => Ok(Completed),
        _ => Err(TransitionError::InvalidState { action, from }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use BookingAction::*;
    use BookingStatus::*;

    const CUSTOMER: Actor = Actor { is_customer: true, is_owner: false };
    const OWNER: Actor = Actor { is_customer: false, is_owner: true };
    const STRANGER: Actor = Actor { is_customer: false, is_owner: false };

    #[test]
    fn customer_cancels_pending_or_confirmed() {
        assert_eq!(transition(Cancel, CUSTOMER, Pending), Ok(Cancelled));
        assert_eq!(transition(Cancel, CUSTOMER, Confirmed), Ok(Cancelled));
        assert!(matches!(transition(Cancel, CUSTOMER, Completed), Err(TransitionError::InvalidState { .. })));
    }

    #[test]
    fn owner_cannot_cancel() {
        assert!(matches!(transition(Cancel, OWNER, Pending), Err(TransitionError::NotAllowed { .. })));
    }

    #[test]
    fn owner_confirms_or_rejects_pending_only() {
        assert_eq!(transition(Confirm, OWNER, Pending), Ok(Confirmed));
        assert_eq!(transition(Reject, OWNER, Pending), Ok(Rejected));
        assert!(matches!(transition(Confirm, OWNER, Confirmed), Err(TransitionError::InvalidState { .. })));
        assert!(matches!(transition(Reject, OWNER, Cancelled), Err(TransitionError::InvalidState { .. })));
    }

    #[test]
    fn customer_cannot_confirm_or_reject() {
        assert!(matches!(transition(Confirm, CUSTOMER, Pending), Err(TransitionError::NotAllowed { .. })));
        assert!(matches!(transition(Reject, CUSTOMER, Pending), Err(TransitionError::NotAllowed { .. })));
    }

    #[test]
    fn either_party_completes_confirmed() {
        assert_eq!(transition(Complete, CUSTOMER, Confirmed), Ok(Completed));
        assert_eq!(transition(Complete, OWNER, Confirmed), Ok(Completed));
        assert!(matches!(transition(Complete, OWNER, Pending), Err(TransitionError::InvalidState { .. })));
    }

    #[test]
    fn strangers_are_refused_before_state_checks() {
        for action in [Cancel, Confirm, Reject, Complete] {
            assert_eq!(transition(action, STRANGER, Pending), Err(TransitionError::NotAParty));
        }
    }

    #[test]
    fn terminal_states_accept_nothing() {
        for from in [Rejected, Cancelled, Completed] {
            for (action, actor) in [(Cancel, CUSTOMER), (Confirm, OWNER), (Reject, OWNER), (Complete, OWNER)] {
                assert!(transition(action, actor, from).is_err(), "{action} from {from}");
            }
        }
    }

    #[test]
    fn action_parses_from_path_segment() {
        assert_eq!("confirm".parse::<BookingAction>(), Ok(Confirm));
        assert!(matches!("archive".parse::<BookingAction>(), Err(TransitionError::UnknownAction(_))));
    }
}
