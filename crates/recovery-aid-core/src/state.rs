use serde::{Deserialize, Serialize};

/// Where a session is in the submit protocol
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmitState {
    /// Answers may be edited
    #[default]
    Idle,
    Validating,
    BuildingRequest,
    AwaitingResponse,
    /// Advice received; answers are frozen
    Done,
}

impl SubmitState {
    /// Whether moving from `self` to `next` is a step of the protocol
    pub fn can_transition_to(self, next: SubmitState) -> bool {
        use SubmitState::*;
        matches!(
            (self, next),
            (Idle, Validating)
                | (Validating, BuildingRequest)
                | (Validating, Idle)
                | (BuildingRequest, AwaitingResponse)
                | (BuildingRequest, Idle)
                | (AwaitingResponse, Done)
                | (AwaitingResponse, Idle)
        )
    }

    pub fn is_done(self) -> bool {
        self == SubmitState::Done
    }
}

impl std::fmt::Display for SubmitState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SubmitState::Idle => write!(f, "idle"),
            SubmitState::Validating => write!(f, "validating"),
            SubmitState::BuildingRequest => write!(f, "building_request"),
            SubmitState::AwaitingResponse => write!(f, "awaiting_response"),
            SubmitState::Done => write!(f, "done"),
        }
    }
}
