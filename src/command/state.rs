//! Dispatch state machine.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Phase of a single command invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchState {
    /// Invocation created, nothing evaluated yet.
    Start,
    /// Evaluating the command's requirement.
    PermissionCheck,
    /// Requirement failed.
    RejectedPerms,
    /// Trying the signature's configurations.
    ArgumentCheck,
    /// No configuration matched.
    RejectedArgs,
    /// Running the command body.
    Executing,
    /// Body returned normally.
    Succeeded,
    /// Body returned an error or panicked.
    Failed,
}

impl DispatchState {
    /// Check if this state allows transitioning to another state.
    pub fn can_transition_to(&self, target: DispatchState) -> bool {
        use DispatchState::*;

        matches!(
            (self, target),
            (Start, PermissionCheck)
                | (PermissionCheck, RejectedPerms)
                | (PermissionCheck, ArgumentCheck)
                | (ArgumentCheck, RejectedArgs)
                | (ArgumentCheck, Executing)
                | (Executing, Succeeded)
                | (Executing, Failed)
        )
    }

    /// Check if this is a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::RejectedPerms | Self::RejectedArgs | Self::Succeeded | Self::Failed
        )
    }
}

impl fmt::Display for DispatchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Start => "start",
            Self::PermissionCheck => "permission_check",
            Self::RejectedPerms => "rejected_perms",
            Self::ArgumentCheck => "argument_check",
            Self::RejectedArgs => "rejected_args",
            Self::Executing => "executing",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
        };
        write!(f, "{s}")
    }
}
