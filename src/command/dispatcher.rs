//! The command dispatcher.
//!
//! Dispatch runs a three-phase state machine over one message:
//!
//! ```text
//! Start -> PermissionCheck -> RejectedPerms
//!                          -> ArgumentCheck -> RejectedArgs
//!                                           -> Executing -> Succeeded
//!                                                        -> Failed
//! ```
//!
//! Every transition appends exactly one entry to the invocation's trace.
//! All per-call state lives in the returned [`Invocation`]; handlers and the
//! dispatcher itself hold none, so the same handler may be dispatched
//! concurrently.

use std::panic::{AssertUnwindSafe, catch_unwind};

use serde::Serialize;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::command::declaration::CommandDeclaration;
use crate::command::state::DispatchState;
use crate::command::trace::{ExecutionLog, LogEntry};
use crate::config::DispatchConfig;
use crate::error::{DispatchError, panic_message};
use crate::message::{ChatMessage, Directory, OutgoingReply};
use crate::parameter::ParameterResult;

pub const PERMISSION_CHECK_STARTED: &str = "Permission check started";
pub const PERMISSION_CHECK_PASSED: &str = "Permission check passed";
pub const PERMISSION_CHECK_FAILED: &str = "Permission check failed";
pub const ARGUMENT_CHECK_PASSED: &str = "Argument check passed";
pub const ARGUMENT_CHECK_FAILED: &str = "Argument check failed";
pub const COMMAND_SUCCEEDED: &str = "Command executed successfully";
pub const COMMAND_FAILED: &str = "Command execution failed";

/// A command implementation: a declaration plus its body and rejection hooks.
pub trait CommandHandler: Send + Sync {
    fn declaration(&self) -> &CommandDeclaration;

    /// Command body, run once the requirement passed and a configuration matched.
    fn execute(&self, invocation: &mut Invocation<'_>) -> anyhow::Result<()>;

    /// Called when the requirement rejects the message.
    fn on_bad_permissions(&self, _invocation: &mut Invocation<'_>) {}

    /// Called when no configuration of the signature matches.
    fn on_bad_arguments(&self, _invocation: &mut Invocation<'_>) {}
}

/// Per-call dispatch context threaded through every phase and handed back
/// to the caller.
pub struct Invocation<'m> {
    id: Uuid,
    command: String,
    message: &'m ChatMessage,
    state: DispatchState,
    log: ExecutionLog,
    matched: Option<usize>,
    names: Vec<String>,
    parameters: Vec<ParameterResult>,
    replies: Vec<OutgoingReply>,
    fault: Option<anyhow::Error>,
}

impl<'m> Invocation<'m> {
    pub fn new(command: impl Into<String>, message: &'m ChatMessage, log: ExecutionLog) -> Self {
        Self {
            id: Uuid::new_v4(),
            command: command.into(),
            message,
            state: DispatchState::Start,
            log,
            matched: None,
            names: Vec::new(),
            parameters: Vec::new(),
            replies: Vec::new(),
            fault: None,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    /// The message being dispatched.
    pub fn message(&self) -> &'m ChatMessage {
        self.message
    }

    pub fn state(&self) -> DispatchState {
        self.state
    }

    pub fn log(&self) -> &ExecutionLog {
        &self.log
    }

    /// Whether the invocation ended in success.
    pub fn succeeded(&self) -> bool {
        self.log.success()
    }

    /// Index of the configuration that matched.
    pub fn matched_configuration(&self) -> Option<usize> {
        self.matched
    }

    /// Parsed parameters, in the matched configuration's declaration order.
    pub fn parameters(&self) -> &[ParameterResult] {
        &self.parameters
    }

    /// Look a parsed parameter up by name.
    pub fn arg(&self, name: &str) -> Option<&ParameterResult> {
        self.names
            .iter()
            .position(|n| n == name)
            .and_then(|i| self.parameters.get(i))
    }

    pub fn string(&self, name: &str) -> Option<&str> {
        self.arg(name).and_then(ParameterResult::as_str)
    }

    pub fn int(&self, name: &str) -> Option<i64> {
        self.arg(name).and_then(ParameterResult::as_int)
    }

    pub fn decimal(&self, name: &str) -> Option<rust_decimal::Decimal> {
        self.arg(name).and_then(ParameterResult::as_decimal)
    }

    pub fn bool(&self, name: &str) -> Option<bool> {
        self.arg(name).and_then(ParameterResult::as_bool)
    }

    /// Queue a reply in the message's channel. Delivery happens after dispatch.
    pub fn reply(&mut self, content: impl Into<String>) {
        self.replies.push(OutgoingReply {
            channel_id: self.message.channel_id,
            content: content.into(),
            reply_to: Some(self.message.id),
        });
    }

    pub fn replies(&self) -> &[OutgoingReply] {
        &self.replies
    }

    pub fn take_replies(&mut self) -> Vec<OutgoingReply> {
        std::mem::take(&mut self.replies)
    }

    /// The fault captured from a failed command body.
    pub fn fault(&self) -> Option<&anyhow::Error> {
        self.fault.as_ref()
    }

    /// The dispatch outcome as an error, `None` on success.
    pub fn error(&self) -> Option<DispatchError> {
        let command = self.command.clone();
        match self.state {
            DispatchState::RejectedPerms => Some(DispatchError::PermissionDenied { command }),
            DispatchState::RejectedArgs => Some(DispatchError::ArgumentMismatch { command }),
            DispatchState::Failed => Some(DispatchError::CommandFault {
                command,
                reason: self
                    .fault
                    .as_ref()
                    .map(|e| format!("{e:#}"))
                    .unwrap_or_default(),
            }),
            _ => None,
        }
    }

    /// Serializable summary of the invocation.
    pub fn report(&self) -> InvocationReport {
        InvocationReport {
            id: self.id,
            command: self.command.clone(),
            state: self.state,
            matched_configuration: self.matched,
            parameters: self.parameters.clone(),
            log: self.log.clone(),
        }
    }

    /// Move to `to`, recording `entry`. Invalid transitions are refused.
    fn advance(&mut self, to: DispatchState, entry: LogEntry) -> Result<(), DispatchError> {
        if !self.state.can_transition_to(to) {
            return Err(DispatchError::InvalidTransition {
                from: self.state,
                to,
            });
        }
        debug!(
            invocation = %self.id,
            command = %self.command,
            from = %self.state,
            to = %to,
            "Dispatch transition"
        );
        self.state = to;
        self.log.push(entry);
        Ok(())
    }
}

/// Serializable summary of a finished invocation.
#[derive(Debug, Clone, Serialize)]
pub struct InvocationReport {
    pub id: Uuid,
    pub command: String,
    pub state: DispatchState,
    pub matched_configuration: Option<usize>,
    pub parameters: Vec<ParameterResult>,
    pub log: ExecutionLog,
}

/// Runs handlers against messages.
#[derive(Debug, Clone, Default)]
pub struct Dispatcher {
    trace_capacity: Option<usize>,
}

impl Dispatcher {
    pub fn new(config: &DispatchConfig) -> Self {
        Self {
            trace_capacity: config.trace_capacity,
        }
    }

    /// Dispatch `message` to `handler`. Never panics and never returns an
    /// error; the outcome is in the returned invocation.
    pub fn dispatch<'m>(
        &self,
        handler: &dyn CommandHandler,
        message: &'m ChatMessage,
        directory: &dyn Directory,
    ) -> Invocation<'m> {
        let declaration = handler.declaration();
        let mut invocation = Invocation::new(
            declaration.name(),
            message,
            ExecutionLog::with_capacity(self.trace_capacity),
        );

        if let Err(e) = self.run(handler, declaration, directory, &mut invocation) {
            error!(
                invocation = %invocation.id,
                command = %invocation.command,
                error = %e,
                "Dispatch state machine violated"
            );
        }

        info!(
            invocation = %invocation.id,
            command = %invocation.command,
            state = %invocation.state,
            success = invocation.succeeded(),
            "Command dispatched"
        );
        invocation
    }

    fn run(
        &self,
        handler: &dyn CommandHandler,
        declaration: &CommandDeclaration,
        directory: &dyn Directory,
        invocation: &mut Invocation<'_>,
    ) -> Result<(), DispatchError> {
        let message = invocation.message;

        invocation.advance(
            DispatchState::PermissionCheck,
            LogEntry::milestone(PERMISSION_CHECK_STARTED),
        )?;
        let permitted =
            catch_unwind(AssertUnwindSafe(|| declaration.requirement().check(message, directory)))
                .map_err(|payload| {
                    let cause = format!("panic: {}", panic_message(&*payload));
                    error!(
                        invocation = %invocation.id,
                        command = %invocation.command,
                        error = %cause,
                        "Permission check panicked"
                    );
                    cause
                });
        if permitted != Ok(true) {
            run_hook("bad_permissions", invocation, |inv| {
                handler.on_bad_permissions(inv)
            });
            invocation.advance(
                DispatchState::RejectedPerms,
                LogEntry::error(PERMISSION_CHECK_FAILED, permitted.err()),
            )?;
            return Ok(());
        }

        invocation.advance(
            DispatchState::ArgumentCheck,
            LogEntry::milestone(PERMISSION_CHECK_PASSED),
        )?;
        let matched = declaration.signature().parse(message);
        let Some(index) = matched.index else {
            run_hook("bad_arguments", invocation, |inv| {
                handler.on_bad_arguments(inv)
            });
            invocation.advance(
                DispatchState::RejectedArgs,
                LogEntry::error(ARGUMENT_CHECK_FAILED, None),
            )?;
            return Ok(());
        };

        invocation.matched = Some(index);
        invocation.names = declaration.signature().configurations()[index]
            .parameters()
            .iter()
            .map(|p| p.name.clone())
            .collect();
        invocation.parameters = matched.results;
        invocation.advance(
            DispatchState::Executing,
            LogEntry::milestone(ARGUMENT_CHECK_PASSED),
        )?;

        let outcome = catch_unwind(AssertUnwindSafe(|| handler.execute(invocation)))
            .unwrap_or_else(|payload| Err(anyhow::anyhow!("panic: {}", panic_message(&*payload))));

        match outcome {
            Ok(()) => invocation.advance(
                DispatchState::Succeeded,
                LogEntry::milestone(COMMAND_SUCCEEDED),
            ),
            Err(fault) => {
                error!(
                    invocation = %invocation.id,
                    command = %invocation.command,
                    error = %format!("{fault:#}"),
                    "Command body failed"
                );
                invocation.advance(
                    DispatchState::Failed,
                    LogEntry::error(COMMAND_FAILED, Some(format!("{fault:#}"))),
                )?;
                invocation.fault = Some(fault);
                Ok(())
            }
        }
    }
}

/// Hooks run before the terminal entry is recorded; a panicking hook is logged and ignored.
fn run_hook<F>(hook: &str, invocation: &mut Invocation<'_>, f: F)
where
    F: FnOnce(&mut Invocation<'_>),
{
    let id = invocation.id;
    if let Err(payload) = catch_unwind(AssertUnwindSafe(|| f(invocation))) {
        warn!(
            invocation = %id,
            hook,
            panic = %panic_message(&*payload),
            "Rejection hook panicked"
        );
    }
}
