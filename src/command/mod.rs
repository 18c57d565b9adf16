//! Command declarations, the dispatch state machine and execution traces.

pub mod declaration;
pub mod dispatcher;
pub mod state;
pub mod trace;

pub use declaration::{CommandDeclaration, CommandKey};
pub use dispatcher::{CommandHandler, Dispatcher, Invocation, InvocationReport};
pub use state::DispatchState;
pub use trace::{ExecutionLog, LogEntry};
