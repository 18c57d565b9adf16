//! Commands restricted to administrators and the bot owner.

use std::collections::BTreeMap;
use std::sync::Mutex;

use anyhow::{Context, anyhow};

use super::reply_usage;
use crate::command::{CommandDeclaration, CommandHandler, Invocation};
use crate::message::UserId;
use crate::parameter::{ParameterConfiguration, ParameterDeclaration, ValueParser};
use crate::requirement::Requirement;

/// `flag <name> <on|off>` or `flag <name>` to read a flag back.
pub struct FlagCommand {
    declaration: CommandDeclaration,
    flags: Mutex<BTreeMap<String, bool>>,
}

impl FlagCommand {
    pub fn new(owner: UserId) -> Self {
        let name = || ParameterDeclaration::content("name", "flag name", ValueParser::String);
        Self {
            declaration: CommandDeclaration::new("flag", "Toggle a runtime flag")
                .with_requirement(Requirement::admin().or(Requirement::user(owner)))
                .with_configurations([
                    ParameterConfiguration::new(
                        "set a flag",
                        vec![
                            name(),
                            ParameterDeclaration::content(
                                "state",
                                "new state",
                                ValueParser::keyword(["on", "off"]),
                            ),
                        ],
                    ),
                    ParameterConfiguration::new("show a flag", vec![name()]),
                ]),
            flags: Mutex::new(BTreeMap::new()),
        }
    }

    /// Current value of `name`; unset flags are off.
    pub fn get(&self, name: &str) -> bool {
        self.flags
            .lock()
            .map(|flags| flags.get(name).copied().unwrap_or(false))
            .unwrap_or(false)
    }
}

impl CommandHandler for FlagCommand {
    fn declaration(&self) -> &CommandDeclaration {
        &self.declaration
    }

    fn execute(&self, invocation: &mut Invocation<'_>) -> anyhow::Result<()> {
        let name = invocation.string("name").context("flag name missing")?.to_string();
        let mut flags = self.flags.lock().map_err(|_| anyhow!("flag table poisoned"))?;

        let state = match invocation.string("state") {
            Some(state) => {
                let enabled = state == "on";
                flags.insert(name.clone(), enabled);
                enabled
            }
            None => flags.get(&name).copied().unwrap_or(false),
        };
        drop(flags);

        let word = if state { "on" } else { "off" };
        invocation.reply(format!("Flag {name} is {word}"));
        Ok(())
    }

    fn on_bad_permissions(&self, invocation: &mut Invocation<'_>) {
        invocation.reply("Only administrators can change flags.");
    }

    fn on_bad_arguments(&self, invocation: &mut Invocation<'_>) {
        reply_usage(invocation, &self.declaration);
    }
}
