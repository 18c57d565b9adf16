//! Everyday commands available to everyone.

use anyhow::{Context, bail};
use rand::Rng;

use super::reply_usage;
use crate::command::{CommandDeclaration, CommandHandler, Invocation};
use crate::parameter::{ParameterConfiguration, ParameterDeclaration, ValueParser};
use crate::separator::{ArgumentSeparator, MessageField, OtherSeparator};

const DEFAULT_SIDES: i64 = 6;

/// `greet [name]`
pub struct GreetCommand {
    declaration: CommandDeclaration,
}

impl GreetCommand {
    pub fn new() -> Self {
        Self {
            declaration: CommandDeclaration::new("greet", "Say hello").with_configurations([
                ParameterConfiguration::new(
                    "greet someone by name",
                    vec![ParameterDeclaration::content(
                        "name",
                        "who to greet",
                        ValueParser::String,
                    )],
                ),
                ParameterConfiguration::empty("greet yourself"),
            ]),
        }
    }
}

impl Default for GreetCommand {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandHandler for GreetCommand {
    fn declaration(&self) -> &CommandDeclaration {
        &self.declaration
    }

    fn execute(&self, invocation: &mut Invocation<'_>) -> anyhow::Result<()> {
        let name = match invocation.string("name") {
            Some(name) => name.to_string(),
            None => invocation.message().author.name.clone(),
        };
        invocation.reply(format!("Hello, {name}!"));
        Ok(())
    }

    fn on_bad_arguments(&self, invocation: &mut Invocation<'_>) {
        reply_usage(invocation, &self.declaration);
    }
}

/// `add <a> <b>` over integers, falling back to decimals.
pub struct AddCommand {
    declaration: CommandDeclaration,
}

impl AddCommand {
    pub fn new() -> Self {
        let operands = |parser: ValueParser| {
            vec![
                ParameterDeclaration::content("a", "first operand", parser.clone()),
                ParameterDeclaration::content("b", "second operand", parser),
            ]
        };
        Self {
            declaration: CommandDeclaration::new("add", "Add two numbers").with_configurations([
                ParameterConfiguration::new("integers", operands(ValueParser::Int)),
                ParameterConfiguration::new("decimals", operands(ValueParser::Decimal)),
            ]),
        }
    }
}

impl Default for AddCommand {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandHandler for AddCommand {
    fn declaration(&self) -> &CommandDeclaration {
        &self.declaration
    }

    fn execute(&self, invocation: &mut Invocation<'_>) -> anyhow::Result<()> {
        let sum = match invocation.matched_configuration() {
            Some(0) => {
                let (a, b) = (invocation.int("a"), invocation.int("b"));
                let (a, b) = a.zip(b).context("integer operands missing")?;
                a.checked_add(b).context("integer overflow")?.to_string()
            }
            _ => {
                let (a, b) = (invocation.decimal("a"), invocation.decimal("b"));
                let (a, b) = a.zip(b).context("decimal operands missing")?;
                a.checked_add(b).context("decimal overflow")?.normalize().to_string()
            }
        };
        invocation.reply(sum);
        Ok(())
    }

    fn on_bad_arguments(&self, invocation: &mut Invocation<'_>) {
        reply_usage(invocation, &self.declaration);
    }
}

/// `roll [sides]`
pub struct RollCommand {
    declaration: CommandDeclaration,
}

impl RollCommand {
    pub fn new() -> Self {
        Self {
            declaration: CommandDeclaration::new("roll", "Roll a die").with_configurations([
                ParameterConfiguration::new(
                    "roll a die with the given number of sides",
                    vec![ParameterDeclaration::content(
                        "sides",
                        "number of sides",
                        ValueParser::Int,
                    )],
                ),
                ParameterConfiguration::empty("roll a six-sided die"),
            ]),
        }
    }
}

impl Default for RollCommand {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandHandler for RollCommand {
    fn declaration(&self) -> &CommandDeclaration {
        &self.declaration
    }

    fn execute(&self, invocation: &mut Invocation<'_>) -> anyhow::Result<()> {
        let sides = invocation.int("sides").unwrap_or(DEFAULT_SIDES);
        if sides < 1 {
            bail!("a die needs at least one side, got {sides}");
        }
        let roll = rand::thread_rng().gen_range(1..=sides);
        invocation.reply(format!("You rolled {roll} (d{sides})"));
        Ok(())
    }

    fn on_bad_arguments(&self, invocation: &mut Invocation<'_>) {
        reply_usage(invocation, &self.declaration);
    }
}

/// `inspect` with exactly one attachment.
pub struct InspectCommand {
    declaration: CommandDeclaration,
}

impl InspectCommand {
    pub fn new() -> Self {
        Self {
            declaration: CommandDeclaration::new("inspect", "Describe an attachment")
                .with_configurations([ParameterConfiguration::new(
                    "one attached file",
                    vec![ParameterDeclaration::attachment("file", "the file to inspect")],
                )]),
        }
    }
}

impl Default for InspectCommand {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandHandler for InspectCommand {
    fn declaration(&self) -> &CommandDeclaration {
        &self.declaration
    }

    fn execute(&self, invocation: &mut Invocation<'_>) -> anyhow::Result<()> {
        let url = invocation.string("file").context("no attachment url")?.to_string();
        let attachment = invocation
            .message()
            .attachments
            .iter()
            .find(|a| a.url == url)
            .context("attachment vanished from message")?;
        let size = match attachment.size {
            0 => "unknown size".to_string(),
            bytes => format!("{bytes} bytes"),
        };
        invocation.reply(format!("{} ({size}) at {url}", attachment.filename));
        Ok(())
    }

    fn on_bad_arguments(&self, invocation: &mut Invocation<'_>) {
        invocation.reply("Attach exactly one file.");
    }
}

/// `whoami`: arguments come from the message itself.
pub struct WhoAmICommand {
    declaration: CommandDeclaration,
}

impl WhoAmICommand {
    pub fn new() -> Self {
        let name = || ParameterDeclaration::other("name", "author name", ValueParser::String);
        let id = || ParameterDeclaration::other("id", "author id", ValueParser::Int);
        Self {
            declaration: CommandDeclaration::new("whoami", "Show who and where you are")
                .with_configurations([
                    ParameterConfiguration::new(
                        "in a guild",
                        vec![
                            name(),
                            id(),
                            ParameterDeclaration::other("guild", "guild id", ValueParser::Int),
                        ],
                    )
                    .with_separator(ArgumentSeparator::default().with_other(
                        OtherSeparator::fields([
                            MessageField::AuthorName,
                            MessageField::AuthorId,
                            MessageField::GuildId,
                        ]),
                    )),
                    ParameterConfiguration::new("in a direct message", vec![name(), id()])
                        .with_separator(ArgumentSeparator::default().with_other(
                            OtherSeparator::fields([MessageField::AuthorName, MessageField::AuthorId]),
                        )),
                ]),
        }
    }
}

impl Default for WhoAmICommand {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandHandler for WhoAmICommand {
    fn declaration(&self) -> &CommandDeclaration {
        &self.declaration
    }

    fn execute(&self, invocation: &mut Invocation<'_>) -> anyhow::Result<()> {
        let name = invocation.string("name").unwrap_or_default().to_string();
        let id = invocation.int("id").unwrap_or_default();
        let reply = match invocation.int("guild") {
            Some(guild) => format!("You are {name} ({id}) in guild {guild}"),
            None => format!("You are {name} ({id}) in a direct message"),
        };
        invocation.reply(reply);
        Ok(())
    }
}
