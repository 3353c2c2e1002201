//! Line input for the interactive session

use anyhow::{anyhow, bail, Result};
use tune_core::ControlCommand;

use crate::render::Panel;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    Command(ControlCommand),
    Reset,
    Show(Panel),
    Hide(Panel),
    Toggle(Panel),
    Redraw,
    Status,
    Help,
    Quit,
}

pub const HELP: &str = "\
commands: 1-8 | tune-down T< | tune-down-large T<< | tune-up T> | tune-up-large T>>
          match-down M< | match-down-large M<< | match-up M> | match-up-large M>>
session:  reset | redraw | status | help | quit
panels:   show|hide|toggle map|sweep|large|small";

/// Parse one line; blank lines yield `None`.
pub fn parse_line(line: &str) -> Result<Option<Input>> {
    let mut words = line.split_whitespace();
    let Some(head) = words.next() else {
        return Ok(None);
    };
    let arg = words.next();
    if words.next().is_some() {
        bail!("too many words in {line:?}");
    }

    let panel = || -> Result<Panel> {
        let name = arg.ok_or_else(|| anyhow!("{head} needs a panel name"))?;
        name.parse::<Panel>().map_err(|e| anyhow!(e))
    };

    let input = match head.to_ascii_lowercase().as_str() {
        "reset" => Input::Reset,
        "redraw" => Input::Redraw,
        "status" => Input::Status,
        "help" | "?" => Input::Help,
        "quit" | "exit" | "q" => Input::Quit,
        "show" => Input::Show(panel()?),
        "hide" => Input::Hide(panel()?),
        "toggle" => Input::Toggle(panel()?),
        _ => Input::Command(parse_command(head)?),
    };
    Ok(Some(input))
}

/// Button code or command name/glyph
pub fn parse_command(token: &str) -> Result<ControlCommand> {
    let command = match token.parse::<i64>() {
        Ok(code) => ControlCommand::from_code(code)?,
        Err(_) => token.parse::<ControlCommand>()?,
    };
    Ok(command)
}
