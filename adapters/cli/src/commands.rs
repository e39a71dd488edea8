use anyhow::{bail, Context, Result};
use tillage_core::{CellCoord, InputEvent, Key};

/// Help text printed by the `help` command.
pub(crate) const HELP: &str = "\
commands:
  left | right | up | down   move the player (ArrowLeft etc. also work)
  enter | turn               advance one turn
  click <col> <row>          sow or reap a cell next to the player
  crop <name>                select the crop to sow
  crops                      list available crops
  undo | redo                step through history
  save <key> | load <key>    write or restore a save
  help                       show this text
  quit                       leave the game";

/// One line of terminal input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Command {
    /// Forward an input event to the session.
    Input(InputEvent),
    /// Select a crop by name.
    SelectCrop(String),
    /// List the catalog.
    ListCrops,
    Undo,
    Redo,
    Save(String),
    Load(String),
    Help,
    Quit,
}

/// Parses a line of input. Blank lines yield `None`.
pub(crate) fn parse(line: &str) -> Result<Option<Command>> {
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return Ok(None);
    };

    let command = if let Some(key) = Key::from_identifier(verb) {
        Command::Input(InputEvent::Key(key))
    } else {
        match verb.to_ascii_lowercase().as_str() {
            "left" => Command::Input(InputEvent::Key(Key::ArrowLeft)),
            "right" => Command::Input(InputEvent::Key(Key::ArrowRight)),
            "up" => Command::Input(InputEvent::Key(Key::ArrowUp)),
            "down" => Command::Input(InputEvent::Key(Key::ArrowDown)),
            "enter" | "turn" => Command::Input(InputEvent::Key(Key::Enter)),
            "click" => {
                let column = coordinate(words.next(), "column")?;
                let row = coordinate(words.next(), "row")?;
                Command::Input(InputEvent::Click(CellCoord::new(column, row)))
            }
            "crop" => Command::SelectCrop(argument(words.next(), "crop")?),
            "crops" => Command::ListCrops,
            "undo" => Command::Undo,
            "redo" => Command::Redo,
            "save" => Command::Save(argument(words.next(), "save")?),
            "load" => Command::Load(argument(words.next(), "load")?),
            "help" | "?" => Command::Help,
            "quit" | "exit" => Command::Quit,
            _ => bail!("unknown command `{verb}`; type `help` for a list"),
        }
    };

    if let Some(extra) = words.next() {
        bail!("unexpected argument `{extra}` after `{verb}`");
    }
    Ok(Some(command))
}

fn coordinate(word: Option<&str>, axis: &str) -> Result<u32> {
    let Some(word) = word else {
        bail!("`click` needs a {axis}");
    };
    word.parse()
        .with_context(|| format!("`{word}` is not a valid {axis}"))
}

fn argument(word: Option<&str>, verb: &str) -> Result<String> {
    match word {
        Some(word) => Ok(word.to_owned()),
        None => bail!("`{verb}` needs a name"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn movement_words_and_key_identifiers_agree() {
        assert_eq!(
            parse("left").expect("parses"),
            Some(Command::Input(InputEvent::Key(Key::ArrowLeft)))
        );
        assert_eq!(
            parse("ArrowLeft").expect("parses"),
            parse("left").expect("parses")
        );
        assert_eq!(
            parse("  TURN ").expect("parses"),
            Some(Command::Input(InputEvent::Key(Key::Enter)))
        );
    }

    #[test]
    fn click_carries_the_cell() {
        assert_eq!(
            parse("click 2 3").expect("parses"),
            Some(Command::Input(InputEvent::Click(CellCoord::new(2, 3))))
        );
        assert!(parse("click 2").is_err(), "row is required");
        assert!(parse("click -1 0").is_err(), "negative cells are not clickable");
    }

    #[test]
    fn named_commands_need_exactly_one_name() {
        assert_eq!(
            parse("save s1").expect("parses"),
            Some(Command::Save("s1".to_owned()))
        );
        assert_eq!(
            parse("crop tree").expect("parses"),
            Some(Command::SelectCrop("tree".to_owned()))
        );
        assert!(parse("load").is_err());
        assert!(parse("load a b").is_err());
    }

    #[test]
    fn blank_and_unknown_lines() {
        assert_eq!(parse("   ").expect("blank is fine"), None);
        assert!(parse("dance").is_err());
    }
}
