use anyhow::{anyhow, bail, Result};
use std::path::PathBuf;

pub const HELP: &str = "\
commands:
  pair <trainer-id>     pair with a trainer
  unpair                forget the paired trainer
  ftp <watts>           set threshold power (free text, clamped to 50..400)
  slider <watts>        set threshold power from the slider
  devices               list known trainers
  status                show live values
  export [path]         write the ride as GPX
  resize <w> <h>        resize the drawing surface
  quit                  export and exit";

/// One line of operator input, standing in for the dashboard controls.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Pair(String),
    Unpair,
    Ftp(String),
    Slider(i64),
    Devices,
    Status,
    Export(Option<PathBuf>),
    Resize(f64, f64),
    Help,
    Quit,
}

/// Blank lines parse to `None`.
pub fn parse(line: &str) -> Result<Option<Command>> {
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return Ok(None);
    };
    let rest: Vec<&str> = words.collect();

    let cmd = match (verb.to_ascii_lowercase().as_str(), rest.as_slice()) {
        ("pair", [id]) => Command::Pair((*id).to_string()),
        ("pair", []) | ("unpair", []) => Command::Unpair,
        // The text box takes anything; bad input is corrected downstream.
        ("ftp", _) => Command::Ftp(rest.join(" ")),
        ("slider", [v]) => Command::Slider(
            v.parse()
                .map_err(|_| anyhow!("slider expects a whole number, got {v:?}"))?,
        ),
        ("devices", []) => Command::Devices,
        ("status", []) => Command::Status,
        ("export", []) => Command::Export(None),
        ("export", [path]) => Command::Export(Some(PathBuf::from(path))),
        ("resize", [w, h]) => {
            let w: f64 = w.parse().map_err(|_| anyhow!("bad width {w:?}"))?;
            let h: f64 = h.parse().map_err(|_| anyhow!("bad height {h:?}"))?;
            Command::Resize(w, h)
        }
        ("help" | "?", _) => Command::Help,
        ("quit" | "exit", []) => Command::Quit,
        (other, _) => bail!("unrecognised command {other:?} (try `help`)"),
    };
    Ok(Some(cmd))
}
