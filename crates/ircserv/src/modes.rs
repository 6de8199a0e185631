//! Channel mode-string interpreter.
//!
//! MODE arguments arrive as a mix of sign-prefixed letter runs and
//! parameters (`MODE #c +kl key 5 -t`). The interpreter flattens the
//! runs into single-letter units, then compiles units plus parameters
//! into concrete changes. Compilation validates everything up front so
//! a failure mid-string never leaves a channel half-mutated.

use std::collections::VecDeque;

/// Recognized channel modes.
pub const KNOWN_MODES: &str = "itkol";

/// One sign-prefixed letter, e.g. `+k` or `-o`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModeUnit {
    pub sign: char,
    pub letter: char,
}

/// A fully validated mode change, ready to apply.
#[derive(Debug, Clone, PartialEq)]
pub enum ModeChange {
    InviteOnly(bool),
    TopicRestricted(bool),
    SetKey(String),
    ClearKey,
    SetLimit(usize),
    ClearLimit,
    GiveOp(String),
    TakeOp(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ModeError {
    UnknownMode(char),
    MissingParam,
    BadLimit,
}

/// Splits a mode string into units, tracking the current sign.
/// `+kl-t` becomes `+k +l -t`. Anything before the first sign is
/// ignored, matching the lenient reading of RFC 2812 clients.
pub fn split_units(modestring: &str) -> Vec<ModeUnit> {
    let mut units = Vec::new();
    let mut sign = None;
    for c in modestring.chars() {
        match c {
            '+' | '-' => sign = Some(c),
            letter => {
                if let Some(sign) = sign {
                    units.push(ModeUnit { sign, letter });
                }
            }
        }
    }
    units
}

/// Whether this unit consumes one argument from the parameter queue.
pub fn needs_param(unit: ModeUnit) -> bool {
    match unit.letter {
        'k' => unit.sign == '+',
        'l' => unit.sign == '+',
        'o' => true,
        _ => false,
    }
}

/// Compiles units and parameters into changes, consuming parameters
/// left to right exactly where a unit demands one. Any invalid letter,
/// missing argument or unusable limit fails the whole command.
pub fn compile(units: &[ModeUnit], params: Vec<String>) -> Result<Vec<ModeChange>, ModeError> {
    for unit in units {
        if !KNOWN_MODES.contains(unit.letter) {
            return Err(ModeError::UnknownMode(unit.letter));
        }
    }

    let mut queue: VecDeque<String> = params.into();
    let mut changes = Vec::with_capacity(units.len());
    for &unit in units {
        let arg = if needs_param(unit) {
            Some(queue.pop_front().ok_or(ModeError::MissingParam)?)
        } else {
            None
        };
        let adding = unit.sign == '+';
        let change = match unit.letter {
            'i' => ModeChange::InviteOnly(adding),
            't' => ModeChange::TopicRestricted(adding),
            'k' => {
                if adding {
                    ModeChange::SetKey(arg.unwrap())
                } else {
                    ModeChange::ClearKey
                }
            }
            'l' => {
                if adding {
                    let limit = arg
                        .unwrap()
                        .parse::<usize>()
                        .map_err(|_| ModeError::BadLimit)?;
                    if limit == 0 {
                        return Err(ModeError::BadLimit);
                    }
                    ModeChange::SetLimit(limit)
                } else {
                    ModeChange::ClearLimit
                }
            }
            'o' => {
                let nick = arg.unwrap();
                if adding {
                    ModeChange::GiveOp(nick)
                } else {
                    ModeChange::TakeOp(nick)
                }
            }
            _ => unreachable!("letters validated above"),
        };
        changes.push(change);
    }
    Ok(changes)
}

impl ModeChange {
    /// The short form echoed in the MODE broadcast. Key values never
    /// leak; operator changes name their target.
    pub fn applied(&self) -> String {
        match self {
            ModeChange::InviteOnly(true) => "+i".to_owned(),
            ModeChange::InviteOnly(false) => "-i".to_owned(),
            ModeChange::TopicRestricted(true) => "+t".to_owned(),
            ModeChange::TopicRestricted(false) => "-t".to_owned(),
            ModeChange::SetKey(_) => "+k".to_owned(),
            ModeChange::ClearKey => "-k".to_owned(),
            ModeChange::SetLimit(_) => "+l".to_owned(),
            ModeChange::ClearLimit => "-l".to_owned(),
            ModeChange::GiveOp(nick) => format!("+o {nick}"),
            ModeChange::TakeOp(nick) => format!("-o {nick}"),
        }
    }
}
