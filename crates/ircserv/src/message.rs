use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::take_while1,
    character::complete::{char, space1},
    combinator::{opt, rest},
    multi::many0,
    sequence::{preceded, terminated},
};

use crate::constants::{MAX_MESSAGE_BODY, MAX_MESSAGE_LENGTH};
use crate::errors::IrcError;

// 2.3.1 Message format in Augmented BNF
//
//    The protocol messages must be extracted from the contiguous stream of
//    octets.  The current solution is to designate two characters, CR and
//    LF, as message separators.  Empty messages are silently ignored,
//    which permits use of the sequence CR-LF between messages without
//    extra problems.
//
//     message    =  [ ":" prefix SPACE ] command [ params ] crlf
//     params     =  *14( SPACE middle ) [ SPACE ":" trailing ]
//     middle     =  nospcrlfcl *( ":" / nospcrlfcl )
//     trailing   =  *( ":" / " " / nospcrlfcl )

/// Accumulates raw socket bytes and yields complete frames.
///
/// A frame ends at the first `\n`; a `\r` immediately before it is
/// stripped. Empty frames are discarded, which tolerates bare CR-LF
/// keepalives between messages.
#[derive(Debug, Default)]
pub struct RecvBuffer {
    data: Vec<u8>,
}

impl RecvBuffer {
    pub fn new() -> Self {
        RecvBuffer { data: Vec::new() }
    }

    pub fn push(&mut self, bytes: &[u8]) {
        self.data.extend_from_slice(bytes);
    }

    /// Next complete line, if one has fully arrived. Partial data stays
    /// buffered until more bytes are pushed.
    pub fn next_line(&mut self) -> Option<String> {
        loop {
            let pos = self.data.iter().position(|&b| b == b'\n')?;
            let mut frame: Vec<u8> = self.data.drain(..=pos).collect();
            frame.pop();
            if frame.last() == Some(&b'\r') {
                frame.pop();
            }
            if frame.is_empty() {
                continue;
            }
            return Some(String::from_utf8_lossy(&frame).into_owned());
        }
    }

    pub fn pending(&self) -> usize {
        self.data.len()
    }
}

/// One parsed inbound message: optional prefix, command token, and the
/// parameter list with any trailing parameter already unwrapped.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub prefix: Option<String>,
    pub command: String,
    pub params: Vec<String>,
}

// prefix = servername / ( nickname [ [ "!" user ] "@" host ] )
// Clients do not set their own prefix; it is parsed and then ignored.
fn prefix_parser(input: &str) -> IResult<&str, &str> {
    terminated(preceded(char(':'), take_while1(|c| c != ' ')), space1).parse(input)
}

// A ':'-introduced token opens the trailing parameter, which swallows
// the rest of the line; anything else is a space-delimited middle.
fn param_parser(input: &str) -> IResult<&str, &str> {
    alt((preceded(char(':'), rest), take_while1(|c: char| c != ' '))).parse(input)
}

fn message_parser(input: &str) -> IResult<&str, Message> {
    let (input, prefix) = opt(prefix_parser).parse(input)?;
    let (input, command) = take_while1(|c: char| c != ' ').parse(input)?;
    let (input, params) = many0(preceded(space1, param_parser)).parse(input)?;

    Ok((
        input,
        Message {
            prefix: prefix.map(str::to_owned),
            command: command.to_owned(),
            params: params.into_iter().map(str::to_owned).collect(),
        },
    ))
}

impl Message {
    /// Parses one frame. Commands are never case-folded here; the
    /// dispatcher enforces the uppercase contract itself.
    pub fn parse(line: &str) -> Result<Message, IrcError> {
        match message_parser(line) {
            Ok((remaining, message)) if remaining.chars().all(|c| c == ' ') => Ok(message),
            _ => Err(IrcError::ParsingError(line.to_owned())),
        }
    }

    /// Renders the message back to its wire form (no CRLF). The last
    /// parameter becomes a trailing parameter whenever it needs to be.
    pub fn serialize(&self) -> String {
        let mut line = String::new();
        if let Some(prefix) = &self.prefix {
            line.push(':');
            line.push_str(prefix);
            line.push(' ');
        }
        line.push_str(&self.command);
        for (i, param) in self.params.iter().enumerate() {
            line.push(' ');
            let last = i + 1 == self.params.len();
            if last && (param.is_empty() || param.contains(' ') || param.starts_with(':')) {
                line.push(':');
            }
            line.push_str(param);
        }
        line
    }
}

/// Formats one outbound reply: ensure a CRLF terminator, then enforce
/// the 512-byte cap by truncating the payload to 510 bytes plus CRLF.
pub fn format_reply(reply: &str) -> String {
    let mut formatted = if reply.ends_with("\r\n") {
        reply.to_owned()
    } else {
        format!("{reply}\r\n")
    };
    if formatted.len() > MAX_MESSAGE_LENGTH {
        let mut cut = MAX_MESSAGE_BODY;
        while !formatted.is_char_boundary(cut) {
            cut -= 1;
        }
        formatted.truncate(cut);
        formatted.push_str("\r\n");
    }
    formatted
}
