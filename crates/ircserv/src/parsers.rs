use nom::{
    IResult, Parser,
    bytes::complete::take_while1,
    character::complete::char,
    combinator::{recognize, verify},
    sequence::pair,
};

// 2.3.1 Message format in Augmented BNF (identifier rules)
//
//  nickname   =  ( letter / special ) *8( letter / digit / special / "-" )
//  special    =  %x5B-60 / %x7B-7D
//                   ; "[", "]", "\", "`", "_", "^", "{", "|", "}"
//
// This server is more permissive than the RFC on purpose: digits may
// lead and there is no nine-character ceiling, but the alphabet is
// fixed to letters, digits and the special set.
fn is_nickname_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || "[]\\`_^{|}".contains(c)
}

pub fn nickname_parser(input: &str) -> IResult<&str, &str> {
    take_while1(is_nickname_char).parse(input)
}

/// The whole token must be nickname characters, nothing trailing.
pub fn is_valid_nickname(nick: &str) -> bool {
    matches!(nickname_parser(nick), Ok(("", _)))
}

//  channel    =  ( "#" / "+" / ( "!" channelid ) / "&" ) chanstring
//  chanstring =  any octet except NUL, BELL, CR, LF, " ", "," and ":"
//
// Only "#" channels exist here; names are capped at 50 bytes and BELL,
// space and comma stay forbidden.
fn is_channel_char(c: char) -> bool {
    !matches!(c, ' ' | ',' | '\u{0007}' | '\r' | '\n' | '\0')
}

pub fn channel_name_parser(input: &str) -> IResult<&str, &str> {
    verify(
        recognize(pair(char('#'), take_while1(is_channel_char))),
        |name: &str| name.len() <= 50,
    )
    .parse(input)
}

pub fn is_valid_channel_name(name: &str) -> bool {
    matches!(channel_name_parser(name), Ok(("", _)))
}

/// ASCII lower-fold used for every nickname and channel-name
/// comparison. Display strings keep their original casing.
pub fn to_irc_lower(s: &str) -> String {
    s.to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_nicknames() {
        let cases = [
            "alice",
            "Alice42",
            "42alice",
            "a[b]c",
            "w^x{y|z}",
            "back\\tick`",
            "under_score",
        ];
        for case in cases {
            assert!(is_valid_nickname(case), "should accept {case}");
        }
    }

    #[test]
    fn invalid_nicknames() {
        let cases = ["", "has space", "dash-nick", "émile", "semi;colon", "a,b"];
        for case in cases {
            assert!(!is_valid_nickname(case), "should reject {case}");
        }
    }

    #[test]
    fn valid_channel_names() {
        assert!(is_valid_channel_name("#a"));
        assert!(is_valid_channel_name("#lab"));
        assert!(is_valid_channel_name("#Chan.42!"));
        let max = format!("#{}", "c".repeat(49));
        assert!(is_valid_channel_name(&max));
    }

    #[test]
    fn invalid_channel_names() {
        assert!(!is_valid_channel_name("#"));
        assert!(!is_valid_channel_name("lab"));
        assert!(!is_valid_channel_name("&lab"));
        assert!(!is_valid_channel_name("#with space"));
        assert!(!is_valid_channel_name("#with,comma"));
        assert!(!is_valid_channel_name("#bell\u{0007}"));
        let too_long = format!("#{}", "c".repeat(50));
        assert!(!is_valid_channel_name(&too_long));
    }

    #[test]
    fn lower_fold_is_ascii_only() {
        assert_eq!(to_irc_lower("NiCk"), "nick");
        assert_eq!(to_irc_lower("#Lab"), "#lab");
    }
}
