use crate::constants::*;

/// Every line the server originates, numeric or prefixed. Handlers build
/// a variant and hand `format()`'s output to the connection send queue,
/// which applies CRLF and the length cap.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq)]
pub enum Reply<'a> {
    // Connection registration
    PassAccepted,
    NickSet {
        nick: &'a str,
    },
    /// Nick change announcement, echoed to the actor only.
    NickChanged {
        old_prefix: &'a str,
        nick: &'a str,
    },
    Welcome {
        nick: &'a str,
        user: &'a str,
        host: &'a str,
    },
    YourHost {
        nick: &'a str,
    },
    Created {
        nick: &'a str,
        date: &'a str,
    },
    MyInfo {
        nick: &'a str,
    },

    // Channel state
    Topic {
        nick: &'a str,
        channel: &'a str,
        topic: &'a str,
    },
    NoTopic {
        nick: &'a str,
        channel: &'a str,
    },
    TopicWhoTime {
        nick: &'a str,
        setter: &'a str,
        time: &'a str,
    },
    NamReply {
        nick: &'a str,
        channel: &'a str,
        names: &'a str,
    },
    EndOfNames {
        nick: &'a str,
        channel: &'a str,
    },
    Pong {
        token: &'a str,
    },
    ErrorClosingLink {
        message: &'a str,
    },

    // Errors
    ErrNoSuchNick {
        nick: &'a str,
        target: &'a str,
    },
    ErrNoSuchChannel {
        nick: &'a str,
        channel: &'a str,
    },
    ErrCannotSendToChan {
        nick: &'a str,
        channel: &'a str,
    },
    ErrMessageTooLong {
        nick: &'a str,
    },
    ErrNoRecipient {
        nick: &'a str,
    },
    ErrNoTextToSend {
        nick: &'a str,
    },
    ErrUnknownCommand {
        nick: &'a str,
        command: &'a str,
    },
    ErrLowercaseCommand {
        command: &'a str,
    },
    ErrNoNicknameGiven {
        nick: &'a str,
    },
    ErrErroneusNickname {
        nick: &'a str,
        attempted: &'a str,
    },
    ErrNicknameInUse {
        nick: &'a str,
        attempted: &'a str,
    },
    ErrUserNotInChannel {
        nick: &'a str,
        target: &'a str,
        channel: &'a str,
    },
    ErrNotOnChannel {
        nick: &'a str,
        channel: &'a str,
    },
    ErrUserOnChannel {
        nick: &'a str,
        target: &'a str,
        channel: &'a str,
    },
    /// 443 in its JOIN form, aimed at the duplicate joiner itself.
    ErrAlreadyOnChannel {
        nick: &'a str,
        channel: &'a str,
    },
    ErrNotRegistered {
        nick: &'a str,
    },
    ErrNeedMoreParams {
        nick: &'a str,
        command: &'a str,
    },
    /// 462 with the registration-order diagnostic spelled out.
    ErrAlreadyRegistred {
        nick: &'a str,
        detail: &'a str,
    },
    /// 461 for USER's stricter argument contract.
    ErrUserSyntax {
        nick: &'a str,
        detail: &'a str,
    },
    ErrPasswdMismatch {
        nick: &'a str,
    },
    ErrChannelIsFull {
        nick: &'a str,
        channel: &'a str,
        detail: &'a str,
    },
    ErrUnknownMode {
        nick: &'a str,
        mode: char,
    },
    ErrInviteOnlyChan {
        nick: &'a str,
        channel: &'a str,
    },
    ErrBadChannelKey {
        nick: &'a str,
        channel: &'a str,
        detail: &'a str,
    },
    ErrChanOPrivsNeeded {
        nick: &'a str,
        channel: &'a str,
    },
}

impl<'a> Reply<'a> {
    pub fn format(&self) -> String {
        match self {
            // Registration
            Reply::PassAccepted => {
                format!(":{SERVER_NAME} NOTICE AUTH :Password accepted")
            }
            Reply::NickSet { nick } => {
                format!(":{SERVER_NAME} NOTICE {nick} :Nickname set to {nick}")
            }
            Reply::NickChanged { old_prefix, nick } => {
                format!(":{old_prefix} NICK {nick}")
            }
            Reply::Welcome { nick, user, host } => format!(
                ":{SERVER_NAME} {RPL_WELCOME_NB:03} {nick} :{RPL_WELCOME_STR} {nick}!{user}@{host}"
            ),
            Reply::YourHost { nick } => format!(
                ":{SERVER_NAME} {RPL_YOURHOST_NB:03} {nick} :Your host is {SERVER_NAME}, running version {SERVER_VERSION}"
            ),
            Reply::Created { nick, date } => format!(
                ":{SERVER_NAME} {RPL_CREATED_NB:03} {nick} :This server was created {date}"
            ),
            Reply::MyInfo { nick } => format!(
                ":{SERVER_NAME} {RPL_MYINFO_NB:03} {nick} {SERVER_NAME} {SERVER_VERSION}  {CHANNEL_MODES}"
            ),

            // Channel state
            Reply::Topic {
                nick,
                channel,
                topic,
            } => format!(":{SERVER_NAME} {RPL_TOPIC_NB:03} {nick} {channel} :{topic}"),
            Reply::NoTopic { nick, channel } => format!(
                ":{SERVER_NAME} {RPL_NOTOPIC_NB:03} {nick} {channel} :{RPL_NOTOPIC_STR}"
            ),
            Reply::TopicWhoTime { nick, setter, time } => {
                format!(":{SERVER_NAME} NOTICE {nick} :Topic set by {setter} at {time}")
            }
            Reply::NamReply {
                nick,
                channel,
                names,
            } => format!(":{SERVER_NAME} {RPL_NAMREPLY_NB:03} {nick} = {channel} :{names}"),
            Reply::EndOfNames { nick, channel } => format!(
                ":{SERVER_NAME} {RPL_ENDOFNAMES_NB:03} {nick} {channel} :{RPL_ENDOFNAMES_STR}"
            ),
            Reply::Pong { token } => {
                format!(":{SERVER_NAME} PONG {SERVER_NAME} :{token}")
            }
            Reply::ErrorClosingLink { message } => {
                format!("ERROR :Closing link: {message}")
            }

            // Errors
            Reply::ErrNoSuchNick { nick, target } => format!(
                ":{SERVER_NAME} {ERR_NOSUCHNICK_NB:03} {nick} {target} :{ERR_NOSUCHNICK_STR}"
            ),
            Reply::ErrNoSuchChannel { nick, channel } => format!(
                ":{SERVER_NAME} {ERR_NOSUCHCHANNEL_NB:03} {nick} {channel} :{ERR_NOSUCHCHANNEL_STR}"
            ),
            Reply::ErrCannotSendToChan { nick, channel } => format!(
                ":{SERVER_NAME} {ERR_CANNOTSENDTOCHAN_NB:03} {nick} {channel} :{ERR_CANNOTSENDTOCHAN_STR}"
            ),
            Reply::ErrMessageTooLong { nick } => format!(
                ":{SERVER_NAME} {ERR_TOOMANYCHANNELS_NB:03} {nick} :{ERR_TOOMANYCHANNELS_STR}"
            ),
            Reply::ErrNoRecipient { nick } => format!(
                ":{SERVER_NAME} {ERR_NORECIPIENT_NB:03} {nick} :{ERR_NORECIPIENT_STR}"
            ),
            Reply::ErrNoTextToSend { nick } => format!(
                ":{SERVER_NAME} {ERR_NOTEXTTOSEND_NB:03} {nick} :{ERR_NOTEXTTOSEND_STR}"
            ),
            Reply::ErrUnknownCommand { nick, command } => format!(
                ":{SERVER_NAME} {ERR_UNKNOWNCOMMAND_NB:03} {nick} {command} :{ERR_UNKNOWNCOMMAND_STR}"
            ),
            Reply::ErrLowercaseCommand { command } => format!(
                ":{SERVER_NAME} {ERR_UNKNOWNCOMMAND_NB:03} * {command} :{ERR_LOWERCASECOMMAND_STR}"
            ),
            Reply::ErrNoNicknameGiven { nick } => format!(
                ":{SERVER_NAME} {ERR_NONICKNAMEGIVEN_NB:03} {nick} :{ERR_NONICKNAMEGIVEN_STR}"
            ),
            Reply::ErrErroneusNickname { nick, attempted } => format!(
                ":{SERVER_NAME} {ERR_ERRONEUSNICKNAME_NB:03} {nick} {attempted} :{ERR_ERRONEUSNICKNAME_STR}"
            ),
            Reply::ErrNicknameInUse { nick, attempted } => format!(
                ":{SERVER_NAME} {ERR_NICKNAMEINUSE_NB:03} {nick} {attempted} :{ERR_NICKNAMEINUSE_STR}"
            ),
            Reply::ErrUserNotInChannel {
                nick,
                target,
                channel,
            } => format!(
                ":{SERVER_NAME} {ERR_USERNOTINCHANNEL_NB:03} {nick} {target} {channel} :{ERR_USERNOTINCHANNEL_STR}"
            ),
            Reply::ErrNotOnChannel { nick, channel } => format!(
                ":{SERVER_NAME} {ERR_NOTONCHANNEL_NB:03} {nick} {channel} :{ERR_NOTONCHANNEL_STR}"
            ),
            Reply::ErrUserOnChannel {
                nick,
                target,
                channel,
            } => format!(
                ":{SERVER_NAME} {ERR_USERONCHANNEL_NB:03} {nick} {target} {channel} :{ERR_USERONCHANNEL_STR}"
            ),
            Reply::ErrAlreadyOnChannel { nick, channel } => format!(
                ":{SERVER_NAME} {ERR_USERONCHANNEL_NB:03} {nick} {channel} :You are already on that channel"
            ),
            Reply::ErrNotRegistered { nick } => format!(
                ":{SERVER_NAME} {ERR_NOTREGISTERED_NB:03} {nick} :{ERR_NOTREGISTERED_STR}"
            ),
            Reply::ErrNeedMoreParams { nick, command } => format!(
                ":{SERVER_NAME} {ERR_NEEDMOREPARAMS_NB:03} {nick} {command} :{ERR_NEEDMOREPARAMS_STR}"
            ),
            Reply::ErrAlreadyRegistred { nick, detail } => format!(
                ":{SERVER_NAME} {ERR_ALREADYREGISTRED_NB:03} {nick} :{detail}"
            ),
            Reply::ErrUserSyntax { nick, detail } => format!(
                ":{SERVER_NAME} {ERR_NEEDMOREPARAMS_NB:03} {nick} USER :{detail}"
            ),
            Reply::ErrPasswdMismatch { nick } => format!(
                ":{SERVER_NAME} {ERR_PASSWDMISMATCH_NB:03} {nick} :{ERR_PASSWDMISMATCH_STR}"
            ),
            Reply::ErrChannelIsFull {
                nick,
                channel,
                detail,
            } => format!(":{SERVER_NAME} {ERR_CHANNELISFULL_NB:03} {nick} {channel} :{detail}"),
            Reply::ErrUnknownMode { nick, mode } => format!(
                ":{SERVER_NAME} {ERR_UNKNOWNMODE_NB:03} {nick} {mode} :{ERR_UNKNOWNMODE_STR}"
            ),
            Reply::ErrInviteOnlyChan { nick, channel } => format!(
                ":{SERVER_NAME} {ERR_INVITEONLYCHAN_NB:03} {nick} {channel} :{ERR_INVITEONLYCHAN_STR}"
            ),
            Reply::ErrBadChannelKey {
                nick,
                channel,
                detail,
            } => format!(":{SERVER_NAME} {ERR_BADCHANNELKEY_NB:03} {nick} {channel} :{detail}"),
            Reply::ErrChanOPrivsNeeded { nick, channel } => format!(
                ":{SERVER_NAME} {ERR_CHANOPRIVSNEEDED_NB:03} {nick} {channel} :{ERR_CHANOPRIVSNEEDED_STR}"
            ),
        }
    }
}
