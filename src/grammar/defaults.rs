//! The built-in IRC event table.
//!
//! Order matters: the first definition that matches a line wins, so the
//! specific PRIVMSG forms (ACTION, CTCP) sit above the plain message.

/// `:nick!ident@host ` with an optional `~` before the ident.
macro_rules! user_prefix {
    () => {
        r"^:([^!\s]+)!~?([^@\s]+)@(\S+) "
    };
}

/// (name, pattern, field names)
pub(super) const IRC_EVENTS: &[(&str, &str, &[&str])] = &[
    (
        "invite",
        concat!("(?i)", user_prefix!(), r"INVITE (\S+) :?(\S+)$"),
        &["nick", "ident", "host", "target", "channel"],
    ),
    (
        "action",
        concat!("(?i)", user_prefix!(), r"PRIVMSG (\S+) :?\x01ACTION (.+?)\x01$"),
        &["nick", "ident", "host", "target", "message"],
    ),
    (
        "ctcp",
        concat!("(?i)", user_prefix!(), r"PRIVMSG (\S+) :?\x01(.+?)\x01$"),
        &["nick", "ident", "host", "target", "message"],
    ),
    (
        "message",
        concat!("(?i)", user_prefix!(), r"PRIVMSG (\S+) :?(.*)$"),
        &["nick", "ident", "host", "target", "message"],
    ),
    (
        "notice",
        concat!("(?i)", user_prefix!(), r"NOTICE (\S+) :?(.*)$"),
        &["nick", "ident", "host", "target", "message"],
    ),
    (
        "join",
        concat!("(?i)", user_prefix!(), r"JOIN :?(\S+)"),
        &["nick", "ident", "host", "target"],
    ),
    (
        "part",
        concat!("(?i)", user_prefix!(), r"PART (\S+)(?: :?(.*))?$"),
        &["nick", "ident", "host", "target", "message"],
    ),
    (
        "mode",
        concat!("(?i)", user_prefix!(), r"MODE (\S+) :?(.+)$"),
        &["nick", "ident", "host", "target", "mode"],
    ),
    (
        "kick",
        concat!("(?i)", user_prefix!(), r"KICK (\S+) (\S+)(?: :?(.*))?$"),
        &["nick", "ident", "host", "target", "channel", "reason"],
    ),
    (
        "topic",
        concat!("(?i)", user_prefix!(), r"TOPIC (\S+) :?(.*)$"),
        &["nick", "ident", "host", "target", "topic"],
    ),
    (
        "nick",
        concat!("(?i)", user_prefix!(), r"NICK :?(\S+)$"),
        &["nick", "ident", "host", "new_nick"],
    ),
    (
        "quit",
        concat!("(?i)", user_prefix!(), r"QUIT(?: :?(.*))?$"),
        &["nick", "ident", "host", "message"],
    ),
    (
        "nick_taken",
        r"^:(\S+) 433 \S+ (\S+) :?(.*)$",
        &["server", "target", "message"],
    ),
    (
        "ping",
        r"(?i)^(?::([^!\s]+)(?:!~?([^@\s]+)@(\S+))? )?PING :?(.*)$",
        &["nick", "ident", "host", "data"],
    ),
    ("error", r"(?i)^ERROR :?(.*)$", &["message"]),
    (
        "numeric",
        r"^:(\S+) ([0-9]{3}) (.*)$",
        &["host", "code", "data"],
    ),
];
