//! Channel names: recognising them, and turning bare names into them.

/// Characters that open a channel name.
pub const CHANNEL_PREFIXES: [char; 4] = ['#', '&', '+', '!'];

/// Longest channel name accepted, in characters.
pub const MAX_CHANNEL_LEN: usize = 50;

fn has_channel_prefix(name: &str) -> bool {
    name.starts_with(CHANNEL_PREFIXES)
}

/// Channel-name checks on string types.
pub trait ChannelExt {
    /// A prefix from [`CHANNEL_PREFIXES`], at most [`MAX_CHANNEL_LEN`]
    /// characters, and no space, comma or control characters.
    fn is_channel_name(&self) -> bool;
}

impl<T: AsRef<str> + ?Sized> ChannelExt for T {
    fn is_channel_name(&self) -> bool {
        let name = self.as_ref();
        has_channel_prefix(name)
            && name.chars().count() <= MAX_CHANNEL_LEN
            && !name.chars().any(|c| c == ' ' || c == ',' || c.is_control())
    }
}

/// Trim `name` and prepend `#` unless it already has a channel prefix.
pub fn normalize_channel(name: &str) -> String {
    let name = name.trim();
    if has_channel_prefix(name) {
        name.to_string()
    } else {
        format!("#{name}")
    }
}
