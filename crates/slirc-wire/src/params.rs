//! Parameter splitting for inbound lines.

/// Split an IRC parameter string into its arguments.
///
/// Middle parameters are separated by runs of spaces; the first parameter
/// that starts with `:` swallows the rest of the string (without the colon).
///
/// ```rust
/// use slirc_wire::split_params;
///
/// assert_eq!(split_params("bot :Welcome to IRC"), vec!["bot", "Welcome to IRC"]);
/// assert_eq!(split_params("#chan +o  alice"), vec!["#chan", "+o", "alice"]);
/// ```
pub fn split_params(data: &str) -> Vec<String> {
    let mut params = Vec::new();
    let mut rest = data.trim_end_matches(&['\r', '\n'][..]);

    loop {
        rest = rest.trim_start_matches(' ');
        if rest.is_empty() {
            break;
        }
        if let Some(trailing) = rest.strip_prefix(':') {
            params.push(trailing.to_string());
            break;
        }
        match rest.split_once(' ') {
            Some((param, tail)) => {
                params.push(param.to_string());
                rest = tail;
            }
            None => {
                params.push(rest.to_string());
                break;
            }
        }
    }

    params
}
