// src/input.rs
//! Console commands → `UserInput`.

use crate::gesture::PointerGesture;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UserInput {
    Next,
    Prev,
    ToggleExpand,
    Refresh,
    SetHours(u32),
    PointerDown,
    /// A complete press-and-release over the ticker surface.
    Pointer(PointerGesture),
    Visibility(bool),
    Quit,
}

pub const HELP: &str = "commands: n|next  p|prev  e|expand  r|refresh  h <hours>  \
tap <x> <width>  drag <x0> <x1> <width>  hide  show  q|quit";

/// Parse one line typed on stdin. `None` for blank or unknown input.
pub fn parse_command(line: &str) -> Option<UserInput> {
    let mut parts = line.split_whitespace();
    let cmd = parts.next()?.to_ascii_lowercase();
    let nums: Vec<f32> = parts.map(|p| p.parse::<f32>().ok()).collect::<Option<_>>()?;

    let input = match (cmd.as_str(), nums.as_slice()) {
        ("n" | "next", []) => UserInput::Next,
        ("p" | "prev", []) => UserInput::Prev,
        ("e" | "expand", []) => UserInput::ToggleExpand,
        ("r" | "refresh", []) => UserInput::Refresh,
        ("h" | "hours", [h]) if *h >= 0.0 && h.fract() == 0.0 => UserInput::SetHours(*h as u32),
        ("tap", [x, w]) => UserInput::Pointer(PointerGesture::tap(*x, *w)),
        ("drag", [x0, x1, w]) => UserInput::Pointer(PointerGesture::drag(*x0, *x1, *w)),
        ("hide", []) => UserInput::Visibility(false),
        ("show", []) => UserInput::Visibility(true),
        ("q" | "quit" | "exit", []) => UserInput::Quit,
        _ => return None,
    };
    Some(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_commands_and_arguments() {
        assert_eq!(parse_command("  n "), Some(UserInput::Next));
        assert_eq!(parse_command("PREV"), Some(UserInput::Prev));
        assert_eq!(parse_command("h 8"), Some(UserInput::SetHours(8)));
        assert_eq!(
            parse_command("drag 300 250 400"),
            Some(UserInput::Pointer(PointerGesture::drag(300.0, 250.0, 400.0)))
        );
        assert_eq!(
            parse_command("tap 10 400"),
            Some(UserInput::Pointer(PointerGesture::tap(10.0, 400.0)))
        );
        assert_eq!(parse_command("hide"), Some(UserInput::Visibility(false)));
    }

    #[test]
    fn rejects_blank_unknown_and_bad_arity() {
        assert_eq!(parse_command(""), None);
        assert_eq!(parse_command("dance"), None);
        assert_eq!(parse_command("h"), None);
        assert_eq!(parse_command("h 2.5"), None);
        assert_eq!(parse_command("tap 10"), None);
        assert_eq!(parse_command("n 1"), None);
        assert_eq!(parse_command("drag a b c"), None);
    }
}
