use std::fmt;

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HeldKey {
    Up,
    Down,
    Left,
    Right,
    Fire,
    Reload,
    Confirm,
}

impl HeldKey {
    pub const ALL: [HeldKey; 7] = [
        HeldKey::Up,
        HeldKey::Down,
        HeldKey::Left,
        HeldKey::Right,
        HeldKey::Fire,
        HeldKey::Reload,
        HeldKey::Confirm,
    ];

    pub fn as_token(self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
            Self::Left => "left",
            Self::Right => "right",
            Self::Fire => "fire",
            Self::Reload => "reload",
            Self::Confirm => "confirm",
        }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|key| key.as_token().eq_ignore_ascii_case(token))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionParseError {
    #[error("action is empty")]
    Empty,
    #[error("unknown action token '{0}'")]
    UnknownToken(String),
    #[error("invalid click point '{0}' (expected click:<x>,<y>)")]
    InvalidClick(String),
    #[error("action lists more than one click point")]
    DuplicateClick,
}

/// A synthetic input held for the duration of a harness `execute`.
///
/// Text form is `+`-joined tokens, e.g. `up+left+fire` or `click:120,80`.
#[derive(Debug, Clone, PartialEq)]
pub struct HarnessAction {
    pub keys: Vec<HeldKey>,
    pub click: Option<(f32, f32)>,
}

impl HarnessAction {
    pub fn parse(text: &str) -> Result<Self, ActionParseError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(ActionParseError::Empty);
        }

        let mut keys = Vec::new();
        let mut click = None;
        for token in trimmed.split('+').map(str::trim) {
            if token.is_empty() {
                return Err(ActionParseError::Empty);
            }
            if let Some(point) = token.strip_prefix("click:") {
                if click.is_some() {
                    return Err(ActionParseError::DuplicateClick);
                }
                click = Some(parse_click_point(point)?);
                continue;
            }
            let key = HeldKey::from_token(token)
                .ok_or_else(|| ActionParseError::UnknownToken(token.to_string()))?;
            if !keys.contains(&key) {
                keys.push(key);
            }
        }

        Ok(Self { keys, click })
    }

    pub fn holds(&self, key: HeldKey) -> bool {
        self.keys.contains(&key)
    }

    pub fn describe(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for HarnessAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for key in &self.keys {
            if !first {
                f.write_str("+")?;
            }
            f.write_str(key.as_token())?;
            first = false;
        }
        if let Some((x, y)) = self.click {
            if !first {
                f.write_str("+")?;
            }
            write!(f, "click:{x},{y}")?;
        }
        Ok(())
    }
}

fn parse_click_point(raw: &str) -> Result<(f32, f32), ActionParseError> {
    let invalid = || ActionParseError::InvalidClick(raw.to_string());
    let (x, y) = raw.split_once(',').ok_or_else(invalid)?;
    let x = x.trim().parse::<f32>().map_err(|_| invalid())?;
    let y = y.trim().parse::<f32>().map_err(|_| invalid())?;
    if !x.is_finite() || !y.is_finite() {
        return Err(invalid());
    }
    Ok((x, y))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_joined_keys_case_insensitively() {
        let action = HarnessAction::parse("Up+left+FIRE").expect("parse");
        assert_eq!(
            action.keys,
            vec![HeldKey::Up, HeldKey::Left, HeldKey::Fire]
        );
        assert!(action.click.is_none());
        assert_eq!(action.describe(), "up+left+fire");
    }

    #[test]
    fn parses_click_point_alongside_keys() {
        let action = HarnessAction::parse("right+click:120,80.5").expect("parse");
        assert!(action.holds(HeldKey::Right));
        assert_eq!(action.click, Some((120.0, 80.5)));
    }

    #[test]
    fn repeated_keys_collapse() {
        let action = HarnessAction::parse("fire+fire").expect("parse");
        assert_eq!(action.keys, vec![HeldKey::Fire]);
    }

    #[test]
    fn rejects_bad_input() {
        assert_eq!(HarnessAction::parse("  "), Err(ActionParseError::Empty));
        assert_eq!(HarnessAction::parse("up++down"), Err(ActionParseError::Empty));
        assert_eq!(
            HarnessAction::parse("jump"),
            Err(ActionParseError::UnknownToken("jump".to_string()))
        );
        assert!(matches!(
            HarnessAction::parse("click:12"),
            Err(ActionParseError::InvalidClick(_))
        ));
        assert!(matches!(
            HarnessAction::parse("click:nan,4"),
            Err(ActionParseError::InvalidClick(_))
        ));
        assert_eq!(
            HarnessAction::parse("click:1,2+click:3,4"),
            Err(ActionParseError::DuplicateClick)
        );
    }
}
