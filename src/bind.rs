use std::fmt;

use crossterm::event::{KeyCode, MouseButton};
use serde::{Deserialize, Serialize};

use crate::action::Action;

/// Keys the tester keeps for itself: esc quits, backspace rebinds.
pub const RESERVED_KEYS: [&str; 2] = ["esc", "backspace"];

const NAMED_KEYS: [&str; 14] = [
    "space", "enter", "tab", "backtab", "left", "right", "up", "down", "home", "end", "pageup",
    "pagedown", "insert", "delete",
];

/// A keyboard key, either one lowercase character or a named key such as `space` or `f5`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct KeyName(String);

impl KeyName {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Name of a pressed key, or `None` for reserved and unsupported keys.
    pub fn from_key_code(code: KeyCode) -> Option<Self> {
        let name = match code {
            KeyCode::Char(' ') => "space".to_string(),
            KeyCode::Char(c) => c.to_lowercase().collect(),
            KeyCode::Enter => "enter".to_string(),
            KeyCode::Tab => "tab".to_string(),
            KeyCode::BackTab => "backtab".to_string(),
            KeyCode::Left => "left".to_string(),
            KeyCode::Right => "right".to_string(),
            KeyCode::Up => "up".to_string(),
            KeyCode::Down => "down".to_string(),
            KeyCode::Home => "home".to_string(),
            KeyCode::End => "end".to_string(),
            KeyCode::PageUp => "pageup".to_string(),
            KeyCode::PageDown => "pagedown".to_string(),
            KeyCode::Insert => "insert".to_string(),
            KeyCode::Delete => "delete".to_string(),
            KeyCode::F(n) if (1..=12).contains(&n) => format!("f{n}"),
            _ => return None,
        };
        KeyName::try_from(name).ok()
    }

    fn is_valid(name: &str) -> bool {
        if RESERVED_KEYS.contains(&name) {
            return false;
        }
        let mut chars = name.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => !c.is_uppercase() && !c.is_control() && !c.is_whitespace(),
            (Some(_), Some(_)) => {
                NAMED_KEYS.contains(&name)
                    || name
                        .strip_prefix('f')
                        .and_then(|n| n.parse::<u8>().ok())
                        .is_some_and(|n| (1..=12).contains(&n))
            }
            _ => false,
        }
    }
}

impl TryFrom<String> for KeyName {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if KeyName::is_valid(&value) {
            Ok(KeyName(value))
        } else {
            Err(format!("'{value}' is not a bindable key"))
        }
    }
}

impl From<KeyName> for String {
    fn from(k: KeyName) -> Self {
        k.0
    }
}

impl fmt::Display for KeyName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, strum_macros::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum MouseButtonName {
    Left,
    Right,
    Middle,
}

impl From<MouseButton> for MouseButtonName {
    fn from(b: MouseButton) -> Self {
        match b {
            MouseButton::Left => MouseButtonName::Left,
            MouseButton::Right => MouseButtonName::Right,
            MouseButton::Middle => MouseButtonName::Middle,
        }
    }
}

/// A physical input bound to an action.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum Bind {
    Keyboard(KeyName),
    Mouse(MouseButtonName),
}

impl Bind {
    pub fn from_key_code(code: KeyCode) -> Option<Self> {
        KeyName::from_key_code(code).map(Bind::Keyboard)
    }

    pub fn matches_key(&self, code: KeyCode) -> bool {
        match self {
            Bind::Keyboard(name) => KeyName::from_key_code(code).as_ref() == Some(name),
            Bind::Mouse(_) => false,
        }
    }

    pub fn matches_mouse(&self, button: MouseButton) -> bool {
        matches!(self, Bind::Mouse(b) if *b == MouseButtonName::from(button))
    }
}

impl fmt::Display for Bind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Bind::Keyboard(k) => write!(f, "Key '{k}'"),
            Bind::Mouse(b) => write!(f, "Mouse '{b}'"),
        }
    }
}

/// One optional bind per action. An empty slot never matches any input.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bindings {
    pub axe: Option<Bind>,
    pub mace: Option<Bind>,
    pub attack: Option<Bind>,
}

impl Bindings {
    pub fn get(&self, action: Action) -> Option<&Bind> {
        match action {
            Action::Attack => self.attack.as_ref(),
            Action::Axe => self.axe.as_ref(),
            Action::Mace => self.mace.as_ref(),
        }
    }

    pub fn set(&mut self, action: Action, bind: Bind) {
        let slot = match action {
            Action::Attack => &mut self.attack,
            Action::Axe => &mut self.axe,
            Action::Mace => &mut self.mace,
        };
        *slot = Some(bind);
    }

    /// Every action bound to this key; one key may drive several actions.
    pub fn actions_for_key(&self, code: KeyCode) -> Vec<Action> {
        self.matching(|b| b.matches_key(code))
    }

    pub fn actions_for_mouse(&self, button: MouseButton) -> Vec<Action> {
        self.matching(|b| b.matches_mouse(button))
    }

    fn matching(&self, pred: impl Fn(&Bind) -> bool) -> Vec<Action> {
        Action::ALL
            .into_iter()
            .filter(|a| self.get(*a).is_some_and(&pred))
            .collect()
    }

    /// First unbound slot in capture order
    pub fn missing(&self) -> Option<Action> {
        Action::CAPTURE_ORDER
            .into_iter()
            .find(|a| self.get(*a).is_none())
    }

    /// Display lines in capture order, e.g. ` Axe   : Key '1'`
    pub fn describe(&self) -> Vec<String> {
        Action::CAPTURE_ORDER
            .into_iter()
            .map(|a| {
                let label = capitalize(&a.to_string().to_lowercase());
                match self.get(a) {
                    Some(bind) => format!(" {label:6}: {bind}"),
                    None => format!(" {label:6}: <unbound>"),
                }
            })
            .collect()
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
