/// One of the three inputs that make up a stun slam.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, strum_macros::Display)]
#[strum(serialize_all = "UPPERCASE")]
pub enum Action {
    /// primary attack
    Attack,
    /// swap to the axe (first tool)
    Axe,
    /// swap to the mace (second tool)
    Mace,
}

impl Action {
    pub const ALL: [Action; 3] = [Action::Attack, Action::Axe, Action::Mace];

    /// Order in which the capture flow asks for binds
    pub const CAPTURE_ORDER: [Action; 3] = [Action::Axe, Action::Mace, Action::Attack];

    fn bit(self) -> u8 {
        match self {
            Action::Attack => 0b001,
            Action::Axe => 0b010,
            Action::Mace => 0b100,
        }
    }

    /// Vertical lane used by the timeline
    pub fn lane(self) -> f64 {
        match self {
            Action::Attack => 2.0,
            Action::Axe => 1.0,
            Action::Mace => 0.0,
        }
    }

    /// Next slot to capture after this one, if any
    pub fn next_to_capture(self) -> Option<Action> {
        let idx = Self::CAPTURE_ORDER.iter().position(|a| *a == self)?;
        Self::CAPTURE_ORDER.get(idx + 1).copied()
    }
}

/// A recorded input, timestamped relative to the start of its attempt.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct InputEvent {
    pub timestamp_ms: f64,
    pub action: Action,
}

impl InputEvent {
    pub fn new(timestamp_ms: f64, action: Action) -> Self {
        Self {
            timestamp_ms,
            action,
        }
    }
}

impl From<(f64, Action)> for InputEvent {
    fn from(v: (f64, Action)) -> Self {
        InputEvent::new(v.0, v.1)
    }
}

/// Set of actions that landed in the same tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ActionSet(u8);

impl ActionSet {
    pub fn insert(&mut self, action: Action) {
        self.0 |= action.bit();
    }

    pub fn contains(&self, action: Action) -> bool {
        self.0 & action.bit() != 0
    }
}

impl FromIterator<Action> for ActionSet {
    fn from_iter<I: IntoIterator<Item = Action>>(iter: I) -> Self {
        let mut set = ActionSet::default();
        for action in iter {
            set.insert(action);
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_labels() {
        assert_eq!(Action::Attack.to_string(), "ATTACK");
        assert_eq!(Action::Axe.to_string(), "AXE");
        assert_eq!(Action::Mace.to_string(), "MACE");
    }

    #[test]
    fn capture_order_walks_axe_mace_attack() {
        assert_eq!(Action::Axe.next_to_capture(), Some(Action::Mace));
        assert_eq!(Action::Mace.next_to_capture(), Some(Action::Attack));
        assert_eq!(Action::Attack.next_to_capture(), None);
    }

    #[test]
    fn action_set_membership() {
        let set: ActionSet = [Action::Attack, Action::Mace].into_iter().collect();
        assert!(set.contains(Action::Attack));
        assert!(set.contains(Action::Mace));
        assert!(!set.contains(Action::Axe));
        assert!(!ActionSet::default().contains(Action::Attack));
    }
}
