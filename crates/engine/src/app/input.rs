use harness_proto::HeldKey;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputAction {
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,
    Fire,
    Reload,
    Confirm,
    Quit,
}

const ACTION_COUNT: usize = 8;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct ActionStates {
    down: [bool; ACTION_COUNT],
}

impl ActionStates {
    pub(crate) fn set(&mut self, action: InputAction, is_down: bool) {
        self.down[action.index()] = is_down;
    }

    pub(crate) fn is_down(&self, action: InputAction) -> bool {
        self.down[action.index()]
    }

    /// Union of two action sets.
    pub(crate) fn merged(self, other: ActionStates) -> ActionStates {
        let mut down = self.down;
        for (slot, other_down) in down.iter_mut().zip(other.down) {
            *slot |= other_down;
        }
        ActionStates { down }
    }
}

impl InputAction {
    pub const ALL: [InputAction; ACTION_COUNT] = [
        InputAction::MoveUp,
        InputAction::MoveDown,
        InputAction::MoveLeft,
        InputAction::MoveRight,
        InputAction::Fire,
        InputAction::Reload,
        InputAction::Confirm,
        InputAction::Quit,
    ];

    const fn index(self) -> usize {
        match self {
            InputAction::MoveUp => 0,
            InputAction::MoveDown => 1,
            InputAction::MoveLeft => 2,
            InputAction::MoveRight => 3,
            InputAction::Fire => 4,
            InputAction::Reload => 5,
            InputAction::Confirm => 6,
            InputAction::Quit => 7,
        }
    }

    pub fn from_held_key(key: HeldKey) -> Self {
        match key {
            HeldKey::Up => InputAction::MoveUp,
            HeldKey::Down => InputAction::MoveDown,
            HeldKey::Left => InputAction::MoveLeft,
            HeldKey::Right => InputAction::MoveRight,
            HeldKey::Fire => InputAction::Fire,
            HeldKey::Reload => InputAction::Reload,
            HeldKey::Confirm => InputAction::Confirm,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merged_is_union_of_both_sets() {
        let mut a = ActionStates::default();
        a.set(InputAction::MoveUp, true);
        let mut b = ActionStates::default();
        b.set(InputAction::Fire, true);

        let merged = a.merged(b);
        assert!(merged.is_down(InputAction::MoveUp));
        assert!(merged.is_down(InputAction::Fire));
        assert!(!merged.is_down(InputAction::Reload));
    }

    #[test]
    fn every_held_key_maps_to_a_distinct_action() {
        let mut seen = ActionStates::default();
        for key in HeldKey::ALL {
            let action = InputAction::from_held_key(key);
            assert!(!seen.is_down(action), "{key:?} collides");
            seen.set(action, true);
        }
    }
}
