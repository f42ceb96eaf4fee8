//! The four driving inputs of a car and where they come from.

use serde::{Deserialize, Serialize};

/// Who drives a car.
#[derive(PartialEq, Eq, Debug, Clone, Copy, Serialize, Deserialize)]
pub enum ControlType {
    /// The arrow keys of the player.
    Keys,
    /// Traffic, always pushing forward.
    Dummy,
    /// The car's own neural network.
    Ai,
}

/// Snapshot of the arrow keys, filled by the front end each frame.
#[derive(PartialEq, Eq, Debug, Clone, Copy, Default)]
pub struct KeyState {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

/// The currently active driving commands.
#[derive(PartialEq, Eq, Debug, Clone, Copy, Default)]
pub struct Controls {
    pub forward: bool,
    pub left: bool,
    pub right: bool,
    pub reverse: bool,
}

impl Controls {
    pub fn new(control_type: ControlType) -> Self {
        Controls {
            forward: control_type == ControlType::Dummy,
            ..Default::default()
        }
    }

    /// Takes over the pressed arrow keys.
    pub fn apply_keys(&mut self, keys: KeyState) {
        self.forward = keys.up;
        self.reverse = keys.down;
        self.left = keys.left;
        self.right = keys.right;
    }

    /// Takes over the network decision in the order forward, left, right, reverse.
    /// Missing outputs count as released.
    pub fn apply_network_outputs(&mut self, outputs: &[f32]) {
        let pressed = |index: usize| outputs.get(index).is_some_and(|value| *value != 0.0);
        self.forward = pressed(0);
        self.left = pressed(1);
        self.right = pressed(2);
        self.reverse = pressed(3);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dummy_starts_driving_forward() {
        assert!(Controls::new(ControlType::Dummy).forward);
        assert_eq!(Controls::new(ControlType::Keys), Controls::default());
        assert_eq!(Controls::new(ControlType::Ai), Controls::default());
    }

    #[test]
    fn network_outputs_map_in_order() {
        let mut controls = Controls::default();
        controls.apply_network_outputs(&[1.0, 0.0, 1.0, 0.0]);
        assert_eq!(
            controls,
            Controls {
                forward: true,
                left: false,
                right: true,
                reverse: false
            }
        );
    }

    #[test]
    fn short_network_output_releases_rest() {
        let mut controls = Controls::new(ControlType::Dummy);
        controls.apply_network_outputs(&[0.0]);
        assert_eq!(controls, Controls::default());
    }

    #[test]
    fn keys_map_to_controls() {
        let mut controls = Controls::default();
        controls.apply_keys(KeyState {
            up: true,
            down: false,
            left: true,
            right: false,
        });
        assert!(controls.forward && controls.left);
        assert!(!controls.reverse && !controls.right);
    }
}
