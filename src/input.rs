use bevy::prelude::*;

use crate::game_logic::RESTART_COOLDOWN_MS;

/// Held/released state of every logical action for one frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RawKeyState {
    pub accelerate: bool,
    pub brake: bool,
    pub steer_left: bool,
    pub steer_right: bool,
    pub handbrake: bool,
    pub restart: bool,
    pub pause: bool,
}

impl RawKeyState {
    /// Read the keyboard through a set of bindings. Any bound key counts as held.
    pub fn from_keyboard(keyboard: &ButtonInput<KeyCode>, bindings: &KeyBindings) -> Self {
        let held = |keys: &[KeyCode]| keyboard.any_pressed(keys.iter().copied());
        Self {
            accelerate: held(&bindings.accelerate),
            brake: held(&bindings.brake),
            steer_left: held(&bindings.steer_left),
            steer_right: held(&bindings.steer_right),
            handbrake: held(&bindings.handbrake),
            restart: held(&bindings.restart),
            pause: held(&bindings.pause),
        }
    }
}

/// Per-frame driving intent derived from raw keys.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct InputSignal {
    /// -1 brake/reverse, 0 coast, +1 accelerate
    pub acceleration_axis: f32,
    /// -1 left (counter-clockwise on screen), +1 right
    pub steering_axis: f32,
    pub handbrake_held: bool,
    /// Rising edge of the restart key, outside the cooldown window
    pub restart_triggered: bool,
    /// Rising edge of the pause key
    pub pause_triggered: bool,
}

impl InputSignal {
    pub fn is_accelerating(&self) -> bool {
        self.acceleration_axis > 0.0
    }

    pub fn is_braking(&self) -> bool {
        self.acceleration_axis < 0.0
    }
}

/// Opposing keys cancel to 0.
fn axis(negative: bool, positive: bool) -> f32 {
    match (negative, positive) {
        (false, true) => 1.0,
        (true, false) => -1.0,
        _ => 0.0,
    }
}

/// Turns raw key state into an [`InputSignal`], tracking the edges and the
/// restart cooldown. Owned by the car or session it samples for.
#[derive(Component, Debug, Clone)]
pub struct InputSampler {
    restart_cooldown_ms: u64,
    previous: RawKeyState,
    last_restart_ms: Option<u64>,
    last_sample: Option<(u64, InputSignal)>,
}

impl Default for InputSampler {
    fn default() -> Self {
        Self::new(RESTART_COOLDOWN_MS)
    }
}

impl InputSampler {
    pub fn new(restart_cooldown_ms: u64) -> Self {
        Self {
            restart_cooldown_ms,
            previous: RawKeyState::default(),
            last_restart_ms: None,
            last_sample: None,
        }
    }

    /// Sample once per frame.
    ///
    /// A second call with the same `now_millis` returns the cached signal with
    /// the edge flags cleared, so an edge is only ever reported once. A restart
    /// edge inside the cooldown window of the last accepted restart is dropped.
    pub fn sample(&mut self, raw: RawKeyState, now_millis: u64) -> InputSignal {
        if let Some((sampled_at, cached)) = self.last_sample {
            if sampled_at == now_millis {
                return InputSignal {
                    restart_triggered: false,
                    pause_triggered: false,
                    ..cached
                };
            }
        }

        let restart_edge = raw.restart && !self.previous.restart;
        let cooled_down = self
            .last_restart_ms
            .map_or(true, |last| now_millis.saturating_sub(last) >= self.restart_cooldown_ms);
        let restart_triggered = restart_edge && cooled_down;
        if restart_triggered {
            self.last_restart_ms = Some(now_millis);
        }

        let signal = InputSignal {
            acceleration_axis: axis(raw.brake, raw.accelerate),
            steering_axis: axis(raw.steer_left, raw.steer_right),
            handbrake_held: raw.handbrake,
            restart_triggered,
            pause_triggered: raw.pause && !self.previous.pause,
        };

        self.previous = raw;
        self.last_sample = Some((now_millis, signal));
        signal
    }
}

/// Logical action to physical keys.
#[derive(Resource, Debug, Clone)]
pub struct KeyBindings {
    pub accelerate: Vec<KeyCode>,
    pub brake: Vec<KeyCode>,
    pub steer_left: Vec<KeyCode>,
    pub steer_right: Vec<KeyCode>,
    pub handbrake: Vec<KeyCode>,
    pub restart: Vec<KeyCode>,
    pub pause: Vec<KeyCode>,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            accelerate: vec![KeyCode::KeyW, KeyCode::ArrowUp],
            brake: vec![KeyCode::KeyS, KeyCode::ArrowDown],
            steer_left: vec![KeyCode::KeyA, KeyCode::ArrowLeft],
            steer_right: vec![KeyCode::KeyD, KeyCode::ArrowRight],
            handbrake: vec![KeyCode::Space],
            restart: vec![KeyCode::KeyR],
            pause: vec![KeyCode::KeyP, KeyCode::Escape],
        }
    }
}
