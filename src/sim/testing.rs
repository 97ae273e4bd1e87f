//! Test double for the collaborator seam

use super::events::{Collaborator, Effect, HudSnapshot, Sound, TimerHandle};

/// Records every request and hands out sequential timer handles
#[derive(Debug, Default)]
pub struct RecordingCollaborator {
    pub effects: Vec<Effect>,
    pub timers: Vec<(TimerHandle, u32)>,
    pub cancelled: Vec<TimerHandle>,
    pub huds: Vec<HudSnapshot>,
    next_handle: u64,
}

impl RecordingCollaborator {
    pub fn sounds(&self) -> Vec<Sound> {
        self.effects
            .iter()
            .filter_map(|e| match e {
                Effect::PlaySound(sound) => Some(*sound),
                _ => None,
            })
            .collect()
    }

    pub fn texts(&self) -> Vec<&str> {
        self.effects
            .iter()
            .filter_map(|e| match e {
                Effect::ShowText { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn last_timer(&self) -> TimerHandle {
        self.timers.last().map(|(h, _)| *h).expect("no timer requested")
    }

    pub fn last_hud(&self) -> HudSnapshot {
        *self.huds.last().expect("no HUD update")
    }
}

impl Collaborator for RecordingCollaborator {
    fn request_effect(&mut self, effect: Effect) {
        self.effects.push(effect);
    }

    fn request_timer(&mut self, duration_ms: u32) -> TimerHandle {
        self.next_handle += 1;
        let handle = TimerHandle(self.next_handle);
        self.timers.push((handle, duration_ms));
        handle
    }

    fn cancel_timer(&mut self, handle: TimerHandle) {
        self.cancelled.push(handle);
    }

    fn update_hud(&mut self, hud: &HudSnapshot) {
        self.huds.push(*hud);
    }
}
