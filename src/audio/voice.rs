use crate::core::playback::{ATTACK_SECONDS, RELEASE_SECONDS};

/// Envelope stage of a voice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoiceState {
    Idle,
    Attack,
    Sustain,
    Release,
}

/// Triangle tone with a linear attack/release envelope.
#[derive(Debug, Clone)]
pub struct Voice {
    pub frequency: f32,
    pub volume: f32,
    pub state: VoiceState,
    phase: f32,
    time_in_state: f32,
    level: f32,
    release_from: f32,
}

/// Triangle wave for a phase in [0, 1).
pub fn triangle(phase: f32) -> f32 {
    if phase < 0.25 {
        4.0 * phase
    } else if phase < 0.75 {
        2.0 - 4.0 * phase
    } else {
        -4.0 + 4.0 * phase
    }
}

impl Voice {
    pub fn new(frequency: f32) -> Self {
        Self {
            frequency,
            volume: 1.0,
            state: VoiceState::Idle,
            phase: 0.0,
            time_in_state: 0.0,
            level: 0.0,
            release_from: 0.0,
        }
    }

    /// Begin the attack from the current level.
    pub fn start(&mut self) {
        self.state = VoiceState::Attack;
        self.time_in_state = self.level * ATTACK_SECONDS;
    }

    /// Begin the release from the current level.
    pub fn stop(&mut self) {
        if matches!(self.state, VoiceState::Attack | VoiceState::Sustain) {
            self.state = VoiceState::Release;
            self.time_in_state = 0.0;
            self.release_from = self.level;
        }
    }

    pub fn is_sounding(&self) -> bool {
        self.state != VoiceState::Idle
    }

    /// Current envelope level in [0, 1].
    pub fn level(&self) -> f32 {
        self.level
    }

    fn advance_envelope(&mut self, dt: f32) {
        match self.state {
            VoiceState::Idle => self.level = 0.0,
            VoiceState::Attack => {
                self.time_in_state += dt;
                self.level = (self.time_in_state / ATTACK_SECONDS).min(1.0);
                if self.level >= 1.0 {
                    self.state = VoiceState::Sustain;
                    self.time_in_state = 0.0;
                }
            }
            VoiceState::Sustain => self.level = 1.0,
            VoiceState::Release => {
                self.time_in_state += dt;
                let remaining = 1.0 - self.time_in_state / RELEASE_SECONDS;
                if remaining <= 0.0 {
                    self.state = VoiceState::Idle;
                    self.level = 0.0;
                } else {
                    self.level = self.release_from * remaining;
                }
            }
        }
    }

    /// Produce the next sample.
    pub fn next_sample(&mut self, sample_rate: f32) -> f32 {
        if self.state == VoiceState::Idle {
            return 0.0;
        }

        let dt = 1.0 / sample_rate;
        self.advance_envelope(dt);
        let value = triangle(self.phase) * self.level * self.volume;
        self.phase = (self.phase + self.frequency * dt) % 1.0;
        value
    }
}
