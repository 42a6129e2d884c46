use std::f32::consts::PI;

// ── Click pitch ───────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClickPitch { Low, High }

impl ClickPitch {
    pub fn frequency(self) -> f32 {
        match self {
            Self::Low  => 1000.0,
            Self::High => 1500.0,
        }
    }
}

const CLICK_SECONDS: f32 = 0.06;
const DECAY_TAU:     f32 = 0.012;
const ATTACK_SECONDS: f32 = 0.002;
const MAX_VOICES:    usize = 8;

// ── Single click voice ────────────────────────────────────────────────────────

/// One triggered click: a sine burst with a short ramp-in and exponential decay.
struct ClickVoice {
    freq:        f32,
    phase:       f32,
    sample_pos:  u64,
    dur_samples: u64,
    sample_rate: f32,
}

impl ClickVoice {
    fn new(pitch: ClickPitch, sample_rate: f32) -> Self {
        Self {
            freq: pitch.frequency(),
            phase: 0.0,
            sample_pos: 0,
            dur_samples: (CLICK_SECONDS * sample_rate).ceil() as u64,
            sample_rate,
        }
    }

    #[inline]
    fn is_finished(&self) -> bool {
        self.sample_pos >= self.dur_samples
    }

    fn next_sample(&mut self) -> f32 {
        if self.is_finished() { return 0.0; }
        let t    = self.sample_pos as f32 / self.sample_rate;
        let env  = (-t / DECAY_TAU).exp();
        let ramp = (t / ATTACK_SECONDS).clamp(0.0, 1.0);
        let out  = (self.phase * 2.0 * PI).sin() * env * ramp;

        self.phase += self.freq / self.sample_rate;
        if self.phase >= 1.0 { self.phase -= 1.0; }
        self.sample_pos += 1;
        out
    }
}

// ── Clicker ───────────────────────────────────────────────────────────────────

/// Metronome click generator shared between the UI thread (which triggers
/// clicks) and the audio callback (which renders them).
pub struct Clicker {
    pub sample_rate: f32,
    pub volume:      f32,
    voices:          Vec<ClickVoice>,
}

impl Clicker {
    pub fn new(sample_rate: f32) -> Self {
        Self {
            sample_rate,
            volume: 0.7,
            voices: Vec::with_capacity(MAX_VOICES),
        }
    }

    /// Fire-and-forget; the oldest voice is dropped when the pool is full.
    pub fn play_click(&mut self, pitch: ClickPitch) {
        if self.voices.len() >= MAX_VOICES {
            self.voices.remove(0);
        }
        self.voices.push(ClickVoice::new(pitch, self.sample_rate));
    }

    /// Called once per audio frame.
    pub fn generate_sample(&mut self) -> f32 {
        if self.voices.is_empty() { return 0.0; }
        let mut mix = 0.0f32;
        for v in self.voices.iter_mut() { mix += v.next_sample(); }
        self.voices.retain(|v| !v.is_finished());
        (mix * self.volume).tanh()
    }

    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.voices.clear();
    }

    #[cfg(test)]
    pub fn active_voices(&self) -> usize { self.voices.len() }

    /// Frequencies of the sounding voices, oldest first.
    #[cfg(test)]
    pub fn voice_frequencies(&self) -> Vec<f32> {
        self.voices.iter().map(|v| v.freq).collect()
    }
}
