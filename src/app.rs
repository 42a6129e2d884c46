use std::sync::{Arc, Mutex};
use std::time::Instant;

use crate::click::{ClickPitch, Clicker};
use crate::keys::{chord_table, ChordTable, Key, DEGREES};
use crate::metronome::{Metronome, Tick};
use crate::selector::{SelectError, Selector};
use crate::theme::Accent;

/// Startup values, from the config file and command line.
pub struct Settings {
    pub key:      Key,
    pub tempo:    u32,
    pub volume:   f32,
    pub accent:   Accent,
    pub disabled: [bool; DEGREES],
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            key:      Key::C,
            tempo:    80,
            volume:   0.7,
            accent:   Accent::default(),
            disabled: [false; DEGREES],
        }
    }
}

const NO_SELECTABLE_MSG: &str = "No selectable degree: enable more chords with 1-7";

// ── App state ─────────────────────────────────────────────────────────────────

/// All trainer state, owned by the UI thread.  Key handlers and the frame
/// loop call the command methods; `ui::draw` only reads.
pub struct App {
    pub clicker:     Arc<Mutex<Clicker>>,
    pub key:         Key,
    pub table:       ChordTable,
    pub selector:    Selector,
    pub metronome:   Metronome,
    pub accent:      Accent,
    pub should_quit: bool,
    pub status_msg:  String,
    rng:             fastrand::Rng,
}

impl App {
    pub fn new(clicker: Arc<Mutex<Clicker>>, settings: Settings) -> Self {
        Self::with_rng(clicker, settings, fastrand::Rng::new())
    }

    pub fn with_rng(clicker: Arc<Mutex<Clicker>>, settings: Settings, rng: fastrand::Rng) -> Self {
        if let Ok(mut c) = clicker.lock() {
            c.volume = settings.volume.clamp(0.0, 1.0);
        }
        Self {
            clicker,
            key:         settings.key,
            table:       chord_table(settings.key),
            selector:    Selector::with_disabled(settings.disabled),
            metronome:   Metronome::new(settings.tempo),
            accent:      settings.accent,
            should_quit: false,
            status_msg:  String::new(),
            rng,
        }
    }

    // ── Key selection ─────────────────────────────────────────────────────

    /// Key button pressed.  Pressing the shown key again flips its spelling.
    pub fn select_key(&mut self, selected: Key) {
        self.set_key(Key::toggle_from(self.key, selected));
    }

    pub fn cycle_key(&mut self) {
        self.set_key(self.key.next());
    }

    fn set_key(&mut self, key: Key) {
        if key != self.key {
            log::info!("key {} -> {}", self.key, key);
        }
        self.key   = key;
        self.table = chord_table(key);
        self.status_msg = format!("Key: {}", key);
    }

    // ── Chord selection ───────────────────────────────────────────────────

    /// Move to a new random chord.  Used by the manual switch and the downbeat.
    pub fn switch_chord(&mut self) {
        match self.selector.advance(&mut self.rng) {
            Ok(degree) => {
                log::debug!("chord -> {} (degree {})", self.table[degree], degree + 1);
                if self.status_msg == NO_SELECTABLE_MSG {
                    self.status_msg.clear();
                }
            }
            Err(SelectError::NoSelectableDegree) => {
                log::warn!("no selectable degree; {} enabled", self.selector.selectable_count());
                self.status_msg = NO_SELECTABLE_MSG.to_string();
            }
        }
    }

    pub fn toggle_degree(&mut self, degree: usize) {
        if degree >= DEGREES { return; }
        self.selector.toggle_disabled(degree);
        let state = if self.selector.is_disabled(degree) { "off" } else { "on" };
        self.status_msg = format!("{}: {}", self.table[degree], state);
    }

    pub fn reset(&mut self) {
        self.selector.reset();
        self.status_msg = "Reset".to_string();
    }

    // ── Metronome ─────────────────────────────────────────────────────────

    pub fn start_metronome(&mut self, now: Instant) {
        if self.metronome.start(now) {
            self.selector.reset();
            log::info!("metronome started at {} bpm", self.metronome.tempo());
            self.status_msg = "Metronome: Playing".to_string();
        }
    }

    pub fn stop_metronome(&mut self) {
        if self.metronome.stop() {
            log::info!("metronome stopped");
            self.status_msg = "Metronome: Stopped".to_string();
        }
    }

    pub fn toggle_metronome(&mut self, now: Instant) {
        if self.metronome.running() { self.stop_metronome(); } else { self.start_metronome(now); }
    }

    pub fn tempo_up(&mut self, now: Instant) {
        self.metronome.tempo_up(now);
        self.tempo_changed();
    }

    pub fn tempo_down(&mut self, now: Instant) {
        self.metronome.tempo_down(now);
        self.tempo_changed();
    }

    fn tempo_changed(&mut self) {
        log::info!("tempo {} bpm", self.metronome.tempo());
        self.status_msg = format!("BPM: {}", self.metronome.tempo());
    }

    /// Called every frame.  Handles every beat that has come due.
    pub fn tick(&mut self, now: Instant) {
        while let Some(tick) = self.metronome.poll(now) {
            self.on_beat(tick);
        }
    }

    fn on_beat(&mut self, tick: Tick) {
        let pitch = if tick.downbeat { ClickPitch::High } else { ClickPitch::Low };
        if let Ok(mut c) = self.clicker.lock() {
            c.play_click(pitch);
        }
        if tick.downbeat {
            self.switch_chord();
        }
    }

    // ── Output ────────────────────────────────────────────────────────────

    pub fn volume_up(&mut self) {
        if let Ok(mut c) = self.clicker.lock() {
            c.volume = (c.volume + 0.05).min(1.0);
            self.status_msg = format!("Volume: {:.0}%", c.volume * 100.0);
        }
    }

    pub fn volume_down(&mut self) {
        if let Ok(mut c) = self.clicker.lock() {
            c.volume = (c.volume - 0.05).max(0.0);
            self.status_msg = format!("Volume: {:.0}%", c.volume * 100.0);
        }
    }

    pub fn cycle_accent(&mut self) {
        self.accent = self.accent.next();
        self.status_msg = format!("Colour: {}", self.accent.name());
    }

    /// Stop the metronome before the audio stream goes away.
    pub fn shutdown(&mut self) {
        self.stop_metronome();
        log::info!("shutting down");
    }

    // ── UI read helpers ───────────────────────────────────────────────────

    pub fn current_chord(&self) -> &str {
        &self.table[self.selector.pending()]
    }

    pub fn previous_chord(&self) -> Option<&str> {
        self.selector.previous().map(|d| self.table[d].as_str())
    }

    pub fn volume(&self) -> f32 {
        self.clicker.lock().map(|c| c.volume).unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn app() -> App {
        let clicker = Arc::new(Mutex::new(Clicker::new(44_100.0)));
        App::with_rng(clicker, Settings { tempo: 60, ..Settings::default() }, fastrand::Rng::with_seed(3))
    }

    fn ms(n: u64) -> Duration { Duration::from_millis(n) }

    #[test]
    fn starts_on_tonic_chord() {
        let app = app();
        assert_eq!(app.current_chord(), "CMaj7");
        assert_eq!(app.previous_chord(), None);
    }

    #[test]
    fn switch_chord_changes_display() {
        let mut app = app();
        app.switch_chord();
        assert_ne!(app.current_chord(), "CMaj7");
        assert_eq!(app.previous_chord(), Some("CMaj7"));
    }

    #[test]
    fn key_button_toggles_enharmonic() {
        let mut app = app();
        app.select_key(Key::CSharp);
        assert_eq!(app.key, Key::CSharp);
        app.select_key(Key::CSharp);
        assert_eq!(app.key, Key::DFlat);
        assert_eq!(app.table[0], "DbMaj7");
        app.select_key(Key::DFlat);
        assert_eq!(app.key, Key::CSharp);
    }

    #[test]
    fn key_change_keeps_disabled_and_pending() {
        let mut app = app();
        app.switch_chord();
        let pending = app.selector.pending();
        app.toggle_degree(6);
        app.select_key(Key::FSharp);
        assert!(app.selector.is_disabled(6));
        assert_eq!(app.selector.pending(), pending);
        assert_eq!(app.current_chord(), chord_table(Key::FSharp)[pending]);
    }

    #[test]
    fn cycle_key_reaches_c_flat() {
        let mut app = app();
        while app.key != Key::CFlat { app.cycle_key(); }
        assert_eq!(app.table[3], "FbMaj7");
    }

    #[test]
    fn chord_advances_once_per_bar() {
        let t0 = Instant::now();
        let mut app = app();
        app.start_metronome(t0);
        let mut changes = 0;
        let mut last = app.selector.pending();
        for beat in 1..=16u64 {
            app.tick(t0 + ms(1000 * beat));
            if app.selector.pending() != last {
                changes += 1;
                assert_eq!(beat % 4, 0, "chord changed on tick {beat}");
                last = app.selector.pending();
            }
        }
        assert_eq!(changes, 4);
    }

    #[test]
    fn clicks_are_high_on_downbeat_only() {
        let t0 = Instant::now();
        let mut app = app();
        app.start_metronome(t0);
        for beat in 1..=4u64 {
            app.tick(t0 + ms(1000 * beat));
        }
        let (low, high) = (ClickPitch::Low.frequency(), ClickPitch::High.frequency());
        assert_eq!(app.clicker.lock().unwrap().voice_frequencies(), vec![low, low, low, high]);
    }

    #[test]
    fn starting_metronome_resets_visited() {
        let mut app = app();
        app.switch_chord();
        app.switch_chord();
        app.start_metronome(Instant::now());
        assert!((0..DEGREES).all(|i| !app.selector.is_visited(i)));
        assert_eq!(app.metronome.beat(), 1);
    }

    #[test]
    fn stopped_metronome_never_ticks() {
        let t0 = Instant::now();
        let mut app = app();
        app.start_metronome(t0);
        app.tick(t0 + ms(1000));
        app.stop_metronome();
        let pending = app.selector.pending();
        app.tick(t0 + ms(60_000));
        assert_eq!(app.selector.pending(), pending);
        assert_eq!(app.clicker.lock().unwrap().active_voices(), 1);
    }

    #[test]
    fn tempo_changes_while_running() {
        let t0 = Instant::now();
        let mut app = app();
        app.start_metronome(t0);
        app.tempo_up(t0 + ms(100));
        assert_eq!(app.metronome.tempo(), 70);
        assert_eq!(app.status_msg, "BPM: 70");
        assert!(app.metronome.running());
    }

    #[test]
    fn no_selectable_degree_is_reported() {
        let mut app = app();
        for i in 1..DEGREES { app.toggle_degree(i); }
        app.switch_chord();
        assert_eq!(app.selector.pending(), 0);
        assert!(app.status_msg.starts_with("No selectable degree"));

        app.selector.toggle_disabled(1);
        app.switch_chord();
        assert_eq!(app.selector.pending(), 1);
        assert_eq!(app.status_msg, "");
    }

    #[test]
    fn chord_change_keeps_other_status_messages() {
        let t0 = Instant::now();
        let mut app = app();
        app.status_msg = "No audio output: metronome is silent".to_string();
        app.switch_chord();
        assert_eq!(app.status_msg, "No audio output: metronome is silent");

        app.start_metronome(t0);
        app.tempo_up(t0);
        for n in 1..=4 { app.tick(t0 + ms(860 * n)); }
        assert_ne!(app.previous_chord(), None);
        assert_eq!(app.status_msg, "BPM: 70");
    }

    #[test]
    fn shutdown_stops_metronome() {
        let mut app = app();
        app.start_metronome(Instant::now());
        app.shutdown();
        assert!(!app.metronome.running());
    }

    #[test]
    fn volume_is_bounded() {
        let mut app = app();
        for _ in 0..30 { app.volume_up(); }
        assert_eq!(app.volume(), 1.0);
        for _ in 0..30 { app.volume_down(); }
        assert_eq!(app.volume(), 0.0);
    }
}
