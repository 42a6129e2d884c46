use std::time::{Duration, Instant};

pub const MIN_TEMPO: u32 = 30;
pub const MAX_TEMPO: u32 = 240;
pub const TEMPO_STEP: u32 = 10;
pub const BEATS_PER_BAR: u8 = 4;

/// An event fired when the metronome crosses a beat boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    pub beat:     u8,
    pub downbeat: bool,
}

/// Repeating deadline.  Owned by `State::Running`, so it disappears the
/// moment the metronome stops and no tick can fire afterwards.
#[derive(Debug)]
struct Interval {
    period: Duration,
    next:   Instant,
}

impl Interval {
    fn start(period: Duration, now: Instant) -> Self {
        Self { period, next: now + period }
    }

    fn poll(&mut self, now: Instant) -> bool {
        if now < self.next { return false; }
        self.next += self.period;
        if now >= self.next {
            // More than a whole beat late; re-anchor instead of bursting.
            log::debug!("metronome fell behind by {:?}", now - self.next);
            self.next = now + self.period;
        }
        true
    }
}

#[derive(Debug)]
enum State {
    Stopped,
    Running(Interval),
}

/// Four-beat metronome driven from the UI loop.
///
/// The caller polls it with the current time every frame; `poll` returns at
/// most one `Tick` per call.
#[derive(Debug)]
pub struct Metronome {
    tempo: u32,
    beat:  u8,
    state: State,
}

pub fn clamp_tempo(bpm: u32) -> u32 {
    bpm.clamp(MIN_TEMPO, MAX_TEMPO)
}

impl Metronome {
    pub fn new(tempo: u32) -> Self {
        Self { tempo: clamp_tempo(tempo), beat: 1, state: State::Stopped }
    }

    pub fn tempo(&self) -> u32 { self.tempo }

    pub fn beat(&self) -> u8 { self.beat }

    pub fn running(&self) -> bool { matches!(self.state, State::Running(_)) }

    pub fn period(&self) -> Duration {
        Duration::from_millis(60_000 / self.tempo as u64)
    }

    /// Returns `false` if it was already running.
    pub fn start(&mut self, now: Instant) -> bool {
        if self.running() { return false; }
        self.beat  = 1;
        self.state = State::Running(Interval::start(self.period(), now));
        true
    }

    /// Returns `false` if it was already stopped.
    pub fn stop(&mut self) -> bool {
        let was_running = self.running();
        self.state = State::Stopped;
        self.beat  = 1;
        was_running
    }

    /// Set the tempo; a running interval restarts from `now` with the new period.
    pub fn set_tempo(&mut self, bpm: u32, now: Instant) {
        let bpm = clamp_tempo(bpm);
        if bpm == self.tempo { return; }
        self.tempo = bpm;
        let period = self.period();
        if let State::Running(interval) = &mut self.state {
            *interval = Interval::start(period, now);
        }
    }

    pub fn tempo_up(&mut self, now: Instant) {
        self.set_tempo(self.tempo.saturating_add(TEMPO_STEP), now);
    }

    pub fn tempo_down(&mut self, now: Instant) {
        self.set_tempo(self.tempo.saturating_sub(TEMPO_STEP), now);
    }

    pub fn poll(&mut self, now: Instant) -> Option<Tick> {
        let State::Running(interval) = &mut self.state else { return None };
        if !interval.poll(now) { return None; }
        self.beat = self.beat % BEATS_PER_BAR + 1;
        Some(Tick { beat: self.beat, downbeat: self.beat == 1 })
    }
}
