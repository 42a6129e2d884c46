use thiserror::Error;

use crate::keys::DEGREES;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SelectError {
    /// Every degree other than the pending one is disabled.
    #[error("no selectable degree")]
    NoSelectableDegree,
}

/// Random degree picker that walks through every enabled degree once before
/// repeating any, and never picks the pending degree twice in a row.
///
/// `visited` and `disabled` are independent: a degree may be both, and a
/// disabled degree is skipped regardless of its visited flag.
#[derive(Debug, Clone)]
pub struct Selector {
    visited:  [bool; DEGREES],
    disabled: [bool; DEGREES],
    pending:  usize,
    previous: Option<usize>,
}

impl Selector {
    pub fn new() -> Self {
        Self::with_disabled([false; DEGREES])
    }

    /// Starts on degree 0, which counts as already shown.
    pub fn with_disabled(disabled: [bool; DEGREES]) -> Self {
        let mut visited = [false; DEGREES];
        visited[0] = true;
        Self { visited, disabled, pending: 0, previous: None }
    }

    pub fn pending(&self) -> usize { self.pending }

    pub fn previous(&self) -> Option<usize> { self.previous }

    pub fn is_visited(&self, degree: usize) -> bool {
        self.visited.get(degree).copied().unwrap_or(false)
    }

    pub fn is_disabled(&self, degree: usize) -> bool {
        self.disabled.get(degree).copied().unwrap_or(false)
    }

    /// Degrees that are not disabled, the pending one included.
    pub fn selectable_count(&self) -> usize {
        self.disabled.iter().filter(|d| !**d).count()
    }

    fn candidates(&self, skip_visited: bool) -> Vec<usize> {
        (0..DEGREES)
            .filter(|&i| !self.disabled[i] && i != self.pending)
            .filter(|&i| !skip_visited || !self.visited[i])
            .collect()
    }

    /// Pick the next degree and make it pending.
    ///
    /// When the unvisited pool is exhausted the visited flags are cleared and
    /// the pick is made among all enabled degrees except the pending one. If
    /// even that set is empty nothing changes and `NoSelectableDegree` is
    /// returned.
    pub fn advance(&mut self, rng: &mut fastrand::Rng) -> Result<usize, SelectError> {
        let mut candidates = self.candidates(true);
        let exhausted = candidates.is_empty();
        if exhausted {
            candidates = self.candidates(false);
            if candidates.is_empty() {
                return Err(SelectError::NoSelectableDegree);
            }
            log::debug!("degree pool exhausted, clearing visited");
            self.visited = [false; DEGREES];
        }

        let next = candidates[rng.usize(..candidates.len())];
        self.previous = Some(self.pending);
        self.pending = next;
        self.visited[next] = true;
        Ok(next)
    }

    pub fn toggle_disabled(&mut self, degree: usize) {
        if let Some(d) = self.disabled.get_mut(degree) {
            *d = !*d;
        }
    }

    pub fn reset(&mut self) {
        self.visited = [false; DEGREES];
    }
}

impl Default for Selector {
    fn default() -> Self { Self::new() }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rng() -> fastrand::Rng { fastrand::Rng::with_seed(7) }

    #[test]
    fn starts_on_first_degree_marked_visited() {
        let s = Selector::new();
        assert_eq!(s.pending(), 0);
        assert_eq!(s.previous(), None);
        assert!(s.is_visited(0));
        assert!((1..DEGREES).all(|i| !s.is_visited(i)));
    }

    #[test]
    fn never_repeats_pending_degree() {
        let mut s = Selector::new();
        let mut rng = rng();
        for _ in 0..500 {
            let before = s.pending();
            let next = s.advance(&mut rng).unwrap();
            assert_ne!(next, before);
            assert_eq!(s.previous(), Some(before));
        }
    }

    #[test]
    fn never_repeats_with_only_two_enabled() {
        let mut s = Selector::new();
        for i in 2..DEGREES { s.toggle_disabled(i); }
        let mut rng = rng();
        let mut last = s.pending();
        for _ in 0..50 {
            let next = s.advance(&mut rng).unwrap();
            assert_ne!(next, last);
            assert!(next < 2);
            last = next;
        }
    }

    #[test]
    fn seven_advances_cover_every_degree() {
        for seed in 0..50 {
            let mut s = Selector::new();
            let mut rng = fastrand::Rng::with_seed(seed);
            let mut seen = [false; DEGREES];
            seen[s.pending()] = true;
            for _ in 0..DEGREES {
                let next = s.advance(&mut rng).unwrap();
                seen[next] = true;
            }
            assert!(seen.iter().all(|v| *v), "seed {seed}: {seen:?}");
        }
    }

    #[test]
    fn one_full_cycle_visits_each_degree_once() {
        let mut s = Selector::new();
        let mut rng = rng();
        let mut picks: Vec<usize> = (0..DEGREES - 1).map(|_| s.advance(&mut rng).unwrap()).collect();
        picks.push(0);
        picks.sort();
        assert_eq!(picks, (0..DEGREES).collect::<Vec<_>>());
        assert!((0..DEGREES).all(|i| s.is_visited(i)));
    }

    #[test]
    fn exhaustion_clears_visited_except_new_pick() {
        let mut s = Selector::new();
        let mut rng = rng();
        for _ in 0..DEGREES - 1 { s.advance(&mut rng).unwrap(); }
        let next = s.advance(&mut rng).unwrap();
        for i in 0..DEGREES {
            assert_eq!(s.is_visited(i), i == next);
        }
    }

    #[test]
    fn disabled_degrees_are_never_selected() {
        let mut s = Selector::new();
        s.toggle_disabled(3);
        s.toggle_disabled(5);
        let mut rng = rng();
        for _ in 0..300 {
            let next = s.advance(&mut rng).unwrap();
            assert!(next != 3 && next != 5);
        }
        s.toggle_disabled(3);
        let mut saw_three = false;
        for _ in 0..300 {
            saw_three |= s.advance(&mut rng).unwrap() == 3;
        }
        assert!(saw_three);
    }

    #[test]
    fn disabling_ignores_visited_state() {
        let mut s = Selector::new();
        s.reset();
        s.toggle_disabled(4);
        assert!(!s.is_visited(4));
        let mut rng = rng();
        for _ in 0..100 {
            assert_ne!(s.advance(&mut rng).unwrap(), 4);
        }
    }

    #[test]
    fn toggle_does_not_touch_visited_or_pending() {
        let mut s = Selector::new();
        s.toggle_disabled(0);
        assert!(s.is_disabled(0));
        assert!(s.is_visited(0));
        assert_eq!(s.pending(), 0);
        s.toggle_disabled(0);
        assert!(!s.is_disabled(0));
        s.toggle_disabled(DEGREES);
        assert_eq!(s.selectable_count(), DEGREES);
    }

    #[test]
    fn empty_candidate_set_leaves_state_unchanged() {
        let mut s = Selector::new();
        let mut rng = rng();
        let first = s.advance(&mut rng).unwrap();
        for i in 0..DEGREES {
            if i != first { s.toggle_disabled(i); }
        }
        let before = (s.pending(), s.previous(), (0..DEGREES).map(|i| s.is_visited(i)).collect::<Vec<_>>());
        assert_eq!(s.advance(&mut rng), Err(SelectError::NoSelectableDegree));
        let after = (s.pending(), s.previous(), (0..DEGREES).map(|i| s.is_visited(i)).collect::<Vec<_>>());
        assert_eq!(before, after);
    }

    #[test]
    fn all_disabled_reports_no_selectable_degree() {
        let mut s = Selector::with_disabled([true; DEGREES]);
        assert_eq!(s.selectable_count(), 0);
        assert_eq!(s.advance(&mut rng()), Err(SelectError::NoSelectableDegree));
        assert_eq!(s.pending(), 0);
    }

    #[test]
    fn pending_may_be_disabled_and_is_still_left_behind() {
        let mut s = Selector::new();
        s.toggle_disabled(0);
        let next = s.advance(&mut rng()).unwrap();
        assert_ne!(next, 0);
    }

    #[test]
    fn reset_clears_visited_and_keeps_pending() {
        let mut s = Selector::new();
        let mut rng = rng();
        s.advance(&mut rng).unwrap();
        s.advance(&mut rng).unwrap();
        let pending = s.pending();
        s.reset();
        assert_eq!(s.pending(), pending);
        assert!((0..DEGREES).all(|i| !s.is_visited(i)));
    }
}
