//! Product turntable carousel.
//!
//! A ring of `n` cards rotated around a vertical axis. The controller is a
//! pure state machine: input events (buttons, dots, keys, pointer, focus,
//! touch, resize) are method calls, and timers fire from [`Carousel::poll`]
//! with the current [`Instant`] supplied by the caller.
//!
//! Auto-advance runs from construction and never terminates while the
//! carousel is mounted. Hover or focus inside the component pauses it; touch
//! end resumes it after a short debounce.

use std::f64::consts::PI;
use std::time::{Duration, Instant};

/// Interval between automatic advances.
pub const AUTO_ADVANCE_INTERVAL: Duration = Duration::from_millis(2600);

/// Delay before auto-advance resumes after a touch ends.
pub const TOUCH_RESUME_DELAY: Duration = Duration::from_millis(600);

/// Quiet period after the last resize before layout is recomputed.
pub const RESIZE_DEBOUNCE: Duration = Duration::from_millis(80);

/// Measured card widths are clamped into this range before computing the radius.
pub const MIN_CARD_WIDTH: f64 = 320.0;
pub const MAX_CARD_WIDTH: f64 = 420.0;

/// Width assumed when the card has not been measured yet.
pub const DEFAULT_CARD_WIDTH: f64 = 360.0;

/// Extra distance added to the computed radius so neighbours don't touch.
pub const RADIUS_OFFSET: i64 = 90;

/// Keys the carousel reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    ArrowLeft,
    ArrowRight,
}

/// Whether the ring animates between positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Rotation changes animate.
    Animated,
    /// Rotation snaps; restored on the next animation frame.
    Suspended,
}

/// Carousel controller state.
#[derive(Debug, Clone)]
pub struct Carousel {
    len: usize,
    index: usize,
    radius: i64,
    card_width: f64,
    transition: Transition,
    /// Next auto-advance deadline; `None` while paused.
    next_tick: Option<Instant>,
    resume_at: Option<Instant>,
    pending_layout: Option<Instant>,
}

impl Carousel {
    /// Mount a carousel of `len` cards.
    ///
    /// Performs the initial layout without animation and starts auto-advance.
    /// Returns `None` when there are no cards.
    #[must_use]
    pub fn new(len: usize, measured_card_width: Option<f64>, now: Instant) -> Option<Self> {
        if len == 0 {
            return None;
        }

        let mut carousel = Self {
            len,
            index: 0,
            radius: 0,
            card_width: measured_card_width.unwrap_or(DEFAULT_CARD_WIDTH),
            transition: Transition::Animated,
            next_tick: None,
            resume_at: None,
            pending_layout: None,
        };
        carousel.layout();
        carousel.start_auto(now);
        Some(carousel)
    }

    /// Number of cards.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Always `false`: a carousel cannot be mounted without cards.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        false
    }

    /// Index of the front card.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    /// Current ring radius in pixels.
    #[must_use]
    pub const fn radius(&self) -> i64 {
        self.radius
    }

    /// Current transition mode of the ring.
    #[must_use]
    pub const fn transition(&self) -> Transition {
        self.transition
    }

    /// Whether auto-advance is running.
    #[must_use]
    pub const fn is_auto_advancing(&self) -> bool {
        self.next_tick.is_some()
    }

    /// Angle between neighbouring cards in degrees.
    #[must_use]
    #[allow(clippy::cast_precision_loss)] // card counts are tiny
    pub fn step(&self) -> f64 {
        360.0 / self.len as f64
    }

    /// Rotation of card `i` around the ring, in degrees.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn card_angle(&self, i: usize) -> f64 {
        i as f64 * self.step()
    }

    /// Rotation applied to the whole ring, in degrees.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn ring_angle(&self) -> f64 {
        -(self.index as f64) * self.step()
    }

    /// Whether card `i` is the front card.
    #[must_use]
    pub const fn is_active(&self, i: usize) -> bool {
        i == self.index
    }

    /// Highlight state of each navigation dot.
    pub fn dots(&self) -> impl Iterator<Item = bool> + '_ {
        (0..self.len).map(|i| self.is_active(i))
    }

    /// Accessible label of dot `i`.
    #[must_use]
    pub fn dot_label(i: usize) -> String {
        format!("Go to item {}", i + 1)
    }

    /// Rotate so that card `i` is in front, animating the move.
    ///
    /// Any integer is accepted and normalized by positive modulo.
    pub fn rotate_to(&mut self, i: i64) {
        let len = i64::try_from(self.len).unwrap_or(i64::MAX);
        let normalized = i.rem_euclid(len);
        self.index = usize::try_from(normalized).unwrap_or(0);
    }

    /// Advance to the next card.
    pub fn next(&mut self) {
        self.rotate_to(self.signed_index() + 1);
    }

    /// Go back to the previous card.
    pub fn prev(&mut self) {
        self.rotate_to(self.signed_index() - 1);
    }

    /// Keyboard navigation.
    pub fn key(&mut self, key: Key) {
        match key {
            Key::ArrowLeft => self.prev(),
            Key::ArrowRight => self.next(),
        }
    }

    /// Animation frame callback: re-enables the transition after a snap.
    pub fn frame(&mut self) {
        self.transition = Transition::Animated;
    }

    /// Pointer entered the stage.
    pub fn pointer_enter(&mut self) {
        self.stop_auto();
    }

    /// Pointer left the stage.
    pub fn pointer_leave(&mut self, now: Instant) {
        self.start_auto(now);
    }

    /// Focus moved inside the component.
    pub fn focus_in(&mut self) {
        self.stop_auto();
    }

    /// Focus left the component.
    pub fn focus_out(&mut self, now: Instant) {
        self.start_auto(now);
    }

    /// A touch began on the stage.
    pub fn touch_start(&mut self) {
        self.stop_auto();
    }

    /// A touch ended; auto-advance resumes after [`TOUCH_RESUME_DELAY`].
    pub fn touch_end(&mut self, now: Instant) {
        self.resume_at = Some(now + TOUCH_RESUME_DELAY);
    }

    /// The viewport was resized and the card now measures `card_width`.
    ///
    /// Layout runs once no further resize arrives for [`RESIZE_DEBOUNCE`].
    pub fn resize(&mut self, card_width: f64, now: Instant) {
        self.card_width = card_width;
        self.pending_layout = Some(now + RESIZE_DEBOUNCE);
    }

    /// Fire every timer due at `now`.
    ///
    /// Returns the number of automatic advances performed.
    pub fn poll(&mut self, now: Instant) -> usize {
        if self.resume_at.is_some_and(|at| at <= now) {
            self.resume_at = None;
            self.start_auto(now);
        }

        if self.pending_layout.is_some_and(|at| at <= now) {
            self.pending_layout = None;
            self.layout();
        }

        let mut advanced = 0;
        while let Some(due) = self.next_tick.filter(|due| *due <= now) {
            self.next();
            self.next_tick = Some(due + AUTO_ADVANCE_INTERVAL);
            advanced += 1;
        }
        advanced
    }

    /// Recompute the radius and snap the ring to the current index.
    fn layout(&mut self) {
        self.radius = compute_radius(self.card_width, self.len);
        self.transition = Transition::Suspended;
    }

    fn start_auto(&mut self, now: Instant) {
        if self.next_tick.is_none() {
            self.next_tick = Some(now + AUTO_ADVANCE_INTERVAL);
        }
    }

    fn stop_auto(&mut self) {
        self.next_tick = None;
        self.resume_at = None;
    }

    fn signed_index(&self) -> i64 {
        i64::try_from(self.index).unwrap_or(0)
    }
}

/// Ring radius for `len` cards of width `card_width`.
///
/// `round((w / 2) / tan(π / n)) + 90` with `w` clamped to
/// [`MIN_CARD_WIDTH`, `MAX_CARD_WIDTH`]. A non-positive or non-finite width
/// counts as unmeasured. A single card sits at the offset.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
pub fn compute_radius(card_width: f64, len: usize) -> i64 {
    if len < 2 {
        return RADIUS_OFFSET;
    }
    let width = if card_width.is_finite() && card_width > 0.0 {
        card_width
    } else {
        DEFAULT_CARD_WIDTH
    };
    let clamped = width.clamp(MIN_CARD_WIDTH, MAX_CARD_WIDTH);
    ((clamped / 2.0) / (PI / len as f64).tan()).round() as i64 + RADIUS_OFFSET
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn mounted(len: usize) -> (Carousel, Instant) {
        let now = Instant::now();
        (Carousel::new(len, Some(360.0), now).unwrap(), now)
    }

    #[test]
    fn test_no_cards_no_carousel() {
        assert!(Carousel::new(0, None, Instant::now()).is_none());
    }

    #[test]
    fn test_rotate_to_normalizes_by_positive_modulo() {
        let (mut c, _) = mounted(5);
        for (input, expected) in [(0, 0), (4, 4), (5, 0), (7, 2), (-1, 4), (-6, 4), (-10, 0)] {
            c.rotate_to(input);
            assert_eq!(c.index(), expected, "rotate_to({input})");
        }
    }

    #[test]
    fn test_next_and_prev_wrap() {
        let (mut c, _) = mounted(3);
        c.prev();
        assert_eq!(c.index(), 2);
        c.next();
        assert_eq!(c.index(), 0);
        c.key(Key::ArrowRight);
        c.key(Key::ArrowRight);
        assert_eq!(c.index(), 2);
        c.key(Key::ArrowLeft);
        assert_eq!(c.index(), 1);
    }

    #[test]
    fn test_dots_and_cards_follow_index() {
        let (mut c, _) = mounted(4);
        for target in [-3, 2, 9, 0] {
            c.rotate_to(target);
            let dots: Vec<bool> = c.dots().collect();
            assert_eq!(dots.iter().filter(|d| **d).count(), 1);
            assert!(dots[c.index()]);
            assert!((0..4).all(|i| c.is_active(i) == (i == c.index())));
        }
    }

    #[test]
    fn test_angles() {
        let (mut c, _) = mounted(4);
        assert!((c.step() - 90.0).abs() < f64::EPSILON);
        assert!((c.card_angle(3) - 270.0).abs() < f64::EPSILON);
        c.rotate_to(2);
        assert!((c.ring_angle() + 180.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_radius_formula() {
        // 4 cards, 360px: (180 / tan(45°)) + 90 = 270
        assert_eq!(compute_radius(360.0, 4), 270);
        // widths clamp to [320, 420]
        assert_eq!(compute_radius(100.0, 4), compute_radius(320.0, 4));
        assert_eq!(compute_radius(900.0, 4), compute_radius(420.0, 4));
        // unmeasured width falls back to 360
        assert_eq!(compute_radius(0.0, 4), 270);
        assert_eq!(compute_radius(f64::NAN, 4), 270);
        // single card sits at the offset
        assert_eq!(compute_radius(360.0, 1), RADIUS_OFFSET);
    }

    #[test]
    fn test_first_layout_snaps_then_animates() {
        let (mut c, _) = mounted(6);
        assert_eq!(c.transition(), Transition::Suspended);
        c.frame();
        assert_eq!(c.transition(), Transition::Animated);
    }

    #[test]
    fn test_auto_advance_ticks() {
        let (mut c, start) = mounted(3);
        assert!(c.is_auto_advancing());

        assert_eq!(c.poll(start + Duration::from_millis(2599)), 0);
        assert_eq!(c.index(), 0);
        assert_eq!(c.poll(start + AUTO_ADVANCE_INTERVAL), 1);
        assert_eq!(c.index(), 1);
        assert_eq!(c.poll(start + AUTO_ADVANCE_INTERVAL * 3), 2);
        assert_eq!(c.index(), 0);
    }

    #[test]
    fn test_hover_and_focus_pause() {
        let (mut c, start) = mounted(3);

        c.pointer_enter();
        assert_eq!(c.poll(start + AUTO_ADVANCE_INTERVAL * 5), 0);

        let left = start + AUTO_ADVANCE_INTERVAL * 5;
        c.pointer_leave(left);
        assert_eq!(c.poll(left + AUTO_ADVANCE_INTERVAL), 1);

        c.focus_in();
        assert!(!c.is_auto_advancing());
        let out = left + AUTO_ADVANCE_INTERVAL * 2;
        c.focus_out(out);
        assert!(c.is_auto_advancing());
    }

    #[test]
    fn test_touch_end_resumes_after_delay() {
        let (mut c, start) = mounted(3);
        c.touch_start();
        c.touch_end(start);

        assert_eq!(c.poll(start + Duration::from_millis(599)), 0);
        assert!(!c.is_auto_advancing());

        let resumed = start + TOUCH_RESUME_DELAY;
        assert_eq!(c.poll(resumed), 0);
        assert!(c.is_auto_advancing());
        assert_eq!(c.poll(resumed + AUTO_ADVANCE_INTERVAL), 1);
    }

    #[test]
    fn test_new_touch_cancels_pending_resume() {
        let (mut c, start) = mounted(3);
        c.touch_start();
        c.touch_end(start);
        c.touch_start();

        assert_eq!(c.poll(start + Duration::from_secs(10)), 0);
        assert!(!c.is_auto_advancing());
    }

    #[test]
    fn test_resize_is_debounced() {
        let (mut c, start) = mounted(4);
        c.pointer_enter();
        c.frame();
        let before = c.radius();

        c.resize(420.0, start);
        c.resize(420.0, start + Duration::from_millis(50));
        c.poll(start + Duration::from_millis(100));
        assert_eq!(c.radius(), before);
        assert_eq!(c.transition(), Transition::Animated);

        c.poll(start + Duration::from_millis(130));
        assert_eq!(c.radius(), compute_radius(420.0, 4));
        assert_eq!(c.transition(), Transition::Suspended);
    }

    #[test]
    fn test_dot_label() {
        assert_eq!(Carousel::dot_label(0), "Go to item 1");
    }

    mod properties {
        use proptest::prelude::*;

        use super::*;

        fn target() -> impl Strategy<Value = i64> {
            prop_oneof![
                Just(i64::MIN),
                Just(i64::MAX),
                Just(i64::MIN + 1),
                Just(-1),
                any::<i64>(),
            ]
        }

        proptest! {
            #[test]
            fn test_rotate_to_any_integer_stays_in_range(len in 1usize..12, i in target()) {
                let (mut c, _) = mounted(len);
                c.rotate_to(i);

                let n = i64::try_from(len).unwrap();
                prop_assert!(c.index() < len);
                prop_assert_eq!(i64::try_from(c.index()).unwrap(), i.rem_euclid(n));

                let dots: Vec<bool> = c.dots().collect();
                prop_assert_eq!(dots.len(), len);
                for (dot, active) in dots.iter().enumerate() {
                    prop_assert_eq!(*active, dot == c.index());
                    prop_assert_eq!(c.is_active(dot), dot == c.index());
                }
            }
        }
    }
}
