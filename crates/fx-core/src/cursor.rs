//! Custom cursor: smoothed following plus the hover-dwell "press" heuristic.
//!
//! `E` is whatever identifies a DOM element on the host side; tests use
//! plain integers.

use crate::config::CursorConfig;
use glam::Vec2;

/// What changed about the press pulse during a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PulseChange {
    Started,
    Ended,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CursorState<E> {
    live_target: Vec2,
    smoothed: Vec2,
    seen_pointer: bool,
    hovered: Option<E>,
    hover_start_ms: Option<f64>,
    last_press_ms: Option<f64>,
    pulse_until_ms: Option<f64>,
}

impl<E> Default for CursorState<E> {
    fn default() -> Self {
        Self {
            live_target: Vec2::ZERO,
            smoothed: Vec2::ZERO,
            seen_pointer: false,
            hovered: None,
            hover_start_ms: None,
            last_press_ms: None,
            pulse_until_ms: None,
        }
    }
}

impl<E: PartialEq> CursorState<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw pointer sample. `hovered` is the nearest marked ancestor of the
    /// event target, resolved by the caller.
    pub fn on_pointer_move(&mut self, pos: Vec2, hovered: Option<E>, now_ms: f64) {
        self.live_target = pos;
        if !self.seen_pointer {
            self.smoothed = pos;
            self.seen_pointer = true;
        }
        if hovered != self.hovered {
            self.hover_start_ms = hovered.as_ref().map(|_| now_ms);
            self.hovered = hovered;
        }
    }

    /// Pointer left the window: nothing is hovered any more.
    pub fn on_pointer_leave(&mut self) {
        self.hovered = None;
        self.hover_start_ms = None;
    }

    /// One frame: lerp toward the live target, then evaluate dwell/cooldown.
    pub fn step(&mut self, now_ms: f64, cfg: &CursorConfig) -> Option<PulseChange> {
        self.smoothed += (self.live_target - self.smoothed) * cfg.lerp;

        if let Some(until) = self.pulse_until_ms {
            if now_ms >= until {
                self.pulse_until_ms = None;
                return Some(PulseChange::Ended);
            }
        }

        let dwelling = self
            .hover_start_ms
            .map(|start| now_ms - start > cfg.dwell_ms)
            .unwrap_or(false);
        let cooled = self
            .last_press_ms
            .map(|last| now_ms - last > cfg.press_cooldown_ms)
            .unwrap_or(true);
        if dwelling && cooled && self.pulse_until_ms.is_none() {
            self.last_press_ms = Some(now_ms);
            self.pulse_until_ms = Some(now_ms + cfg.pulse_ms);
            return Some(PulseChange::Started);
        }
        None
    }

    #[inline]
    pub fn smoothed(&self) -> Vec2 {
        self.smoothed
    }

    #[inline]
    pub fn live_target(&self) -> Vec2 {
        self.live_target
    }

    #[inline]
    pub fn has_pointer(&self) -> bool {
        self.seen_pointer
    }

    #[inline]
    pub fn hovered(&self) -> Option<&E> {
        self.hovered.as_ref()
    }

    #[inline]
    pub fn hover_start_ms(&self) -> Option<f64> {
        self.hover_start_ms
    }

    #[inline]
    pub fn last_press_ms(&self) -> Option<f64> {
        self.last_press_ms
    }

    #[inline]
    pub fn pulse_active(&self) -> bool {
        self.pulse_until_ms.is_some()
    }

    /// Cursor scale factor: dips to `1 - press_dip` at mid-pulse and back.
    pub fn press_scale(&self, now_ms: f64, cfg: &CursorConfig) -> f32 {
        match self.pulse_until_ms {
            Some(until) if cfg.pulse_ms > 0.0 => {
                let t = (1.0 - (until - now_ms) / cfg.pulse_ms).clamp(0.0, 1.0) as f32;
                1.0 - cfg.press_dip * (t * std::f32::consts::PI).sin()
            }
            _ => 1.0,
        }
    }
}
