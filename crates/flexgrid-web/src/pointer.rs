#![forbid(unsafe_code)]

//! Pointer-capture adapter between raw host pointer signals and the drag
//! machine.
//!
//! The router decides whether a signal is allowed to reach the gesture
//! lifecycle at all:
//! - only the activation button starts a gesture,
//! - only the pointer that started a gesture may move or end it, and
//! - a pointer-down while a gesture is still live (the previous pointer-up
//!   happened outside the tracked region) finalizes the stale gesture before
//!   the new one begins.
//!
//! It never touches cell widths itself. Every dispatch returns the
//! [`DragInput`] to apply, if any, plus a structured [`PointerLogEntry`].

use serde::{Deserialize, Serialize};

/// Pointer button as reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointerButton {
    Primary,
    Secondary,
    Middle,
    Other(u8),
}

impl PointerButton {
    /// Map a DOM `MouseEvent.button` code.
    #[must_use]
    pub const fn from_dom(code: i16) -> Self {
        match code {
            0 => Self::Primary,
            1 => Self::Middle,
            2 => Self::Secondary,
            other => Self::Other(other as u8),
        }
    }
}

/// Router configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointerRouterConfig {
    /// Button required to begin a gesture.
    pub activation_button: PointerButton,
}

impl Default for PointerRouterConfig {
    fn default() -> Self {
        Self {
            activation_button: PointerButton::Primary,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct ActivePointer {
    pointer_id: u32,
    handle: usize,
    button: PointerButton,
    last_x: f64,
}

/// Host command for browser pointer capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum CaptureCommand {
    Acquire { pointer_id: u32 },
    Release { pointer_id: u32 },
}

/// Lifecycle phase recorded for one dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointerPhase {
    PointerDown,
    PointerMove,
    PointerUp,
}

/// Why an incoming signal was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointerIgnoredReason {
    ButtonNotAllowed,
    /// The handle belongs to a last-column cell or to no laid-out cell.
    HandleNotResizable,
    NoActiveGesture,
    PointerMismatch,
    ButtonMismatch,
}

/// Outcome category for one dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", content = "reason", rename_all = "snake_case")]
pub enum PointerOutcome {
    Forwarded,
    /// A stale gesture was finalized and a new one begun.
    RestartedStale,
    /// A stale gesture was finalized; the press itself started nothing.
    FinalizedStale,
    Ignored(PointerIgnoredReason),
}

/// Structured record of one dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerLogEntry {
    pub phase: PointerPhase,
    /// Present for forwarded signals only.
    pub sequence: Option<u64>,
    pub pointer_id: u32,
    pub handle: Option<usize>,
    pub x: f64,
    pub capture_command: Option<CaptureCommand>,
    pub outcome: PointerOutcome,
}

/// Gesture input derived from a forwarded signal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "input", rename_all = "snake_case")]
pub enum DragInput {
    Begin {
        handle: usize,
        x: f64,
        /// Last known coordinate of a stale gesture to finalize first.
        stale_x: Option<f64>,
    },
    Move {
        x: f64,
    },
    End {
        x: f64,
    },
}

/// Result of one dispatch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerDispatch {
    pub input: Option<DragInput>,
    pub capture_command: Option<CaptureCommand>,
    pub log: PointerLogEntry,
}

impl PointerDispatch {
    fn ignored(
        phase: PointerPhase,
        reason: PointerIgnoredReason,
        pointer_id: u32,
        handle: Option<usize>,
        x: f64,
    ) -> Self {
        #[cfg(feature = "tracing")]
        tracing::trace!(?phase, ?reason, pointer_id, x, "pointer signal ignored");
        Self {
            input: None,
            capture_command: None,
            log: PointerLogEntry {
                phase,
                sequence: None,
                pointer_id,
                handle,
                x,
                capture_command: None,
                outcome: PointerOutcome::Ignored(reason),
            },
        }
    }

    /// True when the signal reached the gesture lifecycle.
    #[must_use]
    pub const fn is_forwarded(&self) -> bool {
        self.input.is_some()
    }
}

/// Filters host pointer signals for one container's handles.
#[derive(Debug, Clone)]
pub struct HandlePointerRouter {
    config: PointerRouterConfig,
    active: Option<ActivePointer>,
    next_sequence: u64,
}

impl Default for HandlePointerRouter {
    fn default() -> Self {
        Self::new(PointerRouterConfig::default())
    }
}

impl HandlePointerRouter {
    #[must_use]
    pub const fn new(config: PointerRouterConfig) -> Self {
        Self {
            config,
            active: None,
            next_sequence: 1,
        }
    }

    #[must_use]
    pub const fn config(&self) -> PointerRouterConfig {
        self.config
    }

    /// Pointer driving the live gesture, if any.
    #[must_use]
    pub fn active_pointer_id(&self) -> Option<u32> {
        self.active.map(|active| active.pointer_id)
    }

    /// Handle of the live gesture, if any.
    #[must_use]
    pub fn active_handle(&self) -> Option<usize> {
        self.active.map(|active| active.handle)
    }

    /// Forget the live gesture without emitting anything.
    pub fn reset(&mut self) {
        self.active = None;
    }

    /// Pointer-down on the handle of cell `handle`.
    ///
    /// `resizable` is false when the cell has no right-hand neighbour in its
    /// row; such handles never start a gesture, but a press on them still
    /// finalizes a stale one.
    pub fn pointer_down(
        &mut self,
        handle: usize,
        resizable: bool,
        pointer_id: u32,
        button: PointerButton,
        x: f64,
    ) -> PointerDispatch {
        if button != self.config.activation_button {
            return PointerDispatch::ignored(
                PointerPhase::PointerDown,
                PointerIgnoredReason::ButtonNotAllowed,
                pointer_id,
                Some(handle),
                x,
            );
        }
        if !resizable {
            if let Some(stale) = self.active.take() {
                return self.forward(
                    PointerPhase::PointerDown,
                    pointer_id,
                    handle,
                    x,
                    DragInput::End { x: stale.last_x },
                    Some(CaptureCommand::Release {
                        pointer_id: stale.pointer_id,
                    }),
                    PointerOutcome::FinalizedStale,
                );
            }
            return PointerDispatch::ignored(
                PointerPhase::PointerDown,
                PointerIgnoredReason::HandleNotResizable,
                pointer_id,
                Some(handle),
                x,
            );
        }

        let stale = self.active.take();
        let outcome = if stale.is_some() {
            PointerOutcome::RestartedStale
        } else {
            PointerOutcome::Forwarded
        };
        self.active = Some(ActivePointer {
            pointer_id,
            handle,
            button,
            last_x: x,
        });
        self.forward(
            PointerPhase::PointerDown,
            pointer_id,
            handle,
            x,
            DragInput::Begin {
                handle,
                x,
                stale_x: stale.map(|stale| stale.last_x),
            },
            Some(CaptureCommand::Acquire { pointer_id }),
            outcome,
        )
    }

    /// Page-wide pointer-move while a gesture may be live.
    pub fn pointer_move(&mut self, pointer_id: u32, x: f64) -> PointerDispatch {
        let Some(mut active) = self.active else {
            return PointerDispatch::ignored(
                PointerPhase::PointerMove,
                PointerIgnoredReason::NoActiveGesture,
                pointer_id,
                None,
                x,
            );
        };
        if active.pointer_id != pointer_id {
            return PointerDispatch::ignored(
                PointerPhase::PointerMove,
                PointerIgnoredReason::PointerMismatch,
                pointer_id,
                Some(active.handle),
                x,
            );
        }
        active.last_x = x;
        self.active = Some(active);
        self.forward(
            PointerPhase::PointerMove,
            pointer_id,
            active.handle,
            x,
            DragInput::Move { x },
            None,
            PointerOutcome::Forwarded,
        )
    }

    /// Page-wide pointer-up; ends the live gesture.
    pub fn pointer_up(&mut self, pointer_id: u32, button: PointerButton, x: f64) -> PointerDispatch {
        let Some(active) = self.active else {
            return PointerDispatch::ignored(
                PointerPhase::PointerUp,
                PointerIgnoredReason::NoActiveGesture,
                pointer_id,
                None,
                x,
            );
        };
        if active.pointer_id != pointer_id {
            return PointerDispatch::ignored(
                PointerPhase::PointerUp,
                PointerIgnoredReason::PointerMismatch,
                pointer_id,
                Some(active.handle),
                x,
            );
        }
        if active.button != button {
            return PointerDispatch::ignored(
                PointerPhase::PointerUp,
                PointerIgnoredReason::ButtonMismatch,
                pointer_id,
                Some(active.handle),
                x,
            );
        }
        self.active = None;
        self.forward(
            PointerPhase::PointerUp,
            pointer_id,
            active.handle,
            x,
            DragInput::End { x },
            Some(CaptureCommand::Release { pointer_id }),
            PointerOutcome::Forwarded,
        )
    }

    #[allow(clippy::too_many_arguments)]
    fn forward(
        &mut self,
        phase: PointerPhase,
        pointer_id: u32,
        handle: usize,
        x: f64,
        input: DragInput,
        capture_command: Option<CaptureCommand>,
        outcome: PointerOutcome,
    ) -> PointerDispatch {
        let sequence = self.next_sequence();
        PointerDispatch {
            input: Some(input),
            capture_command,
            log: PointerLogEntry {
                phase,
                sequence: Some(sequence),
                pointer_id,
                handle: Some(handle),
                x,
                capture_command,
                outcome,
            },
        }
    }

    fn next_sequence(&mut self) -> u64 {
        let sequence = self.next_sequence;
        self.next_sequence = self.next_sequence.saturating_add(1);
        sequence
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pointer_down_begins_and_requests_capture() {
        let mut router = HandlePointerRouter::default();
        let dispatch = router.pointer_down(0, true, 7, PointerButton::Primary, 120.0);
        assert_eq!(
            dispatch.input,
            Some(DragInput::Begin {
                handle: 0,
                x: 120.0,
                stale_x: None
            })
        );
        assert_eq!(
            dispatch.capture_command,
            Some(CaptureCommand::Acquire { pointer_id: 7 })
        );
        assert_eq!(dispatch.log.sequence, Some(1));
        assert_eq!(router.active_pointer_id(), Some(7));
        assert_eq!(router.active_handle(), Some(0));
    }

    #[test]
    fn secondary_button_is_ignored() {
        let mut router = HandlePointerRouter::default();
        let dispatch = router.pointer_down(0, true, 7, PointerButton::Secondary, 0.0);
        assert!(!dispatch.is_forwarded());
        assert_eq!(
            dispatch.log.outcome,
            PointerOutcome::Ignored(PointerIgnoredReason::ButtonNotAllowed)
        );
        assert_eq!(router.active_pointer_id(), None);
    }

    #[test]
    fn last_column_handle_is_ignored() {
        let mut router = HandlePointerRouter::default();
        let dispatch = router.pointer_down(3, false, 7, PointerButton::Primary, 0.0);
        assert_eq!(
            dispatch.log.outcome,
            PointerOutcome::Ignored(PointerIgnoredReason::HandleNotResizable)
        );
    }

    #[test]
    fn last_column_press_finalizes_stale_gesture() {
        let mut router = HandlePointerRouter::default();
        router.pointer_down(0, true, 7, PointerButton::Primary, 0.0);
        router.pointer_move(7, 50.0);
        let dispatch = router.pointer_down(1, false, 9, PointerButton::Primary, 80.0);
        assert_eq!(dispatch.log.outcome, PointerOutcome::FinalizedStale);
        assert_eq!(dispatch.input, Some(DragInput::End { x: 50.0 }));
        assert_eq!(
            dispatch.capture_command,
            Some(CaptureCommand::Release { pointer_id: 7 })
        );
        assert_eq!(router.active_pointer_id(), None);

        let again = router.pointer_down(1, false, 9, PointerButton::Primary, 80.0);
        assert_eq!(
            again.log.outcome,
            PointerOutcome::Ignored(PointerIgnoredReason::HandleNotResizable)
        );
    }

    #[test]
    fn move_without_gesture_is_ignored() {
        let mut router = HandlePointerRouter::default();
        let dispatch = router.pointer_move(7, 10.0);
        assert_eq!(
            dispatch.log.outcome,
            PointerOutcome::Ignored(PointerIgnoredReason::NoActiveGesture)
        );
    }

    #[test]
    fn foreign_pointer_cannot_move_or_end() {
        let mut router = HandlePointerRouter::default();
        router.pointer_down(1, true, 7, PointerButton::Primary, 0.0);
        let moved = router.pointer_move(8, 10.0);
        assert_eq!(
            moved.log.outcome,
            PointerOutcome::Ignored(PointerIgnoredReason::PointerMismatch)
        );
        let ended = router.pointer_up(8, PointerButton::Primary, 10.0);
        assert!(!ended.is_forwarded());
        assert_eq!(router.active_pointer_id(), Some(7));
    }

    #[test]
    fn wrong_button_up_keeps_gesture() {
        let mut router = HandlePointerRouter::default();
        router.pointer_down(1, true, 7, PointerButton::Primary, 0.0);
        let dispatch = router.pointer_up(7, PointerButton::Middle, 5.0);
        assert_eq!(
            dispatch.log.outcome,
            PointerOutcome::Ignored(PointerIgnoredReason::ButtonMismatch)
        );
        assert_eq!(router.active_pointer_id(), Some(7));
    }

    #[test]
    fn pointer_up_ends_and_releases_capture() {
        let mut router = HandlePointerRouter::default();
        router.pointer_down(1, true, 7, PointerButton::Primary, 0.0);
        router.pointer_move(7, 25.0);
        let dispatch = router.pointer_up(7, PointerButton::Primary, 30.0);
        assert_eq!(dispatch.input, Some(DragInput::End { x: 30.0 }));
        assert_eq!(
            dispatch.capture_command,
            Some(CaptureCommand::Release { pointer_id: 7 })
        );
        assert_eq!(dispatch.log.sequence, Some(3));
        assert_eq!(router.active_pointer_id(), None);
    }

    #[test]
    fn second_down_finalizes_stale_gesture() {
        let mut router = HandlePointerRouter::default();
        router.pointer_down(0, true, 7, PointerButton::Primary, 0.0);
        router.pointer_move(7, 42.0);
        let dispatch = router.pointer_down(2, true, 9, PointerButton::Primary, 500.0);
        assert_eq!(dispatch.log.outcome, PointerOutcome::RestartedStale);
        assert_eq!(
            dispatch.input,
            Some(DragInput::Begin {
                handle: 2,
                x: 500.0,
                stale_x: Some(42.0)
            })
        );
        assert_eq!(router.active_pointer_id(), Some(9));
    }

    #[test]
    fn dom_button_codes_map() {
        assert_eq!(PointerButton::from_dom(0), PointerButton::Primary);
        assert_eq!(PointerButton::from_dom(1), PointerButton::Middle);
        assert_eq!(PointerButton::from_dom(2), PointerButton::Secondary);
        assert_eq!(PointerButton::from_dom(4), PointerButton::Other(4));
    }
}
