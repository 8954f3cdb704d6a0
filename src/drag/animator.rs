//! Frame-driven translation transitions
//!
//! One frame loop drives every running tween. Starting a tween for a target
//! that is already animating replaces the old one, so no element ever has two
//! writers.

use std::collections::HashMap;
use std::time::Duration;

use tracing::trace;

use super::host::{FrameHandle, FrameScheduler, Renderer};
use crate::layout::{AnimationInstruction, Entry, Translation, Tween};

/// What a tween writes to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Target {
    Entry(Entry),
    /// The free-floating dragged element
    Dragged,
}

#[derive(Debug, Default)]
pub struct Animator {
    tweens: HashMap<Target, Tween>,
    frame: Option<FrameHandle>,
}

impl Animator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start one transition per instruction
    pub fn start_all<H>(
        &mut self,
        instructions: &[AnimationInstruction],
        duration: Duration,
        host: &mut H,
    ) where
        H: FrameScheduler + Renderer,
    {
        for instruction in instructions {
            self.start(
                Target::Entry(instruction.entry),
                instruction.from,
                instruction.to,
                duration,
                host,
            );
        }
    }

    /// Animate `target` between two translations, replacing any running tween
    pub fn start<H>(
        &mut self,
        target: Target,
        from: Translation,
        to: Translation,
        duration: Duration,
        host: &mut H,
    ) where
        H: FrameScheduler + Renderer,
    {
        if self.tweens.remove(&target).is_some() {
            trace!(?target, "superseded running tween");
        }
        if duration.is_zero() {
            apply(target, to, host);
            return;
        }
        apply(target, from, host);
        self.tweens.insert(target, Tween::new(from, to, duration));
        if self.frame.is_none() {
            self.frame = Some(host.request_frame());
        }
    }

    pub fn owns(&self, handle: FrameHandle) -> bool {
        self.frame == Some(handle)
    }

    /// Whether any transition is in flight
    pub fn is_animating(&self) -> bool {
        !self.tweens.is_empty()
    }

    pub fn is_running(&self, target: Target) -> bool {
        self.tweens.contains_key(&target)
    }

    /// Advance every tween by `dt`; reschedules while work remains
    pub fn on_frame<H>(&mut self, dt: Duration, host: &mut H)
    where
        H: FrameScheduler + Renderer,
    {
        self.frame = None;
        for (target, tween) in self.tweens.iter_mut() {
            tween.tick(dt);
            apply(*target, tween.value(), host);
        }
        self.tweens.retain(|_, tween| !tween.is_complete());
        if !self.tweens.is_empty() {
            self.frame = Some(host.request_frame());
        }
    }

    /// Stop everything, leaving elements where they are
    pub fn cancel<H: FrameScheduler>(&mut self, host: &mut H) {
        if let Some(handle) = self.frame.take() {
            host.cancel_frame(handle);
        }
        self.tweens.clear();
    }
}

fn apply<R: Renderer>(target: Target, value: Translation, host: &mut R) {
    match target {
        Target::Entry(entry) => host.set_translation(entry, value),
        Target::Dragged => host.set_drag_translation(value),
    }
}
