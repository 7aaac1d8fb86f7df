//! Transition scheduler
//!
//! Animates CSS color properties in a fixed number of steps. Each active
//! transition is a plain struct advanced by [`TransitionScheduler::tick`];
//! no closures or timers are held, so cancelling or snapping is a map removal.
//!
//! Rules:
//! - at most one transition per property, a new request supersedes the old one
//! - at most `max_active` transitions overall, extra requests apply instantly
//! - a failsafe deadline forces the final color if ticks are starved

use crate::easing::Easing;
use nuvens_core::Hsl;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use slotmap::{new_key_type, SlotMap};
use smallvec::SmallVec;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::{Duration, Instant};
use tokio::sync::oneshot;

new_key_type! {
    pub struct TransitionId;
}

/// Receives property writes from the scheduler
pub trait PropertySink {
    fn set_property(&mut self, property: &str, value: &str);
}

/// Scheduler tuning
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransitionConfig {
    /// Steps per transition, regardless of duration
    pub steps: u32,
    /// Lower bound on the failsafe deadline, in milliseconds
    pub failsafe_ms: u64,
    /// Transitions allowed to interpolate at once
    pub max_active: usize,
    pub easing: Easing,
}

impl Default for TransitionConfig {
    fn default() -> Self {
        Self {
            steps: 30,
            failsafe_ms: 1000,
            max_active: 20,
            easing: Easing::EaseInOutQuad,
        }
    }
}

/// How a transition ended
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TransitionOutcome {
    /// All steps ran
    Completed,
    /// Deadline passed before the last step; final color was forced
    ForcedByFailsafe,
    /// Concurrency cap reached or zero duration; final color was set directly
    AppliedInstantly,
    /// Start and end colors were equal; nothing to animate
    Unchanged,
    /// A newer transition took over the property
    Superseded,
    /// Snapped to its final color by [`TransitionScheduler::cancel_all`]
    Snapped,
    /// The scheduler was dropped while the transition was active
    Dropped,
}

/// Completion handle for a transition.
///
/// Await it, or poll with [`TransitionHandle::try_outcome`] from synchronous code.
/// It always resolves to an outcome, never to an error.
#[derive(Debug)]
pub struct TransitionHandle {
    rx: Option<oneshot::Receiver<TransitionOutcome>>,
    resolved: Option<TransitionOutcome>,
}

impl TransitionHandle {
    fn ready(outcome: TransitionOutcome) -> Self {
        Self {
            rx: None,
            resolved: Some(outcome),
        }
    }

    fn pending(rx: oneshot::Receiver<TransitionOutcome>) -> Self {
        Self {
            rx: Some(rx),
            resolved: None,
        }
    }

    /// Outcome if the transition has settled
    pub fn try_outcome(&mut self) -> Option<TransitionOutcome> {
        if self.resolved.is_some() {
            return self.resolved;
        }
        let rx = self.rx.as_mut()?;
        let outcome = match rx.try_recv() {
            Ok(outcome) => outcome,
            Err(oneshot::error::TryRecvError::Empty) => return None,
            Err(oneshot::error::TryRecvError::Closed) => TransitionOutcome::Dropped,
        };
        self.rx = None;
        self.resolved = Some(outcome);
        self.resolved
    }

    pub fn is_settled(&mut self) -> bool {
        self.try_outcome().is_some()
    }
}

impl Future for TransitionHandle {
    type Output = TransitionOutcome;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        if let Some(outcome) = this.resolved {
            return Poll::Ready(outcome);
        }
        let Some(rx) = this.rx.as_mut() else {
            return Poll::Ready(TransitionOutcome::Dropped);
        };
        let outcome = match Pin::new(rx).poll(cx) {
            Poll::Pending => return Poll::Pending,
            Poll::Ready(Ok(outcome)) => outcome,
            Poll::Ready(Err(_)) => TransitionOutcome::Dropped,
        };
        this.rx = None;
        this.resolved = Some(outcome);
        Poll::Ready(outcome)
    }
}

/// One property animation in flight
#[derive(Debug)]
pub struct TransitionState {
    pub property: String,
    pub from: Hsl,
    pub to: Hsl,
    pub started_at: Instant,
    pub step_index: u32,
    pub total_steps: u32,
    step_interval: Duration,
    next_step_at: Instant,
    deadline: Instant,
    easing: Easing,
    done: Option<oneshot::Sender<TransitionOutcome>>,
}

impl TransitionState {
    /// Color for the current step
    pub fn current(&self) -> Hsl {
        if self.step_index >= self.total_steps {
            return self.to;
        }
        let t = self.step_index as f32 / self.total_steps as f32;
        Hsl::lerp(&self.from, &self.to, self.easing.apply(t))
    }

    fn resolve(mut self, outcome: TransitionOutcome) {
        if let Some(tx) = self.done.take() {
            // Receiver may already be gone; that is fine
            let _ = tx.send(outcome);
        }
    }
}

/// Counters since the scheduler was created
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SchedulerStats {
    pub started: u64,
    pub completed: u64,
    pub forced: u64,
    pub instant: u64,
    pub superseded: u64,
}

/// Drives all active color transitions
pub struct TransitionScheduler {
    config: TransitionConfig,
    transitions: SlotMap<TransitionId, TransitionState>,
    by_property: FxHashMap<String, TransitionId>,
    stats: SchedulerStats,
}

impl TransitionScheduler {
    pub fn new(config: TransitionConfig) -> Self {
        Self {
            config,
            transitions: SlotMap::with_key(),
            by_property: FxHashMap::default(),
            stats: SchedulerStats::default(),
        }
    }

    pub fn config(&self) -> &TransitionConfig {
        &self.config
    }

    pub fn stats(&self) -> SchedulerStats {
        self.stats
    }

    pub fn active_count(&self) -> usize {
        self.transitions.len()
    }

    pub fn is_animating(&self, property: &str) -> bool {
        self.by_property.contains_key(property)
    }

    /// In-flight state for a property
    pub fn state(&self, property: &str) -> Option<&TransitionState> {
        self.by_property
            .get(property)
            .and_then(|id| self.transitions.get(*id))
    }

    /// Start animating `property` from `from` to `to` over `duration`.
    ///
    /// The first step lands one step interval after `now`; the property is
    /// assumed to already show `from`.
    pub fn animate_property(
        &mut self,
        property: &str,
        from: Hsl,
        to: Hsl,
        duration: Duration,
        now: Instant,
        sink: &mut dyn PropertySink,
    ) -> TransitionHandle {
        let superseded = self.cancel_property(property);

        if from.approx_eq(&to) {
            // A superseded transition may have left the property mid-way
            if superseded {
                sink.set_property(property, &to.to_css());
            }
            return TransitionHandle::ready(TransitionOutcome::Unchanged);
        }

        if duration.is_zero() || self.config.steps == 0 {
            return self.apply_instantly(property, &to, sink);
        }

        if self.transitions.len() >= self.config.max_active {
            tracing::debug!(
                property,
                active = self.transitions.len(),
                cap = self.config.max_active,
                "transition cap reached, applying instantly"
            );
            return self.apply_instantly(property, &to, sink);
        }

        let total_steps = self.config.steps;
        let step_interval = duration / total_steps;
        let deadline = now + duration.max(Duration::from_millis(self.config.failsafe_ms));
        let (tx, rx) = oneshot::channel();

        let id = self.transitions.insert(TransitionState {
            property: property.to_string(),
            from,
            to,
            started_at: now,
            step_index: 0,
            total_steps,
            step_interval,
            next_step_at: now + step_interval,
            deadline,
            easing: self.config.easing,
            done: Some(tx),
        });
        self.by_property.insert(property.to_string(), id);
        self.stats.started += 1;

        tracing::trace!(property, %from, %to, ?duration, "transition started");
        TransitionHandle::pending(rx)
    }

    /// Advance every due transition by one step. Returns the number still active.
    pub fn tick(&mut self, now: Instant, sink: &mut dyn PropertySink) -> usize {
        let mut finished: SmallVec<[(TransitionId, TransitionOutcome); 8]> = SmallVec::new();

        for (id, state) in self.transitions.iter_mut() {
            if now >= state.deadline {
                sink.set_property(&state.property, &state.to.to_css());
                finished.push((id, TransitionOutcome::ForcedByFailsafe));
                continue;
            }
            if now < state.next_step_at {
                continue;
            }

            state.step_index += 1;
            state.next_step_at = now + state.step_interval;
            sink.set_property(&state.property, &state.current().to_css());

            if state.step_index >= state.total_steps {
                finished.push((id, TransitionOutcome::Completed));
            }
        }

        for (id, outcome) in finished {
            if let Some(state) = self.transitions.remove(id) {
                self.by_property.remove(&state.property);
                match outcome {
                    TransitionOutcome::ForcedByFailsafe => {
                        tracing::debug!(
                            property = %state.property,
                            step = state.step_index,
                            of = state.total_steps,
                            "failsafe forced final color"
                        );
                        self.stats.forced += 1;
                    }
                    _ => self.stats.completed += 1,
                }
                state.resolve(outcome);
            }
        }

        self.transitions.len()
    }

    /// Snap every active transition to its final color
    pub fn cancel_all(&mut self, sink: &mut dyn PropertySink) {
        self.by_property.clear();
        for (_, state) in self.transitions.drain() {
            sink.set_property(&state.property, &state.to.to_css());
            state.resolve(TransitionOutcome::Snapped);
        }
    }

    /// Stop the transition on `property`, leaving its last written value.
    /// Returns false if nothing was animating it.
    pub fn cancel(&mut self, property: &str) -> bool {
        self.cancel_property(property)
    }

    fn cancel_property(&mut self, property: &str) -> bool {
        let Some(id) = self.by_property.remove(property) else {
            return false;
        };
        match self.transitions.remove(id) {
            Some(state) => {
                tracing::trace!(property, step = state.step_index, "transition superseded");
                self.stats.superseded += 1;
                state.resolve(TransitionOutcome::Superseded);
                true
            }
            None => false,
        }
    }

    fn apply_instantly(
        &mut self,
        property: &str,
        to: &Hsl,
        sink: &mut dyn PropertySink,
    ) -> TransitionHandle {
        sink.set_property(property, &to.to_css());
        self.stats.instant += 1;
        TransitionHandle::ready(TransitionOutcome::AppliedInstantly)
    }
}

impl Default for TransitionScheduler {
    fn default() -> Self {
        Self::new(TransitionConfig::default())
    }
}
