//! Host collaborators
//!
//! The driver never blocks on chip timing and never runs in interrupt
//! context. Everything it needs from the surrounding firmware is expressed by
//! the traits below and passed in by the caller of each operation.

/// Deferred work items understood by [`Pmw3610::run_job`](crate::Pmw3610::run_job)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Job {
    /// Run the next power-up step
    Init,
    /// Read and report one motion burst
    Sample,
    /// The automouse layer saw no motion for its timeout
    AutomouseTimeout,
}

/// Motion interrupt line control
pub trait MotionInterrupt {
    /// Enable or mask delivery of the motion interrupt
    fn set_enabled(&mut self, enabled: bool);
}

/// Single-threaded deferred work queue
///
/// At most one instance of each [`Job`] is pending. Scheduling a job that is
/// already pending replaces its deadline.
pub trait WorkQueue {
    /// Run `job` once `delay_ms` have elapsed
    fn schedule(&mut self, job: Job, delay_ms: u32);

    /// Run `job` as soon as the queue gets to it
    fn submit(&mut self, job: Job);
}

/// Monotonic uptime source
pub trait Clock {
    fn uptime_ms(&self) -> u64;
}

/// Motion axis of a [`MotionEvent`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Axis {
    X,
    Y,
}

/// One relative motion report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MotionEvent {
    pub axis: Axis,
    pub value: i16,
    /// No further event of the same batch follows
    pub last_in_batch: bool,
}

/// Consumer of motion reports
pub trait MotionSink {
    fn report(&mut self, event: MotionEvent);
}

/// Keymap layer control, used by the automouse feature
pub trait Keymap {
    /// The highest currently active layer
    fn highest_layer_active(&self) -> u8;

    fn activate_layer(&mut self, layer: u8);

    fn deactivate_layer(&mut self, layer: u8);
}

/// Everything [`Pmw3610::run_job`](crate::Pmw3610::run_job) needs
pub trait Host: MotionInterrupt + WorkQueue + Clock + MotionSink + Keymap {}

impl<T> Host for T where T: MotionInterrupt + WorkQueue + Clock + MotionSink + Keymap {}
