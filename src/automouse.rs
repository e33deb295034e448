//! Automouse layer
//!
//! Activates a keymap layer while the pointer moves and releases it after a
//! period without motion.

use crate::config::AutomouseConfig;
use crate::host::{Job, Keymap, WorkQueue};
use crate::motion::Delta;

#[derive(Debug)]
pub(crate) struct Automouse {
    config: AutomouseConfig,
    triggered: bool,
}

impl Automouse {
    pub(crate) fn new(config: AutomouseConfig) -> Self {
        Automouse {
            config,
            triggered: false,
        }
    }

    pub(crate) fn is_triggered(&self) -> bool {
        self.triggered
    }

    /// React to the decoded motion of one sample
    ///
    /// Looks at the raw per-sample magnitude, not at what gets reported.
    pub(crate) fn on_motion<H>(&mut self, delta: &Delta, host: &mut H)
    where
        H: Keymap + WorkQueue,
    {
        let layer = self.config.layer;
        if !self.triggered && host.highest_layer_active() == layer {
            return;
        }
        if delta.magnitude() <= self.config.movement_threshold {
            return;
        }

        if !self.triggered {
            debug!("Automouse activating layer {}", layer);
        }
        host.activate_layer(layer);
        // rescheduling a pending timeout moves its deadline
        host.schedule(Job::AutomouseTimeout, self.config.timeout_ms);
        self.triggered = true;
    }

    /// The deactivation timer expired
    pub(crate) fn on_timeout<K: Keymap>(&mut self, keymap: &mut K) {
        if !self.triggered {
            return;
        }
        debug!("Automouse releasing layer {}", self.config.layer);
        keymap.deactivate_layer(self.config.layer);
        self.triggered = false;
    }
}
