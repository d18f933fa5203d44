//! Ordered delivery of clock pulses to [`Temporal`] listeners.
//!
//! Listeners are called in registration order, one pulse at a time. A
//! listener that returns `false` is dropped and never called again.
//! Delivery takes `&mut self`, so a listener cannot reach back into the
//! dispatcher that is calling it.
//!
//! A throttled listener is only called once at least its minimum interval
//! of simulated time has passed since its last delivery. Time from the
//! pulses it skipped is carried over into the next pulse it receives, so
//! no simulated time is lost.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use habitat_types::{Boundary, ClockPulse, Temporal};

/// Errors raised by [`PulseDispatcher::deliver`].
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    /// The pulse does not follow the last delivered pulse.
    #[error("pulse {pulse_id} is out of order: last delivered pulse was {last_id}")]
    OutOfOrder {
        /// Id of the refused pulse.
        pulse_id: u64,
        /// Id of the last pulse delivered.
        last_id: u64,
    },
}

/// Identifier of a registered listener, assigned in registration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ListenerId(pub u64);

impl core::fmt::Display for ListenerId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "listener-{}", self.0)
    }
}

/// What happened during one [`PulseDispatcher::deliver`] call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    /// Id of the delivered pulse.
    pub pulse_id: u64,
    /// Listeners that were called.
    pub notified: usize,
    /// Throttled listeners that were not due yet.
    pub skipped: usize,
    /// Listeners dropped because they returned `false`.
    pub deregistered: Vec<(ListenerId, String)>,
}

/// One registered listener and its throttle state.
struct Registration {
    id: ListenerId,
    name: String,
    listener: Box<dyn Temporal>,
    /// Minimum simulated time between deliveries; zero means every pulse.
    min_interval: f64,
    /// Time of the last delivery, in total millisols.
    last_delivered: Option<f64>,
    /// Elapsed time of skipped pulses not yet handed over.
    pending_elapsed: f64,
    /// Largest boundary among skipped pulses.
    pending_boundary: Boundary,
}

/// Result of offering a pulse to one registration.
enum Offer {
    Skipped,
    Delivered { keep: bool },
}

impl Registration {
    fn offer(&mut self, pulse: &ClockPulse) -> Offer {
        let now = pulse.when().total_millisols();
        if let Some(last) = self.last_delivered
            && now - last < self.min_interval
        {
            self.pending_elapsed += pulse.elapsed();
            self.pending_boundary = self.pending_boundary.max(pulse.boundary());
            return Offer::Skipped;
        }

        let keep = if self.pending_elapsed > 0.0 || self.pending_boundary > Boundary::None {
            let collapsed = pulse.with_extra_elapsed(self.pending_elapsed, self.pending_boundary);
            self.listener.advance(&collapsed)
        } else {
            self.listener.advance(pulse)
        };
        self.last_delivered = Some(now);
        self.pending_elapsed = 0.0;
        self.pending_boundary = Boundary::None;
        Offer::Delivered { keep }
    }
}

/// Delivers every pulse to every listener in registration order.
#[derive(Default)]
pub struct PulseDispatcher {
    listeners: Vec<Registration>,
    next_id: u64,
    last_pulse_id: Option<u64>,
}

impl core::fmt::Debug for PulseDispatcher {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PulseDispatcher")
            .field("listeners", &self.names().collect::<Vec<_>>())
            .field("last_pulse_id", &self.last_pulse_id)
            .finish_non_exhaustive()
    }
}

impl PulseDispatcher {
    /// Create an empty dispatcher.
    pub const fn new() -> Self {
        Self {
            listeners: Vec::new(),
            next_id: 0,
            last_pulse_id: None,
        }
    }

    /// Register a listener that receives every pulse.
    pub fn register<L: Temporal + 'static>(
        &mut self,
        name: impl Into<String>,
        listener: L,
    ) -> ListenerId {
        self.register_throttled(name, listener, 0.0)
    }

    /// Register a listener that is called at most once per
    /// `min_interval_msols` of simulated time.
    ///
    /// A negative or non-finite interval counts as zero.
    pub fn register_throttled<L: Temporal + 'static>(
        &mut self,
        name: impl Into<String>,
        listener: L,
        min_interval_msols: f64,
    ) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id = self.next_id.saturating_add(1);
        let min_interval = if min_interval_msols.is_finite() && min_interval_msols > 0.0 {
            min_interval_msols
        } else {
            0.0
        };
        let name = name.into();
        debug!(listener = %id, name = %name, min_interval, "Listener registered");
        self.listeners.push(Registration {
            id,
            name,
            listener: Box::new(listener),
            min_interval,
            last_delivered: None,
            pending_elapsed: 0.0,
            pending_boundary: Boundary::None,
        });
        id
    }

    /// Remove a listener. Returns whether it was registered.
    pub fn deregister(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|reg| reg.id != id);
        before != self.listeners.len()
    }

    /// Number of registered listeners.
    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    /// Whether no listener is registered.
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Listener names in delivery order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.listeners.iter().map(|reg| reg.name.as_str())
    }

    /// Id of the last pulse delivered.
    pub const fn last_pulse_id(&self) -> Option<u64> {
        self.last_pulse_id
    }

    /// Deliver `pulse` to every listener in registration order.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::OutOfOrder`] if the pulse id is not greater
    /// than that of the last delivered pulse. Nothing is delivered then.
    pub fn deliver(&mut self, pulse: &ClockPulse) -> Result<DeliveryReport, DispatchError> {
        if let Some(last_id) = self.last_pulse_id
            && pulse.id() <= last_id
        {
            return Err(DispatchError::OutOfOrder {
                pulse_id: pulse.id(),
                last_id,
            });
        }
        self.last_pulse_id = Some(pulse.id());

        let mut report = DeliveryReport {
            pulse_id: pulse.id(),
            ..DeliveryReport::default()
        };
        self.listeners.retain_mut(|reg| match reg.offer(pulse) {
            Offer::Skipped => {
                report.skipped = report.skipped.saturating_add(1);
                true
            }
            Offer::Delivered { keep } => {
                report.notified = report.notified.saturating_add(1);
                if !keep {
                    info!(
                        listener = %reg.id,
                        name = %reg.name,
                        pulse = pulse.id(),
                        "Listener deregistered"
                    );
                    report.deregistered.push((reg.id, reg.name.clone()));
                }
                keep
            }
        });
        Ok(report)
    }
}
