//! The capability of reacting to a clock pulse.
//!
//! Every component that must react to simulated time implements
//! [`Temporal`]. The pulse dispatcher calls [`Temporal::advance`] once per
//! tick, synchronously and in registration order; a listener that returns
//! `false` is deregistered for good.
//!
//! Hosts that need to inspect a listener after handing it to the dispatcher
//! register an `Rc<RefCell<T>>` and keep a clone. Delivery then goes through
//! `try_borrow_mut`: if the listener is already being advanced further up
//! the call stack, the nested delivery is refused and logged instead of
//! re-entering it.

use std::cell::RefCell;
use std::rc::Rc;

use tracing::error;

use crate::time::ClockPulse;

/// A component that reacts to the passing of simulated time.
pub trait Temporal {
    /// Advance this component by one pulse.
    ///
    /// Returns whether the component wants further pulses. Returning
    /// `false` permanently removes it from the dispatcher.
    fn advance(&mut self, pulse: &ClockPulse) -> bool;
}

impl<T: Temporal + ?Sized> Temporal for Box<T> {
    fn advance(&mut self, pulse: &ClockPulse) -> bool {
        (**self).advance(pulse)
    }
}

impl<T: Temporal + ?Sized> Temporal for Rc<RefCell<T>> {
    fn advance(&mut self, pulse: &ClockPulse) -> bool {
        match self.try_borrow_mut() {
            Ok(mut listener) => listener.advance(pulse),
            Err(_busy) => {
                error!(
                    pulse_id = pulse.id(),
                    "Listener re-entered while still processing a pulse; delivery refused"
                );
                true
            }
        }
    }
}
