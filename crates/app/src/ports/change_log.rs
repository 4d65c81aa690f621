//! Change log port: human-readable trail of power transitions.

use sunswitch_domain::power::PowerState;
use sunswitch_domain::time::Timestamp;

/// Records every state transition the controller applies.
///
/// Recording never fails from the caller's point of view: implementations
/// report their own I/O problems through `tracing`.
pub trait ChangeLog {
    fn record(&self, device: &str, state: PowerState, at: Timestamp);
}

impl<T: ChangeLog + ?Sized> ChangeLog for &T {
    fn record(&self, device: &str, state: PowerState, at: Timestamp) {
        (**self).record(device, state, at);
    }
}
