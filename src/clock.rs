/// A monotonic millisecond clock.
///
/// `embedded-hal` abstracts pins and delays but has no time-keeping trait,
/// so the driver asks for this one-method source instead. Implement it over
/// whatever the target provides — a hardware timer, a tick counter,
/// `embassy_time::Instant`, and so on.
pub trait Clock {
    /// Milliseconds elapsed since some fixed, arbitrary epoch.
    ///
    /// Must never go backwards. The driver only ever subtracts two samples,
    /// so the epoch itself does not matter.
    fn now_millis(&mut self) -> u64;
}

impl<T: Clock + ?Sized> Clock for &mut T {
    fn now_millis(&mut self) -> u64 {
        T::now_millis(self)
    }
}
