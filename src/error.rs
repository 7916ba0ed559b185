/// Ways a single DHT11 poll cycle can fail.
///
/// None of these ever reach a caller of the cached read API: the driver
/// consumes them and keeps serving the last good reading. They exist so the
/// protocol routines can bail out with `?` mid-frame.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, PartialEq, Eq)]
pub enum DhtError<E> {
    /// An expected line transition did not happen within the bounded wait.
    ///
    /// This is what an absent, disconnected or miswired sensor looks like.
    ProtocolTimeout,
    /// The received frame did not match its checksum byte.
    ChecksumMismatch,
    /// Error from the GPIO pin (input/output).
    Pin(E),
}

impl<E> From<E> for DhtError<E> {
    fn from(value: E) -> Self {
        Self::Pin(value)
    }
}
