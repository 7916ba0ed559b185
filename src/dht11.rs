use embedded_hal::{
    delay::DelayNs,
    digital::{InputPin, OutputPin},
};

use crate::clock::Clock;
use crate::error::DhtError;

/// Maximum time to wait (in microseconds) for the line to change state.
///
/// The longest legal phase inside a frame is the ~80 us acknowledgement
/// pulse, so anything beyond this means the sensor is absent or gave up
/// mid-frame.
const TIMEOUT_US: u32 = 150;

/// High pulses wider than this (in microseconds) decode as a one bit.
///
/// The DHT11 holds the line high for ~26-28 us for a zero and ~70 us for
/// a one.
const BIT_THRESHOLD_US: u32 = 40;

/// How long the host holds the line low to request a frame, in milliseconds.
const START_SIGNAL_MS: u32 = 18;

/// Age in milliseconds past which the cached reading counts as stale.
///
/// The DHT11 datasheet forbids sampling more often than once every two
/// seconds; the cache exists to absorb faster callers.
const STALE_AFTER_MS: u64 = 2000;

/// The last checksum-valid measurement, plus bookkeeping for staleness.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SensorReading {
    /// Temperature in whole degrees Celsius (sensor range 0-50).
    pub temperature: u8,
    /// Relative humidity in whole percent (sensor range 20-90).
    pub relative_humidity: u8,
    /// [`Clock`] time of the last successful decode.
    pub timestamp_millis: u64,
    /// True once at least one checksum-valid frame has been received.
    pub valid: bool,
}

impl SensorReading {
    /// Cache contents before the first successful poll.
    const fn empty() -> Self {
        SensorReading {
            temperature: 0,
            relative_humidity: 0,
            timestamp_millis: 0,
            valid: false,
        }
    }
}

/// Driver for the DHT11 temperature and humidity sensor.
///
/// One instance owns exclusive access to one data pin for the lifetime of
/// the driver; the single-wire protocol is not re-entrant, so callers must
/// serialize access per physical pin.
///
/// Protocol failures never reach the caller. [`read_temperature`] and
/// [`read_humidity`] always answer from the cached reading, re-polling the
/// sensor at most once per call and only when the cache has gone stale; a
/// failed poll leaves the previous values in place. Use [`has_valid_data`]
/// and [`has_stale_data`] to judge how much to trust the answer.
///
/// [`read_temperature`]: Dht11::read_temperature
/// [`read_humidity`]: Dht11::read_humidity
/// [`has_valid_data`]: Dht11::has_valid_data
/// [`has_stale_data`]: Dht11::has_stale_data
pub struct Dht11<PIN, DELAY, CLK> {
    pin: PIN,
    delay: DELAY,
    clock: CLK,
    reading: SensorReading,
}

impl<PIN, DELAY, CLK, E> Dht11<PIN, DELAY, CLK>
where
    PIN: InputPin<Error = E> + OutputPin<Error = E>,
    DELAY: DelayNs,
    CLK: Clock,
{
    /// Creates a new instance of the DHT11 driver.
    ///
    /// # Arguments
    ///
    /// * `pin` - The GPIO pin connected to the DHT11 data line. Must support
    ///   both input and output; the line needs a pull-up so that releasing
    ///   it reads high.
    /// * `delay` - A delay provider implementing the `DelayNs` trait.
    /// * `clock` - A monotonic millisecond clock used for staleness
    ///   tracking.
    pub fn new(pin: PIN, delay: DELAY, clock: CLK) -> Self {
        Dht11 {
            pin,
            delay,
            clock,
            reading: SensorReading::empty(),
        }
    }

    /// Returns the cached temperature in degrees Celsius, or 0 if no frame
    /// has ever been decoded.
    ///
    /// If the cache is stale this polls the sensor once first, blocking for
    /// at most one protocol cycle (~25 ms worst case). The call cannot
    /// fail: a poll that times out or arrives corrupted simply leaves the
    /// cache as it was.
    pub fn read_temperature(&mut self) -> u8 {
        self.try_poll();
        self.reading.temperature
    }

    /// Returns the cached relative humidity in percent, or 0 if no frame
    /// has ever been decoded.
    ///
    /// Staleness and failure behave exactly as in [`read_temperature`].
    ///
    /// [`read_temperature`]: Dht11::read_temperature
    pub fn read_humidity(&mut self) -> u8 {
        self.try_poll();
        self.reading.relative_humidity
    }

    /// True once at least one checksum-valid frame has been received.
    pub fn has_valid_data(&self) -> bool {
        self.reading.valid
    }

    /// True if the last successful poll is at least two seconds old, or if
    /// no poll has ever succeeded.
    ///
    /// Takes `&mut self` only because reading the clock does; no driver
    /// state changes.
    pub fn has_stale_data(&mut self) -> bool {
        if !self.reading.valid {
            return true;
        }
        let age = self
            .clock
            .now_millis()
            .saturating_sub(self.reading.timestamp_millis);
        age >= STALE_AFTER_MS
    }

    /// Returns the whole cached reading, including its timestamp and
    /// validity flag. No side effect.
    pub fn last_reading(&self) -> SensorReading {
        self.reading
    }

    /// Polls the sensor if the cache is stale, swallowing any failure.
    ///
    /// One attempt per call. A failed cycle keeps the previous values in
    /// place, so callers only ever observe whole good frames.
    fn try_poll(&mut self) {
        if !self.has_stale_data() {
            return;
        }
        if self.poll().is_err() {
            #[cfg(feature = "defmt")]
            defmt::debug!("dht11: poll failed, keeping last good reading");
        }
    }

    /// Runs one full protocol cycle and replaces the cache on success.
    ///
    /// The cache update is all-or-nothing: either the frame passes the
    /// checksum and every field is replaced, or nothing is touched.
    fn poll(&mut self) -> Result<(), DhtError<E>> {
        let frame = self.read_frame()?;
        if !checksum_ok(&frame) {
            return Err(DhtError::ChecksumMismatch);
        }

        // Frame layout: humidity-int, humidity-frac, temp-int, temp-frac,
        // checksum. The fraction bytes are always zero on a DHT11.
        self.reading = SensorReading {
            temperature: frame[2],
            relative_humidity: frame[0],
            timestamp_millis: self.clock.now_millis(),
            valid: true,
        };
        Ok(())
    }

    /// Requests and reads one raw 5-byte frame from the sensor.
    fn read_frame(&mut self) -> Result<[u8; 5], DhtError<E>> {
        self.start()?;

        let mut frame = [0u8; 5];
        for b in frame.iter_mut() {
            *b = self.read_byte()?;
        }
        Ok(frame)
    }

    /// Sends the host start signal and waits for the sensor's response.
    ///
    /// The line is held low for 18 ms, then released so the pull-up takes
    /// it high again. The sensor acknowledges with ~80 us low followed by
    /// ~80 us high before the first data bit.
    fn start(&mut self) -> Result<(), DhtError<E>> {
        // Host start request
        self.pin.set_low()?;
        self.delay.delay_ms(START_SIGNAL_MS);
        self.pin.set_high()?;
        self.delay.delay_us(40);

        // Sensor acknowledgement
        self.wait_for_low()?;
        self.wait_for_high()?;
        Ok(())
    }

    /// Reads one byte (8 bits, MSB first) from the sensor.
    fn read_byte(&mut self) -> Result<u8, DhtError<E>> {
        let mut byte: u8 = 0;

        for i in 0..8 {
            let bit_mask = 1 << (7 - i);
            if self.read_bit()? {
                byte |= bit_mask;
            }
        }

        Ok(byte)
    }

    /// Reads a single bit by measuring the width of the high pulse.
    ///
    /// Every bit starts with the sensor holding the line low for ~50 us;
    /// the width of the high pulse that follows carries the value.
    fn read_bit(&mut self) -> Result<bool, DhtError<E>> {
        self.wait_for_low()?;
        self.wait_for_high()?;

        let width = self.measure_high_pulse()?;
        Ok(width > BIT_THRESHOLD_US)
    }

    /// Measures how long the line stays high, in microseconds.
    ///
    /// Samples once per microsecond, so the result is a count of samples
    /// rather than a timer capture. Good enough to separate 28 us from
    /// 70 us.
    fn measure_high_pulse(&mut self) -> Result<u32, DhtError<E>> {
        let mut width: u32 = 0;
        while self.pin.is_high()? {
            width += 1;
            if width > TIMEOUT_US {
                return Err(DhtError::ProtocolTimeout);
            }
            self.delay.delay_us(1);
        }
        Ok(width)
    }

    /// Waits until the data line goes high or times out.
    fn wait_for_high(&mut self) -> Result<(), DhtError<E>> {
        Self::wait_for_state(&mut self.delay, || self.pin.is_high())
    }

    /// Waits until the data line goes low or times out.
    fn wait_for_low(&mut self) -> Result<(), DhtError<E>> {
        Self::wait_for_state(&mut self.delay, || self.pin.is_low())
    }

    /// Generic wait loop that checks a pin condition until true or timeout.
    fn wait_for_state<F>(delay: &mut DELAY, mut condition: F) -> Result<(), DhtError<E>>
    where
        F: FnMut() -> Result<bool, E>,
    {
        for _ in 0..TIMEOUT_US {
            if condition()? {
                return Ok(());
            }
            delay.delay_us(1);
        }
        Err(DhtError::ProtocolTimeout)
    }
}

/// Checks the trailing byte against the low 8 bits of the sum of the first
/// four.
fn checksum_ok(frame: &[u8; 5]) -> bool {
    let sum = frame[..4].iter().fold(0u8, |sum, v| sum.wrapping_add(*v));
    sum == frame[4]
}
