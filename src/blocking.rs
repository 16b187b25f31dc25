//! Blocking driver built on [`embedded_hal`].
//!
//! Every call blocks for the settle time of the commands it sends. The fan
//! cleaning sequence blocks for roughly 17 seconds.

use crate::frame::{RawFrame, words};
use crate::hw_def::*;
use crate::schedule::{CleaningSchedule, Clock, Config};
use crate::state::{self, ScanResult, State};
use crate::types::*;

use embedded_hal::{delay::DelayNs, i2c::I2c};
use rand::RngCore;

cfg_if::cfg_if! {
    if #[cfg(feature = "defmt")] {
        use defmt::{debug, info, trace, warn};
    } else if #[cfg(feature = "log")] {
        use log::{debug, info, trace, warn};
    } else {
        macro_rules! trace {
            ($($arg:tt)*) => {};
        }
        macro_rules! debug {
            ($($arg:tt)*) => {};
        }
        macro_rules! info {
            ($($arg:tt)*) => {};
        }
        macro_rules! warn {
            ($($arg:tt)*) => {};
        }
    }
}

/// SEN66 device driver, blocking flavour
pub struct Sen66<I2C, Delay, Clk, Rng, Wdt = NoWatchdog> {
    i2c: I2C,
    delay: Delay,
    clock: Clk,
    rng: Rng,
    watchdog: Wdt,
    state: State,
}

impl<I2C, Delay, Clk, Rng> Sen66<I2C, Delay, Clk, Rng, NoWatchdog>
where
    Clk: Clock,
    Rng: RngCore,
{
    /// Create a new SEN66 driver instance.
    ///
    /// Nothing is sent on the bus until [`Sen66::initialize`]. The first
    /// cleaning interval is drawn here and counts from now.
    pub fn new(i2c: I2C, delay: Delay, mut clock: Clk, mut rng: Rng, config: Config) -> Self {
        let state = State::new(&config, &mut clock, &mut rng);
        Self {
            i2c,
            delay,
            clock,
            rng,
            watchdog: NoWatchdog,
            state,
        }
    }
}

impl<I2C, Delay, Clk, Rng, Wdt> Sen66<I2C, Delay, Clk, Rng, Wdt> {
    /// Feed `watchdog` around every bus transaction and during long waits
    pub fn with_watchdog<W: Watchdog>(self, watchdog: W) -> Sen66<I2C, Delay, Clk, Rng, W> {
        Sen66 {
            i2c: self.i2c,
            delay: self.delay,
            clock: self.clock,
            rng: self.rng,
            watchdog,
            state: self.state,
        }
    }

    /// Current operating mode
    pub fn mode(&self) -> OperatingMode {
        self.state.mode
    }

    /// Identity read by [`Sen66::initialize`]
    pub fn identity(&self) -> Option<&DeviceIdentity> {
        self.state.identity.as_ref()
    }

    /// Fan cleaning bookkeeping
    pub fn schedule(&self) -> &CleaningSchedule {
        &self.state.schedule
    }

    /// Give back the bus and delay
    pub fn release(self) -> (I2C, Delay) {
        (self.i2c, self.delay)
    }
}

impl<I2C, Delay, Clk, Rng, Wdt, E> Sen66<I2C, Delay, Clk, Rng, Wdt>
where
    I2C: I2c<Error = E>,
    Delay: DelayNs,
    Clk: Clock,
    Rng: RngCore,
    Wdt: Watchdog,
{
    /// Probe every address on the bus
    fn scan(&mut self) -> ScanResult {
        self.watchdog.feed();
        let mut result = ScanResult::default();
        for addr in I2C_SCAN_FIRST..=I2C_SCAN_LAST {
            if self.i2c.write(addr, &[]).is_ok() {
                trace!("sen66::scan(): 0x{:02x} responded", addr);
                result.responders += 1;
                result.found |= addr == self.state.address;
            }
        }
        self.watchdog.feed();
        result
    }

    /// Write one command, wait for it to settle and read the response, if any
    fn execute(&mut self, command: Command) -> Result<RawFrame, Error<E>> {
        let spec = self.state.check::<E>(command)?;
        let addr = self.state.address;

        self.watchdog.feed();
        trace!("sen66::execute(): {:?}", command);
        self.i2c.write(addr, &spec.opcode).map_err(Error::I2c)?;
        self.delay.delay_ms(spec.settle_delay_ms);
        self.watchdog.feed();

        let mut frame = RawFrame::with_len(spec.response_len);
        if !frame.is_empty() {
            self.i2c.read(addr, frame.as_mut_bytes()).map_err(Error::I2c)?;
            trace!("sen66::execute(): {:?} read {:?}", command, frame);
        }
        self.state.completed(command);
        Ok(frame)
    }

    /// Like `execute` but the response must pass the checksum of every triplet
    fn query(&mut self, command: Command) -> Result<Option<RawFrame>, Error<E>> {
        let frame = self.execute(command)?;
        let checked = state::checked(frame);
        if checked.is_none() {
            warn!("sen66::query(): crc mismatch for {:?}: {:?}", command, frame);
        }
        Ok(checked)
    }

    /// Find the device on the bus and check it is a SEN66.
    ///
    /// Fails with [`Error::DeviceNotFound`] if the address does not respond
    /// or the bus reports implausibly many devices, and with
    /// [`Error::IdentityMismatch`] if the device reports another product.
    pub fn initialize(&mut self) -> Result<&DeviceIdentity, Error<E>> {
        let scan = self.scan();
        if !scan.found {
            warn!("sen66::initialize(): 0x{:02x} not found", self.state.address);
        }
        scan.check::<E>()?;
        let identity = self.get_identity()?;
        debug!("sen66::initialize(): found {}", identity);
        Ok(self.state.identity.insert(identity))
    }

    /// Read product name, firmware version and serial number
    pub fn get_identity(&mut self) -> Result<DeviceIdentity, Error<E>> {
        let name = state::product_name::<E>(self.query(Command::GetProductName)?)?;
        let firmware_version = state::firmware_version::<E>(self.query(Command::GetVersion)?)?;
        let serial = state::serial_number::<E>(self.query(Command::GetSerialNumber)?)?;
        Ok(DeviceIdentity { name, firmware_version, serial })
    }

    /// Enter continuous measurement
    pub fn start(&mut self) -> Result<(), Error<E>> {
        self.execute(Command::StartMeasurement)?;
        Ok(())
    }

    /// Return to idle
    pub fn stop(&mut self) -> Result<(), Error<E>> {
        self.execute(Command::StopMeasurement)?;
        Ok(())
    }

    /// Read the device status, `None` if the response was corrupted
    pub fn get_status(&mut self) -> Result<Option<StatusBits>, Error<E>> {
        let frame = self.query(Command::ReadDeviceStatus)?;
        Ok(frame.map(|frame| StatusBits::from(words::<2>(frame.as_bytes()))))
    }

    /// Read the device status and clear the error flags
    pub fn read_and_clear_status(&mut self) -> Result<Option<StatusBits>, Error<E>> {
        let frame = self.query(Command::ReadAndClearDeviceStatus)?;
        Ok(frame.map(|frame| StatusBits::from(words::<2>(frame.as_bytes()))))
    }

    /// Whether a new sample can be read, `None` if the response was corrupted
    pub fn data_ready(&mut self) -> Result<Option<bool>, Error<E>> {
        let frame = self.query(Command::GetDataReady)?;
        Ok(frame.as_ref().map(state::data_ready))
    }

    /// Read a new sample if one is ready.
    ///
    /// `Ok(None)` means there is no new data yet (or the ready flag was
    /// corrupted); poll again later. After a sample is read the fan cleaning
    /// schedule is checked, so this call may block for the whole cleaning
    /// sequence.
    pub fn get_data(&mut self) -> Result<Option<MeasurementSample>, Error<E>> {
        self.state.check::<E>(Command::ReadMeasuredValues)?;
        if self.data_ready()? != Some(true) {
            trace!("sen66::get_data(): no new data");
            return Ok(None);
        }
        let frame = self.execute(Command::ReadMeasuredValues)?;
        let sample = MeasurementSample::from_frame(frame.as_bytes());
        self.clean(false)?;
        Ok(Some(sample))
    }

    /// Run the fan cleaning sequence if it is due, or unconditionally if `force`.
    ///
    /// Stops the measurement, cleans and resumes measuring. Returns whether a
    /// cleaning ran. The device must be measuring for a cleaning to run.
    pub fn clean(&mut self, force: bool) -> Result<bool, Error<E>> {
        self.watchdog.feed();
        let now = self.clock.now_secs();
        if !force && !self.state.schedule.is_due(now) {
            return Ok(false);
        }
        self.state.check::<E>(Command::StopMeasurement)?;

        self.state.schedule.restart(now, &mut self.rng);
        info!("sen66::clean(): cleaning fan, next in {} s", self.state.schedule.interval_s());

        self.execute(Command::StopMeasurement)?;
        self.watchdog.feed();
        self.delay.delay_ms(FAN_SPIN_DOWN_MS);
        self.execute(Command::StartFanCleaning)?;
        for _ in 0..FAN_CLEANING_STEPS {
            self.watchdog.feed();
            self.delay.delay_ms(FAN_CLEANING_STEP_MS);
        }
        self.execute(Command::StartMeasurement)?;
        Ok(true)
    }

    /// Soft reset, the device comes back idle
    pub fn device_reset(&mut self) -> Result<(), Error<E>> {
        self.execute(Command::DeviceReset)?;
        Ok(())
    }

    /// Heat the RH/T sensor, e.g. to remove condensation. Read the result
    /// with [`Sen66::sht_heater_measurement`] once the heater cycle is over.
    pub fn activate_sht_heater(&mut self) -> Result<(), Error<E>> {
        self.execute(Command::ActivateShtHeater)?;
        Ok(())
    }

    /// RH/T measured at the end of the last heater cycle
    pub fn sht_heater_measurement(&mut self) -> Result<Option<HeaterMeasurement>, Error<E>> {
        let frame = self.query(Command::GetShtHeaterMeasurement)?;
        Ok(frame.map(|frame| HeaterMeasurement::from(words::<2>(frame.as_bytes()))))
    }

    /// Ambient pressure used for CO₂ compensation [hPa]
    pub fn ambient_pressure(&mut self) -> Result<Option<u16>, Error<E>> {
        let frame = self.query(Command::GetAmbientPressure)?;
        Ok(frame.map(|frame| words::<1>(frame.as_bytes())[0]))
    }

    /// Altitude used for CO₂ compensation [m]
    pub fn sensor_altitude(&mut self) -> Result<Option<u16>, Error<E>> {
        let frame = self.query(Command::GetSensorAltitude)?;
        Ok(frame.map(|frame| words::<1>(frame.as_bytes())[0]))
    }

    /// Unprocessed sensor signals of the current sample
    pub fn read_raw(&mut self) -> Result<Option<RawSample>, Error<E>> {
        let frame = self.query(Command::ReadMeasuredRaw)?;
        Ok(frame.map(|frame| RawSample::from(words::<5>(frame.as_bytes()))))
    }

    /// Particle number concentrations of the current sample
    pub fn read_number_concentration(&mut self) -> Result<Option<NumberConcentration>, Error<E>> {
        let frame = self.query(Command::ReadNumberConcentration)?;
        Ok(frame.map(|frame| NumberConcentration::from(words::<5>(frame.as_bytes()))))
    }
}
