//! Bus-independent bookkeeping shared by the blocking and async drivers.

use crate::catalog::CommandSpec;
use crate::frame::{MAX_STRING_LEN, RawFrame, decode_string, validate, words};
use crate::hw_def::*;
use crate::schedule::{CleaningSchedule, Clock, Config};
use crate::types::*;

use heapless::String;
use rand::RngCore;

pub(crate) struct State {
    pub(crate) address: u8,
    pub(crate) mode: OperatingMode,
    pub(crate) schedule: CleaningSchedule,
    pub(crate) identity: Option<DeviceIdentity>,
}

impl State {
    pub(crate) fn new<Clk: Clock, Rng: RngCore>(config: &Config, clock: &mut Clk, rng: &mut Rng) -> Self {
        Self {
            address: config.address,
            mode: OperatingMode::Idle,
            schedule: CleaningSchedule::new(config.clean_interval, clock.now_secs(), rng),
            identity: None,
        }
    }

    /// Catalog entry of `command`, refused if the current mode does not allow it
    pub(crate) fn check<E>(&self, command: Command) -> Result<CommandSpec, Error<E>> {
        let spec = command.spec();
        if spec.required_mode.permits(self.mode) {
            Ok(spec)
        } else {
            Err(Error::ModeViolation { command, mode: self.mode })
        }
    }

    pub(crate) fn completed(&mut self, command: Command) {
        self.mode = self.mode.after(command);
    }
}

/// Outcome of probing every address on the bus
#[derive(Default)]
pub(crate) struct ScanResult {
    pub(crate) responders: usize,
    pub(crate) found: bool,
}

impl ScanResult {
    pub(crate) fn check<E>(self) -> Result<(), Error<E>> {
        if self.responders > I2C_SCAN_MAX_DEVICES || !self.found {
            Err(Error::DeviceNotFound)
        } else {
            Ok(())
        }
    }
}

pub(crate) fn product_name<E>(frame: Option<RawFrame>) -> Result<String<MAX_STRING_LEN>, Error<E>> {
    let frame = frame.ok_or(Error::CrcMismatch)?;
    let name = decode_string(frame.as_bytes());
    if name.as_str() == PRODUCT_NAME {
        Ok(name)
    } else {
        Err(Error::IdentityMismatch)
    }
}

pub(crate) fn firmware_version<E>(frame: Option<RawFrame>) -> Result<FirmwareVersion, Error<E>> {
    let frame = frame.ok_or(Error::CrcMismatch)?;
    let [major, minor] = words::<1>(frame.as_bytes())[0].to_be_bytes();
    Ok(FirmwareVersion { major, minor })
}

pub(crate) fn serial_number<E>(frame: Option<RawFrame>) -> Result<String<MAX_STRING_LEN>, Error<E>> {
    frame
        .map(|frame| decode_string(frame.as_bytes()))
        .ok_or(Error::CrcMismatch)
}

/// Validated frame, `None` when any triplet fails its checksum
pub(crate) fn checked(frame: RawFrame) -> Option<RawFrame> {
    validate(frame.as_bytes()).map(|_| frame)
}

pub(crate) fn data_ready(frame: &RawFrame) -> bool {
    // first byte is padding, second the flag
    frame.as_bytes()[1] == 0x01
}
