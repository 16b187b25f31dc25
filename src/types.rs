use crate::frame::{MAX_STRING_LEN, triplets};
use crate::hw_def::*;

use core::fmt;

#[cfg(feature = "defmt")]
use defmt::Format;
use heapless::String;

/// All possible errors in this crate
#[cfg_attr(feature = "defmt", derive(Format))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error<E> {
    /// I²C communication error
    I2c(E),
    /// The configured address did not answer a bus scan, or the bus looks faulty
    DeviceNotFound,
    /// The device at the address does not report itself as a SEN66
    IdentityMismatch,
    /// The command is not allowed in the current operating mode
    ModeViolation {
        /// Command that was refused
        command: Command,
        /// Mode the driver was in
        mode: OperatingMode,
    },
    /// Failure of a checksum from the device was detected
    CrcMismatch,
}

impl<E: fmt::Debug> fmt::Display for Error<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::I2c(err) => write!(f, "I²C error: {err:?}"),
            Self::DeviceNotFound => write!(f, "device not found on the bus"),
            Self::IdentityMismatch => write!(f, "device does not identify as {PRODUCT_NAME}"),
            Self::ModeViolation { command, mode } => {
                write!(f, "{command:?} is not allowed while {mode}")
            }
            Self::CrcMismatch => write!(f, "checksum mismatch"),
        }
    }
}

impl<E: fmt::Debug> core::error::Error for Error<E> {}

/// Operating mode of the sensor module
#[cfg_attr(feature = "defmt", derive(Format))]
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum OperatingMode {
    /// Not measuring, configuration commands are accepted
    #[default]
    Idle,
    /// Continuous measurement
    Measuring,
}

impl fmt::Display for OperatingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Measuring => write!(f, "measuring"),
        }
    }
}

/// Firmware version of the device
#[cfg_attr(feature = "defmt", derive(Format))]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct FirmwareVersion {
    /// major version
    pub major: u8,
    /// minor version
    pub minor: u8,
}

impl fmt::Display for FirmwareVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// What the device reported about itself during initialization
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DeviceIdentity {
    /// Product name, "SEN66"
    pub name: String<MAX_STRING_LEN>,
    /// Firmware version
    pub firmware_version: FirmwareVersion,
    /// Serial number
    pub serial: String<MAX_STRING_LEN>,
}

#[cfg(feature = "defmt")]
impl Format for DeviceIdentity {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(
            f,
            "{=str} (firmware {}, serial {=str})",
            self.name.as_str(),
            self.firmware_version,
            self.serial.as_str()
        )
    }
}

impl fmt::Display for DeviceIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (firmware {}, serial {})", self.name, self.firmware_version, self.serial)
    }
}

fn unsigned(raw: u16, scale: f32) -> Option<f32> {
    (raw != UNKNOWN_UNSIGNED).then(|| raw as f32 / scale)
}

fn signed(raw: u16, scale: f32) -> Option<f32> {
    let raw = raw as i16;
    (raw != UNKNOWN_SIGNED).then(|| raw as f32 / scale)
}

/// One measurement sample.
///
/// A channel is `None` when its word failed the checksum or the device
/// reported the value as unknown (e.g. while the sensor warms up).
#[cfg_attr(feature = "defmt", derive(Format))]
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MeasurementSample {
    /// Mass Concentration PM1.0 [μg/m³]
    pub pm1_0: Option<f32>,
    /// Mass Concentration PM2.5 [μg/m³]
    pub pm2_5: Option<f32>,
    /// Mass Concentration PM4.0 [μg/m³]
    pub pm4_0: Option<f32>,
    /// Mass Concentration PM10 [μg/m³]
    pub pm10_0: Option<f32>,
    /// Compensated Ambient Humidity [%RH]
    pub humidity: Option<f32>,
    /// Compensated Ambient Temperature [°C]
    pub temperature: Option<f32>,
    /// VOC Index
    pub voc_index: Option<f32>,
    /// NOx Index
    pub nox_index: Option<f32>,
    /// CO₂ concentration [ppm]
    pub co2_ppm: Option<u16>,
}

impl MeasurementSample {
    /// Decode the 27 byte response of `ReadMeasuredValues`, checking every triplet on its own
    pub fn from_frame(frame: &[u8]) -> Self {
        let mut words = triplets(frame);
        let mut next = || words.next().flatten();
        Self {
            pm1_0: next().and_then(|raw| unsigned(raw, SCALE_PM)),
            pm2_5: next().and_then(|raw| unsigned(raw, SCALE_PM)),
            pm4_0: next().and_then(|raw| unsigned(raw, SCALE_PM)),
            pm10_0: next().and_then(|raw| unsigned(raw, SCALE_PM)),
            humidity: next().and_then(|raw| signed(raw, SCALE_HUMIDITY)),
            temperature: next().and_then(|raw| signed(raw, SCALE_TEMPERATURE)),
            voc_index: next().and_then(|raw| signed(raw, SCALE_INDEX)),
            nox_index: next().and_then(|raw| signed(raw, SCALE_INDEX)),
            co2_ppm: next().filter(|raw| *raw != UNKNOWN_UNSIGNED),
        }
    }
}

/// Unprocessed sensor signals
#[cfg_attr(feature = "defmt", derive(Format))]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct RawSample {
    /// Raw humidity [%RH] [×100]
    pub raw_humidity: i16,
    /// Raw temperature [°C] [×200]
    pub raw_temperature: i16,
    /// Raw VOC ticks
    pub raw_voc: u16,
    /// Raw NOx ticks
    pub raw_nox: u16,
    /// Raw (non-interpolated) CO₂ [ppm]
    pub raw_co2: u16,
}

impl From<[u16; 5]> for RawSample {
    fn from(data: [u16; 5]) -> Self {
        Self {
            raw_humidity: data[0] as i16,
            raw_temperature: data[1] as i16,
            raw_voc: data[2],
            raw_nox: data[3],
            raw_co2: data[4],
        }
    }
}

/// Particle number concentrations
#[cfg_attr(feature = "defmt", derive(Format))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NumberConcentration {
    /// Number Concentration PM0.5 [#/cm³]
    pub pm0_5: Option<f32>,
    /// Number Concentration PM1.0 [#/cm³]
    pub pm1_0: Option<f32>,
    /// Number Concentration PM2.5 [#/cm³]
    pub pm2_5: Option<f32>,
    /// Number Concentration PM4.0 [#/cm³]
    pub pm4_0: Option<f32>,
    /// Number Concentration PM10 [#/cm³]
    pub pm10_0: Option<f32>,
}

impl From<[u16; 5]> for NumberConcentration {
    fn from(data: [u16; 5]) -> Self {
        Self {
            pm0_5: unsigned(data[0], SCALE_NUMBER_CONCENTRATION),
            pm1_0: unsigned(data[1], SCALE_NUMBER_CONCENTRATION),
            pm2_5: unsigned(data[2], SCALE_NUMBER_CONCENTRATION),
            pm4_0: unsigned(data[3], SCALE_NUMBER_CONCENTRATION),
            pm10_0: unsigned(data[4], SCALE_NUMBER_CONCENTRATION),
        }
    }
}

/// RH/T measured by the SHT sensor right after a heater cycle
#[cfg_attr(feature = "defmt", derive(Format))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HeaterMeasurement {
    /// relative humidity in percent, `None` until the heater cycle finished
    pub humidity: Option<f32>,
    /// degrees centigrade, `None` until the heater cycle finished
    pub temperature: Option<f32>,
}

impl From<[u16; 2]> for HeaterMeasurement {
    fn from(data: [u16; 2]) -> Self {
        Self {
            humidity: signed(data[0], SCALE_HUMIDITY),
            temperature: signed(data[1], SCALE_TEMPERATURE),
        }
    }
}

/// Status bits from the device
#[cfg_attr(feature = "defmt", derive(Format))]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct StatusBits {
    raw: u32,
    /// fan speed is more than 10% off its target
    pub fan_speed_warning: bool,
    /// particulate matter sensor error
    pub pm_error: bool,
    /// CO₂ sensor error
    pub co2_error: bool,
    /// VOC/NOx sensor error
    pub gas_error: bool,
    /// humidity/temperature sensor error
    pub rh_t_error: bool,
    /// fan is stalled or blocked
    pub fan_error: bool,
}

impl From<u32> for StatusBits {
    fn from(raw: u32) -> Self {
        let bit = |n: u32| (raw >> n) & 1 != 0;
        Self {
            raw,
            fan_speed_warning: bit(STATUS_BIT_FAN_SPEED_WARNING),
            pm_error: bit(STATUS_BIT_PM_ERROR),
            co2_error: bit(STATUS_BIT_CO2_ERROR),
            gas_error: bit(STATUS_BIT_GAS_ERROR),
            rh_t_error: bit(STATUS_BIT_RH_T_ERROR),
            fan_error: bit(STATUS_BIT_FAN_ERROR),
        }
    }
}

impl From<[u16; 2]> for StatusBits {
    fn from(data: [u16; 2]) -> Self {
        Self::from((data[0] as u32) << 16 | data[1] as u32)
    }
}

impl StatusBits {
    /// Get the raw status bits
    pub fn raw(&self) -> u32 {
        self.raw
    }

    /// Any error bit is set
    pub fn has_error(&self) -> bool {
        self.pm_error || self.co2_error || self.gas_error || self.rh_t_error || self.fan_error
    }
}

impl fmt::Display for StatusBits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StatusBits {{ 0x{:08x}; ", self.raw)?;
        if self.fan_speed_warning {
            write!(f, "fan_speed_warning ")?;
        }
        if self.pm_error {
            write!(f, "pm_error ")?;
        }
        if self.co2_error {
            write!(f, "co2_error ")?;
        }
        if self.gas_error {
            write!(f, "gas_error ")?;
        }
        if self.rh_t_error {
            write!(f, "rh_t_error ")?;
        }
        if self.fan_error {
            write!(f, "fan_error ")?;
        }
        write!(f, "}}")
    }
}

/// Liveness signal for an external watchdog.
///
/// The driver feeds it around every bus transaction and during every wait of
/// the fan cleaning sequence.
pub trait Watchdog {
    /// Reset the watchdog timer
    fn feed(&mut self);
}

/// Used when no watchdog is attached
#[derive(Clone, Copy, Debug, Default)]
pub struct NoWatchdog;

impl Watchdog for NoWatchdog {
    fn feed(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::integrity::checksum;

    fn frame(words: &[u16]) -> [u8; 27] {
        let mut buf = [0u8; 27];
        for (ii, word) in words.iter().enumerate() {
            let [b0, b1] = word.to_be_bytes();
            buf[ii * 3] = b0;
            buf[ii * 3 + 1] = b1;
            buf[ii * 3 + 2] = checksum(b0, b1);
        }
        buf
    }

    #[test]
    fn measurement_scaling() {
        let buf = frame(&[123, 250, 401, 1000, 4512, 5000, 1000, 15, 812]);
        let sample = MeasurementSample::from_frame(&buf);
        assert_eq!(sample.pm1_0, Some(12.3));
        assert_eq!(sample.pm2_5, Some(25.0));
        assert_eq!(sample.pm4_0, Some(40.1));
        assert_eq!(sample.pm10_0, Some(100.0));
        assert_eq!(sample.humidity, Some(45.12));
        assert_eq!(sample.temperature, Some(25.0));
        assert_eq!(sample.voc_index, Some(100.0));
        assert_eq!(sample.nox_index, Some(1.5));
        assert_eq!(sample.co2_ppm, Some(812));
    }

    #[test]
    fn negative_temperature() {
        let buf = frame(&[0, 0, 0, 0, 0, (-1000i16) as u16, 0, 0, 0]);
        assert_eq!(MeasurementSample::from_frame(&buf).temperature, Some(-5.0));
    }

    #[test]
    fn bad_checksum_only_drops_that_channel() {
        let mut buf = frame(&[123, 250, 401, 1000, 4512, 5000, 1000, 15, 812]);
        buf[17] ^= 0x40;
        let sample = MeasurementSample::from_frame(&buf);
        assert_eq!(sample.temperature, None);
        assert_eq!(sample.humidity, Some(45.12));
        assert_eq!(sample.voc_index, Some(100.0));
    }

    #[test]
    fn unknown_values() {
        let buf = frame(&[0xFFFF, 0xFFFF, 0xFFFF, 0xFFFF, 0x7FFF, 0x7FFF, 0x7FFF, 0x7FFF, 0xFFFF]);
        assert_eq!(MeasurementSample::from_frame(&buf), MeasurementSample::default());
    }

    #[test]
    fn short_frame_leaves_channels_empty() {
        let buf = frame(&[10, 20]);
        let sample = MeasurementSample::from_frame(&buf[..6]);
        assert_eq!(sample.pm1_0, Some(1.0));
        assert_eq!(sample.pm2_5, Some(2.0));
        assert_eq!(sample.pm4_0, None);
        assert_eq!(sample.co2_ppm, None);
    }

    #[test]
    fn status_bits() {
        let status = StatusBits::from([0x0020, 0x0A10]);
        assert_eq!(status.raw(), 0x0020_0A10);
        assert!(status.fan_speed_warning);
        assert!(status.pm_error);
        assert!(status.co2_error);
        assert!(status.fan_error);
        assert!(!status.gas_error);
        assert!(!status.rh_t_error);
        assert!(status.has_error());
        assert!(!StatusBits::from(1u32 << STATUS_BIT_FAN_SPEED_WARNING).has_error());
    }

    #[test]
    fn heater_measurement() {
        let measurement = HeaterMeasurement::from([3050, 0x7FFF]);
        assert_eq!(measurement.humidity, Some(30.5));
        assert_eq!(measurement.temperature, None);
    }

    #[test]
    fn number_concentration() {
        let nc = NumberConcentration::from([55, 100, 0, 0xFFFF, 1]);
        assert_eq!(nc.pm0_5, Some(5.5));
        assert_eq!(nc.pm1_0, Some(10.0));
        assert_eq!(nc.pm2_5, Some(0.0));
        assert_eq!(nc.pm4_0, None);
        assert_eq!(nc.pm10_0, Some(0.1));
    }
}
