//! Hardware definitions taken from the SEN6x datasheet.

#[cfg(feature = "defmt")]
use defmt::Format;

/// Default 7-bit I²C address of the SEN66
pub const I2C_ADDR_DEFAULT: u8 = 0x6B;

/// First non-reserved 7-bit address probed during a bus scan
pub const I2C_SCAN_FIRST: u8 = 0x08;
/// Last non-reserved 7-bit address probed during a bus scan
pub const I2C_SCAN_LAST: u8 = 0x77;
/// More responders than this on one bus points at a bus fault rather than real devices
pub const I2C_SCAN_MAX_DEVICES: usize = 10;

/// Product name reported by a SEN66
pub const PRODUCT_NAME: &str = "SEN66";

/// Longest response of any command (product name and serial number)
pub const MAX_RESPONSE_LEN: usize = 48;

/// Lower bound of the default fan cleaning interval (one day)
pub const CLEAN_INTERVAL_LOWER_DEFAULT_S: u32 = 86_400;
/// Upper bound of the default fan cleaning interval (two days)
pub const CLEAN_INTERVAL_UPPER_DEFAULT_S: u32 = 2 * 86_400;

/// Pause between stopping measurement and starting the fan cleaning
pub const FAN_SPIN_DOWN_MS: u32 = 1_000;
/// The fan cleaning wait is split in steps so the watchdog can be fed in between
pub const FAN_CLEANING_STEPS: u32 = 5;
/// Duration of one fan cleaning wait step
pub const FAN_CLEANING_STEP_MS: u32 = 3_000;

// Scaling of the measured values
pub(crate) const SCALE_PM: f32 = 10.0;
pub(crate) const SCALE_HUMIDITY: f32 = 100.0;
pub(crate) const SCALE_TEMPERATURE: f32 = 200.0;
pub(crate) const SCALE_INDEX: f32 = 10.0;
pub(crate) const SCALE_NUMBER_CONCENTRATION: f32 = 10.0;

// "Value unknown" markers sent while a channel is still warming up
pub(crate) const UNKNOWN_UNSIGNED: u16 = 0xFFFF;
pub(crate) const UNKNOWN_SIGNED: i16 = 0x7FFF;

// Device status register (32 bit)
pub(crate) const STATUS_BIT_FAN_SPEED_WARNING: u32 = 21;
pub(crate) const STATUS_BIT_PM_ERROR: u32 = 11;
pub(crate) const STATUS_BIT_CO2_ERROR: u32 = 9;
pub(crate) const STATUS_BIT_GAS_ERROR: u32 = 7;
pub(crate) const STATUS_BIT_RH_T_ERROR: u32 = 6;
pub(crate) const STATUS_BIT_FAN_ERROR: u32 = 4;

/// Every command the SEN66 understands that this driver issues
#[cfg_attr(feature = "defmt", derive(Format))]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(u16)]
pub enum Command {
    /// Heat the RH/T sensor for one second
    ActivateShtHeater = 0x6765,
    /// Soft reset, the device returns to idle
    DeviceReset = 0xD304,
    /// Ambient pressure used for CO₂ compensation
    GetAmbientPressure = 0x6720,
    /// Data-ready flag
    GetDataReady = 0x0202,
    /// Product name string
    GetProductName = 0xD014,
    /// Altitude used for CO₂ compensation
    GetSensorAltitude = 0x6736,
    /// Serial number string
    GetSerialNumber = 0xD033,
    /// RH/T measured at the end of a heater cycle
    GetShtHeaterMeasurement = 0x6790,
    /// Firmware version
    GetVersion = 0xD100,
    /// Spin the fan at full speed to blow out dust
    StartFanCleaning = 0x5607,
    /// Enter continuous measurement
    StartMeasurement = 0x0021,
    /// Leave continuous measurement
    StopMeasurement = 0x0104,
    /// Device status, cleared after reading
    ReadAndClearDeviceStatus = 0xD210,
    /// Device status
    ReadDeviceStatus = 0xD206,
    /// Raw RH/T, VOC/NOx ticks and CO₂
    ReadMeasuredRaw = 0x0405,
    /// Scaled measurement sample
    ReadMeasuredValues = 0x0300,
    /// Particle number concentrations
    ReadNumberConcentration = 0x0316,
}

impl Command {
    /// The two opcode bytes as sent on the bus
    pub fn to_be_bytes(self) -> [u8; 2] {
        (self as u16).to_be_bytes()
    }
}
