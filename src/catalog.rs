use crate::hw_def::Command;
use crate::types::OperatingMode;

#[cfg(feature = "defmt")]
use defmt::Format;

/// Operating mode(s) in which a command may be sent
#[cfg_attr(feature = "defmt", derive(Format))]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RequiredMode {
    /// Only while idle
    Idle,
    /// Only while measuring
    Measuring,
    /// In both modes
    Either,
}

impl RequiredMode {
    /// Whether a command with this requirement may be sent in `mode`
    pub fn permits(self, mode: OperatingMode) -> bool {
        match self {
            RequiredMode::Either => true,
            RequiredMode::Idle => mode == OperatingMode::Idle,
            RequiredMode::Measuring => mode == OperatingMode::Measuring,
        }
    }
}

/// Bus behaviour of one command
#[cfg_attr(feature = "defmt", derive(Format))]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct CommandSpec {
    /// The command itself
    pub command: Command,
    /// Opcode bytes written to the device
    pub opcode: [u8; 2],
    /// Time the device needs before it can be talked to again
    pub settle_delay_ms: u32,
    /// Bytes to read back, checksums included
    pub response_len: usize,
    /// Mode the device must be in
    pub required_mode: RequiredMode,
}

const fn spec(command: Command, settle_delay_ms: u32, response_len: usize, required_mode: RequiredMode) -> CommandSpec {
    CommandSpec {
        command,
        opcode: (command as u16).to_be_bytes(),
        settle_delay_ms,
        response_len,
        required_mode,
    }
}

impl Command {
    /// Catalog entry for this command
    pub const fn spec(self) -> CommandSpec {
        use RequiredMode::*;
        match self {
            Command::ActivateShtHeater => spec(self, 20, 0, Idle),
            Command::DeviceReset => spec(self, 1200, 0, Idle),
            Command::GetAmbientPressure => spec(self, 20, 3, Either),
            Command::GetDataReady => spec(self, 20, 3, Measuring),
            Command::GetProductName => spec(self, 20, 48, Either),
            Command::GetSensorAltitude => spec(self, 20, 3, Idle),
            Command::GetSerialNumber => spec(self, 20, 48, Either),
            Command::GetShtHeaterMeasurement => spec(self, 20, 6, Idle),
            Command::GetVersion => spec(self, 20, 12, Either),
            Command::StartFanCleaning => spec(self, 20, 0, Idle),
            Command::StartMeasurement => spec(self, 50, 0, Idle),
            Command::StopMeasurement => spec(self, 1000, 0, Measuring),
            Command::ReadAndClearDeviceStatus => spec(self, 20, 6, Either),
            Command::ReadDeviceStatus => spec(self, 20, 6, Either),
            Command::ReadMeasuredRaw => spec(self, 20, 15, Measuring),
            Command::ReadMeasuredValues => spec(self, 20, 27, Measuring),
            Command::ReadNumberConcentration => spec(self, 20, 15, Measuring),
        }
    }
}

impl OperatingMode {
    /// Mode the device is in after `command` completed
    pub fn after(self, command: Command) -> OperatingMode {
        match command {
            Command::StartMeasurement => OperatingMode::Measuring,
            Command::StopMeasurement | Command::DeviceReset => OperatingMode::Idle,
            _ => self,
        }
    }
}
