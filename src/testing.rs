//! Bus transcripts and fakes for the driver tests.

use crate::hw_def::*;
use crate::integrity::checksum;
use crate::schedule::Clock;
use crate::types::Watchdog;

use embedded_hal::i2c::{ErrorKind, NoAcknowledgeSource};
use embedded_hal_mock::eh1::i2c::Transaction;
use std::cell::Cell;
use std::rc::Rc;

pub(crate) const ADDR: u8 = I2C_ADDR_DEFAULT;

#[derive(Clone, Default)]
pub(crate) struct TestClock(Rc<Cell<u64>>);

impl TestClock {
    pub(crate) fn set(&self, now_s: u64) {
        self.0.set(now_s);
    }
}

impl Clock for TestClock {
    fn now_secs(&mut self) -> u64 {
        self.0.get()
    }
}

#[derive(Clone, Default)]
pub(crate) struct CountingWatchdog(Rc<Cell<u32>>);

impl CountingWatchdog {
    pub(crate) fn count(&self) -> u32 {
        self.0.get()
    }
}

impl Watchdog for CountingWatchdog {
    fn feed(&mut self) {
        self.0.set(self.0.get() + 1);
    }
}

/// Words with their checksums, as the device sends them
pub(crate) fn words_frame(words: &[u16]) -> Vec<u8> {
    words
        .iter()
        .flat_map(|word| {
            let [b0, b1] = word.to_be_bytes();
            [b0, b1, checksum(b0, b1)]
        })
        .collect()
}

/// NUL padded 48 byte string response
pub(crate) fn string_frame(s: &str) -> Vec<u8> {
    let mut chars = [0u8; MAX_RESPONSE_LEN / 3 * 2];
    chars[..s.len()].copy_from_slice(s.as_bytes());
    let words: Vec<u16> = chars
        .chunks_exact(2)
        .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
        .collect();
    words_frame(&words)
}

/// Probe of every address, only `present` acknowledging
pub(crate) fn scan(present: &[u8]) -> Vec<Transaction> {
    (I2C_SCAN_FIRST..=I2C_SCAN_LAST)
        .map(|addr| {
            let probe = Transaction::write(addr, Vec::new());
            if present.contains(&addr) {
                probe
            } else {
                probe.with_error(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address))
            }
        })
        .collect()
}

/// Opcode write followed by the read of `response`, if any
pub(crate) fn command(command: Command, response: Option<&[u8]>) -> Vec<Transaction> {
    let mut transactions = std::vec![Transaction::write(ADDR, command.to_be_bytes().to_vec())];
    if let Some(response) = response {
        transactions.push(Transaction::read(ADDR, response.to_vec()));
    }
    transactions
}

pub(crate) fn identity(name: &str, (major, minor): (u8, u8), serial: &str) -> Vec<Transaction> {
    let mut transactions = command(Command::GetProductName, Some(&string_frame(name)));
    let version = words_frame(&[u16::from_be_bytes([major, minor]), 0, 0, 0]);
    transactions.extend(command(Command::GetVersion, Some(&version)));
    transactions.extend(command(Command::GetSerialNumber, Some(&string_frame(serial))));
    transactions
}

/// Stop, fan cleaning, restart
pub(crate) fn cleaning() -> Vec<Transaction> {
    let mut transactions = command(Command::StopMeasurement, None);
    transactions.extend(command(Command::StartFanCleaning, None));
    transactions.extend(command(Command::StartMeasurement, None));
    transactions
}
