//! Sensirion CRC-8 over one 16 bit word: polynomial 0x31, init 0xFF, MSB first, no final XOR.

use crc::{CRC_8_NRSC_5, Crc};

const CRC: Crc<u8> = Crc::<u8>::new(&CRC_8_NRSC_5);

/// Checksum the device appends to the data word `b0, b1`
pub fn checksum(b0: u8, b1: u8) -> u8 {
    CRC.checksum(&[b0, b1])
}

/// Whether `crc` is the checksum of `b0, b1`
pub fn verify_triplet(b0: u8, b1: u8, crc: u8) -> bool {
    checksum(b0, b1) == crc
}

/// The big-endian word of one triplet, or `None` if its checksum does not match
pub fn parse_triplet(b0: u8, b1: u8, crc: u8) -> Option<u16> {
    verify_triplet(b0, b1, crc).then(|| u16::from_be_bytes([b0, b1]))
}
