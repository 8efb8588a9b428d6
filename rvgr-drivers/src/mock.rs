//! Recording SPI device for driver tests

use std::collections::VecDeque;
use std::vec::Vec;

use embedded_hal::spi::{ErrorKind, ErrorType, Operation};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusFault;

impl embedded_hal::spi::Error for BusFault {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Other
    }
}

/// Logs every write and answers reads from a queue
///
/// Each transaction is recorded as the concatenation of its writes.
/// Reads are filled from `responses`, one queued response per read
/// operation; with the queue empty a read returns zeros.
#[derive(Debug, Default)]
pub struct MockSpi {
    pub transactions: Vec<Vec<u8>>,
    pub responses: VecDeque<Vec<u8>>,
    /// Fail the transaction with this index
    pub fail_at: Option<usize>,
}

impl MockSpi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(mut self, bytes: &[u8]) -> Self {
        self.responses.push_back(bytes.to_vec());
        self
    }

    fn run(&mut self, operations: &mut [Operation<'_, u8>]) -> Result<(), BusFault> {
        if self.fail_at == Some(self.transactions.len()) {
            self.fail_at = None;
            return Err(BusFault);
        }
        let mut written = Vec::new();
        for op in operations.iter_mut() {
            match op {
                Operation::Write(bytes) => written.extend_from_slice(&bytes[..]),
                Operation::Read(buf) => {
                    let reply = self.responses.pop_front().unwrap_or_default();
                    for (i, b) in buf.iter_mut().enumerate() {
                        *b = reply.get(i).copied().unwrap_or(0);
                    }
                }
                Operation::Transfer(read, write) => {
                    written.extend_from_slice(&write[..]);
                    read.fill(0);
                }
                Operation::TransferInPlace(buf) => {
                    written.extend_from_slice(&buf[..]);
                    buf.fill(0);
                }
                Operation::DelayNs(_) => {}
            }
        }
        self.transactions.push(written);
        Ok(())
    }
}

impl ErrorType for MockSpi {
    type Error = BusFault;
}

impl embedded_hal::spi::SpiDevice for MockSpi {
    fn transaction(&mut self, operations: &mut [Operation<'_, u8>]) -> Result<(), BusFault> {
        self.run(operations)
    }
}

impl embedded_hal_async::spi::SpiDevice for MockSpi {
    async fn transaction(&mut self, operations: &mut [Operation<'_, u8>]) -> Result<(), BusFault> {
        self.run(operations)
    }
}
