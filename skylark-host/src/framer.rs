use embassy_stm32::dma::NoDma;
use embassy_stm32::peripherals::USART2;
use embassy_stm32::usart::UartTx;

use skylark_core::{FramerError, RadioFramer};

/// Start-of-frame delimiter understood by the modem on the other end.
const FRAME_DELIMITER: u8 = 0x7E;

/// Glue between the radio task and the serial radio modem.
///
/// The modem does its own RF framing; this layer only prefixes a delimiter
/// and a length byte so the modem can re-synchronise after line noise.
pub struct UartFramer {
    tx: UartTx<'static, USART2, NoDma>,
}

impl UartFramer {
    pub fn new(tx: UartTx<'static, USART2, NoDma>) -> Self {
        Self { tx }
    }
}

impl RadioFramer for UartFramer {
    fn enqueue(&mut self, payload: &[u8]) -> Result<(), FramerError> {
        if payload.len() > u8::MAX as usize {
            return Err(FramerError);
        }
        let header = [FRAME_DELIMITER, payload.len() as u8];
        self.tx.blocking_write(&header).map_err(|_| FramerError)?;
        self.tx.blocking_write(payload).map_err(|_| FramerError)
    }
}
