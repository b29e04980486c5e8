use std::io::{Read, Write};
use std::time::Duration;

use crate::adapter::Adapter;
use crate::Error;

const BAUD_RATE: u32 = 9600;
const TIMEOUT: Duration = Duration::from_secs(3);

/// Adapter for instruments attached through a serial port (RS-232, or a USB bridge).
pub struct SerialAdapter {
    port: Box<dyn serialport::SerialPort>,
}

impl SerialAdapter {
    /// Opens `path` at 9600 baud, 8N1, with a 3 second read timeout.
    pub fn open(path: &str) -> Result<SerialAdapter, Error> {
        let port = serialport::new(path, BAUD_RATE)
            .timeout(TIMEOUT)
            .open()
            .map_err(std::io::Error::from)?;
        Ok(SerialAdapter { port })
    }
}

impl Adapter for SerialAdapter {
    fn write(&mut self, command: &str) -> Result<(), Error> {
        log::trace!("-> {:?}", command);
        self.port.write_all(command.as_bytes())?;
        self.port.write_all(b"\n")?;
        Ok(())
    }

    fn ask(&mut self, command: &str) -> Result<String, Error> {
        self.write(command)?;
        let mut response = Vec::new();
        let mut byte = [0u8; 1];
        loop {
            self.port.read_exact(&mut byte)?;
            if byte[0] == b'\n' {
                break;
            }
            response.push(byte[0]);
        }
        while response.last() == Some(&b'\r') {
            response.pop();
        }
        let response = String::from_utf8(response).map_err(|error| {
            Error::InvalidResponse(String::from_utf8_lossy(error.as_bytes()).into_owned())
        })?;
        log::trace!("<- {:?}", response);
        Ok(response)
    }
}
