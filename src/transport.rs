/*
Copyright (c) 2020 Todd Stellanova
LICENSE: BSD3 (see LICENSE file)
*/

//! Register bus access

/// Default 7-bit address of the two-wire configuration interface
pub const DEFAULT_I2C_ADDRESS: u8 = 0x1A;

/// Byte-level access to 16-bit addressed sensor registers
pub trait RegisterTransport {
    type Error;

    /// Write 1 to 3 payload bytes starting at `address`
    fn write(&mut self, address: u16, data: &[u8]) -> Result<(), Self::Error>;

    /// Read up to 4 bytes starting at `address`, first byte most significant
    fn read(&mut self, address: u16, len: usize) -> Result<u32, Self::Error>;
}

/// Register transport over a blocking embedded-hal i2c bus
pub struct I2cTransport<I2C> {
    base_address: u8,
    i2c: I2C,
}

impl<I2C> I2cTransport<I2C> {
    /// Create a new instance with an i2c address:
    /// May use DEFAULT_I2C_ADDRESS if in doubt.
    pub fn new(i2c: I2C, address: u8) -> Self {
        Self {
            base_address: address,
            i2c,
        }
    }

    pub fn default(i2c: I2C) -> Self {
        Self::new(i2c, DEFAULT_I2C_ADDRESS)
    }

    pub fn release(self) -> I2C {
        self.i2c
    }
}

impl<I2C, CommE> RegisterTransport for I2cTransport<I2C>
where
    I2C: embedded_hal::blocking::i2c::Write<Error = CommE>
        + embedded_hal::blocking::i2c::WriteRead<Error = CommE>,
{
    type Error = CommE;

    fn write(&mut self, address: u16, data: &[u8]) -> Result<(), CommE> {
        // address high byte first, then payload as given
        let len = data.len().min(3);
        let mut write_buf = [0u8; 5];
        write_buf[..2].copy_from_slice(&address.to_be_bytes());
        write_buf[2..2 + len].copy_from_slice(&data[..len]);
        self.i2c.write(self.base_address, &write_buf[..2 + len])
    }

    fn read(&mut self, address: u16, len: usize) -> Result<u32, CommE> {
        let len = len.min(4);
        let cmd_buf = address.to_be_bytes();
        let mut recv_buf = [0u8; 4];
        self.i2c
            .write_read(self.base_address, &cmd_buf, &mut recv_buf[4 - len..])?;
        Ok(u32::from_be_bytes(recv_buf))
    }
}
