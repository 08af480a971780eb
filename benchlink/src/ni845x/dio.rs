use anyhow::anyhow;
use serde::{Deserialize, Serialize};

use super::Device;
use crate::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DriverType {
    OpenDrain = 0,
    PushPull = 1,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Level {
    Low = 0,
    High = 1,
}

impl From<Level> for i32 {
    fn from(level: Level) -> Self {
        level as i32
    }
}

impl From<bool> for Level {
    fn from(high: bool) -> Self {
        if high {
            Level::High
        } else {
            Level::Low
        }
    }
}

fn check_line(line: u8) -> crate::Result<()> {
    if line > 7 {
        return Err(Error::argument(anyhow!("DIO line {} is out of 0..=7", line)));
    }
    Ok(())
}

impl Device {
    /// Set line directions of `port`. A set bit makes the line an output.
    pub fn dio_set_direction(&self, port: u8, map: u8) -> crate::Result<()> {
        let status = self
            .driver()
            .dio_set_port_line_direction_map(self.handle(), port, map);
        self.check(status, || {
            format!("ni845xDioSetPortLineDirectionMap({}, {:#04X})", port, map)
        })
    }

    pub fn dio_set_driver_type(&self, port: u8, driver_type: DriverType) -> crate::Result<()> {
        let status = self
            .driver()
            .dio_set_driver_type(self.handle(), port, driver_type as u8);
        self.check(status, || {
            format!("ni845xDioSetDriverType({}, {:?})", port, driver_type)
        })
    }

    pub fn dio_write_line(&self, port: u8, line: u8, level: Level) -> crate::Result<()> {
        check_line(line)?;
        let status = self
            .driver()
            .dio_write_line(self.handle(), port, line, level.into());
        self.check(status, || {
            format!("ni845xDioWriteLine({}, {}, {:?})", port, line, level)
        })
    }

    pub fn dio_write_port(&self, port: u8, value: u8) -> crate::Result<()> {
        let status = self.driver().dio_write_port(self.handle(), port, value);
        self.check(status, || format!("ni845xDioWritePort({}, {:#04X})", port, value))
    }

    pub fn dio_read_line(&self, port: u8, line: u8) -> crate::Result<Level> {
        check_line(line)?;
        let mut ret = 0;
        let status = self.driver().dio_read_line(self.handle(), port, line, &mut ret);
        self.check(status, || format!("ni845xDioReadLine({}, {})", port, line))?;
        Ok(Level::from(ret != 0))
    }

    pub fn dio_read_port(&self, port: u8) -> crate::Result<u8> {
        let mut ret = 0;
        let status = self.driver().dio_read_port(self.handle(), port, &mut ret);
        self.check(status, || format!("ni845xDioReadPort({})", port))?;
        Ok(ret)
    }
}
