use anyhow::anyhow;
use serde::{Deserialize, Serialize};

use super::{ConfigHandle, Device};
use crate::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AddressSize {
    SevenBit = 0,
    TenBit = 1,
}

/// An I2C configuration handle bound to a device.
pub struct I2cConfig<'d> {
    device: &'d Device,
    handle: ConfigHandle,
    open: bool,
}

fn check_len(what: &str, len: usize) -> crate::Result<()> {
    if len == 0 {
        return Err(Error::argument(anyhow!("{} must not be empty", what)));
    }
    if len > u32::MAX as usize {
        return Err(Error::argument(anyhow!("{} of {} bytes is too large", what, len)));
    }
    Ok(())
}

impl<'d> I2cConfig<'d> {
    pub(super) fn open(device: &'d Device) -> crate::Result<Self> {
        device.claim_config("I2C")?;
        let mut handle = ConfigHandle::default();
        let status = device.driver().i2c_configuration_open(&mut handle);
        if let Err(err) = device.check(status, || "ni845xI2cConfigurationOpen".to_string()) {
            device.release_config();
            return Err(err);
        }
        Ok(I2cConfig {
            device,
            handle,
            open: true,
        })
    }

    pub fn handle(&self) -> ConfigHandle {
        self.handle
    }

    pub fn set_address(&self, address: u16) -> crate::Result<()> {
        let status = self.device.driver().i2c_configuration_set_address(self.handle, address);
        self.device
            .check(status, || format!("ni845xI2cConfigurationSetAddress({:#04X})", address))
    }

    pub fn address(&self) -> crate::Result<u16> {
        let mut ret = 0;
        let status = self.device.driver().i2c_configuration_get_address(self.handle, &mut ret);
        self.device
            .check(status, || "ni845xI2cConfigurationGetAddress".to_string())
            .map(|_| ret)
    }

    pub fn set_address_size(&self, size: AddressSize) -> crate::Result<()> {
        let status = self
            .device
            .driver()
            .i2c_configuration_set_address_size(self.handle, size as i32);
        self.device
            .check(status, || format!("ni845xI2cConfigurationSetAddressSize({})", size as i32))
    }

    pub fn address_size(&self) -> crate::Result<AddressSize> {
        let mut ret = 0;
        let status = self
            .device
            .driver()
            .i2c_configuration_get_address_size(self.handle, &mut ret);
        self.device
            .check(status, || "ni845xI2cConfigurationGetAddressSize".to_string())?;
        match ret {
            0 => Ok(AddressSize::SevenBit),
            1 => Ok(AddressSize::TenBit),
            x => Err(Error::internal(anyhow!("Unknown I2C address size {}", x))),
        }
    }

    /// Clock rate in kHz.
    pub fn set_clock_rate(&self, khz: u16) -> crate::Result<()> {
        let status = self.device.driver().i2c_configuration_set_clock_rate(self.handle, khz);
        self.device
            .check(status, || format!("ni845xI2cConfigurationSetClockRate({})", khz))
    }

    pub fn clock_rate(&self) -> crate::Result<u16> {
        let mut ret = 0;
        let status = self.device.driver().i2c_configuration_get_clock_rate(self.handle, &mut ret);
        self.device
            .check(status, || "ni845xI2cConfigurationGetClockRate".to_string())
            .map(|_| ret)
    }

    /// High speed clock rate in kHz.
    pub fn set_hs_clock_rate(&self, khz: u16) -> crate::Result<()> {
        let status = self
            .device
            .driver()
            .i2c_configuration_set_hs_clock_rate(self.handle, khz);
        self.device
            .check(status, || format!("ni845xI2cConfigurationSetHSClockRate({})", khz))
    }

    pub fn hs_clock_rate(&self) -> crate::Result<u16> {
        let mut ret = 0;
        let status = self
            .device
            .driver()
            .i2c_configuration_get_hs_clock_rate(self.handle, &mut ret);
        self.device
            .check(status, || "ni845xI2cConfigurationGetHSClockRate".to_string())
            .map(|_| ret)
    }

    pub fn set_hs_enable(&self, enable: bool) -> crate::Result<()> {
        let status = self
            .device
            .driver()
            .i2c_configuration_set_hs_enable(self.handle, enable as u8);
        self.device
            .check(status, || format!("ni845xI2cConfigurationSetHSEnable({})", enable as u8))
    }

    pub fn hs_enable(&self) -> crate::Result<bool> {
        let mut ret = 0;
        let status = self.device.driver().i2c_configuration_get_hs_enable(self.handle, &mut ret);
        self.device
            .check(status, || "ni845xI2cConfigurationGetHSEnable".to_string())
            .map(|_| ret != 0)
    }

    /// Master code sent before a high speed transfer, 0 to 7.
    pub fn set_hs_master_code(&self, code: u8) -> crate::Result<()> {
        if code > 7 {
            return Err(Error::argument(anyhow!("HS master code {} is out of 0..=7", code)));
        }
        let status = self
            .device
            .driver()
            .i2c_configuration_set_hs_master_code(self.handle, code);
        self.device
            .check(status, || format!("ni845xI2cConfigurationSetHSMasterCode({})", code))
    }

    pub fn hs_master_code(&self) -> crate::Result<u8> {
        let mut ret = 0;
        let status = self
            .device
            .driver()
            .i2c_configuration_get_hs_master_code(self.handle, &mut ret);
        self.device
            .check(status, || "ni845xI2cConfigurationGetHSMasterCode".to_string())
            .map(|_| ret)
    }

    pub fn set_port(&self, port: u8) -> crate::Result<()> {
        let status = self.device.driver().i2c_configuration_set_port(self.handle, port);
        self.device
            .check(status, || format!("ni845xI2cConfigurationSetPort({})", port))
    }

    pub fn port(&self) -> crate::Result<u8> {
        let mut ret = 0;
        let status = self.device.driver().i2c_configuration_get_port(self.handle, &mut ret);
        self.device
            .check(status, || "ni845xI2cConfigurationGetPort".to_string())
            .map(|_| ret)
    }

    /// ACK polling timeout in ms, 0 disables polling.
    pub fn set_ack_poll_timeout(&self, timeout_ms: u16) -> crate::Result<()> {
        let status = self
            .device
            .driver()
            .i2c_configuration_set_ack_poll_timeout(self.handle, timeout_ms);
        self.device
            .check(status, || format!("ni845xI2cConfigurationSetAckPollTimeout({})", timeout_ms))
    }

    pub fn ack_poll_timeout(&self) -> crate::Result<u16> {
        let mut ret = 0;
        let status = self
            .device
            .driver()
            .i2c_configuration_get_ack_poll_timeout(self.handle, &mut ret);
        self.device
            .check(status, || "ni845xI2cConfigurationGetAckPollTimeout".to_string())
            .map(|_| ret)
    }

    pub fn write(&self, address: u16, data: &[u8]) -> crate::Result<()> {
        check_len("I2C write", data.len())?;
        self.set_address(address)?;
        let status = self.device.driver().i2c_write(self.device.handle(), self.handle, data);
        self.device.check(status, || {
            format!("ni845xI2cWrite({:#04X}, {} bytes)", address, data.len())
        })
    }

    pub fn read(&self, address: u16, count: usize) -> crate::Result<Vec<u8>> {
        check_len("I2C read", count)?;
        self.set_address(address)?;
        let mut data = vec![0_u8; count];
        let mut read = 0_u32;
        let status = self
            .device
            .driver()
            .i2c_read(self.device.handle(), self.handle, &mut data, &mut read);
        self.device
            .check(status, || format!("ni845xI2cRead({:#04X}, {} bytes)", address, count))?;
        data.truncate(read as usize);
        Ok(data)
    }

    /// Write `data` and read `count` bytes with a repeated start in between.
    pub fn write_read(&self, address: u16, data: &[u8], count: usize) -> crate::Result<Vec<u8>> {
        check_len("I2C write", data.len())?;
        check_len("I2C read", count)?;
        self.set_address(address)?;
        let mut ret = vec![0_u8; count];
        let mut read = 0_u32;
        let status = self.device.driver().i2c_write_read(
            self.device.handle(),
            self.handle,
            data,
            &mut ret,
            &mut read,
        );
        self.device.check(status, || {
            format!(
                "ni845xI2cWriteRead({:#04X}, {} bytes, {} bytes)",
                address,
                data.len(),
                count
            )
        })?;
        ret.truncate(read as usize);
        Ok(ret)
    }

    fn release(&mut self) -> crate::Result<()> {
        self.open = false;
        self.device.release_config();
        let status = self.device.driver().i2c_configuration_close(self.handle);
        self.device
            .check(status, || "ni845xI2cConfigurationClose".to_string())
    }

    pub fn close(mut self) -> crate::Result<()> {
        self.release()
    }
}

impl<'d> Drop for I2cConfig<'d> {
    fn drop(&mut self) {
        if self.open {
            let _ = self.release();
        }
    }
}

impl Device {
    pub fn i2c_configuration(&self) -> crate::Result<I2cConfig<'_>> {
        I2cConfig::open(self)
    }
}
