use anyhow::anyhow;
use serde::{Deserialize, Serialize};

use super::{ConfigHandle, Device};
use crate::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClockPhase {
    FirstEdge = 0,
    SecondEdge = 1,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClockPolarity {
    IdleLow = 0,
    IdleHigh = 1,
}

impl ClockPhase {
    pub(crate) fn from_raw(raw: i32) -> crate::Result<Self> {
        match raw {
            0 => Ok(ClockPhase::FirstEdge),
            1 => Ok(ClockPhase::SecondEdge),
            x => Err(Error::internal(anyhow!("Unknown SPI clock phase {}", x))),
        }
    }
}

impl ClockPolarity {
    pub(crate) fn from_raw(raw: i32) -> crate::Result<Self> {
        match raw {
            0 => Ok(ClockPolarity::IdleLow),
            1 => Ok(ClockPolarity::IdleHigh),
            x => Err(Error::internal(anyhow!("Unknown SPI clock polarity {}", x))),
        }
    }
}

/// An SPI configuration handle bound to a device.
pub struct SpiConfig<'d> {
    device: &'d Device,
    handle: ConfigHandle,
    open: bool,
}

impl<'d> SpiConfig<'d> {
    pub(super) fn open(device: &'d Device) -> crate::Result<Self> {
        device.claim_config("SPI")?;
        let mut handle = ConfigHandle::default();
        let status = device.driver().spi_configuration_open(&mut handle);
        if let Err(err) = device.check(status, || "ni845xSpiConfigurationOpen".to_string()) {
            device.release_config();
            return Err(err);
        }
        Ok(SpiConfig {
            device,
            handle,
            open: true,
        })
    }

    pub fn handle(&self) -> ConfigHandle {
        self.handle
    }

    pub fn set_chip_select(&self, chip_select: u32) -> crate::Result<()> {
        let status = self
            .device
            .driver()
            .spi_configuration_set_chip_select(self.handle, chip_select);
        self.device
            .check(status, || format!("ni845xSpiConfigurationSetChipSelect({})", chip_select))
    }

    pub fn chip_select(&self) -> crate::Result<u32> {
        let mut ret = 0;
        let status = self
            .device
            .driver()
            .spi_configuration_get_chip_select(self.handle, &mut ret);
        self.device
            .check(status, || "ni845xSpiConfigurationGetChipSelect".to_string())
            .map(|_| ret)
    }

    pub fn set_clock_phase(&self, phase: ClockPhase) -> crate::Result<()> {
        let status = self
            .device
            .driver()
            .spi_configuration_set_clock_phase(self.handle, phase as i32);
        self.device
            .check(status, || format!("ni845xSpiConfigurationSetClockPhase({})", phase as i32))
    }

    pub fn clock_phase(&self) -> crate::Result<ClockPhase> {
        let mut ret = 0;
        let status = self
            .device
            .driver()
            .spi_configuration_get_clock_phase(self.handle, &mut ret);
        self.device
            .check(status, || "ni845xSpiConfigurationGetClockPhase".to_string())?;
        ClockPhase::from_raw(ret)
    }

    pub fn set_clock_polarity(&self, polarity: ClockPolarity) -> crate::Result<()> {
        let status = self
            .device
            .driver()
            .spi_configuration_set_clock_polarity(self.handle, polarity as i32);
        self.device.check(status, || {
            format!("ni845xSpiConfigurationSetClockPolarity({})", polarity as i32)
        })
    }

    pub fn clock_polarity(&self) -> crate::Result<ClockPolarity> {
        let mut ret = 0;
        let status = self
            .device
            .driver()
            .spi_configuration_get_clock_polarity(self.handle, &mut ret);
        self.device
            .check(status, || "ni845xSpiConfigurationGetClockPolarity".to_string())?;
        ClockPolarity::from_raw(ret)
    }

    /// Clock rate in kHz.
    pub fn set_clock_rate(&self, khz: u16) -> crate::Result<()> {
        let status = self.device.driver().spi_configuration_set_clock_rate(self.handle, khz);
        self.device
            .check(status, || format!("ni845xSpiConfigurationSetClockRate({})", khz))
    }

    pub fn clock_rate(&self) -> crate::Result<u16> {
        let mut ret = 0;
        let status = self.device.driver().spi_configuration_get_clock_rate(self.handle, &mut ret);
        self.device
            .check(status, || "ni845xSpiConfigurationGetClockRate".to_string())
            .map(|_| ret)
    }

    pub fn set_bits_per_sample(&self, bits: u16) -> crate::Result<()> {
        if !(4..=16).contains(&bits) {
            return Err(Error::argument(anyhow!("{} bits per sample is out of 4..=16", bits)));
        }
        let status = self
            .device
            .driver()
            .spi_configuration_set_num_bits_per_sample(self.handle, bits);
        self.device
            .check(status, || format!("ni845xSpiConfigurationSetNumBitsPerSample({})", bits))
    }

    pub fn bits_per_sample(&self) -> crate::Result<u16> {
        let mut ret = 0;
        let status = self
            .device
            .driver()
            .spi_configuration_get_num_bits_per_sample(self.handle, &mut ret);
        self.device
            .check(status, || "ni845xSpiConfigurationGetNumBitsPerSample".to_string())
            .map(|_| ret)
    }

    pub fn set_port(&self, port: u8) -> crate::Result<()> {
        let status = self.device.driver().spi_configuration_set_port(self.handle, port);
        self.device
            .check(status, || format!("ni845xSpiConfigurationSetPort({})", port))
    }

    pub fn port(&self) -> crate::Result<u8> {
        let mut ret = 0;
        let status = self.device.driver().spi_configuration_get_port(self.handle, &mut ret);
        self.device
            .check(status, || "ni845xSpiConfigurationGetPort".to_string())
            .map(|_| ret)
    }

    /// Full duplex transfer of `data`, returning at most `read_count` received bytes.
    pub fn write_read(&self, data: &[u8], read_count: usize) -> crate::Result<Vec<u8>> {
        if data.is_empty() {
            return Err(Error::argument(anyhow!("SPI write must not be empty")));
        }
        if read_count > data.len() {
            return Err(Error::argument(anyhow!(
                "Cannot read {} bytes while clocking out {}",
                read_count,
                data.len()
            )));
        }
        let mut ret = vec![0_u8; data.len()];
        let mut read = 0_u32;
        let status = self.device.driver().spi_write_read(
            self.device.handle(),
            self.handle,
            data,
            &mut ret,
            &mut read,
        );
        self.device
            .check(status, || format!("ni845xSpiWriteRead({} bytes)", data.len()))?;
        ret.truncate((read as usize).min(read_count));
        Ok(ret)
    }

    fn release(&mut self) -> crate::Result<()> {
        self.open = false;
        self.device.release_config();
        let status = self.device.driver().spi_configuration_close(self.handle);
        self.device
            .check(status, || "ni845xSpiConfigurationClose".to_string())
    }

    pub fn close(mut self) -> crate::Result<()> {
        self.release()
    }
}

impl<'d> Drop for SpiConfig<'d> {
    fn drop(&mut self) {
        if self.open {
            let _ = self.release();
        }
    }
}

impl Device {
    pub fn spi_configuration(&self) -> crate::Result<SpiConfig<'_>> {
        SpiConfig::open(self)
    }
}

#[cfg(test)]
mod tests {
    use super::super::mock::MockDriver;
    use super::*;

    #[test]
    fn configure_and_transfer() {
        let mock = MockDriver::new(&["dev0"]);
        let device = Device::open(mock.clone(), "dev0").unwrap();
        let config = device.spi_configuration().unwrap();
        config.set_chip_select(1).unwrap();
        config.set_clock_phase(ClockPhase::SecondEdge).unwrap();
        config.set_clock_polarity(ClockPolarity::IdleHigh).unwrap();
        config.set_clock_rate(1000).unwrap();
        config.set_bits_per_sample(8).unwrap();
        config.set_port(0).unwrap();
        assert_eq!(config.chip_select().unwrap(), 1);
        assert_eq!(config.clock_phase().unwrap(), ClockPhase::SecondEdge);
        assert_eq!(config.clock_polarity().unwrap(), ClockPolarity::IdleHigh);
        assert_eq!(config.clock_rate().unwrap(), 1000);
        assert_eq!(config.bits_per_sample().unwrap(), 8);
        assert_eq!(config.port().unwrap(), 0);
        assert_eq!(config.write_read(&[0x0F, 0xF0], 2).unwrap(), vec![0xF0, 0x0F]);
        assert_eq!(config.write_read(&[0x01, 0x02, 0x03], 1).unwrap(), vec![0xFE]);
    }

    #[test]
    fn invalid_arguments_do_not_reach_driver() {
        let mock = MockDriver::new(&["dev0"]);
        let device = Device::open(mock.clone(), "dev0").unwrap();
        let config = device.spi_configuration().unwrap();
        let before = mock.calls().len();
        assert!(matches!(config.set_bits_per_sample(17), Err(Error::Argument(_))));
        assert!(matches!(config.write_read(&[], 0), Err(Error::Argument(_))));
        assert!(matches!(config.write_read(&[1], 2), Err(Error::Argument(_))));
        assert_eq!(mock.calls().len(), before);
    }

    #[test]
    fn close_uses_spi_entry_point() {
        let mock = MockDriver::new(&["dev0"]);
        let device = Device::open(mock.clone(), "dev0").unwrap();
        let config = device.spi_configuration().unwrap();
        assert!(matches!(device.i2c_configuration(), Err(Error::AlreadyOpen { .. })));
        config.close().unwrap();
        assert!(mock.calls().contains(&"ni845xSpiConfigurationClose".to_string()));
        assert_eq!(mock.open_configs(), 0);
    }

    #[test]
    fn close_failure_still_frees_slot() {
        let mock = MockDriver::new(&["dev0"]);
        let device = Device::open(mock.clone(), "dev0").unwrap();
        let config = device.spi_configuration().unwrap();
        mock.fail("ni845xSpiConfigurationClose", -301_703);
        assert!(config.close().is_err());
        assert!(device.spi_configuration().is_ok());
    }
}
