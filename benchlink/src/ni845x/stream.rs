use anyhow::anyhow;
use serde::{Deserialize, Serialize};

use super::{ClockPhase, ClockPolarity, ConfigHandle, Device};
use crate::Error;

/// Wave 1 timing parameters, in units of the adapter's timing base.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimingParameter {
    SclkLow = 0,
    SclkHigh = 1,
    T1 = 2,
    T2 = 3,
    T3 = 4,
    T4 = 5,
    T5 = 6,
    T6 = 7,
    T7 = 8,
    T8 = 9,
    T9 = 10,
    T10 = 11,
    T11 = 12,
    T12 = 13,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum StreamPin {
    Conv = 0,
    Drdy = 1,
    Cs = 2,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PinMode {
    Disabled = 0,
    ActiveHigh = 1,
    ActiveLow = 2,
    DriveHigh = 3,
    DriveLow = 4,
}

/// Transfer granularity of the stream engine. Packet sizes should be a multiple of this.
pub const PACKET_GRANULARITY: u32 = 512;

/// An SPI stream configuration handle bound to a device.
pub struct SpiStreamConfig<'d> {
    device: &'d Device,
    handle: ConfigHandle,
    open: bool,
}

impl<'d> SpiStreamConfig<'d> {
    pub(super) fn open(device: &'d Device) -> crate::Result<Self> {
        device.claim_config("SPI stream")?;
        let mut handle = ConfigHandle::default();
        let status = device.driver().spi_stream_configuration_open(&mut handle);
        if let Err(err) = device.check(status, || "ni845xSpiStreamConfigurationOpen".to_string()) {
            device.release_config();
            return Err(err);
        }
        Ok(SpiStreamConfig {
            device,
            handle,
            open: true,
        })
    }

    pub fn handle(&self) -> ConfigHandle {
        self.handle
    }

    pub fn set_num_bits(&self, bits: u8) -> crate::Result<()> {
        let status = self
            .device
            .driver()
            .spi_stream_configuration_set_num_bits(self.handle, bits);
        self.device
            .check(status, || format!("ni845xSpiStreamConfigurationSetNumBits({})", bits))
    }

    /// Samples per stream, 0 streams until stopped.
    pub fn set_num_samples(&self, samples: u32) -> crate::Result<()> {
        let status = self
            .device
            .driver()
            .spi_stream_configuration_set_num_samples(self.handle, samples);
        self.device.check(status, || {
            format!("ni845xSpiStreamConfigurationSetNumSamples({})", samples)
        })
    }

    pub fn set_clock_phase(&self, phase: ClockPhase) -> crate::Result<()> {
        let status = self
            .device
            .driver()
            .spi_stream_configuration_set_clock_phase(self.handle, phase as u8);
        self.device.check(status, || {
            format!("ni845xSpiStreamConfigurationSetClockPhase({})", phase as u8)
        })
    }

    pub fn set_clock_polarity(&self, polarity: ClockPolarity) -> crate::Result<()> {
        let status = self
            .device
            .driver()
            .spi_stream_configuration_set_clock_polarity(self.handle, polarity as u8);
        self.device.check(status, || {
            format!("ni845xSpiStreamConfigurationSetClockPolarity({})", polarity as u8)
        })
    }

    pub fn set_timing(&self, param: TimingParameter, value: u32) -> crate::Result<()> {
        let status = self.device.driver().spi_stream_configuration_wave1_set_timing_param(
            self.handle,
            param as u8,
            value,
        );
        self.device.check(status, || {
            format!("ni845xSpiStreamConfigurationWave1SetTimingParam({:?}, {})", param, value)
        })
    }

    pub fn set_mosi_data(&self, data: &[u8]) -> crate::Result<()> {
        let status = self
            .device
            .driver()
            .spi_stream_configuration_wave1_set_mosi_data(self.handle, data);
        self.device.check(status, || {
            format!("ni845xSpiStreamConfigurationWave1SetMosiData({} bytes)", data.len())
        })
    }

    pub fn set_pin(&self, pin: StreamPin, mode: PinMode) -> crate::Result<()> {
        let status = self.device.driver().spi_stream_configuration_wave1_set_pin_config(
            self.handle,
            pin as u8,
            mode as u8,
        );
        self.device.check(status, || {
            format!("ni845xSpiStreamConfigurationWave1SetPinConfig({:?}, {:?})", pin, mode)
        })
    }

    pub fn set_packet_size(&self, size: u32) -> crate::Result<()> {
        if size == 0 {
            return Err(Error::argument(anyhow!("Packet size must not be zero")));
        }
        if size % PACKET_GRANULARITY != 0 {
            log::debug!(
                "Packet size {} is not a multiple of {}, transfers will be less efficient",
                size,
                PACKET_GRANULARITY
            );
        }
        let status = self
            .device
            .driver()
            .spi_stream_configuration_set_packet_size(self.handle, size);
        self.device.check(status, || {
            format!("ni845xSpiStreamConfigurationSetPacketSize({})", size)
        })
    }

    /// Start capturing. The stream is stopped when the returned guard is dropped.
    pub fn start(&mut self) -> crate::Result<SpiStream<'_, 'd>> {
        let status = self
            .device
            .driver()
            .spi_stream_start(self.device.handle(), self.handle);
        self.device.check(status, || "ni845xSpiStreamStart".to_string())?;
        Ok(SpiStream {
            config: self,
            running: true,
        })
    }

    fn release(&mut self) -> crate::Result<()> {
        self.open = false;
        self.device.release_config();
        let status = self.device.driver().spi_stream_configuration_close(self.handle);
        self.device
            .check(status, || "ni845xSpiStreamConfigurationClose".to_string())
    }

    pub fn close(mut self) -> crate::Result<()> {
        self.release()
    }
}

impl<'d> Drop for SpiStreamConfig<'d> {
    fn drop(&mut self) {
        if self.open {
            let _ = self.release();
        }
    }
}

/// A running SPI stream.
pub struct SpiStream<'c, 'd> {
    config: &'c mut SpiStreamConfig<'d>,
    running: bool,
}

impl<'c, 'd> SpiStream<'c, 'd> {
    /// Read up to `count` bytes captured so far.
    pub fn read(&mut self, count: usize) -> crate::Result<Vec<u8>> {
        if count == 0 {
            return Err(Error::argument(anyhow!("SPI stream read must not be empty")));
        }
        let device = self.config.device;
        let mut ret = vec![0_u8; count];
        let mut read = 0_u32;
        let status = device
            .driver()
            .spi_stream_read(device.handle(), self.config.handle, &mut ret, &mut read);
        device.check(status, || format!("ni845xSpiStreamRead({} bytes)", count))?;
        ret.truncate(read as usize);
        Ok(ret)
    }

    fn halt(&mut self) -> crate::Result<()> {
        self.running = false;
        let device = self.config.device;
        let status = device.driver().spi_stream_stop(device.handle(), self.config.handle);
        device.check(status, || "ni845xSpiStreamStop".to_string())
    }

    pub fn stop(mut self) -> crate::Result<()> {
        self.halt()
    }
}

impl<'c, 'd> Drop for SpiStream<'c, 'd> {
    fn drop(&mut self) {
        if self.running {
            let _ = self.halt();
        }
    }
}

impl Device {
    pub fn spi_stream_configuration(&self) -> crate::Result<SpiStreamConfig<'_>> {
        SpiStreamConfig::open(self)
    }
}
