use anyhow::anyhow;
use serde::{Deserialize, Serialize};

use super::{ClockPhase, ClockPolarity, Device, ScriptHandle};
use crate::Error;

/// One primitive of an SPI script, executed in order on the adapter.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScriptStep {
    ClockRate(u16),
    ClockPolarityPhase {
        polarity: ClockPolarity,
        phase: ClockPhase,
    },
    NumBitsPerSample(u16),
    CsLow(u32),
    CsHigh(u32),
    UsDelay(u16),
    EnableSpi,
    DisableSpi,
    WriteRead(Vec<u8>),
}

/// Identifies the data clocked in by a `WriteRead` step.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReadIndex(usize);

/// An ordered sequence of script steps, built before it is run.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SpiScript {
    steps: Vec<ScriptStep>,
    reads: usize,
}

impl SpiScript {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn steps(&self) -> &[ScriptStep] {
        &self.steps
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    fn push(&mut self, step: ScriptStep) -> &mut Self {
        self.steps.push(step);
        self
    }

    pub fn clock_rate(&mut self, khz: u16) -> &mut Self {
        self.push(ScriptStep::ClockRate(khz))
    }

    pub fn clock_polarity_phase(&mut self, polarity: ClockPolarity, phase: ClockPhase) -> &mut Self {
        self.push(ScriptStep::ClockPolarityPhase { polarity, phase })
    }

    pub fn num_bits_per_sample(&mut self, bits: u16) -> &mut Self {
        self.push(ScriptStep::NumBitsPerSample(bits))
    }

    pub fn cs_low(&mut self, chip_select: u32) -> &mut Self {
        self.push(ScriptStep::CsLow(chip_select))
    }

    pub fn cs_high(&mut self, chip_select: u32) -> &mut Self {
        self.push(ScriptStep::CsHigh(chip_select))
    }

    pub fn us_delay(&mut self, delay_us: u16) -> &mut Self {
        self.push(ScriptStep::UsDelay(delay_us))
    }

    pub fn enable_spi(&mut self) -> &mut Self {
        self.push(ScriptStep::EnableSpi)
    }

    pub fn disable_spi(&mut self) -> &mut Self {
        self.push(ScriptStep::DisableSpi)
    }

    /// Append a transfer. Keep the returned index to fetch the received bytes after the run.
    pub fn write_read(&mut self, data: &[u8]) -> ReadIndex {
        self.steps.push(ScriptStep::WriteRead(data.to_vec()));
        self.reads += 1;
        ReadIndex(self.reads - 1)
    }
}

/// A script that has been executed. Holds the script handle until dropped.
pub struct ScriptRun<'d> {
    device: &'d Device,
    handle: ScriptHandle,
    read_indices: Vec<u32>,
    open: bool,
}

impl<'d> ScriptRun<'d> {
    fn append(&mut self, step: &ScriptStep) -> crate::Result<()> {
        let driver = self.device.driver();
        let handle = self.handle;
        match step {
            ScriptStep::ClockRate(khz) => {
                let status = driver.spi_script_clock_rate(handle, *khz);
                self.device
                    .check(status, || format!("ni845xSpiScriptClockRate({})", khz))
            }
            ScriptStep::ClockPolarityPhase { polarity, phase } => {
                let status =
                    driver.spi_script_clock_polarity_phase(handle, *polarity as i32, *phase as i32);
                self.device.check(status, || {
                    format!(
                        "ni845xSpiScriptClockPolarityPhase({}, {})",
                        *polarity as i32, *phase as i32
                    )
                })
            }
            ScriptStep::NumBitsPerSample(bits) => {
                let status = driver.spi_script_num_bits_per_sample(handle, *bits);
                self.device
                    .check(status, || format!("ni845xSpiScriptNumBitsPerSample({})", bits))
            }
            ScriptStep::CsLow(cs) => {
                let status = driver.spi_script_cs_low(handle, *cs);
                self.device.check(status, || format!("ni845xSpiScriptCSLow({})", cs))
            }
            ScriptStep::CsHigh(cs) => {
                let status = driver.spi_script_cs_high(handle, *cs);
                self.device.check(status, || format!("ni845xSpiScriptCSHigh({})", cs))
            }
            ScriptStep::UsDelay(delay) => {
                let status = driver.spi_script_us_delay(handle, *delay);
                self.device
                    .check(status, || format!("ni845xSpiScriptUsDelay({})", delay))
            }
            ScriptStep::EnableSpi => {
                let status = driver.spi_script_enable_spi(handle);
                self.device.check(status, || "ni845xSpiScriptEnableSPI".to_string())
            }
            ScriptStep::DisableSpi => {
                let status = driver.spi_script_disable_spi(handle);
                self.device.check(status, || "ni845xSpiScriptDisableSPI".to_string())
            }
            ScriptStep::WriteRead(data) => {
                let mut index = 0;
                let status = driver.spi_script_write_read(handle, data, &mut index);
                self.device
                    .check(status, || format!("ni845xSpiScriptWriteRead({} bytes)", data.len()))?;
                self.read_indices.push(index);
                Ok(())
            }
        }
    }

    pub fn handle(&self) -> ScriptHandle {
        self.handle
    }

    /// Bytes received by the `WriteRead` step that returned `index`.
    pub fn extract_read_data(&self, index: ReadIndex) -> crate::Result<Vec<u8>> {
        let raw = *self.read_indices.get(index.0).ok_or_else(|| {
            Error::argument(anyhow!(
                "Read index {} is not part of this script ({} reads)",
                index.0,
                self.read_indices.len()
            ))
        })?;
        let driver = self.device.driver();
        let mut size = 0_u32;
        let status = driver.spi_script_extract_read_data_size(self.handle, raw, &mut size);
        self.device
            .check(status, || format!("ni845xSpiScriptExtractReadDataSize({})", raw))?;
        let mut ret = vec![0_u8; size as usize];
        let status = driver.spi_script_extract_read_data(self.handle, raw, &mut ret);
        self.device
            .check(status, || format!("ni845xSpiScriptExtractReadData({})", raw))?;
        Ok(ret)
    }

    fn release(&mut self) -> crate::Result<()> {
        self.open = false;
        self.device.release_script();
        let status = self.device.driver().spi_script_close(self.handle);
        self.device.check(status, || "ni845xSpiScriptClose".to_string())
    }

    pub fn close(mut self) -> crate::Result<()> {
        self.release()
    }
}

impl<'d> Drop for ScriptRun<'d> {
    fn drop(&mut self) {
        if self.open {
            let _ = self.release();
        }
    }
}

impl Device {
    /// Load `script` into a fresh script handle and execute it on `port`.
    pub fn run_script(&self, script: &SpiScript, port: u8) -> crate::Result<ScriptRun<'_>> {
        if script.is_empty() {
            return Err(Error::argument(anyhow!("SPI script has no steps")));
        }
        self.claim_script()?;
        let mut handle = ScriptHandle::default();
        let status = self.driver().spi_script_open(&mut handle);
        if let Err(err) = self.check(status, || "ni845xSpiScriptOpen".to_string()) {
            self.release_script();
            return Err(err);
        }
        let mut run = ScriptRun {
            device: self,
            handle,
            read_indices: Vec::with_capacity(script.reads),
            open: true,
        };
        for step in script.steps() {
            run.append(step)?;
        }
        let status = self.driver().spi_script_run(handle, self.handle(), port);
        self.check(status, || format!("ni845xSpiScriptRun({}, {})", self.name(), port))?;
        log::debug!("Ran SPI script with {} steps on {}", script.steps().len(), self.name());
        Ok(run)
    }
}

#[cfg(test)]
mod tests {
    use super::super::mock::MockDriver;
    use super::*;

    fn transfer_script() -> (SpiScript, ReadIndex) {
        let mut script = SpiScript::new();
        script
            .enable_spi()
            .clock_rate(1000)
            .clock_polarity_phase(ClockPolarity::IdleLow, ClockPhase::FirstEdge)
            .num_bits_per_sample(8)
            .cs_low(0);
        let index = script.write_read(&[0xAA, 0xAA]);
        script.cs_high(0).us_delay(10).disable_spi();
        (script, index)
    }

    #[test]
    fn write_read_data_is_extracted_by_index() {
        let mock = MockDriver::new(&["dev0"]);
        let device = Device::open(mock.clone(), "dev0").unwrap();
        let (script, index) = transfer_script();
        let run = device.run_script(&script, 0).unwrap();
        assert_eq!(run.extract_read_data(index).unwrap(), vec![0x55, 0x55]);
        let calls = mock.calls();
        let size_at = calls
            .iter()
            .position(|x| x == "ni845xSpiScriptExtractReadDataSize")
            .unwrap();
        assert_eq!(calls[size_at + 1], "ni845xSpiScriptExtractReadData");
    }

    #[test]
    fn indices_follow_write_order() {
        let mock = MockDriver::new(&["dev0"]);
        let device = Device::open(mock.clone(), "dev0").unwrap();
        let mut script = SpiScript::new();
        script.enable_spi();
        let first = script.write_read(&[0x00]);
        let second = script.write_read(&[0x0F, 0xFF, 0x01]);
        let run = device.run_script(&script, 0).unwrap();
        assert_eq!(run.extract_read_data(second).unwrap(), vec![0xF0, 0x00, 0xFE]);
        assert_eq!(run.extract_read_data(first).unwrap(), vec![0xFF]);
        assert!(matches!(
            run.extract_read_data(ReadIndex(2)),
            Err(Error::Argument(_))
        ));
    }

    #[test]
    fn one_script_at_a_time() {
        let mock = MockDriver::new(&["dev0"]);
        let device = Device::open(mock.clone(), "dev0").unwrap();
        let (script, _) = transfer_script();
        let run = device.run_script(&script, 0).unwrap();
        assert!(matches!(device.run_script(&script, 0), Err(Error::AlreadyOpen { .. })));
        drop(run);
        assert_eq!(mock.open_scripts(), 0);
        assert!(device.run_script(&script, 0).is_ok());
    }

    #[test]
    fn failed_step_closes_script() {
        let mock = MockDriver::new(&["dev0"]);
        let device = Device::open(mock.clone(), "dev0").unwrap();
        let (script, _) = transfer_script();
        mock.fail("ni845xSpiScriptCSLow", -301_710);
        match device.run_script(&script, 0) {
            Err(Error::Driver { call, .. }) => assert_eq!(call, "ni845xSpiScriptCSLow(0)"),
            _ => panic!(),
        }
        assert_eq!(mock.open_scripts(), 0);
        assert!(mock.calls().contains(&"ni845xSpiScriptClose".to_string()));
        assert!(!mock.calls().contains(&"ni845xSpiScriptRun".to_string()));
        assert!(device.run_script(&script, 0).is_ok());
    }

    #[test]
    fn empty_script_is_rejected() {
        let mock = MockDriver::new(&["dev0"]);
        let device = Device::open(mock.clone(), "dev0").unwrap();
        assert!(matches!(
            device.run_script(&SpiScript::new(), 0),
            Err(Error::Argument(_))
        ));
        assert_eq!(mock.open_scripts(), 0);
    }
}
