//! [`Driver`] backed by the NI-845x shared library, loaded at runtime.

use std::env;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::sync::Arc;

use anyhow::anyhow;
use dlopen::wrapper::{Container, WrapperApi};

use super::driver::{ConfigHandle, DeviceHandle, Driver, FindHandle, ScriptHandle, Status};
use crate::Error;

cfg_if::cfg_if! {
    if #[cfg(windows)] {
        const DEFAULT_NI845X_LIB: &str = "Ni845x.dll";
    } else {
        const DEFAULT_NI845X_LIB: &str = "libni845x.so";
    }
}

/// Overrides the location of the NI-845x library.
pub const NI845X_LIB_ENV: &str = "BENCHLINK_NI845X_LIB";

const NAME_LEN: usize = 256;
const STATUS_LEN: usize = 1024;
/// Status reported when a resource name cannot be passed to the driver.
const INVALID_RESOURCE: Status = -301_720;

type NiHandle = u64;
type NiFindHandle = u32;

#[allow(non_snake_case)]
#[derive(WrapperApi)]
struct Api {
    ni845xStatusToString: unsafe extern "C" fn(status: i32, max_size: u32, text: *mut c_char),
    ni845xFindDevice: unsafe extern "C" fn(first: *mut c_char, find: *mut NiFindHandle, found: *mut u32) -> i32,
    ni845xFindDeviceNext: unsafe extern "C" fn(find: NiFindHandle, next: *mut c_char) -> i32,
    ni845xCloseFindDeviceHandle: unsafe extern "C" fn(find: NiFindHandle) -> i32,
    ni845xOpen: unsafe extern "C" fn(resource: *const c_char, device: *mut NiHandle) -> i32,
    ni845xClose: unsafe extern "C" fn(device: NiHandle) -> i32,
    ni845xDeviceLock: unsafe extern "C" fn(device: NiHandle) -> i32,
    ni845xDeviceUnlock: unsafe extern "C" fn(device: NiHandle) -> i32,
    ni845xSetIoVoltageLevel: unsafe extern "C" fn(device: NiHandle, level: u8) -> i32,
    ni845xSetTimeout: unsafe extern "C" fn(device: NiHandle, timeout: u32) -> i32,

    ni845xI2cSetPullupEnable: unsafe extern "C" fn(device: NiHandle, enable: u8) -> i32,
    ni845xI2cConfigurationOpen: unsafe extern "C" fn(config: *mut NiHandle) -> i32,
    ni845xI2cConfigurationClose: unsafe extern "C" fn(config: NiHandle) -> i32,
    ni845xI2cConfigurationSetAddress: unsafe extern "C" fn(config: NiHandle, address: u16) -> i32,
    ni845xI2cConfigurationGetAddress: unsafe extern "C" fn(config: NiHandle, address: *mut u16) -> i32,
    ni845xI2cConfigurationSetAddressSize: unsafe extern "C" fn(config: NiHandle, size: i32) -> i32,
    ni845xI2cConfigurationGetAddressSize: unsafe extern "C" fn(config: NiHandle, size: *mut i32) -> i32,
    ni845xI2cConfigurationSetClockRate: unsafe extern "C" fn(config: NiHandle, khz: u16) -> i32,
    ni845xI2cConfigurationGetClockRate: unsafe extern "C" fn(config: NiHandle, khz: *mut u16) -> i32,
    ni845xI2cConfigurationSetHSClockRate: unsafe extern "C" fn(config: NiHandle, khz: u16) -> i32,
    ni845xI2cConfigurationGetHSClockRate: unsafe extern "C" fn(config: NiHandle, khz: *mut u16) -> i32,
    ni845xI2cConfigurationSetHSEnable: unsafe extern "C" fn(config: NiHandle, enable: u8) -> i32,
    ni845xI2cConfigurationGetHSEnable: unsafe extern "C" fn(config: NiHandle, enable: *mut u8) -> i32,
    ni845xI2cConfigurationSetHSMasterCode: unsafe extern "C" fn(config: NiHandle, code: u8) -> i32,
    ni845xI2cConfigurationGetHSMasterCode: unsafe extern "C" fn(config: NiHandle, code: *mut u8) -> i32,
    ni845xI2cConfigurationSetPort: unsafe extern "C" fn(config: NiHandle, port: u8) -> i32,
    ni845xI2cConfigurationGetPort: unsafe extern "C" fn(config: NiHandle, port: *mut u8) -> i32,
    ni845xI2cConfigurationSetAckPollTimeout: unsafe extern "C" fn(config: NiHandle, timeout: u16) -> i32,
    ni845xI2cConfigurationGetAckPollTimeout: unsafe extern "C" fn(config: NiHandle, timeout: *mut u16) -> i32,
    ni845xI2cWrite: unsafe extern "C" fn(device: NiHandle, config: NiHandle, size: u32, data: *const u8) -> i32,
    ni845xI2cRead: unsafe extern "C" fn(
        device: NiHandle,
        config: NiHandle,
        count: u32,
        read: *mut u32,
        data: *mut u8,
    ) -> i32,
    ni845xI2cWriteRead: unsafe extern "C" fn(
        device: NiHandle,
        config: NiHandle,
        write_size: u32,
        write: *const u8,
        count: u32,
        read: *mut u32,
        data: *mut u8,
    ) -> i32,

    ni845xSpiConfigurationOpen: unsafe extern "C" fn(config: *mut NiHandle) -> i32,
    ni845xSpiConfigurationClose: unsafe extern "C" fn(config: NiHandle) -> i32,
    ni845xSpiConfigurationSetChipSelect: unsafe extern "C" fn(config: NiHandle, cs: u32) -> i32,
    ni845xSpiConfigurationGetChipSelect: unsafe extern "C" fn(config: NiHandle, cs: *mut u32) -> i32,
    ni845xSpiConfigurationSetClockPhase: unsafe extern "C" fn(config: NiHandle, phase: i32) -> i32,
    ni845xSpiConfigurationGetClockPhase: unsafe extern "C" fn(config: NiHandle, phase: *mut i32) -> i32,
    ni845xSpiConfigurationSetClockPolarity: unsafe extern "C" fn(config: NiHandle, polarity: i32) -> i32,
    ni845xSpiConfigurationGetClockPolarity: unsafe extern "C" fn(config: NiHandle, polarity: *mut i32) -> i32,
    ni845xSpiConfigurationSetClockRate: unsafe extern "C" fn(config: NiHandle, khz: u16) -> i32,
    ni845xSpiConfigurationGetClockRate: unsafe extern "C" fn(config: NiHandle, khz: *mut u16) -> i32,
    ni845xSpiConfigurationSetNumBitsPerSample: unsafe extern "C" fn(config: NiHandle, bits: u16) -> i32,
    ni845xSpiConfigurationGetNumBitsPerSample: unsafe extern "C" fn(config: NiHandle, bits: *mut u16) -> i32,
    ni845xSpiConfigurationSetPort: unsafe extern "C" fn(config: NiHandle, port: u8) -> i32,
    ni845xSpiConfigurationGetPort: unsafe extern "C" fn(config: NiHandle, port: *mut u8) -> i32,
    ni845xSpiWriteRead: unsafe extern "C" fn(
        device: NiHandle,
        config: NiHandle,
        write_size: u32,
        write: *const u8,
        read: *mut u32,
        data: *mut u8,
    ) -> i32,

    ni845xSpiScriptOpen: unsafe extern "C" fn(script: *mut NiHandle) -> i32,
    ni845xSpiScriptClose: unsafe extern "C" fn(script: NiHandle) -> i32,
    ni845xSpiScriptClockPolarityPhase: unsafe extern "C" fn(script: NiHandle, polarity: i32, phase: i32) -> i32,
    ni845xSpiScriptClockRate: unsafe extern "C" fn(script: NiHandle, khz: u16) -> i32,
    ni845xSpiScriptCSHigh: unsafe extern "C" fn(script: NiHandle, cs: u32) -> i32,
    ni845xSpiScriptCSLow: unsafe extern "C" fn(script: NiHandle, cs: u32) -> i32,
    ni845xSpiScriptNumBitsPerSample: unsafe extern "C" fn(script: NiHandle, bits: u16) -> i32,
    ni845xSpiScriptUsDelay: unsafe extern "C" fn(script: NiHandle, delay: u16) -> i32,
    ni845xSpiScriptEnableSPI: unsafe extern "C" fn(script: NiHandle) -> i32,
    ni845xSpiScriptDisableSPI: unsafe extern "C" fn(script: NiHandle) -> i32,
    ni845xSpiScriptWriteRead: unsafe extern "C" fn(
        script: NiHandle,
        write_size: u32,
        write: *const u8,
        read_index: *mut u32,
    ) -> i32,
    ni845xSpiScriptExtractReadDataSize: unsafe extern "C" fn(script: NiHandle, index: u32, size: *mut u32) -> i32,
    ni845xSpiScriptExtractReadData: unsafe extern "C" fn(script: NiHandle, index: u32, data: *mut u8) -> i32,
    ni845xSpiScriptRun: unsafe extern "C" fn(script: NiHandle, device: NiHandle, port: u8) -> i32,

    ni845xSpiStreamConfigurationOpen: unsafe extern "C" fn(config: *mut NiHandle) -> i32,
    ni845xSpiStreamConfigurationClose: unsafe extern "C" fn(config: NiHandle) -> i32,
    ni845xSpiStreamConfigurationSetNumBits: unsafe extern "C" fn(config: NiHandle, bits: u8) -> i32,
    ni845xSpiStreamConfigurationSetNumSamples: unsafe extern "C" fn(config: NiHandle, samples: u32) -> i32,
    ni845xSpiStreamConfigurationSetClockPhase: unsafe extern "C" fn(config: NiHandle, phase: u8) -> i32,
    ni845xSpiStreamConfigurationSetClockPolarity: unsafe extern "C" fn(config: NiHandle, polarity: u8) -> i32,
    ni845xSpiStreamConfigurationWave1SetTimingParam: unsafe extern "C" fn(config: NiHandle, param: u8, value: u32) -> i32,
    ni845xSpiStreamConfigurationWave1SetMosiData: unsafe extern "C" fn(config: NiHandle, data: *const u8, size: u32) -> i32,
    ni845xSpiStreamConfigurationWave1SetPinConfig: unsafe extern "C" fn(config: NiHandle, pin: u8, mode: u8) -> i32,
    ni845xSpiStreamConfigurationSetPacketSize: unsafe extern "C" fn(config: NiHandle, size: u32) -> i32,
    ni845xSpiStreamStart: unsafe extern "C" fn(device: NiHandle, config: NiHandle) -> i32,
    ni845xSpiStreamRead: unsafe extern "C" fn(
        device: NiHandle,
        config: NiHandle,
        count: u32,
        data: *mut u8,
        read: *mut u32,
    ) -> i32,
    ni845xSpiStreamStop: unsafe extern "C" fn(device: NiHandle, config: NiHandle) -> i32,

    ni845xDioSetPortLineDirectionMap: unsafe extern "C" fn(device: NiHandle, port: u8, map: u8) -> i32,
    ni845xDioSetDriverType: unsafe extern "C" fn(device: NiHandle, port: u8, driver_type: u8) -> i32,
    ni845xDioWriteLine: unsafe extern "C" fn(device: NiHandle, port: u8, line: u8, value: i32) -> i32,
    ni845xDioWritePort: unsafe extern "C" fn(device: NiHandle, port: u8, value: u8) -> i32,
    ni845xDioReadLine: unsafe extern "C" fn(device: NiHandle, port: u8, line: u8, value: *mut i32) -> i32,
    ni845xDioReadPort: unsafe extern "C" fn(device: NiHandle, port: u8, value: *mut u8) -> i32,
}

lazy_static! {
    static ref NI845X: crate::Result<Container<Api>> = load();
}

fn library_path() -> String {
    env::var(NI845X_LIB_ENV).unwrap_or_else(|_| DEFAULT_NI845X_LIB.to_string())
}

fn load() -> crate::Result<Container<Api>> {
    let path = library_path();
    log::debug!("Loading NI-845x library from `{}`", path);
    unsafe { Container::load(&path) }.map_err(|err| {
        Error::connection("NI-845x driver", anyhow!("Cannot load `{}`: {}", path, err))
    })
}

fn from_buffer(buf: &[c_char]) -> String {
    unsafe { CStr::from_ptr(buf.as_ptr()) }.to_string_lossy().into_owned()
}

pub struct DllDriver {
    api: &'static Container<Api>,
}

impl DllDriver {
    /// Load the driver library. Fails with a connection error if it is missing.
    pub fn load() -> crate::Result<Arc<dyn Driver>> {
        match NI845X.as_ref() {
            Ok(api) => Ok(Arc::new(DllDriver { api })),
            Err(err) => Err(err.clone()),
        }
    }
}

impl Driver for DllDriver {
    fn status_to_string(&self, status: Status) -> String {
        let mut text = [0 as c_char; STATUS_LEN];
        unsafe {
            self.api
                .ni845xStatusToString(status, STATUS_LEN as u32, text.as_mut_ptr())
        };
        from_buffer(&text)
    }

    fn find_device(&self, first_device: &mut String, find: &mut FindHandle, found: &mut u32) -> Status {
        let mut name = [0 as c_char; NAME_LEN];
        let status = unsafe { self.api.ni845xFindDevice(name.as_mut_ptr(), &mut find.0, found) };
        *first_device = from_buffer(&name);
        status
    }

    fn find_device_next(&self, find: FindHandle, next_device: &mut String) -> Status {
        let mut name = [0 as c_char; NAME_LEN];
        let status = unsafe { self.api.ni845xFindDeviceNext(find.0, name.as_mut_ptr()) };
        *next_device = from_buffer(&name);
        status
    }

    fn close_find_device_handle(&self, find: FindHandle) -> Status {
        unsafe { self.api.ni845xCloseFindDeviceHandle(find.0) }
    }

    fn open(&self, resource: &str, device: &mut DeviceHandle) -> Status {
        match CString::new(resource) {
            Ok(name) => unsafe { self.api.ni845xOpen(name.as_ptr(), &mut device.0) },
            Err(_) => INVALID_RESOURCE,
        }
    }

    fn close(&self, device: DeviceHandle) -> Status {
        unsafe { self.api.ni845xClose(device.0) }
    }

    fn device_lock(&self, device: DeviceHandle) -> Status {
        unsafe { self.api.ni845xDeviceLock(device.0) }
    }

    fn device_unlock(&self, device: DeviceHandle) -> Status {
        unsafe { self.api.ni845xDeviceUnlock(device.0) }
    }

    fn set_io_voltage_level(&self, device: DeviceHandle, level: u8) -> Status {
        unsafe { self.api.ni845xSetIoVoltageLevel(device.0, level) }
    }

    fn set_timeout(&self, device: DeviceHandle, timeout_ms: u32) -> Status {
        unsafe { self.api.ni845xSetTimeout(device.0, timeout_ms) }
    }

    fn i2c_set_pullup_enable(&self, device: DeviceHandle, enable: u8) -> Status {
        unsafe { self.api.ni845xI2cSetPullupEnable(device.0, enable) }
    }

    fn i2c_configuration_open(&self, config: &mut ConfigHandle) -> Status {
        unsafe { self.api.ni845xI2cConfigurationOpen(&mut config.0) }
    }

    fn i2c_configuration_close(&self, config: ConfigHandle) -> Status {
        unsafe { self.api.ni845xI2cConfigurationClose(config.0) }
    }

    fn i2c_configuration_set_address(&self, config: ConfigHandle, address: u16) -> Status {
        unsafe { self.api.ni845xI2cConfigurationSetAddress(config.0, address) }
    }

    fn i2c_configuration_get_address(&self, config: ConfigHandle, address: &mut u16) -> Status {
        unsafe { self.api.ni845xI2cConfigurationGetAddress(config.0, address) }
    }

    fn i2c_configuration_set_address_size(&self, config: ConfigHandle, size: i32) -> Status {
        unsafe { self.api.ni845xI2cConfigurationSetAddressSize(config.0, size) }
    }

    fn i2c_configuration_get_address_size(&self, config: ConfigHandle, size: &mut i32) -> Status {
        unsafe { self.api.ni845xI2cConfigurationGetAddressSize(config.0, size) }
    }

    fn i2c_configuration_set_clock_rate(&self, config: ConfigHandle, khz: u16) -> Status {
        unsafe { self.api.ni845xI2cConfigurationSetClockRate(config.0, khz) }
    }

    fn i2c_configuration_get_clock_rate(&self, config: ConfigHandle, khz: &mut u16) -> Status {
        unsafe { self.api.ni845xI2cConfigurationGetClockRate(config.0, khz) }
    }

    fn i2c_configuration_set_hs_clock_rate(&self, config: ConfigHandle, khz: u16) -> Status {
        unsafe { self.api.ni845xI2cConfigurationSetHSClockRate(config.0, khz) }
    }

    fn i2c_configuration_get_hs_clock_rate(&self, config: ConfigHandle, khz: &mut u16) -> Status {
        unsafe { self.api.ni845xI2cConfigurationGetHSClockRate(config.0, khz) }
    }

    fn i2c_configuration_set_hs_enable(&self, config: ConfigHandle, enable: u8) -> Status {
        unsafe { self.api.ni845xI2cConfigurationSetHSEnable(config.0, enable) }
    }

    fn i2c_configuration_get_hs_enable(&self, config: ConfigHandle, enable: &mut u8) -> Status {
        unsafe { self.api.ni845xI2cConfigurationGetHSEnable(config.0, enable) }
    }

    fn i2c_configuration_set_hs_master_code(&self, config: ConfigHandle, code: u8) -> Status {
        unsafe { self.api.ni845xI2cConfigurationSetHSMasterCode(config.0, code) }
    }

    fn i2c_configuration_get_hs_master_code(&self, config: ConfigHandle, code: &mut u8) -> Status {
        unsafe { self.api.ni845xI2cConfigurationGetHSMasterCode(config.0, code) }
    }

    fn i2c_configuration_set_port(&self, config: ConfigHandle, port: u8) -> Status {
        unsafe { self.api.ni845xI2cConfigurationSetPort(config.0, port) }
    }

    fn i2c_configuration_get_port(&self, config: ConfigHandle, port: &mut u8) -> Status {
        unsafe { self.api.ni845xI2cConfigurationGetPort(config.0, port) }
    }

    fn i2c_configuration_set_ack_poll_timeout(&self, config: ConfigHandle, timeout_ms: u16) -> Status {
        unsafe { self.api.ni845xI2cConfigurationSetAckPollTimeout(config.0, timeout_ms) }
    }

    fn i2c_configuration_get_ack_poll_timeout(&self, config: ConfigHandle, timeout_ms: &mut u16) -> Status {
        unsafe { self.api.ni845xI2cConfigurationGetAckPollTimeout(config.0, timeout_ms) }
    }

    fn i2c_write(&self, device: DeviceHandle, config: ConfigHandle, data: &[u8]) -> Status {
        unsafe {
            self.api
                .ni845xI2cWrite(device.0, config.0, data.len() as u32, data.as_ptr())
        }
    }

    fn i2c_read(&self, device: DeviceHandle, config: ConfigHandle, data: &mut [u8], read: &mut u32) -> Status {
        unsafe {
            self.api
                .ni845xI2cRead(device.0, config.0, data.len() as u32, read, data.as_mut_ptr())
        }
    }

    fn i2c_write_read(
        &self,
        device: DeviceHandle,
        config: ConfigHandle,
        write: &[u8],
        data: &mut [u8],
        read: &mut u32,
    ) -> Status {
        unsafe {
            self.api.ni845xI2cWriteRead(
                device.0,
                config.0,
                write.len() as u32,
                write.as_ptr(),
                data.len() as u32,
                read,
                data.as_mut_ptr(),
            )
        }
    }

    fn spi_configuration_open(&self, config: &mut ConfigHandle) -> Status {
        unsafe { self.api.ni845xSpiConfigurationOpen(&mut config.0) }
    }

    fn spi_configuration_close(&self, config: ConfigHandle) -> Status {
        unsafe { self.api.ni845xSpiConfigurationClose(config.0) }
    }

    fn spi_configuration_set_chip_select(&self, config: ConfigHandle, chip_select: u32) -> Status {
        unsafe { self.api.ni845xSpiConfigurationSetChipSelect(config.0, chip_select) }
    }

    fn spi_configuration_get_chip_select(&self, config: ConfigHandle, chip_select: &mut u32) -> Status {
        unsafe { self.api.ni845xSpiConfigurationGetChipSelect(config.0, chip_select) }
    }

    fn spi_configuration_set_clock_phase(&self, config: ConfigHandle, phase: i32) -> Status {
        unsafe { self.api.ni845xSpiConfigurationSetClockPhase(config.0, phase) }
    }

    fn spi_configuration_get_clock_phase(&self, config: ConfigHandle, phase: &mut i32) -> Status {
        unsafe { self.api.ni845xSpiConfigurationGetClockPhase(config.0, phase) }
    }

    fn spi_configuration_set_clock_polarity(&self, config: ConfigHandle, polarity: i32) -> Status {
        unsafe { self.api.ni845xSpiConfigurationSetClockPolarity(config.0, polarity) }
    }

    fn spi_configuration_get_clock_polarity(&self, config: ConfigHandle, polarity: &mut i32) -> Status {
        unsafe { self.api.ni845xSpiConfigurationGetClockPolarity(config.0, polarity) }
    }

    fn spi_configuration_set_clock_rate(&self, config: ConfigHandle, khz: u16) -> Status {
        unsafe { self.api.ni845xSpiConfigurationSetClockRate(config.0, khz) }
    }

    fn spi_configuration_get_clock_rate(&self, config: ConfigHandle, khz: &mut u16) -> Status {
        unsafe { self.api.ni845xSpiConfigurationGetClockRate(config.0, khz) }
    }

    fn spi_configuration_set_num_bits_per_sample(&self, config: ConfigHandle, bits: u16) -> Status {
        unsafe { self.api.ni845xSpiConfigurationSetNumBitsPerSample(config.0, bits) }
    }

    fn spi_configuration_get_num_bits_per_sample(&self, config: ConfigHandle, bits: &mut u16) -> Status {
        unsafe { self.api.ni845xSpiConfigurationGetNumBitsPerSample(config.0, bits) }
    }

    fn spi_configuration_set_port(&self, config: ConfigHandle, port: u8) -> Status {
        unsafe { self.api.ni845xSpiConfigurationSetPort(config.0, port) }
    }

    fn spi_configuration_get_port(&self, config: ConfigHandle, port: &mut u8) -> Status {
        unsafe { self.api.ni845xSpiConfigurationGetPort(config.0, port) }
    }

    fn spi_write_read(
        &self,
        device: DeviceHandle,
        config: ConfigHandle,
        write: &[u8],
        data: &mut [u8],
        read: &mut u32,
    ) -> Status {
        unsafe {
            self.api.ni845xSpiWriteRead(
                device.0,
                config.0,
                write.len() as u32,
                write.as_ptr(),
                read,
                data.as_mut_ptr(),
            )
        }
    }

    fn spi_script_open(&self, script: &mut ScriptHandle) -> Status {
        unsafe { self.api.ni845xSpiScriptOpen(&mut script.0) }
    }

    fn spi_script_close(&self, script: ScriptHandle) -> Status {
        unsafe { self.api.ni845xSpiScriptClose(script.0) }
    }

    fn spi_script_clock_polarity_phase(&self, script: ScriptHandle, polarity: i32, phase: i32) -> Status {
        unsafe { self.api.ni845xSpiScriptClockPolarityPhase(script.0, polarity, phase) }
    }

    fn spi_script_clock_rate(&self, script: ScriptHandle, khz: u16) -> Status {
        unsafe { self.api.ni845xSpiScriptClockRate(script.0, khz) }
    }

    fn spi_script_cs_high(&self, script: ScriptHandle, chip_select: u32) -> Status {
        unsafe { self.api.ni845xSpiScriptCSHigh(script.0, chip_select) }
    }

    fn spi_script_cs_low(&self, script: ScriptHandle, chip_select: u32) -> Status {
        unsafe { self.api.ni845xSpiScriptCSLow(script.0, chip_select) }
    }

    fn spi_script_num_bits_per_sample(&self, script: ScriptHandle, bits: u16) -> Status {
        unsafe { self.api.ni845xSpiScriptNumBitsPerSample(script.0, bits) }
    }

    fn spi_script_us_delay(&self, script: ScriptHandle, delay_us: u16) -> Status {
        unsafe { self.api.ni845xSpiScriptUsDelay(script.0, delay_us) }
    }

    fn spi_script_enable_spi(&self, script: ScriptHandle) -> Status {
        unsafe { self.api.ni845xSpiScriptEnableSPI(script.0) }
    }

    fn spi_script_disable_spi(&self, script: ScriptHandle) -> Status {
        unsafe { self.api.ni845xSpiScriptDisableSPI(script.0) }
    }

    fn spi_script_write_read(&self, script: ScriptHandle, write: &[u8], read_index: &mut u32) -> Status {
        unsafe {
            self.api
                .ni845xSpiScriptWriteRead(script.0, write.len() as u32, write.as_ptr(), read_index)
        }
    }

    fn spi_script_extract_read_data_size(&self, script: ScriptHandle, read_index: u32, size: &mut u32) -> Status {
        unsafe { self.api.ni845xSpiScriptExtractReadDataSize(script.0, read_index, size) }
    }

    fn spi_script_extract_read_data(&self, script: ScriptHandle, read_index: u32, data: &mut [u8]) -> Status {
        unsafe {
            self.api
                .ni845xSpiScriptExtractReadData(script.0, read_index, data.as_mut_ptr())
        }
    }

    fn spi_script_run(&self, script: ScriptHandle, device: DeviceHandle, port: u8) -> Status {
        unsafe { self.api.ni845xSpiScriptRun(script.0, device.0, port) }
    }

    fn spi_stream_configuration_open(&self, config: &mut ConfigHandle) -> Status {
        unsafe { self.api.ni845xSpiStreamConfigurationOpen(&mut config.0) }
    }

    fn spi_stream_configuration_close(&self, config: ConfigHandle) -> Status {
        unsafe { self.api.ni845xSpiStreamConfigurationClose(config.0) }
    }

    fn spi_stream_configuration_set_num_bits(&self, config: ConfigHandle, bits: u8) -> Status {
        unsafe { self.api.ni845xSpiStreamConfigurationSetNumBits(config.0, bits) }
    }

    fn spi_stream_configuration_set_num_samples(&self, config: ConfigHandle, samples: u32) -> Status {
        unsafe { self.api.ni845xSpiStreamConfigurationSetNumSamples(config.0, samples) }
    }

    fn spi_stream_configuration_set_clock_phase(&self, config: ConfigHandle, phase: u8) -> Status {
        unsafe { self.api.ni845xSpiStreamConfigurationSetClockPhase(config.0, phase) }
    }

    fn spi_stream_configuration_set_clock_polarity(&self, config: ConfigHandle, polarity: u8) -> Status {
        unsafe { self.api.ni845xSpiStreamConfigurationSetClockPolarity(config.0, polarity) }
    }

    fn spi_stream_configuration_wave1_set_timing_param(&self, config: ConfigHandle, param: u8, value: u32) -> Status {
        unsafe {
            self.api
                .ni845xSpiStreamConfigurationWave1SetTimingParam(config.0, param, value)
        }
    }

    fn spi_stream_configuration_wave1_set_mosi_data(&self, config: ConfigHandle, data: &[u8]) -> Status {
        unsafe {
            self.api.ni845xSpiStreamConfigurationWave1SetMosiData(
                config.0,
                data.as_ptr(),
                data.len() as u32,
            )
        }
    }

    fn spi_stream_configuration_wave1_set_pin_config(&self, config: ConfigHandle, pin: u8, mode: u8) -> Status {
        unsafe {
            self.api
                .ni845xSpiStreamConfigurationWave1SetPinConfig(config.0, pin, mode)
        }
    }

    fn spi_stream_configuration_set_packet_size(&self, config: ConfigHandle, size: u32) -> Status {
        unsafe { self.api.ni845xSpiStreamConfigurationSetPacketSize(config.0, size) }
    }

    fn spi_stream_start(&self, device: DeviceHandle, config: ConfigHandle) -> Status {
        unsafe { self.api.ni845xSpiStreamStart(device.0, config.0) }
    }

    fn spi_stream_read(&self, device: DeviceHandle, config: ConfigHandle, data: &mut [u8], read: &mut u32) -> Status {
        unsafe {
            self.api.ni845xSpiStreamRead(
                device.0,
                config.0,
                data.len() as u32,
                data.as_mut_ptr(),
                read,
            )
        }
    }

    fn spi_stream_stop(&self, device: DeviceHandle, config: ConfigHandle) -> Status {
        unsafe { self.api.ni845xSpiStreamStop(device.0, config.0) }
    }

    fn dio_set_port_line_direction_map(&self, device: DeviceHandle, port: u8, map: u8) -> Status {
        unsafe { self.api.ni845xDioSetPortLineDirectionMap(device.0, port, map) }
    }

    fn dio_set_driver_type(&self, device: DeviceHandle, port: u8, driver_type: u8) -> Status {
        unsafe { self.api.ni845xDioSetDriverType(device.0, port, driver_type) }
    }

    fn dio_write_line(&self, device: DeviceHandle, port: u8, line: u8, value: i32) -> Status {
        unsafe { self.api.ni845xDioWriteLine(device.0, port, line, value) }
    }

    fn dio_write_port(&self, device: DeviceHandle, port: u8, value: u8) -> Status {
        unsafe { self.api.ni845xDioWritePort(device.0, port, value) }
    }

    fn dio_read_line(&self, device: DeviceHandle, port: u8, line: u8, value: &mut i32) -> Status {
        unsafe { self.api.ni845xDioReadLine(device.0, port, line, value) }
    }

    fn dio_read_port(&self, device: DeviceHandle, port: u8, value: &mut u8) -> Status {
        unsafe { self.api.ni845xDioReadPort(device.0, port, value) }
    }
}
