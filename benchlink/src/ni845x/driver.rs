//! One method per NI-845x entry point.
//!
//! Methods return the raw driver status; `0` is success. Out parameters are
//! Rust references so the trait can be implemented without FFI in tests.

use serde::{Deserialize, Serialize};

pub type Status = i32;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FindHandle(pub u32);

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeviceHandle(pub u64);

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConfigHandle(pub u64);

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScriptHandle(pub u64);

pub trait Driver: Send + Sync {
    fn status_to_string(&self, status: Status) -> String;

    fn find_device(&self, first_device: &mut String, find: &mut FindHandle, found: &mut u32) -> Status;
    fn find_device_next(&self, find: FindHandle, next_device: &mut String) -> Status;
    fn close_find_device_handle(&self, find: FindHandle) -> Status;
    fn open(&self, resource: &str, device: &mut DeviceHandle) -> Status;
    fn close(&self, device: DeviceHandle) -> Status;
    fn device_lock(&self, device: DeviceHandle) -> Status;
    fn device_unlock(&self, device: DeviceHandle) -> Status;
    fn set_io_voltage_level(&self, device: DeviceHandle, level: u8) -> Status;
    fn set_timeout(&self, device: DeviceHandle, timeout_ms: u32) -> Status;

    fn i2c_set_pullup_enable(&self, device: DeviceHandle, enable: u8) -> Status;
    fn i2c_configuration_open(&self, config: &mut ConfigHandle) -> Status;
    fn i2c_configuration_close(&self, config: ConfigHandle) -> Status;
    fn i2c_configuration_set_address(&self, config: ConfigHandle, address: u16) -> Status;
    fn i2c_configuration_get_address(&self, config: ConfigHandle, address: &mut u16) -> Status;
    fn i2c_configuration_set_address_size(&self, config: ConfigHandle, size: i32) -> Status;
    fn i2c_configuration_get_address_size(&self, config: ConfigHandle, size: &mut i32) -> Status;
    fn i2c_configuration_set_clock_rate(&self, config: ConfigHandle, khz: u16) -> Status;
    fn i2c_configuration_get_clock_rate(&self, config: ConfigHandle, khz: &mut u16) -> Status;
    fn i2c_configuration_set_hs_clock_rate(&self, config: ConfigHandle, khz: u16) -> Status;
    fn i2c_configuration_get_hs_clock_rate(&self, config: ConfigHandle, khz: &mut u16) -> Status;
    fn i2c_configuration_set_hs_enable(&self, config: ConfigHandle, enable: u8) -> Status;
    fn i2c_configuration_get_hs_enable(&self, config: ConfigHandle, enable: &mut u8) -> Status;
    fn i2c_configuration_set_hs_master_code(&self, config: ConfigHandle, code: u8) -> Status;
    fn i2c_configuration_get_hs_master_code(&self, config: ConfigHandle, code: &mut u8) -> Status;
    fn i2c_configuration_set_port(&self, config: ConfigHandle, port: u8) -> Status;
    fn i2c_configuration_get_port(&self, config: ConfigHandle, port: &mut u8) -> Status;
    fn i2c_configuration_set_ack_poll_timeout(&self, config: ConfigHandle, timeout_ms: u16) -> Status;
    fn i2c_configuration_get_ack_poll_timeout(&self, config: ConfigHandle, timeout_ms: &mut u16) -> Status;
    fn i2c_write(&self, device: DeviceHandle, config: ConfigHandle, data: &[u8]) -> Status;
    fn i2c_read(&self, device: DeviceHandle, config: ConfigHandle, data: &mut [u8], read: &mut u32) -> Status;
    fn i2c_write_read(
        &self,
        device: DeviceHandle,
        config: ConfigHandle,
        write: &[u8],
        data: &mut [u8],
        read: &mut u32,
    ) -> Status;

    fn spi_configuration_open(&self, config: &mut ConfigHandle) -> Status;
    fn spi_configuration_close(&self, config: ConfigHandle) -> Status;
    fn spi_configuration_set_chip_select(&self, config: ConfigHandle, chip_select: u32) -> Status;
    fn spi_configuration_get_chip_select(&self, config: ConfigHandle, chip_select: &mut u32) -> Status;
    fn spi_configuration_set_clock_phase(&self, config: ConfigHandle, phase: i32) -> Status;
    fn spi_configuration_get_clock_phase(&self, config: ConfigHandle, phase: &mut i32) -> Status;
    fn spi_configuration_set_clock_polarity(&self, config: ConfigHandle, polarity: i32) -> Status;
    fn spi_configuration_get_clock_polarity(&self, config: ConfigHandle, polarity: &mut i32) -> Status;
    fn spi_configuration_set_clock_rate(&self, config: ConfigHandle, khz: u16) -> Status;
    fn spi_configuration_get_clock_rate(&self, config: ConfigHandle, khz: &mut u16) -> Status;
    fn spi_configuration_set_num_bits_per_sample(&self, config: ConfigHandle, bits: u16) -> Status;
    fn spi_configuration_get_num_bits_per_sample(&self, config: ConfigHandle, bits: &mut u16) -> Status;
    fn spi_configuration_set_port(&self, config: ConfigHandle, port: u8) -> Status;
    fn spi_configuration_get_port(&self, config: ConfigHandle, port: &mut u8) -> Status;
    fn spi_write_read(
        &self,
        device: DeviceHandle,
        config: ConfigHandle,
        write: &[u8],
        data: &mut [u8],
        read: &mut u32,
    ) -> Status;

    fn spi_script_open(&self, script: &mut ScriptHandle) -> Status;
    fn spi_script_close(&self, script: ScriptHandle) -> Status;
    fn spi_script_clock_polarity_phase(&self, script: ScriptHandle, polarity: i32, phase: i32) -> Status;
    fn spi_script_clock_rate(&self, script: ScriptHandle, khz: u16) -> Status;
    fn spi_script_cs_high(&self, script: ScriptHandle, chip_select: u32) -> Status;
    fn spi_script_cs_low(&self, script: ScriptHandle, chip_select: u32) -> Status;
    fn spi_script_num_bits_per_sample(&self, script: ScriptHandle, bits: u16) -> Status;
    fn spi_script_us_delay(&self, script: ScriptHandle, delay_us: u16) -> Status;
    fn spi_script_enable_spi(&self, script: ScriptHandle) -> Status;
    fn spi_script_disable_spi(&self, script: ScriptHandle) -> Status;
    fn spi_script_write_read(&self, script: ScriptHandle, write: &[u8], read_index: &mut u32) -> Status;
    fn spi_script_extract_read_data_size(&self, script: ScriptHandle, read_index: u32, size: &mut u32) -> Status;
    fn spi_script_extract_read_data(&self, script: ScriptHandle, read_index: u32, data: &mut [u8]) -> Status;
    fn spi_script_run(&self, script: ScriptHandle, device: DeviceHandle, port: u8) -> Status;

    fn spi_stream_configuration_open(&self, config: &mut ConfigHandle) -> Status;
    fn spi_stream_configuration_close(&self, config: ConfigHandle) -> Status;
    fn spi_stream_configuration_set_num_bits(&self, config: ConfigHandle, bits: u8) -> Status;
    fn spi_stream_configuration_set_num_samples(&self, config: ConfigHandle, samples: u32) -> Status;
    fn spi_stream_configuration_set_clock_phase(&self, config: ConfigHandle, phase: u8) -> Status;
    fn spi_stream_configuration_set_clock_polarity(&self, config: ConfigHandle, polarity: u8) -> Status;
    fn spi_stream_configuration_wave1_set_timing_param(&self, config: ConfigHandle, param: u8, value: u32) -> Status;
    fn spi_stream_configuration_wave1_set_mosi_data(&self, config: ConfigHandle, data: &[u8]) -> Status;
    fn spi_stream_configuration_wave1_set_pin_config(&self, config: ConfigHandle, pin: u8, mode: u8) -> Status;
    fn spi_stream_configuration_set_packet_size(&self, config: ConfigHandle, size: u32) -> Status;
    fn spi_stream_start(&self, device: DeviceHandle, config: ConfigHandle) -> Status;
    fn spi_stream_read(&self, device: DeviceHandle, config: ConfigHandle, data: &mut [u8], read: &mut u32) -> Status;
    fn spi_stream_stop(&self, device: DeviceHandle, config: ConfigHandle) -> Status;

    fn dio_set_port_line_direction_map(&self, device: DeviceHandle, port: u8, map: u8) -> Status;
    fn dio_set_driver_type(&self, device: DeviceHandle, port: u8, driver_type: u8) -> Status;
    fn dio_write_line(&self, device: DeviceHandle, port: u8, line: u8, value: i32) -> Status;
    fn dio_write_port(&self, device: DeviceHandle, port: u8, value: u8) -> Status;
    fn dio_read_line(&self, device: DeviceHandle, port: u8, line: u8, value: &mut i32) -> Status;
    fn dio_read_port(&self, device: DeviceHandle, port: u8, value: &mut u8) -> Status;
}
