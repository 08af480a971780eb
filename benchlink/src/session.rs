//! Open/closed lifecycle of one instrument connection.
//!
//! A [`Session`] wraps a [`Transport`] and adds the behavior every instrument
//! shares: discovery before connecting, line termination, the IEEE 488.2 reset
//! sequence, identification and uniform error logging.

use std::time::Duration;

use benchlink_protocol::parse_binary_header;

use crate::transport::{Termination, Transport};
use crate::{Error, ScpiRequest, ScpiResponse};

pub const RESET: &str = "*RST";
/// Enables the standard event and service request registers and clears status.
pub const DEFAULT_SETUP: &str = "*ESE 60;*SRE 48;*CLS";
pub const IDENTIFY: &str = "*IDN?";

const MAX_BINARY_BYTES: usize = 16 * 1024 * 1024;

pub struct Session<T: Transport> {
    transport: T,
    resource: Option<String>,
    identity: Option<String>,
    reset: Vec<String>,
    timeout: Option<Duration>,
}

impl<T: Transport> Session<T> {
    pub fn new(transport: T) -> Self {
        Session {
            transport,
            resource: None,
            identity: None,
            reset: vec![RESET.to_string(), DEFAULT_SETUP.to_string()],
            timeout: None,
        }
    }

    /// Replace the commands sent by [`Session::reset`].
    pub fn with_reset(mut self, reset: Vec<String>) -> Self {
        self.reset = reset;
        self
    }

    /// Timeout applied to the transport whenever the session is opened.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn is_open(&self) -> bool {
        self.resource.is_some()
    }

    pub fn resource(&self) -> Option<&str> {
        self.resource.as_deref()
    }

    /// The `*IDN?` reply recorded when the session was opened.
    pub fn identity(&self) -> Option<&str> {
        self.identity.as_deref()
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn list_resources(&mut self) -> crate::Result<Vec<String>> {
        self.transport.list_resources()
    }

    pub fn open(&mut self, resource: &str, reset: bool, identify: bool) -> crate::Result<()> {
        if let Some(current) = &self.resource {
            return Err(Error::already_open(format!("Session on `{}`", current)));
        }
        let resources = self.transport.list_resources()?;
        if resources.is_empty() {
            log::warn!("No resources found while opening `{}`", resource);
            return Err(Error::NoDeviceFound);
        }
        if let Err(err) = self.transport.open(resource) {
            log::warn!("Cannot open `{}`: {}", resource, err);
            return Err(match err {
                Error::Connection { .. } | Error::AlreadyOpen { .. } => err,
                other => Error::connection(resource, anyhow::Error::new(other)),
            });
        }
        self.resource = Some(resource.to_string());
        if let Err(err) = self.prepare(resource, reset, identify) {
            log::warn!("Setting up `{}` failed: {}", resource, err);
            if let Err(close_err) = self.transport.close() {
                log::warn!("Closing `{}` after failed setup failed: {}", resource, close_err);
            }
            self.resource = None;
            self.identity = None;
            return Err(err);
        }
        if self.identity.is_none() {
            log::info!("{} resource has been connected", resource);
        }
        Ok(())
    }

    fn prepare(&mut self, resource: &str, reset: bool, identify: bool) -> crate::Result<()> {
        let termination = Termination::for_resource(resource);
        if termination != Termination::Default {
            self.transport.set_termination(termination)?;
        }
        if let Some(timeout) = self.timeout {
            self.transport.set_timeout(timeout)?;
        }
        if reset {
            self.reset()?;
        }
        if identify {
            let idn = self.query(IDENTIFY)?.trim().to_string();
            log::info!("{} resource has been connected", idn);
            self.identity = Some(idn);
        }
        Ok(())
    }

    pub fn close(&mut self) -> crate::Result<()> {
        let resource = self.resource.take().ok_or(Error::NotOpen)?;
        let identity = self.identity.take();
        let ret = self.transport.close();
        if let Err(err) = &ret {
            log::warn!("Error closing `{}`: {}", resource, err);
        }
        log::info!(
            "{} resource has been disconnected",
            identity.as_deref().unwrap_or(&resource)
        );
        ret
    }

    fn check_open(&self) -> crate::Result<()> {
        if self.resource.is_some() {
            Ok(())
        } else {
            Err(Error::NotOpen)
        }
    }

    /// Send every command of the reset sequence.
    pub fn reset(&mut self) -> crate::Result<()> {
        let commands = self.reset.clone();
        for cmd in &commands {
            self.write(cmd)?;
        }
        Ok(())
    }

    /// Write `command`. Queries (commands ending with `?`) are sent as a query and
    /// the reply is discarded, so the instrument output buffer stays empty.
    pub fn write(&mut self, command: &str) -> crate::Result<()> {
        self.check_open()?;
        if command.trim_end().ends_with('?') {
            let reply = self.query(command)?;
            log::debug!("Discarding reply to `{}`: {:?}", command, reply);
            return Ok(());
        }
        log::debug!("write: {}", command);
        self.transport.write(command).map_err(|err| {
            log::warn!("Writing `{}` failed: {}", command, err);
            err
        })
    }

    pub fn query(&mut self, command: &str) -> crate::Result<String> {
        self.check_open()?;
        let reply = self.transport.query(command).map_err(|err| {
            log::warn!("Query `{}` failed: {}", command, err);
            err
        })?;
        log::debug!("query: {} -> {:?}", command, reply);
        Ok(reply)
    }

    pub fn read_raw(&mut self, max_bytes: usize) -> crate::Result<Vec<u8>> {
        self.check_open()?;
        self.transport.read_raw(max_bytes).map_err(|err| {
            log::warn!("Raw read of up to {} bytes failed: {}", max_bytes, err);
            err
        })
    }

    /// Query a reply framed as an IEEE 488.2 block and return its payload.
    pub fn query_binary(&mut self, command: &str) -> crate::Result<Vec<u8>> {
        self.check_open()?;
        self.transport.write(command).map_err(|err| {
            log::warn!("Writing `{}` failed: {}", command, err);
            err
        })?;
        let data = self.read_raw(MAX_BINARY_BYTES)?;
        let (offset, len) = parse_binary_header(&data)?;
        if data.len() < offset + len {
            return Err(Error::malformed_reply(
                command,
                format!("expected {} bytes, got {}", len, data.len().saturating_sub(offset)),
            ));
        }
        Ok(data[offset..offset + len].to_vec())
    }

    pub fn set_timeout(&mut self, timeout: Duration) -> crate::Result<()> {
        self.timeout = Some(timeout);
        if self.is_open() {
            self.transport.set_timeout(timeout)?;
        }
        Ok(())
    }

    /// Send a command verbatim, returning the reply if it was a query.
    pub fn raw_command(&mut self, command: &str) -> crate::Result<ScpiResponse> {
        if command.trim_end().ends_with('?') {
            self.query(command).map(ScpiResponse::String)
        } else {
            self.write(command).map(|_| ScpiResponse::Done)
        }
    }

    pub fn handle_scpi(&mut self, request: ScpiRequest) -> crate::Result<ScpiResponse> {
        match request {
            ScpiRequest::Write(cmd) => self.raw_command(&cmd),
            ScpiRequest::QueryString(cmd) => self.query(&cmd).map(ScpiResponse::String),
            ScpiRequest::QueryBinary(cmd) => self
                .query_binary(&cmd)
                .map(|data| ScpiResponse::Binary { data }),
            ScpiRequest::ReadRaw { max_bytes } => self
                .read_raw(max_bytes)
                .map(|data| ScpiResponse::Binary { data }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::mock::{Exchange, MockTransport};

    fn open_session() -> (Session<MockTransport>, MockTransport) {
        let mock = MockTransport::new();
        let mut session = Session::new(mock.clone());
        session.open("GPIB0::5::INSTR", true, true).unwrap();
        (session, mock)
    }

    #[test]
    fn open_resets_and_identifies() {
        let (session, mock) = open_session();
        assert_eq!(mock.commands(), vec!["*RST", "*ESE 60;*SRE 48;*CLS", "*IDN?"]);
        assert_eq!(session.identity(), Some("BENCHLINK,MOCK,0,1.0"));
        assert_eq!(session.resource(), Some("GPIB0::5::INSTR"));
    }

    #[test]
    fn open_without_reset_or_identify_sends_nothing() {
        let mock = MockTransport::new();
        let mut session = Session::new(mock.clone());
        session.open("GPIB0::5::INSTR", false, false).unwrap();
        assert!(mock.commands().is_empty());
        assert_eq!(session.identity(), None);
    }

    #[test]
    fn newline_termination_for_socket_resources() {
        let mock = MockTransport::new().with_resources(vec!["TCPIP0::10.0.0.2::5025::SOCKET"]);
        let mut session = Session::new(mock.clone());
        session.open("TCPIP0::10.0.0.2::5025::SOCKET", false, false).unwrap();
        assert_eq!(
            mock.log(),
            vec![
                Exchange::Open("TCPIP0::10.0.0.2::5025::SOCKET".to_string()),
                Exchange::Termination(Termination::Newline),
            ]
        );
    }

    #[test]
    fn gpib_keeps_default_termination() {
        let (_, mock) = open_session();
        assert!(!mock
            .log()
            .iter()
            .any(|x| matches!(x, Exchange::Termination(_))));
    }

    #[test]
    fn timeout_is_applied_on_open() {
        let mock = MockTransport::new();
        let mut session = Session::new(mock.clone()).with_timeout(Some(Duration::from_secs(10)));
        session.open("GPIB0::5::INSTR", false, false).unwrap();
        assert_eq!(mock.log()[1], Exchange::Timeout(Duration::from_secs(10)));
    }

    #[test]
    fn empty_discovery_is_no_device_found() {
        let mock = MockTransport::new().with_resources(Vec::<String>::new());
        let mut session = Session::new(mock.clone());
        assert!(matches!(
            session.open("GPIB0::5::INSTR", true, true),
            Err(Error::NoDeviceFound)
        ));
        assert!(mock.log().is_empty());
        assert!(!session.is_open());
    }

    #[test]
    fn refused_open_is_connection_error() {
        let mock = MockTransport::new();
        mock.refuse_open();
        let mut session = Session::new(mock);
        match session.open("GPIB0::5::INSTR", true, true) {
            Err(Error::Connection { target, .. }) => assert_eq!(target, "GPIB0::5::INSTR"),
            _ => panic!(),
        }
        assert!(!session.is_open());
    }

    #[test]
    fn failed_identify_closes_transport() {
        let mock = MockTransport::new();
        mock.fail_on("*IDN?", Error::driver("viRead after `*IDN?`", -1, "timeout"));
        let mut session = Session::new(mock.clone());
        assert!(session.open("GPIB0::5::INSTR", false, true).is_err());
        assert!(!session.is_open());
        assert!(!mock.is_open());
        assert_eq!(mock.log().last(), Some(&Exchange::Close));
    }

    #[test]
    fn operations_before_open_fail_fast() {
        let mock = MockTransport::new();
        let mut session = Session::new(mock.clone());
        assert!(matches!(session.write("*RST"), Err(Error::NotOpen)));
        assert!(matches!(session.query("*IDN?"), Err(Error::NotOpen)));
        assert!(matches!(session.read_raw(10), Err(Error::NotOpen)));
        assert!(matches!(session.close(), Err(Error::NotOpen)));
        assert!(mock.log().is_empty());
    }

    #[test]
    fn second_open_is_rejected() {
        let (mut session, _) = open_session();
        assert!(matches!(
            session.open("GPIB0::5::INSTR", false, false),
            Err(Error::AlreadyOpen { .. })
        ));
    }

    #[test]
    fn write_of_query_discards_reply() {
        let (mut session, mock) = open_session();
        mock.clear_log();
        mock.reply(":OUTPut?", "1\n");
        session.write(":OUTPut?").unwrap();
        assert_eq!(mock.log(), vec![Exchange::Query(":OUTPut?".to_string())]);
    }

    #[test]
    fn write_then_close() {
        let (mut session, mock) = open_session();
        session.write(":OUTPut ON;").unwrap();
        session.close().unwrap();
        assert!(!session.is_open());
        assert!(!mock.is_open());
        assert_eq!(session.identity(), None);
        assert!(matches!(session.write(":OUTPut OFF;"), Err(Error::NotOpen)));
    }

    #[test]
    fn session_can_be_reopened() {
        let (mut session, mock) = open_session();
        session.close().unwrap();
        session.open("GPIB0::5::INSTR", false, false).unwrap();
        assert!(mock.is_open());
    }

    #[test]
    fn query_binary_strips_block_header() {
        let (mut session, mock) = open_session();
        mock.push_raw(b"#15hello\n".to_vec());
        assert_eq!(session.query_binary("CURVe?").unwrap(), b"hello".to_vec());
        mock.push_raw(b"#19abc".to_vec());
        assert!(matches!(
            session.query_binary("CURVe?"),
            Err(Error::MalformedReply { .. })
        ));
    }

    #[test]
    fn scpi_requests() {
        let (mut session, mock) = open_session();
        mock.reply(":MEASure:VOLTage?", "1.5\n");
        assert_eq!(
            session.handle_scpi(ScpiRequest::Write(":MEASure:VOLTage?".to_string())).unwrap(),
            ScpiResponse::String("1.5\n".to_string())
        );
        assert_eq!(
            session.handle_scpi(ScpiRequest::Write("*CLS".to_string())).unwrap(),
            ScpiResponse::Done
        );
        mock.push_raw(vec![1, 2, 3]);
        assert_eq!(
            session.handle_scpi(ScpiRequest::ReadRaw { max_bytes: 2 }).unwrap(),
            ScpiResponse::Binary { data: vec![1, 2] }
        );
    }

    #[test]
    fn driver_failure_carries_command() {
        let (mut session, mock) = open_session();
        mock.fail_on(":VOLTage 5", Error::driver("viWrite(`:VOLTage 5`)", -1_073_807_339, "timeout"));
        match session.write(":VOLTage 5") {
            Err(Error::Driver { call, .. }) => assert!(call.contains(":VOLTage 5")),
            _ => panic!(),
        }
    }
}
