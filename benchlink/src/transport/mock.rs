//! A scripted in-memory transport.
//!
//! Clones share their state, so a test can keep one handle to inspect the
//! traffic while the other one is moved into a session.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::anyhow;

use super::{Termination, Transport};
use crate::Error;

const VI_ERROR_TMO: i32 = -1_073_807_339;

/// One operation seen by a [`MockTransport`].
#[derive(Clone, Debug, PartialEq)]
pub enum Exchange {
    Open(String),
    Close,
    Termination(Termination),
    Timeout(Duration),
    Write(String),
    Query(String),
    ReadRaw(usize),
}

struct State {
    resources: Vec<String>,
    opened: Option<String>,
    log: Vec<Exchange>,
    replies: HashMap<String, VecDeque<String>>,
    defaults: HashMap<String, String>,
    raw: VecDeque<Vec<u8>>,
    failures: HashMap<String, Error>,
    refuse_open: bool,
}

#[derive(Clone)]
pub struct MockTransport {
    state: Arc<Mutex<State>>,
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl MockTransport {
    /// A transport listing a single GPIB resource which answers `*IDN?` and `*OPC?`.
    pub fn new() -> Self {
        let mut defaults = HashMap::new();
        defaults.insert("*IDN?".to_string(), "BENCHLINK,MOCK,0,1.0\n".to_string());
        defaults.insert("*OPC?".to_string(), "1\n".to_string());
        MockTransport {
            state: Arc::new(Mutex::new(State {
                resources: vec!["GPIB0::5::INSTR".to_string()],
                opened: None,
                log: Vec::new(),
                replies: HashMap::new(),
                defaults,
                raw: VecDeque::new(),
                failures: HashMap::new(),
                refuse_open: false,
            })),
        }
    }

    pub fn with_resources<T: Into<String>>(self, resources: Vec<T>) -> Self {
        self.state.lock().unwrap().resources = resources.into_iter().map(Into::into).collect();
        self
    }

    /// Answer `command` with `reply`. Multiple replies for the same command are
    /// returned in order, the last one repeats.
    pub fn reply<C: Into<String>, R: Into<String>>(&self, command: C, reply: R) {
        let mut state = self.state.lock().unwrap();
        state
            .replies
            .entry(command.into())
            .or_insert_with(VecDeque::new)
            .push_back(reply.into());
    }

    /// Replace all queued replies of `command`.
    pub fn set_reply<C: Into<String>, R: Into<String>>(&self, command: C, reply: R) {
        let mut state = self.state.lock().unwrap();
        let mut queue = VecDeque::new();
        queue.push_back(reply.into());
        state.replies.insert(command.into(), queue);
    }

    pub fn push_raw(&self, data: Vec<u8>) {
        self.state.lock().unwrap().raw.push_back(data);
    }

    /// Let the next write or query of `command` fail with `err`.
    pub fn fail_on<C: Into<String>>(&self, command: C, err: Error) {
        self.state.lock().unwrap().failures.insert(command.into(), err);
    }

    pub fn refuse_open(&self) {
        self.state.lock().unwrap().refuse_open = true;
    }

    pub fn log(&self) -> Vec<Exchange> {
        self.state.lock().unwrap().log.clone()
    }

    /// Every command written or queried, in order.
    pub fn commands(&self) -> Vec<String> {
        self.log()
            .into_iter()
            .filter_map(|x| match x {
                Exchange::Write(cmd) | Exchange::Query(cmd) => Some(cmd),
                _ => None,
            })
            .collect()
    }

    pub fn writes(&self) -> Vec<String> {
        self.log()
            .into_iter()
            .filter_map(|x| match x {
                Exchange::Write(cmd) => Some(cmd),
                _ => None,
            })
            .collect()
    }

    pub fn is_open(&self) -> bool {
        self.state.lock().unwrap().opened.is_some()
    }

    pub fn clear_log(&self) {
        self.state.lock().unwrap().log.clear();
    }
}

impl State {
    fn check_open(&self) -> crate::Result<()> {
        if self.opened.is_some() {
            Ok(())
        } else {
            Err(Error::NotOpen)
        }
    }

    fn take_failure(&mut self, command: &str) -> crate::Result<()> {
        match self.failures.remove(command) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl Transport for MockTransport {
    fn open(&mut self, resource: &str) -> crate::Result<()> {
        let mut state = self.state.lock().unwrap();
        state.log.push(Exchange::Open(resource.to_string()));
        if state.refuse_open {
            return Err(Error::connection(resource, anyhow!("Connection refused")));
        }
        if state.opened.is_some() {
            return Err(Error::already_open(resource));
        }
        state.opened = Some(resource.to_string());
        Ok(())
    }

    fn close(&mut self) -> crate::Result<()> {
        let mut state = self.state.lock().unwrap();
        state.log.push(Exchange::Close);
        state.check_open()?;
        state.opened = None;
        Ok(())
    }

    fn list_resources(&mut self) -> crate::Result<Vec<String>> {
        Ok(self.state.lock().unwrap().resources.clone())
    }

    fn set_termination(&mut self, termination: Termination) -> crate::Result<()> {
        let mut state = self.state.lock().unwrap();
        state.log.push(Exchange::Termination(termination));
        Ok(())
    }

    fn set_timeout(&mut self, timeout: Duration) -> crate::Result<()> {
        let mut state = self.state.lock().unwrap();
        state.log.push(Exchange::Timeout(timeout));
        Ok(())
    }

    fn write(&mut self, command: &str) -> crate::Result<()> {
        let mut state = self.state.lock().unwrap();
        state.check_open()?;
        state.log.push(Exchange::Write(command.to_string()));
        state.take_failure(command)
    }

    fn query(&mut self, command: &str) -> crate::Result<String> {
        let mut guard = self.state.lock().unwrap();
        let state = &mut *guard;
        state.check_open()?;
        state.log.push(Exchange::Query(command.to_string()));
        state.take_failure(command)?;
        match state.replies.get_mut(command) {
            Some(queue) if queue.len() > 1 => Ok(queue.pop_front().unwrap_or_default()),
            Some(queue) if !queue.is_empty() => Ok(queue[0].clone()),
            _ => match state.defaults.get(command) {
                Some(reply) => Ok(reply.clone()),
                None => Err(Error::driver(
                    format!("viRead after `{}`", command),
                    VI_ERROR_TMO,
                    "Timeout expired before operation completed.",
                )),
            },
        }
    }

    fn read_raw(&mut self, max_bytes: usize) -> crate::Result<Vec<u8>> {
        let mut state = self.state.lock().unwrap();
        state.check_open()?;
        state.log.push(Exchange::ReadRaw(max_bytes));
        match state.raw.pop_front() {
            Some(mut data) => {
                data.truncate(max_bytes);
                Ok(data)
            }
            None => Err(Error::driver("viRead", VI_ERROR_TMO, "Timeout expired before operation completed.")),
        }
    }
}
