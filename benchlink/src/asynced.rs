//! Run an [`Adapter`] on its own thread and talk to it from async code.
//!
//! Driver calls block, so every adapter gets a dedicated OS thread that owns
//! the session. Requests are queued on a channel and answered through a oneshot.

use std::sync::{mpsc, Arc, Mutex};
use std::thread;

use anyhow::anyhow;
use tokio::sync::oneshot;

use crate::engine::{Adapter, Reading};
use crate::profile::Args;
use crate::transport::Transport;
use crate::{Error, ScpiRequest};

/// Work executed on the adapter thread.
#[derive(Clone, Debug)]
pub enum Task {
    Open {
        resource: String,
        reset: bool,
        identify: bool,
    },
    Close,
    Scpi(ScpiRequest),
    Configure { command: String, args: Args },
    Query { command: String, args: Args },
}

enum Msg {
    Task {
        task: Task,
        reply: oneshot::Sender<crate::Result<Reading>>,
    },
    Drop,
}

/// Handle to an adapter thread. Clones share the same thread.
#[derive(Clone)]
pub struct Instrument {
    tx: Arc<Mutex<mpsc::Sender<Msg>>>,
}

fn disconnected() -> Error {
    Error::internal(anyhow!("Disconnected"))
}

impl Instrument {
    pub fn spawn<T: Transport + 'static>(adapter: Adapter<T>) -> Self {
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let mut adapter = adapter;
            while let Ok(msg) = rx.recv() {
                match msg {
                    Msg::Task { task, reply } => {
                        let _ = reply.send(Self::run_task(&mut adapter, task));
                    }
                    Msg::Drop => break,
                }
            }
            if adapter.is_open() {
                if let Err(err) = adapter.close() {
                    log::warn!("Closing {} failed: {}", adapter.profile().name, err);
                }
            }
            log::debug!("Adapter thread for {} quits", adapter.profile().name);
        });
        Instrument {
            tx: Arc::new(Mutex::new(tx)),
        }
    }

    fn run_task<T: Transport>(adapter: &mut Adapter<T>, task: Task) -> crate::Result<Reading> {
        match task {
            Task::Open {
                resource,
                reset,
                identify,
            } => adapter.open(&resource, reset, identify).map(|_| Reading::Done),
            Task::Close => adapter.close().map(|_| Reading::Done),
            Task::Scpi(request) => adapter.session().handle_scpi(request).map(Reading::from),
            Task::Configure { command, args } => adapter.configure(&command, &args).map(|_| Reading::Done),
            Task::Query { command, args } => adapter.query(&command, &args),
        }
    }

    pub async fn request(&self, task: Task) -> crate::Result<Reading> {
        let (tx, rx) = oneshot::channel();
        let msg = Msg::Task { task, reply: tx };
        self.tx
            .lock()
            .map_err(|_| disconnected())?
            .send(msg)
            .map_err(|_| disconnected())?;
        rx.await.map_err(|_| disconnected())?
    }

    /// Stop the thread. The session is closed if it is still open.
    pub fn disconnect(self) {
        if let Ok(tx) = self.tx.lock() {
            let _ = tx.send(Msg::Drop);
        }
    }
}
