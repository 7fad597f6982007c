//! Fake collaborators shared by the connection integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use gcl_core::{
    ChannelEvent, ConnectionPorts, PathSearch, PathSearchError, ProcessChannel, ProcessError,
    ProcessSpawner, SpawnedProcess, ValidationError, ValidationProbe,
};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

/// Search that returns a fixed result and counts calls.
pub struct FakeSearch {
    pub result: Result<String, PathSearchError>,
    pub calls: AtomicUsize,
}

#[async_trait]
impl PathSearch for FakeSearch {
    async fn search(&self, _name: &str) -> Result<String, PathSearchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.result.clone()
    }
}

/// Probe that prints a fixed help text.
pub struct FakeProbe {
    pub output: Result<String, ValidationError>,
    pub probed: Mutex<Vec<String>>,
}

#[async_trait]
impl ValidationProbe for FakeProbe {
    async fn run(&self, path: &str, _args: &[String]) -> Result<String, ValidationError> {
        self.probed.lock().unwrap().push(path.to_string());
        self.output.clone()
    }
}

/// Channel that answers every request by echoing it back, split in two chunks.
pub struct EchoChannel {
    connected: AtomicBool,
    events: mpsc::UnboundedSender<ChannelEvent>,
}

impl ProcessChannel for EchoChannel {
    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    fn disconnect(&self) {
        self.connected.store(false, Ordering::SeqCst);
    }

    fn send(&self, bytes: &[u8]) -> Result<(), ProcessError> {
        if !self.is_connected() {
            return Err(ProcessError::NotConnected);
        }
        let (head, tail) = bytes.split_at(bytes.len() / 2);
        for part in [head, tail] {
            self.events
                .send(ChannelEvent::Output(part.to_vec()))
                .map_err(|e| ProcessError::WriteFailed(e.to_string()))?;
        }
        Ok(())
    }
}

/// Spawner that hands out echo channels and records what it was asked to run.
#[derive(Default)]
pub struct FakeSpawner {
    pub spawned: Mutex<Vec<(String, Vec<String>)>>,
    pub fail_with: Option<ProcessError>,
}

impl FakeSpawner {
    pub fn spawn_count(&self) -> usize {
        self.spawned.lock().unwrap().len()
    }
}

#[async_trait]
impl ProcessSpawner for FakeSpawner {
    async fn spawn(&self, path: &str, args: &[String]) -> Result<SpawnedProcess, ProcessError> {
        self.spawned
            .lock()
            .unwrap()
            .push((path.to_string(), args.to_vec()));
        if let Some(e) = &self.fail_with {
            return Err(e.clone());
        }

        let (tx, events) = mpsc::unbounded_channel();
        let channel = Arc::new(EchoChannel {
            connected: AtomicBool::new(true),
            events: tx,
        });
        Ok(SpawnedProcess { channel, events })
    }
}

pub struct Harness {
    pub search: Arc<FakeSearch>,
    pub probe: Arc<FakeProbe>,
    pub spawner: Arc<FakeSpawner>,
}

impl Harness {
    pub fn new(search: Result<String, PathSearchError>, probe: Result<String, ValidationError>) -> Self {
        Self {
            search: Arc::new(FakeSearch {
                result: search,
                calls: AtomicUsize::new(0),
            }),
            probe: Arc::new(FakeProbe {
                output: probe,
                probed: Mutex::new(Vec::new()),
            }),
            spawner: Arc::new(FakeSpawner::default()),
        }
    }

    pub fn with_failing_spawner(mut self, error: ProcessError) -> Self {
        self.spawner = Arc::new(FakeSpawner {
            spawned: Mutex::new(Vec::new()),
            fail_with: Some(error),
        });
        self
    }

    pub fn ports(&self) -> ConnectionPorts {
        ConnectionPorts::new(
            Arc::clone(&self.search) as Arc<dyn PathSearch>,
            Arc::clone(&self.probe) as Arc<dyn ValidationProbe>,
            Arc::clone(&self.spawner) as Arc<dyn ProcessSpawner>,
        )
    }
}
