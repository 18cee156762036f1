use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use shared::{
    error::CommandError,
    protocol::{Action, Command, RawResponse},
};
use tokio::sync::Semaphore;

use crate::CommandChannel;

type Responder = Box<dyn Fn(&Command) -> Result<String, String> + Send + Sync>;

/// In-memory controller: records every command and answers through a script.
pub struct RecordingChannel {
    sent: Mutex<Vec<Command>>,
    responder: Responder,
    gate: Option<Arc<Semaphore>>,
}

impl RecordingChannel {
    pub fn with_responder(
        responder: impl Fn(&Command) -> Result<String, String> + Send + Sync + 'static,
    ) -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            responder: Box::new(responder),
            gate: None,
        }
    }

    pub fn replying(body: &str) -> Self {
        let body = body.to_string();
        Self::with_responder(move |_| Ok(body.clone()))
    }

    pub fn failing(reason: &str) -> Self {
        let reason = reason.to_string();
        Self::with_responder(move |_| Err(reason.clone()))
    }

    pub fn failing_on(action: Action, body: &str) -> Self {
        let body = body.to_string();
        Self::with_responder(move |command| {
            if command.action == action {
                Err(format!("{action} rejected"))
            } else {
                Ok(body.clone())
            }
        })
    }

    /// Holds every exchange until the gate hands out a permit.
    pub fn gated(mut self, gate: Arc<Semaphore>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn sent(&self) -> Vec<Command> {
        self.sent.lock().expect("sent log").clone()
    }

    pub fn actions(&self) -> Vec<Action> {
        self.sent().into_iter().map(|command| command.action).collect()
    }
}

#[async_trait]
impl CommandChannel for RecordingChannel {
    async fn send(&self, command: Command) -> Result<RawResponse, CommandError> {
        self.sent.lock().expect("sent log").push(command.clone());
        if let Some(gate) = &self.gate {
            gate.acquire().await.expect("gate open").forget();
        }
        (self.responder)(&command)
            .map(|body| RawResponse::new(command.action, body))
            .map_err(|reason| CommandError::transport(command.action, reason))
    }
}
