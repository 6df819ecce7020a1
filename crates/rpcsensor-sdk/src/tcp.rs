//! JSON-RPC 2.0 over TCP.
//!
//! Socket I/O runs on tokio tasks; the [`RpcTransport`] side only touches
//! channels, so a control loop can poll any number of connections without
//! ever blocking on the network.
//!
//! ```text
//!            ┌──────── reader task ────────┐
//! socket ───►│ lines → jsonrpc::parse      │──► inbound channel ──► pump()
//!            └─────────────────────────────┘
//!            ┌──────── writer task ────────┐
//! socket ◄───│ write_all(line)             │◄── outbound queue ◄── call() / respond()
//!            └─────────────────────────────┘
//! ```
//!
//! The outbound queue is bounded. A peer that stops reading fills it, and
//! further sends fail with [`SdkError::QueueFull`] instead of buffering
//! without limit. Lines the reader cannot parse are answered from the
//! reader task with a JSON-RPC parse or invalid-request error.

use std::collections::HashSet;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use rpcsensor_models::{OutboundCall, Procedure};
use serde_json::Value;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::error::SdkError;
use crate::jsonrpc::{self, Message, Request, Response};
use crate::transport::{Inbound, RequestId, RpcFailure, RpcTransport};

/// Messages that may wait for the writer task before sends start failing.
pub const OUTGOING_QUEUE_CAPACITY: usize = 256;

/// Pause after a failed `accept` (e.g. out of file descriptors).
const ACCEPT_RETRY_DELAY: Duration = Duration::from_millis(50);

// ---------------------------------------------------------------------------
// JsonRpcListener
// ---------------------------------------------------------------------------

/// Accepts connections on a background task and hands them out without
/// blocking.
pub struct JsonRpcListener {
    local_addr: SocketAddr,
    incoming: mpsc::UnboundedReceiver<JsonRpcConnection>,
    accept_task: JoinHandle<()>,
}

impl JsonRpcListener {
    /// Bind to `addr` and start accepting.
    pub async fn bind(addr: SocketAddr) -> Result<Self, SdkError> {
        let listener = TcpListener::bind(addr).await?;
        let local_addr = listener.local_addr()?;
        let (tx, incoming) = mpsc::unbounded_channel();

        let accept_task = tokio::spawn(async move {
            loop {
                let (stream, peer) = accept_with_backoff(|| listener.accept()).await;
                debug!(%peer, "tcp connection accepted");
                if let Err(e) = stream.set_nodelay(true) {
                    warn!(%peer, error = %e, "failed to disable nagle");
                }
                if tx.send(JsonRpcConnection::spawn(stream, peer)).is_err() {
                    break;
                }
            }
        });

        info!(%local_addr, "json-rpc listener bound");
        Ok(Self {
            local_addr,
            incoming,
            accept_task,
        })
    }

    /// Address actually bound (useful with port `0`).
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Next accepted connection, if any. Never blocks.
    pub fn accept(&mut self) -> Option<JsonRpcConnection> {
        self.incoming.try_recv().ok()
    }
}

impl Drop for JsonRpcListener {
    fn drop(&mut self) {
        self.accept_task.abort();
    }
}

/// Retry `accept` until it succeeds, sleeping [`ACCEPT_RETRY_DELAY`] after
/// each failure.
async fn accept_with_backoff<T, F, Fut>(mut accept: F) -> T
where
    F: FnMut() -> Fut,
    Fut: Future<Output = std::io::Result<T>>,
{
    loop {
        match accept().await {
            Ok(accepted) => return accepted,
            Err(e) => {
                warn!(error = %e, retry_ms = ACCEPT_RETRY_DELAY.as_millis(), "accept failed");
                tokio::time::sleep(ACCEPT_RETRY_DELAY).await;
            }
        }
    }
}

// ---------------------------------------------------------------------------
// JsonRpcConnection
// ---------------------------------------------------------------------------

/// One JSON-RPC peer.
pub struct JsonRpcConnection {
    peer: SocketAddr,
    outgoing: mpsc::Sender<String>,
    incoming: mpsc::UnboundedReceiver<Message>,
    connected: Arc<AtomicBool>,
    receivers: HashSet<Procedure>,
    reader_task: JoinHandle<()>,
    writer_task: JoinHandle<()>,
}

impl JsonRpcConnection {
    /// Connect to a listening peer.
    pub async fn connect(addr: SocketAddr) -> Result<Self, SdkError> {
        let stream = TcpStream::connect(addr).await?;
        stream.set_nodelay(true)?;
        info!(peer = %addr, "connected");
        Ok(Self::spawn(stream, addr))
    }

    fn spawn(stream: TcpStream, peer: SocketAddr) -> Self {
        let (read_half, mut write_half) = stream.into_split();
        let connected = Arc::new(AtomicBool::new(true));
        let (in_tx, incoming) = mpsc::unbounded_channel();
        let (outgoing, mut out_rx) = mpsc::channel::<String>(OUTGOING_QUEUE_CAPACITY);

        let reader_connected = Arc::clone(&connected);
        let replies = outgoing.clone();
        let reader_task = tokio::spawn(async move {
            let mut lines = BufReader::new(read_half).lines();
            loop {
                match lines.next_line().await {
                    Ok(Some(line)) if line.trim().is_empty() => {}
                    Ok(Some(line)) => match jsonrpc::parse(&line) {
                        Ok(message) => {
                            if in_tx.send(message).is_err() {
                                break;
                            }
                        }
                        Err(e) => {
                            warn!(%peer, error = %e, "dropping unreadable message");
                            reject(&replies, peer, &line, &e);
                        }
                    },
                    Ok(None) => {
                        debug!(%peer, "peer closed the connection");
                        break;
                    }
                    Err(e) => {
                        debug!(%peer, error = %e, "read failed");
                        break;
                    }
                }
            }
            reader_connected.store(false, Ordering::Release);
        });

        let writer_connected = Arc::clone(&connected);
        let writer_task = tokio::spawn(async move {
            while let Some(line) = out_rx.recv().await {
                if let Err(e) = write_half.write_all(line.as_bytes()).await {
                    debug!(%peer, error = %e, "write failed");
                    break;
                }
            }
            writer_connected.store(false, Ordering::Release);
        });

        Self {
            peer,
            outgoing,
            incoming,
            connected,
            receivers: HashSet::new(),
            reader_task,
            writer_task,
        }
    }

    /// Remote address.
    pub fn peer(&self) -> SocketAddr {
        self.peer
    }

    fn send_line(&self, line: String) -> Result<(), SdkError> {
        if !self.is_connected() {
            return Err(SdkError::Disconnected);
        }
        enqueue(&self.outgoing, line)
    }

    /// Route a request: registered procedures go up to the caller, anything
    /// else is refused here.
    fn accept_request(&self, request: Request) -> Option<Inbound> {
        let registered = request
            .method
            .parse::<Procedure>()
            .is_ok_and(|p| self.receivers.contains(&p));
        if registered {
            return Some(Inbound::Call {
                procedure: request.method,
                arguments: request.params,
                request: request.id,
            });
        }
        warn!(peer = %self.peer, method = %request.method, "call to unregistered procedure");
        if let Some(id) = request.id {
            let answer = Response::new(id, Err(RpcFailure::method_not_found(&request.method)));
            if let Err(e) = jsonrpc::to_line(&answer).and_then(|line| self.send_line(line)) {
                debug!(peer = %self.peer, error = %e, "could not refuse call");
            }
        }
        None
    }
}

fn enqueue(queue: &mpsc::Sender<String>, line: String) -> Result<(), SdkError> {
    queue.try_send(line).map_err(|e| match e {
        TrySendError::Full(_) => SdkError::QueueFull(OUTGOING_QUEUE_CAPACITY),
        TrySendError::Closed(_) => SdkError::Disconnected,
    })
}

/// Answer a line the reader could not parse, when an answer is owed.
fn reject(replies: &mpsc::Sender<String>, peer: SocketAddr, line: &str, reason: &SdkError) {
    let Some(answer) = jsonrpc::rejection(line, reason) else {
        return;
    };
    if let Err(e) = jsonrpc::to_line(&answer).and_then(|answer| enqueue(replies, answer)) {
        debug!(%peer, error = %e, "could not reject message");
    }
}

impl RpcTransport for JsonRpcConnection {
    fn register_receiver(&mut self, procedure: Procedure) {
        self.receivers.insert(procedure);
    }

    fn call(&mut self, call: &OutboundCall) -> Result<(), SdkError> {
        self.send_line(jsonrpc::to_line(&Request::from(call))?)
    }

    fn respond(&mut self, request: RequestId, response: Result<Value, RpcFailure>) -> Result<(), SdkError> {
        self.send_line(jsonrpc::to_line(&Response::new(request, response))?)
    }

    fn pump(&mut self) -> Vec<Inbound> {
        let mut inbound = Vec::new();
        while let Ok(message) = self.incoming.try_recv() {
            match message {
                Message::Request(request) => inbound.extend(self.accept_request(request)),
                Message::Response(response) => match response.into_outcome() {
                    Ok(outcome) => inbound.push(Inbound::Outcome(outcome)),
                    Err(response) => {
                        warn!(peer = %self.peer, id = ?response.id, "response without a usable id discarded");
                    }
                },
            }
        }
        inbound
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }
}

impl Drop for JsonRpcConnection {
    fn drop(&mut self) {
        self.reader_task.abort();
        self.writer_task.abort();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rpcsensor_models::{CallOutcome, RemoteEvent, RemoteSensorData};
    use serde_json::json;
    use std::time::Instant;

    async fn loopback() -> (JsonRpcConnection, JsonRpcConnection) {
        let mut listener = JsonRpcListener::bind("127.0.0.1:0".parse().unwrap()).await.unwrap();
        let client = JsonRpcConnection::connect(listener.local_addr()).await.unwrap();
        let server = loop {
            if let Some(conn) = listener.accept() {
                break conn;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        };
        (server, client)
    }

    async fn pump_until(conn: &mut JsonRpcConnection, count: usize) -> Vec<Inbound> {
        let mut got = Vec::new();
        for _ in 0..200 {
            got.extend(conn.pump());
            if got.len() >= count {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        got
    }

    #[tokio::test]
    async fn registered_call_reaches_receiver() {
        let (mut server, mut client) = loopback().await;
        server.register_receiver(Procedure::UpdateEvent);

        client
            .call(&OutboundCall::update_event(RemoteEvent::WarningLampClicked))
            .unwrap();

        let got = pump_until(&mut server, 1).await;
        assert_eq!(got.len(), 1);
        let Inbound::Call { procedure, arguments, request } = &got[0] else {
            panic!("expected a call");
        };
        assert_eq!(procedure, "updateEvent");
        assert_eq!(arguments, &vec![serde_json::json!(0)]);
        assert_eq!(request.as_ref().and_then(jsonrpc::Id::as_call_id), Some(1));
    }

    #[tokio::test]
    async fn response_is_correlated_by_id() {
        let (mut server, mut client) = loopback().await;
        client.register_receiver(Procedure::UpdateSensorData);

        let call = OutboundCall::update_sensor_data(&RemoteSensorData::default())
            .unwrap()
            .with_id(77);
        server.call(&call).unwrap();

        let got = pump_until(&mut client, 1).await;
        let Inbound::Call { request: Some(id), .. } = &got[0] else {
            panic!("expected a call with id");
        };
        client.respond(id.clone(), Ok(Value::Null)).unwrap();

        let got = pump_until(&mut server, 1).await;
        assert_eq!(
            got,
            vec![Inbound::Outcome(CallOutcome::Result { id: 77, payload: Value::Null })]
        );
    }

    #[tokio::test]
    async fn unregistered_call_is_refused() {
        let (mut server, mut client) = loopback().await;
        client
            .call(&OutboundCall::update_altitude_agl(Some(100.0)))
            .unwrap();

        // The server never sees the call ...
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(server.pump().is_empty());

        // ... and the client gets method-not-found for id 0.
        let got = pump_until(&mut client, 1).await;
        let [Inbound::Outcome(CallOutcome::Error { id, code, .. })] = got.as_slice() else {
            panic!("expected an error outcome, got {got:?}");
        };
        assert_eq!(*id, 0);
        assert_eq!(*code, jsonrpc::METHOD_NOT_FOUND);
    }

    #[tokio::test]
    async fn unparsable_request_is_answered() {
        let mut listener = JsonRpcListener::bind("127.0.0.1:0".parse().unwrap()).await.unwrap();
        let raw = TcpStream::connect(listener.local_addr()).await.unwrap();
        let (read_half, mut write_half) = raw.into_split();
        let mut answers = BufReader::new(read_half).lines();

        write_half
            .write_all(b"{\"jsonrpc\":\"2.0\",\"method\":\"updateEvent\",\"params\":{\"a\":1},\"id\":4}\n")
            .await
            .unwrap();
        let answer = tokio::time::timeout(Duration::from_secs(2), answers.next_line())
            .await
            .unwrap()
            .unwrap()
            .unwrap();
        let answer: Value = serde_json::from_str(&answer).unwrap();
        assert_eq!(answer["error"]["code"], json!(jsonrpc::INVALID_REQUEST));
        assert_eq!(answer["id"], json!(4));

        write_half.write_all(b"not json\n").await.unwrap();
        let answer = tokio::time::timeout(Duration::from_secs(2), answers.next_line())
            .await
            .unwrap()
            .unwrap()
            .unwrap();
        let answer: Value = serde_json::from_str(&answer).unwrap();
        assert_eq!(answer["error"]["code"], json!(jsonrpc::PARSE_ERROR));
        assert_eq!(answer["id"], Value::Null);

        // The connection survives both.
        assert!(listener.accept().is_some_and(|conn| conn.is_connected()));
    }

    #[tokio::test]
    async fn stalled_peer_fills_the_queue() {
        let raw = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let mut client = JsonRpcConnection::connect(raw.local_addr().unwrap()).await.unwrap();
        // Accepted but never read.
        let (_held, _) = raw.accept().await.unwrap();

        let call = OutboundCall {
            procedure: Procedure::SetGenericValues,
            arguments: vec![json!("x".repeat(64 * 1024))],
            id: Procedure::SetGenericValues.default_id(),
        };
        let mut refused = None;
        for sent in 0..100_000 {
            match client.call(&call) {
                Ok(()) => tokio::task::yield_now().await,
                Err(e) => {
                    refused = Some((sent, e));
                    break;
                }
            }
        }

        let Some((sent, SdkError::QueueFull(capacity))) = refused else {
            panic!("expected the queue to fill, got {refused:?}");
        };
        assert_eq!(capacity, OUTGOING_QUEUE_CAPACITY);
        assert!(sent >= OUTGOING_QUEUE_CAPACITY);
        assert!(client.is_connected());
    }

    #[tokio::test]
    async fn accept_failures_back_off() {
        let started = Instant::now();
        let mut attempts = 0;
        let accepted = accept_with_backoff(|| {
            attempts += 1;
            let result = if attempts <= 3 {
                Err(std::io::Error::other("too many open files"))
            } else {
                Ok(attempts)
            };
            async move { result }
        })
        .await;

        assert_eq!(accepted, 4);
        assert!(started.elapsed() >= ACCEPT_RETRY_DELAY * 3);
    }

    #[tokio::test]
    async fn disconnect_is_reported() {
        let (server, client) = loopback().await;
        drop(client);
        for _ in 0..200 {
            if !server.is_connected() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        assert!(!server.is_connected());
    }
}
