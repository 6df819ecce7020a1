//! The set of live sessions, owned by the control loop.

use std::time::Instant;

use rpcsensor_sdk::RpcTransport;
use tracing::info;

use crate::config::SessionConfig;
use crate::session::{Session, SessionState};
use crate::source::DataSource;

/// Active sessions in accept order.
///
/// Only the control loop touches the registry: sessions are inserted on
/// accept and dropped, together with their connection, on the tick they
/// close.
pub struct SessionRegistry<T, S> {
    sessions: Vec<Session<T, S>>,
    next_id: u64,
    config: SessionConfig,
}

impl<T: RpcTransport, S: DataSource> SessionRegistry<T, S> {
    /// Empty registry; every inserted session runs with `config`.
    pub fn new(config: SessionConfig) -> Self {
        Self {
            sessions: Vec::new(),
            next_id: 1,
            config,
        }
    }

    /// Start a session for a new connection and return its id.
    pub fn insert(&mut self, transport: T, source: S, now: Instant) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.sessions.push(Session::new(id, transport, source, self.config, now));
        id
    }

    /// Tick every session once, then drop the ones that closed.
    pub fn tick_all(&mut self, now: Instant) {
        self.sessions.retain_mut(|session| match session.tick(now) {
            SessionState::Active => true,
            SessionState::Closed => {
                info!(
                    session = session.id(),
                    altitude_agl = ?session.altitude_agl(),
                    unanswered = session.unanswered_calls(),
                    "session removed"
                );
                false
            }
        });
    }

    /// Number of live sessions.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// `true` when no consumer is connected.
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    #[cfg(test)]
    fn ids(&self) -> impl Iterator<Item = u64> + '_ {
        self.sessions.iter().map(Session::id)
    }

    #[cfg(test)]
    fn states(&self) -> Vec<SessionState> {
        self.sessions.iter().map(Session::state).collect()
    }
}
