// ABOUTME: Registry of live streamable HTTP sessions keyed by session token
// ABOUTME: Two-phase session creation, idempotent removal, self-removal on close, bounded shutdown drain
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Session Registry
//!
//! Sessions are created in two phases. [`SessionRegistry::begin`] builds a
//! [`PendingSession`] whose transport is bound to a freshly created provider
//! and can process the initialize handshake. Once the handshake has minted a
//! token, [`SessionRegistry::commit`] inserts the transport under that token
//! and installs a close hook so the transport removes its own entry when it
//! closes. The hook holds only a weak reference to the map.
//!
//! [`SessionRegistry::close_all`] first marks the registry as draining. From
//! then on `commit` refuses new sessions, so the drain ends with an empty map.

use super::streamable_http::StreamableHttpTransport;
use crate::errors::{AppError, AppResult, ErrorCode};
use crate::logging::AppLogger;
use dashmap::DashMap;
use futures_util::future::join_all;
use oura_providers::ProviderFactory;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;
use tracing::{info, warn};

type SessionMap = DashMap<String, Arc<StreamableHttpTransport>>;

/// Transport created by [`SessionRegistry::begin`] and not yet registered
pub struct PendingSession {
    transport: Arc<StreamableHttpTransport>,
}

impl PendingSession {
    /// Transport that processes the handshake
    #[must_use]
    pub const fn transport(&self) -> &Arc<StreamableHttpTransport> {
        &self.transport
    }
}

/// Outcome of [`SessionRegistry::close_all`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrainReport {
    /// Sessions that closed within the timeout
    pub closed: usize,
    /// Sessions dropped after their close timed out
    pub timed_out: usize,
}

/// Live sessions keyed by token; clones share the same map
#[derive(Clone)]
pub struct SessionRegistry {
    sessions: Arc<SessionMap>,
    factory: Arc<dyn ProviderFactory>,
    draining: Arc<AtomicBool>,
}

impl SessionRegistry {
    /// Empty registry creating providers with `factory`
    #[must_use]
    pub fn new(factory: Arc<dyn ProviderFactory>) -> Self {
        Self {
            sessions: Arc::new(DashMap::new()),
            factory,
            draining: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Whether [`Self::close_all`] has started; no session can be committed after that
    #[must_use]
    pub fn is_draining(&self) -> bool {
        self.draining.load(Ordering::SeqCst)
    }

    /// Build an unregistered transport bound to a new provider
    #[must_use]
    pub fn begin(&self) -> PendingSession {
        PendingSession {
            transport: Arc::new(StreamableHttpTransport::new(self.factory.create())),
        }
    }

    /// Register a pending session under the token its handshake minted.
    ///
    /// # Errors
    ///
    /// Fails with [`ErrorCode::ResourceUnavailable`] once the registry is
    /// draining. Also fails if the handshake did not produce a token, or if
    /// the token is already registered.
    pub fn commit(&self, pending: PendingSession) -> AppResult<String> {
        if self.is_draining() {
            return Err(shutting_down());
        }
        let transport = pending.transport;
        let token = transport
            .session_id()
            .ok_or_else(|| AppError::internal("Session handshake did not produce a session id"))?
            .to_owned();

        let weak: Weak<SessionMap> = Arc::downgrade(&self.sessions);
        transport.set_on_close(Box::new(move |token: &str| {
            if let Some(sessions) = weak.upgrade() {
                if sessions.remove(token).is_some() {
                    AppLogger::log_session_event(token, "removed", sessions.len());
                }
            }
        }));

        match self.sessions.entry(token.clone()) {
            dashmap::mapref::entry::Entry::Occupied(_) => {
                return Err(AppError::internal(format!(
                    "Session id {token} is already registered"
                )));
            }
            dashmap::mapref::entry::Entry::Vacant(slot) => {
                slot.insert(transport);
            }
        }

        // close_all may have started between the check above and the insert
        if self.is_draining() {
            self.sessions.remove(&token);
            return Err(shutting_down());
        }

        AppLogger::log_session_event(&token, "created", self.sessions.len());
        Ok(token)
    }

    /// Transport registered under `token`
    #[must_use]
    pub fn lookup(&self, token: &str) -> Option<Arc<StreamableHttpTransport>> {
        self.sessions.get(token).map(|entry| Arc::clone(entry.value()))
    }

    /// Remove `token`; returns whether an entry was present
    pub fn delete(&self, token: &str) -> bool {
        self.sessions.remove(token).is_some()
    }

    /// Number of live sessions
    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Whether no session is live
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Tokens of all live sessions
    #[must_use]
    pub fn tokens(&self) -> Vec<String> {
        self.sessions.iter().map(|entry| entry.key().clone()).collect()
    }

    /// Stop accepting sessions, then close every live one, each bounded by
    /// `timeout`, until the registry is empty.
    ///
    /// A session whose close does not finish in time is removed anyway.
    pub async fn close_all(&self, timeout: Duration) -> DrainReport {
        self.draining.store(true, Ordering::SeqCst);
        let mut report = DrainReport::default();

        loop {
            let live: Vec<(String, Arc<StreamableHttpTransport>)> = self
                .sessions
                .iter()
                .map(|entry| (entry.key().clone(), Arc::clone(entry.value())))
                .collect();
            if live.is_empty() {
                return report;
            }
            info!("Closing {} MCP sessions", live.len());

            let outcomes = join_all(live.into_iter().map(|(token, transport)| async move {
                let finished = tokio::time::timeout(timeout, transport.close()).await.is_ok();
                if !finished {
                    warn!(
                        mcp_session = %token,
                        "Session did not close within {}s, dropping it",
                        timeout.as_secs()
                    );
                }
                self.sessions.remove(&token);
                finished
            }))
            .await;

            let closed = outcomes.iter().filter(|finished| **finished).count();
            report.closed += closed;
            report.timed_out += outcomes.len() - closed;
        }
    }
}

fn shutting_down() -> AppError {
    AppError::new(ErrorCode::ResourceUnavailable, "Server is shutting down")
}
