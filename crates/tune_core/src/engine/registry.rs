//! Session Registry
//!
//! Hosts several independent training sessions, e.g. one per connected
//! trainee. Every session owns its own engine, state and random generator;
//! nothing is shared between entries.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::config::EngineConfig;
use super::control::ControlCommand;
use super::frame::Frame;
use super::session::TuningEngine;
use crate::error::{Result, TuningError};

/// Summary of a hosted session
#[derive(Debug, Clone, Serialize)]
pub struct SessionInfo {
    pub id: Uuid,
    pub seed: u64,
    pub created_at: DateTime<Utc>,
    pub epoch: u64,
    pub commands_applied: u64,
    pub best_reflection: f64,
}

struct SessionEntry {
    engine: TuningEngine,
    created_at: DateTime<Utc>,
    last_polled: Instant,
}

impl SessionEntry {
    fn touch(&mut self) -> &mut TuningEngine {
        self.last_polled = Instant::now();
        &mut self.engine
    }
}

pub struct SessionRegistry {
    config: EngineConfig,
    sessions: HashMap<Uuid, SessionEntry>,
}

impl SessionRegistry {
    /// Default idle TTL in seconds (1 hour)
    pub const DEFAULT_TTL_SECS: u64 = 3600;

    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, sessions: HashMap::new() })
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Start a session and return its id and first frame.
    pub fn create(&mut self, seed: u64) -> Result<(Uuid, Frame)> {
        let engine = TuningEngine::new(self.config.clone(), seed)?;
        let frame = engine.current_frame();
        let id = Uuid::new_v4();
        self.sessions.insert(
            id,
            SessionEntry { engine, created_at: Utc::now(), last_polled: Instant::now() },
        );
        tracing::info!(%id, seed, sessions = self.sessions.len(), "session created");
        Ok((id, frame))
    }

    fn entry(&mut self, id: Uuid) -> Result<&mut TuningEngine> {
        self.sessions
            .get_mut(&id)
            .map(SessionEntry::touch)
            .ok_or(TuningError::SessionNotFound(id))
    }

    pub fn apply(&mut self, id: Uuid, command: ControlCommand) -> Result<Frame> {
        Ok(self.entry(id)?.apply(command))
    }

    pub fn reset(&mut self, id: Uuid) -> Result<Frame> {
        Ok(self.entry(id)?.reset())
    }

    pub fn frame(&mut self, id: Uuid) -> Result<Frame> {
        Ok(self.entry(id)?.current_frame())
    }

    pub fn close(&mut self, id: Uuid) -> Result<()> {
        self.sessions.remove(&id).ok_or(TuningError::SessionNotFound(id))?;
        tracing::info!(%id, sessions = self.sessions.len(), "session closed");
        Ok(())
    }

    pub fn info(&self, id: Uuid) -> Result<SessionInfo> {
        let entry = self.sessions.get(&id).ok_or(TuningError::SessionNotFound(id))?;
        let state = entry.engine.state();
        Ok(SessionInfo {
            id,
            seed: entry.engine.seed(),
            created_at: entry.created_at,
            epoch: state.epoch(),
            commands_applied: state.commands_applied(),
            best_reflection: state.best_reflection(),
        })
    }

    /// Drop sessions idle for longer than the default TTL.
    pub fn evict_stale(&mut self) -> usize {
        self.evict_stale_with_ttl(Duration::from_secs(Self::DEFAULT_TTL_SECS))
    }

    /// Drop sessions not polled within `ttl`; returns how many were dropped.
    pub fn evict_stale_with_ttl(&mut self, ttl: Duration) -> usize {
        let before = self.sessions.len();
        self.sessions.retain(|id, entry| {
            let keep = entry.last_polled.elapsed() < ttl;
            if !keep {
                tracing::warn!(%id, idle_secs = entry.last_polled.elapsed().as_secs(), "evicting stale session");
            }
            keep
        });
        before - self.sessions.len()
    }
}
