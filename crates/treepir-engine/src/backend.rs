//! Engine seam used by the benchmark workers
//!
//! A worker only needs four things from an engine: a session sized for its
//! database (context, server, client and key exchange), a way to load and
//! preprocess the database, the location of an item, and one
//! query -> reply -> decode round trip.

use std::sync::Arc;

use treepir_core::PirParams;

use crate::client::PirClient;
use crate::context::{build_params, EngineContext};
use crate::error::{EngineError, Result};
use crate::messages::{plaintext_to_bytes, CommunicationCost};
use crate::server::PirServer;

/// Where an item ends up in the decoded plaintext
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemLocation {
    /// Item index in the database
    pub index: u64,
    /// Plaintext the query selects
    pub plaintext_index: usize,
    /// Item slot inside that plaintext, in units of `item_size`
    pub offset: usize,
}

pub trait PirEngine: Sync {
    type Session: PirSession;

    fn name(&self) -> &'static str;

    /// Build context, server and client for one worker and exchange keys
    fn open_session(&self, item_count: u64, item_size: usize) -> Result<Self::Session>;
}

pub trait PirSession {
    /// Hand the database to the server and preprocess it
    fn load_database(&mut self, database: Vec<u8>) -> Result<()>;

    fn locate(&self, index: u64) -> Result<ItemLocation>;

    /// Query, reply, decode and convert to bytes
    ///
    /// Returns the whole decoded plaintext; the item sits at
    /// `location.offset * item_size`.
    fn round_trip(&mut self, location: &ItemLocation) -> Result<Vec<u8>>;
}

/// The LWE engine
#[derive(Debug, Clone)]
pub struct LwePirEngine {
    params: PirParams,
}

impl LwePirEngine {
    pub fn new(params: PirParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &PirParams {
        &self.params
    }
}

pub struct LweSession {
    client_id: u32,
    ctx: Arc<EngineContext>,
    server: PirServer,
    client: PirClient,
}

impl PirEngine for LwePirEngine {
    type Session = LweSession;

    fn name(&self) -> &'static str {
        "lwe"
    }

    fn open_session(&self, item_count: u64, item_size: usize) -> Result<LweSession> {
        let ctx = build_params(&self.params, item_count, item_size)?;
        let server = PirServer::new(ctx.clone());
        let client = PirClient::new(ctx.clone())?;

        let mut session = LweSession {
            client_id: 0,
            ctx,
            server,
            client,
        };
        let key = session.client.evaluation_key();
        session.server.set_evaluation_key(session.client_id, key)?;
        Ok(session)
    }
}

impl PirSession for LweSession {
    fn load_database(&mut self, database: Vec<u8>) -> Result<()> {
        let layout = self.ctx.layout;
        self.server
            .set_database(database, layout.item_count as u64, layout.item_size)?;
        self.server.preprocess_database()?;
        let hint = self.server.hint(self.client_id)?;
        self.client.set_hint(hint)
    }

    fn locate(&self, index: u64) -> Result<ItemLocation> {
        Ok(ItemLocation {
            index,
            plaintext_index: self.client.plaintext_index(index)?,
            offset: self.client.plaintext_offset(index)?,
        })
    }

    fn round_trip(&mut self, location: &ItemLocation) -> Result<Vec<u8>> {
        let query = self.client.generate_query(location.plaintext_index)?;
        let reply = self.server.generate_reply(&query, self.client_id)?;
        tracing::trace!(
            query_bytes = query.size_bytes(),
            reply_bytes = reply.size_bytes(),
            "Round trip"
        );
        let plaintext = self.client.decode_reply(&reply)?;
        Ok(plaintext_to_bytes(&plaintext))
    }
}

/// Non-private pass-through engine
///
/// Returns the requested item directly. Useful to measure the orchestration
/// overhead alone and for dry runs of large rounds.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainEngine;

pub struct PlainSession {
    item_count: u64,
    item_size: usize,
    database: Option<Vec<u8>>,
}

impl PirEngine for PlainEngine {
    type Session = PlainSession;

    fn name(&self) -> &'static str {
        "plain"
    }

    fn open_session(&self, item_count: u64, item_size: usize) -> Result<PlainSession> {
        if item_count == 0 {
            return Err(EngineError::EmptyDatabase);
        }
        if item_size == 0 {
            return Err(EngineError::InvalidItemSize(item_size));
        }
        Ok(PlainSession {
            item_count,
            item_size,
            database: None,
        })
    }
}

impl PirSession for PlainSession {
    fn load_database(&mut self, database: Vec<u8>) -> Result<()> {
        let expected = self.item_count as usize * self.item_size;
        if database.len() != expected {
            return Err(EngineError::DatabaseSizeMismatch {
                expected,
                actual: database.len(),
            });
        }
        self.database = Some(database);
        Ok(())
    }

    fn locate(&self, index: u64) -> Result<ItemLocation> {
        if index >= self.item_count {
            return Err(EngineError::IndexOutOfRange {
                index,
                max: self.item_count,
            });
        }
        Ok(ItemLocation {
            index,
            plaintext_index: index as usize,
            offset: 0,
        })
    }

    fn round_trip(&mut self, location: &ItemLocation) -> Result<Vec<u8>> {
        let database = self.database.as_ref().ok_or(EngineError::NoDatabase)?;
        let start = location.plaintext_index * self.item_size;
        Ok(database[start..start + self.item_size].to_vec())
    }
}
