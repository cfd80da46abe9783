//! treepir-engine: single-server LWE PIR
//!
//! A SimplePIR-style scheme over `Z_{2^32}`:
//!
//! 1. The database is laid out as a `rows x cols` byte matrix `D` (see
//!    [`DatabaseLayout`]).
//! 2. The client samples a secret `s` and a seed for a public matrix `A`
//!    (`cols x n`), and hands the seed to the server as its
//!    [`EvaluationKey`].
//! 3. Preprocessing computes the hint `H = D * A` for every registered client.
//! 4. A query for column `c` is `A * s + e + DELTA * u_c`.
//! 5. The reply is `D * query`; subtracting `H * s` leaves
//!    `DELTA * D[.., c] + D * e`, which rounds back to the column bytes.
//!
//! The [`backend`] module wraps this flow behind the [`PirEngine`] /
//! [`PirSession`] traits the benchmark workers consume.

pub mod backend;
mod client;
mod context;
mod error;
mod lwe;
mod messages;
mod server;

pub use backend::{ItemLocation, LwePirEngine, PirEngine, PirSession, PlainEngine};
pub use client::PirClient;
pub use context::{build_params, DatabaseLayout, EngineContext};
pub use error::{EngineError, Result};
pub use lwe::{Matrix, DELTA, PLAINTEXT_BITS};
pub use messages::{
    plaintext_to_bytes, CommunicationCost, EvaluationKey, Hint, Plaintext, Query, Reply,
};
pub use server::PirServer;
