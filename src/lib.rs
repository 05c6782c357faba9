//! Durable, ordered key-value store. The index and durable log live in [`server`], [`index`],
//! and [`log`]; [`net`] and [`protocol`] carry requests to it over TCP.

pub mod applier;
pub mod display;
pub mod error;
pub mod frame;
pub mod index;
pub mod log;
pub mod net;
pub mod protocol;
pub mod record;
pub mod recovery;
pub mod server;

pub use error::{Error, Result};
pub use record::{Key, MutationRecord, Value};
pub use server::Server;
