//! `lineserv`: a long-running TCP server that answers one question against
//! a static text corpus — does the client's query appear as an exact,
//! whole-line match? See the module docs on [`server`] for the runtime
//! entry points (`Server::new`, `Server::start`, `Server::stop`).

pub mod config;
pub mod corpus;
pub mod error;
pub mod net;
pub mod search;
pub mod server;
pub mod tls;

pub use config::{ConfigOverrides, ConfigSnapshot};
pub use corpus::CorpusSnapshot;
pub use error::{Result, ServerError};
pub use search::Algorithm;
pub use server::{Server, ServerOptions};
