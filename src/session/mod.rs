pub mod commands;
pub mod controller;
pub mod entry;
pub mod ledger;
pub mod ranker;

pub use controller::{SessionController, SessionSnapshot};
pub use ledger::{LedgerError, SessionLedger};
