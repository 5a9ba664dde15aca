//! Record storage for Staybnb.
//!
//! Each [`Table`] owns one record type behind an async lock. Ids are
//! assigned by the table, sequentially from 1, and never reused.

mod table;

pub use table::{ReadView, RecordId, Table, Transaction};
