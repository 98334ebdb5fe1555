//! multiverse - universes, families and the balance of family power
//!
//! A JSON-over-HTTP service over three related tables. Its core is the
//! balance engine: families sharing a `name_identifier` are one group, and a
//! group is balanced when every row carries the same `fam_power`.

pub mod balance;
pub mod cli;
pub mod http_server;
pub mod model;
pub mod observability;
pub mod resources;
pub mod store;
