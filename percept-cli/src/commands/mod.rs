pub mod catalog;
pub mod config;
pub mod ledger;
pub mod results;
pub mod serve;
