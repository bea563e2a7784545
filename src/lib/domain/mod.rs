pub mod encoding;
pub mod group;
pub mod ledger;
pub mod proof;
pub mod submission;
