pub mod inbound;
pub mod outbound;

pub use inbound::TransactionSyncApi;
pub use outbound::VersionFingerprinter;
