//! Byte transfer: streams a URL to a file on disk and reports progress,
//! completion and failure as a stream of events.

mod client;
mod download;

pub use client::{TransferClient, TransferError};
pub use download::TransferEvent;
