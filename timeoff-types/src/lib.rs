#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! Event store vocabulary shared by the time-off core and store adapters.
//!
//! Keeping these types in their own crate lets store implementations depend
//! on the contract without pulling in the domain.
//!
//! # Overview
//!
//! - Traits: [`Event`], [`EventStore`]
//! - Stream types: [`StreamId`], [`StreamVersion`], [`StreamWrites`], [`StreamWriteEntry`]
//! - Read/append results: [`EventStreamReader`], [`EventStreamSlice`]
//! - Errors: [`EventStoreError`], [`Operation`]

mod event;
mod store;
mod validation;

pub use event::Event;
pub use store::{
    EventStore, EventStoreError, EventStreamReader, EventStreamSlice, Operation, StreamId,
    StreamIdError, StreamVersion, StreamWriteEntry, StreamWrites,
};
