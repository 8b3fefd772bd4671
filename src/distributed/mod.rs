//! Distributed dispatch through a shared coordination space.
//!
//! A client process registers [`DispatchBridge`] in its chain; every event is
//! copied into the space as a [`TupleMessage`]. Any number of [`Worker`]s take
//! tuples out, each tuple going to exactly one of them, and replay them
//! through their own handler chains. The space itself is a FIFO
//! [`TupleSpace`] served over TCP by [`SpaceServer`] and found by UDP
//! broadcast ([`discovery`]).

mod bridge;
pub mod discovery;
mod protocol;
mod remote;
mod server;
mod space;
mod worker;

pub use bridge::DispatchBridge;
pub use protocol::{Advert, Probe, Request, Response, TupleMessage, SERVICE_NAME};
pub use remote::SpaceClient;
pub use server::SpaceServer;
pub use space::TupleSpace;
pub use worker::Worker;
