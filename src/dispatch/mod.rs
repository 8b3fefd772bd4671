//! Event dispatch.
//!
//! Every event a session produces, inbound or outbound, goes through a
//! [`DispatchChain`]: an ordered list of [`Handler`]s. Each handler may let
//! the event continue or halt it. Failures are contained per handler.

mod chain;
mod event;
mod handler;
mod routes;

pub use chain::{Delivery, DispatchChain};
pub use event::{incoming, names, Event, Fields};
pub use handler::{EventContext, Flow, Handler, HandlerResult};
pub use routes::Routes;
