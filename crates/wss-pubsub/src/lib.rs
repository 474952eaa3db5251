//! WSS Pub/Sub - envelope protocol over a message broker
//!
//! Messages arrive either through [`push_router`] or from a pull loop the
//! integrator owns, and are run through [`PubSubAdapter::handle`]. Event-mode
//! messages must name a return topic; the reply (event or manifest) is sent
//! there through a [`Publisher`].

pub mod adapter;
pub mod address;
pub mod message;
pub mod publisher;
pub mod push;

pub use adapter::{Delivery, MessageHandler, Outcome, PubSubAdapter};
pub use address::ReturnAddress;
pub use message::{InvocationMetadata, PubSubMessage};
pub use publisher::{Publisher, RestPublisher};
pub use push::{push_router, PushMessage, PushRequest};

// Re-export the error types adapter callers match on
pub use wss_core::{PublishError, WssError};
