//! Message routing: classify every decoded payload, forward data-plane
//! requests to the best worker, and feed control payloads to the dispatcher.

mod message_router;
mod pipeline;

pub use message_router::MessageRouter;
pub use pipeline::ClientPipeline;
