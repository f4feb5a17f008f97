pub mod broadcast_ctx;
pub mod broadcast_flow;

pub use broadcast_ctx::BroadcastCtx;
pub use broadcast_flow::BroadcastFlow;
