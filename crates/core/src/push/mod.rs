//! Push delivery: message/ticket/receipt types, the provider seam, and the dispatcher.

mod chunking;
mod dispatcher;
mod mock_provider;
mod push_model;
mod push_traits;

pub use chunking::chunk_contiguous;
pub use dispatcher::{DispatchSummary, PushDispatcher};
pub use mock_provider::MockPushProvider;
pub use push_model::{
    ChunkSizes, Priority, PushErrorCode, PushMessage, PushReceipt, PushTicket,
    DEFAULT_MESSAGE_CHUNK_SIZE, DEFAULT_RECEIPT_CHUNK_SIZE, PAYLOAD_ENVELOPE_KEY,
};
pub use push_traits::PushProvider;
