mod message;
mod normalize;
mod traits;

pub use message::{ChatMessage, ChatRole, MessageId};
pub use normalize::{normalize, NormalizedReply, ReplyShape, EMPTY_REPLY_PLACEHOLDER};
pub use traits::{ReplyProvider, CONNECTION_TEST_PROMPT};
