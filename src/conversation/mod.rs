mod controller;
mod state;

pub use controller::ConversationController;
pub use state::Conversation;
