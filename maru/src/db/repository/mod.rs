mod conversations;
mod sessions;

pub use conversations::ConversationRepository;
pub use sessions::SessionRepository;
