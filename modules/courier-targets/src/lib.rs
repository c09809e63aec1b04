//! Concrete publish targets: the served feed store and a generic chat
//! webhook.

mod chat_webhook;
mod feed_target;

pub use chat_webhook::ChatWebhookTarget;
pub use feed_target::FeedTarget;
