mod dispatcher;
mod target;

pub use dispatcher::Dispatcher;
pub use target::Target;
