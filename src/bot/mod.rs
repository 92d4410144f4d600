// Chat transport boundary
pub mod dispatch;
pub mod intent;
pub mod render;

pub use dispatch::Dispatcher;
pub use intent::{Command, InboundEvent, Intent};
pub use render::{Choice, Renderer, Reply, ReplyBuffer};
