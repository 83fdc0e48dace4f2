mod push;

pub use push::{IPushSender, PushError, StubPushSender, WebPushSender};
