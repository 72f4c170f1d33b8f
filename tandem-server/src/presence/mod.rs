mod presence_notifier;

pub use presence_notifier::*;
