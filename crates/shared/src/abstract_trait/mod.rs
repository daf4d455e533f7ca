mod broker;

pub use self::broker::{DynMessageBroker, DynMessageHandler, MessageBrokerTrait, MessageHandlerTrait};
