use crossbeam_channel::{unbounded, Receiver, Sender};

use super::AppMessage;

/// MessageBus carries UI events and worker results to the app's update loop
pub struct MessageBus {
    sender: Sender<AppMessage>,
    receiver: Receiver<AppMessage>,
}

impl Default for MessageBus {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageBus {
    pub fn new() -> Self {
        let (sender, receiver) = unbounded();
        MessageBus { sender, receiver }
    }

    /// Get a sender that can be cloned and passed to widgets or worker threads
    pub fn sender(&self) -> Sender<AppMessage> {
        self.sender.clone()
    }

    /// Take up to `max_messages` pending messages
    pub fn drain(&self, max_messages: usize) -> Vec<AppMessage> {
        self.receiver.try_iter().take(max_messages).collect()
    }

    pub fn send(&self, msg: AppMessage) {
        // The bus owns the receiver, so sending cannot fail.
        self.sender.send(msg).ok();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drain_respects_the_limit_and_keeps_order() {
        let bus = MessageBus::new();
        bus.send(AppMessage::TogglePlayback);
        bus.sender().send(AppMessage::ToggleNote("C4".parse().unwrap())).unwrap();
        bus.send(AppMessage::SetOctaveScheme(Default::default()));

        let first = bus.drain(2);
        assert_eq!(first.len(), 2);
        assert!(matches!(first[0], AppMessage::TogglePlayback));
        assert!(matches!(first[1], AppMessage::ToggleNote(_)));
        let rest = bus.drain(2);
        assert_eq!(rest.len(), 1);
        assert!(matches!(rest[0], AppMessage::SetOctaveScheme(_)));
        assert!(bus.drain(2).is_empty());
    }
}
