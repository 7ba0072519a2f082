mod types;

pub use types::{Message, Role};

/// In-memory conversation log, oldest first. Lives as long as the process.
#[derive(Debug, Clone, Default)]
pub struct ConversationHistory {
    messages: Vec<Message>,
}

impl ConversationHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Keeps only the most recent `max_size` messages.
    pub fn trim(&mut self, max_size: usize) {
        if self.messages.len() > max_size {
            let excess = self.messages.len() - max_size;
            self.messages.drain(..excess);
        }
    }

    pub fn snapshot(&self) -> &[Message] {
        &self.messages
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbered(n: usize) -> ConversationHistory {
        let mut history = ConversationHistory::new();
        for i in 1..=n {
            history.append(Message::user(format!("m{i}")));
        }
        history
    }

    fn contents(history: &ConversationHistory) -> Vec<&str> {
        history
            .snapshot()
            .iter()
            .map(|m| m.content.as_str())
            .collect()
    }

    #[test]
    fn trim_keeps_most_recent_suffix() {
        let mut history = numbered(6);
        history.trim(3);
        assert_eq!(contents(&history), ["m4", "m5", "m6"]);
    }

    #[test]
    fn trim_below_limit_is_noop() {
        let mut history = numbered(2);
        history.trim(5);
        assert_eq!(contents(&history), ["m1", "m2"]);
    }

    #[test]
    fn bound_holds_after_every_append_then_trim() {
        let mut history = ConversationHistory::new();
        for size in [1usize, 3, 10] {
            for i in 0..25 {
                history.append(Message::assistant(format!("{size}-{i}")));
                history.trim(size);
                assert!(history.len() <= size);
            }
            assert_eq!(history.last().map(|m| m.content.clone()), Some(format!("{size}-24")));
        }
    }

    #[test]
    fn shrinking_limit_applies_on_next_trim() {
        let mut history = numbered(10);
        history.trim(10);
        assert_eq!(history.len(), 10);

        history.append(Message::assistant("reply"));
        history.trim(4);
        assert_eq!(contents(&history), ["m8", "m9", "m10", "reply"]);
    }
}
