use crate::state::ChatMessage;

/// Builds the full reply from deltas and keeps the final history snapshot
#[derive(Debug, Default)]
pub struct Aggregator {
    response: String,
    history: Option<Vec<ChatMessage>>,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append_delta(&mut self, text: &str) {
        self.response.push_str(text);
    }

    /// Last write wins if the backend sends more than one `complete`
    pub fn set_history(&mut self, history: Vec<ChatMessage>) {
        self.history = Some(history);
    }

    pub fn result(&self) -> (&str, &[ChatMessage]) {
        (&self.response, self.history.as_deref().unwrap_or_default())
    }

    pub fn into_result(self) -> (String, Vec<ChatMessage>) {
        (self.response, self.history.unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn concatenates_in_arrival_order() {
        let mut agg = Aggregator::new();
        for piece in ["Hel", "lo, ", "world"] {
            agg.append_delta(piece);
        }
        let (text, history) = agg.result();
        assert_eq!(text, "Hello, world");
        assert!(history.is_empty());
    }

    #[test]
    fn second_history_overwrites_first() {
        let mut agg = Aggregator::new();
        agg.set_history(vec![ChatMessage::user("first")]);
        agg.set_history(vec![ChatMessage::user("second"), ChatMessage::assistant("ok")]);

        let (_, history) = agg.into_result();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].content, "second");
    }
}
