use crate::core::chat::Chat;

/// Totals shown on the welcome screen and by `ponder stats`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ChatStats {
    pub total_chats: usize,
    pub total_messages: usize,
    /// Mean round-trip time of answered requests, rounded to whole
    /// milliseconds. Zero when nothing has been answered yet.
    pub average_response_time_ms: u64,
}

impl ChatStats {
    pub fn collect(chats: &[Chat]) -> Self {
        let mut total_messages = 0;
        let mut total_response_ms: u128 = 0;
        let mut responses: u128 = 0;

        for chat in chats {
            total_messages += chat.turns.len();
            let timings = chat
                .turns
                .iter()
                .filter(|turn| turn.is_assistant())
                .filter_map(|turn| turn.reasoning_elapsed_ms)
                .filter(|ms| *ms > 0);
            for ms in timings {
                total_response_ms += u128::from(ms);
                responses += 1;
            }
        }

        let average_response_time_ms = if responses == 0 {
            0
        } else {
            ((total_response_ms + responses / 2) / responses) as u64
        };

        Self {
            total_chats: chats.len(),
            total_messages,
            average_response_time_ms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::chat::ChatId;
    use crate::core::message::Turn;
    use chrono::{TimeZone, Utc};

    #[test]
    fn empty_history_has_zero_average() {
        assert_eq!(ChatStats::collect(&[]), ChatStats::default());
    }

    #[test]
    fn averages_only_timed_assistant_turns() {
        let now = Utc.timestamp_millis_opt(0).unwrap();
        let mut first = Chat::new(ChatId::from("1"), "a", now);
        first.turns.push(Turn::user("q", now));
        first
            .turns
            .push(Turn::assistant("a", now).with_reasoning("", 100));
        first
            .turns
            .push(Turn::assistant("legacy without timing", now));

        let mut second = Chat::new(ChatId::from("2"), "b", now);
        second.turns.push(Turn::user("q", now));
        second
            .turns
            .push(Turn::assistant("a", now).with_reasoning("t", 201));
        second
            .turns
            .push(Turn::assistant("zero", now).with_reasoning("", 0));

        let stats = ChatStats::collect(&[first, second]);
        assert_eq!(stats.total_chats, 2);
        assert_eq!(stats.total_messages, 6);
        assert_eq!(stats.average_response_time_ms, 151);
    }
}
