use std::error::Error;
use std::io::{self, Write};

use crate::core::app::bootstrap::open_session_store;
use crate::core::config::Config;
use crate::core::stats::ChatStats;

pub fn print_stats() -> Result<(), Box<dyn Error>> {
    let config = Config::load()?;
    let store = open_session_store(&config)?;
    write_stats(&mut io::stdout().lock(), &store.stats())?;
    Ok(())
}

pub fn write_stats<W: Write>(out: &mut W, stats: &ChatStats) -> io::Result<()> {
    writeln!(out, "Chats:            {}", stats.total_chats)?;
    writeln!(out, "Messages:         {}", stats.total_messages)?;
    writeln!(out, "Average response: {} ms", stats.average_response_time_ms)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stats_are_printed_one_per_line() {
        let stats = ChatStats {
            total_chats: 3,
            total_messages: 14,
            average_response_time_ms: 1250,
        };
        let mut out = Vec::new();
        write_stats(&mut out, &stats).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Chats:            3\nMessages:         14\nAverage response: 1250 ms\n"
        );
    }
}
