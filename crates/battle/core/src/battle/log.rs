/// One line of battle narration.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LogEntry {
    pub index: u64,
    pub message: String,
}

/// Append-only, strictly increasing sequence of log entries.
#[derive(Clone, Debug, Default)]
pub struct BattleLog {
    entries: Vec<LogEntry>,
}

impl BattleLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `message` and returns its index.
    pub fn push(&mut self, message: impl Into<String>) -> u64 {
        let index = self.entries.len() as u64;
        self.entries.push(LogEntry {
            index,
            message: message.into(),
        });
        index
    }

    pub fn extend<I: IntoIterator<Item = String>>(&mut self, messages: I) {
        for message in messages {
            self.push(message);
        }
    }

    /// Entries with `index >= from`.
    pub fn since(&self, from: u64) -> &[LogEntry] {
        let start = usize::try_from(from).unwrap_or(usize::MAX).min(self.entries.len());
        &self.entries[start..]
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn last(&self) -> Option<&LogEntry> {
        self.entries.last()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indices_increase_and_since_slices() {
        let mut log = BattleLog::new();
        log.push("one");
        log.extend(["two".to_string(), "three".to_string()]);
        assert_eq!(log.since(1).len(), 2);
        assert_eq!(log.since(99).len(), 0);
        assert!(log.entries().windows(2).all(|w| w[0].index < w[1].index));
    }
}
