use std::sync::{Arc, Mutex};
use uuid::Uuid;

/// IdGenerator trait for abstracting logbook id generation
pub trait IdGenerator: Send + Sync {
    /// Generate a new unique logbook id
    fn new_id(&self) -> String;
}

/// Production implementation backed by random UUID v4 values
#[derive(Debug, Clone, Default)]
pub struct RandomIdGenerator;

impl RandomIdGenerator {
    pub fn new() -> Self {
        Self
    }
}

impl IdGenerator for RandomIdGenerator {
    fn new_id(&self) -> String {
        Uuid::new_v4().to_string()
    }
}

/// Deterministic generator for tests
///
/// Either replays a fixed list of ids (wrapping around) or, when built with
/// [`FixedIdGenerator::sequential`], yields `{prefix}-1`, `{prefix}-2`, ...
#[derive(Debug, Clone)]
pub struct FixedIdGenerator {
    ids: Vec<String>,
    prefix: Option<String>,
    index: Arc<Mutex<usize>>,
}

impl FixedIdGenerator {
    /// Replay the given ids in order, wrapping when exhausted
    pub fn new(ids: Vec<String>) -> Self {
        Self {
            ids,
            prefix: None,
            index: Arc::new(Mutex::new(0)),
        }
    }

    pub fn from_strings(ids: &[&str]) -> Self {
        Self::new(ids.iter().map(|s| s.to_string()).collect())
    }

    /// Generate `{prefix}-{n}` with n starting at 1
    pub fn sequential(prefix: impl Into<String>) -> Self {
        Self {
            ids: Vec::new(),
            prefix: Some(prefix.into()),
            index: Arc::new(Mutex::new(0)),
        }
    }

    /// Number of ids handed out so far
    pub fn issued(&self) -> usize {
        *self.index.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl IdGenerator for FixedIdGenerator {
    fn new_id(&self) -> String {
        let mut index = self.index.lock().unwrap_or_else(|e| e.into_inner());
        let current = *index;
        *index += 1;

        match (&self.prefix, self.ids.is_empty()) {
            (Some(prefix), _) => format!("{}-{}", prefix, current + 1),
            (None, false) => self.ids[current % self.ids.len()].clone(),
            (None, true) => format!("id-{}", current + 1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_id_generator() {
        let generator = RandomIdGenerator::new();

        let id1 = generator.new_id();
        let id2 = generator.new_id();

        let parsed = Uuid::parse_str(&id1).unwrap();
        assert_eq!(parsed.get_version_num(), 4);
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_fixed_id_generator_wraps() {
        let generator = FixedIdGenerator::from_strings(&["kitchen", "hallway"]);

        assert_eq!(generator.new_id(), "kitchen");
        assert_eq!(generator.new_id(), "hallway");
        assert_eq!(generator.new_id(), "kitchen");
        assert_eq!(generator.issued(), 3);
    }

    #[test]
    fn test_sequential_id_generator() {
        let generator = FixedIdGenerator::sequential("logbook");

        assert_eq!(generator.new_id(), "logbook-1");
        assert_eq!(generator.new_id(), "logbook-2");
    }

    #[test]
    fn test_id_generator_thread_safe() {
        use std::thread;

        let generator = Arc::new(FixedIdGenerator::sequential("spot"));

        let handles: Vec<_> = (0..10)
            .map(|_| {
                let gen = Arc::clone(&generator);
                thread::spawn(move || gen.new_id())
            })
            .collect();

        let mut results: Vec<String> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        results.sort();
        results.dedup();

        assert_eq!(results.len(), 10);
    }
}
