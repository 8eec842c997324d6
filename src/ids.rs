use chrono::Utc;
use rand::Rng;

/// Source of record identifiers.
pub trait IdGenerator {
    fn next_id(&mut self) -> String;
}

/// Base-36 millisecond timestamp followed by a random base-36 suffix.
///
/// Ids are not strictly ordered and carry no uniqueness guarantee beyond a
/// negligible collision probability; the store re-draws on collision.
#[derive(Debug, Default, Clone, Copy)]
pub struct TimeRandomIds;

const SUFFIX_LEN: usize = 9;
const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

impl IdGenerator for TimeRandomIds {
    fn next_id(&mut self) -> String {
        let millis = Utc::now().timestamp_millis().max(0) as u64;
        let mut id = to_base36(millis);
        let mut rng = rand::thread_rng();
        for _ in 0..SUFFIX_LEN {
            id.push(BASE36[rng.gen_range(0..BASE36.len())] as char);
        }
        id
    }
}

/// `prefix1`, `prefix2`, ... for callers that need reproducible ids.
#[derive(Debug, Clone)]
pub struct SequentialIds {
    prefix: String,
    next: u64,
}

impl SequentialIds {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: 1,
        }
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&mut self) -> String {
        let id = format!("{}{}", self.prefix, self.next);
        self.next += 1;
        id
    }
}

impl<G: IdGenerator + ?Sized> IdGenerator for Box<G> {
    fn next_id(&mut self) -> String {
        (**self).next_id()
    }
}

fn to_base36(mut value: u64) -> String {
    if value == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while value > 0 {
        digits.push(BASE36[(value % 36) as usize]);
        value /= 36;
    }
    digits.reverse();
    String::from_utf8_lossy(&digits).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn base36_matches_known_values() {
        assert_eq!(to_base36(0), "0");
        assert_eq!(to_base36(35), "z");
        assert_eq!(to_base36(36), "10");
    }

    #[test]
    fn time_random_ids_do_not_repeat_in_a_burst() {
        let mut ids = TimeRandomIds;
        let drawn: HashSet<String> = (0..1000).map(|_| ids.next_id()).collect();
        assert_eq!(drawn.len(), 1000);
    }

    #[test]
    fn sequential_ids_count_from_one() {
        let mut ids = SequentialIds::new("m");
        assert_eq!(ids.next_id(), "m1");
        assert_eq!(ids.next_id(), "m2");
    }
}
