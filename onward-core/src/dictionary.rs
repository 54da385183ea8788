use tracing::debug;

use crate::builtin::Keyword;
use crate::errors::*;
use crate::quotation::Quotation;

pub const BUCKET_COUNT: usize = 128;
const PRIME: u64 = 7757;

/// `(Σ_i PRIME^i + byte_i) mod BUCKET_COUNT`
///
/// Wrapping arithmetic gives the exact result because `BUCKET_COUNT`
/// divides 2^64.
pub fn hash(name: &str) -> usize {
    let mut power: u64 = 1;
    let mut sum: u64 = 0;
    for byte in name.bytes() {
        sum = sum.wrapping_add(power).wrapping_add(u64::from(byte));
        power = power.wrapping_mul(PRIME);
    }
    (sum % BUCKET_COUNT as u64) as usize
}

#[derive(Debug)]
pub struct Entry {
    pub name: String,
    pub word: Quotation,
    next: Option<Box<Entry>>,
}

/// Name to quotation bindings for user-defined words
///
/// Each bucket holds a singly linked chain; `None` is an empty bucket.
#[derive(Debug)]
pub struct Dictionary {
    buckets: Vec<Option<Box<Entry>>>,
    len: usize,
}

impl Default for Dictionary {
    fn default() -> Self {
        Dictionary::new()
    }
}

impl Dictionary {
    pub fn new() -> Self {
        Dictionary {
            buckets: (0..BUCKET_COUNT).map(|_| None).collect(),
            len: 0,
        }
    }

    /// Bind `word` to `name`, dropping any previous definition.
    pub fn insert(&mut self, name: &str, word: Quotation) -> Result<()> {
        if Keyword::lookup(name).is_some() {
            return Err(ErrorKind::DictionaryConflict(name.to_string()).into());
        }

        let mut slot = &mut self.buckets[hash(name)];
        while let Some(entry) = slot {
            if entry.name == name {
                entry.word = word;
                debug!(name, "redefined word");
                return Ok(());
            }
            slot = &mut entry.next;
        }

        *slot = Some(Box::new(Entry {
            name: name.to_string(),
            word,
            next: None,
        }));
        self.len += 1;
        debug!(name, "created a new word");
        Ok(())
    }

    pub fn lookup(&self, name: &str) -> Option<&Quotation> {
        self.chain(hash(name))
            .find(|entry| entry.name == name)
            .map(|entry| &entry.word)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// All entries in bucket order.
    pub fn iter(&self) -> impl Iterator<Item = &Entry> {
        (0..BUCKET_COUNT).flat_map(move |i| self.chain(i))
    }

    fn chain(&self, bucket: usize) -> impl Iterator<Item = &Entry> {
        let mut cur = self.buckets[bucket].as_deref();
        std::iter::from_fn(move || {
            let entry = cur?;
            cur = entry.next.as_deref();
            Some(entry)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    fn word(values: &[f64]) -> Quotation {
        let mut q = Quotation::new();
        for &v in values {
            q.push(Value::from(v)).unwrap();
        }
        q
    }

    /// Names that share a bucket, found by brute force.
    fn colliding_names() -> Vec<String> {
        (0..)
            .map(|i| format!("w{}", i))
            .filter(|name| hash(name) == hash("w0"))
            .take(3)
            .collect()
    }

    #[test]
    fn hash_matches_the_formula() {
        assert_eq!(hash(""), 0);
        // 7757^0 + 'a'
        assert_eq!(hash("a"), (1 + 97) % BUCKET_COUNT);
        // 1 + 'a' + 7757 + 'b'
        assert_eq!(hash("ab"), (1 + 97 + 7757 + 98) % BUCKET_COUNT);
        assert!(hash("some-rather-long-word-name") < BUCKET_COUNT);
    }

    #[test]
    fn lookup_in_empty_dictionary() {
        let dict = Dictionary::new();
        assert!(dict.lookup("anything").is_none());
        assert!(dict.is_empty());
    }

    #[test]
    fn insert_and_lookup() {
        let mut dict = Dictionary::new();
        dict.insert("answer", word(&[42.0])).unwrap();
        assert_eq!(dict.lookup("answer"), Some(&word(&[42.0])));
        assert!(dict.lookup("question").is_none());
        assert_eq!(dict.len(), 1);
    }

    #[test]
    fn redefinition_replaces() {
        let mut dict = Dictionary::new();
        dict.insert("answer", word(&[1.0])).unwrap();
        dict.insert("answer", word(&[2.0, 3.0])).unwrap();
        assert_eq!(dict.lookup("answer"), Some(&word(&[2.0, 3.0])));
        assert_eq!(dict.len(), 1);
    }

    #[test]
    fn chains_keep_all_colliding_entries() {
        let names = colliding_names();
        let (a, b, c) = (&names[0], &names[1], &names[2]);
        let mut dict = Dictionary::new();
        dict.insert(a, word(&[1.0])).unwrap();
        dict.insert(b, word(&[2.0])).unwrap();
        dict.insert(c, word(&[3.0])).unwrap();
        dict.insert(b, word(&[20.0])).unwrap();

        assert_eq!(dict.lookup(a), Some(&word(&[1.0])));
        assert_eq!(dict.lookup(b), Some(&word(&[20.0])));
        assert_eq!(dict.lookup(c), Some(&word(&[3.0])));
        assert_eq!(dict.len(), 3);

        let names: Vec<_> = dict.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec![a.as_str(), b.as_str(), c.as_str()]);
    }

    #[test]
    fn keywords_cannot_be_defined() {
        let mut dict = Dictionary::new();
        for name in &["dup", "+", "begin", "."] {
            match dict.insert(name, word(&[])).unwrap_err().kind() {
                ErrorKind::DictionaryConflict(n) => assert_eq!(n, name),
                other => panic!("unexpected error {:?}", other),
            }
        }
        assert!(dict.is_empty());
    }
}
