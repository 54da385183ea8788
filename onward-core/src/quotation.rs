use tracing::debug;

use crate::errors::*;
use crate::value::Value;

/// Smallest capacity a quotation grows to on its first push
const MIN_CAPACITY: usize = 4;

/// Ordered, growable sequence of values
///
/// This is both the evaluation stack and the body of a user-defined word.
/// Capacity doubles whenever it is exhausted and is never given back, not
/// even after popping everything.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Quotation {
    values: Vec<Value>,
}

impl Quotation {
    pub fn new() -> Self {
        Quotation { values: vec![] }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Quotation {
            values: Vec::with_capacity(capacity),
        }
    }

    pub fn try_with_capacity(capacity: usize) -> Result<Self> {
        let mut values = vec![];
        values
            .try_reserve_exact(capacity)
            .map_err(|_| ErrorKind::AllocationFailure(capacity))?;
        Ok(Quotation { values })
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.values.capacity()
    }

    pub fn push(&mut self, value: Value) -> Result<()> {
        if self.values.len() == self.values.capacity() {
            self.reserve(1)?;
        }
        self.values.push(value);
        Ok(())
    }

    pub fn pop(&mut self) -> Result<Value> {
        self.values
            .pop()
            .ok_or_else(|| ErrorKind::StackUnderflow.into())
    }

    pub fn last(&self) -> Option<&Value> {
        self.values.last()
    }

    /// Make room for `additional` more values, doubling the capacity as
    /// often as necessary.
    pub fn reserve(&mut self, additional: usize) -> Result<()> {
        let needed = self
            .values
            .len()
            .checked_add(additional)
            .ok_or(ErrorKind::AllocationFailure(usize::MAX))?;

        let mut target = self.values.capacity().max(MIN_CAPACITY);
        while target < needed {
            target = target
                .checked_mul(2)
                .ok_or(ErrorKind::AllocationFailure(needed))?;
        }

        if target > self.values.capacity() {
            debug!(from = self.values.capacity(), to = target, "growing quotation");
            self.values
                .try_reserve_exact(target - self.values.len())
                .map_err(|_| ErrorKind::AllocationFailure(target))?;
        }
        Ok(())
    }

    /// How deeply quotations nest inside this one, counting itself.
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut todo = vec![(self, 1)];
        while let Some((quot, depth)) = todo.pop() {
            deepest = deepest.max(depth);
            for value in quot {
                if let Value::Quotation(inner) = value {
                    todo.push((inner, depth + 1));
                }
            }
        }
        deepest
    }

    pub fn iter(&self) -> std::slice::Iter<Value> {
        self.values.iter()
    }

    pub fn as_slice(&self) -> &[Value] {
        &self.values
    }
}

impl IntoIterator for Quotation {
    type Item = Value;
    type IntoIter = std::vec::IntoIter<Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.into_iter()
    }
}

impl<'a> IntoIterator for &'a Quotation {
    type Item = &'a Value;
    type IntoIter = std::slice::Iter<'a, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}

/// Renders bottom to top, e.g. `[1, "hi", <builtin dup>]`.
impl std::fmt::Display for Quotation {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "[")?;
        for (i, value) in self.values.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", value)?;
        }
        write!(f, "]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtin::Builtin;

    #[test]
    fn lifo() {
        let mut q = Quotation::new();
        for i in 0..10 {
            q.push(Value::from(i as f64)).unwrap();
        }
        for i in (0..10).rev() {
            assert_eq!(q.pop().unwrap(), i as f64);
        }
        assert!(q.is_empty());
    }

    #[test]
    fn pop_empty_is_underflow() {
        let mut q = Quotation::new();
        match q.pop().unwrap_err().kind() {
            ErrorKind::StackUnderflow => {}
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn capacity_doubles_and_never_shrinks() {
        let mut q = Quotation::try_with_capacity(4).unwrap();
        let initial = q.capacity();
        assert!(initial >= 4);

        for i in 0..=initial {
            q.push(Value::from(i as f64)).unwrap();
        }
        let grown = q.capacity();
        assert!(grown >= 2 * initial);

        while !q.is_empty() {
            q.pop().unwrap();
        }
        assert_eq!(q.capacity(), grown);
        assert!(q.len() <= q.capacity());
    }

    #[test]
    fn impossible_growth_is_allocation_failure() {
        let mut q = Quotation::new();
        q.push(Value::from(1.0)).unwrap();
        match q.reserve(usize::MAX).unwrap_err().kind() {
            ErrorKind::AllocationFailure(_) => {}
            other => panic!("unexpected error {:?}", other),
        }
        assert_eq!(q.len(), 1);
    }

    #[test]
    fn depth_counts_nested_quotations() {
        let mut inner = Quotation::new();
        inner.push(Value::from(1.0)).unwrap();
        let mut middle = Quotation::new();
        middle.push(Value::from(inner.clone())).unwrap();

        let mut q = Quotation::new();
        q.push(Value::from(inner)).unwrap();
        q.push(Value::from(middle)).unwrap();
        q.push(Value::from(2.0)).unwrap();

        assert_eq!(Quotation::new().depth(), 1);
        assert_eq!(q.depth(), 3);
    }

    #[test]
    fn display() {
        let mut inner = Quotation::new();
        inner.push(Value::from(2.0)).unwrap();
        inner.push(Value::from(Builtin::Plus)).unwrap();

        let mut q = Quotation::new();
        q.push(Value::from(1.0)).unwrap();
        q.push(Value::from("hi")).unwrap();
        q.push(Value::from(Builtin::Dup)).unwrap();
        q.push(Value::from(inner)).unwrap();

        assert_eq!(q.to_string(), "[1, \"hi\", <builtin dup>, [2, <builtin +>]]");
        assert_eq!(Quotation::new().to_string(), "[]");
    }
}
