use std::fmt::Debug;
use std::io::Write;

use crate::State;
use crate::Value;

impl<W: Write> State<W> {
    /// The whole stack, bottom first.
    pub fn assert_stack<T>(&self, expected: &[T])
    where
        Value: PartialEq<T>,
        T: Debug,
    {
        assert_eq!(self.stack.as_slice(), expected, "stack is {}", self.stack)
    }

    /// The topmost `expected.len()` values, bottom first.
    pub fn assert_stack_top<T>(&self, expected: &[T])
    where
        Value: PartialEq<T>,
        T: Debug,
    {
        let depth = self.stack.len();
        assert!(depth >= expected.len(), "stack is {}", self.stack);
        assert_eq!(&self.stack.as_slice()[depth - expected.len()..], expected)
    }

    /// Take the top value without collapsing it.
    pub fn assert_pop<T>(&mut self, expected: T)
    where
        Value: PartialEq<T>,
        T: Debug,
    {
        match self.stack.pop() {
            Ok(value) => assert_eq!(value, expected),
            Err(_) => panic!("expected {:?} on an empty stack", expected),
        }
    }
}

impl State<Vec<u8>> {
    /// Everything written by `dump` and `print` so far.
    pub fn take_output(&mut self) -> String {
        String::from_utf8(std::mem::replace(&mut self.output, vec![])).unwrap()
    }
}
