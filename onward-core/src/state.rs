use std::io::{self, Write};

use tracing::{debug, trace};

use crate::builtin::{Builtin, Keyword};
use crate::dictionary::Dictionary;
use crate::errors::*;
use crate::parsing::{is_identifier, Lexeme, Lexer};
use crate::quotation::Quotation;
use crate::value::Value;

/// Initial stack size in values
pub const DEFAULT_STACK_CAPACITY: usize = 512;

/// What the caller should do after a line has been evaluated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    /// `exit` ran; the process should terminate with this status.
    Exit(i32),
}

/// Deepest quotation a word definition may build, counting the word itself
pub const MAX_NESTING: usize = 128;

/// A builtin taken off the stack whose operands are still being forced
struct Pending {
    op: Builtin,
    operands: Vec<Value>,
}

impl Pending {
    fn new(op: Builtin) -> Self {
        Pending {
            op,
            operands: Vec::with_capacity(op.arity()),
        }
    }

    fn accept(&mut self, operand: Value) -> Result<()> {
        self.op.check_operand(self.operands.len(), &operand)?;
        self.operands.push(operand);
        Ok(())
    }

    fn is_ready(&self) -> bool {
        self.operands.len() == self.op.arity()
    }
}

/// A word being recorded between `begin` and `end`
#[derive(Debug)]
struct Capture {
    name: String,
    body: Quotation,
    nested: Vec<Quotation>,
}

impl Capture {
    /// Nesting of the quotation currently being recorded into.
    fn depth(&self) -> usize {
        self.nested.len() + 1
    }

    fn innermost(&mut self) -> &mut Quotation {
        match self.nested.last_mut() {
            Some(quot) => quot,
            None => &mut self.body,
        }
    }
}

/// One interpreter session: the stack, the dictionary, and where `dump`
/// and `print` write to.
#[derive(Debug)]
pub struct State<W = io::Stdout> {
    pub stack: Quotation,
    pub dictionary: Dictionary,
    pub output: W,
    capture: Option<Capture>,
}

impl State<io::Stdout> {
    pub fn new() -> Self {
        State::with_output(io::stdout())
    }
}

impl Default for State<io::Stdout> {
    fn default() -> Self {
        State::new()
    }
}

/// API
impl<W: Write> State<W> {
    pub fn with_output(output: W) -> Self {
        State {
            stack: Quotation::with_capacity(DEFAULT_STACK_CAPACITY),
            dictionary: Dictionary::new(),
            output,
            capture: None,
        }
    }

    pub fn with_capacity(output: W, capacity: usize) -> Result<Self> {
        Ok(State {
            stack: Quotation::try_with_capacity(capacity)?,
            dictionary: Dictionary::new(),
            output,
            capture: None,
        })
    }

    /// Evaluate one line of input.
    ///
    /// Evaluation stops at the first error; whatever the line did to the
    /// stack up to that point stays, and an unfinished word definition is
    /// dropped. A definition that is still open at the end of the line
    /// continues on the next one.
    pub fn eval_line(&mut self, line: &str) -> Result<Flow> {
        let mut lexer = Lexer::new(line);
        loop {
            let capturing = self.is_capturing();
            let result = match lexer.next_lexeme() {
                Ok(None) => return Ok(Flow::Continue),
                Ok(Some(lexeme)) => self.step(lexeme),
                Err(e) => Err(e),
            };

            if let Err(e) = result {
                if let ErrorKind::ExitRequested(status) = *e.kind() {
                    debug!(status, "exit requested");
                    return Ok(Flow::Exit(status));
                }
                self.capture = None;
                if capturing {
                    debug!("abandoned word definition");
                }
                return Err(e);
            }
        }
    }

    pub fn is_capturing(&self) -> bool {
        self.capture.is_some()
    }

    pub fn push<T: Into<Value>>(&mut self, val: T) -> Result<()> {
        self.stack.push(val.into())
    }

    /// Collapse the top of the stack and take the resulting value.
    ///
    /// Executable values are run until a plain value surfaces. A builtin
    /// that turns up waits on `pending` while its operands are forced the
    /// same way, one after another, and runs once it has all of them. This
    /// is what lets stacked operations compose.
    pub fn pop_value(&mut self) -> Result<Value> {
        let mut pending: Vec<Pending> = vec![];
        loop {
            match self.stack.pop()? {
                Value::Builtin(op) if op.arity() == 0 => {
                    trace!(op = op.name(), "execute");
                    op.apply(self, vec![])?;
                }
                Value::Builtin(op) => pending.push(Pending::new(op)),
                Value::Quotation(quot) => self.replay(quot)?,
                value => {
                    let mut waiting = match pending.pop() {
                        Some(waiting) => waiting,
                        None => return Ok(value),
                    };
                    waiting.accept(value)?;
                    if waiting.is_ready() {
                        trace!(op = waiting.op.name(), "execute");
                        waiting.op.apply(self, waiting.operands)?;
                    } else {
                        pending.push(waiting);
                    }
                }
            }
        }
    }

    pub fn pop_text(&mut self) -> Result<String> {
        self.pop_value()?.try_into_text()
    }

    /// `.`
    pub fn collapse(&mut self) -> Result<()> {
        let value = self.pop_value()?;
        self.push(value)
    }

    /// Push a quotation's contents onto the stack in order.
    fn replay(&mut self, quot: Quotation) -> Result<()> {
        trace!(len = quot.len(), "replay quotation");
        self.stack.reserve(quot.len())?;
        for value in quot {
            self.stack.push(value)?;
        }
        Ok(())
    }

    pub fn dump(&mut self) -> Result<()> {
        writeln!(self.output, "{}", self.stack)?;
        Ok(())
    }

    pub fn clear_stack(&mut self) {
        while self.stack.pop().is_ok() {}
    }

    fn step(&mut self, lexeme: Lexeme) -> Result<()> {
        trace!(?lexeme, "step");
        match self.capture.take() {
            Some(capture) => self.capture_step(capture, lexeme),
            None => self.eval_step(lexeme),
        }
    }

    fn eval_step(&mut self, lexeme: Lexeme) -> Result<()> {
        match lexeme {
            Lexeme::Number(n) => self.push(n),
            Lexeme::Text(s) => self.push(s),
            Lexeme::Keyword(Keyword::Builtin(Builtin::Dump)) => self.dump(),
            Lexeme::Keyword(Keyword::Builtin(op)) => self.push(op),
            Lexeme::Keyword(Keyword::Collapse) => self.collapse(),
            Lexeme::Keyword(Keyword::Begin) => self.begin_capture(),
            Lexeme::Keyword(Keyword::End) => Err(ErrorKind::UnmatchedEnd.into()),
            Lexeme::Identifier(name) => {
                let word = self.resolve(name)?;
                self.push(word)
            }
        }
    }

    /// Record a lexeme into the open definition instead of evaluating it.
    fn capture_step(&mut self, mut capture: Capture, lexeme: Lexeme) -> Result<()> {
        let value = match lexeme {
            Lexeme::Number(n) => Value::from(n),
            Lexeme::Text(s) => Value::from(s),
            Lexeme::Keyword(Keyword::Builtin(op)) => Value::from(op),
            Lexeme::Keyword(Keyword::Collapse) => {
                return Err(ErrorKind::CollapseInCapture.into())
            }
            Lexeme::Keyword(Keyword::Begin) => {
                if capture.depth() + 1 > MAX_NESTING {
                    return Err(ErrorKind::NestingTooDeep(MAX_NESTING).into());
                }
                capture.nested.push(Quotation::new());
                self.capture = Some(capture);
                return Ok(());
            }
            Lexeme::Keyword(Keyword::End) => match capture.nested.pop() {
                Some(inner) => Value::from(inner),
                None => {
                    let Capture { name, body, .. } = capture;
                    debug!(name = name.as_str(), len = body.len(), "defining word");
                    return self.dictionary.insert(&name, body);
                }
            },
            Lexeme::Identifier(name) => self.resolve(name)?,
        };

        if let Value::Quotation(quot) = &value {
            if capture.depth() + quot.depth() > MAX_NESTING {
                return Err(ErrorKind::NestingTooDeep(MAX_NESTING).into());
            }
        }
        capture.innermost().push(value)?;
        self.capture = Some(capture);
        Ok(())
    }

    /// Outermost `begin`: the word's name is the text on top of the stack.
    fn begin_capture(&mut self) -> Result<()> {
        let name = match self.stack.last() {
            None => return Err(ErrorKind::StackUnderflow.into()),
            Some(Value::Text(name)) => name.clone(),
            Some(other) => {
                return Err(ErrorKind::TypeMismatch("text", other.to_string()).into())
            }
        };

        if Keyword::lookup(&name).is_some() {
            return Err(ErrorKind::DictionaryConflict(name).into());
        }
        if !is_identifier(&name) {
            return Err(ErrorKind::InvalidWordName(name).into());
        }

        self.stack.pop()?;
        debug!(name = name.as_str(), "begin word definition");
        self.capture = Some(Capture {
            name,
            body: Quotation::new(),
            nested: vec![],
        });
        Ok(())
    }

    /// Copy a word's body out of the dictionary.
    fn resolve(&self, name: &str) -> Result<Value> {
        self.dictionary
            .lookup(name)
            .cloned()
            .map(Value::Quotation)
            .ok_or_else(|| ErrorKind::UnknownToken(name.to_string()).into())
    }
}
