use std::io::Write;

use crate::errors::*;
use crate::state::State;
use crate::value::Value;

/// The fixed set of language-defined stack operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Builtin {
    Plus,
    Minus,
    Star,
    Slash,
    Dump,
    Exit,
    Pop,
    Dup,
    Rep,
    Swap,
    Print,
}

/// Anything the tokenizer recognizes by keyword
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    Builtin(Builtin),
    Begin,
    End,
    Collapse,
}

/// Keywords in the order they are tried.
pub const KEYWORDS: &[(&str, Keyword)] = &[
    ("+", Keyword::Builtin(Builtin::Plus)),
    ("-", Keyword::Builtin(Builtin::Minus)),
    ("*", Keyword::Builtin(Builtin::Star)),
    ("/", Keyword::Builtin(Builtin::Slash)),
    ("dump", Keyword::Builtin(Builtin::Dump)),
    ("exit", Keyword::Builtin(Builtin::Exit)),
    ("pop", Keyword::Builtin(Builtin::Pop)),
    ("dup", Keyword::Builtin(Builtin::Dup)),
    ("rep", Keyword::Builtin(Builtin::Rep)),
    ("swap", Keyword::Builtin(Builtin::Swap)),
    ("print", Keyword::Builtin(Builtin::Print)),
    ("begin", Keyword::Begin),
    ("end", Keyword::End),
    (".", Keyword::Collapse),
];

impl Keyword {
    /// Exact lookup of a whole word, used to keep keywords out of the dictionary.
    pub fn lookup(name: &str) -> Option<Keyword> {
        KEYWORDS
            .iter()
            .find(|(kw, _)| *kw == name)
            .map(|&(_, keyword)| keyword)
    }
}

impl Builtin {
    pub fn name(self) -> &'static str {
        KEYWORDS
            .iter()
            .find(|(_, keyword)| *keyword == Keyword::Builtin(self))
            .map(|&(name, _)| name)
            .unwrap_or("?")
    }

    /// How many values the operation takes off the stack.
    pub fn arity(self) -> usize {
        match self {
            Builtin::Dump => 0,
            Builtin::Exit | Builtin::Pop | Builtin::Dup | Builtin::Print => 1,
            Builtin::Plus
            | Builtin::Minus
            | Builtin::Star
            | Builtin::Slash
            | Builtin::Rep
            | Builtin::Swap => 2,
        }
    }

    /// Validate the `index`th operand (counted from the top) as soon as it
    /// has been forced, so a bad operand fails before the next one runs.
    pub fn check_operand(self, index: usize, operand: &Value) -> Result<()> {
        match (self, index) {
            (Builtin::Plus, _)
            | (Builtin::Minus, _)
            | (Builtin::Star, _)
            | (Builtin::Slash, _)
            | (Builtin::Exit, 0) => number(operand).map(|_| ()),
            (Builtin::Rep, 0) => repeat_count(number(operand)?).map(|_| ()),
            _ => Ok(()),
        }
    }

    /// Run the operation on operands that have already been taken off the
    /// stack, topmost first. Results go back onto the session's stack.
    pub fn apply<W: Write>(self, state: &mut State<W>, operands: Vec<Value>) -> Result<()> {
        let mut operands = operands.into_iter();
        match self {
            Builtin::Plus => arithmetic(state, &mut operands, |b, a| b + a),
            Builtin::Minus => arithmetic(state, &mut operands, |b, a| b - a),
            Builtin::Star => arithmetic(state, &mut operands, |b, a| b * a),
            Builtin::Slash => arithmetic(state, &mut operands, |b, a| b / a),
            Builtin::Dump => state.dump(),
            Builtin::Exit => {
                let status = operand(&mut operands)?.try_into_number()?;
                // `as` saturates and maps NaN to zero
                Err(ErrorKind::ExitRequested(status as i32).into())
            }
            Builtin::Pop => operand(&mut operands).map(|_| ()),
            Builtin::Dup => {
                let a = operand(&mut operands)?;
                state.push(a.clone())?;
                state.push(a)
            }
            Builtin::Rep => {
                let count = repeat_count(operand(&mut operands)?.try_into_number()?)?;
                let v = operand(&mut operands)?;
                state.stack.reserve(count)?;
                for _ in 1..count {
                    state.push(v.clone())?;
                }
                state.push(v)
            }
            Builtin::Swap => {
                let a = operand(&mut operands)?;
                let b = operand(&mut operands)?;
                state.push(a)?;
                state.push(b)
            }
            Builtin::Print => {
                match operand(&mut operands)? {
                    Value::Text(s) => writeln!(state.output, "{}", s)?,
                    other => writeln!(state.output, "{}", other)?,
                }
                Ok(())
            }
        }
    }
}

type Operands = std::vec::IntoIter<Value>;

fn operand(operands: &mut Operands) -> Result<Value> {
    operands
        .next()
        .ok_or_else(|| ErrorKind::StackUnderflow.into())
}

fn number(operand: &Value) -> Result<f64> {
    match operand {
        Value::Number(n) => Ok(*n),
        other => Err(ErrorKind::TypeMismatch("number", other.to_string()).into()),
    }
}

fn arithmetic<W: Write>(
    state: &mut State<W>,
    operands: &mut Operands,
    op: impl Fn(f64, f64) -> f64,
) -> Result<()> {
    let a = operand(operands)?.try_into_number()?;
    let b = operand(operands)?.try_into_number()?;
    state.push(op(b, a))
}

fn repeat_count(n: f64) -> Result<usize> {
    if n.is_finite() && n >= 1.0 && n.fract() == 0.0 && n <= usize::MAX as f64 {
        Ok(n as usize)
    } else {
        Err(ErrorKind::InvalidRepeatCount(Value::Number(n).to_string()).into())
    }
}
