use std::{collections::HashMap, rc::Rc};

use crate::{
    error::{LispError, LispResult},
    functions::FUNCTIONS,
    syntax::{Builtin, Expression},
};

type Frame = HashMap<String, Expression>;

/// A chain of scope frames, outermost (the base frame) first.
///
/// Each frame is owned by the chain that holds it. Frames are reference counted
/// only so that cloning a chain is cheap: the first write through a clone copies
/// the frame it touches, so two chains never observe each other's writes.
#[derive(Debug, Clone)]
pub struct Environment {
    frames: Vec<Rc<Frame>>,
}

impl Environment {
    /// The base frame: the boolean constants and every builtin procedure.
    pub fn base() -> Self {
        let mut frame = Frame::new();
        for (name, value) in [("#t", true), ("#f", false), ("true", true), ("false", false)] {
            frame.insert(name.to_string(), Expression::Boolean(value));
        }
        for (&name, &func) in FUNCTIONS.iter() {
            frame.insert(name.to_string(), Expression::Builtin(Builtin { name, func }));
        }
        Self {
            frames: vec![Rc::new(frame)],
        }
    }

    #[cfg(test)]
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn lookup(&self, name: &str) -> LispResult<Expression> {
        self.frames
            .iter()
            .rev()
            .find_map(|frame| frame.get(name))
            .cloned()
            .ok_or_else(|| LispError::UnboundSymbol(name.to_string()))
    }

    /// Binds `name` in the innermost frame, replacing any existing binding there.
    pub fn define(&mut self, name: impl Into<String>, value: Expression) {
        if let Some(frame) = self.frames.last_mut() {
            Rc::make_mut(frame).insert(name.into(), value);
        }
    }

    /// Rebinds `name` in the innermost frame that already binds it.
    pub fn assign(&mut self, name: &str, value: Expression) -> LispResult<()> {
        let frame = self
            .frames
            .iter_mut()
            .rev()
            .find(|frame| frame.contains_key(name))
            .ok_or_else(|| LispError::UnboundSymbol(name.to_string()))?;
        Rc::make_mut(frame).insert(name.to_string(), value);
        Ok(())
    }

    /// An independent copy of the whole chain, base frame included.
    pub fn duplicate(&self) -> Self {
        self.clone()
    }

    /// A copy of this chain with a fresh, empty innermost frame.
    pub fn scope(&self) -> Self {
        let mut env = self.duplicate();
        env.frames.push(Rc::default());
        env
    }
}
