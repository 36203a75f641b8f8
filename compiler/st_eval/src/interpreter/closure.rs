//! Block closures.

use std::fmt;
use std::sync::Arc;

use st_compile::BoundBlock;
use st_object::{BlockClosure, EvalError, ExecEnv, Value};

use super::{Evaluator, Flow};
use crate::frame::Frame;
use crate::primitives::PrimitiveRegistry;

/// A block literal closed over the frame it was evaluated in.
pub struct Closure {
    block: Arc<BoundBlock>,
    outer: Arc<Frame>,
    primitives: Arc<PrimitiveRegistry>,
}

impl Closure {
    pub(crate) fn new(
        block: Arc<BoundBlock>,
        outer: Arc<Frame>,
        primitives: Arc<PrimitiveRegistry>,
    ) -> Self {
        Closure {
            block,
            outer,
            primitives,
        }
    }
}

impl BlockClosure for Closure {
    fn arity(&self) -> usize {
        self.block.body.argument_count
    }

    fn invoke(&self, env: &ExecEnv, arguments: &[Value]) -> Result<Value, EvalError> {
        let body = &self.block.body;
        if arguments.len() != body.argument_count {
            return Err(EvalError::WrongArgumentCount {
                selector: value_selector(body.argument_count),
                expected: body.argument_count,
                got: arguments.len(),
            });
        }
        let frame = Frame::block(&self.outer, arguments, body.slot_count());
        match Evaluator::new(env, &self.primitives, &frame).run(&body.statements)? {
            Flow::Normal(value) => Ok(value),
            Flow::Return(value) => {
                let home = frame.home();
                if home.is_active() {
                    Err(EvalError::NonLocalReturn {
                        home: home.id(),
                        value,
                    })
                } else {
                    Err(EvalError::BlockCannotReturn)
                }
            }
        }
    }
}

fn value_selector(arity: usize) -> String {
    match arity {
        0 => "value".to_owned(),
        n => "value:".repeat(n),
    }
}

impl fmt::Debug for Closure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Closure")
            .field("arity", &self.arity())
            .field("span", &self.block.span)
            .finish_non_exhaustive()
    }
}
