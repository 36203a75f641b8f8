//! Activation frames.
//!
//! A method or initializer activation owns a [`Home`]; block activations
//! chain to the frame their closure was created in and share its home.
//! `^` inside a block unwinds to the home, which must still be running.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use smallvec::SmallVec;
use st_object::Value;

static NEXT_HOME: AtomicU64 = AtomicU64::new(1);

/// Identity and liveness of a method or initializer activation.
#[derive(Debug)]
pub struct Home {
    id: u64,
    active: AtomicBool,
}

impl Home {
    fn new() -> Arc<Self> {
        Arc::new(Home {
            id: NEXT_HOME.fetch_add(1, Ordering::Relaxed),
            active: AtomicBool::new(true),
        })
    }

    #[inline]
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }
}

/// Marks a home as returned when the activation ends, including by error.
pub struct HomeGuard(Arc<Home>);

impl Drop for HomeGuard {
    fn drop(&mut self) {
        self.0.active.store(false, Ordering::Release);
    }
}

/// One activation: receiver, argument and temporary slots, and the
/// lexically enclosing frame for blocks.
#[derive(Debug)]
pub struct Frame {
    receiver: Value,
    slots: Mutex<SmallVec<[Value; 8]>>,
    parent: Option<Arc<Frame>>,
    home: Arc<Home>,
}

impl Frame {
    /// Frame for a method or initializer. Slots are the arguments followed
    /// by `nil` temporaries.
    pub fn activation(receiver: Value, arguments: &[Value], slot_count: usize) -> (Arc<Frame>, HomeGuard) {
        let home = Home::new();
        let guard = HomeGuard(Arc::clone(&home));
        let frame = Frame {
            receiver,
            slots: Mutex::new(slots(arguments, slot_count)),
            parent: None,
            home,
        };
        (Arc::new(frame), guard)
    }

    /// Frame for a block invocation inside `parent`.
    pub fn block(parent: &Arc<Frame>, arguments: &[Value], slot_count: usize) -> Arc<Frame> {
        Arc::new(Frame {
            receiver: parent.receiver.clone(),
            slots: Mutex::new(slots(arguments, slot_count)),
            parent: Some(Arc::clone(parent)),
            home: Arc::clone(&parent.home),
        })
    }

    #[inline]
    pub fn receiver(&self) -> &Value {
        &self.receiver
    }

    #[inline]
    pub fn home(&self) -> &Arc<Home> {
        &self.home
    }

    /// The frame `depth` levels out (0 = this one).
    fn ancestor(&self, depth: usize) -> Option<&Frame> {
        let mut frame = self;
        for _ in 0..depth {
            frame = frame.parent.as_deref()?;
        }
        Some(frame)
    }

    pub fn get(&self, depth: usize, index: usize) -> Value {
        self.ancestor(depth)
            .and_then(|frame| frame.slots.lock().get(index).cloned())
            .unwrap_or(Value::Nil)
    }

    pub fn set(&self, depth: usize, index: usize, value: Value) {
        if let Some(frame) = self.ancestor(depth) {
            let mut slots = frame.slots.lock();
            if index >= slots.len() {
                slots.resize(index + 1, Value::Nil);
            }
            slots[index] = value;
        }
    }
}

fn slots(arguments: &[Value], slot_count: usize) -> SmallVec<[Value; 8]> {
    let mut slots: SmallVec<[Value; 8]> = arguments.iter().cloned().collect();
    if slots.len() < slot_count {
        slots.resize(slot_count, Value::Nil);
    }
    slots
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_frames_reach_outer_slots() {
        let (method, _guard) = Frame::activation(Value::Nil, &[Value::Integer(1)], 2);
        let block = Frame::block(&method, &[Value::Integer(5)], 1);

        assert_eq!(block.get(0, 0), Value::Integer(5));
        assert_eq!(block.get(1, 0), Value::Integer(1));
        assert!(block.get(1, 1).is_nil());

        block.set(1, 1, Value::Integer(9));
        assert_eq!(method.get(0, 1), Value::Integer(9));
        assert_eq!(block.home().id(), method.home().id());
    }

    #[test]
    fn home_dies_with_its_guard() {
        let (frame, guard) = Frame::activation(Value::Nil, &[], 0);
        assert!(frame.home().is_active());
        drop(guard);
        assert!(!frame.home().is_active());
    }
}
