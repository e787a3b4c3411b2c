//! The parameter stack: a LIFO of name -> integer frames, pushed by loop
//! unrolling and template monomorphization (spec.md §3, §5).
//!
//! Modeled as an explicit stack of immutable-once-pushed frames rather than
//! the source's dynamic-scope dict mutation, per Design Note "Parameter
//! stack as dynamic scope". Pushes and pops are strictly paired around a
//! loop-body or template-body visit; `control::lower_for` and
//! `template::instantiate` are the only two call sites that push.

#[derive(Debug, Default)]
pub struct ParamStack {
    frames: Vec<Vec<(String, i64)>>,
}

impl ParamStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, frame: Vec<(String, i64)>) {
        self.frames.push(frame);
    }

    pub fn pop(&mut self) {
        self.frames.pop();
    }

    /// Top-of-stack takes precedence, per spec.md §3.
    pub fn resolve(&self, name: &str) -> Option<i64> {
        self.frames
            .iter()
            .rev()
            .find_map(|frame| frame.iter().find(|(n, _)| n == name).map(|(_, v)| *v))
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }
}
