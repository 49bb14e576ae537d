//! The frame stack: lexical scoping for variables, mixins and properties
//! (spec §3 "Relationships", §4.3 "Context"). Represented as a persistent,
//! copy-on-push linked list (spec §9 design note) so a [`DetachedRuleset`]
//! can close over the stack as it existed at definition time even as the
//! live stack keeps growing past that point.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::ast::{AstNode, MixinDefinition};

/// One lexical scope: the variables and mixins declared directly in a
/// ruleset, mixin call, or detached-ruleset body. Declarations are mutable
/// in place because a two-pass ruleset (spec §4.3 "Forward references")
/// first collects every mixin definition, then evaluates statements that
/// may call any of them regardless of source order.
#[derive(Debug, Default)]
pub struct Frame {
    variables: RefCell<HashMap<String, AstNode>>,
    /// Mixins are overloaded by arity/guard, so each name maps to every
    /// definition seen with that name in this frame (spec §4.3 "Mixin call
    /// resolution").
    mixins: RefCell<HashMap<String, Vec<Rc<MixinDefinition>>>>,
}

impl Frame {
    pub fn new() -> Self {
        Frame::default()
    }

    pub fn declare_variable(&self, name: &str, value: AstNode) {
        self.variables.borrow_mut().insert(name.to_owned(), value);
    }

    pub fn variable(&self, name: &str) -> Option<AstNode> {
        self.variables.borrow().get(name).cloned()
    }

    pub fn declare_mixin(&self, name: &str, def: Rc<MixinDefinition>) {
        self.mixins
            .borrow_mut()
            .entry(name.to_owned())
            .or_default()
            .push(def);
    }

    pub fn mixins(&self, name: &str) -> Vec<Rc<MixinDefinition>> {
        self.mixins.borrow().get(name).cloned().unwrap_or_default()
    }
}

/// A persistent stack of frames, innermost at the head. Cloning an
/// `Rc<FrameStack>` and pushing onto it never mutates the original chain,
/// which is what makes a captured detached-ruleset closure safe to hold
/// onto even after the call site that captured it has returned.
#[derive(Debug)]
pub enum FrameStack {
    Root,
    Cons {
        frame: Rc<Frame>,
        parent: Rc<FrameStack>,
    },
}

impl FrameStack {
    pub fn root() -> Rc<FrameStack> {
        Rc::new(FrameStack::Root)
    }

    pub fn push(self: &Rc<Self>, frame: Rc<Frame>) -> Rc<FrameStack> {
        Rc::new(FrameStack::Cons {
            frame,
            parent: Rc::clone(self),
        })
    }

    /// Union a captured frame stack (from a `DetachedRuleset`) under the
    /// current call-site stack, per spec §4.3 "Detached rulesets": the
    /// captured frames are searched after (i.e. are less specific than)
    /// whatever is live at the call site.
    pub fn push_captured(self: &Rc<Self>, captured: &Rc<FrameStack>) -> Rc<FrameStack> {
        match captured.as_ref() {
            FrameStack::Root => Rc::clone(self),
            FrameStack::Cons { frame, parent } => {
                self.push_captured(parent).push(Rc::clone(frame))
            }
        }
    }

    /// Innermost-to-outermost frames, for variable/property resolution.
    pub fn inner_to_outer(&self) -> Vec<&Rc<Frame>> {
        let mut out = Vec::new();
        let mut cur = self;
        loop {
            match cur {
                FrameStack::Root => break,
                FrameStack::Cons { frame, parent } => {
                    out.push(frame);
                    cur = parent;
                }
            }
        }
        out
    }

    /// Outermost-to-innermost frames, for mixin candidate collection
    /// (spec §4.3 "Mixin call resolution": "Walk frames outermost→innermost").
    pub fn outer_to_inner(&self) -> Vec<&Rc<Frame>> {
        let mut v = self.inner_to_outer();
        v.reverse();
        v
    }

    pub fn lookup_variable(&self, name: &str) -> Option<AstNode> {
        self.inner_to_outer()
            .into_iter()
            .find_map(|f| f.variable(name))
    }

    pub fn lookup_mixins(&self, name: &str) -> Vec<Rc<MixinDefinition>> {
        let mut found = Vec::new();
        for frame in self.outer_to_inner() {
            found.extend(frame.mixins(name));
        }
        found
    }
}
