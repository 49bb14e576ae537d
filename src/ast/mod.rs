//! The node kernel (spec §3/§4/§9): common attributes factored into
//! [`NodeMeta`], ~40 concrete variants enumerated as a tagged sum in
//! [`NodeKind`], centralized in [`AstNode`].
//!
//! Parent back-references are the one place the parse tree would otherwise
//! need to be cyclic. Per the design note in spec §9 we keep the tree
//! strictly owned (`Box`/`Vec` children, no arena) and represent `parent`
//! as a non-owning [`NodeId`] that visitors populate in a side table as
//! they walk, rather than storing a real pointer on every node.

pub mod atrule;
pub mod calls;
pub mod expr;
pub mod refs;
pub mod selector;
pub mod structural;
pub mod value;

use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use codemap::Span;

use crate::common::Visibility;
use crate::pos::FileInfo;

pub use atrule::{AtRuleNode, Extend, Import, ImportOptions, Media, MixinGuard, MixinGuardGroup};
pub use calls::{Call, DetachedRuleset, JavaScriptNode, MixinCall, MixinDefinition, VariableCall};
pub use expr::{Expression, Operation, Paren, ValueList};
pub use refs::{NamespaceValue, Property, Reference, Variable};
pub use selector::{Element, Selector};
pub use structural::{Assignment, Comment, Declaration, Ruleset};
pub use value::{Anonymous, Dimension, Keyword, Quoted, UnicodeDescriptor, Url};

/// Stable, process-wide identity for a node, minted at construction time.
/// Used only to give visitors something to key a `parent` side-table on;
/// it carries no ordering meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

impl NodeId {
    pub fn fresh() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        NodeId(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// Common attributes every node carries (spec §3).
#[derive(Debug, Clone)]
pub struct NodeMeta {
    pub id: NodeId,
    pub span: Span,
    pub file: Rc<FileInfo>,
    pub visibility: Visibility,
    pub visibility_blocks: u32,
}

impl NodeMeta {
    pub fn new(span: Span, file: Rc<FileInfo>) -> Self {
        NodeMeta {
            id: NodeId::fresh(),
            span,
            file,
            visibility: Visibility::Unset,
            visibility_blocks: 0,
        }
    }

    /// Spec §3 invariant 5: `visibilityBlocks > 0` means "do not emit" even
    /// if `nodeVisible == true`.
    pub fn is_emittable(&self) -> bool {
        self.visibility_blocks == 0 && self.visibility != Visibility::Hidden
    }
}

/// One AST node: metadata plus the ~40-variant tagged sum. Constructed by
/// the parser, possibly cloned by the evaluator (clone-on-eval keeps the
/// original parse tree observably immutable, spec §3 invariant 8), mutated
/// in place only by the visitor pipeline for the fields it documents as
/// mutable (`Ruleset::paths`, visibility, `Selector::extend_list`).
#[derive(Debug, Clone)]
pub struct AstNode {
    pub meta: NodeMeta,
    pub kind: NodeKind,
}

impl AstNode {
    pub fn new(span: Span, file: Rc<FileInfo>, kind: NodeKind) -> Self {
        AstNode {
            meta: NodeMeta::new(span, file),
            kind,
        }
    }

    pub fn span(&self) -> Span {
        self.meta.span
    }
}

#[derive(Debug, Clone)]
pub enum NodeKind {
    // -- value atoms --
    Dimension(Dimension),
    Color(crate::color::Color),
    Keyword(Keyword),
    Quoted(Quoted),
    Anonymous(Anonymous),
    Url(Url),
    UnicodeDescriptor(UnicodeDescriptor),

    // -- composite value --
    Expression(Expression),
    Value(ValueList),
    Paren(Paren),
    Negative(Box<AstNode>),
    Operation(Operation),

    // -- references --
    Variable(Variable),
    VariableCall(VariableCall),
    Property(Property),
    Reference(Reference),
    NamespaceValue(NamespaceValue),

    // -- calls --
    Call(Call),
    MixinCall(MixinCall),
    MixinDefinition(MixinDefinition),
    JavaScript(JavaScriptNode),

    // -- structural --
    Declaration(Declaration),
    Ruleset(Ruleset),
    Selector(Selector),
    Element(Element),
    Comment(Comment),
    Assignment(Assignment),

    // -- at-rule machinery --
    AtRule(AtRuleNode),
    Media(Media),
    Import(Import),
    Extend(Extend),
    DetachedRuleset(DetachedRuleset),
}

impl NodeKind {
    /// Name used in diagnostics (`"Dimension"`, `"MixinCall"`, ...).
    pub fn type_name(&self) -> &'static str {
        match self {
            NodeKind::Dimension(_) => "Dimension",
            NodeKind::Color(_) => "Color",
            NodeKind::Keyword(_) => "Keyword",
            NodeKind::Quoted(_) => "Quoted",
            NodeKind::Anonymous(_) => "Anonymous",
            NodeKind::Url(_) => "URL",
            NodeKind::UnicodeDescriptor(_) => "UnicodeDescriptor",
            NodeKind::Expression(_) => "Expression",
            NodeKind::Value(_) => "Value",
            NodeKind::Paren(_) => "Paren",
            NodeKind::Negative(_) => "Negative",
            NodeKind::Operation(_) => "Operation",
            NodeKind::Variable(_) => "Variable",
            NodeKind::VariableCall(_) => "VariableCall",
            NodeKind::Property(_) => "Property",
            NodeKind::Reference(_) => "Reference",
            NodeKind::NamespaceValue(_) => "NamespaceValue",
            NodeKind::Call(_) => "Call",
            NodeKind::MixinCall(_) => "MixinCall",
            NodeKind::MixinDefinition(_) => "MixinDefinition",
            NodeKind::JavaScript(_) => "JavaScript",
            NodeKind::Declaration(_) => "Declaration",
            NodeKind::Ruleset(_) => "Ruleset",
            NodeKind::Selector(_) => "Selector",
            NodeKind::Element(_) => "Element",
            NodeKind::Comment(_) => "Comment",
            NodeKind::Assignment(_) => "Assignment",
            NodeKind::AtRule(_) => "AtRule",
            NodeKind::Media(_) => "Media",
            NodeKind::Import(_) => "Import",
            NodeKind::Extend(_) => "Extend",
            NodeKind::DetachedRuleset(_) => "DetachedRuleset",
        }
    }
}
