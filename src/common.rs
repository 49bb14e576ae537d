//! Small shared enums referenced across the node kernel, evaluator and
//! emitter.

/// Policy controlling when arithmetic operators are treated as CSS math vs.
/// left as literal text (spec §4.3, glossary "Math mode").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MathMode {
    /// Division (`/`) is only evaluated inside parentheses; other operators
    /// always evaluate. This is the reference default.
    ParensDivision,
    /// All operators are only evaluated inside parentheses.
    Parens,
    /// All operators always evaluate, parenthesized or not.
    Always,
}

impl Default for MathMode {
    fn default() -> Self {
        MathMode::ParensDivision
    }
}

/// `Options::rewrite_urls` (spec §6.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RewriteUrls {
    #[default]
    Off,
    Local,
    All,
}

/// `Options::dump_line_numbers` (spec §6.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DumpLineNumbers {
    Comments,
    MediaQuery,
    All,
}

/// A selector combinator (spec §3, `Combinator`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Combinator {
    /// Descendant combinator: a single space.
    Descendant,
    Child,
    Sibling,
    NextSibling,
    NamespacePipe,
    Shadow,
    ShadowDeep,
    /// No combinator: this is the first element of a selector.
    None,
}

impl Combinator {
    pub fn as_str(self) -> &'static str {
        match self {
            Combinator::Descendant => " ",
            Combinator::Child => ">",
            Combinator::Sibling => "~",
            Combinator::NextSibling => "+",
            Combinator::NamespacePipe => "|",
            Combinator::Shadow => "^",
            Combinator::ShadowDeep => "^^",
            Combinator::None => "",
        }
    }

    pub fn from_char_sequence(s: &str) -> Combinator {
        match s {
            ">" => Combinator::Child,
            "~" => Combinator::Sibling,
            "+" => Combinator::NextSibling,
            "|" => Combinator::NamespacePipe,
            "^^" => Combinator::ShadowDeep,
            "^" => Combinator::Shadow,
            " " | "" => Combinator::Descendant,
            other => unreachable!("not a combinator: {other:?}"),
        }
    }
}

/// Tri-state node visibility (spec §3 invariant 5 / glossary "Visibility").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Unset,
    Visible,
    Hidden,
}

impl Default for Visibility {
    fn default() -> Self {
        Visibility::Unset
    }
}

/// Declaration merge tag (`+` comma-merge, `+_` space-merge).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeKind {
    Comma,
    Space,
}

/// The four arithmetic operators `Operation` supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Add,
    Sub,
    Mul,
    Div,
}

impl Op {
    pub fn as_str(self) -> &'static str {
        match self {
            Op::Add => "+",
            Op::Sub => "-",
            Op::Mul => "*",
            Op::Div => "/",
        }
    }
}

/// `Extend`'s matching mode: plain (exact element-sequence match) or
/// `!all` / `all` (substring match, every occurrence rewritten).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtendOption {
    Exact,
    All,
}
