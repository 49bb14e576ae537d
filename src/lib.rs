//! A faithful reimplementation of the LESS language: parser, evaluator
//! and CSS emitter (see each module's doc comment for its slice of the
//! pipeline). The public surface is three entry points mirroring the
//! reference's own API shape: [`compile`], [`parse`], [`render`].

pub mod ast;
pub mod builtin;
pub mod chunker;
pub mod color;
pub mod common;
pub mod emitter;
pub mod error;
pub mod eval;
pub mod imports;
pub mod parser;
#[cfg(feature = "plugin_bridge")]
pub mod plugin;
pub mod pos;
pub mod scope;
pub mod unit;
pub mod visitor;

use std::path::PathBuf;
use std::rc::Rc;

pub use error::{LessError, LessResult};

use ast::{AstNode, NodeKind, Ruleset};
use builtin::FunctionRegistry;
use common::{DumpLineNumbers, MathMode, RewriteUrls};
use eval::Context;
use imports::ImportManager;
use pos::{FileInfo, SourceMap};

/// Compile options (spec §6.2). Construct with [`Options::new`] and chain
/// the `with_*` setters; every field has the reference's documented
/// default.
#[derive(Debug, Clone)]
pub struct Options {
    pub paths: Vec<PathBuf>,
    pub filename: String,
    pub compress: bool,
    pub math: MathMode,
    pub strict_units: bool,
    pub rewrite_urls: RewriteUrls,
    pub rootpath: String,
    pub url_args: String,
    pub javascript_enabled: bool,
    pub import_multiple: bool,
    pub process_imports: bool,
    pub ie_compat: bool,
    pub dump_line_numbers: Option<DumpLineNumbers>,
    pub num_precision: usize,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            paths: Vec::new(),
            filename: "input.less".to_owned(),
            compress: false,
            math: MathMode::ParensDivision,
            strict_units: false,
            rewrite_urls: RewriteUrls::Off,
            rootpath: String::new(),
            url_args: String::new(),
            javascript_enabled: false,
            import_multiple: false,
            process_imports: true,
            ie_compat: true,
            dump_line_numbers: None,
            num_precision: 8,
        }
    }
}

impl Options {
    pub fn new() -> Self {
        Options::default()
    }

    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = filename.into();
        self
    }

    pub fn with_paths(mut self, paths: Vec<PathBuf>) -> Self {
        self.paths = paths;
        self
    }

    pub fn with_compress(mut self, compress: bool) -> Self {
        self.compress = compress;
        self
    }

    pub fn with_math(mut self, math: MathMode) -> Self {
        self.math = math;
        self
    }

    pub fn with_strict_units(mut self, strict: bool) -> Self {
        self.strict_units = strict;
        self
    }

    pub fn with_rewrite_urls(mut self, policy: RewriteUrls) -> Self {
        self.rewrite_urls = policy;
        self
    }

    pub fn with_rootpath(mut self, rootpath: impl Into<String>) -> Self {
        self.rootpath = rootpath.into();
        self
    }

    pub fn with_url_args(mut self, args: impl Into<String>) -> Self {
        self.url_args = args.into();
        self
    }

    pub fn with_javascript_enabled(mut self, enabled: bool) -> Self {
        self.javascript_enabled = enabled;
        self
    }

    pub fn with_import_multiple(mut self, default_multiple: bool) -> Self {
        self.import_multiple = default_multiple;
        self
    }

    pub fn with_process_imports(mut self, process: bool) -> Self {
        self.process_imports = process;
        self
    }

    pub fn with_ie_compat(mut self, enabled: bool) -> Self {
        self.ie_compat = enabled;
        self
    }

    pub fn with_dump_line_numbers(mut self, mode: Option<DumpLineNumbers>) -> Self {
        self.dump_line_numbers = mode;
        self
    }

    pub fn with_num_precision(mut self, precision: usize) -> Self {
        self.num_precision = precision;
        self
    }
}

/// `Compile`'s result (spec §6.1): the emitted CSS plus every file path
/// that was actually read while resolving `@import`s.
#[derive(Debug, Clone)]
pub struct CompileOutput {
    pub css: String,
    pub imports: Vec<String>,
}

/// `Compile(source, options) -> {css, imports} | Error` (spec §6.1).
pub fn compile(source: &str, options: &Options) -> LessResult<CompileOutput> {
    let source_map = SourceMap::new();
    let (ast, imported) = parse_and_resolve(&source_map, source, options)
        .map_err(|e| e.with_pretty_render(&source_map))?;
    let css = render(ast, options).map_err(|e| e.with_pretty_render(&source_map))?;
    Ok(CompileOutput {
        css,
        imports: imported
            .into_iter()
            .map(|p| p.to_string_lossy().into_owned())
            .collect(),
    })
}

/// `Parse(source, options) -> AST | Error` (spec §6.1): chunk, parse,
/// resolve imports and evaluate, returning the reduced root ruleset.
/// Running the rest of the visitor pipeline is [`render`]'s job, so a
/// caller can inspect the evaluated tree before it's flattened to CSS.
pub fn parse(source: &str, options: &Options) -> LessResult<AstNode> {
    let source_map = SourceMap::new();
    parse_and_resolve(&source_map, source, options)
        .map(|(ast, _)| ast)
        .map_err(|e| e.with_pretty_render(&source_map))
}

/// `Render(ast, options) -> string | Error` (spec §6.1): run extend,
/// join-selector and to-CSS over an already-evaluated root ruleset (as
/// returned by [`parse`]), then emit CSS text. Errors at this stage are
/// returned as-is (no [`SourceMap`] is threaded through from [`parse`]'s
/// caller); [`compile`] renders them pretty because it owns the map end to
/// end.
pub fn render(ast: AstNode, options: &Options) -> LessResult<String> {
    let flat = visitor::run_post_eval_pipeline(ast)?;
    let emit_opts = emitter::EmitOptions {
        precision: options.num_precision,
        compress: options.compress,
        url_args: options.url_args.clone(),
    };
    emitter::emit(&flat, &emit_opts)
}

fn parse_and_resolve(
    source_map: &SourceMap,
    source: &str,
    options: &Options,
) -> LessResult<(AstNode, Vec<PathBuf>)> {
    let codemap_file = source_map.add_file(options.filename.clone(), source.to_owned());
    let file_info = Rc::new(FileInfo::entry(PathBuf::from(&options.filename)));

    let raw = parser::parse_stylesheet(&codemap_file, file_info)?;

    let import_manager = ImportManager::with_fs(options.paths.clone(), source_map.clone());
    let root = if options.process_imports {
        visitor::resolve_imports(raw, &import_manager)?
    } else {
        raw
    };
    let imported = import_manager.imported_files();

    let functions = FunctionRegistry::new();
    let mut ctx = Context::new(&functions, options.math, options.strict_units);
    ctx.num_precision = options.num_precision;
    ctx.compress = options.compress;
    ctx.import_multiple_default = options.import_multiple;
    ctx.javascript_enabled = options.javascript_enabled;

    let evaluated = match root.kind {
        NodeKind::Ruleset(rs) => {
            let rules = eval::eval_rules(&mut ctx, &rs.rules)?;
            AstNode::new(
                root.meta.span,
                root.meta.file.clone(),
                NodeKind::Ruleset(Ruleset {
                    selectors: rs.selectors,
                    rules,
                    allow_imports: rs.allow_imports,
                    strict_imports: rs.strict_imports,
                    is_root: rs.is_root,
                    first_root: rs.first_root,
                    allow_root: rs.allow_root,
                    root_in_media: rs.root_in_media,
                    extend_on_every_path: rs.extend_on_every_path,
                    paths: Vec::new(),
                }),
            )
        }
        other => AstNode::new(root.meta.span, root.meta.file.clone(), other),
    };
    Ok((evaluated, imported))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compile_str(src: &str) -> String {
        compile(src, &Options::new()).expect("compile").css
    }

    #[test]
    fn compiles_a_plain_declaration() {
        let css = compile_str(".a { color: red; }\n");
        assert_eq!(css, ".a {\n  color: red;\n}\n");
    }

    #[test]
    fn resolves_variables() {
        let css = compile_str("@c: red;\n.a { color: @c; }\n");
        assert_eq!(css, ".a {\n  color: red;\n}\n");
    }

    #[test]
    fn nests_rules_with_parent_selector() {
        let css = compile_str(".a { &:hover { color: blue; } }\n");
        assert_eq!(css, ".a:hover {\n  color: blue;\n}\n");
    }

    #[test]
    fn compress_collapses_whitespace() {
        let css = compile(
            ".a { color: red; }\n",
            &Options::new().with_compress(true),
        )
        .expect("compile")
        .css;
        assert_eq!(css, ".a{color:red;}");
    }

    #[test]
    fn evaluates_arithmetic_outside_parens_by_default() {
        let css = compile_str(".a { width: 2px + 3px; }\n");
        assert_eq!(css, ".a {\n  width: 5px;\n}\n");
    }

    #[test]
    fn url_args_option_appends_query_string() {
        let css = compile(
            ".a { background: url(a.png); }\n",
            &Options::new().with_url_args("v=1"),
        )
        .expect("compile")
        .css;
        assert_eq!(css, ".a {\n  background: url(a.png?v=1);\n}\n");
    }

    #[test]
    fn url_args_option_skips_data_uris() {
        let css = compile(
            ".a { background: url(data:image/png;base64,AAA==); }\n",
            &Options::new().with_url_args("v=1"),
        )
        .expect("compile")
        .css;
        assert_eq!(css, ".a {\n  background: url(data:image/png;base64,AAA==);\n}\n");
    }
}
