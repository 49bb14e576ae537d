//! Import manager (spec §4.4, §6.4): resolves `@import` targets to source
//! text, decides CSS-vs-LESS handling, and tracks once-semantics.
//!
//! File access goes through [`FileLoader`] rather than straight
//! `std::fs`, the same seam the reference exposes to a host as a
//! pluggable file manager (spec §6.3 `fileManagerLoad`) — this keeps the
//! core testable with an in-memory loader and leaves remote (`http://`)
//! imports to whatever host wires one in.

use std::cell::RefCell;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::ast::{AstNode, Import, NodeKind};
use crate::error::{LessError, LessResult};
use crate::pos::{FileInfo, SourceMap};

/// Reads import targets. The default [`FsFileLoader`] reads the local
/// filesystem; a host embedding this core can substitute its own (an
/// in-memory bundle, a virtual filesystem, a network fetcher) without
/// touching the resolver logic.
pub trait FileLoader {
    fn read_to_string(&self, path: &Path) -> LessResult<String>;
    fn exists(&self, path: &Path) -> bool;
}

pub struct FsFileLoader;

impl FileLoader for FsFileLoader {
    fn read_to_string(&self, path: &Path) -> LessResult<String> {
        std::fs::read_to_string(path)
            .map_err(|e| LessError::file(e.to_string(), path.to_string_lossy().into_owned()))
    }

    fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }
}

/// What an `@import` produced, once resolved (spec §4.4).
pub enum ImportOutcome {
    /// Parsed LESS: the resolved path (for cycle tracking) and the root
    /// ruleset's own rules, to be spliced in place of the `Import` node by
    /// the caller.
    Less(PathBuf, Vec<AstNode>),
    /// CSS, or `(inline)` of any kind: included as opaque text (spec §4.4
    /// "CSS-ness" — the core doesn't parse foreign CSS or try to be smart
    /// about inlined content).
    Verbatim(AstNode),
    /// `(once)` (the default) and this file was already imported.
    AlreadyImported,
    /// `(optional)` and the target couldn't be found.
    OptionalMissing,
}

pub struct ImportManager {
    loader: Box<dyn FileLoader>,
    paths: Vec<PathBuf>,
    source_map: SourceMap,
    seen: RefCell<HashSet<PathBuf>>,
}

impl ImportManager {
    pub fn new(loader: Box<dyn FileLoader>, paths: Vec<PathBuf>, source_map: SourceMap) -> Self {
        ImportManager {
            loader,
            paths,
            source_map,
            seen: RefCell::new(HashSet::new()),
        }
    }

    pub fn with_fs(paths: Vec<PathBuf>, source_map: SourceMap) -> Self {
        Self::new(Box::new(FsFileLoader), paths, source_map)
    }

    /// Resolve and read `import`'s target, relative to `importer`.
    /// `raw_path` is the already-evaluated path string (spec §4.4's
    /// `Import.path` reduced to a plain string by the evaluator before
    /// the import visitor ever sees it).
    pub fn resolve(
        &self,
        import: &Import,
        raw_path: &str,
        importer: &FileInfo,
    ) -> LessResult<ImportOutcome> {
        if is_remote(raw_path) {
            return Err(LessError::file(
                "remote imports require a host-provided file manager",
                raw_path.to_owned(),
            ));
        }

        let found = self.search(raw_path, &importer.current_directory);
        let resolved = match found {
            Some(p) => p,
            None if import.options.optional => {
                tracing::debug!(path = raw_path, "optional import not found, skipping");
                return Ok(ImportOutcome::OptionalMissing);
            }
            None => {
                return Err(LessError::file("import not found", raw_path.to_owned()));
            }
        };

        let is_css = import.is_css.unwrap_or_else(|| {
            resolved
                .extension()
                .map(|ext| ext.eq_ignore_ascii_case("css"))
                .unwrap_or(false)
        });

        if import.options.effective_once() && !import.options.inline {
            if self.seen.borrow().contains(&resolved) {
                return Ok(ImportOutcome::AlreadyImported);
            }
        }
        self.seen.borrow_mut().insert(resolved.clone());

        let text = self.loader.read_to_string(&resolved)?;

        let mut child_info = FileInfo::entry(resolved.clone());
        child_info.reference = import.options.reference || importer.reference;
        child_info.rootpath = importer.rootpath.clone();
        let child_info = Rc::new(child_info);

        if import.options.inline || is_css {
            let codemap_file = self.source_map.add_file(resolved.to_string_lossy().into_owned(), text.clone());
            return Ok(ImportOutcome::Verbatim(AstNode::new(
                codemap_file.span,
                child_info,
                NodeKind::Anonymous(crate::ast::Anonymous {
                    value: text,
                    ruleset_like: true,
                }),
            )));
        }

        let codemap_file = self.source_map.add_file(resolved.to_string_lossy().into_owned(), text);
        let parsed = crate::parser::parse_stylesheet(&codemap_file, child_info)?;
        match parsed.kind {
            NodeKind::Ruleset(rs) => Ok(ImportOutcome::Less(resolved, rs.rules)),
            other => Ok(ImportOutcome::Less(
                resolved,
                vec![AstNode::new(parsed.span(), parsed.meta.file.clone(), other)],
            )),
        }
    }

    /// Every file successfully resolved so far, for `Compile`'s `imports`
    /// result list (spec §6.1).
    pub fn imported_files(&self) -> Vec<PathBuf> {
        self.seen.borrow().iter().cloned().collect()
    }

    /// Search current-file directory, then each configured include path,
    /// appending `.less` when the candidate has no extension (spec §6.4).
    fn search(&self, raw_path: &str, current_directory: &Path) -> Option<PathBuf> {
        let mut dirs = Vec::with_capacity(self.paths.len() + 1);
        dirs.push(current_directory.to_path_buf());
        dirs.extend(self.paths.iter().cloned());

        let candidates = candidate_names(raw_path);
        for dir in &dirs {
            for name in &candidates {
                let candidate = dir.join(name);
                if self.loader.exists(&candidate) {
                    return Some(candidate);
                }
            }
        }
        None
    }
}

fn candidate_names(raw_path: &str) -> Vec<PathBuf> {
    let path = PathBuf::from(raw_path);
    let has_extension = path.extension().is_some();
    if has_extension {
        vec![path]
    } else {
        let mut with_ext = raw_path.to_owned();
        with_ext.push_str(".less");
        vec![PathBuf::from(with_ext), path]
    }
}

fn is_remote(raw_path: &str) -> bool {
    raw_path.starts_with("http://") || raw_path.starts_with("https://") || raw_path.starts_with("//")
}
