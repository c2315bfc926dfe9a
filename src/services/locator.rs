//! Locates a function or class definition inside a Python source file.
//!
//! The file is parsed into a tree-sitter syntax tree and searched depth-first
//! for a `function_definition` or `class_definition` whose name matches
//! exactly. A class match returns the unparsed source of the whole class,
//! nested methods included; a decorated definition is returned together with
//! its decorators.

use std::path::{Path, PathBuf};

use tree_sitter::{Node, Parser, Tree};

use crate::domain::errors::{FlowError, FlowResult};

fn python_parser() -> FlowResult<Parser> {
    let mut parser = Parser::new();
    parser
        .set_language(&tree_sitter_python::LANGUAGE.into())
        .map_err(|e| FlowError::ParseFailed {
            path: PathBuf::new(),
            reason: format!("python grammar unavailable: {e}"),
        })?;
    Ok(parser)
}

fn parse(source: &str, path: &Path) -> FlowResult<Tree> {
    let mut parser = python_parser()?;
    let tree = parser.parse(source, None).ok_or_else(|| FlowError::ParseFailed {
        path: path.to_path_buf(),
        reason: "parser returned no tree".to_string(),
    })?;
    if tree.root_node().has_error() {
        return Err(FlowError::ParseFailed {
            path: path.to_path_buf(),
            reason: "source contains syntax errors".to_string(),
        });
    }
    Ok(tree)
}

/// Whether `source` parses as well-formed Python.
///
/// Used to validate synthesized test modules before they are written out.
pub fn is_valid_python(source: &str) -> bool {
    let Ok(mut parser) = python_parser() else {
        return false;
    };
    parser.parse(source, None).is_some_and(|tree| !tree.root_node().has_error())
}

/// Find the source text of `symbol` in `file_path`.
///
/// Returns the unparsed definition text and the absolute path it was read
/// from. All failures here are fatal: they happen before any model call.
pub fn locate(file_path: &Path, symbol: &str) -> FlowResult<(String, PathBuf)> {
    let absolute = std::fs::canonicalize(file_path).map_err(|source| FlowError::ReadFailed {
        path: file_path.to_path_buf(),
        source,
    })?;
    let source = std::fs::read_to_string(&absolute).map_err(|source| FlowError::ReadFailed {
        path: absolute.clone(),
        source,
    })?;

    let tree = parse(&source, &absolute)?;
    let node = find_definition(tree.root_node(), source.as_bytes(), symbol).ok_or_else(|| {
        FlowError::SymbolNotFound { symbol: symbol.to_string(), path: absolute.clone() }
    })?;

    let text = node
        .utf8_text(source.as_bytes())
        .map_err(|e| FlowError::ParseFailed { path: absolute.clone(), reason: e.to_string() })?
        .to_string();
    Ok((text, absolute))
}

/// Depth-first search over declarations, descending into class bodies so
/// methods are reachable by bare name.
fn find_definition<'tree>(node: Node<'tree>, source: &[u8], symbol: &str) -> Option<Node<'tree>> {
    if matches!(node.kind(), "function_definition" | "class_definition") {
        if let Some(name) = node.child_by_field_name("name") {
            if name.utf8_text(source) == Ok(symbol) {
                // Keep decorators attached to the returned definition.
                if let Some(parent) = node.parent() {
                    if parent.kind() == "decorated_definition" {
                        return Some(parent);
                    }
                }
                return Some(node);
            }
        }
        // Name did not match; still descend for nested definitions.
    }
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        if let Some(found) = find_definition(child, source, symbol) {
            return Some(found);
        }
    }
    None
}
