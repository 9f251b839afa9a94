//! The tags processor shared by every language's embedded query.
//!
//! Each embedded `.scm` file tags captures with a `name.`-prefixed capture
//! for the identifier that should become a node/reference name, following
//! the same capture-naming discipline as the teacher's own tag extractor:
//! only `name.`-prefixed captures carry an extractable identifier, a plain
//! (non-`name.`) capture on the same pattern captures the whole node span
//! for containment purposes.

use tree_sitter::{Query, QueryCapture, QueryMatch};

use crate::queries::records::{DeclarationKind, ReferenceKind, ResultRecord, SourceSpan};

fn capture_name<'q>(query: &'q Query, capture: &QueryCapture) -> &'q str {
    query
        .capture_names()
        .get(capture.index as usize)
        .copied()
        .unwrap_or("")
}

fn span_of(capture: &QueryCapture) -> SourceSpan {
    let node = capture.node;
    SourceSpan {
        start_line: node.start_position().row as u32,
        start_column: node.start_position().column as u32,
        end_line: node.end_position().row as u32,
        end_column: node.end_position().column as u32,
    }
}

fn text_of(capture: &QueryCapture, source: &[u8]) -> Option<String> {
    capture.node.utf8_text(source).ok().map(str::to_string)
}

fn declaration_kind_from_suffix(suffix: &str) -> Option<DeclarationKind> {
    Some(match suffix {
        "class" => DeclarationKind::Class,
        "interface" => DeclarationKind::Interface,
        "function" => DeclarationKind::Function,
        "method" => DeclarationKind::Method,
        "property" => DeclarationKind::Property,
        "variable" => DeclarationKind::Variable,
        "constant" => DeclarationKind::Constant,
        "type" => DeclarationKind::TypeAlias,
        "enum" => DeclarationKind::Enum,
        "enum_member" => DeclarationKind::EnumMember,
        "constructor" => DeclarationKind::Constructor,
        "heading" => DeclarationKind::Heading,
        _ => return None,
    })
}

fn reference_kind_from_suffix(suffix: &str) -> Option<ReferenceKind> {
    Some(match suffix {
        "call" => ReferenceKind::Call,
        "instantiation" => ReferenceKind::Instantiation,
        "use" => ReferenceKind::Use,
        "access" => ReferenceKind::Access,
        "extends" => ReferenceKind::Extends,
        "implements" => ReferenceKind::Implements,
        _ => return None,
    })
}

/// Finds the enclosing whole-node capture for a `name.definition.<kind>`
/// capture, i.e. the sibling `@definition.<kind>` capture on the same match,
/// used to recover the containment start/end lines for nested declarations.
fn containment_span(query: &Query, m: &QueryMatch, kind_suffix: &str) -> Option<SourceSpan> {
    let wanted = format!("definition.{kind_suffix}");
    m.captures
        .iter()
        .find(|c| capture_name(query, c) == wanted)
        .map(span_of)
}

/// Shared processor for every language's embedded `{lang}-tags` query.
pub fn tags_processor(query: &Query, source: &[u8], m: &QueryMatch) -> Option<ResultRecord> {
    for capture in m.captures {
        let tag = capture_name(query, capture);

        if tag == "import.specifier" {
            let specifier = text_of(capture, source)?;
            return Some(ResultRecord::Import {
                specifier,
                span: span_of(capture),
            });
        }

        if tag == "name.export.symbol" {
            let name = text_of(capture, source)?;
            return Some(ResultRecord::Export {
                name,
                span: span_of(capture),
            });
        }

        if let Some(suffix) = tag.strip_prefix("name.definition.") {
            let kind = declaration_kind_from_suffix(suffix)?;
            let name = text_of(capture, source)?;
            let whole = containment_span(query, m, suffix).unwrap_or_else(|| span_of(capture));
            return Some(ResultRecord::Declaration {
                declaration_kind: kind,
                name,
                scope: None,
                containment_start_line: whole.start_line,
                containment_end_line: whole.end_line,
                span: span_of(capture),
            });
        }

        if let Some(suffix) = tag.strip_prefix("name.reference.") {
            let kind = reference_kind_from_suffix(suffix)?;
            let name = text_of(capture, source)?;
            return Some(ResultRecord::Reference {
                name,
                reference_kind: kind,
                span: span_of(capture),
            });
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::Language;
    use crate::parser_pool::ParserPool;
    use tree_sitter::{QueryCursor, StreamingIterator};

    fn run(language: Language, source: &str, pattern: &str) -> Vec<ResultRecord> {
        let mut pool = ParserPool::default();
        let parsed = pool.parse(source, language).unwrap();
        let ts_language = language.tree_sitter_language();
        let query = Query::new(&ts_language, pattern).unwrap();
        let mut cursor = QueryCursor::new();
        let mut out = Vec::new();
        let mut matches = cursor.matches(&query, parsed.tree.root_node(), source.as_bytes());
        while let Some(m) = matches.next() {
            if let Some(record) = tags_processor(&query, source.as_bytes(), m) {
                out.push(record);
            }
        }
        out
    }

    #[test]
    fn extracts_typescript_function_declaration() {
        let records = run(
            Language::TypeScript,
            "function add(a: number, b: number) { return a + b; }",
            "(function_declaration name: (identifier) @name.definition.function) @definition.function",
        );
        assert_eq!(records.len(), 1);
        match &records[0] {
            ResultRecord::Declaration {
                declaration_kind,
                name,
                ..
            } => {
                assert_eq!(*declaration_kind, DeclarationKind::Function);
                assert_eq!(name, "add");
            }
            other => panic!("unexpected record: {other:?}"),
        }
    }

    #[test]
    fn extracts_python_import_specifier() {
        let records = run(
            Language::Python,
            "import os\n",
            "(import_statement name: (dotted_name) @import.specifier) @import",
        );
        assert_eq!(records.len(), 1);
        match &records[0] {
            ResultRecord::Import { specifier, .. } => assert_eq!(specifier, "os"),
            other => panic!("unexpected record: {other:?}"),
        }
    }
}
