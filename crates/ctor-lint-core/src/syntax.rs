//! Bridge from `syn` syntax trees to layout trees.
//!
//! Rules subscribe to constructor declarations through [`constructors`],
//! which walks a parsed file and yields one [`ConstructorSite`] per
//! constructor found in any `impl` block.

use crate::layout::{
    ConstructorDecl, LineEnding, Parameter, ParameterList, TextPos, TextSpan, Trivia,
};

use proc_macro2::{LineColumn, Span};
use std::sync::Arc;
use syn::spanned::Spanned;
use syn::visit::Visit;
use syn::{FnArg, GenericArgument, ImplItemFn, ItemImpl, PathArguments, ReturnType, Type};

const BOM: char = '\u{feff}';

/// Maps `proc-macro2` line/column pairs to byte offsets in a document.
///
/// `syn::parse_file` drops a leading byte order mark, so column 0 of the
/// first line is the character after it.
#[derive(Debug, Clone)]
pub struct LineIndex<'a> {
    content: &'a str,
    line_starts: Vec<usize>,
    line_ending: LineEnding,
}

impl<'a> LineIndex<'a> {
    /// Indexes the line starts of `content`.
    #[must_use]
    pub fn new(content: &'a str) -> Self {
        let first = if content.starts_with(BOM) {
            BOM.len_utf8()
        } else {
            0
        };
        let line_starts = std::iter::once(first)
            .chain(content.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        Self {
            content,
            line_starts,
            line_ending: LineEnding::detect(content),
        }
    }

    /// The indexed document.
    #[must_use]
    pub fn content(&self) -> &'a str {
        self.content
    }

    /// Line ending of the document.
    #[must_use]
    pub fn line_ending(&self) -> LineEnding {
        self.line_ending
    }

    /// Byte offset of a 1-indexed line and 0-indexed character column.
    ///
    /// Positions past the end of a line or document clamp to it.
    #[must_use]
    pub fn offset(&self, at: LineColumn) -> usize {
        let Some(&line_start) = at.line.checked_sub(1).and_then(|i| self.line_starts.get(i))
        else {
            return self.content.len();
        };
        let line_end = self
            .line_starts
            .get(at.line)
            .map_or(self.content.len(), |next| next - 1);

        self.content[line_start..line_end]
            .char_indices()
            .nth(at.column)
            .map_or(line_end, |(i, _)| line_start + i)
    }

    /// Converts a `proc-macro2` position into a [`TextPos`].
    #[must_use]
    pub fn pos(&self, at: LineColumn) -> TextPos {
        TextPos::new(at.line, at.column, self.offset(at))
    }

    /// Converts a `proc-macro2` span into a [`TextSpan`].
    #[must_use]
    pub fn span(&self, span: Span) -> TextSpan {
        TextSpan::new(self.pos(span.start()), self.pos(span.end()))
    }

    /// Source text covered by a span.
    #[must_use]
    pub fn slice(&self, span: TextSpan) -> Option<&'a str> {
        self.content.get(span.start.offset..span.end.offset)
    }

    /// Leading whitespace of a 1-indexed line.
    #[must_use]
    pub fn indentation(&self, line: usize) -> &'a str {
        let Some(&start) = line.checked_sub(1).and_then(|i| self.line_starts.get(i)) else {
            return "";
        };
        let rest = &self.content[start..];
        let len = rest
            .find(|c: char| c == '\n' || !c.is_whitespace())
            .unwrap_or(rest.len());
        &rest[..len]
    }
}

/// Returns the name of the type an `impl` block implements.
#[must_use]
pub fn impl_owner(item: &ItemImpl) -> Option<String> {
    match &*item.self_ty {
        Type::Path(type_path) => type_path
            .path
            .segments
            .last()
            .map(|segment| segment.ident.to_string()),
        _ => None,
    }
}

/// Checks whether `method` constructs `owner`.
///
/// A constructor takes no `self` receiver and returns `Self`, the owner type,
/// or one of those as the first type argument of a wrapper such as
/// `Result<Self, E>` or `Option<Self>`.
#[must_use]
pub fn is_constructor(method: &ImplItemFn, owner: &str) -> bool {
    if method.sig.receiver().is_some() {
        return false;
    }
    match &method.sig.output {
        ReturnType::Default => false,
        ReturnType::Type(_, ty) => returns_owner(ty, owner),
    }
}

fn returns_owner(ty: &Type, owner: &str) -> bool {
    if names_owner(ty, owner) {
        return true;
    }
    let Type::Path(type_path) = ty else {
        return false;
    };
    let Some(last) = type_path.path.segments.last() else {
        return false;
    };
    let PathArguments::AngleBracketed(args) = &last.arguments else {
        return false;
    };
    matches!(args.args.first(), Some(GenericArgument::Type(inner)) if names_owner(inner, owner))
}

fn names_owner(ty: &Type, owner: &str) -> bool {
    match ty {
        Type::Path(type_path) if type_path.qself.is_none() => type_path
            .path
            .segments
            .last()
            .is_some_and(|segment| segment.ident == "Self" || segment.ident == owner),
        Type::Group(group) => names_owner(&group.elem, owner),
        Type::Paren(paren) => names_owner(&paren.elem, owner),
        _ => false,
    }
}

/// Builds the layout tree for a constructor's parameter list.
///
/// Returns `None` if the spans do not map onto `index` (e.g. the AST was not
/// parsed from the indexed document).
#[must_use]
pub fn constructor_decl(
    owner: &str,
    method: &ImplItemFn,
    index: &LineIndex<'_>,
) -> Option<ConstructorDecl> {
    let sig = &method.sig;
    let content = index.content();
    let start = index.pos(sig.paren_token.span.open().end());
    let end = index.offset(sig.paren_token.span.close().start());

    let mut parameters = Vec::with_capacity(sig.inputs.len());
    let mut cursor = start.offset;

    for pair in sig.inputs.pairs() {
        let (arg, comma) = pair.into_tuple();
        let span = index.span(arg.span());
        let separator_end = comma.map_or(span.end.offset, |c| index.offset(c.spans[0].end()));

        let leading = Trivia::parse(content.get(cursor..span.start.offset)?);
        let text = index.slice(span)?;
        let separator = content.get(span.end.offset..separator_end)?;

        parameters.push(Arc::new(Parameter::new(
            param_name(arg, index).unwrap_or(text),
            leading,
            text,
            separator,
            span,
        )));
        cursor = separator_end;
    }

    let trailing = Trivia::parse(content.get(cursor..end)?);
    let list = ParameterList::new(start.offset..end, start, parameters, trailing);
    let indent = index.indentation(sig.fn_token.span.start().line);

    Some(
        ConstructorDecl::new(owner, sig.ident.to_string(), indent, list)
            .with_line_ending(index.line_ending()),
    )
}

fn param_name<'a>(arg: &FnArg, index: &LineIndex<'a>) -> Option<&'a str> {
    match arg {
        FnArg::Receiver(_) => Some("self"),
        FnArg::Typed(typed) => index.slice(index.span(typed.pat.span())),
    }
}

/// A constructor found in a source file.
#[derive(Debug, Clone)]
pub struct ConstructorSite {
    /// The constructor's layout tree.
    pub decl: ConstructorDecl,
    /// Line where the item starts, including its attributes.
    pub item_line: usize,
    /// Line of the `fn` keyword.
    pub fn_line: usize,
}

/// Collects every constructor declared in `ast`.
///
/// `index` must be built from the text `ast` was parsed from.
#[must_use]
pub fn constructors(ast: &syn::File, index: &LineIndex<'_>) -> Vec<ConstructorSite> {
    let mut collector = ConstructorCollector {
        index,
        owners: Vec::new(),
        sites: Vec::new(),
    };
    collector.visit_file(ast);
    collector.sites
}

struct ConstructorCollector<'i, 'a> {
    index: &'i LineIndex<'a>,
    owners: Vec<Option<String>>,
    sites: Vec<ConstructorSite>,
}

impl<'ast> Visit<'ast> for ConstructorCollector<'_, '_> {
    fn visit_item_impl(&mut self, node: &'ast ItemImpl) {
        self.owners.push(impl_owner(node));
        syn::visit::visit_item_impl(self, node);
        self.owners.pop();
    }

    fn visit_impl_item_fn(&mut self, node: &'ast ImplItemFn) {
        if let Some(Some(owner)) = self.owners.last() {
            if is_constructor(node, owner) {
                if let Some(decl) = constructor_decl(owner, node, self.index) {
                    self.sites.push(ConstructorSite {
                        decl,
                        item_line: node.span().start().line,
                        fn_line: node.sig.fn_token.span.start().line,
                    });
                }
            }
        }

        // Nested impls inside the body are visited with their own owner.
        syn::visit::visit_impl_item_fn(self, node);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sites(code: &str) -> Vec<ConstructorSite> {
        let ast = syn::parse_file(code).expect("Failed to parse");
        constructors(&ast, &LineIndex::new(code))
    }

    #[test]
    fn test_line_index_offsets() {
        let index = LineIndex::new("ab\nçd\n");
        assert_eq!(index.offset(LineColumn { line: 1, column: 0 }), 0);
        assert_eq!(index.offset(LineColumn { line: 2, column: 1 }), 5);
        assert_eq!(index.offset(LineColumn { line: 2, column: 2 }), 6);
        assert_eq!(index.offset(LineColumn { line: 9, column: 0 }), 7);
    }

    #[test]
    fn test_line_index_skips_byte_order_mark() {
        let index = LineIndex::new("\u{feff}ab\ncd");
        assert_eq!(index.offset(LineColumn { line: 1, column: 0 }), 3);
        assert_eq!(index.offset(LineColumn { line: 2, column: 1 }), 7);
        assert_eq!(index.indentation(1), "");
    }

    #[test]
    fn test_byte_order_mark_keeps_parameter_text() {
        let code = "\u{feff}impl A { fn new(a: u8, b: u8, c: u8) -> Self { todo!() } }";
        let found = sites(code);
        let list = found[0].decl.parameters();
        let params = list.parameters();

        assert_eq!(&code[list.source_range()], "a: u8, b: u8, c: u8");
        assert_eq!(params[0].text(), "a: u8");
        assert_eq!(params[0].separator(), ",");
        assert_eq!(params[1].leading().to_string(), " ");
        assert_eq!(list.render(), "a: u8, b: u8, c: u8");
    }

    #[test]
    fn test_detects_crlf_documents() {
        let found = sites("impl A {\r\n    fn new(a: u8) -> Self { todo!() }\r\n}\r\n");
        assert_eq!(found[0].decl.line_ending(), LineEnding::CrLf);
        assert_eq!(found[0].decl.indent(), "    ");

        let found = sites("impl A { fn new(a: u8) -> Self { todo!() } }");
        assert_eq!(found[0].decl.line_ending(), LineEnding::Lf);
    }

    #[test]
    fn test_indentation() {
        let index = LineIndex::new("impl A {\n    fn new() {}\n}");
        assert_eq!(index.indentation(1), "");
        assert_eq!(index.indentation(2), "    ");
    }

    #[test]
    fn test_collects_constructors_only() {
        let found = sites(
            r"
struct Point { x: i32, y: i32 }

impl Point {
    pub fn new(x: i32, y: i32) -> Self { Self { x, y } }
    pub fn origin() -> Point { Self { x: 0, y: 0 } }
    pub fn try_new(x: i32, y: i32) -> Result<Self, String> { Ok(Self { x, y }) }
    pub fn len(&self) -> i32 { self.x }
    pub fn helper(x: i32) -> i32 { x }
}
",
        );
        let names: Vec<&str> = found.iter().map(|s| s.decl.name()).collect();
        assert_eq!(names, vec!["new", "origin", "try_new"]);
        assert!(found.iter().all(|s| s.decl.owner() == "Point"));
    }

    #[test]
    fn test_builds_parameter_layout() {
        let code = "impl P {\n    fn new(a: i32, /* c */ b: u8,\n        c: &str,) -> Self { todo!() }\n}\n";
        let found = sites(code);
        assert_eq!(found.len(), 1);

        let decl = &found[0].decl;
        assert_eq!(decl.indent(), "    ");
        assert_eq!(found[0].fn_line, 2);

        let params = decl.parameters().parameters();
        let names: Vec<&str> = params.iter().map(|p| p.name()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
        assert_eq!(params[1].leading().to_string(), " /* c */ ");
        assert_eq!(params[2].text(), "c: &str");
        assert_eq!(params[2].separator(), ",");
        assert_eq!(params[0].end_line(), 2);
        assert_eq!(params[1].end_line(), 2);
        assert_eq!(params[2].end_line(), 3);

        // Rendering the untouched list reproduces the source exactly.
        let range = decl.parameters().source_range();
        assert_eq!(decl.parameters().render(), &code[range]);
    }

    #[test]
    fn test_parameter_span_includes_attributes() {
        let code = "impl P {\n    fn new(#[allow(unused)] a: i32) -> Self { todo!() }\n}\n";
        let found = sites(code);
        let param = &found[0].decl.parameters().parameters()[0];
        assert_eq!(param.text(), "#[allow(unused)] a: i32");
        assert_eq!(param.name(), "a");
    }

    #[test]
    fn test_nested_impl_uses_its_own_owner() {
        let found = sites(
            r"
impl Outer {
    fn build(x: i32) -> i32 {
        struct Inner;
        impl Inner {
            fn new(a: u8) -> Self { Inner }
        }
        x
    }
}
",
        );
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].decl.owner(), "Inner");
    }
}
