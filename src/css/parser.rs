//! Stylesheet parser and loader using cssparser
//!
//! Parsing is best-effort: unparseable declarations and selectors are skipped,
//! a failing `@import` is logged and skipped, and an unterminated block ends
//! rule collection at end of input.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use cssparser::{BasicParseErrorKind, Delimiter, ParseError, Parser, ParserInput, Token};

use super::properties::StyleProperties;
use super::selector::Selector;
use super::value::ComponentValue;
use crate::utils::{HudError, Result};

/// A `name: value` pair before interpretation
#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    pub name: String,
    pub value: Vec<ComponentValue>,
}

/// Selector + shared property set + source order
#[derive(Debug, Clone)]
pub struct StyleRule {
    pub selector: Selector,
    pub properties: Rc<StyleProperties>,
    /// Monotonically increasing across the sheet, imports included
    pub source_order: u32,
}

impl StyleRule {
    pub fn specificity(&self) -> u32 {
        self.selector.specificity()
    }
}

/// An ordered list of rules. Read-only once loaded.
#[derive(Debug, Clone, Default)]
pub struct StyleSheet {
    pub rules: Vec<StyleRule>,
    /// Files read while loading, in inclusion order
    pub files: Vec<PathBuf>,
}

/// Where stylesheet text comes from
pub trait StyleSource {
    fn read_to_string(&self, path: &Path) -> std::io::Result<String>;

    /// Key used by the import cycle guard
    fn identity(&self, path: &Path) -> PathBuf {
        path.to_path_buf()
    }
}

/// Reads stylesheets from disk
#[derive(Debug, Clone, Copy, Default)]
pub struct FileSystemSource;

impl StyleSource for FileSystemSource {
    fn read_to_string(&self, path: &Path) -> std::io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn identity(&self, path: &Path) -> PathBuf {
        std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
    }
}

impl StyleSheet {
    /// Parse stylesheet text. `@import` directives need a base directory and
    /// are skipped here; use [`StyleSheet::load`] for files.
    pub fn parse(text: &str) -> Self {
        let source = FileSystemSource;
        let mut parser = StyleSheetParser::new(&source);
        parser.parse_text(text, None);
        parser.finish()
    }

    /// Parse text whose imports resolve relative to `base_dir`
    pub fn parse_with_base(text: &str, base_dir: &Path, source: &dyn StyleSource) -> Self {
        let mut parser = StyleSheetParser::new(source);
        parser.parse_text(text, Some(base_dir));
        parser.finish()
    }

    /// Load a stylesheet file from disk, following imports
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Self::load_with(&FileSystemSource, path)
    }

    /// Load through a custom source. Only the top-level file is fatal when
    /// missing.
    pub fn load_with(source: &dyn StyleSource, path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut parser = StyleSheetParser::new(source);
        parser
            .include_file(path)
            .map_err(|err| HudError::io(path, err))?;
        let sheet = parser.finish();
        log::debug!(
            "loaded stylesheet {} ({} rules from {} files)",
            path.display(),
            sheet.rules.len(),
            sheet.files.len()
        );
        Ok(sheet)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Stateful parser shared across a file and everything it imports
pub struct StyleSheetParser<'a> {
    source: &'a dyn StyleSource,
    visited: HashSet<PathBuf>,
    rules: Vec<StyleRule>,
    files: Vec<PathBuf>,
    next_order: u32,
}

impl<'a> StyleSheetParser<'a> {
    pub fn new(source: &'a dyn StyleSource) -> Self {
        Self {
            source,
            visited: HashSet::new(),
            rules: Vec::new(),
            files: Vec::new(),
            next_order: 0,
        }
    }

    pub fn finish(self) -> StyleSheet {
        StyleSheet {
            rules: self.rules,
            files: self.files,
        }
    }

    /// Read and parse a file. Already visited files are skipped.
    pub fn include_file(&mut self, path: &Path) -> std::io::Result<()> {
        let key = self.source.identity(path);
        if !self.visited.insert(key) {
            log::warn!("skipping @import of {}: already included", path.display());
            return Ok(());
        }
        let text = self.source.read_to_string(path)?;
        self.files.push(path.to_path_buf());
        self.parse_text(&text, path.parent());
        Ok(())
    }

    /// Parse stylesheet text into the rule list
    pub fn parse_text(&mut self, text: &str, base_dir: Option<&Path>) {
        let mut input = ParserInput::new(text);
        let mut parser = Parser::new(&mut input);

        loop {
            parser.skip_whitespace();
            if parser.is_exhausted() {
                break;
            }
            if self.parse_rule(&mut parser, base_dir).is_err() {
                skip_to_next_rule(&mut parser);
            }
        }
    }

    /// Parse one rule or at-rule
    fn parse_rule<'i>(
        &mut self,
        parser: &mut Parser<'i, '_>,
        base_dir: Option<&Path>,
    ) -> std::result::Result<(), ParseError<'i, ()>> {
        let mut selector_text = String::new();

        loop {
            let token = match parser.next_including_whitespace().cloned() {
                Ok(token) => token,
                Err(_) => return Err(parser.new_error(BasicParseErrorKind::EndOfInput)),
            };
            match token {
                Token::AtKeyword(name) if selector_text.trim().is_empty() => {
                    return self.parse_at_rule(parser, &name, base_dir);
                }
                Token::CurlyBracketBlock => {
                    let declarations = parser
                        .parse_nested_block(|p| Ok::<_, ParseError<'i, ()>>(parse_declarations(p)))?;
                    self.push_rule(&selector_text, &declarations);
                    return Ok(());
                }
                Token::Semicolon if selector_text.trim().is_empty() => return Ok(()),
                other => append_selector_token(&mut selector_text, &other),
            }
        }
    }

    fn parse_at_rule<'i>(
        &mut self,
        parser: &mut Parser<'i, '_>,
        name: &str,
        base_dir: Option<&Path>,
    ) -> std::result::Result<(), ParseError<'i, ()>> {
        let prelude = parser.parse_until_after(
            Delimiter::Semicolon | Delimiter::CurlyBracketBlock,
            |p| Ok::<_, ParseError<'i, ()>>(parse_component_values(p)),
        )?;

        if !name.eq_ignore_ascii_case("import") {
            log::debug!("skipping unsupported at-rule @{}", name);
            return Ok(());
        }

        let target = prelude.iter().find_map(|value| match value {
            ComponentValue::String(path) => Some(path.clone()),
            ComponentValue::Function(f, args) if f == "url" => args.iter().find_map(|a| match a {
                ComponentValue::String(path) => Some(path.clone()),
                _ => None,
            }),
            _ => None,
        });

        match (target, base_dir) {
            (Some(relative), Some(base)) => {
                let path = base.join(&relative);
                if let Err(err) = self.include_file(&path) {
                    log::warn!("skipping @import {}: {}", path.display(), err);
                }
            }
            (Some(relative), None) => {
                log::warn!("skipping @import \"{}\": stylesheet has no base directory", relative);
            }
            (None, _) => log::warn!("skipping malformed @import"),
        }
        Ok(())
    }

    fn push_rule(&mut self, selector_text: &str, declarations: &[Declaration]) {
        let selectors = Selector::parse_list(selector_text);
        if selectors.is_empty() {
            return;
        }

        let mut properties = StyleProperties::new();
        for declaration in declarations {
            if !properties.apply_declaration(&declaration.name, &declaration.value) {
                log::debug!("ignoring declaration `{}`", declaration.name);
            }
        }

        let properties = Rc::new(properties);
        let source_order = self.next_order;
        self.next_order += 1;
        for selector in selectors {
            self.rules.push(StyleRule {
                selector,
                properties: Rc::clone(&properties),
                source_order,
            });
        }
    }
}

/// Parse a bare declaration list, as used by inline styles
pub fn parse_declaration_list(text: &str) -> Vec<Declaration> {
    let mut input = ParserInput::new(text);
    let mut parser = Parser::new(&mut input);
    parse_declarations(&mut parser)
}

/// Parse declarations inside a rule block
fn parse_declarations<'i>(parser: &mut Parser<'i, '_>) -> Vec<Declaration> {
    let mut declarations = Vec::new();

    loop {
        parser.skip_whitespace();
        if parser.is_exhausted() {
            break;
        }

        let result: std::result::Result<Declaration, ParseError<'i, ()>> = parser.try_parse(|p| {
            let name = p.expect_ident()?.to_ascii_lowercase();
            p.expect_colon()?;
            let value = p.parse_until_before(Delimiter::Semicolon, |p| {
                Ok::<_, ParseError<'i, ()>>(parse_component_values(p))
            })?;
            Ok(Declaration { name, value })
        });

        match result {
            Ok(declaration) => {
                if !declaration.value.is_empty() {
                    declarations.push(declaration);
                }
            }
            Err(_) => skip_to_semicolon(parser),
        }

        let _ = parser.try_parse(|p| p.expect_semicolon());
    }

    declarations
}

/// Tokenize a value into component values until the parser is exhausted
fn parse_component_values<'i>(parser: &mut Parser<'i, '_>) -> Vec<ComponentValue> {
    let mut values = Vec::new();

    while let Ok(token) = parser.next().cloned() {
        let value = match token {
            Token::Number { value, .. } => ComponentValue::Number(value),
            Token::Percentage { unit_value, .. } => ComponentValue::Percentage(unit_value * 100.0),
            Token::Dimension { value, unit, .. } => {
                ComponentValue::Dimension(value, unit.to_ascii_lowercase())
            }
            Token::Ident(name) => ComponentValue::Ident(name.to_string()),
            Token::Hash(hash) | Token::IDHash(hash) => ComponentValue::Hash(hash.to_string()),
            Token::QuotedString(text) => ComponentValue::String(text.to_string()),
            Token::UnquotedUrl(url) => {
                ComponentValue::Function("url".to_string(), vec![ComponentValue::String(url.to_string())])
            }
            Token::Comma => ComponentValue::Comma,
            Token::Delim(c) => ComponentValue::Delim(c),
            Token::Function(name) => {
                let name = name.to_ascii_lowercase();
                let args = parser
                    .parse_nested_block(|p| Ok::<_, ParseError<'i, ()>>(parse_component_values(p)))
                    .unwrap_or_default();
                ComponentValue::Function(name, args)
            }
            _ => continue,
        };
        values.push(value);
    }

    values
}

/// Rebuild selector text from tokens; unsupported tokens poison the clause
fn append_selector_token(out: &mut String, token: &Token<'_>) {
    match token {
        Token::Ident(name) => out.push_str(name),
        Token::IDHash(hash) | Token::Hash(hash) => {
            out.push('#');
            out.push_str(hash);
        }
        Token::Delim(c) => out.push(*c),
        Token::Comma => out.push(','),
        Token::WhiteSpace(_) => out.push(' '),
        Token::Colon => out.push(':'),
        _ => out.push('\u{1}'),
    }
}

/// Skip to the next rule (after closing brace)
fn skip_to_next_rule(parser: &mut Parser<'_, '_>) {
    loop {
        match parser.next() {
            Ok(Token::CurlyBracketBlock) | Err(_) => break,
            _ => continue,
        }
    }
}

/// Skip to next semicolon or end of block
fn skip_to_semicolon(parser: &mut Parser<'_, '_>) {
    loop {
        match parser.next() {
            Ok(Token::Semicolon) | Err(_) => break,
            _ => continue,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::css::{Color, Length};
    use std::collections::HashMap;

    /// In-memory files keyed by path
    struct MemorySource(HashMap<PathBuf, String>);

    impl MemorySource {
        fn new(files: &[(&str, &str)]) -> Self {
            Self(
                files
                    .iter()
                    .map(|(path, text)| (PathBuf::from(path), text.to_string()))
                    .collect(),
            )
        }
    }

    impl StyleSource for MemorySource {
        fn read_to_string(&self, path: &Path) -> std::io::Result<String> {
            self.0
                .get(path)
                .cloned()
                .ok_or_else(|| std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"))
        }
    }

    #[test]
    fn test_parse_simple_rule() {
        let sheet = StyleSheet::parse("Label { color: red; }");

        assert_eq!(sheet.rules.len(), 1);
        let rule = &sheet.rules[0];
        assert_eq!(rule.selector.to_string(), "Label");
        assert_eq!(rule.properties.color, Some(Color::rgb(255, 0, 0)));
    }

    #[test]
    fn test_selector_list_shares_properties_and_order() {
        let sheet = StyleSheet::parse("Button, .primary { width: 100px; } #Hud { height: 5px; }");

        assert_eq!(sheet.rules.len(), 3);
        assert_eq!(sheet.rules[0].source_order, 0);
        assert_eq!(sheet.rules[1].source_order, 0);
        assert_eq!(sheet.rules[2].source_order, 1);
        assert!(Rc::ptr_eq(&sheet.rules[0].properties, &sheet.rules[1].properties));
    }

    #[test]
    fn test_descendant_whitespace_survives_tokenizing() {
        let sheet = StyleSheet::parse("#Menu .row > Label:hover { opacity: 0.5; }");

        assert_eq!(sheet.rules.len(), 1);
        assert_eq!(sheet.rules[0].selector.steps.len(), 3);
        assert_eq!(sheet.rules[0].selector.to_string(), "#Menu .row > Label:hover");
    }

    #[test]
    fn test_comments_are_stripped() {
        let sheet = StyleSheet::parse(
            "/* header */ Label /* mid */ { /* inside */ color: blue; /* end */ }",
        );

        assert_eq!(sheet.rules.len(), 1);
        assert_eq!(sheet.rules[0].properties.color, Some(Color::rgb(0, 0, 255)));
    }

    #[test]
    fn test_bad_declaration_is_skipped() {
        let sheet = StyleSheet::parse("Panel { width 10px; color: red; : ; height: 20px; }");

        let props = &sheet.rules[0].properties;
        assert_eq!(props.width, None);
        assert_eq!(props.color, Some(Color::rgb(255, 0, 0)));
        assert_eq!(props.height, Some(Length::px(20.0)));
    }

    #[test]
    fn test_unterminated_block_stops_at_end() {
        let sheet = StyleSheet::parse("Panel { width: 10px; } Label { color: red;");

        assert_eq!(sheet.rules.len(), 2);
        assert_eq!(sheet.rules[1].properties.color, Some(Color::rgb(255, 0, 0)));
    }

    #[test]
    fn test_trailing_selector_without_block() {
        let sheet = StyleSheet::parse("Panel { width: 10px; } Label");
        assert_eq!(sheet.rules.len(), 1);
    }

    #[test]
    fn test_unsupported_selector_keeps_rule_inert() {
        let sheet = StyleSheet::parse("Panel[data-x] { width: 1px; } Label { width: 2px; }");
        assert_eq!(sheet.rules.len(), 1);
        assert_eq!(sheet.rules[0].properties.width, Some(Length::px(2.0)));
    }

    #[test]
    fn test_imports_processed_in_place() {
        let source = MemorySource::new(&[
            ("ui/main.css", "Panel { width: 1px; } @import \"common/base.css\"; Label { width: 3px; }"),
            ("ui/common/base.css", "Button { width: 2px; }"),
        ]);

        let sheet = StyleSheet::load_with(&source, "ui/main.css").unwrap();

        let widths: Vec<_> = sheet.rules.iter().map(|r| r.properties.width).collect();
        assert_eq!(
            widths,
            vec![Some(Length::px(1.0)), Some(Length::px(2.0)), Some(Length::px(3.0))]
        );
        let orders: Vec<_> = sheet.rules.iter().map(|r| r.source_order).collect();
        assert_eq!(orders, vec![0, 1, 2]);
        assert_eq!(sheet.files.len(), 2);
    }

    #[test]
    fn test_import_cycle_is_guarded() {
        let source = MemorySource::new(&[
            ("a.css", "@import url(\"b.css\"); Panel { width: 1px; }"),
            ("b.css", "@import \"a.css\"; Label { width: 2px; }"),
        ]);

        let sheet = StyleSheet::load_with(&source, "a.css").unwrap();
        assert_eq!(sheet.rules.len(), 2);
    }

    #[test]
    fn test_missing_import_is_not_fatal() {
        let source = MemorySource::new(&[("main.css", "@import \"gone.css\"; Panel { width: 1px; }")]);

        let sheet = StyleSheet::load_with(&source, "main.css").unwrap();
        assert_eq!(sheet.rules.len(), 1);
    }

    #[test]
    fn test_missing_top_level_file_is_an_error() {
        let source = MemorySource::new(&[]);
        let err = StyleSheet::load_with(&source, "nope.css").unwrap_err();
        assert!(matches!(err, HudError::Io { .. }));
    }

    #[test]
    fn test_other_at_rules_are_skipped() {
        let sheet = StyleSheet::parse("@keyframes spin { from { opacity: 0; } } @charset \"utf-8\"; Label { opacity: 1; }");
        assert_eq!(sheet.rules.len(), 1);
    }

    #[test]
    fn test_inline_declaration_list() {
        let declarations = parse_declaration_list("width: 10px; Color: RED");
        assert_eq!(declarations.len(), 2);
        assert_eq!(declarations[1].name, "color");
    }
}
