//! Block alignment from inline `style` declarations and utility classes.

use cssparser::{
    AtRuleParser, CowRcStr, DeclarationParser, ParseError, Parser, ParserInput, ParserState,
    QualifiedRuleParser, RuleBodyItemParser, RuleBodyParser,
};

use crate::dom::{Dom, NodeId};
use crate::model::Align;

/// Resolve the alignment of an element.
///
/// The inline `text-align` declaration and the editor's `text-*` utility
/// classes are checked together, center first, then right, then justify.
/// Anything else is left aligned.
pub fn element_align(dom: &Dom, id: NodeId) -> Align {
    let declared = dom.attr(id, "style").and_then(text_align);
    let class = dom.attr(id, "class").unwrap_or("");

    if declared == Some(Align::Center) || class.contains("text-center") {
        Align::Center
    } else if declared == Some(Align::Right) || class.contains("text-right") {
        Align::Right
    } else if declared == Some(Align::Justify) || class.contains("text-justify") {
        Align::Justify
    } else {
        Align::Left
    }
}

/// Extract `text-align` from a `style` attribute value. Last declaration wins.
pub fn text_align(style_attr: &str) -> Option<Align> {
    let mut input = ParserInput::new(style_attr);
    let mut parser = Parser::new(&mut input);
    let mut decls = InlineDeclarations { text_align: None };

    for result in RuleBodyParser::new(&mut parser, &mut decls) {
        // Lenient: a malformed declaration must not hide the others.
        let _ = result;
    }
    decls.text_align
}

struct InlineDeclarations {
    text_align: Option<Align>,
}

impl<'i> DeclarationParser<'i> for InlineDeclarations {
    type Declaration = ();
    type Error = ();

    fn parse_value<'t>(
        &mut self,
        name: CowRcStr<'i>,
        input: &mut Parser<'i, 't>,
        _start: &ParserState,
    ) -> Result<(), ParseError<'i, ()>> {
        if !name.eq_ignore_ascii_case("text-align") {
            while input.next().is_ok() {}
            return Ok(());
        }
        let ident = input.expect_ident_cloned()?;
        let align = match ident.to_ascii_lowercase().as_str() {
            "left" | "start" => Align::Left,
            "center" => Align::Center,
            "right" | "end" => Align::Right,
            "justify" => Align::Justify,
            _ => return Err(input.new_custom_error(())),
        };
        let _ = input.try_parse(cssparser::parse_important);
        self.text_align = Some(align);
        Ok(())
    }
}

impl<'i> AtRuleParser<'i> for InlineDeclarations {
    type Prelude = ();
    type AtRule = ();
    type Error = ();
}

impl<'i> QualifiedRuleParser<'i> for InlineDeclarations {
    type Prelude = ();
    type QualifiedRule = ();
    type Error = ();
}

impl<'i> RuleBodyItemParser<'i, (), ()> for InlineDeclarations {
    fn parse_declarations(&self) -> bool {
        true
    }

    fn parse_qualified(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_align_keywords() {
        assert_eq!(text_align("text-align: center"), Some(Align::Center));
        assert_eq!(text_align("TEXT-ALIGN:Right;"), Some(Align::Right));
        assert_eq!(text_align("color: red; text-align: justify !important"), Some(Align::Justify));
        assert_eq!(text_align("font-weight: bold"), None);
    }

    #[test]
    fn test_malformed_declaration_does_not_hide_later_ones() {
        assert_eq!(text_align("color: ; text-align: center"), Some(Align::Center));
        assert_eq!(text_align("text-align: sideways"), None);
    }

    #[test]
    fn test_class_based_alignment() {
        let dom = Dom::parse(r#"<p class="lead text-right">x</p>"#);
        let p = dom.find_by_tag("p").unwrap();
        assert_eq!(element_align(&dom, p), Align::Right);
    }

    #[test]
    fn test_center_wins_over_class() {
        let dom = Dom::parse(r#"<p class="text-right" style="text-align:center">x</p>"#);
        let p = dom.find_by_tag("p").unwrap();
        assert_eq!(element_align(&dom, p), Align::Center);
    }
}
