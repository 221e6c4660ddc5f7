//! Tests for parsing mask text, including error reporting.

#[cfg(test)]
mod tests {
    use crate::fieldmask::{FieldPath, Mask};
    use crate::parser::{parse, parse_with_options, ParseError, ParseOptions, DEFAULT_MAX_DEPTH};
    use pretty_assertions::assert_eq;

    /// Helper to parse and write back in canonical form.
    fn normalize(source: &str) -> String {
        parse(source).unwrap().marshal()
    }

    /// Helper to parse text that must fail.
    fn parse_err(source: &str) -> ParseError {
        match parse(source) {
            Ok(mask) => panic!("expected {:?} to fail, got {:?}", source, mask),
            Err(e) => e,
        }
    }

    #[test]
    fn test_parse_top_level_branches() {
        let mask = parse("spec.max_size_bytes,labels").unwrap();
        assert_eq!(mask.len(), 2);
        assert!(mask.field_parts["labels"].is_empty());
        assert_eq!(mask.field_parts["spec"].marshal(), "max_size_bytes");
        assert_eq!(mask.marshal(), "labels,spec.max_size_bytes");
    }

    #[test]
    fn test_parse_blank_is_empty() {
        for source in ["", " ", "\t\r\n "] {
            assert!(parse(source).unwrap().is_empty(), "{:?}", source);
        }
    }

    #[test]
    fn test_parse_canonical_forms() {
        let cases = [
            ("a", "a"),
            ("a.b.c", "a.b.c"),
            ("b,a", "a,b"),
            ("*", "*"),
            ("*.a,b", "*.a,b"),
            ("a.(b,c)", "a.(b,c)"),
            ("a.(c,b).d", "a.(b.d,c.d)"),
            ("(a,b).(c,d)", "a.(c,d),b.(c,d)"),
            ("a,a.b", "a.b"),
            ("a.b,a.c", "a.(b,c)"),
            ("a.*.b", "a.*.b"),
            (" a . b ,\n c ", "a.b,c"),
            ("a.()", "a"),
            ("a.().b", "a.b"),
            ("()", ""),
            ("((a))", "a"),
            ("a.(b.(c,d),e)", "a.(b.(c,d),e)"),
            ("123.x_1", "123.x_1"),
        ];
        for (source, expected) in cases {
            assert_eq!(normalize(source), expected, "source {:?}", source);
        }
    }

    #[test]
    fn test_parse_grouping_equivalence() {
        assert_eq!(parse("a.(b,c)").unwrap(), parse("a.b,a.c").unwrap());
        assert_eq!(
            parse("x.(a,b).y").unwrap(),
            parse("x.a.y,x.b.y").unwrap()
        );
    }

    #[test]
    fn test_parse_quoted_keys() {
        let mask = parse(r#""a.b".c,"sp ace""#).unwrap();
        assert!(mask.field_parts.contains_key("a.b"));
        assert!(mask.field_parts.contains_key("sp ace"));
        assert_eq!(mask.marshal(), r#""a.b".c,"sp ace""#);

        // Quoting a plain key is allowed but not required.
        assert_eq!(normalize(r#""plain".x"#), "plain.x");
        // A quoted star is a key, not the wildcard.
        let star = parse(r#""*""#).unwrap();
        assert!(star.any.is_none());
        assert!(star.field_parts.contains_key("*"));
        assert_eq!(normalize(r#""к""#), r#""\u043a""#);
    }

    #[test]
    fn test_parse_group_branches_are_independent() {
        let mut mask = parse("(a,b).c").unwrap();
        assert_eq!(mask.marshal(), "a.c,b.c");

        mask.field_parts
            .get_mut("a")
            .unwrap()
            .insert("d", Mask::new());
        assert_eq!(mask.marshal(), "a.(c,d),b.c");
    }

    #[test]
    fn test_parse_returns_fresh_masks() {
        let mut first = parse("a.b").unwrap();
        let second = parse("a.b").unwrap();
        first += &FieldPath::from(vec!["x"]);
        assert_eq!(first.marshal(), "a.b,x");
        assert_eq!(second.marshal(), "a.b");
    }

    #[test]
    fn test_parse_unclosed_brace() {
        let err = parse_err("a.(b,c");
        assert_eq!(err.summary(), "unclosed left brace");
        assert_eq!(err.position(), 2);
        assert_eq!(
            err.to_string(),
            "unclosed left brace at position 2 near \"a.\u{20de}(b,c\""
        );

        let err = parse_err("(a,(b)");
        assert_eq!(err.summary(), "unclosed left brace");
        assert_eq!(err.position(), 0);

        let err = parse_err("a.(");
        assert_eq!(err.summary(), "unclosed left brace");
        assert_eq!(err.position(), 2);
    }

    #[test]
    fn test_parse_unexpected_token() {
        let err = parse_err("a..b");
        assert_eq!(err.position(), 2);
        assert_eq!(
            err.summary(),
            r#"unexpected token TokenDOT("." pos 2), expecting field or submask"#
        );

        let err = parse_err("a b");
        assert_eq!(err.position(), 2);
        assert_eq!(
            err.summary(),
            r#"unexpected token TokenPLAIN_KEY("b" pos 2), expecting separator or closing brace"#
        );

        let err = parse_err(",a");
        assert_eq!(err.position(), 0);
        assert!(err.summary().ends_with("expecting field or submask"));

        let err = parse_err("a(b)");
        assert_eq!(err.position(), 1);
        assert!(err.summary().ends_with("expecting separator or closing brace"));
    }

    #[test]
    fn test_parse_unmatched_brace() {
        let err = parse_err("a)");
        assert_eq!(err.summary(), "unmatched right brace");
        assert_eq!(err.position(), 1);

        let err = parse_err("(a)).b");
        assert_eq!(err.summary(), "unmatched right brace");
        assert_eq!(err.position(), 3);
    }

    #[test]
    fn test_parse_unexpected_end() {
        for (source, position) in [("a.", 2), ("a,", 2), ("a.(b).", 6), ("ключ.", 5)] {
            let err = parse_err(source);
            assert_eq!(err.summary(), "unexpected end of mask", "{:?}", source);
            assert_eq!(err.position(), position, "{:?}", source);
        }
    }

    #[test]
    fn test_parse_lexer_errors() {
        let err = parse_err("a.#");
        assert_eq!(err.summary(), "unexpected symbol");
        assert_eq!(err.position(), 2);

        let err = parse_err(r#"a."x"#);
        assert_eq!(err.summary(), "unterminated quoted string");
        assert_eq!(err.position(), 2);

        let err = parse_err(r#"a."\q""#);
        assert!(err.summary().starts_with("invalid quoted key"));
        assert_eq!(err.input(), r#"a."\q""#);
    }

    #[test]
    fn test_parse_error_through_mask() {
        let err = Mask::unmarshal("a..b").unwrap_err();
        assert!(err.is_parse());
        assert!(err.to_string().contains("at position 2"));

        let err = "a.(b".parse::<Mask>().unwrap_err();
        assert!(err.is_parse());
    }

    #[test]
    fn test_parse_depth_limit() {
        let opts = ParseOptions::default().with_max_depth(2);
        assert_eq!(parse_with_options("a.b", &opts).unwrap().marshal(), "a.b");
        assert_eq!(
            parse_with_options("(a,b).*", &opts).unwrap().marshal(),
            "a.*,b.*"
        );

        let err = parse_with_options("a.b.c", &opts).unwrap_err();
        assert_eq!(err.summary(), "mask is nested too deeply");
        assert_eq!(err.position(), 4);

        let err = parse_with_options("x,a.(b,c).*", &opts).unwrap_err();
        assert_eq!(err.summary(), "mask is nested too deeply");
        assert_eq!(err.position(), 10);
    }

    #[test]
    fn test_parse_default_depth_limit() {
        assert_eq!(ParseOptions::default().max_depth, DEFAULT_MAX_DEPTH);

        let at_limit = vec!["k"; DEFAULT_MAX_DEPTH].join(".");
        assert!(parse(&at_limit).is_ok());

        let too_deep = vec!["k"; DEFAULT_MAX_DEPTH + 1].join(".");
        let err = parse(&too_deep).unwrap_err();
        assert_eq!(err.summary(), "mask is nested too deeply");
        assert_eq!(err.position(), DEFAULT_MAX_DEPTH * 2);
    }

    #[test]
    fn test_parse_deep_parentheses() {
        let depth = 2000;
        let source = format!("{}a{}", "(".repeat(depth), ")".repeat(depth));
        assert_eq!(normalize(&source), "a");
    }
}
