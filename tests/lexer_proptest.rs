//! Property-based tests for the lexer and token chains

use proptest::prelude::*;
use treelex::treelex::{Cell, Descender, Language, Lexer, Parsed, Type};

fn lexer() -> Lexer {
    let mut language = Language::new();
    language
        .add_rule("integer", "[0-9]+", Parsed::integer(Type::new("integer")))
        .unwrap();
    language
        .add_rule("operator", "[-+*/]", Type::new("operator"))
        .unwrap();
    language
        .insert_descender("paren", Descender::delimited("paren", "(", ")").unwrap())
        .unwrap();
    language.add_standard_ignores().unwrap();
    Lexer::new(language)
}

/// Alternating integers and operators, e.g. `["12", "+", "7"]`
fn expression() -> impl Strategy<Value = Vec<String>> {
    (
        0u32..1000,
        prop::collection::vec((prop::sample::select(vec!["+", "-", "*", "/"]), 0u32..1000), 0..8),
    )
        .prop_map(|(first, rest)| {
            let mut tokens = vec![first.to_string()];
            for (operator, operand) in rest {
                tokens.push(operator.to_string());
                tokens.push(operand.to_string());
            }
            tokens
        })
}

/// Space-separated, canonically rendered nested input such as `1 (2 ()) 3`
fn nested_input() -> impl Strategy<Value = String> {
    let leaf = (0u32..100).prop_map(|n| n.to_string());
    let item = leaf.prop_recursive(4, 32, 4, |inner| {
        prop::collection::vec(inner, 0..4).prop_map(|items| format!("({})", items.join(" ")))
    });
    prop::collection::vec(item, 0..6).prop_map(|items| items.join(" "))
}

proptest! {
    #[test]
    fn ignores_are_transparent(
        tokens in expression(),
        separators in prop::collection::vec(prop::sample::select(vec![" ", "\t", "\n", "  \r\n "]), 16),
    ) {
        let lexer = lexer();
        let compact = tokens.concat();
        let mut spaced = String::new();
        for (i, token) in tokens.iter().enumerate() {
            spaced.push_str(separators[i % separators.len()]);
            spaced.push_str(token);
        }

        let compact_chain = lexer.lex(&compact).unwrap();
        let spaced_chain = lexer.lex(&spaced).unwrap();
        prop_assert_eq!(&compact_chain, &spaced_chain);
        prop_assert_eq!(compact_chain.to_string(), tokens.join(" "));
    }

    #[test]
    fn rendering_round_trips(input in nested_input()) {
        let lexer = lexer();
        let chain = lexer.lex(&input).unwrap();
        let rendered = chain.to_string();
        prop_assert_eq!(&rendered, &input);
        prop_assert_eq!(lexer.lex(&rendered).unwrap(), chain);
    }

    #[test]
    fn removal_shortens_chain_by_one(values in prop::collection::vec(0i64..1000, 2..20), index in 1usize..20) {
        let index = index % (values.len() - 1) + 1;
        let chain = Cell::chain(values.iter().map(|&v| Cell::leaf(v, Type::new("integer"))));
        let removed = chain.nth(index).unwrap();
        let following = removed.remove();

        prop_assert_eq!(chain.len(), values.len() - 1);
        prop_assert!(removed.next().is_none());
        prop_assert!(removed.previous().is_none());
        if let Some(following) = following {
            prop_assert!(following.previous().unwrap().ptr_eq(&chain.nth(index - 1).unwrap()));
        }

        let mut expected = values.clone();
        expected.remove(index);
        let remaining: Vec<i64> = chain.iter().filter_map(|c| c.car().as_integer()).collect();
        prop_assert_eq!(remaining, expected);
    }

    #[test]
    fn deep_clone_is_independent(input in nested_input()) {
        let chain = lexer().lex(&input).unwrap();
        let copy = chain.deep_clone();
        prop_assert_eq!(&copy, &chain);
        if let Some(first) = copy.iter().next() {
            first.replace_car("changed", Type::new("word"));
            prop_assert_ne!(copy.to_string(), chain.to_string());
        }
    }
}
