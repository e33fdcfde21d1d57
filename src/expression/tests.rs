use super::*;

fn term(name: &str) -> Item {
    Item::term(name)
}

#[test]
fn test_parse_single_term() {
    let expr = BooleanExpression::parse("Progressive Sword x2").unwrap();
    assert_eq!(
        expr,
        BooleanExpression::and(vec![term("Progressive Sword x2")])
    );
}

#[test]
fn test_parse_and_binds_tighter_than_or() {
    let expr = BooleanExpression::parse("Slingshot | Bomb Bag & Bow").unwrap();
    assert_eq!(
        expr,
        BooleanExpression::or(vec![
            term("Slingshot"),
            Item::Expr(BooleanExpression::and(vec![
                term("Bomb Bag"),
                term("Bow"),
            ])),
        ])
    );
}

#[test]
fn test_parse_parentheses_override_precedence() {
    let expr = BooleanExpression::parse("(Slingshot | Bomb Bag) & Bow").unwrap();
    assert_eq!(
        expr,
        BooleanExpression::and(vec![
            Item::Expr(BooleanExpression::or(vec![
                term("Slingshot"),
                term("Bomb Bag"),
            ])),
            term("Bow"),
        ])
    );
}

#[test]
fn test_parse_flattens_chains() {
    let expr = BooleanExpression::parse("A & B & C & D").unwrap();
    assert_eq!(expr.op, Op::And);
    assert_eq!(expr.items.len(), 4);

    let expr = BooleanExpression::parse("A | B | C").unwrap();
    assert_eq!(expr.op, Op::Or);
    assert_eq!(expr.items.len(), 3);
}

#[test]
fn test_parse_trims_term_whitespace() {
    let expr = BooleanExpression::parse("  Gust Bellows   &   Whip  ").unwrap();
    assert_eq!(
        expr,
        BooleanExpression::and(vec![term("Gust Bellows"), term("Whip")])
    );
}

#[test]
fn test_parse_terms_keep_inner_punctuation() {
    let expr = BooleanExpression::parse(r"Sealed Grounds\Behind the Temple").unwrap();
    assert_eq!(
        expr,
        BooleanExpression::and(vec![term(r"Sealed Grounds\Behind the Temple")])
    );
}

#[test]
fn test_parse_rejects_dangling_operator() {
    assert!(BooleanExpression::parse("Sword &").is_err());
    assert!(BooleanExpression::parse("| Sword").is_err());
    assert!(BooleanExpression::parse("(Sword").is_err());
}

#[test]
fn test_parse_rejects_empty_input() {
    assert!(BooleanExpression::parse("").is_err());
    assert!(BooleanExpression::parse("   ").is_err());
}

#[test]
fn test_display_round_trips_through_parse() {
    let inputs = [
        "Slingshot | Bomb Bag & Bow",
        "(A | B) & C",
        "A & B & C",
    ];
    for input in inputs {
        let expr = BooleanExpression::parse(input).unwrap();
        let reparsed = BooleanExpression::parse(&expr.to_string()).unwrap();
        assert_eq!(expr, reparsed, "display of {:?} did not round trip", input);
    }
}

#[test]
fn test_serialize_tagged_tree() {
    let expr = BooleanExpression::or(vec![
        term("Slingshot"),
        Item::Expr(BooleanExpression::and(vec![
            term("Bomb Bag"),
            term("Bow"),
        ])),
    ]);
    let json = serde_json::to_value(&expr).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "kind": "or",
            "items": [
                "Slingshot",
                {"kind": "and", "items": ["Bomb Bag", "Bow"]},
            ],
        })
    );
}

#[test]
fn test_deserialize_tagged_tree() {
    let json = r#"{"kind": "and", "items": ["Bow", {"kind": "or", "items": ["A", "B"]}]}"#;
    let expr: BooleanExpression = serde_json::from_str(json).unwrap();
    assert_eq!(expr.op, Op::And);
    assert_eq!(expr.items.len(), 2);
    assert_eq!(expr.items[0], term("Bow"));
}

#[test]
fn test_trivial_expressions() {
    assert!(BooleanExpression::always().is_trivially_true());
    assert!(BooleanExpression::never().is_trivially_false());
    assert_eq!(BooleanExpression::always().to_string(), "True");
    assert_eq!(BooleanExpression::never().to_string(), "False");
}
