use rlox_lang::literal::Literal;
use rlox_lang::token::{Kind, Location, Token};

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

fn hash(token: &Token) -> u64 {
    let mut hasher = DefaultHasher::new();
    token.hash(&mut hasher);
    hasher.finish()
}

#[test]
fn create_token() {
    let token = Token::new(
        Kind::LeftParen,
        "(".to_string(),
        None,
        Location::new(1, 3),
    );

    assert_eq!(token.kind, Kind::LeftParen);
    assert_eq!(token.lexeme, "(");
    assert_eq!(token.literal, None);
    assert_eq!(token.location.line, 1);
    assert_eq!(token.location.column, 3);
}

#[test]
fn create_synthetic_token() {
    let token = Token::synthetic("init");

    assert_eq!(token.kind, Kind::Identifier);
    assert_eq!(token.lexeme, "init");
    assert_eq!(token.literal, None);
    assert_eq!(token.location, Location::new(0, 0));
}

#[test]
fn display_token() {
    let token = Token::new(
        Kind::LeftParen,
        "(".to_string(),
        None,
        Location::new(1, 3),
    );

    assert_eq!(format!("{}", token), "LeftParen '(' at 1:3");
}

#[test]
fn display_token_with_literal() {
    let token = Token::new(
        Kind::Number,
        "1.5".to_string(),
        Some(Literal::Number(1.5)),
        Location::new(2, 7),
    );

    assert_eq!(format!("{}", token), "Number '1.5' (1.5) at 2:7");
}

#[test]
fn equality_and_hashing_ignore_the_literal() {
    // The resolution map keys tokens by (kind, lexeme, location) only.
    let token = Token::new(Kind::Number, "1".to_string(), None, Location::new(1, 1));
    let with_literal = Token::new(
        Kind::Number,
        "1".to_string(),
        Some(Literal::Number(1.0)),
        Location::new(1, 1),
    );

    assert_eq!(token, with_literal);
    assert_eq!(hash(&token), hash(&with_literal));
}

#[test]
fn same_hash_for_same_token() {
    assert_eq!(hash(&Token::synthetic("init")), hash(&Token::synthetic("init")));
}

#[test]
fn different_hash_for_different_name() {
    assert_ne!(hash(&Token::synthetic("init")), hash(&Token::synthetic("init2")));
}

#[test]
fn different_hash_for_different_kind() {
    let semicolon = Token::new(Kind::Semicolon, ";".to_string(), None, Location::new(1, 3));
    let paren = Token::new(Kind::LeftParen, "(".to_string(), None, Location::new(1, 3));

    assert_ne!(hash(&semicolon), hash(&paren));
}

#[test]
fn different_hash_for_different_location() {
    let first = Token::new(Kind::Semicolon, ";".to_string(), None, Location::new(1, 4));
    let second = Token::new(Kind::Semicolon, ";".to_string(), None, Location::new(2, 4));
    let third = Token::new(Kind::Semicolon, ";".to_string(), None, Location::new(1, 5));

    assert_ne!(hash(&first), hash(&second));
    assert_ne!(hash(&first), hash(&third));

    assert_ne!(first, second);
    assert_ne!(first, third);
}
