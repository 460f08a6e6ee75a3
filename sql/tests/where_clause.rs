//! Replays token streams of `WHERE` clauses the way the SQL tokenizer emits
//! them.

use matcher::{MatchResult, Matcher};
use patterns::{parse_tokens, Token};
use sql::{expression_matcher, expression_trie};

fn run(m: &mut Matcher, stream: &str) -> Vec<MatchResult> {
    let toks: Vec<Token> = parse_tokens(stream).unwrap();
    m.matches(&toks).map(|res| res.unwrap()).collect()
}

#[test]
fn grouped_conditions() {
    let mut m = expression_matcher().unwrap();
    let stream = r#"
        paren "(" , identifier "a" , punctuation "." , identifier "anamneses_status" ,
            operator "=" , parameter "?3" , keyword "OR" , parameter "?3" ,
            keyword "IS" , keyword "NULL" , paren ")" ,
        keyword "AND" ,
        paren "(" , identifier "a" , punctuation "." , identifier "anamneses_created_by" ,
            operator "=" , parameter "?4" , keyword "OR" , parameter "?4" ,
            keyword "IS" , keyword "NULL" , paren ")"
    "#;

    let results = run(&mut m, stream);
    assert_eq!(results.len(), 23);
    for (idx, res) in results.iter().enumerate() {
        assert!(res.is_match(), "token {}: {:?}", idx, res);
    }
    assert!(results[10].finished);
    assert!(results.last().unwrap().is_complete());
}

#[test]
fn join_condition() {
    let mut m = expression_matcher().unwrap();
    let results = run(
        &mut m,
        r#"identifier "t1" , punctuation "." , identifier "id" , operator "=" ,
           identifier "t2" , punctuation "." , identifier "id""#,
    );
    assert!(results.iter().all(MatchResult::is_match), "{:?}", results);
    assert!(results.last().unwrap().finished);
}

#[test]
fn negated_group() {
    let mut m = expression_matcher().unwrap();
    let results = run(
        &mut m,
        r#"keyword "NOT" , paren "(" , identifier "deleted" , operator "=" , literal "1" ,
           paren ")""#,
    );
    assert!(results.iter().all(MatchResult::is_match), "{:?}", results);
    assert!(results.last().unwrap().is_complete());
}

#[test]
fn is_not_null() {
    let mut m = expression_matcher().unwrap();
    let results = run(
        &mut m,
        r#"identifier "email" , keyword "IS" , keyword "NOT" , keyword "NULL""#,
    );
    let finished: Vec<bool> = results.iter().map(|r| r.finished).collect();
    assert!(results.iter().all(MatchResult::is_match));
    assert_eq!(finished, vec![false, false, false, true]);
}

#[test]
fn malformed_clauses() {
    let trie = expression_trie().unwrap();
    let tests = vec![
        (r#"identifier "a" , operator "=" , operator "=" , literal "1""#, 2),
        (r#"identifier "a" , keyword "IS" , literal "5""#, 2),
        (r#"paren "(" , paren ")""#, 1),
        (r#"literal "1" , paren ")""#, 1),
    ];
    for (stream, offending) in tests {
        let mut m = Matcher::with_trie(trie.clone());
        let results = run(&mut m, stream);
        for res in &results[..offending] {
            assert!(res.is_match(), "stream {}: {:?}", stream, results);
        }
        assert_eq!(
            results[offending],
            MatchResult {
                finished: true,
                value: None
            },
            "stream {}",
            stream
        );
    }
}
