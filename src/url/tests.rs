use super::{UrlArguments, UrlParseError};

fn segments(target: &str) -> Vec<String> {
    UrlArguments::parse(target)
        .unwrap()
        .segments()
        .map(str::to_string)
        .collect()
}

#[test]
fn test_path_segments() {
    assert_eq!(segments("/a/b/c"), ["a", "b", "c"]);
    assert_eq!(segments("/a//b"), ["a", "", "b"]);
    assert_eq!(segments("/"), [""]);
    assert_eq!(segments("/a/"), ["a", ""]);
    assert_eq!(segments("/favicon.ico"), ["favicon.ico"]);
}

#[test]
fn test_query_pairs() {
    let args = UrlArguments::parse("/postback/XYZ?o=1&dcid=2").unwrap();
    assert_eq!(args.segment_count(), 2);
    assert_eq!(args.segment(1), Some("XYZ"));
    assert_eq!(args.segment(2), None);
    assert_eq!(args.query_count(), 2);
    assert_eq!(args.query("o"), Some("1"));
    assert_eq!(args.query("dcid"), Some("2"));
    assert_eq!(args.query("DCID"), None);
}

#[test]
fn test_fail_closed_query() {
    assert_eq!(
        UrlArguments::parse("/a?x"),
        Err(UrlParseError::MissingEquals { offset: 3 })
    );
    assert_eq!(
        UrlArguments::parse("/a?x="),
        Err(UrlParseError::MissingValue { offset: 3 })
    );
    assert_eq!(
        UrlArguments::parse("/a?x=1&y"),
        Err(UrlParseError::MissingEquals { offset: 7 })
    );
    assert!(UrlArguments::parse("/a?x=1").is_ok());
}

#[test]
fn test_empty_clauses_fail() {
    assert_eq!(
        UrlArguments::parse("/a?x=1&&y=2"),
        Err(UrlParseError::EmptyClause { offset: 7 })
    );
    assert_eq!(
        UrlArguments::parse("/a?x=1&"),
        Err(UrlParseError::EmptyClause { offset: 7 })
    );
}

#[test]
fn test_empty_query_is_valid() {
    let args = UrlArguments::parse("/a?").unwrap();
    assert_eq!(args.query_count(), 0);
    assert_eq!(args.segments().collect::<Vec<_>>(), ["a"]);
}

#[test]
fn test_missing_leading_slash() {
    assert_eq!(
        UrlArguments::parse(""),
        Err(UrlParseError::MissingLeadingSlash)
    );
    assert_eq!(
        UrlArguments::parse("a/b"),
        Err(UrlParseError::MissingLeadingSlash)
    );
    assert_eq!(
        UrlArguments::parse("http://host/a"),
        Err(UrlParseError::MissingLeadingSlash)
    );
}

#[test]
fn test_value_keeps_later_equals_signs() {
    let args = UrlArguments::parse("/p?token=AQ==&k=a=b").unwrap();
    assert_eq!(args.query("token"), Some("AQ=="));
    assert_eq!(args.query("k"), Some("a=b"));
}

#[test]
fn test_duplicate_key_last_write_wins() {
    let args = UrlArguments::parse("/p?a=1&b=2&a=3").unwrap();
    assert_eq!(args.query_count(), 2);
    assert_eq!(args.query("a"), Some("3"));
    let pairs: Vec<_> = args.query_pairs().collect();
    assert_eq!(pairs, [("a", "3"), ("b", "2")]);
}

#[test]
fn test_empty_key_is_accepted() {
    let args = UrlArguments::parse("/p?=1").unwrap();
    assert_eq!(args.query(""), Some("1"));
}

#[test]
fn test_no_percent_decoding() {
    let args = UrlArguments::parse("/a%20b?q=%20x+y").unwrap();
    assert_eq!(args.segment(0), Some("a%20b"));
    assert_eq!(args.query("q"), Some("%20x+y"));
}

#[test]
fn test_question_mark_at_index_one() {
    let args = UrlArguments::parse("/?x=1").unwrap();
    assert_eq!(args.segments().collect::<Vec<_>>(), [""]);
    assert_eq!(args.query("x"), Some("1"));
}

#[test]
fn test_only_first_question_mark_splits() {
    let args = UrlArguments::parse("/a?x=b?c").unwrap();
    assert_eq!(args.query("x"), Some("b?c"));
}

#[test]
fn test_inline_capacity() {
    let small = UrlArguments::parse("/1/2/3/4/5/6/7/8?a=1&b=2").unwrap();
    assert!(!small.spilled());
    let large = UrlArguments::parse("/1/2/3/4/5/6/7/8/9").unwrap();
    assert_eq!(large.segment_count(), 9);
    assert!(large.spilled());
}

#[test]
fn test_reconstruction_reparses_equal() {
    for target in [
        "/",
        "/a/",
        "/a//b",
        "/postback/XYZ?o=1&dcid=2",
        "/p?a=1&b=2&a=3",
        "/p?token=AQ==",
        "/?x=1",
    ] {
        let parsed = UrlArguments::parse(target).unwrap();
        let rebuilt = parsed.to_string();
        let reparsed = UrlArguments::parse(rebuilt.as_str()).unwrap();
        assert_eq!(parsed, reparsed, "target {target} rebuilt as {rebuilt}");
    }
}

#[test]
fn test_as_str_is_verbatim() {
    let args = UrlArguments::parse("/p?a=1&a=2").unwrap();
    assert_eq!(args.as_str(), "/p?a=1&a=2");
    assert_eq!(args.to_string(), "/p?a=2");
}
