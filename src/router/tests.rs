use super::core::captures_at_start;
use super::{PathParams, RouteError, Router};
use regex::Regex;

fn matches_at_start(re: &Regex, path: &str) -> bool {
    captures_at_start(re, path).is_some()
}

#[test]
fn test_pattern_matches_only_at_start() {
    let (re, params) = Router::compile("/a").unwrap();
    assert!(matches_at_start(&re, "/a"));
    assert!(matches_at_start(&re, "/ab"));
    assert!(!matches_at_start(&re, "/x/a"));
    assert!(params.is_empty());
}

#[test]
fn test_compile_keeps_pattern_text_unchanged() {
    let (re, _) = Router::compile(r"^/index/(?P<name>\w+)$").unwrap();
    assert_eq!(re.as_str(), r"^/index/(?P<name>\w+)$");
}

#[test]
fn test_verbose_pattern_with_trailing_comment() {
    let (re, _) = Router::compile("(?x)/a  # comment").unwrap();
    assert!(matches_at_start(&re, "/a"));
    assert!(matches_at_start(&re, "/a/b"));
    assert!(!matches_at_start(&re, "/x/a"));
}

#[test]
fn test_start_match_preferred_over_later_match() {
    // "/b" occurs later in the path too, but the start-0 match must be the one captured.
    let (re, _) = Router::compile(r"/(?P<seg>[a-z]+)").unwrap();
    let captures = captures_at_start(&re, "/abc/def").unwrap();
    assert_eq!(&captures["seg"], "abc");
}

#[test]
fn test_compile_collects_named_groups_in_order() {
    let (_re, params) = Router::compile(r"^/(?P<org>\w+)/(\d+)/(?P<user>\w+)$").unwrap();
    let names: Vec<&str> = params.iter().map(|p| p.as_ref()).collect();
    assert_eq!(names, vec!["org", "user"]);
}

#[test]
fn test_alternation_is_anchored_in_every_branch() {
    let (re, _) = Router::compile("/a|/b").unwrap();
    assert!(matches_at_start(&re, "/b/c"));
    assert!(!matches_at_start(&re, "/x/b"));
}

#[test]
fn test_compile_rejects_invalid_pattern() {
    let err = Router::compile("^/broken/(?P<name>").unwrap_err();
    assert!(matches!(err, RouteError::InvalidPattern { .. }));
    assert!(err.to_string().contains("^/broken/(?P<name>"));
}

#[test]
fn test_params_require_and_parse() {
    let params = PathParams::from_pairs([("num", "42"), ("name", "alice")]);
    assert_eq!(params.require("name").unwrap(), "alice");
    assert_eq!(params.parse::<i64>("num").unwrap(), 42);

    let missing = params.require("id").unwrap_err();
    assert!(matches!(missing, RouteError::MissingParam { ref name } if name == "id"));

    let invalid = params.parse::<i64>("name").unwrap_err();
    assert!(matches!(invalid, RouteError::InvalidParam { ref value, .. } if value == "alice"));
}
