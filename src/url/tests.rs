use super::serializer::serialize_tree;
use super::tree::{contains_tree, UrlSegmentGroup, PRIMARY_OUTLET};
use super::*;
use crate::errors::UrlParseError;
use crate::params::QueryParams;

fn parse(url: &str) -> UrlTree {
    DefaultUrlSerializer.parse(url).expect("parse failed")
}

fn roundtrip(url: &str) {
    assert_eq!(serialize_tree(&parse(url)), url);
}

#[test]
fn test_parse_empty_url() {
    let tree = parse("");
    assert!(tree.root.segments.is_empty());
    assert!(!tree.root.has_children());
    assert_eq!(serialize_tree(&tree), "/");
}

#[test]
fn test_parse_simple_chain() {
    let tree = parse("/one/two/three");
    let primary = tree.root.child(PRIMARY_OUTLET).unwrap();
    let paths: Vec<&str> = primary.segments.iter().map(|s| s.path.as_str()).collect();
    assert_eq!(paths, vec!["one", "two", "three"]);
    roundtrip("/one/two/three");
}

#[test]
fn test_parse_matrix_params() {
    let tree = parse("/team;id=33/user;name=bob");
    let primary = tree.root.child(PRIMARY_OUTLET).unwrap();
    assert_eq!(primary.segments[0].path, "team");
    assert_eq!(primary.segments[0].parameter("id"), Some("33"));
    assert_eq!(primary.segments[1].path, "user");
    assert_eq!(primary.segments[1].parameter("name"), Some("bob"));
    roundtrip("/team;id=33/user;name=bob");
}

#[test]
fn test_parse_matrix_param_without_value() {
    let tree = parse("/one;flag");
    let primary = tree.root.child(PRIMARY_OUTLET).unwrap();
    assert_eq!(primary.segments[0].parameter("flag"), Some(""));
}

#[test]
fn test_parse_secondary_outlet() {
    let tree = parse("/inbox/33(popup:compose)?debug=true#frag");
    let primary = tree.root.child(PRIMARY_OUTLET).unwrap();
    let paths: Vec<&str> = primary.segments.iter().map(|s| s.path.as_str()).collect();
    assert_eq!(paths, vec!["inbox", "33"]);
    let popup = tree.root.child("popup").unwrap();
    assert_eq!(popup.segments[0].path, "compose");
    assert_eq!(tree.query_params.get("debug"), Some("true"));
    assert_eq!(tree.fragment.as_deref(), Some("frag"));
    roundtrip("/inbox/33(popup:compose)?debug=true#frag");
}

#[test]
fn test_parse_purely_secondary() {
    let tree = parse("/(popup:compose)");
    assert!(tree.root.child(PRIMARY_OUTLET).is_none());
    assert!(tree.root.child("popup").is_some());
    roundtrip("/(popup:compose)");
}

#[test]
fn test_parse_nested_outlets() {
    let tree = parse("/a/(b//left:c)");
    let primary = tree.root.child(PRIMARY_OUTLET).unwrap();
    assert_eq!(primary.segments[0].path, "a");
    let b = primary.child(PRIMARY_OUTLET).unwrap();
    assert_eq!(b.segments[0].path, "b");
    let left = primary.child("left").unwrap();
    assert_eq!(left.segments[0].path, "c");
    roundtrip("/a/(b//left:c)");
}

#[test]
fn test_parse_two_secondary_outlets() {
    let tree = parse("/a(left:b//right:c)");
    assert!(tree.root.child("left").is_some());
    assert!(tree.root.child("right").is_some());
    roundtrip("/a(left:b//right:c)");
}

#[test]
fn test_repeated_query_keys_accumulate() {
    let tree = parse("/a?k=1&k=2&other=x");
    assert_eq!(
        tree.query_params.get_all("k"),
        Some(&["1".to_string(), "2".to_string()][..])
    );
    assert_eq!(tree.query_params.get("other"), Some("x"));
    roundtrip("/a?k=1&k=2&other=x");
}

#[test]
fn test_query_without_value() {
    let tree = parse("/a?flag");
    assert_eq!(tree.query_params.get("flag"), Some(""));
    // Normalization: a bare key serializes with '='.
    assert_eq!(serialize_tree(&tree), "/a?flag=");
}

#[test]
fn test_query_plus_decodes_to_space() {
    let tree = parse("/a?q=hello+world");
    assert_eq!(tree.query_params.get("q"), Some("hello world"));
}

#[test]
fn test_fragment_only() {
    let tree = parse("/one#two");
    assert_eq!(tree.fragment.as_deref(), Some("two"));
    let tree = parse("/one");
    assert_eq!(tree.fragment, None);
}

#[test]
fn test_empty_path_with_params_is_error() {
    let err = DefaultUrlSerializer.parse("/;a=b").unwrap_err();
    assert!(matches!(err, UrlParseError::EmptyPathWithParams { .. }));
}

#[test]
fn test_unescaped_paren_content_is_error() {
    let err = DefaultUrlSerializer.parse("/a(left:b=c)").unwrap_err();
    assert!(matches!(err, UrlParseError::UnexpectedToken { .. }));
}

#[test]
fn test_encoded_characters_decode() {
    let tree = parse("/one%20two;p=a%2Fb?q=x%26y");
    let primary = tree.root.child(PRIMARY_OUTLET).unwrap();
    assert_eq!(primary.segments[0].path, "one two");
    assert_eq!(primary.segments[0].parameter("p"), Some("a/b"));
    assert_eq!(tree.query_params.get("q"), Some("x&y"));
}

#[test]
fn test_serialize_encodes_parens_in_segment() {
    let group = UrlSegmentGroup::new(
        vec![UrlSegment::new("a(b)")],
        Vec::new(),
    );
    let root = UrlSegmentGroup::new(
        Vec::new(),
        vec![(PRIMARY_OUTLET.to_string(), group)],
    );
    let tree = UrlTree::new(root, QueryParams::new(), None);
    assert_eq!(serialize_tree(&tree), "/a%28b%29");
    // And it parses back to the same structure.
    assert_eq!(parse("/a%28b%29"), tree);
}

#[test]
fn test_structural_equality_roundtrip() {
    for url in [
        "/",
        "/a",
        "/a/b;k=v",
        "/inbox/33(popup:compose)?debug=true#frag",
        "/a/(b//left:c)?x=1&x=2",
    ] {
        let tree = parse(url);
        let reparsed = DefaultUrlSerializer
            .parse(&serialize_tree(&tree))
            .expect("reparse failed");
        assert_eq!(tree, reparsed, "structural roundtrip failed for {url}");
    }
}

#[test]
fn test_contains_tree_exact() {
    let a = parse("/one/two?x=1");
    let b = parse("/one/two?x=1");
    let c = parse("/one/two?x=2");
    assert!(contains_tree(&a, &b, true));
    assert!(!contains_tree(&a, &c, true));
}

#[test]
fn test_contains_tree_prefix() {
    let container = parse("/one/two/three?x=1&y=2");
    let containee = parse("/one/two?x=1");
    assert!(contains_tree(&container, &containee, false));
    assert!(!contains_tree(&containee, &container, false));
}

mod create_url_tree_tests {
    use super::*;
    use crate::url::builder::create_url_tree;

    fn commands(cmds: &[&str]) -> Vec<Command> {
        cmds.iter().map(|c| Command::from(*c)).collect()
    }

    fn build(current: &UrlTree, cmds: &[Command]) -> UrlTree {
        create_url_tree(None, current, cmds, QueryParams::new(), None).expect("create failed")
    }

    #[test]
    fn test_absolute_navigation_replaces_primary() {
        let current = parse("/old");
        let tree = build(&current, &commands(&["/team", "33"]));
        assert_eq!(serialize_tree(&tree), "/team/33");
    }

    #[test]
    fn test_navigate_to_root() {
        let current = parse("/one/two");
        let tree = build(&current, &commands(&["/"]));
        assert_eq!(serialize_tree(&tree), "/");
    }

    #[test]
    fn test_empty_commands_preserve_tree() {
        let current = parse("/one/two(aux:three)");
        let tree = create_url_tree(
            None,
            &current,
            &[],
            QueryParams::from_pairs([("x", "1")]),
            Some("top".to_string()),
        )
        .unwrap();
        assert_eq!(serialize_tree(&tree), "/one/two(aux:three)?x=1#top");
    }

    #[test]
    fn test_matrix_params_command() {
        let current = parse("/");
        let tree = build(
            &current,
            &[
                Command::path("team"),
                Command::params([("id", "33")]),
                Command::path("user"),
            ],
        );
        assert_eq!(serialize_tree(&tree), "/team;id=33/user");
    }

    #[test]
    fn test_outlets_command_sets_named_outlet() {
        let current = parse("/inbox");
        let tree = build(
            &current,
            &[Command::outlets(vec![
                (
                    PRIMARY_OUTLET.to_string(),
                    Some(commands(&["inbox", "33"])),
                ),
                ("popup".to_string(), Some(commands(&["compose"]))),
            ])],
        );
        assert_eq!(serialize_tree(&tree), "/inbox/33(popup:compose)");
    }

    #[test]
    fn test_null_outlet_removes_child() {
        let current = parse("/inbox(popup:compose)");
        let tree = build(
            &current,
            &[Command::outlets(vec![("popup".to_string(), None)])],
        );
        assert_eq!(serialize_tree(&tree), "/inbox");
    }

    #[test]
    fn test_outlets_must_be_last() {
        let current = parse("/");
        let err = create_url_tree(
            None,
            &current,
            &[
                Command::outlets(vec![("popup".to_string(), None)]),
                Command::path("x"),
            ],
            QueryParams::new(),
            None,
        )
        .unwrap_err();
        assert!(matches!(err, crate::errors::RouterError::InvalidCommand { .. }));
    }

    #[test]
    fn test_absolute_with_leading_params_rejected() {
        let current = parse("/");
        let err = create_url_tree(
            None,
            &current,
            &[Command::path("/"), Command::params([("k", "v")])],
            QueryParams::new(),
            None,
        )
        .unwrap_err();
        assert!(matches!(err, crate::errors::RouterError::InvalidCommand { .. }));
    }
}
