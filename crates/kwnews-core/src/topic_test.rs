use std::io::Write;

use super::*;

fn write_yaml(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    file.write_all(content.as_bytes()).expect("write yaml");
    file
}

#[test]
fn builtin_topic_passes_validation() {
    let topic = TopicConfig::kwater();
    assert!(validate_topic(&topic).is_ok());
    assert_eq!(topic.queries.len(), 10);
    assert_eq!(topic.queries[0], "kwater OR 한국수자원공사");
    assert_eq!(topic.relevance_keywords.len(), 8);
}

#[test]
fn default_is_kwater() {
    assert_eq!(TopicConfig::default(), TopicConfig::kwater());
}

#[test]
fn load_topic_reads_valid_yaml() {
    let file = write_yaml(
        r"
name: 낙동강
queries:
  - 낙동강 녹조
  - 낙동강 보
relevance_keywords:
  - 낙동강
  - 녹조
",
    );
    let topic = load_topic(file.path()).expect("topic should load");
    assert_eq!(topic.name, "낙동강");
    assert_eq!(topic.queries, vec!["낙동강 녹조", "낙동강 보"]);
    assert_eq!(topic.relevance_keywords, vec!["낙동강", "녹조"]);
}

#[test]
fn load_topic_missing_file_is_io_error() {
    let err = load_topic(Path::new("/definitely/not/here/topic.yaml")).unwrap_err();
    assert!(matches!(err, ConfigError::TopicFileIo { .. }));
}

#[test]
fn load_topic_malformed_yaml_is_parse_error() {
    let file = write_yaml("name: [unclosed");
    let err = load_topic(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::TopicFileParse(_)));
}

#[test]
fn empty_query_list_is_rejected() {
    let file = write_yaml(
        r"
name: empty
queries: []
relevance_keywords: [water]
",
    );
    let err = load_topic(file.path()).unwrap_err();
    assert!(
        matches!(err, ConfigError::Validation(ref msg) if msg.contains("at least one query")),
        "got: {err:?}"
    );
}

#[test]
fn duplicate_queries_are_rejected_case_insensitively() {
    let topic = TopicConfig {
        name: "dupes".to_string(),
        queries: vec!["K-water".to_string(), "k-water ".to_string()],
        relevance_keywords: vec!["kwater".to_string()],
    };
    let err = validate_topic(&topic).unwrap_err();
    assert!(matches!(err, ConfigError::Validation(ref msg) if msg.contains("duplicate query")));
}

#[test]
fn blank_relevance_keyword_is_rejected() {
    let topic = TopicConfig {
        name: "blank".to_string(),
        queries: vec!["댐".to_string()],
        relevance_keywords: vec!["댐".to_string(), "  ".to_string()],
    };
    assert!(validate_topic(&topic).is_err());
}

#[test]
fn missing_relevance_keywords_are_rejected() {
    let topic = TopicConfig {
        name: "none".to_string(),
        queries: vec!["댐".to_string()],
        relevance_keywords: vec![],
    };
    assert!(validate_topic(&topic).is_err());
}

#[test]
fn configured_topic_defaults_to_kwater() {
    let topic = load_configured_topic(None).expect("built-in topic");
    assert_eq!(topic, TopicConfig::kwater());
}

#[test]
fn configured_topic_reads_the_given_file() {
    let file = write_yaml("name: 댐\nqueries: [\"댐 안전\"]\nrelevance_keywords: [\"댐\"]\n");
    let topic = load_configured_topic(Some(file.path())).expect("topic from file");
    assert_eq!(topic.name, "댐");
    assert_eq!(topic.queries, vec!["댐 안전".to_string()]);
}
