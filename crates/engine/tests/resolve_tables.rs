use pretty_assertions::assert_eq;
use serde_json::{json, Map, Value};
use std::fs;
use std::path::Path;
use tempfile::TempDir;
use timeref_engine::{Engine, EngineConfig, QueryKind, ResolveError};

fn write(dir: &Path, name: &str, contents: &str) {
    fs::write(dir.join(name), contents).expect("write table");
}

fn setup_tables() -> TempDir {
    let temp = tempfile::tempdir().expect("tempdir");
    let root = temp.path();
    write(
        root,
        "before_absolute_reference.csv",
        "entity,time,answer\n\
         Albert Einstein,1905-06,Worked at the Bern patent office\n\
         Albert Einstein,1915-11,Developed general relativity\n\
         Marie Curie,1903,Studied radioactivity with Pierre Curie\n",
    );
    write(
        root,
        "after_absolute_reference.csv",
        "entity,time,answer\n\
         Albert Einstein,1905-06,Became a lecturer in Bern\n\
         Marie Curie,1903,Became a professor at the Sorbonne\n",
    );
    write(
        root,
        "before_chronological_reference.csv",
        "entity,event,answer\n\
         The Beatles,Ed Sullivan Show,Released I Want to Hold Your Hand\n\
         Neil Armstrong,Apollo 11,Flew Gemini 8\n",
    );
    write(
        root,
        "after_chronological_reference.csv",
        "entity,event,answer\n\
         The Beatles,Ed Sullivan Show,Filmed A Hard Day's Night\n\
         Neil Armstrong,Apollo 11,Taught engineering in Cincinnati\n",
    );
    write(
        root,
        "event_time.csv",
        "event,answer\n\
         Apollo 11 moon landing,1969-07-20\n\
         Fall of the Berlin Wall,1989-11-09\n",
    );
    write(
        root,
        "entity_time_event.csv",
        "entity,time,answer\n\
         World War II,1945-09-02,Japan surrenders\n\
         World War II,1944-06-06,D-Day landings\n",
    );
    temp
}

fn engine(root: &Path) -> Engine {
    Engine::new(EngineConfig {
        data_dir: root.to_path_buf(),
        ..EngineConfig::default()
    })
}

fn args(value: Value) -> Map<String, Value> {
    value.as_object().cloned().expect("object")
}

#[test]
fn before_and_after_differ_only_by_table() {
    let temp = setup_tables();
    let engine = engine(temp.path());
    let arguments = args(json!({"entity": "Albert Einstein's", "time": "June 1905"}));

    let before = engine
        .call("before_absolute_reference", &arguments)
        .expect("before");
    let after = engine
        .call("after_absolute_reference", &arguments)
        .expect("after");

    assert_eq!(before.answer, "Worked at the Bern patent office");
    assert_eq!(after.answer, "Became a lecturer in Bern");
    assert_eq!(before.kind, QueryKind::BeforeAbsoluteReference);
    assert_eq!(after.kind, QueryKind::AfterAbsoluteReference);
}

#[test]
fn year_only_query_picks_the_matching_year() {
    let temp = setup_tables();
    let engine = engine(temp.path());
    let resolution = engine
        .call(
            "before_absolute_reference",
            &args(json!({"entity": "Albert Einstein", "time": "1915"})),
        )
        .expect("resolution");
    assert_eq!(resolution.answer, "Developed general relativity");
    assert_eq!(resolution.row, 1);
}

#[test]
fn chronological_lookup_uses_entity_and_event() {
    let temp = setup_tables();
    let engine = engine(temp.path());
    let before = engine
        .call(
            "before_chronological_reference",
            &args(json!({"entity": "Neil Armstrong's", "event": "the Apollo 11 mission"})),
        )
        .expect("before");
    assert_eq!(before.answer, "Flew Gemini 8");

    let after = engine
        .call(
            "after_chronological_reference",
            &args(json!({"entity": "The Beatles", "event": "Ed Sullivan show appearance"})),
        )
        .expect("after");
    assert_eq!(after.answer, "Filmed A Hard Day's Night");
}

#[test]
fn event_time_returns_the_stored_time() {
    let temp = setup_tables();
    let engine = engine(temp.path());
    let resolution = engine
        .call(
            "event_time",
            &args(json!({"event": "When was the fall of the Berlin Wall?"})),
        )
        .expect("resolution");
    assert_eq!(resolution.answer, "1989-11-09");
}

#[test]
fn entity_time_event_respects_the_month() {
    let temp = setup_tables();
    let engine = engine(temp.path());

    let september = engine
        .call(
            "entity_time_event",
            &args(json!({"entity": "World War II's end", "time": "1945-09"})),
        )
        .expect("september");
    assert_eq!(september.answer, "Japan surrenders");

    let june = engine
        .call(
            "entity_time_event",
            &args(json!({"entity": "world war ii", "time": "Jun 1944"})),
        )
        .expect("june");
    assert_eq!(june.answer, "D-Day landings");

    let err = engine
        .call(
            "entity_time_event",
            &args(json!({"entity": "World War II", "time": "1945-08"})),
        )
        .unwrap_err();
    assert_eq!(err.to_string(), "No matching entity-time event found");
}

#[test]
fn numeral_variant_of_entity_stays_below_threshold() {
    // "world war 2 end" covers 2 of 3 words and 8 of 10 trigrams of "world war ii":
    // 0.7 * 2/3 + 0.3 * 0.8 ≈ 0.707, under the 0.75 gate.
    let temp = setup_tables();
    let engine = engine(temp.path());
    let err = engine
        .call(
            "entity_time_event",
            &args(json!({"entity": "world war 2's end", "time": "1945-09"})),
        )
        .unwrap_err();
    assert!(matches!(
        err,
        ResolveError::NoMatch {
            kind: QueryKind::EntityTimeEvent
        }
    ));
}

#[test]
fn unparseable_time_is_not_silently_defaulted() {
    let temp = setup_tables();
    let engine = engine(temp.path());
    let err = engine
        .call(
            "after_absolute_reference",
            &args(json!({"entity": "Marie Curie", "time": "next Tuesday"})),
        )
        .unwrap_err();
    assert!(matches!(err, ResolveError::TimeFormat(ref t) if t == "next Tuesday"));
}

#[test]
fn malformed_table_fails_the_call() {
    let temp = setup_tables();
    write(
        temp.path(),
        "event_time.csv",
        "event,answer\nApollo 11 moon landing,1969-07-20,extra\n",
    );
    let engine = engine(temp.path());
    let err = engine
        .call("event_time", &args(json!({"event": "Apollo 11 moon landing"})))
        .unwrap_err();
    assert!(matches!(err, ResolveError::TableLoad { .. }), "{err}");
}
