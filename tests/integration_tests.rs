//! Integration tests for the event memory
//!
//! Exercise the public API the way a conversational agent would, and check
//! the store's invariants after mixed workloads.

use std::collections::HashSet;
use std::thread;

use serde_json::json;

use event_memory::{
    Category, Channel, ContextOptions, Memory, MemoryConfig, MemoryError, MessageFilter, Mode,
    Payload, Role, SharedMemory, Stamp, StoredValue, VarValue,
};

fn assert_invariants(memory: &Memory) {
    let store = memory.event_store();
    store.verify_consistency().unwrap();

    let master: HashSet<&Stamp> = store.indices().all.stamps().collect();
    let events: HashSet<&Stamp> = memory
        .get_events(None, None, None)
        .into_iter()
        .map(|event| &event.stamp)
        .collect();
    assert_eq!(master, events);
    assert_eq!(master.len(), memory.len());

    for category in Category::ALL {
        assert!(store.index(Some(category)).is_sorted());
    }
    assert!(store.index(None).is_sorted());
}

#[test]
fn test_message_scenario() {
    let mut memory = Memory::new();
    memory
        .append_message(Role::User, "hi", Mode::Text, Channel::Cli)
        .unwrap();
    memory
        .append_message(Role::Assistant, "hello", Mode::Text, Channel::Cli)
        .unwrap();

    let replies = memory.get_messages(&MessageFilter::new().include_roles([Role::Assistant]));
    assert_eq!(replies.len(), 1);
    assert_eq!(replies[0].content(), Some("hello"));
}

#[test]
fn test_variable_scenario() {
    let mut memory = Memory::new();
    let s1 = memory.set_variable("x", 1, Some("first")).unwrap();
    let s2 = memory.set_variable("x", 2, None).unwrap();

    assert_eq!(memory.get_variable("x").unwrap(), Some(Payload::from(2)));
    assert_eq!(memory.get_variable_description("x"), "first");

    let history = memory.get_variable_history("x", false).unwrap();
    let pairs: Vec<(Stamp, VarValue)> = history
        .into_iter()
        .map(|entry| (entry.stamp, entry.value))
        .collect();
    assert_eq!(
        pairs,
        vec![
            (s1.clone(), VarValue::Live(StoredValue::Inline(Payload::from(1)))),
            (s2.clone(), VarValue::Live(StoredValue::Inline(Payload::from(2)))),
        ]
    );
    assert!(memory.event(s1.as_str()).unwrap().created_at < memory.event(s2.as_str()).unwrap().created_at);
}

#[test]
fn test_history_length_matches_set_count() {
    let mut memory = Memory::new();
    for i in 0..25 {
        let description = if i % 5 == 0 { Some("milestone") } else { None };
        memory.set_variable("counter", i, description).unwrap();
    }

    assert_eq!(memory.get_variable_history("counter", false).unwrap().len(), 25);
    assert_eq!(memory.get_variable("counter").unwrap(), Some(Payload::from(24)));
    assert_eq!(memory.get_variable_description_history("counter").len(), 5);
}

#[test]
fn test_delete_then_reset() {
    let mut memory = Memory::new();
    memory.set_variable("k", "v1", None).unwrap();
    memory.delete_variable("k").unwrap();

    assert_eq!(memory.get_variable("k").unwrap(), None);
    assert!(memory.is_variable_deleted("k"));

    memory.set_variable("k", "v2", None).unwrap();
    assert_eq!(memory.get_variable("k").unwrap(), Some(Payload::from("v2")));
    assert!(!memory.is_variable_deleted("k"));
}

#[test]
fn test_delete_never_set_fails() {
    let mut memory = Memory::new();
    memory.set_variable("other", 1, None).unwrap();

    let err = memory.delete_variable("never").unwrap_err();
    assert!(matches!(err, MemoryError::VariableNotFound(_)));
    assert_eq!(memory.len(), 1);
}

#[test]
fn test_externalization_threshold() {
    let mut memory = Memory::with_config(MemoryConfig::new().with_object_threshold(10_000));
    let big = "q".repeat(20_000);
    memory.set_variable("doc", big.as_str(), None).unwrap();

    let raw_history = memory.get_variable_history("doc", false).unwrap();
    let stored = raw_history[0].value.as_live().unwrap();
    assert!(stored.is_object_ref());
    assert!(stored.as_inline().is_none());

    let object = stored.object_ref().unwrap();
    let info = memory.get_object_info(object.as_str()).unwrap();
    assert_eq!(info.size_original, 20_000);

    assert_eq!(memory.get_variable("doc").unwrap(), Some(Payload::Text(big)));
}

#[test]
fn test_value_at_threshold_stays_inline() {
    let mut memory = Memory::with_config(MemoryConfig::new().with_object_threshold(100));
    memory.set_variable("edge", "e".repeat(100), None).unwrap();
    memory.set_variable("over", "o".repeat(101), None).unwrap();

    assert!(!memory.get_variable_raw("edge").unwrap().is_object_ref());
    assert!(memory.get_variable_raw("over").unwrap().is_object_ref());
}

#[test]
fn test_overwritten_objects_are_retained() {
    let mut memory = Memory::with_config(MemoryConfig::new().with_object_threshold(10));
    memory.set_variable("v", "a".repeat(50), None).unwrap();
    memory.set_variable("v", "b".repeat(50), None).unwrap();
    memory.delete_variable("v").unwrap();

    assert_eq!(memory.object_store().len(), 2);

    let history = memory.get_variable_history("v", true).unwrap();
    assert_eq!(
        history[0].value,
        VarValue::Live(StoredValue::Inline(Payload::Text("a".repeat(50))))
    );
    assert!(history[2].value.is_deleted());
}

#[test]
fn test_invariants_after_mixed_workload() {
    let mut memory = Memory::with_config(MemoryConfig::new().with_object_threshold(200));

    for i in 0..40 {
        match i % 5 {
            0 => {
                memory
                    .append_message(Role::User, format!("question {}", i), Mode::Text, Channel::Webapp)
                    .unwrap();
            }
            1 => {
                memory
                    .append_message(Role::Assistant, "x".repeat(i * 10), Mode::Text, Channel::Webapp)
                    .unwrap();
            }
            2 => {
                memory.append_log(format!("log {}", i)).unwrap();
            }
            3 => {
                memory.append_reflection(format!("reflection {}", i)).unwrap();
            }
            _ => {
                memory
                    .set_variable(&format!("var{}", i % 3), json!({"i": i, "pad": "p".repeat(i * 5)}), None)
                    .unwrap();
            }
        }
        assert_invariants(&memory);
    }

    let stats = memory.stats();
    assert_eq!(stats.total_events, 40);
    assert_eq!(stats.messages, 16);
    assert_eq!(stats.logs, 8);
    assert_eq!(stats.reflections, 8);
    assert_eq!(stats.variable_events, 8);
    assert!(stats.objects > 0);
}

#[test]
fn test_channel_filters() {
    let mut memory = Memory::new();
    memory
        .append_message(Role::User, "from slack", Mode::Text, Channel::Slack)
        .unwrap();
    memory
        .append_message(Role::User, "from ios", Mode::Audio, Channel::Ios)
        .unwrap();
    memory.append_log("log line").unwrap();

    let slack = memory.get_messages(&MessageFilter::new().channel(Channel::Slack));
    assert_eq!(slack.len(), 1);
    assert_eq!(slack[0].content(), Some("from slack"));

    let ios_events = memory.get_events(None, None, Some(Channel::Ios));
    assert_eq!(ios_events.len(), 1);
}

#[test]
fn test_prepare_context_for_model_call() {
    let mut memory = Memory::new();
    let essay = "word ".repeat(400);
    let old = memory
        .append_message(Role::User, essay.as_str(), Mode::Text, Channel::Api)
        .unwrap();
    for i in 0..6 {
        memory
            .append_message(Role::Assistant, format!("reply {}", i), Mode::Text, Channel::Api)
            .unwrap();
    }

    let context = memory.prepare_context(&ContextOptions::default());
    assert_eq!(context.len(), 7);
    assert!(context[0].truncated);
    assert!(context[0].content.contains(&format!("request stamp: {}", old)));
    assert!(context[0].content.chars().count() < essay.len());

    // The full text stays available through the event itself
    assert_eq!(memory.event(old.as_str()).unwrap().content(), Some(essay.as_str()));
}

#[test]
fn test_shared_memory_concurrent_writers() {
    let shared = SharedMemory::new(Memory::new());
    let mut handles = vec![];

    // 4 writer threads
    for i in 0..4 {
        let shared = shared.clone();
        let handle = thread::spawn(move || {
            for j in 0..25 {
                shared
                    .with_mut(|memory| memory.set_variable(&format!("agent{}", i), j, None))
                    .unwrap();
                shared
                    .with_mut(|memory| memory.append_log(format!("agent {} step {}", i, j)))
                    .unwrap();
            }
        });
        handles.push(handle);
    }

    // 2 reader threads
    for _ in 0..2 {
        let shared = shared.clone();
        let handle = thread::spawn(move || {
            for _ in 0..50 {
                let memory = shared.read();
                memory.event_store().verify_consistency().unwrap();
            }
        });
        handles.push(handle);
    }

    for handle in handles {
        handle.join().unwrap();
    }

    let memory = shared.snapshot_clone();
    assert_eq!(memory.len(), 200);
    for i in 0..4 {
        let key = format!("agent{}", i);
        assert_eq!(memory.get_variable_history(&key, false).unwrap().len(), 25);
        assert_eq!(memory.get_variable(&key).unwrap(), Some(Payload::from(24)));
    }
    assert_invariants(&memory);
}

#[test]
fn test_string_validation_entry_point() {
    let mut memory = Memory::new();

    assert!(matches!(
        memory.append_message_str("user", "hi", "smoke-signal", "cli"),
        Err(MemoryError::InvalidMode(..))
    ));
    assert!(memory.is_empty());

    memory
        .append_message_str("assistant", "ok", "text", "whatsapp")
        .unwrap();
    assert_eq!(memory.last_assistant_message(), "ok");
}
