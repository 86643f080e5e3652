//! # Prompt Resolution Tests
//!
//! Exercises the prompt set resolver end to end against real files in a
//! temp directory: name sanitization, include expansion, macro
//! substitution, and the error taxonomy for missing documents, includes,
//! and macros.

mod common;

use common::{setup_tracing, write_prompt_set};
use nlqeval::sanitize_name;
use nlqeval::store::FileStore;
use nlqeval::templating::{
    MacroBindings, MacroValue, PromptResolver, ResolveEvent, TemplateError,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use tempfile::tempdir;

fn bindings(pairs: &[(&str, &str)]) -> MacroBindings {
    pairs
        .iter()
        .map(|(name, value)| (name.to_string(), MacroValue::from(*value)))
        .collect()
}

// --- Name sanitization ---

/// Verifies the concrete mapping the directory layout depends on.
#[test]
fn test_sanitize_replaces_unsafe_characters() {
    assert_eq!(sanitize_name("Default Prompt Set"), "Default_Prompt_Set");
    assert_eq!(sanitize_name("a/b:c.d"), "a_b_c_d");
    assert_eq!(sanitize_name("already_safe-123"), "already_safe-123");
    assert_eq!(sanitize_name(""), "");
}

/// Sanitization must be idempotent: a safe name maps to itself.
#[test]
fn test_sanitize_is_idempotent() {
    for name in ["Default Prompt Set", "müller's set", "{{weird}}", ""] {
        let once = sanitize_name(name);
        assert_eq!(sanitize_name(&once), once);
    }
}

// --- Plain documents and includes ---

#[test]
fn test_plain_text_resolves_unchanged() {
    setup_tracing();
    let dir = tempdir().unwrap();
    let text = "SELECT 1; -- no directives here\n";
    write_prompt_set(dir.path(), "Plain", text, &[]);

    let store = FileStore;
    let resolver = PromptResolver::new(&store);
    let result = resolver
        .resolve_by_name("Plain", dir.path(), &bindings(&[]))
        .unwrap();

    assert_eq!(result, text);
}

/// The concrete scenario from the harness docs: one macro, one include.
#[test]
fn test_macro_and_include_resolve_together() {
    setup_tracing();
    let dir = tempdir().unwrap();
    write_prompt_set(
        dir.path(),
        "Scenario",
        "SELECT * FROM t WHERE name = '{{NLQ}}';\n{{include:footer.txt}}",
        &[("footer.txt", "-- end")],
    );

    let store = FileStore;
    let resolver = PromptResolver::new(&store);
    let result = resolver
        .resolve_by_name("Scenario", dir.path(), &bindings(&[("NLQ", "Alice")]))
        .unwrap();

    assert_eq!(result, "SELECT * FROM t WHERE name = 'Alice';\n-- end");
}

/// Every occurrence of a repeated include gets its own expansion pass.
#[test]
fn test_repeated_include_expands_every_occurrence() {
    setup_tracing();
    let dir = tempdir().unwrap();
    write_prompt_set(
        dir.path(),
        "Repeated",
        "{{include:rule.txt}} and {{include:rule.txt}}",
        &[("rule.txt", "R")],
    );

    let store = FileStore;
    let resolver = PromptResolver::new(&store);
    let result = resolver
        .resolve_by_name("Repeated", dir.path(), &bindings(&[]))
        .unwrap();

    assert_eq!(result, "R and R");
}

/// Includes inside included files resolve against the MAIN document's
/// directory, not the included file's own directory.
#[test]
fn test_nested_include_resolves_relative_to_main_document() {
    setup_tracing();
    let dir = tempdir().unwrap();
    write_prompt_set(
        dir.path(),
        "Nested",
        "{{include:parts/rules.txt}}",
        &[
            ("parts/rules.txt", "rules\n{{include:footer.txt}}"),
            // Lives next to the main document; parts/footer.txt does not exist.
            ("footer.txt", "-- end"),
        ],
    );

    let store = FileStore;
    let resolver = PromptResolver::new(&store);
    let result = resolver
        .resolve_by_name("Nested", dir.path(), &bindings(&[]))
        .unwrap();

    assert_eq!(result, "rules\n-- end");
}

/// The include path is trimmed of surrounding whitespace.
#[test]
fn test_include_path_is_trimmed() {
    setup_tracing();
    let dir = tempdir().unwrap();
    write_prompt_set(
        dir.path(),
        "Trimmed",
        "{{include: footer.txt }}",
        &[("footer.txt", "-- end")],
    );

    let store = FileStore;
    let resolver = PromptResolver::new(&store);
    let result = resolver
        .resolve_by_name("Trimmed", dir.path(), &bindings(&[]))
        .unwrap();

    assert_eq!(result, "-- end");
}

#[test]
fn test_missing_include_fails_naming_the_file() {
    setup_tracing();
    let dir = tempdir().unwrap();
    write_prompt_set(
        dir.path(),
        "Scenario",
        "SELECT * FROM t WHERE name = '{{NLQ}}';\n{{include:footer.txt}}",
        &[],
    );

    let store = FileStore;
    let resolver = PromptResolver::new(&store);
    let err = resolver
        .resolve_by_name("Scenario", dir.path(), &bindings(&[("NLQ", "Alice")]))
        .unwrap_err();

    match err {
        TemplateError::IncludeNotFound(path) => assert!(
            path.ends_with("footer.txt"),
            "unexpected include path: {path}"
        ),
        other => panic!("expected IncludeNotFound, got {other:?}"),
    }
}

/// A self-including file must fail with a cycle error instead of spinning
/// until the process dies.
#[test]
fn test_include_cycle_is_detected() {
    setup_tracing();
    let dir = tempdir().unwrap();
    write_prompt_set(
        dir.path(),
        "Cycle",
        "{{include:loop.txt}}",
        &[("loop.txt", "again: {{include:loop.txt}}")],
    );

    let store = FileStore;
    let resolver = PromptResolver::new(&store);
    let err = resolver
        .resolve_by_name("Cycle", dir.path(), &bindings(&[]))
        .unwrap_err();

    match err {
        TemplateError::IncludeCycle(target) => assert_eq!(target, "loop.txt"),
        other => panic!("expected IncludeCycle, got {other:?}"),
    }
}

// --- Macro substitution ---

/// Whitespace-padded placeholders are discovered and substituted too.
#[test]
fn test_padded_macro_placeholders_substitute() {
    setup_tracing();
    let dir = tempdir().unwrap();
    write_prompt_set(dir.path(), "Padded", "{{NLQ}} / {{ NLQ }} / {{  NLQ  }}", &[]);

    let store = FileStore;
    let resolver = PromptResolver::new(&store);
    let result = resolver
        .resolve_by_name("Padded", dir.path(), &bindings(&[("NLQ", "q")]))
        .unwrap();

    assert_eq!(result, "q / q / q");
}

/// Non-text values substitute through their per-kind string conversion.
#[test]
fn test_value_kinds_stringify() {
    setup_tracing();
    let dir = tempdir().unwrap();
    write_prompt_set(dir.path(), "Kinds", "{{N}} {{F}} {{B}} {{T}}", &[]);

    let mut bound = MacroBindings::new();
    bound.insert("N".to_string(), MacroValue::from(42i64));
    bound.insert("F".to_string(), MacroValue::from(2.5f64));
    bound.insert("B".to_string(), MacroValue::from(true));
    bound.insert("T".to_string(), MacroValue::from("text"));

    let store = FileStore;
    let resolver = PromptResolver::new(&store);
    let result = resolver
        .resolve_by_name("Kinds", dir.path(), &bound)
        .unwrap();

    assert_eq!(result, "42 2.5 true text");
}

/// A bound value containing macro syntax is inserted verbatim and is NOT
/// re-scanned for itself: each discovered name substitutes exactly once.
#[test]
fn test_substitution_is_single_pass() {
    setup_tracing();
    let dir = tempdir().unwrap();
    write_prompt_set(dir.path(), "SinglePass", "{{A}}", &[]);

    let store = FileStore;
    let resolver = PromptResolver::new(&store);
    let result = resolver
        .resolve_by_name("SinglePass", dir.path(), &bindings(&[("A", "{{A}}")]))
        .unwrap();

    assert_eq!(result, "{{A}}");
}

#[test]
fn test_missing_macro_fails_listing_the_name() {
    setup_tracing();
    let dir = tempdir().unwrap();
    write_prompt_set(dir.path(), "Missing", "{{A}} and {{B}}", &[]);

    let store = FileStore;
    let resolver = PromptResolver::new(&store);
    let err = resolver
        .resolve_by_name("Missing", dir.path(), &bindings(&[("A", "1")]))
        .unwrap_err();

    match err {
        TemplateError::MissingMacros(names) => assert_eq!(names, vec!["B".to_string()]),
        other => panic!("expected MissingMacros, got {other:?}"),
    }
}

/// The missing list is sorted and deduplicated even when a macro appears
/// several times, so every gap can be fixed in one iteration.
#[test]
fn test_missing_macros_are_sorted_and_deduplicated() {
    setup_tracing();
    let dir = tempdir().unwrap();
    write_prompt_set(
        dir.path(),
        "MissingMany",
        "{{Z}} {{B}} {{Z}} {{ A }} {{B}}",
        &[],
    );

    let store = FileStore;
    let resolver = PromptResolver::new(&store);
    let err = resolver
        .resolve_by_name("MissingMany", dir.path(), &bindings(&[]))
        .unwrap_err();

    match err {
        TemplateError::MissingMacros(names) => {
            assert_eq!(
                names,
                vec!["A".to_string(), "B".to_string(), "Z".to_string()]
            );
        }
        other => panic!("expected MissingMacros, got {other:?}"),
    }
}

/// Extra bindings a document never references are ignored.
#[test]
fn test_unreferenced_bindings_are_ignored() {
    setup_tracing();
    let dir = tempdir().unwrap();
    write_prompt_set(dir.path(), "Extra", "{{NLQ}}", &[]);

    let store = FileStore;
    let resolver = PromptResolver::new(&store);
    let result = resolver
        .resolve_by_name(
            "Extra",
            dir.path(),
            &bindings(&[("NLQ", "q"), ("UNUSED", "x")]),
        )
        .unwrap();

    assert_eq!(result, "q");
}

// --- Document lookup ---

/// The main document lives at `{base}/{safe}/{safe}.txt`; the error for a
/// missing set names both the attempted path and the original name.
#[test]
fn test_missing_prompt_set_fails_naming_path_and_name() {
    setup_tracing();
    let dir = tempdir().unwrap();

    let store = FileStore;
    let resolver = PromptResolver::new(&store);
    let err = resolver
        .resolve_by_name("Default Prompt Set", dir.path(), &bindings(&[]))
        .unwrap_err();

    match err {
        TemplateError::DocumentNotFound(message) => {
            assert!(
                message.contains("Default_Prompt_Set/Default_Prompt_Set.txt"),
                "message does not name the attempted path: {message}"
            );
            assert!(
                message.contains("'Default Prompt Set'"),
                "message does not name the original prompt set: {message}"
            );
        }
        other => panic!("expected DocumentNotFound, got {other:?}"),
    }
}

// --- Observer ---

#[test]
fn test_observer_sees_include_and_macro_events() {
    setup_tracing();
    let dir = tempdir().unwrap();
    write_prompt_set(
        dir.path(),
        "Observed",
        "{{include:footer.txt}} {{NLQ}}",
        &[("footer.txt", "-- end")],
    );

    let includes = AtomicUsize::new(0);
    let macros_seen = AtomicUsize::new(0);
    let observer = |event: &ResolveEvent<'_>| match event {
        ResolveEvent::IncludeExpanded { .. } => {
            includes.fetch_add(1, Ordering::SeqCst);
        }
        ResolveEvent::MacroSubstituted { .. } => {
            macros_seen.fetch_add(1, Ordering::SeqCst);
        }
        _ => {}
    };

    let store = FileStore;
    let resolver = PromptResolver::new(&store).with_observer(&observer);
    resolver
        .resolve_by_name("Observed", dir.path(), &bindings(&[("NLQ", "x")]))
        .unwrap();

    assert_eq!(includes.load(Ordering::SeqCst), 1);
    assert_eq!(macros_seen.load(Ordering::SeqCst), 1);
}
