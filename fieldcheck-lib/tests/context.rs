//! Field lifecycle through the validation context.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use fieldcheck_lib::config::FieldOptions;
use fieldcheck_lib::custom::CustomOutcome;
use fieldcheck_lib::error::ConfigurationError;
use fieldcheck_lib::translate::MessageTable;
use fieldcheck_lib::{FieldRegistration, FieldStatus, ResetOptions, ValidationContext};
use tokio::sync::oneshot;
use tokio::time::sleep;

fn field(name: &str, rules: &str) -> FieldRegistration {
    FieldRegistration::new(name, rules)
}

fn immediate() -> FieldOptions {
    FieldOptions::new().with_debounce(Duration::ZERO)
}

/// A field has exactly one summary entry while invalid and none otherwise.
fn assert_summary_consistent(ctx: &ValidationContext, fields: &[&str]) {
    let summary = ctx.summary();
    for name in fields {
        let report = ctx.field_report(name).unwrap();
        let entries = summary.iter().filter(|e| e.field_name == *name).count();
        assert!(entries <= 1, "{name} has {entries} entries");
        assert_eq!(entries == 1, !report.is_valid, "{name}: {report:?}");
    }
}

#[tokio::test(start_paused = true)]
async fn test_burst_of_changes_evaluates_once() {
    let ctx = ValidationContext::new();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    ctx.custom_validators().register_sync("record", move |req| {
        sink.lock().unwrap().push(req.value.clone());
        Ok(true.into())
    });
    ctx.register_field(
        field("name", "custom:record").with_options(FieldOptions::new().with_debounce(Duration::from_millis(100))),
    )
    .await
    .unwrap();

    for value in ["a", "ab", "abc"] {
        ctx.set_value("name", value).await.unwrap();
        assert_eq!(ctx.field_report("name").unwrap().status, FieldStatus::Pending);
        sleep(Duration::from_millis(30)).await;
    }
    sleep(Duration::from_millis(200)).await;

    assert_eq!(*seen.lock().unwrap(), vec!["abc".to_string()]);
    let report = ctx.field_report("name").unwrap();
    assert_eq!(report.status, FieldStatus::Valid);
}

#[tokio::test(start_paused = true)]
async fn test_required_and_empty() {
    let ctx = ValidationContext::new();
    ctx.register_field(field("nick", "alpha|minLen:3").with_form("f")).await.unwrap();
    ctx.set_value("nick", "").await.unwrap();
    sleep(Duration::from_secs(2)).await;

    let report = ctx.field_report("nick").unwrap();
    assert!(report.is_valid);
    assert!(ctx.summary_by_form("f").is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_matching_field_follows_its_source() {
    let ctx = ValidationContext::new();
    ctx.register_field(field("a", "required")).await.unwrap();
    ctx.register_field(field("b", "match:a")).await.unwrap();

    ctx.set_value("a", "x").await.unwrap();
    sleep(Duration::from_millis(1100)).await;
    ctx.set_value("b", "x").await.unwrap();
    sleep(Duration::from_millis(1100)).await;
    assert!(ctx.field_report("b").unwrap().is_valid);

    ctx.set_value("a", "y").await.unwrap();
    let report = ctx.field_report("b").unwrap();
    assert!(!report.is_valid);
    assert!(report.message.contains('a'));
    assert_eq!(ctx.summary().len(), 1);
    assert_summary_consistent(&ctx, &["a", "b"]);
}

#[tokio::test]
async fn test_stale_remote_result_is_discarded() {
    let ctx = ValidationContext::new();
    let waits: Arc<Mutex<HashMap<String, oneshot::Receiver<bool>>>> = Arc::default();
    let (first_tx, first_rx) = oneshot::channel();
    let (second_tx, second_rx) = oneshot::channel();
    waits.lock().unwrap().insert("first".to_string(), first_rx);
    waits.lock().unwrap().insert("second".to_string(), second_rx);

    let pending = Arc::clone(&waits);
    ctx.custom_validators().register_async("available", move |req| {
        let rx = pending.lock().unwrap().remove(&req.value);
        async move {
            let valid = match rx {
                Some(rx) => rx.await.unwrap_or(false),
                None => true,
            };
            Ok(CustomOutcome::from(valid))
        }
    });
    ctx.register_field(field("user", "remote:available").with_options(immediate()))
        .await
        .unwrap();

    ctx.set_value("user", "first").await.unwrap();
    ctx.set_value("user", "second").await.unwrap();
    let report = ctx.field_report("user").unwrap();
    assert_eq!(report.status, FieldStatus::AwaitingRemote);
    assert!(!report.is_valid);
    let summary = ctx.summary();
    assert_eq!(summary.len(), 1);
    assert_eq!(summary[0].field_name, "user");
    assert!(summary[0].message.is_empty());
    assert_summary_consistent(&ctx, &["user"]);

    second_tx.send(true).unwrap();
    sleep(Duration::from_millis(1)).await;
    assert!(ctx.field_report("user").unwrap().is_valid);
    assert_summary_consistent(&ctx, &["user"]);

    first_tx.send(false).unwrap();
    sleep(Duration::from_millis(1)).await;
    let report = ctx.field_report("user").unwrap();
    assert!(report.is_valid);
    assert_eq!(report.status, FieldStatus::Valid);
    assert!(ctx.summary().is_empty());
}

#[tokio::test]
async fn test_remote_result_after_unregister_is_ignored() {
    let ctx = ValidationContext::new();
    let (tx, rx) = oneshot::channel::<bool>();
    let rx = Arc::new(Mutex::new(Some(rx)));
    ctx.custom_validators().register_async("slow", move |_| {
        let rx = rx.lock().unwrap().take();
        async move {
            let valid = match rx {
                Some(rx) => rx.await.unwrap_or(false),
                None => false,
            };
            Ok(CustomOutcome::from(valid))
        }
    });
    ctx.register_field(field("user", "remote:slow").with_form("f").with_options(immediate()))
        .await
        .unwrap();
    ctx.set_value("user", "bob").await.unwrap();
    assert_eq!(ctx.summary_by_form("f").len(), 1);
    assert!(ctx.unregister_field("user"));

    tx.send(false).unwrap();
    sleep(Duration::from_millis(1)).await;
    assert!(ctx.field_report("user").is_none());
    assert!(ctx.summary().is_empty());
    assert!(ctx.take_errors().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_check_form_validity_flushes_pending() {
    let ctx = ValidationContext::new();
    ctx.register_field(field("email", "required|email").with_form("signup"))
        .await
        .unwrap();
    ctx.register_field(field("other", "required").with_form("login"))
        .await
        .unwrap();

    ctx.set_value("email", "not-an-email").await.unwrap();
    assert!(!ctx.check_form_validity("signup").await.unwrap());
    let report = ctx.field_report("email").unwrap();
    assert!(report.touched);
    assert_eq!(report.status, FieldStatus::Invalid);
    assert_eq!(report.message, "Must be a valid email address.");
    assert!(!ctx.field_report("other").unwrap().touched);

    ctx.set_value("email", "jane@example.com").await.unwrap();
    assert!(ctx.check_form_validity("signup").await.unwrap());
    assert!(ctx.summary_by_form("signup").is_empty());
    assert_eq!(ctx.summary_by_form("login").len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_reset_form() {
    let ctx = ValidationContext::new();
    ctx.register_field(field("name", "required|alpha").with_form("signup").with_options(immediate()))
        .await
        .unwrap();
    ctx.register_field(field("nick", "alpha").with_form("signup").with_options(immediate()))
        .await
        .unwrap();
    ctx.register_field(field("user", "required").with_form("login"))
        .await
        .unwrap();

    ctx.set_value("name", "42").await.unwrap();
    ctx.set_value("nick", "42").await.unwrap();
    assert_eq!(ctx.summary_by_form("signup").len(), 2);

    ctx.reset_form("signup", ResetOptions::default().with_empty_values())
        .await
        .unwrap();
    let name = ctx.field_report("name").unwrap();
    assert!(!name.touched);
    assert_eq!(name.status, FieldStatus::Untouched);
    assert_eq!(name.value, None);
    assert!(!name.is_valid);
    assert!(ctx.field_report("nick").unwrap().is_valid);
    assert_eq!(ctx.summary_by_form("signup").len(), 1);
    assert_eq!(ctx.summary_by_form("login").len(), 1);
    assert_summary_consistent(&ctx, &["name", "nick", "user"]);

    ctx.reset_form("signup", ResetOptions::default().with_remove_validators())
        .await
        .unwrap();
    assert!(ctx.fields_of("signup").is_empty());
    assert!(ctx.summary_by_form("signup").is_empty());
    assert_eq!(ctx.summary_by_form("login").len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_disabling_cancels_pending_evaluation() {
    let ctx = ValidationContext::new();
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    ctx.custom_validators().register_sync("count", move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(false.into())
    });
    ctx.register_field(field("f", "custom:count")).await.unwrap();

    ctx.set_value("f", "value").await.unwrap();
    ctx.set_disabled("f", true).await.unwrap();
    sleep(Duration::from_secs(2)).await;

    assert_eq!(calls.load(Ordering::SeqCst), 0);
    let report = ctx.field_report("f").unwrap();
    assert_eq!(report.status, FieldStatus::Cancelled);
    assert!(report.is_valid);

    ctx.set_disabled("f", false).await.unwrap();
    sleep(Duration::from_millis(1)).await;
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(!ctx.field_report("f").unwrap().is_valid);
}

#[tokio::test(start_paused = true)]
async fn test_background_translation_errors_are_kept() {
    let ctx = ValidationContext::builder().with_messages(MessageTable::new()).build();
    ctx.register_field(
        field("f", "alpha")
            .with_form("form")
            .with_options(FieldOptions::new().with_debounce(Duration::from_millis(10))),
    )
    .await
    .unwrap();
    ctx.set_value("f", "123").await.unwrap();
    sleep(Duration::from_millis(50)).await;

    let errors = ctx.take_errors();
    assert_eq!(errors.len(), 1);
    assert!(matches!(&errors[0], ConfigurationError::Translation { key, .. } if key == "INVALID_ALPHA"));

    let report = ctx.field_report("f").unwrap();
    assert!(!report.is_valid);
    assert_eq!(report.status, FieldStatus::Invalid);
    assert!(!ctx.check_form_validity("form").await.unwrap());
    assert_summary_consistent(&ctx, &["f"]);
}

#[tokio::test]
async fn test_set_value_on_unknown_field() {
    let ctx = ValidationContext::new();
    let err = ctx.set_value("ghost", "x").await.unwrap_err();
    assert!(matches!(err, ConfigurationError::UnknownField { .. }));
}

#[tokio::test]
async fn test_friendly_name_in_summary() {
    let ctx = ValidationContext::new();
    ctx.register_field(
        field("email", "required")
            .with_form("f")
            .with_options(FieldOptions::new().with_friendly_name("E-mail address")),
    )
    .await
    .unwrap();
    let entries = ctx.summary_by_form("f");
    assert_eq!(entries[0].friendly_name, "E-mail address");
    assert_eq!(entries[0].form_name.as_deref(), Some("f"));
}
