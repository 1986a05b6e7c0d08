//! Pipeline tests: admission order, authorization, rate limiting,
//! feature flags and the fixed command catalog.

mod common;

use common::{harness, inbound, test_settings, Mocks, ScriptedAi, ScriptedSearch, OWNER};
use std::sync::Arc;

const USER: &str = "100";
const CHAT: &str = "5001";

#[tokio::test]
async fn about_replies_with_bot_info() {
    let h = harness(test_settings(), Mocks::default());

    h.engine.handle_inbound(inbound(CHAT, USER, ".about")).await;

    let texts = h.transport.texts_to(CHAT);
    assert_eq!(texts.len(), 1);
    assert!(texts[0].contains("Aria Mini"));
}

#[tokio::test]
async fn unknown_command_is_silently_ignored() {
    let h = harness(test_settings(), Mocks::default());

    h.engine.handle_inbound(inbound(CHAT, USER, ".doesnotexist")).await;
    h.engine.handle_inbound(inbound(CHAT, USER, "plain chatter")).await;

    assert!(h.transport.texts().is_empty());
}

#[tokio::test]
async fn command_tokens_match_case_insensitively() {
    let h = harness(test_settings(), Mocks::default());

    h.engine.handle_inbound(inbound(CHAT, USER, ".ABOUT")).await;

    assert_eq!(h.transport.texts_to(CHAT).len(), 1);
}

#[tokio::test]
async fn rate_limit_denies_after_max_within_window() {
    let mut settings = test_settings();
    settings.rate_limit_max = 2;
    let h = harness(settings, Mocks::default());

    for _ in 0..3 {
        h.engine.handle_inbound(inbound(CHAT, USER, ".about")).await;
    }

    let texts = h.transport.texts_to(CHAT);
    assert_eq!(texts.len(), 3);
    assert!(texts[2].contains("slow down"), "third reply should throttle");
}

#[tokio::test]
async fn owner_is_never_rate_limited() {
    let mut settings = test_settings();
    settings.rate_limit_max = 1;
    let h = harness(settings, Mocks::default());

    for _ in 0..5 {
        h.engine.handle_inbound(inbound(CHAT, OWNER, ".about")).await;
    }

    let texts = h.transport.texts_to(CHAT);
    assert_eq!(texts.len(), 5);
    assert!(texts.iter().all(|text| !text.contains("slow down")));
}

#[tokio::test]
async fn owner_block_silences_user_until_unblock() {
    let h = harness(test_settings(), Mocks::default());

    h.engine
        .handle_inbound(inbound(CHAT, OWNER, &format!(".block {USER}")))
        .await;
    h.engine.handle_inbound(inbound(CHAT, USER, ".about")).await;

    let after_block = h.transport.texts_to(CHAT);
    assert_eq!(after_block.len(), 1, "only the block confirmation");
    assert!(after_block[0].contains("blocked"));

    h.engine
        .handle_inbound(inbound(CHAT, OWNER, &format!(".unblock {USER}")))
        .await;
    h.engine.handle_inbound(inbound(CHAT, USER, ".about")).await;

    assert_eq!(h.transport.texts_to(CHAT).len(), 3);
}

#[tokio::test]
async fn non_owner_block_is_denied_and_has_no_effect() {
    let h = harness(test_settings(), Mocks::default());

    h.engine
        .handle_inbound(inbound(CHAT, USER, ".block 200"))
        .await;

    let texts = h.transport.texts_to(CHAT);
    assert_eq!(texts.len(), 1);
    assert!(texts[0].contains("only available to my creator"));

    // Target was not blocked.
    h.engine.handle_inbound(inbound(CHAT, "200", ".about")).await;
    assert_eq!(h.transport.texts_to(CHAT).len(), 2);
}

#[tokio::test]
async fn blocked_identity_matches_canonical_form() {
    let h = harness(test_settings(), Mocks::default());

    h.engine
        .handle_inbound(inbound(CHAT, OWNER, ".block 100"))
        .await;
    h.engine
        .handle_inbound(inbound(CHAT, "100@s.whatsapp.net", ".about"))
        .await;

    assert_eq!(h.transport.texts_to(CHAT).len(), 1, "suffixed id is still blocked");
}

#[tokio::test]
async fn disabled_feature_short_circuits_before_collaborators() {
    let mut settings = test_settings();
    settings.features.enable_downloads = false;
    let search = Arc::new(ScriptedSearch::hit("Song", "https://x/v"));
    let mocks = Mocks {
        search: search.clone(),
        ..Mocks::default()
    };
    let h = harness(settings, mocks);

    h.engine
        .handle_inbound(inbound(CHAT, USER, ".song anything"))
        .await;

    let texts = h.transport.texts_to(CHAT);
    assert_eq!(texts.len(), 1);
    assert!(texts[0].contains("disabled"));
    assert_eq!(search.call_count(), 0, "search must not run");
}

#[tokio::test]
async fn missing_arguments_yield_usage_hint() {
    let h = harness(test_settings(), Mocks::default());

    h.engine.handle_inbound(inbound(CHAT, USER, ".song")).await;

    let texts = h.transport.texts_to(CHAT);
    assert_eq!(texts.len(), 1);
    assert!(texts[0].contains("Usage:"));
}

#[tokio::test]
async fn ai_ask_relays_the_answer() {
    let mocks = Mocks {
        ai: Arc::new(ScriptedAi::Answers("The answer is 42.".to_owned())),
        ..Mocks::default()
    };
    let h = harness(test_settings(), mocks);

    h.engine
        .handle_inbound(inbound(CHAT, USER, ".aria what is the answer"))
        .await;

    let texts = h.transport.texts_to(CHAT);
    assert_eq!(texts.len(), 2, "thinking notice, then the answer");
    assert!(texts[1].contains("The answer is 42."));
}

#[tokio::test]
async fn ai_timeout_falls_back_to_fixed_notice() {
    let mocks = Mocks {
        ai: Arc::new(ScriptedAi::TimesOut),
        ..Mocks::default()
    };
    let h = harness(test_settings(), mocks);

    h.engine
        .handle_inbound(inbound(CHAT, USER, ".aria slow question"))
        .await;

    let texts = h.transport.texts_to(CHAT);
    assert_eq!(texts.len(), 2);
    assert!(texts[1].contains("AI brain"), "fixed fallback message");
}

#[tokio::test]
async fn care_files_one_ticket_and_notifies_owner_once() {
    let h = harness(test_settings(), Mocks::default());

    h.engine
        .handle_inbound(inbound(CHAT, USER, ".care my downloads keep failing"))
        .await;

    let owner_texts = h.transport.texts_to(OWNER);
    assert_eq!(owner_texts.len(), 1, "exactly one owner notification");
    assert!(owner_texts[0].contains("Customer Care Request #"));
    assert!(owner_texts[0].contains("my downloads keep failing"));

    let user_texts = h.transport.texts_to(CHAT);
    assert_eq!(user_texts.len(), 1, "exactly one acknowledgment");
    assert!(user_texts[0].contains('#'), "acknowledgment carries the ticket id");

    // Exactly one ticket landed in the store (next to the rate counter).
    h.store.run_pending_tasks().await;
    assert_eq!(h.store.entry_count(), 2);
}

#[tokio::test]
async fn alive_reports_uptime_and_engine() {
    let h = harness(test_settings(), Mocks::default());

    h.engine.handle_inbound(inbound(CHAT, USER, ".alive")).await;

    let texts = h.transport.texts_to(CHAT);
    assert_eq!(texts.len(), 1);
    assert!(texts[0].contains("Uptime: 0h 0m"));
    assert!(texts[0].contains("gpt-4o-mini"));
}

#[tokio::test]
async fn help_lists_owner_commands() {
    let h = harness(test_settings(), Mocks::default());

    h.engine.handle_inbound(inbound(CHAT, USER, ".help")).await;

    let texts = h.transport.texts_to(CHAT);
    assert_eq!(texts.len(), 1);
    assert!(texts[0].contains(".block"));
    assert!(texts[0].contains(".song"));
}
