use super::*;
use crate::core::clock::testing::ManualClock;
use crate::core::message::Role;
use crate::core::persistence::{MemoryStore, CHATS_KEY};
use crate::core::settings::Theme;
use std::sync::Arc;

fn open_store() -> (SessionStore<Arc<MemoryStore>>, Arc<MemoryStore>, ManualClock) {
    let backing = Arc::new(MemoryStore::new());
    let clock = ManualClock::at_millis(1_700_000_000_000);
    let store = SessionStore::open_with_clock(
        Persistence::new(Arc::clone(&backing)),
        Box::new(clock.clone()),
    );
    (store, backing, clock)
}

fn assistant(content: &str) -> Turn {
    Turn::assistant(content, Utc::now()).with_reasoning("", 5)
}

/// Builds a selected chat holding `[u0, a0, u1, a1]`.
fn seeded_conversation(store: &mut SessionStore<Arc<MemoryStore>>) -> ChatId {
    let first = store.send_user_turn("u0");
    store.append_assistant_turn(&first.chat_id, assistant("a0"));
    let second = store.send_user_turn("u1");
    store.append_assistant_turn(&second.chat_id, assistant("a1"));
    first.chat_id
}

fn contents(chat: &Chat) -> Vec<&str> {
    chat.turns.iter().map(|turn| turn.content.as_str()).collect()
}

fn assert_consistent(store: &SessionStore<Arc<MemoryStore>>) {
    if let Some(id) = &store.selected {
        assert!(store.chat(id).is_some(), "selection {id} is dangling");
    }
    if let Some(index) = store.pending_edit_index() {
        let chat = store.selected_chat().expect("pending edit without selection");
        assert!(chat.turn(index).is_some_and(Turn::is_user));
    }
}

#[test]
fn create_chat_inserts_at_front_and_selects() {
    let (mut store, _, clock) = open_store();
    let first = store.create_chat().id.clone();
    clock.advance_millis(10);
    let second = store.create_chat().id.clone();

    assert_eq!(store.chats()[0].id, second);
    assert_eq!(store.chats()[1].id, first);
    assert_eq!(store.selected_chat_id(), Some(&second));
    assert_eq!(store.chats()[0].title, DEFAULT_CHAT_TITLE);
    assert!(store.chats()[0].is_empty());
}

#[test]
fn ids_stay_unique_within_one_millisecond() {
    let (mut store, _, _) = open_store();
    let a = store.create_chat().id.clone();
    let b = store.create_chat().id.clone();
    let c = store.create_chat().id.clone();

    assert_eq!(a.as_str(), "1700000000000");
    assert_eq!(b.as_str(), "1700000000001");
    assert_eq!(c.as_str(), "1700000000002");
}

#[test]
fn select_unknown_chat_is_ignored() {
    let (mut store, _, _) = open_store();
    let id = store.create_chat().id.clone();

    assert!(!store.select_chat(&ChatId::from("missing")));
    assert_eq!(store.selected_chat_id(), Some(&id));
}

#[test]
fn deleting_selected_chat_selects_first_remaining() {
    let (mut store, _, clock) = open_store();
    let oldest = store.create_chat().id.clone();
    clock.advance_millis(1);
    let middle = store.create_chat().id.clone();
    clock.advance_millis(1);
    let newest = store.create_chat().id.clone();

    assert!(store.select_chat(&middle));
    assert!(store.delete_chat(&middle));

    assert_eq!(store.selected_chat_id(), Some(&newest));
    assert_eq!(store.chats().len(), 2);
    assert!(store.chat(&oldest).is_some());
}

#[test]
fn deleting_only_chat_clears_selection() {
    let (mut store, _, _) = open_store();
    let id = store.create_chat().id.clone();

    assert!(store.delete_chat(&id));

    assert!(store.chats().is_empty());
    assert_eq!(store.selected_chat_id(), None);
    assert_eq!(store.selected_chat(), None);
}

#[test]
fn deleting_unselected_chat_keeps_selection() {
    let (mut store, _, clock) = open_store();
    let other = store.create_chat().id.clone();
    clock.advance_millis(1);
    let selected = store.create_chat().id.clone();

    assert!(store.delete_chat(&other));
    assert_eq!(store.selected_chat_id(), Some(&selected));
    assert!(!store.delete_chat(&other));
}

#[test]
fn selection_never_dangles_across_mixed_operations() {
    let (mut store, _, clock) = open_store();
    let mut ids = Vec::new();
    for step in 0..12 {
        clock.advance_millis(1);
        match step % 4 {
            0 | 1 => ids.push(store.create_chat().id.clone()),
            2 => {
                let target = ids.remove(0);
                store.delete_chat(&target);
            }
            _ => {
                if let Some(target) = ids.last() {
                    store.select_chat(target);
                }
                store.select_chat(&ChatId::from("nope"));
            }
        }
        assert_consistent(&store);
    }
    for id in ids {
        store.delete_chat(&id);
        assert_consistent(&store);
    }
    assert_eq!(store.selected_chat_id(), None);
}

#[test]
fn rename_sets_title_and_ignores_unknown_ids() {
    let (mut store, _, _) = open_store();
    let id = store.create_chat().id.clone();

    assert!(store.rename_chat(&id, "Trip planning"));
    assert!(!store.rename_chat(&ChatId::from("missing"), "x"));
    assert!(store.rename_chat(&id, ""));

    assert_eq!(store.chat(&id).map(|chat| chat.title.as_str()), Some(""));
}

#[test]
fn first_message_creates_chat_with_derived_title() {
    let (mut store, _, _) = open_store();
    let outgoing = store.send_user_turn("What is the tallest mountain in the solar system?");

    let chat = store.selected_chat().expect("chat created on demand");
    assert_eq!(chat.id, outgoing.chat_id);
    assert_eq!(chat.title, "What is the tallest mountain i...");
    assert_eq!(outgoing.messages.len(), 1);
    assert_eq!(outgoing.messages[0].role, "user");
}

#[test]
fn send_appends_exactly_one_turn_and_returns_full_history() {
    let (mut store, _, clock) = open_store();
    let chat_id = seeded_conversation(&mut store);
    clock.advance_millis(250);

    let outgoing = store.send_user_turn("u2");

    let chat = store.chat(&chat_id).unwrap();
    assert_eq!(contents(chat), ["u0", "a0", "u1", "a1", "u2"]);
    assert_eq!(chat.last_updated, clock.now());
    assert_eq!(chat.turns[4].created_at, clock.now());
    let roles: Vec<&str> = outgoing.messages.iter().map(|m| m.role.as_str()).collect();
    assert_eq!(roles, ["user", "assistant", "user", "assistant", "user"]);
    assert_eq!(store.pending_edit_index(), None);
}

#[test]
fn edit_and_resend_truncates_from_edited_turn() {
    let (mut store, _, _) = open_store();
    let chat_id = seeded_conversation(&mut store);

    assert!(store.begin_edit(2));
    assert_eq!(store.pending_edit_index(), Some(2));
    let outgoing = store.send_user_turn("new");

    let chat = store.chat(&chat_id).unwrap();
    assert_eq!(contents(chat), ["u0", "a0", "new"]);
    assert_eq!(chat.turns[2].role, Role::User);
    assert_eq!(outgoing.messages.len(), 3);
    assert_eq!(store.pending_edit_index(), None);
}

#[test]
fn begin_edit_rejects_assistant_turns_and_out_of_range() {
    let (mut store, _, _) = open_store();
    assert!(!store.begin_edit(0), "no chat selected");

    seeded_conversation(&mut store);
    assert!(!store.begin_edit(1));
    assert!(!store.begin_edit(9));
    assert_eq!(store.pending_edit_index(), None);
}

#[test]
fn switching_chats_drops_pending_edit() {
    let (mut store, _, clock) = open_store();
    let edited = seeded_conversation(&mut store);
    assert!(store.begin_edit(0));

    clock.advance_millis(1);
    let other = store.create_chat().id.clone();
    assert_eq!(store.pending_edit_index(), None);

    assert!(store.select_chat(&edited));
    assert!(store.begin_edit(2));
    assert!(store.select_chat(&other));
    assert_eq!(store.pending_edit_index(), None);
}

#[test]
fn cancel_edit_clears_pending_index() {
    let (mut store, _, _) = open_store();
    seeded_conversation(&mut store);
    assert!(!store.cancel_edit());
    assert!(store.begin_edit(0));
    assert!(store.cancel_edit());
    assert_eq!(store.pending_edit_index(), None);
}

#[test]
fn assistant_reply_targets_original_chat_after_switch() {
    let (mut store, _, clock) = open_store();
    let outgoing = store.send_user_turn("question");
    clock.advance_millis(1);
    let other = store.create_chat().id.clone();

    assert!(store.append_assistant_turn(&outgoing.chat_id, assistant("answer")));

    assert_eq!(contents(store.chat(&outgoing.chat_id).unwrap()), ["question", "answer"]);
    assert!(store.chat(&other).unwrap().is_empty());
    assert_eq!(store.selected_chat_id(), Some(&other));
}

#[test]
fn assistant_reply_for_deleted_chat_is_dropped() {
    let (mut store, _, _) = open_store();
    let outgoing = store.send_user_turn("question");
    store.delete_chat(&outgoing.chat_id);

    assert!(!store.append_assistant_turn(&outgoing.chat_id, assistant("late")));
    assert!(store.chats().is_empty());
}

#[test]
fn append_refuses_user_turns() {
    let (mut store, _, _) = open_store();
    let outgoing = store.send_user_turn("question");
    assert!(!store.append_assistant_turn(&outgoing.chat_id, Turn::user("sneaky", Utc::now())));
    assert_eq!(store.chat(&outgoing.chat_id).unwrap().turns.len(), 1);
}

#[test]
fn every_mutation_is_flushed_to_storage() {
    let (mut store, backing, _) = open_store();
    let id = store.create_chat().id.clone();
    store.rename_chat(&id, "Renamed");

    let reopened = SessionStore::open(Persistence::new(Arc::clone(&backing)));
    assert_eq!(reopened.chats().len(), 1);
    assert_eq!(reopened.chats()[0].title, "Renamed");
    assert_eq!(reopened.selected_chat_id(), None);

    store.delete_chat(&id);
    let raw = backing.get(CHATS_KEY).unwrap().expect("chats key written");
    assert_eq!(raw, "[]");
}

#[test]
fn settings_updates_persist_immediately() {
    let (mut store, backing, _) = open_store();
    store.update_settings(|settings| settings.theme = Theme::Light);

    let reopened = SessionStore::open(Persistence::new(Arc::clone(&backing)));
    assert_eq!(reopened.settings().theme, Theme::Light);
}

#[test]
fn stats_reflect_current_chats() {
    let (mut store, _, _) = open_store();
    seeded_conversation(&mut store);
    let stats = store.stats();
    assert_eq!(stats.total_chats, 1);
    assert_eq!(stats.total_messages, 4);
    assert_eq!(stats.average_response_time_ms, 5);
}

#[test]
fn search_filters_by_title_or_content_in_sidebar_order() {
    let (mut store, _, _) = open_store();
    let kitchen = store.send_user_turn("How do I bake sourdough bread?").chat_id;
    store.rename_chat(&kitchen, "Kitchen notes");
    let starter = store.create_chat().id.clone();
    store.rename_chat(&starter, "Sourdough starter");
    let taxes = store.create_chat().id.clone();
    store.rename_chat(&taxes, "Tax return");
    store.send_user_turn("When is the deadline?");

    let ids = |query: &str| -> Vec<ChatId> {
        store.search(query).into_iter().map(|chat| chat.id.clone()).collect()
    };
    assert_eq!(ids("SOURDOUGH"), vec![starter.clone(), kitchen.clone()]);
    assert_eq!(ids("deadline"), vec![taxes.clone()]);
    assert_eq!(ids(""), vec![taxes, starter, kitchen]);
    assert!(ids("croissant").is_empty());
}
