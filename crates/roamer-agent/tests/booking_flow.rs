// SPDX-FileCopyrightText: 2026 Roamer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end reservation, pairing and chat flows through the main bot.

use roamer_core::types::{Keyboard, User};
use roamer_core::{ExternalId, LocationId, ReservationId, ReservationStatus, Role};
use roamer_test_utils::TestHarness;

struct World {
    h: TestHarness,
    rita: User,
    pat: User,
    inn: LocationId,
}

async fn world() -> World {
    let h = TestHarness::builder().build().await.unwrap();
    let rita = h.user(100, "Rita", Role::Requester).await.unwrap();
    let pat = h.user(200, "Pat", Role::Provider).await.unwrap();
    let inn = h.location("Seaside Inn", 1.0, 1.0, Some(&pat)).await.unwrap();
    World { h, rita, pat, inn }
}

/// Book `location` as `who` and return the id carried by the provider's buttons.
async fn book(w: &World, who: &User, location: LocationId, details: &str) -> ReservationId {
    w.h.press(who, format!("BOOK_{location}")).await.unwrap();
    w.h.send_text(who, details).await.unwrap();
    let notice = w.h.sent_to(&w.pat).await.pop().expect("provider notified");
    let data = &notice.actions()[0].data;
    data.strip_prefix("CONFIRM_").unwrap().parse().unwrap()
}

#[tokio::test]
async fn search_then_show_location() {
    let w = world().await;
    w.h.send_text(&w.rita, "seaside").await.unwrap();

    let found = w.h.sent_to(&w.rita).await.pop().unwrap();
    assert_eq!(found.content, "Found: 1");
    assert_eq!(found.actions()[0].data, format!("LOC_{}", w.inn));

    w.h.press(&w.rita, format!("LOC_{}", w.inn)).await.unwrap();
    let details = w.h.sent_to(&w.rita).await.pop().unwrap();
    assert!(details.content.starts_with("Seaside Inn"));
    assert!(details.content.contains("Photos: 0"));
    let data: Vec<&str> = details.actions().iter().map(|a| a.data.as_str()).collect();
    assert_eq!(data, [format!("BOOK_{}", w.inn), format!("TRIP_{}", w.inn)]);

    w.h.send_text(&w.rita, "volcano").await.unwrap();
    assert_eq!(w.h.last_reply(&w.rita).await, "Nothing found.");
}

#[tokio::test]
async fn location_details_offer_chat_on_own_reservation() {
    let w = world().await;
    let id = book(&w, &w.rita, w.inn, "tonight").await;

    w.h.press(&w.rita, format!("LOC_{}", w.inn)).await.unwrap();
    let details = w.h.sent_to(&w.rita).await.pop().unwrap();
    let chat = details.actions().last().unwrap().data.clone();
    assert_eq!(chat, format!("CHAT_{id}"));

    w.h.press(&w.rita, &chat).await.unwrap();
    assert_eq!(w.h.directory.partner_of(w.rita.external_id), Some(w.pat.external_id));
    assert_eq!(w.h.directory.reservation_of(w.pat.external_id), Some(id));

    // A rejected reservation no longer offers a chat.
    w.h.press(&w.pat, format!("REJECT_{id}")).await.unwrap();
    w.h.press(&w.rita, format!("LOC_{}", w.inn)).await.unwrap();
    let details = w.h.sent_to(&w.rita).await.pop().unwrap();
    assert!(details.actions().iter().all(|a| !a.data.starts_with("CHAT_")));
}

#[tokio::test]
async fn star_lists_everything_within_limit() {
    let h = TestHarness::builder().with_max_results(2).build().await.unwrap();
    let rita = h.user(1, "Rita", Role::Requester).await.unwrap();
    for name in ["A", "B", "C"] {
        h.location(name, 0.0, 0.0, None).await.unwrap();
    }
    h.location("Very long name of a wonderful place", 0.0, 0.0, None)
        .await
        .unwrap();

    h.send_text(&rita, "*").await.unwrap();
    let found = h.sent_to(&rita).await.pop().unwrap();
    assert_eq!(found.content, "Found: 2");
    assert_eq!(found.actions().len(), 2);

    h.send_text(&rita, "wonderful").await.unwrap();
    let found = h.sent_to(&rita).await.pop().unwrap();
    assert_eq!(found.actions()[0].label, "Very long name of a wonderful ...");
}

#[tokio::test]
async fn confirm_opens_symmetric_pairing() {
    let w = world().await;
    let id = book(&w, &w.rita, w.inn, "two nights from friday").await;

    assert_eq!(w.h.last_reply(&w.rita).await, "Request sent to provider.");
    let notice = w.h.sent_to(&w.pat).await.pop().unwrap();
    assert_eq!(
        notice.content,
        "New reservation from Rita for Seaside Inn: two nights from friday"
    );
    let data: Vec<&str> = notice.actions().iter().map(|a| a.data.as_str()).collect();
    assert_eq!(data, [format!("CONFIRM_{id}"), format!("REJECT_{id}")]);

    let stored = w.h.concierge.ledger().get(id).await.unwrap();
    assert_eq!(stored.status, ReservationStatus::Pending);
    assert_eq!(stored.user_id, w.rita.id);

    w.h.press(&w.pat, format!("CONFIRM_{id}")).await.unwrap();

    let stored = w.h.concierge.ledger().get(id).await.unwrap();
    assert_eq!(stored.status, ReservationStatus::Confirmed);
    assert_eq!(w.h.directory.partner_of(w.rita.external_id), Some(w.pat.external_id));
    assert_eq!(w.h.directory.partner_of(w.pat.external_id), Some(w.rita.external_id));
    assert_eq!(w.h.directory.reservation_of(w.rita.external_id), Some(id));
    assert_eq!(w.h.directory.reservation_of(w.pat.external_id), Some(id));
    assert!(w.h.last_reply(&w.rita).await.contains("is confirmed"));
}

#[tokio::test]
async fn paired_text_is_relayed_and_archived() {
    let w = world().await;
    let id = book(&w, &w.rita, w.inn, "tonight").await;
    w.h.press(&w.pat, format!("CONFIRM_{id}")).await.unwrap();

    w.h.send_text(&w.rita, "Is breakfast included?").await.unwrap();
    assert_eq!(w.h.last_reply(&w.pat).await, "Rita: Is breakfast included?");
    w.h.send_text(&w.pat, "Yes").await.unwrap();
    assert_eq!(w.h.last_reply(&w.rita).await, "Pat: Yes");

    let history = w.h.storage.list_reservation_messages(id).await.unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].from_user_id, w.rita.id);
    assert_eq!(history[0].to_user_id, Some(w.pat.id));
    assert_eq!(history[0].content, "Is breakfast included?");
    assert!(!history[0].is_support);
}

#[tokio::test]
async fn endchat_closes_both_sides() {
    let w = world().await;
    let id = book(&w, &w.rita, w.inn, "").await;
    w.h.press(&w.pat, format!("CONFIRM_{id}")).await.unwrap();

    w.h.send_text(&w.pat, "/endchat").await.unwrap();
    assert_eq!(w.h.last_reply(&w.pat).await, "Chat closed.");
    assert_eq!(w.h.last_reply(&w.rita).await, "Pat ended the chat.");
    assert!(w.h.directory.is_empty());

    w.h.send_text(&w.pat, "/endchat").await.unwrap();
    assert_eq!(w.h.last_reply(&w.pat).await, "You have no active chat.");

    // Unpaired text goes back to being a search.
    w.h.send_text(&w.rita, "seaside").await.unwrap();
    assert_eq!(w.h.last_reply(&w.rita).await, "Found: 1");
}

#[tokio::test]
async fn reject_notifies_without_pairing() {
    let w = world().await;
    let id = book(&w, &w.rita, w.inn, "").await;
    w.h.press(&w.pat, format!("REJECT_{id}")).await.unwrap();

    assert_eq!(
        w.h.concierge.ledger().get(id).await.unwrap().status,
        ReservationStatus::Rejected
    );
    assert!(w.h.directory.is_empty());
    assert_eq!(
        w.h.last_reply(&w.rita).await,
        format!("Your reservation #{id} for Seaside Inn was rejected.")
    );
}

#[tokio::test]
async fn second_decision_is_refused_without_notifications() {
    let w = world().await;
    let id = book(&w, &w.rita, w.inn, "").await;
    w.h.press(&w.pat, format!("REJECT_{id}")).await.unwrap();
    let rita_before = w.h.sent_to(&w.rita).await.len();

    w.h.press(&w.pat, format!("CONFIRM_{id}")).await.unwrap();
    assert_eq!(
        w.h.last_reply(&w.pat).await,
        format!("Reservation #{id} is already rejected.")
    );
    assert_eq!(w.h.sent_to(&w.rita).await.len(), rita_before);
    assert_eq!(
        w.h.concierge.ledger().get(id).await.unwrap().status,
        ReservationStatus::Rejected
    );
    assert!(w.h.directory.is_empty());
}

#[tokio::test]
async fn only_owning_provider_decides() {
    let w = world().await;
    let id = book(&w, &w.rita, w.inn, "").await;
    let mallory = w.h.user(300, "Mallory", Role::Provider).await.unwrap();

    w.h.press(&mallory, format!("CONFIRM_{id}")).await.unwrap();
    assert_eq!(
        w.h.last_reply(&mallory).await,
        "This action is not available to you."
    );
    assert_eq!(
        w.h.concierge.ledger().get(id).await.unwrap().status,
        ReservationStatus::Pending
    );
}

#[tokio::test]
async fn unknown_reservation_is_reported() {
    let w = world().await;
    w.h.press(&w.pat, "CONFIRM_999").await.unwrap();
    assert_eq!(
        w.h.last_reply(&w.pat).await,
        "Sorry, reservation #999 was not found."
    );
    w.h.press(&w.pat, "EXPLODE_1").await.unwrap();
    assert_eq!(
        w.h.last_reply(&w.pat).await,
        "This button is no longer available."
    );
}

#[tokio::test]
async fn location_without_provider_cannot_be_booked() {
    let w = world().await;
    let park = w.h.location("City Park", 0.0, 0.0, None).await.unwrap();
    w.h.press(&w.rita, format!("BOOK_{park}")).await.unwrap();
    assert_eq!(
        w.h.last_reply(&w.rita).await,
        "City Park does not take reservations."
    );
    // Not awaiting details: the next text is a search.
    w.h.send_text(&w.rita, "park").await.unwrap();
    assert_eq!(w.h.last_reply(&w.rita).await, "Found: 1");
}

#[tokio::test]
async fn command_cancels_pending_details() {
    let w = world().await;
    w.h.press(&w.rita, format!("BOOK_{}", w.inn)).await.unwrap();
    w.h.send_text(&w.rita, "/locations").await.unwrap();
    w.h.send_text(&w.rita, "seaside").await.unwrap();

    assert_eq!(w.h.last_reply(&w.rita).await, "Found: 1");
    assert!(w.h.sent_to(&w.pat).await.is_empty());
}

#[tokio::test]
async fn new_confirmation_evicts_previous_pairing() {
    let w = world().await;
    let tom = w.h.user(101, "Tom", Role::Requester).await.unwrap();

    let first = book(&w, &w.rita, w.inn, "").await;
    w.h.press(&w.pat, format!("CONFIRM_{first}")).await.unwrap();
    let second = book(&w, &tom, w.inn, "").await;
    w.h.press(&w.pat, format!("CONFIRM_{second}")).await.unwrap();

    assert_eq!(w.h.directory.partner_of(w.pat.external_id), Some(tom.external_id));
    assert_eq!(w.h.directory.partner_of(tom.external_id), Some(w.pat.external_id));
    assert_eq!(w.h.directory.partner_of(w.rita.external_id), None);
    assert_eq!(w.h.directory.reservation_of(w.pat.external_id), Some(second));
}

#[tokio::test]
async fn chat_command_reopens_existing_reservation() {
    let w = world().await;
    let id = book(&w, &w.rita, w.inn, "").await;
    w.h.press(&w.pat, format!("CONFIRM_{id}")).await.unwrap();
    w.h.send_text(&w.rita, "/endchat").await.unwrap();

    w.h.send_text(&w.rita, &format!("/chat {id}")).await.unwrap();
    assert_eq!(w.h.directory.partner_of(w.rita.external_id), Some(w.pat.external_id));
    assert_eq!(w.h.last_reply(&w.pat).await, format!("Rita opened the chat for reservation #{id}."));

    w.h.send_text(&w.pat, "/endchat").await.unwrap();
    w.h.press(&w.pat, format!("CHAT_{id}")).await.unwrap();
    assert_eq!(w.h.directory.partner_of(w.pat.external_id), Some(w.rita.external_id));
    assert_eq!(w.h.directory.reservation_of(w.rita.external_id), Some(id));
}

#[tokio::test]
async fn strangers_cannot_join_a_chat() {
    let w = world().await;
    let id = book(&w, &w.rita, w.inn, "").await;
    let eve = w.h.user(400, "Eve", Role::Requester).await.unwrap();

    w.h.send_text(&eve, &format!("/chat {id}")).await.unwrap();
    assert_eq!(w.h.last_reply(&eve).await, "This action is not available to you.");
    assert!(w.h.directory.is_empty());

    w.h.send_text(&eve, "/chat soon").await.unwrap();
    assert_eq!(w.h.last_reply(&eve).await, "Usage: /chat <reservation id>");
}

#[tokio::test]
async fn chat_without_provider_is_not_found() {
    let w = world().await;
    let park = w.h.location("City Park", 0.0, 0.0, None).await.unwrap();
    let id = w
        .h
        .concierge
        .ledger()
        .create(w.rita.id, park, "picnic")
        .await
        .unwrap();

    w.h.send_text(&w.rita, &format!("/chat {id}")).await.unwrap();
    assert_eq!(
        w.h.last_reply(&w.rita).await,
        format!("Sorry, provider of location #{park} was not found.")
    );
    assert!(w.h.directory.is_empty());
}

#[tokio::test]
async fn failed_delivery_does_not_undo_confirmation() {
    let w = world().await;
    let id = book(&w, &w.rita, w.inn, "").await;

    w.h.main_channel.fail_sends(true);
    w.h.press(&w.pat, format!("CONFIRM_{id}")).await.unwrap();
    w.h.main_channel.fail_sends(false);

    assert_eq!(
        w.h.concierge.ledger().get(id).await.unwrap().status,
        ReservationStatus::Confirmed
    );
    assert_eq!(w.h.directory.partner_of(w.rita.external_id), Some(w.pat.external_id));
}

#[tokio::test]
async fn provider_lists_reservations() {
    let w = world().await;
    let first = book(&w, &w.rita, w.inn, "friday").await;
    let second = book(&w, &w.rita, w.inn, "saturday").await;
    w.h.press(&w.pat, format!("REJECT_{first}")).await.unwrap();
    w.h.main_channel.clear_sent().await;

    w.h.send_text(&w.pat, "📦 My reservations").await.unwrap();
    let listed = w.h.sent_to(&w.pat).await;
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].content, format!("#{second} Seaside Inn: saturday (pending)"));
    assert_eq!(listed[0].actions()[0].data, format!("CONFIRM_{second}"));
    assert_eq!(listed[1].content, format!("#{first} Seaside Inn: friday (rejected)"));
    assert_eq!(listed[1].actions()[0].data, format!("CHAT_{first}"));

    w.h.send_text(&w.rita, "/reservations").await.unwrap();
    assert_eq!(w.h.last_reply(&w.rita).await, "This action is not available to you.");
}

#[tokio::test]
async fn start_menu_depends_on_role() {
    let w = world().await;
    let sam = w.h.user(500, "Sam", Role::Support).await.unwrap();
    for (user, label) in [(&w.rita, "🗺 New route"), (&w.pat, "📦 My reservations"), (&sam, "📤 Broadcast")] {
        w.h.send_text(user, "/start").await.unwrap();
        let reply = w.h.sent_to(user).await.pop().unwrap();
        let Some(Keyboard::Menu(rows)) = reply.keyboard else {
            panic!("expected a menu");
        };
        assert!(rows.iter().flatten().any(|l| l == label), "{label} missing");
    }
    assert_eq!(w.h.last_reply(&w.rita).await, "Hello, Rita! Choose an action:");

    w.h.send_text(&w.rita, "🛎 Support").await.unwrap();
    assert_eq!(
        w.h.last_reply(&w.rita).await,
        "Contact @TouristSupportHelpBot for support."
    );
    w.h.send_text(&w.rita, "/teleport").await.unwrap();
    assert_eq!(w.h.last_reply(&w.rita).await, "Unknown command /teleport.");
}

#[tokio::test]
async fn first_contact_provisions_requester() {
    let w = world().await;
    let newcomer = User {
        id: roamer_core::UserId(0),
        external_id: ExternalId(777),
        username: "nina".into(),
        first_name: "Nina".into(),
        last_name: String::new(),
        role: Role::Support,
    };
    // The claimed role in the update is irrelevant; only the handle counts.
    w.h.send_text(&newcomer, "/start").await.unwrap();
    let stored = w
        .h
        .storage
        .get_user_by_external_id(ExternalId(777))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.role, Role::Requester);
    assert_eq!(stored.first_name, "Nina");
}
