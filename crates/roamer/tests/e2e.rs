// SPDX-FileCopyrightText: 2026 Roamer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end journeys across the main bot and the support bot.
//!
//! Each test builds an isolated TestHarness with temp SQLite and mock
//! channels. Tests are independent and order-insensitive.

use std::sync::Arc;
use std::time::Duration;

use roamer_agent::InboundHandler;
use roamer_core::types::MessageContent;
use roamer_core::{ReservationStatus, Role};
use roamer_test_utils::TestHarness;
use tokio_util::sync::CancellationToken;

#[tokio::test]
async fn tourist_books_chats_plans_and_asks_support() {
    let h = TestHarness::builder().build().await.unwrap();
    let rita = h.user(100, "Rita", Role::Requester).await.unwrap();
    let pat = h.user(200, "Pat", Role::Provider).await.unwrap();
    let sam = h.user(300, "Sam", Role::Support).await.unwrap();
    let inn = h.location("Seaside Inn", 1.0, 1.0, Some(&pat)).await.unwrap();
    let cape = h.location("Cape Point", 5.0, 5.0, None).await.unwrap();

    // Search and book.
    h.send_text(&rita, "/start").await.unwrap();
    h.send_text(&rita, "seaside").await.unwrap();
    assert_eq!(h.last_reply(&rita).await, "Found: 1");
    h.press(&rita, format!("BOOK_{inn}")).await.unwrap();
    h.send_text(&rita, "two nights").await.unwrap();
    assert_eq!(h.last_reply(&rita).await, "Request sent to provider.");

    let notice = h.sent_to(&pat).await.pop().unwrap();
    let confirm = notice.actions()[0].data.clone();
    let id = confirm.strip_prefix("CONFIRM_").unwrap().parse().unwrap();

    // Provider confirms, the two are paired and can talk.
    h.press(&pat, &confirm).await.unwrap();
    assert_eq!(
        h.concierge.ledger().get(id).await.unwrap().status,
        ReservationStatus::Confirmed
    );
    h.send_text(&rita, "See you at noon").await.unwrap();
    assert_eq!(h.last_reply(&pat).await, "Rita: See you at noon");
    h.send_text(&rita, "/endchat").await.unwrap();
    assert!(h.directory.is_empty());

    // A second decision on the same reservation is refused.
    h.press(&pat, format!("REJECT_{id}")).await.unwrap();
    assert_eq!(
        h.last_reply(&pat).await,
        format!("Reservation #{id} is already confirmed.")
    );

    // Plan a route.
    h.press(&rita, format!("TRIP_{cape}")).await.unwrap();
    h.press(&rita, format!("TRIP_{inn}")).await.unwrap();
    h.send_text(&rita, "/trip").await.unwrap();
    assert_eq!(h.last_reply(&rita).await, "My route:\n1. Cape Point\n2. Seaside Inn");

    // Ask the support desk.
    h.support_text(&rita, "Where is the Inn entrance?").await.unwrap();
    assert_eq!(
        h.last_support_reply(&sam).await,
        format!("Request from Rita (ID {}):\nWhere is the Inn entrance?", rita.id)
    );
    h.support_text(&sam, &format!("/answer {} Behind the pier.", rita.id))
        .await
        .unwrap();
    assert_eq!(
        h.last_support_reply(&rita).await,
        "Support reply: Behind the pier."
    );

    let support_history = h.storage.list_support_messages(rita.id).await.unwrap();
    assert_eq!(support_history.len(), 2);
    let chat_history = h.storage.list_reservation_messages(id).await.unwrap();
    assert_eq!(chat_history.len(), 1);
}

#[tokio::test]
async fn both_bot_loops_share_one_store() {
    let h = TestHarness::builder().build().await.unwrap();
    let rita = h.user(100, "Rita", Role::Requester).await.unwrap();
    let sam = h.user(300, "Sam", Role::Support).await.unwrap();
    h.location("Harbor", 0.0, 0.0, None).await.unwrap();

    h.main_channel
        .inject_message(TestHarness::inbound(
            &rita,
            "telegram",
            MessageContent::Text("/subscribe_offers".into()),
        ))
        .await;
    h.support_channel
        .inject_message(TestHarness::inbound(
            &rita,
            "telegram-support",
            MessageContent::Text("Is the harbor open?".into()),
        ))
        .await;
    h.main_channel.close();
    h.support_channel.close();

    let cancel = CancellationToken::new();
    let concierge: Arc<dyn InboundHandler> = h.concierge.clone();
    let desk: Arc<dyn InboundHandler> = h.support_desk.clone();
    let main = tokio::spawn(roamer_agent::run(
        h.main_channel.clone(),
        concierge,
        cancel.clone(),
    ));
    let support = tokio::spawn(roamer_agent::run(
        h.support_channel.clone(),
        desk,
        cancel.clone(),
    ));

    for handle in [main, support] {
        tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .expect("bot loop should stop when its channel closes")
            .unwrap()
            .unwrap();
    }

    assert_eq!(h.storage.subscriber_handles().await.unwrap(), [rita.external_id]);
    assert_eq!(h.last_support_reply(&rita).await, "Your request was sent to support.");
    assert!(h.last_support_reply(&sam).await.contains("Is the harbor open?"));
}
