// SPDX-FileCopyrightText: 2026 Roamer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversion between Telegram updates and Roamer message types.

use chrono::{DateTime, Utc};
use roamer_core::ExternalId;
use roamer_core::types::{ContactProfile, InboundMessage, Keyboard, MessageContent};
use teloxide::types::{
    CallbackQuery, ChatKind, InlineKeyboardButton, InlineKeyboardMarkup, KeyboardButton,
    KeyboardMarkup, Message, ReplyMarkup, User,
};

/// Returns true if the message is from a private (DM) chat.
pub fn is_dm(msg: &Message) -> bool {
    matches!(msg.chat.kind, ChatKind::Private(_))
}

/// Builds a contact profile from a Telegram user.
///
/// Returns `None` for ids outside the signed 64-bit range.
pub fn profile_of(user: &User) -> Option<ContactProfile> {
    let external_id = i64::try_from(user.id.0).ok()?;
    Some(ContactProfile {
        external_id: ExternalId(external_id),
        username: user.username.clone().unwrap_or_default(),
        first_name: user.first_name.clone(),
        last_name: user.last_name.clone().unwrap_or_default(),
    })
}

/// Extracts text or photo content from a message.
///
/// Photos carry the file id of the largest size Telegram offers.
/// Returns `None` for stickers, voice notes and other unsupported kinds.
pub fn extract_content(msg: &Message) -> Option<MessageContent> {
    if let Some(text) = msg.text() {
        return Some(MessageContent::Text(text.to_string()));
    }

    if let Some(sizes) = msg.photo() {
        let largest = sizes.iter().max_by_key(|p| u64::from(p.width) * u64::from(p.height))?;
        return Some(MessageContent::Photo {
            file_id: largest.file.id.to_string(),
            caption: msg.caption().map(str::to_string),
        });
    }

    None
}

/// Converts a private-chat message into an inbound message.
pub fn message_to_inbound(channel: &str, msg: &Message) -> Option<InboundMessage> {
    if !is_dm(msg) {
        return None;
    }
    let sender = profile_of(msg.from.as_ref()?)?;
    let content = extract_content(msg)?;
    Some(inbound(channel, sender, content, msg.date))
}

/// Converts an inline button press into an inbound callback message.
pub fn callback_to_inbound(channel: &str, query: &CallbackQuery) -> Option<InboundMessage> {
    let data = query.data.clone()?;
    let sender = profile_of(&query.from)?;
    Some(inbound(
        channel,
        sender,
        MessageContent::Callback(data),
        Utc::now(),
    ))
}

fn inbound(
    channel: &str,
    sender: ContactProfile,
    content: MessageContent,
    date: DateTime<Utc>,
) -> InboundMessage {
    InboundMessage {
        channel: channel.to_string(),
        sender,
        content,
        timestamp: date.to_rfc3339(),
    }
}

/// Renders a keyboard as Telegram reply markup.
pub fn to_reply_markup(keyboard: &Keyboard) -> ReplyMarkup {
    match keyboard {
        Keyboard::Inline(rows) => {
            let rows = rows.iter().map(|row| {
                row.iter()
                    .map(|action| {
                        InlineKeyboardButton::callback(action.label.clone(), action.data.clone())
                    })
                    .collect::<Vec<_>>()
            });
            ReplyMarkup::InlineKeyboard(InlineKeyboardMarkup::new(rows))
        }
        Keyboard::Menu(rows) => {
            let rows = rows.iter().map(|row| {
                row.iter()
                    .map(|label| KeyboardButton::new(label.clone()))
                    .collect::<Vec<_>>()
            });
            ReplyMarkup::Keyboard(KeyboardMarkup::new(rows))
        }
    }
}
