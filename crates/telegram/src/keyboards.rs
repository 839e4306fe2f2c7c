//! Inline keyboard builders for interactive bot menus

use session::RenderedPage;
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};

use crate::constants::{emoji, BUTTON_LABEL_LEN};
use crate::types::{CallbackData, MenuAction};
use crate::utils::truncate_text;

fn menu_button(label: &str, action: MenuAction) -> InlineKeyboardButton {
    InlineKeyboardButton::callback(label, CallbackData::Menu(action).encode())
}

fn session_button(label: impl Into<String>, token: &str) -> InlineKeyboardButton {
    InlineKeyboardButton::callback(label, CallbackData::session(token).encode())
}

/// Main menu shown on `/start` in a private chat
///
/// The "Add to Group" button is left out when `bot_username` is unknown.
pub fn start_menu_keyboard(bot_username: &str, is_admin: bool) -> InlineKeyboardMarkup {
    let mut rows = Vec::new();

    let add_to_group = format!("https://t.me/{}?startgroup=true", bot_username);
    if let (false, Ok(url)) = (bot_username.is_empty(), url::Url::parse(&add_to_group)) {
        rows.push(vec![InlineKeyboardButton::url("➕ Add to Group", url)]);
    }
    rows.push(vec![
        menu_button("🤖 Clone Bot", MenuAction::Clone),
        menu_button("ℹ️ Help", MenuAction::Help),
    ]);
    if is_admin {
        rows.push(vec![menu_button("🛠️ Admin Panel", MenuAction::Admin)]);
    }

    InlineKeyboardMarkup::new(rows)
}

/// Single "Back" button returning to the start menu
pub fn back_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![menu_button("⬅️ Back", MenuAction::Back)]])
}

pub fn admin_panel_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![
        menu_button("🔄 Refresh", MenuAction::Admin),
        menu_button("⬅️ Back", MenuAction::Back),
    ]])
}

/// Join button for a force-subscribe channel, `None` if the link is not a valid URL
pub fn join_channel_keyboard(invite_link: &str) -> Option<InlineKeyboardMarkup> {
    let url = url::Url::parse(invite_link).ok()?;
    Some(InlineKeyboardMarkup::new(vec![vec![InlineKeyboardButton::url(
        "📢 Join Channel",
        url,
    )]]))
}

/// One button per row, each carrying a session token
pub fn choice_keyboard(choices: &[(String, String)]) -> InlineKeyboardMarkup {
    let rows = choices
        .iter()
        .map(|(label, token)| vec![session_button(label.clone(), token)])
        .collect::<Vec<_>>();
    InlineKeyboardMarkup::new(rows)
}

/// File buttons of a rendered page followed by the navigation row
pub fn page_keyboard(page: &RenderedPage) -> InlineKeyboardMarkup {
    let mut rows: Vec<Vec<InlineKeyboardButton>> = page
        .items
        .iter()
        .map(|item| {
            let label = format!(
                "{} {}. {}",
                emoji::FOLDER,
                item.number,
                truncate_text(&item.display_name, BUTTON_LABEL_LEN)
            );
            vec![session_button(label, &item.token)]
        })
        .collect();

    let mut nav = Vec::new();
    if let Some(prev) = &page.prev {
        nav.push(session_button("⬅️ Prev", prev));
    }
    nav.push(InlineKeyboardButton::callback(
        format!("{} {}/{}", emoji::PAGE, page.page + 1, page.total_pages.max(1)),
        CallbackData::Noop.encode(),
    ));
    if let Some(next) = &page.next {
        nav.push(session_button("Next ➡️", next));
    }
    rows.push(nav);

    InlineKeyboardMarkup::new(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::callback_buttons;
    use session::PageItem;
    use teloxide::types::InlineKeyboardButtonKind;

    #[test]
    fn test_start_menu_admin_button() {
        let user = start_menu_keyboard("autofilter_bot", false);
        let admin = start_menu_keyboard("autofilter_bot", true);

        assert!(!callback_buttons(&user).iter().any(|(_, data)| data == "m:admin"));
        assert!(callback_buttons(&admin).iter().any(|(_, data)| data == "m:admin"));

        match &user.inline_keyboard[0][0].kind {
            InlineKeyboardButtonKind::Url(url) => {
                assert_eq!(url.as_str(), "https://t.me/autofilter_bot?startgroup=true")
            }
            other => panic!("unexpected button: {:?}", other),
        }
    }

    #[test]
    fn test_start_menu_without_username() {
        let keyboard = start_menu_keyboard("", false);
        assert_eq!(keyboard.inline_keyboard.len(), 1);
    }

    #[test]
    fn test_join_channel_keyboard() {
        assert!(join_channel_keyboard("https://t.me/+abc").is_some());
        assert!(join_channel_keyboard("not a link").is_none());
    }

    #[test]
    fn test_page_keyboard_layout() {
        let page = RenderedPage {
            query: "show".to_string(),
            page: 1,
            total_pages: 3,
            total_items: 25,
            items: vec![PageItem {
                number: 11,
                display_name: "a".repeat(60),
                token: "aaaaaaaaaaaaaaaa".to_string(),
            }],
            prev: Some("bbbbbbbbbbbbbbbb".to_string()),
            next: Some("cccccccccccccccc".to_string()),
        };

        let buttons = callback_buttons(&page_keyboard(&page));
        assert_eq!(buttons.len(), 4);
        assert!(buttons[0].0.starts_with("📁 11. aaa"));
        assert!(buttons[0].0.ends_with("..."));
        assert_eq!(buttons[0].1, "s:aaaaaaaaaaaaaaaa");
        assert_eq!(buttons[1].1, "s:bbbbbbbbbbbbbbbb");
        assert_eq!(buttons[2], ("📄 2/3".to_string(), "noop".to_string()));
        assert_eq!(buttons[3].1, "s:cccccccccccccccc");
    }
}
