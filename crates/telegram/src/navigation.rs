//! Navigation state machine
//!
//! Every inbound event ends in exactly one [`Transition`]. Stateful buttons
//! carry a session token only; the payload it resolves to decides the next
//! screen.

use std::sync::Arc;

use catalog::{facets, FileRecord, SeasonGroups, SeasonKey, UserRecord};
use chrono::Timelike;
use session::{render_page, FileSelection, PageView, SeasonGroup, SessionPayload};
use teloxide::types::{ChatId, InlineKeyboardMarkup, MessageId, UserId};

use crate::admin;
use crate::constants::{
    emoji, FILE_MESSAGE_TTL, MAX_CALLBACK_DATA_LEN, MAX_QUALITY_BUTTONS, MAX_SEASON_BUTTONS, MIN_QUERY_LEN,
    NO_RESULTS_TTL,
};
use crate::context::BotContext;
use crate::error::BotResult;
use crate::keyboards;
use crate::membership::GateDecision;
use crate::transport::schedule_delete;
use crate::types::{CallbackData, CallbackInput, GroupQuery, MenuAction, Screen, Transition};
use crate::utils::time_greeting;

const HELP_TEXT: &str = "ℹ️ How to use me\n\n\
    1. Add me to your group\n\
    2. Type the name of a movie or series in the group\n\
    3. Pick a season, a quality or a file from the buttons\n\
    4. The file arrives in your private chat\n\n\
    Start me in private first so I am allowed to message you.";

const CLONE_TEXT: &str = "🌀 Clone Bot System\n\n\
    1. Go to @BotFather\n\
    2. Create a new bot\n\
    3. Send me the token\n\n\
    Your clone will use my database!";

/// A screen ready to be sent or edited in place
struct Rendered {
    text: String,
    keyboard: Option<InlineKeyboardMarkup>,
    screen: Screen,
}

/// `/start` in a private chat
pub async fn handle_start(ctx: &BotContext, chat: ChatId, user: UserId, first_name: &str) -> BotResult<Transition> {
    let is_new = ctx.catalog.upsert_user(UserRecord::new(user.0, first_name)).await?;
    if is_new {
        tracing::info!(user = user.0, "New user registered");
        ctx.admin_log
            .record(format!(
                "👤 New User: {}\n🆔 ID: {}\n📅 {}",
                first_name,
                user.0,
                chrono::Utc::now().format("%Y-%m-%d %H:%M:%S")
            ))
            .await;
    }

    let text = format!(
        "{} {}! 👋\n\n\
         🎬 I'm an Auto-Filter Bot\n\
         Search movies and series in groups, get the files in private.\n\n\
         Add me to a group and start searching!",
        current_greeting(),
        first_name
    );
    let keyboard = keyboards::start_menu_keyboard(&ctx.config.bot_username, ctx.is_admin(user));
    ctx.transport.send_text(chat, text, Some(keyboard)).await?;

    Ok(Transition::To(Screen::Menu))
}

fn current_greeting() -> &'static str {
    time_greeting(chrono::Local::now().hour())
}

/// A text message in a group, handled as a catalog search
pub async fn handle_group_query(ctx: &BotContext, query: GroupQuery) -> BotResult<Transition> {
    let text = query.text.trim();
    if text.chars().count() < MIN_QUERY_LEN || text.starts_with('/') {
        return Ok(Transition::Ignored);
    }

    if let GateDecision::MustJoin(channel) = ctx.gate.check(ctx.transport.as_ref(), query.user).await {
        ctx.gate
            .prompt_join(Arc::clone(&ctx.transport), query.chat, query.message, channel)
            .await;
        return Ok(Transition::Gated);
    }

    let status = ctx
        .transport
        .reply_text(query.chat, query.message, format!("{} Searching...", emoji::SEARCH), None)
        .await?;

    let results = match ctx.catalog.search_files(text, ctx.config.search_limit).await {
        Ok(results) => results,
        Err(e) => {
            edit_quietly(ctx, query.chat, status, format!("{} Search failed, try again later.", emoji::ERROR), None).await;
            return Err(e.into());
        }
    };

    tracing::debug!(user = query.user.0, query = %text, hits = results.len(), "Search finished");

    if results.is_empty() {
        edit_quietly(ctx, query.chat, status, format!("{} No results found!", emoji::ERROR), None).await;
        schedule_delete(Arc::clone(&ctx.transport), query.chat, status, NO_RESULTS_TTL);
        return Ok(Transition::NoResults);
    }

    let rendered = search_results(ctx, query.user.0, text, results);
    edit_quietly(ctx, query.chat, status, rendered.text, rendered.keyboard).await;
    Ok(Transition::To(rendered.screen))
}

/// A pressed inline button
pub async fn handle_callback(ctx: &BotContext, input: CallbackInput) -> BotResult<Transition> {
    let data = input
        .data
        .as_deref()
        .filter(|data| data.len() <= MAX_CALLBACK_DATA_LEN)
        .and_then(CallbackData::parse);

    match data {
        Some(CallbackData::Session(token)) => handle_session(ctx, &input, &token).await,
        Some(CallbackData::Menu(action)) => handle_menu(ctx, &input, action).await,
        Some(CallbackData::Noop) => {
            answer(ctx, &input.id, None, false).await;
            Ok(Transition::Ignored)
        }
        None => {
            tracing::debug!(user = input.user.0, data = ?input.data, "Ignoring unknown callback data");
            answer(ctx, &input.id, None, false).await;
            Ok(Transition::Ignored)
        }
    }
}

async fn handle_session(ctx: &BotContext, input: &CallbackInput, token: &str) -> BotResult<Transition> {
    let owner = input.user.0;
    let Some(payload) = ctx.sessions.retrieve(token, owner) else {
        answer(ctx, &input.id, Some(format!("{} Session expired! Search again.", emoji::EXPIRED)), true).await;
        return Ok(Transition::Expired);
    };

    tracing::debug!(user = owner, kind = payload.kind(), "Resolved session token");

    let rendered = match payload {
        SessionPayload::File(selection) => return deliver_file(ctx, input, selection).await,
        SessionPayload::Season(group) => season_results(ctx, owner, &group),
        SessionPayload::Page(view) => paged_list(ctx, owner, &view),
    };

    show(ctx, input, rendered).await
}

async fn deliver_file(ctx: &BotContext, input: &CallbackInput, selection: FileSelection) -> BotResult<Transition> {
    let Ok(private_chat) = i64::try_from(input.user.0).map(ChatId) else {
        answer(ctx, &input.id, Some(format!("{} Failed to send!", emoji::ERROR)), true).await;
        return Ok(Transition::To(Screen::FileDelivery));
    };

    let delivered = ctx
        .transport
        .copy_message(
            private_chat,
            ChatId(selection.source_chat_id),
            MessageId(selection.source_message_id),
        )
        .await;

    match delivered {
        Ok(_) => {
            tracing::info!(user = input.user.0, file = %selection.file_ref, "File delivered");
            answer(ctx, &input.id, Some(format!("{} File sent to PM!", emoji::SUCCESS)), true).await;
        }
        Err(e) => {
            tracing::warn!(user = input.user.0, file = %selection.file_ref, "File delivery failed: {}", e);
            answer(
                ctx,
                &input.id,
                Some(format!("{} Failed to send! Start me in private first.", emoji::ERROR)),
                true,
            )
            .await;
        }
    }

    if let Some((chat, message)) = input.origin {
        schedule_delete(Arc::clone(&ctx.transport), chat, message, FILE_MESSAGE_TTL);
    }

    Ok(Transition::To(Screen::FileDelivery))
}

async fn handle_menu(ctx: &BotContext, input: &CallbackInput, action: MenuAction) -> BotResult<Transition> {
    let rendered = match action {
        MenuAction::Help => Rendered {
            text: HELP_TEXT.to_string(),
            keyboard: Some(keyboards::back_keyboard()),
            screen: Screen::Menu,
        },
        MenuAction::Clone => Rendered {
            text: CLONE_TEXT.to_string(),
            keyboard: Some(keyboards::back_keyboard()),
            screen: Screen::Menu,
        },
        MenuAction::Back => Rendered {
            text: format!("{}! What would you like to do?", current_greeting()),
            keyboard: Some(keyboards::start_menu_keyboard(
                &ctx.config.bot_username,
                ctx.is_admin(input.user),
            )),
            screen: Screen::Menu,
        },
        MenuAction::Admin if !ctx.is_admin(input.user) => {
            tracing::warn!(user = input.user.0, "Refused admin panel to non-admin");
            answer(ctx, &input.id, Some(format!("{} Admins only!", emoji::DENIED)), true).await;
            return Ok(Transition::Refused);
        }
        MenuAction::Admin => Rendered {
            text: admin::stats_text(ctx).await?,
            keyboard: Some(keyboards::admin_panel_keyboard()),
            screen: Screen::AdminPanel,
        },
    };

    show(ctx, input, rendered).await
}

/// Replace the button's message with `rendered` and acknowledge the press
async fn show(ctx: &BotContext, input: &CallbackInput, rendered: Rendered) -> BotResult<Transition> {
    if let Some((chat, message)) = input.origin {
        edit_quietly(ctx, chat, message, rendered.text, rendered.keyboard).await;
    }
    answer(ctx, &input.id, None, false).await;
    Ok(Transition::To(rendered.screen))
}

/// First screen for a fresh result list
fn search_results(ctx: &BotContext, owner: u64, query: &str, results: Vec<FileRecord>) -> Rendered {
    let groups = facets::group(&results);
    let all = PageView::first(query, Arc::new(results));

    match groups.season_count() {
        0 => paged_list(ctx, owner, &all),
        1 => {
            let single = groups
                .seasons()
                .next()
                .map(|(season, files)| (format!("{} {}", query, season), files.to_vec()));
            match single {
                Some((title, files)) => {
                    quality_select(ctx, owner, &title, &files, &all).unwrap_or_else(|| paged_list(ctx, owner, &all))
                }
                None => paged_list(ctx, owner, &all),
            }
        }
        _ => season_select(ctx, owner, query, &groups, &all),
    }
}

fn season_select(ctx: &BotContext, owner: u64, query: &str, groups: &SeasonGroups, all: &PageView) -> Rendered {
    let mut choices: Vec<(String, String)> = groups
        .seasons()
        .take(MAX_SEASON_BUTTONS)
        .map(|(season, files)| {
            let token = ctx.sessions.store(
                owner,
                SessionPayload::Season(SeasonGroup {
                    query: query.to_string(),
                    season: SeasonKey::Season(season.to_string()),
                    files: Arc::new(files.to_vec()),
                }),
            );
            (format!("{} {} ({} files)", emoji::SEASON, season, files.len()), token)
        })
        .collect();

    let unsorted = groups.unsorted();
    if !unsorted.is_empty() {
        let token = ctx.sessions.store(
            owner,
            SessionPayload::Season(SeasonGroup {
                query: query.to_string(),
                season: SeasonKey::Unsorted,
                files: Arc::new(unsorted.to_vec()),
            }),
        );
        choices.push((format!("{} Other files ({})", emoji::FOLDER, unsorted.len()), token));
    }

    choices.push(all_results_choice(ctx, owner, all));

    Rendered {
        text: format!(
            "{} Found {} results for \"{}\"\nSelect a season:",
            emoji::SEARCH,
            all.files.len(),
            query
        ),
        keyboard: Some(keyboards::choice_keyboard(&choices)),
        screen: Screen::SeasonSelect,
    }
}

/// Quality menu over `subset`, `None` when it holds fewer than two qualities
fn quality_select(
    ctx: &BotContext,
    owner: u64,
    title: &str,
    subset: &[FileRecord],
    all: &PageView,
) -> Option<Rendered> {
    let qualities = facets::distinct_qualities(subset);
    if qualities.len() < 2 {
        return None;
    }

    let mut choices: Vec<(String, String)> = qualities
        .iter()
        .take(MAX_QUALITY_BUTTONS)
        .map(|quality| {
            let files = facets::with_quality(subset, quality);
            let label = format!("{} {} ({} files)", emoji::QUALITY, quality, files.len());
            let view = PageView::first(format!("{} {}", title, quality), Arc::new(files));
            (label, ctx.sessions.store(owner, SessionPayload::Page(view)))
        })
        .collect();
    choices.push(all_results_choice(ctx, owner, all));

    Some(Rendered {
        text: format!("{} {}\nSelect a quality:", emoji::QUALITY, title),
        keyboard: Some(keyboards::choice_keyboard(&choices)),
        screen: Screen::QualitySelect,
    })
}

fn all_results_choice(ctx: &BotContext, owner: u64, all: &PageView) -> (String, String) {
    let token = ctx.sessions.store(owner, SessionPayload::Page(all.with_page(0)));
    (format!("{} All results ({})", emoji::PAGE, all.files.len()), token)
}

fn season_results(ctx: &BotContext, owner: u64, group: &SeasonGroup) -> Rendered {
    let title = format!("{} {}", group.query, group.season.label());
    let all = PageView::first(title.clone(), Arc::clone(&group.files));
    quality_select(ctx, owner, &title, &group.files, &all).unwrap_or_else(|| paged_list(ctx, owner, &all))
}

fn paged_list(ctx: &BotContext, owner: u64, view: &PageView) -> Rendered {
    let page = render_page(&ctx.sessions, owner, view, ctx.config.page_size);
    if page.is_exhausted() {
        return Rendered {
            text: "No more files!".to_string(),
            keyboard: None,
            screen: Screen::NoMoreItems,
        };
    }

    Rendered {
        text: format!(
            "{} {}\n{} Page {}/{} · {} files",
            emoji::SEARCH,
            page.query,
            emoji::PAGE,
            page.page + 1,
            page.total_pages,
            page.total_items
        ),
        keyboard: Some(keyboards::page_keyboard(&page)),
        screen: Screen::PagedList,
    }
}

async fn edit_quietly(
    ctx: &BotContext,
    chat: ChatId,
    message: MessageId,
    text: String,
    keyboard: Option<InlineKeyboardMarkup>,
) {
    if let Err(e) = ctx.transport.edit_text(chat, message, text, keyboard).await {
        tracing::debug!(chat = chat.0, message = message.0, "Edit failed: {}", e);
    }
}

async fn answer(ctx: &BotContext, callback_id: &str, text: Option<String>, alert: bool) {
    if let Err(e) = ctx.transport.answer_callback(callback_id, text, alert).await {
        tracing::debug!(callback = callback_id, "Callback answer failed: {}", e);
    }
}
