use crate::context::BotContext;
use crate::types::Command;
use crate::{callbacks, commands};
use teloxide::{dispatching::UpdateHandler, prelude::*, utils::command::BotCommands};

/// Register bot commands in Telegram menu
pub async fn set_bot_commands(bot: &Bot) -> Result<(), teloxide::RequestError> {
    bot.set_my_commands(Command::bot_commands()).await?;
    Ok(())
}

fn is_admin_message(msg: Message, ctx: BotContext) -> bool {
    msg.from().is_some_and(|user| ctx.is_admin(user.id))
}

fn is_group(msg: Message) -> bool {
    msg.chat.is_group() || msg.chat.is_supergroup()
}

pub fn schema() -> UpdateHandler<Box<dyn std::error::Error + Send + Sync + 'static>> {
    use dptree::case;

    let admin_commands = dptree::filter(is_admin_message)
        .branch(case![Command::Stats].endpoint(commands::stats))
        .branch(case![Command::Index(arg)].endpoint(commands::index))
        .branch(case![Command::Broadcast].endpoint(commands::broadcast));

    let command_handler = teloxide::filter_command::<Command, _>()
        .branch(
            case![Command::Start]
                .filter(|msg: Message| msg.chat.is_private())
                .endpoint(commands::start),
        )
        .branch(case![Command::Help].endpoint(commands::help))
        .branch(admin_commands);

    let message_handler = Update::filter_message()
        .branch(command_handler)
        .branch(dptree::filter(is_group).endpoint(commands::group_search));

    let channel_handler = Update::filter_channel_post().endpoint(commands::channel_post);

    // Handle callback queries from inline keyboards
    let callback_handler = Update::filter_callback_query().endpoint(callbacks::handle_callback);

    dptree::entry()
        .branch(message_handler)
        .branch(channel_handler)
        .branch(callback_handler)
}
