use std::sync::Arc;

use teloxide::{
    dispatching::{UpdateFilterExt, UpdateHandler},
    prelude::*,
    utils::command::BotCommands,
    RequestError,
};

use crate::db::repository::MedicationRequestRepository;
use crate::services::MedicationRequestService;

pub mod request;

#[derive(BotCommands, Debug, Clone, PartialEq)]
#[command(rename_rule = "lowercase", description = "Available commands:")]
pub enum Command {
    #[command(description = "Start interacting with the pharmacy bot.")]
    Start,
    #[command(description = "Display help information about available commands.")]
    Help,
    #[command(description = "Process a medication request, e.g. /process 3")]
    Process(i32),
    #[command(description = "Show a medication request, e.g. /request 3")]
    Request(i32),
}

/// Message handler tree for the bot. Expects a [`MedicationRequestService`]
/// and an `Arc<dyn MedicationRequestRepository>` among the dispatcher
/// dependencies.
pub fn schema() -> UpdateHandler<RequestError> {
    Update::filter_message()
        .branch(dptree::entry().filter_command::<Command>().endpoint(answer))
        .branch(dptree::endpoint(unknown_command))
}

async fn answer(
    bot: Bot,
    msg: Message,
    cmd: Command,
    service: MedicationRequestService,
    repository: Arc<dyn MedicationRequestRepository>,
) -> ResponseResult<()> {
    match cmd {
        Command::Start => {
            log::info!("Received start command");
            bot.send_message(
                msg.chat.id,
                "Welcome to the pharmacy bot! Send /help to see what I can do.",
            )
            .await?;
        }
        Command::Help => {
            log::info!("Received help command");
            bot.send_message(msg.chat.id, Command::descriptions().to_string())
                .await?;
        }
        Command::Process(id) => {
            log::info!("Received process command for request {}", id);
            request::process_request(bot, msg, service, id).await?;
        }
        Command::Request(id) => {
            log::info!("Received request command for request {}", id);
            request::show_request(bot, msg, repository, id).await?;
        }
    }

    Ok(())
}

async fn unknown_command(bot: Bot, msg: Message) -> ResponseResult<()> {
    bot.send_message(
        msg.chat.id,
        "I didn't understand that. Send /help for the list of commands.",
    )
    .await?;
    Ok(())
}
