mod chatbot;
mod config;

use std::sync::Arc;

use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::prelude::*;

use chatbot::{DailyScheduler, Picker, Responder, SendText, TelegramClient};
use config::Config;

struct BotState {
    config: Config,
    responder: Responder,
    scheduler: DailyScheduler,
}

#[derive(BotCommands, Clone)]
#[command(rename_rule = "lowercase", description = "These commands are supported:")]
enum Command {
    #[command(description = "start chatting with the bot")]
    Start,
    #[command(description = "how to use the bot")]
    Help,
    #[command(description = "receive a motivational quote in this chat every day")]
    DailyQuote,
}

#[tokio::main]
async fn main() {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "quipbot.json".to_string());
    let config = match Config::load(&config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("quipbot: {e}");
            std::process::exit(1);
        }
    };

    let bot = Bot::new(&config.telegram_bot_token);

    // Setup logging
    let log_dir = config.data_dir.join("logs");
    std::fs::create_dir_all(&log_dir).ok();
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_dir.join("quipbot.log"))
        .expect("Failed to open log file");
    let (non_blocking, _guard) = tracing_appender::non_blocking(log_file);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stdout)
                .with_filter(
                    tracing_subscriber::EnvFilter::from_default_env()
                        .add_directive(tracing::Level::INFO.into()),
                ),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_filter(
                    tracing_subscriber::EnvFilter::from_default_env()
                        .add_directive(tracing::Level::INFO.into()),
                ),
        )
        .init();

    info!("🤖 Starting quipbot...");
    info!("Loaded config from {config_path}");
    info!(
        "Daily quotes at {} ({}), {} quote(s) in catalog",
        config.daily_quote_time,
        config.timezone,
        config.quotes.len()
    );

    let picker = Arc::new(Picker::from_entropy());
    let responder = Responder::new(config.persona.clone(), picker.clone());

    let (out_tx, out_rx) = mpsc::channel::<SendText>(64);
    let scheduler = DailyScheduler::new(config.quotes.clone(), picker, config.timezone, out_tx);
    scheduler.start();
    chatbot::spawn_sender(Arc::new(TelegramClient::new(bot.clone())), out_rx);

    if let Err(e) = bot.set_my_commands(Command::bot_commands()).await {
        warn!("Failed to register command list: {e}");
    }

    let state = Arc::new(BotState {
        config,
        responder,
        scheduler,
    });

    let handler = dptree::entry()
        .branch(
            Update::filter_message()
                .filter_command::<Command>()
                .endpoint(handle_command),
        )
        .branch(Update::filter_message().endpoint(handle_message));

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![state])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;
}

async fn handle_command(
    bot: Bot,
    msg: Message,
    cmd: Command,
    state: Arc<BotState>,
) -> ResponseResult<()> {
    let persona = &state.config.persona;
    let reply = match cmd {
        Command::Start => format!("Hello! Thanks for chatting with me! I'm {}!", persona.name),
        Command::Help => format!(
            "I'm {}! Please type something so I can respond!\n\n{}",
            persona.name,
            Command::descriptions()
        ),
        Command::DailyQuote => {
            let sub = state
                .scheduler
                .subscribe(msg.chat.id.0, state.config.daily_quote_time);
            info!(
                "💬 /dailyquote from chat {} ({} subscription(s) registered)",
                msg.chat.id,
                state.scheduler.pending()
            );
            format!(
                "You're in! I'll send a motivational quote here every day at {} ({}).",
                sub.fire_time.format("%H:%M"),
                state.config.timezone
            )
        }
    };

    bot.send_message(msg.chat.id, reply).await?;
    Ok(())
}

async fn handle_message(bot: Bot, msg: Message, state: Arc<BotState>) -> ResponseResult<()> {
    let user = match msg.from {
        Some(ref u) => u,
        None => return Ok(()),
    };

    let Some(text) = msg.text() else {
        return Ok(());
    };

    let username = user.username.as_deref().unwrap_or(&user.first_name);
    let preview: String = text.chars().take(100).collect();
    info!("📨 {} ({}): \"{}\"", username, user.id, preview);

    let reply = state.responder.respond(text);
    info!("Bot: {reply}");

    bot.send_message(msg.chat.id, reply).await?;
    Ok(())
}
