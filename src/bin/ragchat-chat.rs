//! Interactive terminal client for the CV question-answering backend.
//!
//! # Usage
//!
//! ```bash
//! # Talk to a backend on the default local address
//! ragchat-chat
//!
//! # Point at another backend and ask for Turkish answers
//! ragchat-chat --base-url http://qa.example.com:8000 --locale tr
//!
//! # Disable colors (useful for piping output)
//! ragchat-chat --no-color
//! ```
//!
//! # Commands
//!
//! While chatting, you can use slash commands:
//! - `/history` - List recent questions
//! - `/load <n>` - Replace the conversation with history entry n
//! - `/locale [tr|en]` - Set or toggle the answer language
//! - `/quit` - Exit the application
//!
//! Pressing Ctrl+C while an answer is pending ends the session.

use std::sync::Arc;

use arrrg::CommandLine;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tokio::sync::broadcast::error::RecvError;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use ragchat::chat::{
    ChatArgs, ChatCommand, ChatConfig, ConversationController, Interrupt, PlainTextRenderer,
    Renderer, TranscriptView, help_text, parse_command,
};
use ragchat::{ChatRequest, ChatResponse, ClientLogger, HistoryRecord};

/// Mirrors every backend exchange into the debug log.
struct TracingLogger;

impl ClientLogger for TracingLogger {
    fn log_history(&self, records: &[HistoryRecord]) {
        tracing::debug!(count = records.len(), "history response");
    }

    fn log_chat(&self, request: &ChatRequest, response: &ChatResponse) {
        tracing::debug!(
            question = %request.message,
            answer_chars = response.answer.chars().count(),
            "chat response"
        );
    }
}

fn init_logging(config: &ChatConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(config.log_filter()));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr),
        )
        .init();
}

/// Main entry point for the ragchat-chat application.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let (args, _) = ChatArgs::from_command_line_relaxed("ragchat-chat [OPTIONS]");
    let config = ChatConfig::try_from(args)?;
    init_logging(&config);

    let mut client = config.build_client()?;
    if config.debug {
        client = client.with_logger(Arc::new(TracingLogger));
    }
    let base_url = client.base_url().to_string();

    let controller = ConversationController::new(client, config.locale);
    let session = Arc::clone(controller.session());
    let mut events = session.subscribe();
    let mut renderer = PlainTextRenderer::with_color(config.use_color);
    let mut view = TranscriptView::new();
    let mut rl = DefaultEditor::new()?;

    // Ctrl+C outside the line editor ends the session
    let interrupt = Arc::new(Interrupt::new());
    let interrupt_clone = Arc::clone(&interrupt);
    ctrlc::set_handler(move || {
        interrupt_clone.trigger();
    })?;

    println!("RAG Chatbot ({base_url})");
    println!("Type /help for commands, /quit to exit\n");

    controller.mount().await;
    view.drain(&mut events, &session, &mut renderer);
    view.sync(&session.transcript(), &mut renderer);

    loop {
        // Only Ctrl+C pressed after this prompt may end the session
        interrupt.clear();

        let prompt = format!("{} ", controller.placeholder());
        let readline = rl.readline(&prompt);

        match readline {
            Ok(line) => {
                if !line.trim().is_empty() {
                    let _ = rl.add_history_entry(line.trim());
                }

                if let Some(cmd) = parse_command(&line) {
                    match cmd {
                        ChatCommand::Quit => break,
                        ChatCommand::Help => {
                            for line in help_text().lines() {
                                println!("    {}", line);
                            }
                        }
                        ChatCommand::History => {
                            renderer.print_history(&session.history());
                        }
                        ChatCommand::Load(number) => {
                            if controller.load_history_item_at(number - 1).is_none() {
                                renderer.print_error(&format!(
                                    "No history entry {number}; /history lists the entries."
                                ));
                            }
                        }
                        ChatCommand::Locale(locale) => {
                            controller.set_locale(locale);
                        }
                        ChatCommand::ToggleLocale => {
                            controller.set_locale(controller.locale().toggled());
                        }
                        ChatCommand::Refresh => {
                            controller.refresh_history().await;
                            renderer.print_info(&format!(
                                "{} history entries.",
                                session.history().len()
                            ));
                        }
                        ChatCommand::Transcript => {
                            view.redraw(&session.transcript(), &mut renderer);
                        }
                        ChatCommand::Invalid(message) => {
                            renderer.print_error(&message);
                        }
                    }
                    view.drain(&mut events, &session, &mut renderer);
                    continue;
                }

                // Regular message: submit and follow the session until it settles
                let mut task = {
                    let controller = controller.clone();
                    tokio::spawn(async move { controller.submit(&line).await })
                };
                let torn_down = loop {
                    tokio::select! {
                        event = events.recv() => match event {
                            Ok(event) => view.handle(&event, &session, &mut renderer),
                            Err(RecvError::Lagged(skipped)) => {
                                view.lagged(skipped, &session, &mut renderer);
                            }
                            Err(RecvError::Closed) => {}
                        },
                        outcome = &mut task => {
                            match outcome {
                                Ok(outcome) => tracing::debug!(?outcome, "submission settled"),
                                Err(err) => renderer.print_error(&format!("submission failed: {err}")),
                            }
                            break false;
                        }
                        _ = interrupt.triggered() => {
                            controller.teardown();
                            println!("\n[interrupted]");
                            break true;
                        }
                    }
                };
                view.drain(&mut events, &session, &mut renderer);
                if torn_down {
                    return Ok(());
                }
            }
            Err(ReadlineError::Interrupted) => {
                // Ctrl+C at prompt - soft interrupt
                println!();
                continue;
            }
            Err(ReadlineError::Eof) => {
                // Ctrl+D - exit
                println!();
                break;
            }
            Err(err) => {
                renderer.print_error(&format!("Input error: {}", err));
                break;
            }
        }
    }

    controller.teardown();
    println!("Goodbye!");
    Ok(())
}
