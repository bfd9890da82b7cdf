//! Interactive command-line shell for the BalMitra chatbot.

use std::sync::Arc;

use clap::Parser;
use colored::Colorize;
use futures::StreamExt;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use spinners::{Spinner, Spinners};

use balmitra::backends::{google_translate::GoogleTranslate, groq::Groq};
use balmitra::chat::{serialize_messages, ChatMessage, ChatProvider};
use balmitra::error::ChatbotError;
use balmitra::language::{self, SupportedLanguage};
use balmitra::secret_store::SecretStore;
use balmitra::session::{ChatSession, TurnRequest, SYSTEM_PERSONA};
use balmitra::translate::Translator;

#[derive(Parser)]
#[command(name = "balmitra", version, about = "A multilingual support chatbot for children")]
struct Cli {
    /// Chat in a fixed language (english, hindi, marathi, urdu) instead of
    /// detecting it per message
    #[arg(short, long)]
    language: Option<String>,

    /// Number of recent exchanges the chatbot remembers
    #[arg(short = 'k', long, default_value_t = balmitra::memory::DEFAULT_WINDOW)]
    window: usize,

    /// Groq model identifier
    #[arg(short, long)]
    model: Option<String>,

    /// Request timeout in seconds for the external services
    #[arg(long)]
    timeout: Option<u64>,

    /// Always wait for the full reply instead of streaming English ones
    #[arg(long)]
    no_stream: bool,

    /// Serve the web UI on this address (e.g. 0.0.0.0:8080) instead of
    /// running the interactive loop
    #[cfg(feature = "api")]
    #[arg(long, value_name = "ADDR")]
    serve: Option<String>,
}

fn fatal(message: &str) -> ! {
    eprintln!("{} {message}", "error:".red().bold());
    std::process::exit(1);
}

#[tokio::main]
async fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let language_override = match &cli.language {
        Some(raw) => match SupportedLanguage::parse(raw) {
            Some(language) => Some(language),
            None => fatal(&format!(
                "unknown language {raw:?}; supported: english, hindi, marathi, urdu"
            )),
        },
        None => None,
    };

    let secrets = SecretStore::new();
    let Some(api_key) = secrets.get("GROQ_API_KEY") else {
        fatal("GROQ_API_KEY not found; set it in the environment or in ~/.balmitra/secrets.yaml");
    };

    let provider: Arc<Groq> = Arc::new(Groq::new(
        api_key,
        cli.model.clone(),
        Some(SYSTEM_PERSONA.to_string()),
        None,
        None,
        cli.timeout,
    ));
    let translator = Translator::new(Arc::new(GoogleTranslate::new(cli.timeout)));

    #[cfg(feature = "api")]
    if let Some(addr) = &cli.serve {
        let state = balmitra::api::AppState::new(provider, translator, cli.window);
        if let Err(e) = balmitra::api::serve(addr, state).await {
            fatal(&e.to_string());
        }
        return;
    }

    if let Err(e) = run_repl(cli, language_override, provider, translator).await {
        fatal(&e.to_string());
    }
}

fn print_banner(language_override: Option<SupportedLanguage>) {
    println!("{}", "BalMitra".cyan().bold());
    match language_override {
        Some(language) => println!("{}", language::greeting(language)),
        None => {
            // No fixed language: greet in all four.
            for language in SupportedLanguage::ALL {
                println!("{}", language::greeting(language));
            }
        }
    }
    println!(
        "{}",
        "Commands: /language <tag>, /clear, /copy, /save [file], /quit".dimmed()
    );
    println!();
}

async fn run_repl(
    cli: Cli,
    mut language_override: Option<SupportedLanguage>,
    provider: Arc<Groq>,
    translator: Translator,
) -> Result<(), ChatbotError> {
    print_banner(language_override);

    let mut session =
        ChatSession::new(provider.clone(), translator.clone()).with_window(cli.window);
    let mut editor = DefaultEditor::new()
        .map_err(|e| ChatbotError::Generic(format!("failed to start line editor: {e}")))?;

    loop {
        let line = match editor.readline(&format!("{} ", "You:".green().bold())) {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => return Err(ChatbotError::Generic(format!("input error: {e}"))),
        };

        let line = line.trim().to_string();
        if line.is_empty() {
            continue;
        }
        let _ = editor.add_history_entry(&line);

        if let Some(command) = line.strip_prefix('/') {
            if handle_command(command, &mut session, &mut language_override) {
                break;
            }
            continue;
        }

        let resolved =
            language::resolve(language_override, Some(&line), translator.provider()).await;

        let streamed = resolved == SupportedLanguage::English && !cli.no_stream;
        let outcome = if streamed {
            stream_turn(&mut session, provider.as_ref(), line).await
        } else {
            let mut spinner = Spinner::new(Spinners::Dots, "Thinking...".into());
            let result = session
                .process_turn(TurnRequest::new(line).with_language(resolved))
                .await;
            spinner.stop_with_message(String::new());
            result.map(|r| Some(r.display_text))
        };

        match outcome {
            Ok(Some(reply)) => {
                println!("{} {reply}", "BalMitra:".cyan().bold());
                println!();
            }
            // Streaming already printed the reply token by token.
            Ok(None) => println!(),
            Err(e) => {
                eprintln!("{} {e}", "BalMitra could not answer:".red().bold());
                println!();
            }
        }
    }

    println!("{}", "Bye! Take care.".cyan());
    Ok(())
}

/// Streams an English turn token by token, then records the exchange.
///
/// Only English replies can stream: a translated reply does not exist until
/// the full English text is available.
async fn stream_turn(
    session: &mut ChatSession,
    provider: &Groq,
    line: String,
) -> Result<Option<String>, ChatbotError> {
    use std::io::Write;

    let mut messages = session.memory().as_prompt_messages();
    messages.push(ChatMessage::user().content(&line).build());

    let mut stream = provider.chat_stream(&messages).await?;

    print!("{} ", "BalMitra:".cyan().bold());
    let mut reply = String::new();
    while let Some(token) = stream.next().await {
        let token = token?;
        print!("{token}");
        let _ = std::io::stdout().flush();
        reply.push_str(&token);
    }
    println!();

    if reply.is_empty() {
        return Err(ChatbotError::ProviderError(
            "empty response from model".to_string(),
        ));
    }

    session.record_english_exchange(line, reply);
    Ok(None)
}

/// Handles a slash command. Returns true when the loop should exit.
fn handle_command(
    command: &str,
    session: &mut ChatSession,
    language_override: &mut Option<SupportedLanguage>,
) -> bool {
    let mut parts = command.splitn(2, char::is_whitespace);
    let name = parts.next().unwrap_or_default();
    let arg = parts.next().map(str::trim).unwrap_or_default();

    match name {
        "quit" | "exit" => return true,
        "clear" => {
            session.reset();
            println!("{}", "Conversation cleared.".dimmed());
        }
        "language" => match SupportedLanguage::parse(arg) {
            Some(language) => {
                *language_override = Some(language);
                session.set_language(language);
                println!(
                    "{}",
                    format!("Language set to {}. Conversation cleared.", language.name()).dimmed()
                );
                println!("{}", language::greeting(language));
            }
            None => eprintln!(
                "{} /language expects one of: english, hindi, marathi, urdu",
                "error:".red().bold()
            ),
        },
        "copy" => match session.memory().exchanges().last() {
            Some(exchange) => match arboard::Clipboard::new()
                .and_then(|mut cb| cb.set_text(exchange.assistant_text.clone()))
            {
                Ok(()) => println!("{}", "Last reply copied to clipboard.".dimmed()),
                Err(e) => eprintln!("{} clipboard unavailable: {e}", "error:".red().bold()),
            },
            None => eprintln!("{} nothing to copy yet", "error:".red().bold()),
        },
        "save" => {
            let path = if arg.is_empty() {
                chrono::Local::now()
                    .format("balmitra-%Y%m%d-%H%M%S.json")
                    .to_string()
            } else {
                arg.to_string()
            };
            match save_transcript(session, &path) {
                Ok(()) => println!("{}", format!("Transcript saved to {path}.").dimmed()),
                Err(e) => eprintln!("{} could not save transcript: {e}", "error:".red().bold()),
            }
        }
        _ => eprintln!("{} unknown command /{name}", "error:".red().bold()),
    }
    false
}

fn save_transcript(session: &ChatSession, path: &str) -> Result<(), ChatbotError> {
    let json = serialize_messages(&session.memory().as_display_messages())?;
    std::fs::write(path, json).map_err(|e| ChatbotError::Generic(e.to_string()))
}
