use std::borrow::Cow;

use colored::Colorize;
use nu_ansi_term::{Color, Style};
use reedline::{
    default_emacs_keybindings, ColumnarMenu, Emacs, KeyCode, KeyModifiers, MenuBuilder, Reedline,
    ReedlineEvent, ReedlineMenu, Signal,
};

use crate::api_cli::cli::{self, BIN_NAME};
use crate::api_cli::client;
use crate::api_cli::completer::ClapCompleter;
use crate::api_cli::error::Result;
use playground_core::{Dispatcher, ServiceDescriptor};

struct ReplPrompt;

impl reedline::Prompt for ReplPrompt {
    fn render_prompt_left(&self) -> Cow<str> {
        Cow::Borrowed("playground")
    }

    fn render_prompt_right(&self) -> Cow<str> {
        Cow::Borrowed("")
    }

    fn render_prompt_indicator(&self, _prompt_mode: reedline::PromptEditMode) -> Cow<str> {
        Cow::Borrowed(">> ")
    }

    fn render_prompt_multiline_indicator(&self) -> Cow<str> {
        Cow::Borrowed("::: ")
    }

    fn render_prompt_history_search_indicator(
        &self,
        _history_search: reedline::PromptHistorySearch,
    ) -> Cow<str> {
        Cow::Borrowed("? ")
    }
}

pub async fn start_repl(dispatcher: &Dispatcher, services: &[ServiceDescriptor]) -> Result<()> {
    let command = cli::build_cli_from_services(services);
    let completer = ClapCompleter::new(command.clone());

    let mut keybindings = default_emacs_keybindings();
    keybindings.add_binding(
        KeyModifiers::NONE,
        KeyCode::Tab,
        ReedlineEvent::UntilFound(vec![
            ReedlineEvent::Menu("completion_menu".to_string()),
            ReedlineEvent::MenuNext,
        ]),
    );

    let completion_menu = Box::new(
        ColumnarMenu::default()
            .with_name("completion_menu")
            .with_text_style(Style::new().fg(Color::White))
            .with_selected_text_style(Style::new().fg(Color::Black).on(Color::Green))
            .with_description_text_style(Style::new().fg(Color::Yellow)),
    );

    let mut line_editor = Reedline::create()
        .with_completer(Box::new(completer))
        .with_menu(ReedlineMenu::EngineCompleter(completion_menu))
        .with_edit_mode(Box::new(Emacs::new(keybindings)));

    println!(
        "Connected to {} ({} services). Type 'help' for a list of commands, or 'exit' to quit.",
        dispatcher.base_url().bold(),
        services.len()
    );

    let prompt = ReplPrompt;
    loop {
        match line_editor.read_line(&prompt)? {
            Signal::Success(buffer) => {
                let line = buffer.trim();
                if line.is_empty() {
                    continue;
                }
                if line == "exit" || line == "quit" {
                    break;
                }
                if line == "help" {
                    let _ = command.clone().print_help();
                    continue;
                }

                let mut args = shlex::split(line).unwrap_or_else(|| vec![line.to_string()]);
                args.insert(0, BIN_NAME.to_string());
                match command.clone().try_get_matches_from(args) {
                    Ok(matches) => {
                        if let Err(e) = run_command(dispatcher, services, &matches).await {
                            eprintln!("{} {}", "Error:".red(), e);
                        }
                    }
                    Err(e) => eprintln!("{e}"),
                }
            }
            _ => break,
        }
    }

    Ok(())
}

/// Runs one parsed command line: `services`, `describe` or a service call.
pub async fn run_command(
    dispatcher: &Dispatcher,
    services: &[ServiceDescriptor],
    matches: &clap::ArgMatches,
) -> Result<()> {
    match matches.subcommand() {
        Some(("services", _)) => {
            client::print_services(services);
            Ok(())
        }
        Some(("describe", args)) => {
            let name = args
                .get_one::<String>("service")
                .map(String::as_str)
                .unwrap_or_default();
            let service = client::find_service(services, name)
                .ok_or_else(|| crate::api_cli::error::Error::UnknownService(name.to_string()))?;
            client::describe(service)
        }
        Some((name, args)) => client::execute_request(dispatcher, services, name, args).await,
        None => Ok(()),
    }
}
