use std::collections::HashSet;

use clap::{Arg, Command};
use reedline::{Completer, Span, Suggestion};

/// Completes subcommands, flags and possible values of a clap command tree.
pub struct ClapCompleter {
    command: Command,
}

impl ClapCompleter {
    pub fn new(command: Command) -> Self {
        Self { command }
    }
}

fn suggestion(value: String, description: Option<String>, span: Span, append_whitespace: bool) -> Suggestion {
    Suggestion {
        value,
        description,
        extra: None,
        span,
        append_whitespace,
        ..Suggestion::default()
    }
}

fn find_arg<'a>(command: &'a Command, flag: &str) -> Option<&'a Arg> {
    command.get_arguments().find(|a| {
        a.get_long().is_some_and(|l| format!("--{l}") == flag)
            || a.get_short().is_some_and(|s| format!("-{s}") == flag)
    })
}

fn subcommand_suggestions(command: &Command, word: &str, span: Span) -> Vec<Suggestion> {
    command
        .get_subcommands()
        .filter(|sc| sc.get_name().starts_with(word))
        .map(|sc| {
            suggestion(
                sc.get_name().to_string(),
                sc.get_about().map(|s| s.to_string()),
                span,
                true,
            )
        })
        .collect()
}

fn flag_suggestions(command: &Command, word: &str, used: &HashSet<&str>, span: Span) -> Vec<Suggestion> {
    command
        .get_arguments()
        .filter_map(|arg| arg.get_long().map(|long| (arg, format!("--{long}"))))
        .filter(|(_, flag)| flag.starts_with(word))
        .filter(|(arg, flag)| {
            // Repeatable flags stay available.
            matches!(arg.get_action(), clap::ArgAction::Append) || !used.contains(flag.as_str())
        })
        .map(|(arg, flag)| {
            suggestion(flag, arg.get_help().map(|s| s.to_string()), span, false)
        })
        .collect()
}

fn value_suggestions(arg: &Arg, word: &str, span: Span) -> Vec<Suggestion> {
    arg.get_possible_values()
        .into_iter()
        .filter(|pv| pv.get_name().starts_with(word))
        .map(|pv| {
            suggestion(
                pv.get_name().to_string(),
                pv.get_help().map(|s| s.to_string()),
                span,
                true,
            )
        })
        .collect()
}

impl Completer for ClapCompleter {
    fn complete(&mut self, line: &str, pos: usize) -> Vec<Suggestion> {
        let line_to_cursor = &line[..pos];
        let mut parts: Vec<String> = shlex::split(line_to_cursor)
            .unwrap_or_else(|| line_to_cursor.split_whitespace().map(String::from).collect());
        let word = if line_to_cursor.ends_with(' ') {
            String::new()
        } else {
            parts.pop().unwrap_or_default()
        };
        let span = Span::new(pos - word.len(), pos);

        let mut current = &self.command;
        let mut pending: Option<&Arg> = None;
        let mut positionals = 0;
        for part in &parts {
            if pending.take().is_some() {
                continue;
            }
            if part.starts_with('-') {
                pending = find_arg(current, part).filter(|a| a.get_action().takes_values());
            } else if let Some(sub) = current.find_subcommand(part) {
                current = sub;
                positionals = 0;
            } else {
                positionals += 1;
            }
        }

        let suggestions = if let Some(arg) = pending {
            value_suggestions(arg, &word, span)
        } else if word.starts_with('-') {
            let used: HashSet<&str> = parts.iter().map(String::as_str).collect();
            flag_suggestions(current, &word, &used, span)
        } else if current.has_subcommands() {
            subcommand_suggestions(current, &word, span)
        } else {
            let positional = current
                .get_positionals()
                .nth(positionals);
            match positional {
                Some(arg) => value_suggestions(arg, &word, span),
                None => {
                    let used: HashSet<&str> = parts.iter().map(String::as_str).collect();
                    flag_suggestions(current, &word, &used, span)
                }
            }
        };

        let mut seen = HashSet::new();
        suggestions
            .into_iter()
            .filter(|s| seen.insert(s.value.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api_cli::cli::build_cli_from_services;
    use playground_core::{OperationKind, ServiceDescriptor};

    fn completer() -> ClapCompleter {
        let services = vec![
            ServiceDescriptor {
                name: "messages".into(),
                path: "/messages".into(),
                methods: vec![OperationKind::Find, OperationKind::Get, OperationKind::Create],
                schema: None,
                description: None,
            },
            ServiceDescriptor {
                name: "users".into(),
                path: "/users".into(),
                methods: vec![OperationKind::Find],
                schema: None,
                description: None,
            },
        ];
        ClapCompleter::new(build_cli_from_services(&services))
    }

    fn values(line: &str) -> Vec<String> {
        completer()
            .complete(line, line.len())
            .into_iter()
            .map(|s| s.value)
            .collect()
    }

    #[test]
    fn completes_services_then_methods() {
        assert_eq!(values("me"), ["messages"]);
        assert_eq!(values("messages "), ["find", "get", "create"]);
        assert_eq!(values("messages g"), ["get"]);
    }

    #[test]
    fn completes_flags_of_a_method() {
        let flags = values("messages get --");
        assert!(flags.contains(&"--id".to_string()));
        assert!(flags.contains(&"--query".to_string()));
        assert!(!flags.contains(&"--data".to_string()));

        let flags = values("messages get --id 3 --");
        assert!(!flags.contains(&"--id".to_string()));
        assert!(flags.contains(&"--header".to_string()));
    }

    #[test]
    fn completes_describe_targets() {
        assert_eq!(values("describe u"), ["users"]);
    }

    #[test]
    fn span_covers_the_current_word() {
        let suggestions = completer().complete("messages cr", 11);
        assert_eq!(suggestions[0].span, Span::new(9, 11));
    }
}
