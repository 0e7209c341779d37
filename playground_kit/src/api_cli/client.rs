use clap::ArgMatches;
use colored::Colorize;
use serde_json::Value;

use crate::api_cli::cli::command_name;
use crate::api_cli::error::{Error, Result};
use playground_core::{
    AbstractRequest, DispatchError, Dispatcher, OperationKind, Outcome, Payload,
    ServiceDescriptor,
};

pub fn find_service<'a>(
    services: &'a [ServiceDescriptor],
    command: &str,
) -> Option<&'a ServiceDescriptor> {
    services.iter().find(|s| command_name(s) == command)
}

/// Turns the matches of a `<service> <method>` command into a request.
pub fn build_request(
    service: &ServiceDescriptor,
    operation: OperationKind,
    matches: &ArgMatches,
) -> Result<AbstractRequest> {
    let mut request = AbstractRequest::new(operation, service.path.clone());
    if let Some(id) = matches.try_get_one::<String>("id").ok().flatten() {
        request = request.with_id(id.as_str());
    }
    if let Some(data) = matches.try_get_one::<String>("data").ok().flatten() {
        request = request.with_data(Payload::parse_lenient(data));
    }
    if let Some(pairs) = matches.try_get_many::<String>("query").ok().flatten() {
        for pair in pairs {
            let (key, value) = pair.split_once('=').ok_or_else(|| {
                Error::InvalidArgument(format!("--query expects KEY=VALUE, got `{pair}`"))
            })?;
            let value = serde_json::from_str::<Value>(value)
                .unwrap_or_else(|_| Value::String(value.to_string()));
            request = request.with_query(key, value);
        }
    }
    if let Some(headers) = matches.try_get_many::<String>("header").ok().flatten() {
        for header in headers {
            let (name, value) = header.split_once(':').ok_or_else(|| {
                Error::InvalidArgument(format!("--header expects NAME:VALUE, got `{header}`"))
            })?;
            request = request.with_header(name.trim(), value.trim());
        }
    }
    Ok(request)
}

pub async fn execute_request(
    dispatcher: &Dispatcher,
    services: &[ServiceDescriptor],
    subcommand_name: &str,
    matches: &ArgMatches,
) -> Result<()> {
    let service = find_service(services, subcommand_name)
        .ok_or_else(|| Error::UnknownService(subcommand_name.to_string()))?;
    let (method_name, method_matches) = matches
        .subcommand()
        .ok_or_else(|| Error::InvalidArgument(format!("no method given for `{subcommand_name}`")))?;
    let operation: OperationKind = method_name
        .parse()
        .map_err(|_| Error::InvalidArgument(format!("unknown method `{method_name}`")))?;

    let request = build_request(service, operation, method_matches)?;
    println!("{}", request_line(dispatcher, &request)?);
    print_outcome(&dispatcher.outcome(&request).await)
}

/// `--> GET http://host/messages/7?text=hi`, exactly as it will be sent.
pub fn request_line(dispatcher: &Dispatcher, request: &AbstractRequest) -> Result<String> {
    let prepared = dispatcher
        .prepare(request)
        .map_err(DispatchError::InvalidRequest)?;
    Ok(format!("--> {} {}", prepared.method, prepared.url))
}

pub fn print_outcome(outcome: &Outcome) -> Result<()> {
    match outcome {
        Outcome::Success(response) => {
            let status = format!("<-- {} {}", response.status, response.status_text);
            println!("{}", status.green());
            println!("{}", serde_json::to_string_pretty(&response.data)?);
        }
        Outcome::HttpFailure(response, error) => {
            let status = format!("<-- {} {}", response.status, response.status_text);
            println!("{}", status.red());
            println!("{} {}", "error:".red().bold(), error.message);
            if !response.data.is_null() {
                println!("{}", serde_json::to_string_pretty(&response.data)?);
            }
        }
        Outcome::NetworkFailure(error) => {
            println!("{} {}", "network error:".red().bold(), error.message);
        }
    }
    Ok(())
}

pub fn print_services(services: &[ServiceDescriptor]) {
    if services.is_empty() {
        println!("{}", "No services registered.".yellow());
        return;
    }
    for service in services {
        let methods: Vec<&str> = service.methods.iter().map(|op| op.as_str()).collect();
        println!(
            "{:<24} {:<20} {}",
            command_name(service).bold(),
            service.path,
            methods.join(", ").cyan()
        );
        if let Some(description) = &service.description {
            println!("    {}", description.dimmed());
        }
    }
}

pub fn describe(service: &ServiceDescriptor) -> Result<()> {
    println!("{} {}", service.name.bold(), service.path);
    if let Some(description) = &service.description {
        println!("{description}");
    }
    for op in &service.methods {
        let id = if op.addresses_resource() { "/{id}" } else { "" };
        println!("  {:<7} {:<6} {}{}", op.as_str().cyan(), op.http_method(), service.path, id);
    }
    match &service.schema {
        Some(schema) => println!("{}", serde_json::to_string_pretty(schema)?),
        None => println!("{}", "No schema exposed.".dimmed()),
    }
    Ok(())
}
