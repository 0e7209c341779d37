use clap::{Arg, ArgAction, Command};

use playground_core::{OperationKind, ServiceDescriptor};

pub const BIN_NAME: &str = "playground-cli";

/// Subcommand name of a service: its name with `/` replaced by `.`.
pub fn command_name(service: &ServiceDescriptor) -> String {
    service.name.replace('/', ".")
}

/// Builds `<service> <method> [--id] [--query k=v]... [--data json] [--header k:v]...`
/// from the discovered services, plus the `services` and `describe` commands.
pub fn build_cli_from_services(services: &[ServiceDescriptor]) -> Command {
    let names: Vec<String> = services.iter().map(command_name).collect();
    let app = Command::new(BIN_NAME)
        .bin_name(BIN_NAME)
        .version(env!("CARGO_PKG_VERSION"))
        .about("Calls the services of a playground server. Run `services` to list them.")
        .arg_required_else_help(true)
        .subcommand(Command::new("services").about("List the discovered services"))
        .subcommand(
            Command::new("describe")
                .about("Show the methods and schema of a service")
                .arg(
                    Arg::new("service")
                        .required(true)
                        .value_parser(clap::builder::PossibleValuesParser::new(names)),
                ),
        );

    services
        .iter()
        .filter(|service| !matches!(service.name.as_str(), "services" | "describe"))
        .fold(app, |acc, service| acc.subcommand(service_command(service)))
}

fn service_command(service: &ServiceDescriptor) -> Command {
    let about = service
        .description
        .clone()
        .unwrap_or_else(|| format!("Service at {}", service.path));
    let command = Command::new(command_name(service))
        .about(about)
        .subcommand_required(true)
        .arg_required_else_help(true);
    service
        .methods
        .iter()
        .fold(command, |acc, op| acc.subcommand(method_command(*op)))
}

fn method_command(op: OperationKind) -> Command {
    let about = match op {
        OperationKind::Find => "List records, filtered by --query",
        OperationKind::Get => "Fetch one record by --id",
        OperationKind::Create => "Create a record from --data",
        OperationKind::Patch => "Merge --data into the record with --id",
        OperationKind::Remove => "Delete the record with --id",
    };
    let mut command = Command::new(op.as_str()).about(about).arg(
        Arg::new("query")
            .long("query")
            .short('q')
            .value_name("KEY=VALUE")
            .help("Query parameter; JSON values are decoded. May be repeated.")
            .action(ArgAction::Append),
    );
    if op.addresses_resource() {
        command = command.arg(
            Arg::new("id")
                .long("id")
                .short('i')
                .help("Id of the record.")
                .required(true)
                .action(ArgAction::Set),
        );
    }
    if op.carries_body() {
        command = command.arg(
            Arg::new("data")
                .long("data")
                .short('d')
                .help("The JSON request body as a string.")
                .required(true)
                .action(ArgAction::Set),
        );
    }
    command.arg(
        Arg::new("header")
            .long("header")
            .short('H')
            .value_name("NAME:VALUE")
            .help("Extra request header. May be repeated.")
            .action(ArgAction::Append),
    )
}
