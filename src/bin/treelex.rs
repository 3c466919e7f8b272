//! Command-line interface for treelex
//! Lexes input with a language loaded from a YAML or JSON definition and prints the token tree.
//!
//! Usage:
//!   treelex lex `<language>` [`<input>`] [--format `<format>`]  - Lex a file (stdin when omitted)
//!   treelex check `<language>`                                 - Validate a language definition
//!   treelex formats                                            - List available output formats

use clap::{Arg, Command};
use std::io::Read;
use treelex::treelex::formats::FormatRegistry;
use treelex::treelex::logging::init_tracing;
use treelex::treelex::{Language, LanguageDefinition, Lexer};

fn main() {
    init_tracing();

    let matches = Command::new("treelex")
        .version(env!("CARGO_PKG_VERSION"))
        .about("A regex-rule tokenizer with nested descenders")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("lex")
                .about("Lex input and print the token tree")
                .arg(
                    Arg::new("language")
                        .help("Path to the language definition (.yaml, .yml or .json)")
                        .required(true)
                        .index(1),
                )
                .arg(
                    Arg::new("input")
                        .help("Path to the input file; stdin when omitted")
                        .index(2),
                )
                .arg(
                    Arg::new("format")
                        .long("format")
                        .short('f')
                        .help("Output format (e.g., 'treeviz', 'json', 'sexp')")
                        .default_value("treeviz"),
                ),
        )
        .subcommand(
            Command::new("check")
                .about("Validate a language definition and list its entries")
                .arg(
                    Arg::new("language")
                        .help("Path to the language definition")
                        .required(true)
                        .index(1),
                ),
        )
        .subcommand(Command::new("formats").about("List available output formats"))
        .get_matches();

    match matches.subcommand() {
        Some(("lex", lex_matches)) => {
            let language = lex_matches
                .get_one::<String>("language")
                .expect("language is required");
            let input = lex_matches.get_one::<String>("input");
            let format = lex_matches
                .get_one::<String>("format")
                .expect("format has a default");
            handle_lex_command(language, input.map(String::as_str), format);
        }
        Some(("check", check_matches)) => {
            let language = check_matches
                .get_one::<String>("language")
                .expect("language is required");
            handle_check_command(language);
        }
        Some(("formats", _)) => handle_formats_command(),
        _ => unreachable!(),
    }
}

fn load_language(path: &str) -> Language {
    LanguageDefinition::load(path)
        .and_then(|definition| definition.build())
        .unwrap_or_else(|e| {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        })
}

/// Handle the lex command
fn handle_lex_command(language: &str, input: Option<&str>, format: &str) {
    let registry = FormatRegistry::with_defaults();
    if !registry.has(format) {
        eprintln!(
            "Error: unknown format '{}' (available: {})",
            format,
            registry.list_formats().join(", ")
        );
        std::process::exit(1);
    }

    let lexer = Lexer::new(load_language(language));
    let source = match input {
        Some(path) => std::fs::read_to_string(path).unwrap_or_else(|e| {
            eprintln!("Error reading file: {}", e);
            std::process::exit(1);
        }),
        None => {
            let mut buffer = String::new();
            if let Err(e) = std::io::stdin().read_to_string(&mut buffer) {
                eprintln!("Error reading stdin: {}", e);
                std::process::exit(1);
            }
            buffer
        }
    };

    let chain = lexer.lex(&source).unwrap_or_else(|e| {
        eprintln!("Lex error: {}", e);
        std::process::exit(1);
    });
    let output = registry.serialize(&chain, format).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    });
    print!("{}", output);
    if !output.ends_with('\n') {
        println!();
    }
}

/// Handle the check command
fn handle_check_command(path: &str) {
    let language = load_language(path);
    println!("{} is valid\n", path);
    for (label, names) in [
        ("rules", language.rule_names()),
        ("descenders", language.descender_names()),
        ("ignores", language.ignore_names()),
    ] {
        println!("  {} ({})", label, names.len());
        for name in names {
            println!("    {}", name);
        }
    }
}

/// Handle the formats command
fn handle_formats_command() {
    let registry = FormatRegistry::with_defaults();
    println!("Available formats:\n");
    for name in registry.list_formats() {
        if let Some(formatter) = registry.get(&name) {
            println!("  {}", name);
            println!("    {}", formatter.description());
        }
    }
}
