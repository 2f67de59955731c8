//! CLI smoke entry point for the dialog core.
//!
//! # Responsibility
//! - Print the build version when run without arguments.
//! - Resolve one phrase, or dump the catalog, from the record files named by
//!   `DIALOG_SYNONYMS_FILE` / `DIALOG_RESPONSES_FILE`.
//!
//! Usage: `dialog_cli [resolve <phrase...> | dump]`

use dialog_core::{DialogConfig, DialogEngine, DialogStore};
use std::process::ExitCode;

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.split_first() {
        None => {
            println!("{}", version_line());
            ExitCode::SUCCESS
        }
        Some((command, rest)) if command == "resolve" && !rest.is_empty() => {
            run(|engine| println!("{}", engine.resolve(&rest.join(" "))))
        }
        Some((command, rest)) if command == "dump" && rest.is_empty() => run(print_catalog),
        Some(_) => {
            eprintln!("usage: dialog_cli [resolve <phrase...> | dump]");
            ExitCode::from(2)
        }
    }
}

fn version_line() -> String {
    format!("dialog_cli version={}", env!("CARGO_PKG_VERSION"))
}

fn run<F: FnOnce(&DialogEngine)>(command: F) -> ExitCode {
    let result = DialogConfig::from_env()
        .map_err(|err| err.to_string())
        .and_then(|config| {
            config.init_logging()?;
            config.csv_store().load().map_err(|err| err.to_string())
        });

    match result {
        Ok(engine) => {
            command(&engine);
            ExitCode::SUCCESS
        }
        Err(err) => {
            log::error!("event=cli_run module=cli status=error error={err}");
            eprintln!("dialog_cli: {err}");
            ExitCode::FAILURE
        }
    }
}

fn print_catalog(engine: &DialogEngine) {
    for (prompt, entry) in engine.responses() {
        println!(
            "(prompt) {prompt} | (response) {} | (actions) {:?}",
            entry.response, entry.actions
        );
    }
    for (prompt, synonyms) in engine.synonym_groups() {
        let quoted: Vec<String> = synonyms.iter().map(|synonym| format!("'{synonym}'")).collect();
        println!("'{prompt}' : {}", quoted.join(" "));
    }
}

#[cfg(test)]
mod tests {
    use super::version_line;

    #[test]
    fn version_line_names_package_version() {
        let line = version_line();
        assert!(line.starts_with("dialog_cli version="));
        assert!(line.ends_with(env!("CARGO_PKG_VERSION")));
        assert!(!env!("CARGO_PKG_VERSION").is_empty());
    }
}
