// Test binary driven by the integration tests.
//
// Registers the reference option set, parses its own command line and prints
// one line per callback so the output can be asserted on.

use optparser::*;
use tracing_subscriber::EnvFilter;

const BANNER: &str = "\nTesting banner.\n\nOptions:";

fn build() -> Result<OptionParser> {
    let parser = OptionParser::new()
        .on(args![
            "-c",
            "--choice VALUE",
            ["opt_a", "opt_b", "opt_c"],
            "selection with predefined options",
            callback(|v| println!("choice: {}", v))
        ])?
        .on(args![
            "-o",
            "--optional [VALUE]",
            "option with optional value",
            callback(|v| println!("optional: {}", v))
        ])?
        .on(args![
            "-d",
            "--default [VALUE]",
            "*this is default value",
            "option with optional/default value",
            callback(|v| println!("default: {}", v))
        ])?
        .on(args![
            "-s",
            "--switch",
            "simple switch",
            callback(|v| println!("switch: {}", v))
        ])?
        .on(args![
            "-l",
            "--list [LIST]",
            "*all",
            "list (ex: \"core,ui\")",
            callback(|v| {
                let items: Vec<&str> = v
                    .as_str()
                    .unwrap_or_default()
                    .split(',')
                    .map(str::trim)
                    .collect();
                println!("list: {}", items.join("|"));
            })
        ])?
        .on(args![
            "-v",
            "--version",
            "display optparser version",
            callback(|_| println!("optparser version {}", VERSION))
        ])?
        .unmatched(|arg| println!("unmatched: {}", arg))
        .banner(BANNER);

    // Mirror a host that reports errors and keeps going.
    let parser = if std::env::var("TEST_OPTPARSER_ERRORS").as_deref() == Ok("continue") {
        parser.error(|report| {
            println!("FAIL: {}", report.message);
            Flow::Continue
        })
    } else {
        parser
    };

    Ok(parser)
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let parser = match build() {
        Ok(parser) => parser,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(2);
        }
    };

    match parser.parse_env() {
        Flow::Continue => {}
        Flow::Exit(code) => std::process::exit(code),
    }
}
