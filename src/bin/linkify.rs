use std::io::{self, Read};
use std::process::ExitCode;

fn main() -> ExitCode {
    let Some(instance) = std::env::args().nth(1) else {
        eprintln!("usage: linkify <instance> < input.md");
        return ExitCode::FAILURE;
    };
    let mut markdown = String::new();
    if let Err(err) = io::stdin().read_to_string(&mut markdown) {
        eprintln!("linkify: reading stdin: {err}");
        return ExitCode::FAILURE;
    }
    match mdast_autolink::linkify(&markdown, &instance) {
        Ok(md) => {
            print!("{md}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("linkify: {err}");
            ExitCode::FAILURE
        }
    }
}
