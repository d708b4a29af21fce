//! furimark CLI - Markdown with ruby annotations to HTML

use std::io::{self, Read, Write};
use std::process::ExitCode;

const USAGE: &str = "usage: furimark [--sutegana] [--rp] [--mono-ruby] [FILE|-]";

fn main() -> io::Result<ExitCode> {
    let mut options = furimark::Options::default();
    let mut path = None;

    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--sutegana" => options.use_sutegana = true,
            "--rp" => options.use_rp_tag = true,
            "--mono-ruby" => options.mono_ruby = true,
            "-" => path = None,
            flag if flag.starts_with('-') => {
                eprintln!("furimark: unknown option '{flag}'");
                eprintln!("{USAGE}");
                return Ok(ExitCode::from(2));
            }
            file => path = Some(file.to_string()),
        }
    }

    // Read from a file, or stdin when none (or `-`) is given
    let input = match path {
        Some(path) => std::fs::read_to_string(path)?,
        None => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };

    let html = furimark::to_html_with_options(&input, &options);
    io::stdout().write_all(html.as_bytes())?;

    Ok(ExitCode::SUCCESS)
}
