//! Line-based prompts on stdin.

use std::io::{self, BufRead, Write};

/// Ask for a line of text. Returns the trimmed answer, which may be empty.
/// A closed stdin is an `UnexpectedEof` error, not an empty answer.
pub fn ask(label: &str) -> io::Result<String> {
    print!("{label}: ");
    io::stdout().flush()?;

    read_answer(&mut io::stdin().lock())
}

fn read_answer(input: &mut impl BufRead) -> io::Result<String> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "input closed before an answer was given",
        ));
    }
    Ok(line.trim().to_string())
}

pub fn confirm(question: &str) -> io::Result<bool> {
    let answer = ask(&format!("{question} [y/N]"))?;
    Ok(answer.eq_ignore_ascii_case("y"))
}

/// Numbered menu over `options`. Accepts a number or an exact option name;
/// an empty answer picks nothing.
pub fn choose(label: &str, options: &[String]) -> io::Result<Option<String>> {
    for (idx, option) in options.iter().enumerate() {
        println!("  {:>3}) {option}", idx + 1);
    }

    loop {
        let answer = ask(label)?;
        if answer.is_empty() {
            return Ok(None);
        }
        if let Some(choice) = pick(&answer, options) {
            return Ok(Some(choice.clone()));
        }
        println!("Pick a number between 1 and {}", options.len());
    }
}

fn pick<'a>(answer: &str, options: &'a [String]) -> Option<&'a String> {
    if let Ok(n) = answer.parse::<usize>() {
        return n.checked_sub(1).and_then(|idx| options.get(idx));
    }
    options.iter().find(|o| o.as_str() == answer)
}
