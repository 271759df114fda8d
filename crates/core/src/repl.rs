use crate::inference::GenerativeBackend;
use crate::pipeline::{Pipeline, ProcessingError};
use crate::types::{ResponseBundle, Translation};
use std::io::{self, Write};

/// Runs an interactive practice session on stdin/stdout.
pub async fn run_repl<B: GenerativeBackend>(pipeline: &Pipeline<B>) -> io::Result<()> {
    println!("linguaroom");
    println!("Type a message in any supported language. /help for commands.");
    loop {
        print!("you> ");
        io::stdout().flush()?;
        let mut line = String::new();
        if io::stdin().read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == "/help" {
            print_help();
            continue;
        }
        if line == "/exit" || line == "/quit" {
            break;
        }

        match pipeline.process(line).await {
            Ok(bundle) => print_bundle(&bundle),
            Err(ProcessingError::EmptyMessage) => println!("please type a message first"),
        }
    }
    Ok(())
}

fn print_bundle(bundle: &ResponseBundle) {
    println!("tutor> {}", bundle.reply);
    if !bundle.correction.is_correct {
        println!("  correction:  {}", bundle.correction.corrected);
    }
    println!("  pattern:     {}", bundle.grammar_formula);
    if let Translation::Text(text) = &bundle.translation {
        println!("  translation: {text}");
    }
    println!("  language:    {}", bundle.language);
}

fn print_help() {
    println!("linguaroom commands");
    println!("  /help          show this help");
    println!("  /exit | /quit  end the session");
    println!("  anything else  send a practice message to the tutor");
}
