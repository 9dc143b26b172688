// src/bin/lex_file.rs
use std::{env, fs, path::PathBuf, time::Instant};

use anyhow::{Context, Result};
use lexgen::{Scanner, TokenizerDefinition, lexer::scanner::excerpt};

fn env_usize(name: &str, default: usize) -> usize {
    env::var(name)
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
        .unwrap_or(default)
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = env::args().skip(1);
    let (Some(def_path), Some(input_path)) = (args.next(), args.next()) else {
        anyhow::bail!("usage: lex_file <definition> <input> [skip,names]");
    };
    let (def_path, input_path) = (PathBuf::from(def_path), PathBuf::from(input_path));
    let skip: Vec<String> = args
        .next()
        .map(|s| {
            s.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect()
        })
        .unwrap_or_default();
    let max_errors = env_usize("LEXGEN_MAX_ERRORS", 1).max(1);

    let def_file = fs::File::open(&def_path)
        .with_context(|| format!("opening definition {}", def_path.display()))?;
    let def = TokenizerDefinition::from_reader(std::io::BufReader::new(def_file))
        .with_context(|| format!("building tokenizer from {}", def_path.display()))?;
    let src = fs::read_to_string(&input_path)
        .with_context(|| format!("reading {}", input_path.display()))?;

    let t0 = Instant::now();
    let mut n_tokens = 0usize;
    let mut n_errors = 0usize;
    for item in Scanner::new(def.master(), &src).skip_tokens(skip) {
        match item {
            Ok(tok) => {
                n_tokens += 1;
                println!(
                    "{:>4}:{:<3} {:<12} {:?}",
                    tok.position.line, tok.position.column, tok.name, tok.lexeme
                );
            }
            Err(e) => {
                n_errors += 1;
                let (lo, text) = excerpt(&src, e.position().offset);
                eprintln!("error: {e}");
                eprintln!("  | {text}");
                eprintln!("  | {}^", " ".repeat(src[lo..e.position().offset].chars().count()));
                if n_errors >= max_errors {
                    break;
                }
            }
        }
    }

    println!(
        "[lex_file] {} tokens, {} errors, {} bytes in {:.3} ms",
        n_tokens,
        n_errors,
        src.len(),
        t0.elapsed().as_secs_f64() * 1e3
    );
    if n_errors > 0 {
        anyhow::bail!("{n_errors} scan error(s) in {}", input_path.display());
    }
    Ok(())
}
