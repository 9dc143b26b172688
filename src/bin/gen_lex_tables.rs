// src/bin/gen_lex_tables.rs
use std::{env, fs, path::PathBuf};

use anyhow::{Context, Result};
use lexgen::{
    TokenizerDefinition,
    lexer::tables::{build_tables, save_tables_bin, save_tables_json},
};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = env::args().skip(1);
    let Some(def_path) = args.next().map(PathBuf::from) else {
        anyhow::bail!("usage: gen_lex_tables <definition> [out.json|out.bin]");
    };
    let out_path = args
        .next()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("tables/lexer_tables.json"));

    let text = fs::read_to_string(&def_path)
        .with_context(|| format!("reading definition {}", def_path.display()))?;
    let def = TokenizerDefinition::parse(&text)
        .with_context(|| format!("building tokenizer from {}", def_path.display()))?;

    println!("[gen_lex_tables] packing master DFA ({} states)...", def.master().len());
    let tables = build_tables(def.master());

    if let Some(dir) = out_path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    }
    let binary = out_path.extension().is_some_and(|e| e == "bin");
    let saved = if binary {
        save_tables_bin(&out_path, &tables)
    } else {
        save_tables_json(&out_path, &tables)
    };
    saved.with_context(|| format!("writing {}", out_path.display()))?;

    let bytes = fs::metadata(&out_path).map(|m| m.len()).unwrap_or(0);
    println!(
        "[gen_lex_tables] {} states x {} classes, {} tokens: wrote {} bytes (~{:.1} KiB) → {}",
        tables.n_states(),
        tables.n_classes,
        tables.token_names.len(),
        bytes,
        bytes as f64 / 1024.0,
        out_path.display()
    );
    Ok(())
}
