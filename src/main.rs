// src/main.rs
use lexgen::{Scanner, TokenizerDefinition};

const GRAMMAR: &str = include_str!("../grammars/cmm.tokens");

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // A tiny sample covering keywords, numbers, strings, comments, and operators.
    let src = r#"
        int foo = 12 + bar/* cmt */(7); // hello
        float baz=3.5e-2/*multi
        line*/+qux;
        if (foo >= 10) { return "done\n"; }
    "#;

    let def = TokenizerDefinition::parse(GRAMMAR)?;
    println!("TOKENS:");
    for item in Scanner::new(def.master(), src).skip_tokens(["ws", "comment"]) {
        match item {
            Ok(t) => println!("{:<10} {:?}", t.name, t.lexeme),
            Err(e) => eprintln!("lex error: {e}"),
        }
    }
    Ok(())
}
