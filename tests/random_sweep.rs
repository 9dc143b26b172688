//! Seeded randomized sweep over small definitions on the alphabet {a, b, c}.
//!
//! Patterns and probe strings come from `StdRng`, so every failure reproduces
//! from `LEXGEN_SWEEP_SEED`. `LEXGEN_SWEEP_CASES` widens the sweep.

use lexgen::{
    Automaton, Dfa, TokenizerDefinition,
    lexer::tables::{build_tables, load_tables_bin_bytes, load_tables_json_bytes},
    tokenize,
};
use rand::{Rng, SeedableRng, rngs::StdRng};

fn env_u64(name: &str, default: u64) -> u64 {
    std::env::var(name)
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(default)
}

fn env_usize(name: &str, default: usize) -> usize {
    std::env::var(name)
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
        .unwrap_or(default)
}

fn rng_and_cases() -> (StdRng, usize) {
    let seed = env_u64("LEXGEN_SWEEP_SEED", 0x1e9_6e4);
    (StdRng::seed_from_u64(seed), env_usize("LEXGEN_SWEEP_CASES", 40))
}

fn gen_atom<R: Rng>(rng: &mut R) -> String {
    let atom = match rng.random_range(0u32..6) {
        0 => "a".to_string(),
        1 => "b".to_string(),
        2 => "c".to_string(),
        3 => "[ab]".to_string(),
        4 => "[^a\\n]".to_string(),
        _ => format!("({}|{})", gen_literal(rng), gen_literal(rng)),
    };
    match rng.random_range(0u32..5) {
        0 => atom + "*",
        1 => atom + "+",
        2 => atom + "?",
        _ => atom,
    }
}

fn gen_literal<R: Rng>(rng: &mut R) -> String {
    let len = rng.random_range(1usize..=3);
    (0..len)
        .map(|_| ['a', 'b', 'c'][rng.random_range(0usize..3)])
        .collect()
}

fn gen_pattern<R: Rng>(rng: &mut R) -> String {
    let n = rng.random_range(1usize..=3);
    (0..n).map(|_| gen_atom(rng)).collect()
}

fn gen_probe<R: Rng>(rng: &mut R) -> String {
    let len = rng.random_range(0usize..=6);
    (0..len)
        .map(|_| ['a', 'b', 'c', 'd'][rng.random_range(0usize..4)])
        .collect()
}

fn matches(pattern: &str, input: &str) -> bool {
    TokenizerDefinition::parse(&format!("t:{pattern}"))
        .unwrap()
        .master()
        .accepts(input)
        .is_some()
}

fn probes<R: Rng>(rng: &mut R, n: usize) -> Vec<String> {
    (0..n).map(|_| gen_probe(rng)).collect()
}

#[test]
fn construction_is_deterministic() {
    let (mut rng, cases) = rng_and_cases();
    for _ in 0..cases {
        let text = format!(
            "x:{}\ny:{}\nz:{}",
            gen_pattern(&mut rng),
            gen_pattern(&mut rng),
            gen_pattern(&mut rng)
        );
        let d1 = TokenizerDefinition::parse(&text).unwrap();
        let d2 = TokenizerDefinition::parse(&text).unwrap();
        assert_eq!(d1.master().len(), d2.master().len(), "{text}");
        assert_eq!(build_tables(d1.master()), build_tables(d2.master()), "{text}");
        for p in probes(&mut rng, 20) {
            assert_eq!(d1.master().accepts(&p), d2.master().accepts(&p), "{text} / {p:?}");
        }
    }
}

#[test]
fn redeclaration_is_union() {
    let (mut rng, cases) = rng_and_cases();
    for _ in 0..cases {
        let (p1, p2) = (gen_pattern(&mut rng), gen_pattern(&mut rng));
        let d = TokenizerDefinition::parse(&format!("t:{p1}\nt:{p2}")).unwrap();
        for p in probes(&mut rng, 20) {
            let expected = matches(&p1, &p) || matches(&p2, &p);
            assert_eq!(d.master().accepts(&p).is_some(), expected, "{p1} | {p2} on {p:?}");
        }
    }
}

#[test]
fn internal_reference_equals_inlined_text() {
    let (mut rng, cases) = rng_and_cases();
    for _ in 0..cases {
        let (inner, tail) = (gen_pattern(&mut rng), gen_pattern(&mut rng));
        let referenced =
            TokenizerDefinition::parse(&format!(":h:{inner}\nt:{{h}}{tail}")).unwrap();
        let inlined = TokenizerDefinition::parse(&format!("t:({inner}){tail}")).unwrap();
        for p in probes(&mut rng, 20) {
            assert_eq!(
                referenced.master().accepts(&p),
                inlined.master().accepts(&p),
                "{{h}}={inner} tail={tail} on {p:?}"
            );
        }
    }
}

#[test]
fn matches_agree_with_isolated_tokens_and_priority() {
    let (mut rng, cases) = rng_and_cases();
    for _ in 0..cases {
        let pats = [gen_pattern(&mut rng), gen_pattern(&mut rng)];
        let d = TokenizerDefinition::parse(&format!("x:{}\ny:{}", pats[0], pats[1])).unwrap();
        let alone: Vec<Dfa> = d.tokens().iter().map(|t| t.to_dfa()).collect();
        for p in probes(&mut rng, 20) {
            let expected = if alone[0].accepts(&p).is_some() {
                Some("x")
            } else if alone[1].accepts(&p).is_some() {
                Some("y")
            } else {
                None
            };
            assert_eq!(d.master().accepts(&p), expected, "{pats:?} on {p:?}");
        }
    }
}

#[test]
fn tables_agree_with_dfa() {
    let (mut rng, cases) = rng_and_cases();
    for _ in 0..cases {
        let text = format!(
            "x:{}\ny:{}\nsep:d",
            gen_pattern(&mut rng),
            gen_pattern(&mut rng)
        );
        let d = TokenizerDefinition::parse(&text).unwrap();
        let tables = build_tables(d.master());
        tables.validate().unwrap();
        for p in probes(&mut rng, 10) {
            assert_eq!(tokenize(&tables, &p), tokenize(d.master(), &p), "{text} / {p:?}");
            for at in 0..p.len() {
                assert_eq!(tables.longest_match(&p, at), d.master().longest_match(&p, at));
            }
        }
    }
}

#[test]
fn tables_survive_json_and_bin() {
    let (mut rng, _) = rng_and_cases();
    let text = format!("x:{}\ny:{}", gen_pattern(&mut rng), gen_pattern(&mut rng));
    let tables = build_tables(TokenizerDefinition::parse(&text).unwrap().master());

    let dir = std::env::temp_dir();
    let json = dir.join(format!("lexgen-sweep-{}.json", std::process::id()));
    let bin = dir.join(format!("lexgen-sweep-{}.bin", std::process::id()));
    lexgen::lexer::tables::save_tables_json(&json, &tables).unwrap();
    lexgen::lexer::tables::save_tables_bin(&bin, &tables).unwrap();
    let from_json = load_tables_json_bytes(&std::fs::read(&json).unwrap()).unwrap();
    let from_bin = load_tables_bin_bytes(&std::fs::read(&bin).unwrap()).unwrap();
    let _ = std::fs::remove_file(&json);
    let _ = std::fs::remove_file(&bin);

    assert_eq!(from_json, tables);
    assert_eq!(from_bin, tables);
}
