// Integration tests for the multire engine
//
// Covers the full register -> compile -> query workflow, tie-breaking,
// lifecycle errors and a brute-force cross-check against the regex crate.

use multire_engine::{
    Classifier, EngineConfig, EngineError, MatchResult, PatternRegistry, QueryMode,
};
use regex::Regex;

fn registry_of<V: Clone>(pairs: &[(&str, V)]) -> PatternRegistry<V> {
    let mut registry = PatternRegistry::new();
    for (pattern, value) in pairs {
        registry.register(*pattern, value.clone());
    }
    registry
}

fn sorted<T: Ord>(mut values: Vec<T>) -> Vec<T> {
    values.sort();
    values
}

#[test_log::test]
fn test_longest_eager_all_example() {
    let engine = registry_of(&[("a+", 1), ("ab", 2)]).compile().unwrap();

    assert_eq!(engine.query_longest("ab"), Some(&2));
    assert_eq!(engine.query_eager("ab"), Some(&1));
    assert_eq!(sorted(engine.query_all("ab")), vec![&1, &2]);
}

#[test_log::test]
fn test_empty_registry_example() {
    let classifier: Classifier<i32> = Classifier::new();
    assert!(matches!(classifier.compile(), Err(EngineError::EmptyRegistry)));
    assert_eq!(classifier.pattern_count(), 0);
    for input in ["", "a", "http://example.com"] {
        assert_eq!(classifier.query_longest(input).unwrap(), None);
        assert_eq!(classifier.query_eager(input).unwrap(), None);
        assert!(classifier.query_all(input).unwrap().is_empty());
    }
}

#[test]
fn test_round_trip_single_pattern() {
    for pattern in ["abc", "www", "example", "a|b", "x+"] {
        let engine = registry_of(&[(pattern, "v")]).compile().unwrap();
        // these patterns all match their own source text or a prefix of it
        assert_eq!(engine.query_longest(pattern), Some(&"v"), "{pattern}");
        assert_eq!(engine.query_eager(pattern), Some(&"v"), "{pattern}");
    }
}

#[test]
fn test_longest_tie_goes_to_lexicographically_last() {
    // both accept "abc" with length 3; "abc" > "a.c"
    let engine = registry_of(&[("abc", "literal"), ("a.c", "dot")])
        .compile()
        .unwrap();
    assert_eq!(engine.query_longest("abc"), Some(&"literal"));
    assert_eq!(engine.query_longest("axc"), Some(&"dot"));
}

#[test]
fn test_eager_tie_goes_to_lexicographically_first() {
    let engine = registry_of(&[("abc", "literal"), ("a.c", "dot")])
        .compile()
        .unwrap();
    assert_eq!(engine.query_eager("abc"), Some(&"dot"));
}

#[test]
fn test_eager_prefers_earliest_position_over_order() {
    // "b+" = 0, "bbb" = 1
    let engine = registry_of(&[("bbb", 1), ("b+", 2)]).compile().unwrap();
    assert_eq!(engine.query_eager("bbbb"), Some(&2));
    assert_eq!(engine.query_longest("bbbb"), Some(&2));
    assert_eq!(engine.query_longest("bbb"), Some(&1));
}

#[test]
fn test_no_spurious_matches() {
    let engine = registry_of(&[("http://a\\.com", 1), ("https://b\\.org", 2)])
        .compile()
        .unwrap();
    for input in ["", "ftp://a.com", "http://b.org", "https://a.com"] {
        assert_eq!(engine.query_longest(input), None, "{input}");
        assert_eq!(engine.query_eager(input), None, "{input}");
        assert!(engine.query_all(input).is_empty(), "{input}");
    }
}

#[test]
fn test_url_classification() {
    let engine = registry_of(&[
        (r"https?://([a-z0-9-]+\.)*example\.com", "example"),
        (r"https?://([a-z0-9-]+\.)*example\.com/shop(/.*)?", "shop"),
        (r"https?://news\.[a-z]+\.[a-z]{2,3}/.*", "news"),
        (r"https?://.*", "web"),
    ])
    .compile()
    .unwrap();

    assert_eq!(
        engine.query_longest("https://www.example.com/shop/cart"),
        Some(&"web")
    );
    assert_eq!(
        engine.query_eager("https://www.example.com/shop/cart"),
        Some(&"web")
    );
    assert_eq!(
        sorted(engine.query_all("https://www.example.com/shop/cart")),
        vec![&"example", &"shop", &"web"]
    );
    // "https?://news..." sorts after "https?://.*"
    assert_eq!(engine.query_longest("http://news.site.io/today"), Some(&"news"));
    assert!(engine.query_all("mailto:someone").is_empty());
}

#[test]
fn test_overwrite_before_compile() {
    let classifier = Classifier::new();
    assert_eq!(classifier.register("a", 1).unwrap(), None);
    assert_eq!(classifier.register("a", 5).unwrap(), Some(1));
    classifier.compile().unwrap();
    assert_eq!(classifier.pattern_count(), 1);
    assert_eq!(classifier.query_longest("a").unwrap(), Some(5));
}

#[test]
fn test_lifecycle_errors() {
    let classifier = Classifier::new();
    classifier.register("x", ()).unwrap();
    assert!(matches!(classifier.query_all("x"), Err(EngineError::NotCompiled)));
    classifier.compile().unwrap();
    assert!(matches!(classifier.register("y", ()), Err(EngineError::AlreadyCompiled)));
    assert_eq!(classifier.query_all("x").unwrap(), vec![()]);
}

#[test]
fn test_compile_error_publishes_nothing() {
    let classifier = Classifier::new();
    classifier.register("good", 1).unwrap();
    classifier.register("bad)", 2).unwrap();
    match classifier.compile() {
        Err(EngineError::PatternCompile { pattern, .. }) => assert_eq!(pattern, "bad)"),
        other => panic!("unexpected result: {other:?}"),
    }
    assert!(matches!(classifier.query_longest("good"), Err(EngineError::NotCompiled)));
}

#[test]
fn test_look_around_rejected() {
    let registry = registry_of(&[(r"\bword", 1)]);
    assert!(matches!(
        registry.compile(),
        Err(EngineError::PatternCompile { .. })
    ));
}

#[test]
fn test_case_insensitive_config() {
    let mut config = EngineConfig::default();
    config.automaton.case_insensitive = true;
    let mut registry = PatternRegistry::with_config(config);
    registry.register("example", 1);
    let engine = registry.compile().unwrap();
    assert_eq!(engine.query_longest("EXAMPLE"), Some(&1));
}

#[test]
fn test_unminimized_engine_behaves_identically() {
    let pairs = [("a+", 1), ("ab", 2), ("(ab)*c", 3), ("[a-c]{2}", 4)];
    let minimal = registry_of(&pairs).compile().unwrap();

    let mut config = EngineConfig::default();
    config.minimize = false;
    config.automaton.minimize = false;
    let mut registry = PatternRegistry::with_config(config);
    for (pattern, value) in pairs {
        registry.register(pattern, value);
    }
    let raw = registry.compile().unwrap();
    assert!(minimal.automaton().state_count() <= raw.automaton().state_count());

    for input in all_strings(&['a', 'b', 'c'], 5) {
        for mode in QueryMode::all() {
            assert_eq!(
                minimal.query(*mode, &input),
                raw.query(*mode, &input),
                "{mode} {input:?}"
            );
        }
    }
}

#[test]
fn test_match_result_never_raw_index() {
    let engine = registry_of(&[("a", 0)]).compile().unwrap();
    assert_eq!(engine.match_longest("a"), MatchResult::OneIndex(0));
    assert_eq!(engine.match_longest("b"), MatchResult::NoMatch);
    assert_eq!(engine.match_all("a"), MatchResult::IndexSet(vec![0]));
}

// Enumerate every string over `alphabet` with at most `max_len` characters
fn all_strings(alphabet: &[char], max_len: usize) -> Vec<String> {
    let mut out = vec![String::new()];
    let mut frontier = vec![String::new()];
    for _ in 0..max_len {
        let mut next = Vec::new();
        for prefix in &frontier {
            for &c in alphabet {
                let mut s = prefix.clone();
                s.push(c);
                next.push(s);
            }
        }
        out.extend(next.iter().cloned());
        frontier = next;
    }
    out
}

/// Expected results computed one prefix at a time with the regex crate
struct Oracle {
    full: Vec<Regex>,
}

impl Oracle {
    fn new(patterns: &[&str]) -> Self {
        Self {
            full: patterns
                .iter()
                .map(|p| Regex::new(&format!("^(?:{p})$")).unwrap())
                .collect(),
        }
    }

    /// Accepting pattern indices after each prefix length
    fn accepting(&self, input: &str) -> Vec<Vec<u32>> {
        let chars: Vec<char> = input.chars().collect();
        (0..=chars.len())
            .map(|len| {
                let prefix: String = chars[..len].iter().collect();
                self.full
                    .iter()
                    .enumerate()
                    .filter(|(_, re)| re.is_match(&prefix))
                    .map(|(i, _)| i as u32)
                    .collect()
            })
            .collect()
    }

    fn longest(&self, input: &str) -> MatchResult {
        self.accepting(input)
            .into_iter()
            .rev()
            .find(|set| !set.is_empty())
            .and_then(|set| set.last().copied())
            .map_or(MatchResult::NoMatch, MatchResult::OneIndex)
    }

    fn eager(&self, input: &str) -> MatchResult {
        self.accepting(input)
            .into_iter()
            .find(|set| !set.is_empty())
            .and_then(|set| set.first().copied())
            .map_or(MatchResult::NoMatch, MatchResult::OneIndex)
    }

    fn all(&self, input: &str) -> MatchResult {
        let mut all: Vec<u32> = self.accepting(input).into_iter().flatten().collect();
        all.sort_unstable();
        all.dedup();
        if all.is_empty() {
            MatchResult::NoMatch
        } else {
            MatchResult::IndexSet(all)
        }
    }
}

#[test]
fn test_agrees_with_prefix_oracle() {
    // Already in lexicographic order, so position == index
    let mut patterns = vec![
        "", "(a|b)*c", "(ab)+", "[^a]b", "a", "a*b", "a.c", "a{2,3}", "ab", "abc", "b+", "c?a",
    ];
    patterns.sort_unstable();

    let mut registry = PatternRegistry::new();
    for (index, pattern) in patterns.iter().enumerate() {
        registry.register(*pattern, index as u32);
    }
    let engine = registry.compile().unwrap();
    let oracle = Oracle::new(&patterns);

    for input in all_strings(&['a', 'b', 'c', 'd'], 5) {
        assert_eq!(engine.match_longest(&input), oracle.longest(&input), "longest {input:?}");
        assert_eq!(engine.match_eager(&input), oracle.eager(&input), "eager {input:?}");
        assert_eq!(engine.match_all(&input), oracle.all(&input), "all {input:?}");
    }
}

#[test]
fn test_concurrent_readers_see_whole_engine() {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    let classifier = Arc::new(Classifier::new());
    for i in 0..50 {
        classifier.register(format!("host{i:02}\\.example"), i).unwrap();
    }
    let done = AtomicBool::new(false);

    std::thread::scope(|scope| {
        for _ in 0..8 {
            scope.spawn(|| {
                let mut answered = 0;
                while answered < 100 {
                    let published = done.load(Ordering::Acquire);
                    match classifier.query_longest("host17.example") {
                        Err(EngineError::NotCompiled) => assert!(!published),
                        Ok(value) => {
                            assert_eq!(value, Some(17));
                            assert_eq!(classifier.pattern_count(), 50);
                            answered += 1;
                        }
                        Err(other) => panic!("unexpected error: {other}"),
                    }
                    std::thread::yield_now();
                }
            });
        }

        classifier.compile().unwrap();
        done.store(true, Ordering::Release);
    });

    assert_eq!(classifier.query_all("host03.example").unwrap(), vec![3]);
}
