//! Built-in pattern machines
//!
//! A fixed registry of small example automata, each expressed as declarations.

use crate::source::MachineSource;
use crate::state_machine::StateDeclaration;
use crate::{Error, Result};

/// A registry entry
#[derive(Debug, Clone, Copy)]
pub struct BuiltinMachine {
    pub key: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    declare: fn() -> Vec<StateDeclaration>,
}

const REGISTRY: [BuiltinMachine; 4] = [
    BuiltinMachine {
        key: "bb-suffix",
        title: "Ends with bb",
        description: "Accepts every word whose last two symbols are 'b'",
        declare: bb_suffix,
    },
    BuiltinMachine {
        key: "three-in-a-row",
        title: "Three in a row",
        description: "Accepts every word containing \"aaa\" or \"bbb\"",
        declare: three_in_a_row,
    },
    BuiltinMachine {
        key: "a-then-b",
        title: "Every a followed by b",
        description: "Accepts words over {a, b} where each 'a' is immediately followed by 'b'",
        declare: a_then_b,
    },
    BuiltinMachine {
        key: "a-mod3-b",
        title: "Starts a, ends b, length % 3 == 0",
        description: "Accepts words starting with 'a', ending with 'b', with a length divisible by 3",
        declare: a_mod3_b,
    },
];

/// All built-in machines, in menu order
pub fn registry() -> &'static [BuiltinMachine] {
    &REGISTRY
}

/// Look up a built-in machine by key
pub fn find(key: &str) -> Result<&'static BuiltinMachine> {
    REGISTRY
        .iter()
        .find(|machine| machine.key == key)
        .ok_or_else(|| Error::UnknownMachine(key.to_string()))
}

impl MachineSource for BuiltinMachine {
    fn label(&self) -> String {
        self.key.to_string()
    }

    fn declarations(&self) -> Result<Vec<StateDeclaration>> {
        Ok((self.declare)())
    }
}

/// Z0: last symbol not 'b', Z1: one trailing 'b', Z2: two or more trailing 'b'
fn bb_suffix() -> Vec<StateDeclaration> {
    vec![
        StateDeclaration::new("Z0").on('b', "Z1").otherwise("Z0"),
        StateDeclaration::new("Z1").on('b', "Z2").otherwise("Z0"),
        StateDeclaration::new("Z2")
            .on('b', "Z2")
            .otherwise("Z0")
            .accepting(),
    ]
}

/// Tracks the current run of 'a' or 'b'; a third in a row locks into ACCEPT
fn three_in_a_row() -> Vec<StateDeclaration> {
    vec![
        StateDeclaration::new("UNSEEN")
            .on('a', "A1")
            .on('b', "B1")
            .otherwise("UNSEEN"),
        StateDeclaration::new("A1")
            .on('a', "A2")
            .on('b', "B1")
            .otherwise("UNSEEN"),
        StateDeclaration::new("A2")
            .on('a', "ACCEPT")
            .on('b', "B1")
            .otherwise("UNSEEN"),
        StateDeclaration::new("B1")
            .on('a', "A1")
            .on('b', "B2")
            .otherwise("UNSEEN"),
        StateDeclaration::new("B2")
            .on('a', "A1")
            .on('b', "ACCEPT")
            .otherwise("UNSEEN"),
        StateDeclaration::new("ACCEPT")
            .otherwise("ACCEPT")
            .accepting(),
    ]
}

/// BASE accepts, AWAIT_B has seen an 'a', anything out of place traps in INVALID
fn a_then_b() -> Vec<StateDeclaration> {
    vec![
        StateDeclaration::new("BASE")
            .on('a', "AWAIT_B")
            .on('b', "BASE")
            .otherwise("INVALID")
            .accepting(),
        StateDeclaration::new("AWAIT_B")
            .on('b', "BASE")
            .otherwise("INVALID"),
        StateDeclaration::new("INVALID").otherwise("INVALID"),
    ]
}

/// The numeric suffix is the word length modulo 3 (3 standing for 0);
/// WAS_B states have just read a 'b'
fn a_mod3_b() -> Vec<StateDeclaration> {
    vec![
        StateDeclaration::new("START")
            .on('a', "AWAIT_B_1")
            .otherwise("INVALID"),
        StateDeclaration::new("AWAIT_B_1")
            .on('b', "WAS_B_2")
            .otherwise("AWAIT_B_2"),
        StateDeclaration::new("AWAIT_B_2")
            .on('b', "WAS_B_3")
            .otherwise("AWAIT_B_3"),
        StateDeclaration::new("AWAIT_B_3")
            .on('b', "WAS_B_1")
            .otherwise("AWAIT_B_1"),
        StateDeclaration::new("WAS_B_1")
            .on('b', "WAS_B_2")
            .otherwise("AWAIT_B_2"),
        StateDeclaration::new("WAS_B_2")
            .on('b', "WAS_B_3")
            .otherwise("AWAIT_B_3"),
        StateDeclaration::new("WAS_B_3")
            .on('b', "WAS_B_1")
            .otherwise("AWAIT_B_1")
            .accepting(),
        StateDeclaration::new("INVALID").otherwise("INVALID"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state_machine::Automaton;

    fn build(key: &str) -> Automaton {
        find(key).unwrap().build().unwrap()
    }

    fn check_words(machine: &Automaton, accepted: &[&str], rejected: &[&str]) {
        for word in accepted {
            assert!(machine.accepts(word), "expected to accept {:?}", word);
        }
        for word in rejected {
            assert!(!machine.accepts(word), "expected to reject {:?}", word);
        }
    }

    #[test]
    fn test_registry_keys_are_unique() {
        let mut keys: Vec<&str> = registry().iter().map(|m| m.key).collect();
        keys.sort_unstable();
        keys.dedup();
        assert_eq!(keys.len(), registry().len());
    }

    #[test]
    fn test_unknown_machine() {
        assert!(matches!(find("nope"), Err(Error::UnknownMachine(key)) if key == "nope"));
    }

    #[test]
    fn test_every_builtin_builds() {
        for machine in registry() {
            let automaton = machine.build().unwrap();
            assert_eq!(automaton.graph().len(), machine.declarations().unwrap().len());
        }
    }

    #[test]
    fn test_bb_suffix() {
        check_words(
            &build("bb-suffix"),
            &["bb", "abb", "aabb", "aaabb", "babb", "bbbb", "abababb", "aaababb"],
            &["", "a", "b", "ab", "aba", "abba", "ba", "aaa", "baba"],
        );
    }

    #[test]
    fn test_three_in_a_row() {
        check_words(
            &build("three-in-a-row"),
            &[
                "aaa", "bbb", "aabbb", "aaabb", "abaaa", "bbbbbb", "aaab", "baaabb", "bbaaabb",
            ],
            &[
                "", "a", "b", "ab", "aba", "aabb", "abab", "aabba", "babab", "aacaa",
            ],
        );
    }

    #[test]
    fn test_a_then_b() {
        check_words(
            &build("a-then-b"),
            &[
                "", "b", "bb", "ab", "bab", "babb", "abbb", "bbabb", "abbabb",
            ],
            &[
                "a", "aa", "aba", "abbaaa", "abbaba", "aabbaba", "abbababa", "abc",
            ],
        );
    }

    #[test]
    fn test_a_mod3_b() {
        check_words(
            &build("a-mod3-b"),
            &["aab", "abb", "aaabbb", "aababb", "aaabbabbb"],
            &[
                "",
                "a",
                "b",
                "ab",
                "aabb",
                "aaba",
                "bba",
                "aaa",
                "babb",
                "abab",
                "aaab",
                "aabab",
                "aabbba",
                "aaabba",
                "aaabbaabba",
                "baabbaabbb",
            ],
        );
    }
}
