// tests/mode_tokens.rs

use proptest::prelude::*;

use stackrun::types::Mode;

const KNOWN: &[&str] = &[
    "", "1", "web", "2", "consola", "console", "3", "recompilar", "recompile", "compile", "4",
    "full", "completo",
];

#[test]
fn menu_numbers_and_names_agree() {
    for (number, name) in [("1", "web"), ("2", "consola"), ("3", "compile"), ("4", "full")] {
        assert_eq!(Mode::resolve(number).mode, Mode::resolve(name).mode);
    }
    assert_eq!(Mode::resolve("  FULL \n").mode, Mode::Full);
}

proptest! {
    #[test]
    fn unknown_tokens_fall_back_to_web(token in "[a-z0-9 ]{0,12}") {
        let selection = Mode::resolve(&token);
        let known = KNOWN.contains(&token.trim());

        prop_assert_eq!(selection.recognized, known);
        if !known {
            prop_assert_eq!(selection.mode, Mode::Web);
        }
    }
}
