use super::*;

#[test]
fn split_drops_blank_lines_and_trims() {
    let lines = split_script("  Hello \n\n\t\nWorld\r\n  ");
    assert_eq!(lines, vec!["Hello".to_owned(), "World".to_owned()]);
    assert!(split_script("\n \n").is_empty());
}

#[test]
fn word_count_ignores_repeated_whitespace() {
    assert_eq!(word_count("a  b\nc"), 3);
    assert_eq!(word_count(""), 0);
}
