use crate::imaging::{CardSide, DetectionMethod};
use crate::vision::openrouter::parse_verdict;

#[test]
fn front_reply_is_front_at_high_confidence() {
    let verdict = parse_verdict("FRONT");
    assert_eq!(verdict.side, CardSide::Front);
    assert_eq!(verdict.confidence, 0.95);
    assert_eq!(verdict.method, DetectionMethod::Vision);
}

#[test]
fn verdicts_match_on_substrings_case_insensitively() {
    assert_eq!(parse_verdict("I believe this is the front of the card.").side, CardSide::Front);
    assert_eq!(parse_verdict("back").side, CardSide::Back);
    assert_eq!(parse_verdict("It shows the BACK side").side, CardSide::Back);
}

#[test]
fn front_takes_precedence_over_back() {
    // Both words present: the FRONT rule is evaluated first.
    assert_eq!(parse_verdict("front, not back").side, CardSide::Front);
}

#[test]
fn wrong_card_reply_drops_confidence() {
    let verdict = parse_verdict("WRONG_CARD");
    assert_eq!(verdict.side, CardSide::Unknown);
    assert_eq!(verdict.confidence, 0.3);
}

#[test]
fn unrecognized_reply_is_unknown() {
    let verdict = parse_verdict("I cannot tell.");
    assert_eq!(verdict.side, CardSide::Unknown);
    assert_eq!(verdict.confidence, 0.5);
}
