use super::*;

// =============================================================
// Tool
// =============================================================

#[test]
fn tool_default_is_move() {
    assert_eq!(Tool::default(), Tool::Move);
}

#[test]
fn tool_names_round_trip() {
    for tool in [Tool::Move, Tool::Ruler, Tool::Fog, Tool::Token] {
        assert_eq!(Tool::from_name(tool.name()), Some(tool));
    }
}

#[test]
fn tool_unknown_name_is_none() {
    assert_eq!(Tool::from_name("lasso"), None);
    assert_eq!(Tool::from_name("Move"), None);
    assert_eq!(Tool::from_name(""), None);
}

#[test]
fn tool_serde_matches_names() {
    assert_eq!(serde_json::to_string(&Tool::Fog).unwrap(), "\"fog\"");
    let tool: Tool = serde_json::from_str("\"ruler\"").unwrap();
    assert_eq!(tool, Tool::Ruler);
}

// =============================================================
// Button
// =============================================================

#[test]
fn button_from_dom_codes() {
    assert_eq!(Button::from_dom(0), Some(Button::Primary));
    assert_eq!(Button::from_dom(1), Some(Button::Middle));
    assert_eq!(Button::from_dom(2), Some(Button::Secondary));
    assert_eq!(Button::from_dom(3), None);
    assert_eq!(Button::from_dom(-1), None);
}

// =============================================================
// InputState
// =============================================================

#[test]
fn input_state_default_is_idle() {
    assert_eq!(InputState::default(), InputState::Idle);
    assert!(!InputState::Idle.is_active());
}

#[test]
fn gestures_are_active() {
    let states = [
        InputState::Panning { last_screen: Point::new(0.0, 0.0) },
        InputState::DraggingToken { id: "t".to_owned(), last_screen: Point::new(1.0, 2.0) },
        InputState::Measuring,
        InputState::Brushing,
    ];
    for state in states {
        assert!(state.is_active(), "{state:?}");
    }
}

#[test]
fn only_measuring_and_brushing_are_overlay_only() {
    assert!(InputState::Measuring.affects_overlay_only());
    assert!(InputState::Brushing.affects_overlay_only());
    assert!(!InputState::Idle.affects_overlay_only());
    assert!(!InputState::Panning { last_screen: Point::new(0.0, 0.0) }.affects_overlay_only());
}
