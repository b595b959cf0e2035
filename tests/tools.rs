mod common;

use std::fs;

use poker_seat::SeatError;
use poker_seat::talk::Situation;
use poker_seat::tools::{OddsArgs, Tool, ToolRequest};
use serde_json::{Value, json};

use common::{FakeRig, toolbox_with};

const HOLE: [&str; 2] = ["Qs", "Jd"];

fn assert_no_hole_cards(value: &Value) {
    let text = value.to_string();
    for card in HOLE {
        let token = format!("\"{card}\"");
        assert!(!text.contains(&token), "{card} leaked in {text}");
    }
}

#[test]
fn scripted_hand_reaches_expected_pot_odds() {
    let (_dir, mut toolbox) = toolbox_with(FakeRig::working());

    let summary = toolbox
        .call(
            "setup_game",
            json!({"players": [
                {"name": "Bob", "stack": 500, "seat": "button"},
                {"name": "Mike", "stack": 300, "seat": "small_blind"},
                {"name": "Claude", "stack": 400, "seat": "big_blind"}
            ]}),
        )
        .unwrap();
    assert_eq!(summary["hand_number"], 0);
    assert_eq!(summary["pot"], 0);
    assert_eq!(summary["button"], "Bob");

    let hand = toolbox.call("new_hand", json!({})).unwrap();
    assert_eq!(hand["hand_number"], 1);

    let updated = toolbox.call("update_game_state", json!({"pot": 20})).unwrap();
    assert_eq!(updated["pot"], 20);

    let odds = toolbox.call("poker_odds", json!({"pot": 20, "bet": 15})).unwrap();
    let ratio = odds["call_ratio"].as_f64().unwrap();
    assert!((ratio - 15.0 / 35.0).abs() < 1e-9);
    assert!((ratio - 0.4286).abs() < 1e-4);
    assert!(odds["equity_pct"].is_null());
}

#[test]
fn pot_odds_cover_the_whole_range() {
    let (_dir, mut toolbox) = toolbox_with(FakeRig::default());
    for pot in [0i64, 1, 7, 20, 1_000, 250_000] {
        for bet in [1i64, 2, 15, 999, 40_000] {
            let report = toolbox
                .poker_odds(&OddsArgs {
                    pot,
                    bet,
                    outs: None,
                    street: None,
                })
                .unwrap();
            let expected = bet as f64 / (pot + bet) as f64;
            assert!((report.call_ratio - expected).abs() < 1e-12);
            assert!(report.call_ratio > 0.0 && report.call_ratio <= 1.0);
        }
    }

    let err = toolbox.call("poker_odds", json!({"pot": 0, "bet": 0})).unwrap_err();
    assert_eq!(err.kind(), "validation");
    let err = toolbox.call("poker_odds", json!({"pot": -3, "bet": 5})).unwrap_err();
    assert_eq!(err.kind(), "validation");
}

#[test]
fn outs_use_the_current_street_by_default() {
    let (_dir, mut toolbox) = toolbox_with(FakeRig::default());
    toolbox.setup_game(&common::three_handed()).unwrap();
    toolbox.new_hand().unwrap();
    toolbox
        .call("update_game_state", json!({"community_cards": ["Ah", "Kd", "9s"]}))
        .unwrap();

    let flop = toolbox
        .call("poker_odds", json!({"pot": 100, "bet": 50, "outs": 9}))
        .unwrap();
    assert_eq!(flop["equity_pct"], 36.0);
    assert_eq!(flop["equity_source"], "outs");
    assert_eq!(flop["recommendation"], "call");

    let turn = toolbox
        .call(
            "poker_odds",
            json!({"pot": 100, "bet": 50, "outs": 9, "street": "turn"}),
        )
        .unwrap();
    assert_eq!(turn["equity_pct"], 18.0);
    assert_eq!(turn["recommendation"], "fold");
}

#[test]
fn unknown_update_field_is_rejected_without_writing() {
    let (_dir, mut toolbox) = toolbox_with(FakeRig::default());
    toolbox.setup_game(&common::three_handed()).unwrap();
    toolbox.new_hand().unwrap();
    let path = toolbox.store().game_path();
    let before = fs::read_to_string(&path).unwrap();

    for fields in [
        json!({"pot": 40, "rake": 2}),
        json!({"street": "flop"}),
        json!({"hole_cards": ["Ah", "Kd"]}),
    ] {
        let err = toolbox.call("update_game_state", fields).unwrap_err();
        assert!(matches!(err, SeatError::Validation(_)), "{err}");
    }
    assert_eq!(fs::read_to_string(&path).unwrap(), before);
}

#[test]
fn capture_reports_status_only() {
    let rig = FakeRig::working();
    let (dir, mut toolbox) = toolbox_with(rig.clone());
    toolbox.setup_game(&common::three_handed()).unwrap();
    toolbox.new_hand().unwrap();
    toolbox.call("record_hole_cards", json!({"cards": HOLE})).unwrap();

    let first = toolbox.call("capture_cards", json!({})).unwrap();
    assert_eq!(first["status"], "captured");
    assert_eq!(first["device"], "/dev/video0");
    assert_eq!(first["captures_this_hand"], 1);
    assert_no_hole_cards(&first);
    assert!(dir.path().join("poker_hand.jpg").exists());

    let second = toolbox.call("capture_cards", json!({})).unwrap();
    assert_eq!(second["captures_this_hand"], 2);
    assert_eq!(rig.programs(), ["v4l2-ctl", "ffmpeg", "v4l2-ctl", "ffmpeg"]);

    let state = toolbox.call("game_state", Value::Null).unwrap();
    assert_eq!(state["phase"], "cards_captured");
    assert_eq!(state["hole_cards_recorded"], true);
    assert_no_hole_cards(&state);
}

#[test]
fn capture_failures_carry_no_card_identity() {
    let cases = [
        (FakeRig::default(), "device_not_found"),
        (
            FakeRig {
                capture_fails: true,
                ..FakeRig::working()
            },
            "capture",
        ),
    ];
    for (rig, kind) in cases {
        let (_dir, mut toolbox) = toolbox_with(rig);
        toolbox.setup_game(&common::three_handed()).unwrap();
        toolbox.new_hand().unwrap();
        toolbox.record_hole_cards(&HOLE).unwrap();

        let err = toolbox.call("capture_cards", json!({})).unwrap_err();
        assert_eq!(err.kind(), kind);
        let message = err.to_string();
        for card in HOLE {
            assert!(!message.contains(card));
        }
        assert_eq!(toolbox.game_state().phase, poker_seat::game::HandPhase::HandStart);
    }
}

#[test]
fn no_tool_output_reveals_hole_cards() {
    let (_dir, mut toolbox) = toolbox_with(FakeRig::working());
    let calls = [
        (Tool::SetupGame, json!({"players": [
            {"name": "Bob", "stack": 500, "seat": "button"},
            {"name": "Claude", "chips": 400}
        ]})),
        (Tool::NewHand, json!({})),
        (Tool::RecordHoleCards, json!({"cards": HOLE})),
        (Tool::CaptureCards, json!({})),
        (Tool::UpdateGameState, json!({"pot": 30, "community_cards": ["Ah", "Kd", "9s"]})),
        (Tool::PokerOdds, json!({"pot": 30, "bet": 10})),
        (Tool::PokerDecision, json!({"hand": "QJ", "position": "BTN", "pot": 30, "bet": 10})),
        (Tool::PokerSpeak, json!({"text": "I call"})),
        (Tool::PokerTrashTalk, json!({"situation": "calling", "target": "Bob"})),
        (Tool::GameState, json!({})),
    ];

    for (tool, arguments) in calls {
        let result = toolbox.call(tool.name(), arguments).unwrap();
        if tool != Tool::PokerDecision {
            assert_no_hole_cards(&result);
        }
    }

    let persisted = fs::read_to_string(toolbox.store().game_path()).unwrap();
    assert!(persisted.contains("Qs") && persisted.contains("Jd"));
}

#[test]
fn malformed_hole_cards_are_not_echoed() {
    let (_dir, mut toolbox) = toolbox_with(FakeRig::default());
    toolbox.setup_game(&common::three_handed()).unwrap();
    toolbox.new_hand().unwrap();

    for arguments in [
        json!({"cards": ["Qs", "Jd "]}),
        json!({"cards": ["Qx", "Jd"]}),
        json!({"cards": "QsJd"}),
        json!({"cards": ["Qs", "Jd", "Jd"]}),
    ] {
        let response = toolbox.handle(ToolRequest {
            tool: "record_hole_cards".to_string(),
            arguments,
        });
        let error = response.error.expect("rejected");
        assert_eq!(error.kind, "validation");
        for token in ["Qs", "Jd", "Qx"] {
            assert!(!error.message.contains(token), "{}", error.message);
        }
    }
    assert!(toolbox.store().load().hole_cards.is_none());
}

#[test]
fn capture_without_a_table_never_runs_the_camera() {
    let rig = FakeRig::working();
    let (dir, mut toolbox) = toolbox_with(rig.clone());
    let err = toolbox.call("capture_cards", json!({})).unwrap_err();
    assert_eq!(err.kind(), "validation");
    assert!(rig.programs().is_empty());
    assert!(!toolbox.store().game_path().exists());
    assert!(!dir.path().join("poker_hand.jpg").exists());
}

#[test]
fn recorded_hole_cards_drive_simulated_equity() {
    let (_dir, mut toolbox) = toolbox_with(FakeRig::default());
    toolbox.setup_game(&common::three_handed()).unwrap();
    toolbox.new_hand().unwrap();
    toolbox.record_hole_cards(&["Ah", "Ad"]).unwrap();
    toolbox
        .call("update_game_state", json!({"community_cards": ["As", "7c", "2d"]}))
        .unwrap();

    let odds = toolbox.call("poker_odds", json!({"pot": 40, "bet": 20})).unwrap();
    assert_eq!(odds["equity_source"], "simulation");
    let equity = odds["equity_pct"].as_f64().unwrap();
    assert!(equity > 80.0, "equity={equity}");
    assert_eq!(odds["recommendation"], "call");
}

#[test]
fn speech_goes_through_the_runner() {
    let rig = FakeRig::default();
    let (_dir, mut toolbox) = toolbox_with(rig.clone());
    let spoken = toolbox.call("poker_speak", json!({"text": "Raise to sixty"})).unwrap();
    assert_eq!(spoken["status"], "spoken");
    let calls = rig.calls.lock().clone();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].first().map(String::as_str), Some("espeak"));
    assert_eq!(calls[0].last().map(String::as_str), Some("Raise to sixty"));

    let failing = FakeRig {
        speech_fails: true,
        ..FakeRig::default()
    };
    let (_dir, mut toolbox) = toolbox_with(failing);
    let err = toolbox.call("poker_speak", json!({"text": "hello"})).unwrap_err();
    assert_eq!(err.kind(), "speech");
    let err = toolbox.call("poker_speak", json!({"text": ""})).unwrap_err();
    assert_eq!(err.kind(), "validation");
}

#[test]
fn trash_talk_picks_from_the_situation_table() {
    let (_dir, mut toolbox) = toolbox_with(FakeRig::default());
    for _ in 0..20 {
        let line = toolbox.poker_trash_talk("raising", None).unwrap();
        let phrase = line.trash_talk.trim_end_matches('.');
        assert!(Situation::Raising.phrases().contains(&phrase), "{phrase}");
    }

    let err = toolbox.call("poker_trash_talk", json!({"situation": "gloating"})).unwrap_err();
    assert_eq!(err.kind(), "validation");
    assert!(!toolbox.store().game_path().exists());
}

#[test]
fn unknown_tools_and_arguments_are_validation_errors() {
    let (_dir, mut toolbox) = toolbox_with(FakeRig::default());
    let err = toolbox.call("poker_bluff", json!({})).unwrap_err();
    assert_eq!(err.kind(), "validation");
    let err = toolbox.call("new_hand", json!({"force": true})).unwrap_err();
    assert_eq!(err.kind(), "validation");
    let err = toolbox
        .call("setup_game", json!({"players": [{"name": "Bob", "stack": -1}, {"name": "Ann", "stack": 5}]}))
        .unwrap_err();
    assert_eq!(err.kind(), "validation");
    let err = toolbox.call("record_hole_cards", json!({"cards": ["Ah"]})).unwrap_err();
    assert_eq!(err.kind(), "validation");
}
