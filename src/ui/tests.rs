use super::state::AppMode;
use super::*;
use crate::board::{AnchorRef, BoardState};
use crate::config::SnapPolicy;
use eframe::egui;

fn raw_input(events: Vec<egui::Event>) -> egui::RawInput {
    let mut raw = egui::RawInput::default();
    raw.screen_rect = Some(egui::Rect::from_min_size(
        egui::Pos2::ZERO,
        egui::vec2(1200.0, 800.0),
    ));
    raw.events = events;
    raw
}

/// Run one frame of the board view on a persistent context.
fn run_canvas_frame(ctx: &egui::Context, app: &mut RagdollApp, events: Vec<egui::Event>) -> egui::FullOutput {
    ctx.run(raw_input(events), |ctx| {
        ctx.set_visuals(egui::Visuals::dark());
        egui::CentralPanel::default().show(ctx, |ui| app.draw_canvas(ui));
    })
}

fn press(pos: egui::Pos2, button: egui::PointerButton) -> egui::Event {
    egui::Event::PointerButton {
        pos,
        button,
        pressed: true,
        modifiers: egui::Modifiers::NONE,
    }
}

fn release(pos: egui::Pos2, button: egui::PointerButton) -> egui::Event {
    egui::Event::PointerButton {
        pos,
        button,
        pressed: false,
        modifiers: egui::Modifiers::NONE,
    }
}

fn drag(ctx: &egui::Context, app: &mut RagdollApp, start: egui::Pos2, end: egui::Pos2) {
    for events in [
        vec![egui::Event::PointerMoved(start)],
        vec![press(start, egui::PointerButton::Primary)],
        vec![egui::Event::PointerMoved(end)],
        vec![release(end, egui::PointerButton::Primary)],
    ] {
        let _ = run_canvas_frame(ctx, app, events);
    }
}

fn editor_app(ctx: &egui::Context) -> RagdollApp {
    let mut app = RagdollApp::default();
    app.set_mode(AppMode::Editor);
    // First frame lays out the view so screen positions are known
    let _ = run_canvas_frame(ctx, &mut app, vec![]);
    app
}

#[test]
fn anchor_drag_undo_redo_round_trip() {
    let ctx = egui::Context::default();
    let mut app = editor_app(&ctx);
    let anchor = AnchorRef { kind: ShapeKind::Circle, index: 2 };

    let orig = app.board.anchor_position(anchor).unwrap();
    let start = app.world_to_screen(orig);
    drag(&ctx, &mut app, start, start + egui::vec2(40.0, 30.0));

    let moved = app.board.anchor_position(anchor).unwrap();
    assert_ne!(moved, orig, "anchor should have moved after drag");
    assert_eq!(app.interaction.selected_anchor, Some(anchor));
    assert!(app.file.has_unsaved_changes);

    app.perform_undo();
    assert_eq!(app.board.anchor_position(anchor), Some(orig), "undo should restore original position");

    app.perform_redo();
    assert_eq!(app.board.anchor_position(anchor), Some(moved), "redo should reapply moved position");
}

#[test]
fn dragged_anchor_is_clamped_to_board() {
    let ctx = egui::Context::default();
    let mut app = editor_app(&ctx);
    let anchor = AnchorRef { kind: ShapeKind::Square, index: 0 };

    let start = app.world_to_screen(app.board.anchor_position(anchor).unwrap());
    drag(&ctx, &mut app, start, start + egui::vec2(-900.0, -400.0));

    let p = app.board.anchor_position(anchor).unwrap();
    assert_eq!(p.x, 0.0);
    assert!(p.y >= 0.0);
}

#[test]
fn click_on_empty_board_clears_selection() {
    let ctx = egui::Context::default();
    let mut app = editor_app(&ctx);
    app.interaction.selected_anchor = Some(AnchorRef { kind: ShapeKind::Circle, index: 0 });

    let empty = app.world_to_screen(Point::new(500.0, 50.0));
    drag(&ctx, &mut app, empty, empty);

    assert!(app.interaction.selected_anchor.is_none());
    assert!(!app.undo_history.can_undo());
}

#[test]
fn context_menu_adds_anchor_and_undo_removes_it() {
    let ctx = egui::Context::default();
    let mut app = editor_app(&ctx);
    let spot = Point::new(420.0, 80.0);
    let screen = app.world_to_screen(spot);

    let _ = run_canvas_frame(&ctx, &mut app, vec![egui::Event::PointerMoved(screen)]);
    let _ = run_canvas_frame(&ctx, &mut app, vec![press(screen, egui::PointerButton::Secondary)]);
    assert!(app.context_menu.show);
    assert_eq!(app.context_menu.world_pos, spot);

    app.add_anchor_at_menu_pos(ShapeKind::Square);
    assert_eq!(app.board.squares.len(), 11);
    assert_eq!(app.board.squares[10], spot);
    assert_eq!(
        app.interaction.selected_anchor,
        Some(AnchorRef { kind: ShapeKind::Square, index: 10 })
    );

    app.perform_undo();
    assert_eq!(app.board.squares.len(), 10);
}

#[test]
fn delete_key_removes_selected_anchor_and_undo_restores_it() {
    let mut app = RagdollApp::default();
    app.set_mode(AppMode::Editor);
    let anchor = AnchorRef { kind: ShapeKind::Circle, index: 4 };
    let position = app.board.anchor_position(anchor).unwrap();
    app.interaction.selected_anchor = Some(anchor);

    let ctx = egui::Context::default();
    let _ = ctx.run(
        raw_input(vec![egui::Event::Key {
            key: egui::Key::Delete,
            physical_key: Some(egui::Key::Delete),
            pressed: true,
            repeat: false,
            modifiers: egui::Modifiers::NONE,
        }]),
        |ctx| app.handle_delete_key(ctx),
    );

    assert_eq!(app.board.circles.len(), 9);
    assert!(!app.board.circles.contains(&position));
    assert!(app.interaction.selected_anchor.is_none());

    app.perform_undo();
    assert_eq!(app.board.anchor_position(anchor), Some(position));
}

#[test]
fn delete_key_is_ignored_in_play_mode() {
    let mut app = RagdollApp::default();
    app.interaction.selected_anchor = Some(AnchorRef { kind: ShapeKind::Circle, index: 0 });

    let ctx = egui::Context::default();
    let _ = ctx.run(
        raw_input(vec![egui::Event::Key {
            key: egui::Key::Delete,
            physical_key: Some(egui::Key::Delete),
            pressed: true,
            repeat: false,
            modifiers: egui::Modifiers::NONE,
        }]),
        |ctx| app.handle_delete_key(ctx),
    );

    assert_eq!(app.board.circles.len(), 10);
}

#[test]
fn rows_change_is_undoable() {
    let mut app = RagdollApp::default();
    app.set_num_rows(9);
    assert_eq!(app.board.num_rows, 9);
    app.set_num_rows(0);
    assert_eq!(app.board.num_rows, 1);

    app.perform_undo();
    app.perform_undo();
    assert_eq!(app.board.num_rows, crate::constants::DEFAULT_NUM_ROWS);
}

#[test]
fn dragging_a_hand_in_play_mode_moves_it() {
    let ctx = egui::Context::default();
    let mut app = RagdollApp::default();
    let _ = run_canvas_frame(&ctx, &mut app, vec![]);

    let hand = app.ragdoll.limb(LimbId::RightArm).position;
    let target = Point::new(hand.x, hand.y - 60.0);
    let start = app.world_to_screen(hand);
    let end = app.world_to_screen(target);

    let _ = run_canvas_frame(&ctx, &mut app, vec![egui::Event::PointerMoved(start)]);
    let _ = run_canvas_frame(&ctx, &mut app, vec![press(start, egui::PointerButton::Primary)]);
    assert_eq!(app.ragdoll.grabbed(), Some(DragTarget::Limb(LimbId::RightArm)));

    let _ = run_canvas_frame(&ctx, &mut app, vec![egui::Event::PointerMoved(end)]);
    let moved = app.ragdoll.limb(LimbId::RightArm).position;
    assert!(moved.distance_to(target) < 0.01, "hand at {:?}", moved);

    let _ = run_canvas_frame(&ctx, &mut app, vec![release(end, egui::PointerButton::Primary)]);
    assert!(app.ragdoll.grabbed().is_none());
}

#[test]
fn pressing_a_snapped_hand_frees_it_at_the_pointer() {
    let ctx = egui::Context::default();
    let mut app = RagdollApp::default();
    let _ = run_canvas_frame(&ctx, &mut app, vec![]);

    let anchor = app.ragdoll.limb(LimbId::RightArm).position;
    app.anchors.push(Anchor::new(anchor, ShapeKind::Circle));
    let hand = app.ragdoll.limb_mut(LimbId::RightArm);
    hand.check_snapping(&app.anchors, SnapPolicy::NearestMatchingAnchor);
    assert!(app.ragdoll.limb(LimbId::RightArm).is_snapped());

    let target = Point::new(anchor.x - 5.0, anchor.y);
    let pos = app.world_to_screen(target);
    let _ = run_canvas_frame(&ctx, &mut app, vec![egui::Event::PointerMoved(pos)]);
    let _ = run_canvas_frame(&ctx, &mut app, vec![press(pos, egui::PointerButton::Primary)]);

    let hand = app.ragdoll.limb(LimbId::RightArm);
    assert!(!hand.is_snapped());
    assert!(hand.position.distance_to(target) < 0.01, "hand at {:?}", hand.position);

    // Still held inside the snap radius on the next frame
    let _ = run_canvas_frame(&ctx, &mut app, vec![]);
    assert!(!app.ragdoll.limb(LimbId::RightArm).is_snapped());

    let _ = run_canvas_frame(&ctx, &mut app, vec![release(pos, egui::PointerButton::Primary)]);
    assert!(app.ragdoll.grabbed().is_none());
}

#[test]
fn right_click_on_limb_toggles_gravity() {
    let ctx = egui::Context::default();
    let mut app = RagdollApp::default();
    let _ = run_canvas_frame(&ctx, &mut app, vec![]);

    let foot = app.world_to_screen(app.ragdoll.limb(LimbId::LeftLeg).position);
    let _ = run_canvas_frame(&ctx, &mut app, vec![egui::Event::PointerMoved(foot)]);
    let _ = run_canvas_frame(&ctx, &mut app, vec![press(foot, egui::PointerButton::Secondary)]);

    assert!(app.ragdoll.limb(LimbId::LeftLeg).gravity_on);
    assert!(!app.ragdoll.limb(LimbId::LeftArm).gravity_on);
    assert!(app.ragdoll.grabbed().is_none());
}

#[test]
fn entering_play_mode_reloads_anchors() {
    let mut app = RagdollApp::default();
    app.set_mode(AppMode::Editor);
    let anchor = app.board.add_anchor(ShapeKind::Circle, Point::new(10.0, 10.0));
    assert_eq!(app.anchors.len(), 20);

    app.set_mode(AppMode::Play);
    assert_eq!(app.anchors.len(), 21);
    assert!(app
        .anchors
        .contains(&Anchor::new(app.board.anchor_position(anchor).unwrap(), ShapeKind::Circle)));
}

#[test]
fn entering_play_mode_frees_limbs_on_removed_anchors() {
    let mut app = RagdollApp::default();
    let anchor = app.board.circles[0];
    let limb = app.ragdoll.limb_mut(LimbId::LeftArm);
    limb.position = anchor;
    limb.check_snapping(&app.anchors, SnapPolicy::NearestMatchingAnchor);
    assert!(app.ragdoll.limb(LimbId::LeftArm).is_snapped());

    app.set_mode(AppMode::Editor);
    app.board.remove_anchor(AnchorRef { kind: ShapeKind::Circle, index: 0 });
    app.set_mode(AppMode::Play);

    assert!(!app.ragdoll.limb(LimbId::LeftArm).is_snapped());
}

#[test]
fn scroll_is_clamped_to_board_and_margin() {
    let mut app = RagdollApp::default();
    let rect = egui::Rect::from_min_size(egui::pos2(0.0, 40.0), egui::vec2(800.0, 600.0));

    app.canvas.scroll_y = 5000.0;
    app.update_view_offset(rect);
    let max = crate::constants::BOARD_HEIGHT + crate::constants::SCROLL_MARGIN - 600.0;
    assert_eq!(app.canvas.scroll_y, max);
    // The bottom of the view shows the margin below the board
    assert_eq!(app.screen_to_world(egui::pos2(400.0, 640.0)).y, crate::constants::BOARD_HEIGHT + crate::constants::SCROLL_MARGIN);

    app.canvas.scroll_y = -5000.0;
    app.update_view_offset(rect);
    assert_eq!(app.canvas.scroll_y, -crate::constants::SCROLL_MARGIN);
}

#[test]
fn board_is_centred_horizontally() {
    let mut app = RagdollApp::default();
    let rect = egui::Rect::from_min_size(egui::pos2(0.0, 0.0), egui::vec2(1000.0, 600.0));
    app.update_view_offset(rect);
    let center = app.world_to_screen(Point::new(crate::constants::BOARD_WIDTH / 2.0, 0.0));
    assert_eq!(center.x, 500.0);
}

#[test]
fn drawing_play_mode_produces_shapes() {
    let ctx = egui::Context::default();
    let mut app = RagdollApp::default();
    let output = run_canvas_frame(&ctx, &mut app, vec![]);
    assert!(!output.shapes.is_empty());
}

#[test]
fn app_state_json_keeps_preferences_but_not_the_board() {
    let mut app = RagdollApp::default();
    app.mode = AppMode::Editor;
    app.dark_mode = false;
    app.config = app.config.clone().with_gravity_rate(123.0);
    app.board = BoardState::empty();

    let json = app.to_json().unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    for skipped in ["board", "anchors", "ragdoll", "undo_history"] {
        assert!(value.get(skipped).is_none(), "{} should not be saved", skipped);
    }
    let restored = RagdollApp::from_json(&json).unwrap();

    assert_eq!(restored.mode, AppMode::Editor);
    assert!(!restored.dark_mode);
    assert_eq!(restored.config.gravity_rate, 123.0);
    assert_eq!(restored.ragdoll.config.gravity_rate, 123.0);
    assert_eq!(restored.board, BoardState::default());
}

#[test]
fn saving_clamps_the_default_board_into_bounds() {
    let mut app = RagdollApp::default();
    assert!(app.board.squares.iter().any(|s| s.x > crate::constants::BOARD_WIDTH));

    let board = app.prepare_board_for_save();
    let path = std::env::temp_dir().join(format!("ragdoll_climber_ui_save_{}.json", std::process::id()));
    board.save(&path).unwrap();
    let saved = BoardState::load(&path).unwrap();
    let _ = std::fs::remove_file(&path);

    assert_eq!(saved, app.board);
    assert_eq!(saved.circles.len(), 10);
    assert_eq!(saved.squares.len(), 10);
    for p in saved.circles.iter().chain(&saved.squares) {
        assert!((0.0..=crate::constants::BOARD_WIDTH).contains(&p.x), "{:?} out of bounds", p);
        assert!((0.0..=crate::constants::BOARD_HEIGHT).contains(&p.y), "{:?} out of bounds", p);
    }
    assert!(app.anchors.iter().all(|a| a.position.x <= crate::constants::BOARD_WIDTH));
}

#[test]
fn new_board_clears_anchors_and_history() {
    let mut app = RagdollApp::default();
    app.set_num_rows(8);
    app.new_board();

    assert!(app.board.circles.is_empty());
    assert!(app.board.squares.is_empty());
    assert!(!app.undo_history.can_undo());
    assert!(app.file.current_path.is_none());
    assert!(app.anchors.is_empty());
}

#[test]
fn loaded_board_replaces_current_one() {
    let mut app = RagdollApp::default();
    let mut board = BoardState::empty();
    board.num_rows = 3;
    board.circles.push(Point::new(100.0, 100.0));
    let json = board.to_json().unwrap();

    app.apply_file_result(state::FileOperationResult::LoadCompleted("climb.json".into(), json));

    assert_eq!(app.board, board);
    assert_eq!(app.file.current_path.as_deref(), Some("climb.json"));
    assert_eq!(app.last_board_path.as_deref(), Some("climb.json"));
    assert_eq!(app.anchors.len(), 1);
}

#[test]
fn malformed_loaded_board_is_ignored() {
    let mut app = RagdollApp::default();
    app.apply_file_result(state::FileOperationResult::LoadCompleted("bad.json".into(), "{ nope".into()));
    assert_eq!(app.board, BoardState::default());
    assert!(app.file.current_path.is_none());
}
